use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;
use crate::models::{Budget, Category, PropertyType, Source};

/// Sentinel the UI and backend use for "do not constrain this dimension"
pub const WILDCARD: &str = "ALL";

/// A filter dimension that is either unconstrained or pinned to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Selection<T> {
    /// Whether an item's value passes this selection. Items without a value
    /// are never excluded.
    pub fn matches(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Self::All, _) => true,
            (Self::Only(_), None) => true,
            (Self::Only(wanted), Some(actual)) => wanted == actual,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value),
        }
    }
}

impl<T> FromStr for Selection<T>
where
    T: FromStr<Err = FilterError>,
{
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(WILDCARD) {
            Ok(Self::All)
        } else {
            trimmed.parse().map(Self::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(WILDCARD),
            Self::Only(value) => value.fmt(f),
        }
    }
}

/// Inclusive price bounds chosen on the range slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceRange {
    min: i64,
    max: i64,
}

impl PriceRange {
    pub fn new(min: i64, max: i64) -> Result<Self, FilterError> {
        if min > max {
            return Err(FilterError::InvertedPriceRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Interval overlap against a budget. A missing budget minimum counts as 0
    /// and a missing maximum as unbounded.
    pub fn overlaps(&self, budget: &Budget) -> bool {
        let item_min = budget.min.unwrap_or(0);
        let item_max = budget.max.unwrap_or(i64::MAX);
        item_min <= self.max && item_max >= self.min
    }
}

/// Number of bedrooms to filter on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BhkFilter {
    #[default]
    All,
    Exactly(u8),
    /// Five bedrooms or more
    FivePlus,
}

impl BhkFilter {
    /// Unlike the other dimensions, a specific bedroom filter excludes items
    /// that do not record a bedroom count.
    pub fn matches(&self, bhk: Option<u8>) -> bool {
        match (self, bhk) {
            (Self::All, _) => true,
            (_, None) => false,
            (Self::Exactly(wanted), Some(actual)) => *wanted == actual,
            (Self::FivePlus, Some(actual)) => actual >= 5,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl FromStr for BhkFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(WILDCARD) {
            return Ok(Self::All);
        }
        if trimmed == "5+" {
            return Ok(Self::FivePlus);
        }
        match trimmed.parse::<u8>() {
            Ok(n) if n > 0 => Ok(Self::Exactly(n)),
            _ => Err(FilterError::InvalidBhk(s.to_string())),
        }
    }
}

impl fmt::Display for BhkFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(WILDCARD),
            Self::Exactly(n) => write!(f, "{n}"),
            Self::FivePlus => f.write_str("5+"),
        }
    }
}

/// Tri-state featured toggle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Featured {
    #[default]
    Any,
    Only,
    Exclude,
}

impl Featured {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Any => None,
            Self::Only => Some(true),
            Self::Exclude => Some(false),
        }
    }
}

/// Which list the marketplace is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    #[default]
    Properties,
    Enquiries,
}

/// Settled filter values that downstream stages read
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub search: String,
    pub category: Selection<Category>,
    pub property_type: Selection<PropertyType>,
    pub source: Selection<Source>,
    pub price: Option<PriceRange>,
    pub bhk: BhkFilter,
    pub featured: Featured,
}

impl FilterCriteria {
    /// Trimmed search text, or `None` when there is nothing to search for.
    pub fn search_text(&self) -> Option<&str> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Number of dimensions currently constraining results.
    pub fn active_count(&self) -> usize {
        [
            self.search_text().is_some(),
            !self.category.is_all(),
            !self.property_type.is_all(),
            !self.source.is_all(),
            self.price.is_some(),
            !self.bhk.is_all(),
            self.featured != Featured::Any,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.active_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parses_wildcard_and_values() {
        assert_eq!("ALL".parse::<Selection<Category>>().unwrap(), Selection::All);
        assert_eq!("".parse::<Selection<Source>>().unwrap(), Selection::All);
        assert_eq!(
            "commercial".parse::<Selection<Category>>().unwrap(),
            Selection::Only(Category::Commercial)
        );
        assert!("nowhere".parse::<Selection<Source>>().is_err());
    }

    #[test]
    fn selection_fails_open_on_missing_value() {
        let only = Selection::Only(Source::Broker);
        assert!(only.matches(None));
        assert!(only.matches(Some(&Source::Broker)));
        assert!(!only.matches(Some(&Source::Owner)));
    }

    #[test]
    fn price_range_rejects_inverted_bounds() {
        assert_eq!(
            PriceRange::new(10, 5),
            Err(FilterError::InvertedPriceRange { min: 10, max: 5 })
        );
    }

    #[test]
    fn price_range_overlap_uses_default_bounds() {
        let range = PriceRange::new(5_000_000, 8_000_000).unwrap();

        assert!(range.overlaps(&Budget { min: Some(7_000_000), max: Some(9_000_000) }));
        assert!(range.overlaps(&Budget { min: None, max: Some(5_000_000) }));
        assert!(range.overlaps(&Budget { min: Some(8_000_000), max: None }));
        assert!(range.overlaps(&Budget::default()));
        assert!(!range.overlaps(&Budget { min: Some(8_000_001), max: None }));
        assert!(!range.overlaps(&Budget { min: None, max: Some(4_999_999) }));
    }

    #[test]
    fn bhk_filter_fails_closed_when_count_missing() {
        assert!(BhkFilter::All.matches(None));
        assert!(!BhkFilter::Exactly(2).matches(None));
        assert!(!BhkFilter::FivePlus.matches(None));
        assert!(BhkFilter::FivePlus.matches(Some(7)));
        assert!(!BhkFilter::FivePlus.matches(Some(4)));
        assert!(BhkFilter::Exactly(3).matches(Some(3)));
    }

    #[test]
    fn bhk_filter_parses_ui_values() {
        assert_eq!("ALL".parse::<BhkFilter>().unwrap(), BhkFilter::All);
        assert_eq!("3".parse::<BhkFilter>().unwrap(), BhkFilter::Exactly(3));
        assert_eq!("5+".parse::<BhkFilter>().unwrap(), BhkFilter::FivePlus);
        assert!("0".parse::<BhkFilter>().is_err());
        assert_eq!("5".parse::<BhkFilter>().unwrap(), BhkFilter::Exactly(5));
        assert!("many".parse::<BhkFilter>().is_err());
    }

    #[test]
    fn large_bhk_number_is_an_exact_match() {
        let parsed: BhkFilter = "7".parse().unwrap();
        assert_eq!(parsed, BhkFilter::Exactly(7));
        assert!(parsed.matches(Some(7)));
        assert!(!parsed.matches(Some(6)));
        assert!(!parsed.matches(Some(8)));
        assert_eq!(parsed.to_string(), "7");
    }

    #[test]
    fn counts_active_dimensions() {
        let mut criteria = FilterCriteria::default();
        assert!(criteria.is_unconstrained());

        criteria.search = "   ".to_string();
        assert_eq!(criteria.active_count(), 0);

        criteria.search = "baner".to_string();
        criteria.bhk = BhkFilter::FivePlus;
        criteria.featured = Featured::Only;
        assert_eq!(criteria.active_count(), 3);
    }
}
