//! Typo-tolerant text search over weighted item fields.
//!
//! Each field is scored with approximate substring matching: the fewest
//! edits needed to turn the query into some substring of the field,
//! divided by the query length. A score of 0 is an exact hit and anything
//! above [`MATCH_THRESHOLD`] is not a match.

use std::borrow::Cow;

use crate::models::{Enquiry, Property};

/// Highest normalized edit distance still counted as a match
pub const MATCH_THRESHOLD: f64 = 0.4;

pub const DESCRIPTION_WEIGHT: f64 = 1.0;
pub const ADDRESS_WEIGHT: f64 = 0.7;
pub const LOCALITY_WEIGHT: f64 = 0.7;
pub const CATEGORY_WEIGHT: f64 = 0.3;
pub const TYPE_WEIGHT: f64 = 0.3;

/// One searchable piece of text and how much a hit in it is worth
#[derive(Debug, Clone)]
pub struct SearchField<'a> {
    pub weight: f64,
    pub text: Cow<'a, str>,
}

impl<'a> SearchField<'a> {
    fn borrowed(weight: f64, text: &'a str) -> Self {
        Self {
            weight,
            text: Cow::Borrowed(text),
        }
    }

    fn label(weight: f64, wire_name: &str) -> Self {
        Self {
            weight,
            text: Cow::Owned(wire_name.replace('_', " ")),
        }
    }
}

/// Items that expose weighted text to the fuzzy matcher
pub trait Searchable {
    fn search_fields(&self) -> Vec<SearchField<'_>>;
}

impl Searchable for Enquiry {
    fn search_fields(&self) -> Vec<SearchField<'_>> {
        let mut fields = vec![SearchField::borrowed(DESCRIPTION_WEIGHT, &self.description)];
        if let Some(address) = &self.address {
            fields.push(SearchField::borrowed(ADDRESS_WEIGHT, address));
        }
        if let Some(city) = &self.city {
            fields.push(SearchField::borrowed(LOCALITY_WEIGHT, city));
        }
        for location in &self.preferred_locations {
            for text in [&location.address, &location.city].into_iter().flatten() {
                fields.push(SearchField::borrowed(LOCALITY_WEIGHT, text));
            }
        }
        if let Some(category) = self.category {
            fields.push(SearchField::label(CATEGORY_WEIGHT, category.as_str()));
        }
        if let Some(enquiry_type) = self.enquiry_type {
            fields.push(SearchField::label(TYPE_WEIGHT, enquiry_type.as_str()));
        }
        fields
    }
}

impl Searchable for Property {
    fn search_fields(&self) -> Vec<SearchField<'_>> {
        let mut fields = vec![
            SearchField::borrowed(DESCRIPTION_WEIGHT, &self.title),
            SearchField::borrowed(DESCRIPTION_WEIGHT, &self.description),
            SearchField::borrowed(ADDRESS_WEIGHT, &self.address),
            SearchField::borrowed(LOCALITY_WEIGHT, &self.location.city),
        ];
        if let Some(locality) = &self.location.locality {
            fields.push(SearchField::borrowed(LOCALITY_WEIGHT, locality));
        }
        fields.push(SearchField::label(CATEGORY_WEIGHT, self.category.as_str()));
        fields.push(SearchField::label(TYPE_WEIGHT, self.property_type.as_str()));
        fields
    }
}

/// A compiled query
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    pattern: Vec<char>,
    threshold: f64,
}

impl FuzzyMatcher {
    /// Returns `None` for a query with no searchable characters.
    pub fn new(query: &str) -> Option<Self> {
        Self::with_threshold(query, MATCH_THRESHOLD)
    }

    pub fn with_threshold(query: &str, threshold: f64) -> Option<Self> {
        let pattern: Vec<char> = normalize(query).chars().collect();
        if pattern.is_empty() {
            return None;
        }
        Some(Self { pattern, threshold })
    }

    /// Normalized distance to the best-matching substring of `text`, or
    /// `None` when it is above the threshold.
    pub fn score(&self, text: &str) -> Option<f64> {
        let text: Vec<char> = normalize(text).chars().collect();
        if text.is_empty() {
            return None;
        }

        let edits = substring_edit_distance(&self.pattern, &text);
        let score = edits as f64 / self.pattern.len() as f64;
        (score <= self.threshold).then_some(score)
    }

    /// Best weighted similarity across an item's fields.
    pub fn relevance<T: Searchable + ?Sized>(&self, item: &T) -> Option<f64> {
        item.search_fields()
            .iter()
            .filter_map(|field| {
                self.score(&field.text)
                    .map(|score| field.weight * (1.0 - score))
            })
            .max_by(f64::total_cmp)
    }
}

/// Keep items that match `query`, most relevant first. Ties keep their
/// input order, and an empty query returns the input untouched.
pub fn fuzzy_search<'a, T: Searchable>(items: Vec<&'a T>, query: &str) -> Vec<&'a T> {
    let Some(matcher) = FuzzyMatcher::new(query) else {
        return items;
    };

    let mut scored: Vec<(f64, &'a T)> = items
        .into_iter()
        .filter_map(|item| matcher.relevance(item).map(|relevance| (relevance, item)))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// Sellers' variant of Levenshtein: a match may start anywhere in the text,
// so the first row is all zeros and the answer is the minimum of the last.
fn substring_edit_distance(pattern: &[char], text: &[char]) -> usize {
    let m = pattern.len();
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0; m + 1];
    let mut best = prev[m];

    for &tc in text {
        curr[0] = 0;
        for i in 1..=m {
            let substitution = prev[i - 1] + usize::from(pattern[i - 1] != tc);
            curr[i] = substitution.min(prev[i] + 1).min(curr[i - 1] + 1);
        }
        best = best.min(curr[m]);
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
