use crate::api::ListingQuery;
use crate::search::affinity::ViewerContext;
use crate::search::criteria::{BhkFilter, FilterCriteria};

/// Project settled filter values into the sparse query the listing endpoint
/// expects. Wildcards and unset values never appear in the output.
pub fn compose(criteria: &FilterCriteria, viewer: &ViewerContext) -> ListingQuery {
    ListingQuery {
        search: criteria.search_text().map(str::to_string),
        category: criteria.category.as_option().copied(),
        property_type: criteria.property_type.as_option().copied(),
        source: criteria.source.as_option().copied(),
        min_price: criteria.price.map(|range| range.min()),
        max_price: criteria.price.map(|range| range.max()),
        bhk: match criteria.bhk {
            BhkFilter::All => None,
            other => Some(other.to_string()),
        },
        featured: criteria.featured.as_flag(),
        user_city: viewer.home_city().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, PropertyType, Source};
    use crate::search::criteria::{Featured, PriceRange, Selection};

    #[test]
    fn wildcard_criteria_compose_to_empty_query() {
        let query = compose(&FilterCriteria::default(), &ViewerContext::default());
        assert!(query.is_empty());

        let blank_search = FilterCriteria {
            search: "  ".to_string(),
            ..Default::default()
        };
        assert!(compose(&blank_search, &ViewerContext::default()).is_empty());
    }

    #[test]
    fn emits_only_constrained_dimensions() {
        let criteria = FilterCriteria {
            search: "  sea view ".to_string(),
            category: Selection::Only(Category::Residential),
            property_type: Selection::All,
            source: Selection::Only(Source::Company),
            price: None,
            bhk: BhkFilter::FivePlus,
            featured: Featured::Only,
        };
        let query = compose(&criteria, &ViewerContext::default());

        assert_eq!(query.search.as_deref(), Some("sea view"));
        assert_eq!(query.category, Some(Category::Residential));
        assert_eq!(query.property_type, None);
        assert_eq!(query.source, Some(Source::Company));
        assert_eq!(query.bhk.as_deref(), Some("5+"));
        assert_eq!(query.featured, Some(true));
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, None);
    }

    #[test]
    fn exact_bedroom_count_is_sent_verbatim() {
        let criteria = FilterCriteria {
            bhk: BhkFilter::Exactly(7),
            ..Default::default()
        };
        let query = compose(&criteria, &ViewerContext::default());
        assert_eq!(query.bhk.as_deref(), Some("7"));
    }

    #[test]
    fn price_bounds_come_from_an_explicit_range() {
        let criteria = FilterCriteria {
            property_type: Selection::Only(PropertyType::Plot),
            price: Some(PriceRange::new(0, 2_500_000).unwrap()),
            ..Default::default()
        };
        let query = compose(&criteria, &ViewerContext::default());

        assert_eq!(query.min_price, Some(0));
        assert_eq!(query.max_price, Some(2_500_000));
    }

    #[test]
    fn includes_home_city_hint_when_known() {
        let viewer = ViewerContext::new(Some(" Pune ".to_string()));
        let query = compose(&FilterCriteria::default(), &viewer);
        assert_eq!(query.user_city.as_deref(), Some("Pune"));

        let excluded = compose(&FilterCriteria::default(), &ViewerContext::new(Some(String::new())));
        assert!(excluded.user_city.is_none());
    }

    #[test]
    fn featured_exclusion_is_sent_as_false() {
        let criteria = FilterCriteria {
            featured: Featured::Exclude,
            ..Default::default()
        };
        assert_eq!(compose(&criteria, &ViewerContext::default()).featured, Some(false));
    }
}
