use tracing::debug;

use crate::models::Enquiry;
use crate::search::affinity::{partition_by_city, CityAffinity, CityMatcher, ViewerContext};
use crate::search::criteria::FilterCriteria;
use crate::search::fuzzy::{fuzzy_search, SearchField, Searchable};

/// In-memory search, filter and ordering for the enquiry list.
///
/// Stages run in a fixed order: fuzzy text search, then the predicate
/// filters, then a stable same-city-first partition. The input slice is
/// never modified.
#[derive(Debug, Clone)]
pub struct EnquiryPipeline {
    criteria: FilterCriteria,
    city: CityMatcher,
}

// Carries an enquiry's position through the stages.
struct Indexed<'a> {
    position: usize,
    enquiry: &'a Enquiry,
}

impl Searchable for Indexed<'_> {
    fn search_fields(&self) -> Vec<SearchField<'_>> {
        self.enquiry.search_fields()
    }
}

impl CityAffinity for Indexed<'_> {
    fn in_city(&self, matcher: &CityMatcher) -> bool {
        self.enquiry.in_city(matcher)
    }
}

impl EnquiryPipeline {
    pub fn new(criteria: FilterCriteria, viewer: &ViewerContext) -> Self {
        Self {
            criteria,
            city: CityMatcher::new(viewer),
        }
    }

    /// Predicate stage. Missing source, category or budget never exclude an
    /// enquiry; a missing bedroom count does when a bedroom filter is set.
    pub fn retains(&self, enquiry: &Enquiry) -> bool {
        let criteria = &self.criteria;
        criteria.source.matches(enquiry.source.as_ref())
            && criteria.category.matches(enquiry.category.as_ref())
            && criteria
                .price
                .map_or(true, |range| range.overlaps(&enquiry.budget))
            && criteria.bhk.matches(enquiry.bhk)
    }

    /// Positions into `enquiries` of the visible items, in display order.
    pub fn positions(&self, enquiries: &[Enquiry]) -> Vec<usize> {
        let indexed: Vec<Indexed<'_>> = enquiries
            .iter()
            .enumerate()
            .map(|(position, enquiry)| Indexed { position, enquiry })
            .collect();

        let searched = fuzzy_search(indexed.iter().collect(), &self.criteria.search);
        let searched_count = searched.len();

        let filtered: Vec<&Indexed<'_>> = searched
            .into_iter()
            .filter(|item| self.retains(item.enquiry))
            .collect();

        debug!(
            total = enquiries.len(),
            searched = searched_count,
            filtered = filtered.len(),
            "Applied enquiry filters"
        );

        partition_by_city(filtered, &self.city)
            .into_iter()
            .map(|item| item.position)
            .collect()
    }

    pub fn apply<'a>(&self, enquiries: &'a [Enquiry]) -> Vec<&'a Enquiry> {
        self.positions(enquiries)
            .into_iter()
            .map(|position| &enquiries[position])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Budget, Category, Source};
    use crate::search::criteria::{BhkFilter, PriceRange, Selection};

    fn enquiry(id: &str) -> Enquiry {
        Enquiry {
            id: id.to_string(),
            description: String::new(),
            address: None,
            city: None,
            preferred_locations: vec![],
            category: None,
            enquiry_type: None,
            source: None,
            budget: Budget::default(),
            bhk: None,
            created_at: Utc::now(),
        }
    }

    fn ids(items: &[&Enquiry]) -> Vec<String> {
        items.iter().map(|e| e.id.clone()).collect()
    }

    fn sample() -> Vec<Enquiry> {
        let mut a = enquiry("a");
        a.bhk = Some(5);
        a.city = Some("Mumbai".to_string());
        a.budget = Budget { min: Some(4_000_000), max: Some(6_000_000) };
        a.source = Some(Source::Broker);

        let mut b = enquiry("b");
        b.bhk = Some(2);
        b.city = Some("Pune".to_string());
        b.category = Some(Category::Residential);

        let mut c = enquiry("c");
        c.city = Some("Pune".to_string());
        c.budget = Budget { min: Some(9_000_000), max: None };

        let mut d = enquiry("d");
        d.bhk = Some(7);
        d.category = Some(Category::Commercial);
        d.budget = Budget { min: None, max: Some(3_000_000) };

        vec![a, b, c, d]
    }

    #[test]
    fn five_plus_excludes_unrecorded_bedrooms() {
        let criteria = FilterCriteria {
            bhk: BhkFilter::FivePlus,
            ..Default::default()
        };
        let data = sample();
        let out = EnquiryPipeline::new(criteria, &ViewerContext::default()).apply(&data);

        assert_eq!(ids(&out), vec!["a", "d"]);
        assert!(out.iter().all(|e| e.bhk.is_some_and(|n| n >= 5)));
    }

    #[test]
    fn price_filter_keeps_overlapping_budgets() {
        let range = PriceRange::new(5_000_000, 10_000_000).unwrap();
        let criteria = FilterCriteria {
            price: Some(range),
            ..Default::default()
        };
        let data = sample();
        let out = EnquiryPipeline::new(criteria, &ViewerContext::default()).apply(&data);

        assert_eq!(ids(&out), vec!["a", "b", "c"]);
        for e in out {
            assert!(e.budget.min.unwrap_or(0) <= range.max());
            assert!(e.budget.max.unwrap_or(i64::MAX) >= range.min());
        }
    }

    #[test]
    fn category_and_source_fail_open_on_missing_fields() {
        let criteria = FilterCriteria {
            category: Selection::Only(Category::Residential),
            source: Selection::Only(Source::Owner),
            ..Default::default()
        };
        let data = sample();
        let out = EnquiryPipeline::new(criteria, &ViewerContext::default()).apply(&data);

        // a is from a broker, d is commercial
        assert_eq!(ids(&out), vec!["b", "c"]);
    }

    #[test]
    fn same_city_first_without_dropping_others() {
        let data = vec![
            {
                let mut e = enquiry("mumbai");
                e.city = Some("Mumbai".to_string());
                e
            },
            {
                let mut e = enquiry("pune");
                e.city = Some("Pune".to_string());
                e
            },
        ];
        let viewer = ViewerContext::new(Some("Pune".to_string()));
        let out = EnquiryPipeline::new(FilterCriteria::default(), &viewer).apply(&data);

        assert_eq!(ids(&out), vec!["pune", "mumbai"]);
    }

    #[test]
    fn unknown_city_restores_predicate_order() {
        let data = sample();
        let criteria = FilterCriteria {
            price: PriceRange::new(0, 7_000_000).ok(),
            ..Default::default()
        };

        let with_city = EnquiryPipeline::new(
            criteria.clone(),
            &ViewerContext::new(Some("Pune".to_string())),
        )
        .apply(&data);
        let without_city = EnquiryPipeline::new(criteria, &ViewerContext::default()).apply(&data);

        assert_eq!(ids(&with_city), vec!["b", "a", "d"]);
        assert_eq!(ids(&without_city), vec!["a", "b", "d"]);
    }

    #[test]
    fn search_runs_before_predicates() {
        let mut meadows = enquiry("meadows");
        meadows.address = Some("Near Green Meadows society".to_string());
        meadows.bhk = Some(3);
        let mut downtown = enquiry("downtown");
        downtown.address = Some("Downtown".to_string());
        downtown.bhk = Some(3);
        let data = vec![downtown, meadows];

        let criteria = FilterCriteria {
            search: "Green Meadows".to_string(),
            bhk: BhkFilter::Exactly(3),
            ..Default::default()
        };
        let out = EnquiryPipeline::new(criteria, &ViewerContext::default()).apply(&data);
        assert_eq!(ids(&out), vec!["meadows"]);
    }

    #[test]
    fn applying_twice_is_idempotent_and_leaves_input_alone() {
        let data = sample();
        let before = data.clone();
        let pipeline = EnquiryPipeline::new(
            FilterCriteria {
                bhk: BhkFilter::Exactly(2),
                ..Default::default()
            },
            &ViewerContext::new(Some("Pune".to_string())),
        );

        let first = ids(&pipeline.apply(&data));
        let second = ids(&pipeline.apply(&data));

        assert_eq!(first, second);
        assert_eq!(data, before);
    }
}
