use crate::models::{Enquiry, Property};

/// Read-only facts about the person browsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerContext {
    /// Home city from the viewer's profile. Unknown until the profile loads.
    pub city: Option<String>,
}

impl ViewerContext {
    pub fn new(city: Option<String>) -> Self {
        Self { city }
    }

    /// Home city with surrounding whitespace removed, if one is set.
    pub fn home_city(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }
}

/// Compares item locations against the viewer's home city
#[derive(Debug, Clone, Default)]
pub struct CityMatcher {
    city: Option<String>,
}

impl CityMatcher {
    pub fn new(viewer: &ViewerContext) -> Self {
        Self {
            city: viewer.home_city().map(str::to_lowercase),
        }
    }

    pub fn is_active(&self) -> bool {
        self.city.is_some()
    }

    /// Exact city comparison, ignoring case and surrounding whitespace.
    pub fn is_city(&self, candidate: Option<&str>) -> bool {
        match (&self.city, candidate) {
            (Some(city), Some(candidate)) => candidate.trim().to_lowercase() == *city,
            _ => false,
        }
    }

    /// Whether free-text location mentions the city anywhere.
    pub fn is_mentioned_in(&self, text: Option<&str>) -> bool {
        match (&self.city, text) {
            (Some(city), Some(text)) => text.to_lowercase().contains(city.as_str()),
            _ => false,
        }
    }
}

/// Items that can be ranked by proximity to the viewer's city
pub trait CityAffinity {
    fn in_city(&self, matcher: &CityMatcher) -> bool;
}

impl CityAffinity for Property {
    fn in_city(&self, matcher: &CityMatcher) -> bool {
        matcher.is_city(Some(&self.location.city))
            || matcher.is_mentioned_in(Some(&self.address))
            || matcher.is_mentioned_in(self.location.locality.as_deref())
    }
}

impl CityAffinity for Enquiry {
    fn in_city(&self, matcher: &CityMatcher) -> bool {
        matcher.is_city(self.city.as_deref())
            || matcher.is_mentioned_in(self.address.as_deref())
            || self.preferred_locations.iter().any(|location| {
                matcher.is_city(location.city.as_deref())
                    || matcher.is_mentioned_in(location.address.as_deref())
            })
    }
}

impl<T: CityAffinity + ?Sized> CityAffinity for &T {
    fn in_city(&self, matcher: &CityMatcher) -> bool {
        (**self).in_city(matcher)
    }
}

/// Move same-city items ahead of the rest, keeping relative order within
/// each group. Nothing is dropped, and nothing moves when the city is unknown.
pub fn partition_by_city<T: CityAffinity>(items: Vec<T>, matcher: &CityMatcher) -> Vec<T> {
    if !matcher.is_active() {
        return items;
    }

    let (mut local, other): (Vec<T>, Vec<T>) =
        items.into_iter().partition(|item| item.in_city(matcher));
    local.extend(other);
    local
}
