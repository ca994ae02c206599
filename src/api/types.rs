use serde::{Deserialize, Serialize};

use crate::models::{Category, PropertyType, Source};

/// Sparse filter object sent to the listing endpoint.
///
/// Only constrained dimensions are present; an unfiltered browse serializes
/// to no parameters at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bhk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    /// Viewer's home city, used by the backend to rank nearby listings first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_city: Option<String>,
}

impl ListingQuery {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One page of results from a paginated endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub total_pages: u32,
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    /// Cut one page out of a full result set.
    pub fn from_vec(all: Vec<T>, page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = all.len() as u64;
        let total_pages = total.div_ceil(u64::from(page_size)) as u32;
        let skip = (page as usize - 1).saturating_mul(page_size as usize);
        let items = all
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .collect();

        Self {
            items,
            total,
            total_pages,
            page,
        }
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}
