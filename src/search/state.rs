use tokio::time::Instant;
use tracing::debug;

use crate::models::{Category, PropertyType, Source};
use crate::search::criteria::{
    BhkFilter, Featured, FilterCriteria, PriceRange, Selection, ViewMode,
};
use crate::search::debounce::Debounced;

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Raw filter values as the user is editing them.
///
/// Search text and price range are debounced; every other dimension is
/// applied at once. Any change that reaches downstream consumers resets
/// pagination to the first page.
#[derive(Debug, Clone)]
pub struct FilterState {
    search: Debounced<String>,
    price: Debounced<Option<PriceRange>>,
    category: Selection<Category>,
    property_type: Selection<PropertyType>,
    source: Selection<Source>,
    bhk: BhkFilter,
    featured: Featured,
    view_mode: ViewMode,
    page: u32,
    page_size: u32,
    scroll_reset: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl FilterState {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            search: Debounced::new(String::new()),
            price: Debounced::new(None),
            category: Selection::All,
            property_type: Selection::All,
            source: Selection::All,
            bhk: BhkFilter::All,
            featured: Featured::Any,
            view_mode: ViewMode::Properties,
            page: 1,
            page_size: page_size.max(1),
            scroll_reset: false,
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search.set(text.into(), now);
    }

    pub fn set_price_range(&mut self, range: Option<PriceRange>, now: Instant) {
        self.price.set(range, now);
    }

    pub fn set_category(&mut self, category: Selection<Category>) {
        if self.category != category {
            self.category = category;
            self.reset_page();
        }
    }

    pub fn set_property_type(&mut self, property_type: Selection<PropertyType>) {
        if self.property_type != property_type {
            self.property_type = property_type;
            self.reset_page();
        }
    }

    pub fn set_source(&mut self, source: Selection<Source>) {
        if self.source != source {
            self.source = source;
            self.reset_page();
        }
    }

    pub fn set_bhk(&mut self, bhk: BhkFilter) {
        if self.bhk != bhk {
            self.bhk = bhk;
            self.reset_page();
        }
    }

    pub fn set_featured(&mut self, featured: Featured) {
        if self.featured != featured {
            self.featured = featured;
            self.reset_page();
        }
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        if self.view_mode != view_mode {
            self.view_mode = view_mode;
            self.reset_page();
        }
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        let page_size = page_size.max(1);
        if self.page_size != page_size {
            self.page_size = page_size;
            self.reset_page();
        }
    }

    /// Move to another page. Unlike a filter change this also asks the
    /// result list to scroll back to the top.
    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if self.page != page {
            self.page = page;
            self.scroll_reset = true;
        }
    }

    /// Whether the result list should jump to the top. Clears the flag.
    pub fn take_scroll_reset(&mut self) -> bool {
        std::mem::take(&mut self.scroll_reset)
    }

    /// Commit settled debounced input. Returns true if downstream state
    /// changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let search_changed = self.search.poll(now);
        let price_changed = self.price.poll(now);
        let changed = search_changed || price_changed;
        if changed {
            debug!(
                search = %self.search.value(),
                price = ?self.price.value(),
                "Debounced filters settled"
            );
            self.reset_page();
        }
        changed
    }

    /// Earliest instant at which `poll` could commit something.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.search.deadline(), self.price.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Reset every filter dimension, including input that has not settled.
    pub fn clear_filters(&mut self) {
        self.search.reset(String::new());
        self.price.reset(None);
        self.category = Selection::All;
        self.property_type = Selection::All;
        self.source = Selection::All;
        self.bhk = BhkFilter::All;
        self.featured = Featured::Any;
        self.reset_page();
    }

    /// Settled snapshot used by the query composer and the enquiry pipeline.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search: self.search.value().clone(),
            category: self.category,
            property_type: self.property_type,
            source: self.source,
            price: *self.price.value(),
            bhk: self.bhk,
            featured: self.featured,
        }
    }

    /// Search text as typed, including unsettled keystrokes.
    pub fn search_input(&self) -> &str {
        self.search.latest()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn reset_page(&mut self) {
        self.page = 1;
    }
}
