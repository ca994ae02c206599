use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::api::{ListingQuery, ListingSource, Page};
use crate::error::{describe, FetchError};
use crate::marketplace::slot::{isolated, FetchSlot, Panel};
use crate::models::{Enquiry, Property};
use crate::search::{
    compose, page_controls, EnquiryPipeline, Featured, FilterCriteria, FilterState, Memoized,
    PageControl, Selection, ViewMode, ViewerContext,
};

/// Parameters that identify a listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingKey {
    pub page: u32,
    pub page_size: u32,
    pub query: ListingQuery,
}

type EnquiryViewKey = (FilterCriteria, Option<String>, u64);

/// A finished fetch, tagged with the ticket it was issued under
#[derive(Debug)]
enum Fetched {
    Listings {
        ticket: u64,
        result: Result<Page<Property>, FetchError>,
    },
    Enquiries {
        ticket: u64,
        result: Result<Vec<Enquiry>, FetchError>,
    },
    Highlight {
        ticket: u64,
        result: Result<Property, FetchError>,
    },
}

/// What changed after a fetch completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Listings,
    Enquiries,
    Highlight,
    /// The response belonged to a superseded or cancelled request
    Stale,
}

/// State and data flow of the marketplace browse screen.
///
/// The marketplace is the single writer of all filter and result state.
/// Fetches run as tokio tasks and report back through a channel; their
/// results are applied in `next_update` only if they still match the latest
/// request for their view mode.
pub struct Marketplace<S: ListingSource + 'static> {
    source: Arc<S>,
    viewer: ViewerContext,
    filters: FilterState,
    listings: FetchSlot<ListingKey, Page<Property>>,
    enquiries: FetchSlot<(), Vec<Enquiry>>,
    highlight: FetchSlot<String, Property>,
    enquiry_view: Memoized<EnquiryViewKey, Vec<usize>>,
    tx: mpsc::UnboundedSender<Fetched>,
    rx: mpsc::UnboundedReceiver<Fetched>,
}

impl<S: ListingSource + 'static> Marketplace<S> {
    pub fn new(source: Arc<S>, viewer: ViewerContext, page_size: u32) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        info!(
            "Opening marketplace on {} source (city: {})",
            source.source_name(),
            viewer.home_city().unwrap_or("unknown")
        );

        Self {
            source,
            viewer,
            filters: FilterState::with_page_size(page_size),
            listings: FetchSlot::default(),
            enquiries: FetchSlot::default(),
            highlight: FetchSlot::default(),
            enquiry_view: Memoized::new(),
            tx,
            rx,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn viewer(&self) -> &ViewerContext {
        &self.viewer
    }

    /// Edit filters, then request whatever the new state needs.
    pub fn update(&mut self, edit: impl FnOnce(&mut FilterState)) {
        let mode = self.filters.view_mode();
        edit(&mut self.filters);
        if self.filters.view_mode() != mode {
            self.leave_mode(mode);
        }
        self.sync();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.update(|filters| filters.set_view_mode(mode));
    }

    pub fn set_page(&mut self, page: u32) {
        self.update(|filters| filters.set_page(page));
    }

    pub fn take_scroll_reset(&mut self) -> bool {
        self.filters.take_scroll_reset()
    }

    /// Commit settled debounced input. Returns true if that changed
    /// anything downstream.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.filters.poll(now) {
            self.sync();
            true
        } else {
            false
        }
    }

    /// Start the fetches the current view needs. Requests whose parameters
    /// have not changed are not repeated.
    pub fn sync(&mut self) {
        match self.filters.view_mode() {
            ViewMode::Properties => {
                let key = ListingKey {
                    page: self.filters.page(),
                    page_size: self.filters.page_size(),
                    query: compose(&self.filters.criteria(), &self.viewer),
                };
                if self.listings.needs(&key) {
                    self.fetch_listings(key);
                }
            }
            ViewMode::Enquiries => {
                if self.enquiries.needs(&()) {
                    self.fetch_enquiries();
                }
            }
        }
    }

    /// Request the current view again, e.g. after an error.
    pub fn refresh(&mut self) {
        match self.filters.view_mode() {
            ViewMode::Properties => self.listings.invalidate(),
            ViewMode::Enquiries => self.enquiries.invalidate(),
        }
        self.sync();
    }

    /// Fetch a property to highlight on the map. Replaces any highlight
    /// still loading.
    pub fn highlight_on_map(&mut self, id: impl Into<String>) {
        let id = id.into();
        let ticket = self.highlight.begin(id.clone());
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        debug!("Requesting map highlight for {}", id);
        let handle = tokio::spawn(async move {
            let fetch_id = id.clone();
            let result = isolated(async move { source.fetch_property(&fetch_id).await })
                .await
                .map_err(|err| FetchError::Property {
                    id: id.clone(),
                    reason: describe(&err),
                });
            let _ = tx.send(Fetched::Highlight { ticket, result });
        });
        self.highlight.attach(handle);
    }

    /// Wait for the next finished fetch and apply it.
    pub async fn next_update(&mut self) -> Option<Update> {
        let fetched = self.rx.recv().await?;
        Some(self.apply(fetched))
    }

    /// Drive debounce timers and in-flight fetches until nothing is pending.
    pub async fn settle(&mut self) {
        loop {
            let deadline = self.filters.next_deadline();
            let loading = self.is_loading();
            if deadline.is_none() && !loading {
                break;
            }

            tokio::select! {
                () = sleep_until(deadline) => {
                    self.tick(Instant::now());
                }
                Some(fetched) = self.rx.recv(), if loading => {
                    self.apply(fetched);
                }
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.listings.is_loading() || self.enquiries.is_loading() || self.highlight.is_loading()
    }

    pub fn listings_panel(&self) -> Panel<'_, Page<Property>> {
        self.listings.panel()
    }

    pub fn enquiries_panel(&self) -> Panel<'_, Vec<Enquiry>> {
        self.enquiries.panel()
    }

    pub fn highlighted(&self) -> Option<&Property> {
        self.highlight.data()
    }

    /// Pagination bar for the current listing page.
    pub fn page_controls(&self) -> Vec<PageControl> {
        match self.listings.data() {
            Some(page) => page_controls(self.filters.page(), page.total_pages),
            None => Vec::new(),
        }
    }

    /// Enquiries after search, filtering and same-city ordering. Recomputed
    /// only when a dimension enquiries are filtered on, the viewer's city or
    /// the data change.
    pub fn visible_enquiries(&mut self) -> Vec<&Enquiry> {
        let Some(all) = self.enquiries.data() else {
            return Vec::new();
        };

        let key = (
            enquiry_criteria(self.filters.criteria()),
            self.viewer.home_city().map(str::to_string),
            self.enquiries.generation(),
        );
        let viewer = &self.viewer;
        let positions = self.enquiry_view.get_or_compute(key, |(criteria, _, _)| {
            EnquiryPipeline::new(criteria.clone(), viewer).positions(all)
        });

        positions.iter().map(|&position| &all[position]).collect()
    }

    /// How many times the enquiry view has been recomputed.
    pub fn enquiry_view_computations(&self) -> u64 {
        self.enquiry_view.computations()
    }

    /// Stop everything in flight. Nothing started before this call will be
    /// applied afterwards.
    pub fn leave(mut self) {
        info!("Leaving marketplace");
        self.listings.clear();
        self.enquiries.clear();
        self.highlight.clear();
    }

    fn leave_mode(&mut self, mode: ViewMode) {
        debug!("Switching away from {:?}", mode);
        let cancelled = match mode {
            ViewMode::Properties => self.listings.cancel(),
            ViewMode::Enquiries => self.enquiries.cancel(),
        };
        if cancelled {
            debug!("Cancelled in-flight {:?} request", mode);
        }
        if self.highlight.cancel() {
            debug!("Dropped pending map highlight");
        }
    }

    fn fetch_listings(&mut self, key: ListingKey) {
        debug!(
            "Fetching listings page {} (size {}) with {:?}",
            key.page, key.page_size, key.query
        );
        let ticket = self.listings.begin(key.clone());
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        let handle = tokio::spawn(async move {
            let result = isolated(async move {
                source
                    .fetch_listings(key.page, key.page_size, &key.query)
                    .await
            })
            .await
            .map_err(|err| FetchError::Listings(describe(&err)));
            let _ = tx.send(Fetched::Listings { ticket, result });
        });
        self.listings.attach(handle);
    }

    fn fetch_enquiries(&mut self) {
        debug!("Fetching enquiries");
        let ticket = self.enquiries.begin(());
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        let handle = tokio::spawn(async move {
            let result = isolated(async move { source.fetch_enquiries().await })
                .await
                .map_err(|err| FetchError::Enquiries(describe(&err)));
            let _ = tx.send(Fetched::Enquiries { ticket, result });
        });
        self.enquiries.attach(handle);
    }

    fn apply(&mut self, fetched: Fetched) -> Update {
        let (applied, update, error) = match fetched {
            Fetched::Listings { ticket, result } => {
                let error = result.as_ref().err().cloned();
                (self.listings.complete(ticket, result), Update::Listings, error)
            }
            Fetched::Enquiries { ticket, result } => {
                let error = result.as_ref().err().cloned();
                (self.enquiries.complete(ticket, result), Update::Enquiries, error)
            }
            Fetched::Highlight { ticket, result } => {
                let error = result.as_ref().err().cloned();
                (self.highlight.complete(ticket, result), Update::Highlight, error)
            }
        };

        if !applied {
            debug!("Discarded stale {:?} response", update);
            return Update::Stale;
        }
        if let Some(err) = error {
            warn!("{}", err);
        }
        update
    }
}

/// Criteria with the property-only dimensions cleared, so changing them does
/// not invalidate the enquiry view.
fn enquiry_criteria(criteria: FilterCriteria) -> FilterCriteria {
    FilterCriteria {
        property_type: Selection::All,
        featured: Featured::Any,
        ..criteria
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
