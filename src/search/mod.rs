pub mod affinity;
pub mod composer;
pub mod criteria;
pub mod debounce;
pub mod fuzzy;
pub mod memo;
pub mod pagination;
pub mod pipeline;
pub mod state;

pub use affinity::{partition_by_city, CityAffinity, CityMatcher, ViewerContext};
pub use composer::compose;
pub use criteria::{BhkFilter, Featured, FilterCriteria, PriceRange, Selection, ViewMode};
pub use debounce::{Debounced, SEARCH_DEBOUNCE};
pub use fuzzy::{fuzzy_search, FuzzyMatcher, Searchable};
pub use memo::Memoized;
pub use pagination::{page_controls, PageBar, PageControl, PAGE_WINDOW};
pub use pipeline::EnquiryPipeline;
pub use state::FilterState;
