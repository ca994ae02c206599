pub mod api;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod models;
pub mod search;

pub use api::{HttpListingSource, ListingSource, SnapshotSource};
pub use config::AppConfig;
pub use error::{FetchError, FilterError};
pub use marketplace::{Marketplace, Panel};
