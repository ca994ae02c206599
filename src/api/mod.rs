pub mod http;
pub mod snapshot;
pub mod traits;
pub mod types;

pub use http::HttpListingSource;
pub use snapshot::{Snapshot, SnapshotSource};
pub use traits::ListingSource;
pub use types::{ListingQuery, Page};
