pub mod session;
pub mod slot;

pub use session::{ListingKey, Marketplace, Update};
pub use slot::{FetchSlot, Panel};
