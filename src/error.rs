use thiserror::Error;

/// Invalid filter input coming from the user or the command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown {dimension} `{value}`")]
    UnknownVariant {
        dimension: &'static str,
        value: String,
    },

    #[error("invalid bedroom filter `{0}` (expected ALL, a number, or 5+)")]
    InvalidBhk(String),

    #[error("price range minimum {min} is above maximum {max}")]
    InvertedPriceRange { min: i64, max: i64 },
}

/// A failed fetch, scoped to the view mode that issued it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("failed to load properties: {0}")]
    Listings(String),

    #[error("failed to load enquiries: {0}")]
    Enquiries(String),

    #[error("failed to load property {id}: {reason}")]
    Property { id: String, reason: String },
}

// anyhow's alternate formatting keeps the whole context chain in one line.
pub(crate) fn describe(err: &anyhow::Error) -> String {
    format!("{err:#}")
}
