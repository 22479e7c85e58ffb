pub mod calendar;
pub mod error;
pub mod ledger;
pub mod time_value;
pub mod types;

#[cfg(feature = "analytics")]
pub mod analytics;

#[cfg(feature = "charts")]
pub mod charts;

#[cfg(feature = "charts")]
pub mod dashboard;

pub use error::DcaError;
pub use types::*;

/// Standard result type for all dca operations
pub type DcaResult<T> = Result<T, DcaError>;
