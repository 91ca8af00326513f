//! ag-core: shared foundation for augen-rs.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + finite/positive checks + linspace)
//! - linalg (complex scalar and matrix aliases, Hermitian checks)
//! - timing (stage timers reported through `tracing`)
//! - error (shared error types)

pub mod error;
pub mod linalg;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use linalg::*;
pub use numeric::*;
pub use units::*;
