//! Domain models for the consent gateway.
//!
//! Consent records and their composite key, per-item decisions with the
//! aggregate assessment status, and the static purpose catalog.

mod catalog;
mod consent;
mod decision;

pub use catalog::*;
pub use consent::*;
pub use decision::*;
