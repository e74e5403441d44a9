//! Domain models for the case-control study
//!
//! This module contains the typed records that flow through the pipeline:
//! raw diagnosis events and demographics, derived cases, candidate controls
//! and the matched records produced by the matching engine.

pub mod diagnosis;
pub mod individual;
pub mod matched;
pub mod types;

// Re-export commonly used types
pub use diagnosis::{Demographics, DiagnosisEvent};
pub use individual::{Case, Control};
pub use matched::{CASE_DIAGNOSIS, CONTROL_DIAGNOSIS, MatchedRecord};
pub use types::{Gender, PersonId};
