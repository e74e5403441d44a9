//! Matched case-control cohort construction for dementia prediction studies.
//!
//! Cases are derived from recurrent dementia diagnoses (or read precomputed),
//! restricted to an onset age window, and matched greedily to controls of
//! the same gender and similar age without replacement. The matched cohort
//! feeds an age/sex logistic regression whose evaluation and statistical
//! summary are written as reports.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-export the most common types for easier use
pub use config::{CaseSource, CohortConfig, StudyConfig};
pub use error::{CohortError, Result};
pub use models::{Case, Control, Gender, MatchedRecord, PersonId};

// Matching
pub use algorithm::matching::{Matcher, MatchingCriteria, MatchingResult, filter_cases, match_all};

// Pipeline
pub use pipeline::{StudyOutcome, run_study};
