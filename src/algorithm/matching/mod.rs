//! Case-control matching for the dementia cohort
//!
//! This module implements cohort selection and control allocation:
//!
//! 1. Case filtering by onset age window
//! 2. Matching criteria (same gender, age tolerance, controls per case)
//! 3. Greedy sequential allocation with a run-scoped used-control set
//! 4. Covariate balance assessment for the matched cohort
//!
//! Allocation is order-sensitive by construction: cases are served in input
//! order and a control, once allocated, is never offered to a later case.

pub mod balance;
pub mod control_data;
pub mod criteria;
pub mod filtering;
pub mod matcher;
pub mod sequential;
pub mod types;
pub mod validation;

// Re-export key types
pub use balance::{BalanceMetric, BalanceReport, BalanceSummary, assess_balance};
pub use criteria::MatchingCriteria;
pub use filtering::filter_cases;
pub use matcher::{Matcher, match_all};
pub use types::{CaseAllocation, MatchingResult, UsedSet};
