//! Algorithm implementations for the dementia case-control study
//!
//! This module contains the algorithms of the study workflow: case
//! derivation from diagnosis records, case-control matching, and the
//! age/sex classifier.

pub mod health;
pub mod matching;
pub mod model;
