//! Health data processing algorithms
//!
//! This module turns raw dementia diagnosis records into study cases:
//! phenotype detection by recurrent diagnosis, and onset age computation
//! against the demographic birth date.

pub mod onset;
pub mod phenotype;

pub use onset::{CaseDerivation, DAYS_PER_YEAR, age_in_years, derive_cases};
pub use phenotype::{
    PhenotypeOnset, RECURRENCE_WINDOW_DAYS, detect_phenotype, has_dementia_phenotype,
};
