//! Configuration for cohort construction and the study pipeline.
//!
//! The core parameters carry no defaults: every value is supplied by the
//! caller (the command line defines the conventional study defaults).

use std::fmt;
use std::path::PathBuf;

use crate::algorithm::model::Feature;
use crate::error::{CohortError, Result};

/// Parameters of the case filter and the control matcher
#[derive(Debug, Clone, PartialEq)]
pub struct CohortConfig {
    /// Cases must have an onset age strictly above this value
    pub age_cutoff_lower: f64,
    /// Cases must have an onset age strictly below this value
    pub age_cutoff_higher: f64,
    /// Maximum absolute age difference between a case and its controls
    pub age_tolerance: f64,
    /// Number of controls requested per case
    pub num_controls: usize,
    /// Years subtracted from the age to obtain the modelling age
    pub prediction_range: f64,
}

impl CohortConfig {
    /// Create a new builder
    #[must_use]
    pub fn builder() -> CohortConfigBuilder {
        CohortConfigBuilder::default()
    }

    /// Check every parameter, failing on the first malformed one
    pub fn validate(&self) -> Result<()> {
        validate_cutoffs(self.age_cutoff_lower, self.age_cutoff_higher)?;
        validate_matching(self.age_tolerance, self.num_controls)?;
        if !self.prediction_range.is_finite() {
            return Err(CohortError::invalid_parameter(format!(
                "prediction_range must be finite, got {}",
                self.prediction_range
            )));
        }
        Ok(())
    }
}

impl fmt::Display for CohortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cohort Configuration:")?;
        writeln!(
            f,
            "  Onset age window: ({}, {})",
            self.age_cutoff_lower, self.age_cutoff_higher
        )?;
        writeln!(f, "  Age tolerance: ±{}", self.age_tolerance)?;
        writeln!(f, "  Controls per case: {}", self.num_controls)?;
        write!(f, "  Prediction range: {}", self.prediction_range)
    }
}

/// Cutoffs must be finite with `lower < higher`
pub fn validate_cutoffs(lower: f64, higher: f64) -> Result<()> {
    if lower.is_finite() && higher.is_finite() && lower < higher {
        Ok(())
    } else {
        Err(CohortError::InvalidRange { lower, higher })
    }
}

/// Tolerance must be finite and non-negative, and at least one control requested
pub fn validate_matching(age_tolerance: f64, num_controls: usize) -> Result<()> {
    if !(age_tolerance.is_finite() && age_tolerance >= 0.0) {
        return Err(CohortError::invalid_parameter(format!(
            "age_tolerance must be a finite non-negative number, got {age_tolerance}"
        )));
    }
    if num_controls == 0 {
        return Err(CohortError::invalid_parameter(
            "num_controls must be greater than zero",
        ));
    }
    Ok(())
}

/// Builder for constructing cohort configuration
#[derive(Debug, Clone, Default)]
pub struct CohortConfigBuilder {
    age_cutoff_lower: Option<f64>,
    age_cutoff_higher: Option<f64>,
    age_tolerance: Option<f64>,
    num_controls: Option<usize>,
    prediction_range: Option<f64>,
}

impl CohortConfigBuilder {
    /// Set both onset age cutoffs
    #[must_use]
    pub const fn age_cutoffs(mut self, lower: f64, higher: f64) -> Self {
        self.age_cutoff_lower = Some(lower);
        self.age_cutoff_higher = Some(higher);
        self
    }

    /// Set the matching age tolerance
    #[must_use]
    pub const fn age_tolerance(mut self, tolerance: f64) -> Self {
        self.age_tolerance = Some(tolerance);
        self
    }

    /// Set the number of controls per case
    #[must_use]
    pub const fn num_controls(mut self, num_controls: usize) -> Self {
        self.num_controls = Some(num_controls);
        self
    }

    /// Set the prediction range
    #[must_use]
    pub const fn prediction_range(mut self, years: f64) -> Self {
        self.prediction_range = Some(years);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<CohortConfig> {
        let config = CohortConfig {
            age_cutoff_lower: required(self.age_cutoff_lower, "age_cutoff_lower")?,
            age_cutoff_higher: required(self.age_cutoff_higher, "age_cutoff_higher")?,
            age_tolerance: required(self.age_tolerance, "age_tolerance")?,
            num_controls: required(self.num_controls, "num_controls")?,
            prediction_range: required(self.prediction_range, "prediction_range")?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| CohortError::invalid_parameter(format!("{name} was not set")))
}

/// Where the case side of the study comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseSource {
    /// Derive cases from diagnosis events joined with demographics
    Diagnoses {
        /// Table of dementia diagnosis events
        dementia_file: PathBuf,
        /// Table of birth dates and genders
        demographics_file: PathBuf,
    },
    /// Read cases with a precomputed onset age
    Precomputed {
        /// Table of cases
        cases_file: PathBuf,
    },
}

/// Full configuration of one study run
#[derive(Debug, Clone)]
pub struct StudyConfig {
    /// Matching and filtering parameters
    pub cohort: CohortConfig,
    /// Table of candidate controls
    pub controls_file: PathBuf,
    /// Source of cases
    pub case_source: CaseSource,
    /// Directory receiving all reports
    pub output_dir: PathBuf,
    /// Features passed to the classifier unscaled
    pub categorical_features: Vec<Feature>,
    /// Features standardised before fitting
    pub continuous_features: Vec<Feature>,
    /// Seed for shuffling and the train/test split
    pub seed: u64,
    /// Fraction of the wide dataset held out for evaluation
    pub test_fraction: f64,
    /// Drop anyone with a dementia diagnosis from the control pool
    pub exclude_diagnosed_controls: bool,
    /// Show progress bars for long-running stages
    pub show_progress: bool,
}

impl StudyConfig {
    /// Validate the cohort parameters and modelling options
    pub fn validate(&self) -> Result<()> {
        self.cohort.validate()?;
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(CohortError::invalid_parameter(format!(
                "test_fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.categorical_features.is_empty() && self.continuous_features.is_empty() {
            return Err(CohortError::invalid_parameter(
                "at least one model feature must be selected",
            ));
        }
        Ok(())
    }
}
