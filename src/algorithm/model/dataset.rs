//! Wide modelling dataset
//!
//! Cases and matched controls are stacked into one labelled table, shuffled
//! and split into derivation and test sets. Feature columns are then built
//! from the selected features, with continuous ones standardised on the
//! derivation set.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, Axis, concatenate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::algorithm::model::scaler::StandardScaler;
use crate::error::{CohortError, Result};
use crate::models::{CASE_DIAGNOSIS, Case, Gender, MatchedRecord, PersonId};

/// Feature available to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Feature {
    /// Gender indicator (`M = 1`)
    Gender,
    /// Age at onset (cases) or current age (controls)
    Age,
    /// Age shifted back by the prediction range
    AgeModel,
}

impl Feature {
    /// Column name used in reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::AgeModel => "age_model",
        }
    }

    fn value(self, record: &WideRecord) -> f64 {
        match self {
            Self::Gender => record.gender.indicator(),
            Self::Age => record.age,
            Self::AgeModel => record.age_model,
        }
    }
}

impl FromStr for Feature {
    type Err = CohortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "gender" => Ok(Self::Gender),
            "age" => Ok(Self::Age),
            "age_model" => Ok(Self::AgeModel),
            other => Err(CohortError::invalid_parameter(format!(
                "unknown feature '{other}' (expected gender, age or age_model)"
            ))),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the wide modelling table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideRecord {
    /// Individual identifier
    pub person_id: PersonId,
    /// Gender
    pub gender: Gender,
    /// Age in years
    pub age: f64,
    /// `age - prediction_range`
    pub age_model: f64,
    /// Outcome label (1 for cases, 0 for controls)
    pub diagnosis: u8,
}

/// Stack cases (diagnosis 1) and matched controls (diagnosis 0)
#[must_use]
pub fn build_wide_dataset(
    cases: &[Case],
    controls: &[MatchedRecord],
    prediction_range: f64,
) -> Vec<WideRecord> {
    let case_rows = cases.iter().map(|case| WideRecord {
        person_id: case.person_id.clone(),
        gender: case.gender,
        age: case.age(),
        age_model: case.age() - prediction_range,
        diagnosis: CASE_DIAGNOSIS,
    });
    let control_rows = controls.iter().map(|record| WideRecord {
        person_id: record.person_id.clone(),
        gender: record.gender,
        age: record.age,
        age_model: record.age - prediction_range,
        diagnosis: record.diagnosis,
    });
    case_rows.chain(control_rows).collect()
}

/// Shuffle rows in place with a seeded generator
pub fn shuffle_records(records: &mut [WideRecord], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    records.shuffle(&mut rng);
}

/// Split rows into derivation and test sets
///
/// The test set receives `ceil(test_fraction * n)` rows drawn by a seeded
/// permutation; the remaining rows form the derivation set.
pub fn train_test_split(
    records: &[WideRecord],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<WideRecord>, Vec<WideRecord>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(CohortError::invalid_parameter(format!(
            "test_fraction must lie in (0, 1), got {test_fraction}"
        )));
    }

    let n_test = (test_fraction * records.len() as f64).ceil() as usize;
    if records.len() < 2 || n_test >= records.len() {
        return Err(CohortError::model(format!(
            "cannot split {} rows into non-empty derivation and test sets",
            records.len()
        )));
    }

    let mut permutation: Vec<usize> = (0..records.len()).collect();
    permutation.shuffle(&mut StdRng::seed_from_u64(seed));

    let test = permutation[..n_test].iter().map(|&i| records[i].clone()).collect();
    let train = permutation[n_test..].iter().map(|&i| records[i].clone()).collect();
    Ok((train, test))
}

/// Dense feature table with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    /// Column names, in column order
    pub names: Vec<String>,
    /// One row per record, one column per name
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    /// Number of rows
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of feature columns
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.names.len()
    }
}

/// Outcome labels of a set of rows
#[must_use]
pub fn labels(records: &[WideRecord]) -> Vec<u8> {
    records.iter().map(|r| r.diagnosis).collect()
}

/// Values of the selected features, one row per record
fn feature_values(records: &[WideRecord], features: &[Feature]) -> Array2<f64> {
    Array2::from_shape_fn((records.len(), features.len()), |(i, j)| {
        features[j].value(&records[i])
    })
}

/// Build derivation and test feature matrices
///
/// Categorical features come first, unscaled; continuous features follow,
/// standardised with a scaler fitted on the derivation rows only.
///
/// # Arguments
/// * `train` - Derivation rows; the scaler is fitted on these
/// * `test` - Evaluation rows
/// * `categorical` - Features passed through as is
/// * `continuous` - Features to standardise
///
/// # Returns
/// The derivation and test matrices, with identical column order
pub fn prepare_features(
    train: &[WideRecord],
    test: &[WideRecord],
    categorical: &[Feature],
    continuous: &[Feature],
) -> Result<(FeatureMatrix, FeatureMatrix)> {
    let scaler = StandardScaler::fit(&feature_values(train, continuous))?;
    let names: Vec<String> = categorical
        .iter()
        .chain(continuous)
        .map(|f| f.name().to_string())
        .collect();

    let assemble = |records: &[WideRecord]| -> Result<FeatureMatrix> {
        let unscaled = feature_values(records, categorical);
        let scaled = scaler.transform(&feature_values(records, continuous));
        let values = concatenate(Axis(1), &[unscaled.view(), scaled.view()])
            .map_err(|e| CohortError::model(format!("cannot assemble feature matrix: {e}")))?;
        Ok(FeatureMatrix {
            names: names.clone(),
            values,
        })
    };

    Ok((assemble(train)?, assemble(test)?))
}
