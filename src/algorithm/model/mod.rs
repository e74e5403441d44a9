//! Age/sex dementia classifier
//!
//! This module trains and evaluates a logistic regression on the matched
//! cohort:
//!
//! 1. Wide dataset assembly (cases and matched controls with labels)
//! 2. Seeded shuffle and derivation/test split
//! 3. Standard scaling of continuous features
//! 4. Penalised fit for prediction, unpenalised fit for inference
//! 5. Accuracy, confusion matrix, ROC and precision-recall evaluation

pub mod dataset;
pub mod linalg;
pub mod logistic;
pub mod metrics;
pub mod scaler;
pub mod summary;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Case, MatchedRecord};

pub use dataset::{Feature, FeatureMatrix, WideRecord, build_wide_dataset};
pub use logistic::{FittedLogistic, LogisticRegression};
pub use metrics::{ConfusionMatrix, PrecisionRecallPoint, RocPoint};
pub use summary::{PredictorSummary, model_summary};

/// Settings for the modelling stage
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Years subtracted from age to obtain `age_model`
    pub prediction_range: f64,
    /// Features passed through unscaled
    pub categorical: Vec<Feature>,
    /// Features standardised before fitting
    pub continuous: Vec<Feature>,
    /// Seed for shuffling and splitting
    pub seed: u64,
    /// Fraction held out for evaluation
    pub test_fraction: f64,
}

/// Everything produced by the modelling stage
#[derive(Debug, Clone, Serialize)]
pub struct ModelOutcome {
    /// Derivation set size
    pub train_size: usize,
    /// Test set size
    pub test_size: usize,
    /// Test set accuracy of the penalised classifier
    pub accuracy: f64,
    /// Test set confusion matrix
    pub confusion: ConfusionMatrix,
    /// Test set ROC curve
    #[serde(skip)]
    pub roc: Vec<RocPoint>,
    /// Area under the ROC curve
    pub roc_auc: f64,
    /// Test set precision-recall curve
    #[serde(skip)]
    pub precision_recall: Vec<PrecisionRecallPoint>,
    /// Average precision
    pub average_precision: f64,
    /// Per-predictor inference from the unpenalised derivation fit
    pub summary: Vec<PredictorSummary>,
}

/// Fit and evaluate the classifier on cases and their matched controls
///
/// # Arguments
/// * `cases` - Eligible cases, labelled 1
/// * `controls` - Matched controls, labelled 0
/// * `options` - Features, prediction range, seed and test fraction
///
/// # Returns
/// Test-set metrics and the predictor summary of the unpenalised fit
pub fn fit_and_evaluate(
    cases: &[Case],
    controls: &[MatchedRecord],
    options: &ModelOptions,
) -> Result<ModelOutcome> {
    let mut wide = build_wide_dataset(cases, controls, options.prediction_range);
    dataset::shuffle_records(&mut wide, options.seed);

    let (train, test) = dataset::train_test_split(&wide, options.test_fraction, options.seed)?;
    let (x_train, x_test) =
        dataset::prepare_features(&train, &test, &options.categorical, &options.continuous)?;
    let y_train = dataset::labels(&train);
    let y_test = dataset::labels(&test);

    info!(
        "Fitting classifier on {} derivation rows, evaluating on {} test rows",
        train.len(),
        test.len()
    );

    let classifier = LogisticRegression::new().fit(&x_train, &y_train)?;
    let predictions = classifier.predict(&x_test);
    let scores = classifier.predict_proba(&x_test);

    let accuracy = metrics::accuracy(&y_test, &predictions);
    let roc = metrics::roc_curve(&y_test, &scores)?;
    let precision_recall = metrics::precision_recall_curve(&y_test, &scores)?;

    let inference = LogisticRegression::unpenalized().fit(&x_train, &y_train)?;

    let outcome = ModelOutcome {
        train_size: train.len(),
        test_size: test.len(),
        accuracy,
        confusion: metrics::ConfusionMatrix::from_predictions(&y_test, &predictions),
        roc_auc: metrics::roc_auc(&roc),
        roc,
        average_precision: metrics::average_precision(&precision_recall),
        precision_recall,
        summary: model_summary(&inference),
    };

    info!(
        "Final Model Accuracy: {:.4} (ROC AUC {:.4})",
        outcome.accuracy, outcome.roc_auc
    );

    Ok(outcome)
}
