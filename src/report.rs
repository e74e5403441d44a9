//! Study report files
//!
//! All outputs of a study run land in one directory. Tables are written with
//! the `csv` crate, the run summary with `serde_json`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::algorithm::matching::{BalanceReport, BalanceSummary};
use crate::algorithm::model::{
    ConfusionMatrix, ModelOutcome, PrecisionRecallPoint, PredictorSummary, RocPoint,
};
use crate::error::Result;
use crate::models::MatchedRecord;

pub const MODEL_ACCURACY_FILE: &str = "model_accuracy.txt";
pub const MODEL_SUMMARY_FILE: &str = "model_summary.csv";
pub const MATCHED_CONTROLS_FILE: &str = "matched_controls.csv";
pub const BALANCE_REPORT_FILE: &str = "balance_report.csv";
pub const ROC_CURVE_FILE: &str = "roc_curve.csv";
pub const PRECISION_RECALL_FILE: &str = "precision_recall_curve.csv";
pub const CONFUSION_MATRIX_FILE: &str = "confusion_matrix.csv";
pub const STUDY_SUMMARY_FILE: &str = "study_summary.json";

/// Parameters echoed into the run summary
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSummary {
    pub age_cutoff_lower: f64,
    pub age_cutoff_higher: f64,
    pub age_tolerance: f64,
    pub num_controls: usize,
    pub prediction_range: f64,
    pub seed: u64,
    pub test_fraction: f64,
    pub categorical_features: Vec<String>,
    pub continuous_features: Vec<String>,
    pub exclude_diagnosed_controls: bool,
}

/// Machine-readable overview of one study run
#[derive(Debug, Clone, Serialize)]
pub struct StudySummary {
    pub parameters: ParameterSummary,
    /// Cases before the onset age filter
    pub cases_loaded: usize,
    /// Cases passed to the matcher
    pub cases_eligible: usize,
    /// Candidate controls passed to the matcher
    pub control_pool_size: usize,
    /// Cases that received at least one control
    pub cases_matched: usize,
    /// Cases that received fewer controls than requested
    pub cases_with_shortfall: usize,
    pub matched_controls: usize,
    pub matching_seconds: f64,
    pub balance: BalanceSummary,
    pub model: ModelOutcome,
}

#[derive(Serialize)]
struct ConfusionRow<'a> {
    #[serde(rename = "Actual")]
    actual: &'a str,
    #[serde(rename = "Predicted 0")]
    predicted_negative: usize,
    #[serde(rename = "Predicted 1")]
    predicted_positive: usize,
}

/// Writes report files into an output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create the writer, creating the directory if needed
    pub fn create(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Full path of a report file
    #[must_use]
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// `Final Model Accuracy: <acc>` on a single line
    pub fn write_accuracy(&self, accuracy: f64) -> Result<()> {
        let path = self.path(MODEL_ACCURACY_FILE);
        let mut file = File::create(&path)?;
        writeln!(file, "Final Model Accuracy: {accuracy}")?;
        debug_written(&path);
        Ok(())
    }

    /// Predictor table of the unpenalised fit
    pub fn write_model_summary(&self, summary: &[PredictorSummary]) -> Result<()> {
        self.write_rows(MODEL_SUMMARY_FILE, summary)
    }

    /// Matched controls in allocation order
    pub fn write_matched_controls(&self, records: &[MatchedRecord]) -> Result<()> {
        self.write_rows(MATCHED_CONTROLS_FILE, records)
    }

    /// Covariate balance table
    pub fn write_balance(&self, report: &BalanceReport) -> Result<()> {
        let path = self.path(BALANCE_REPORT_FILE);
        report.write_to_csv(&path)?;
        debug_written(&path);
        Ok(())
    }

    /// ROC curve points
    pub fn write_roc_curve(&self, points: &[RocPoint]) -> Result<()> {
        self.write_rows(ROC_CURVE_FILE, points)
    }

    /// Precision-recall curve points
    pub fn write_precision_recall_curve(&self, points: &[PrecisionRecallPoint]) -> Result<()> {
        self.write_rows(PRECISION_RECALL_FILE, points)
    }

    /// 2x2 confusion matrix, rows are actual classes
    pub fn write_confusion_matrix(&self, matrix: &ConfusionMatrix) -> Result<()> {
        let rows = [
            ConfusionRow {
                actual: "0",
                predicted_negative: matrix.true_negative,
                predicted_positive: matrix.false_positive,
            },
            ConfusionRow {
                actual: "1",
                predicted_negative: matrix.false_negative,
                predicted_positive: matrix.true_positive,
            },
        ];
        self.write_rows(CONFUSION_MATRIX_FILE, &rows)
    }

    /// Run summary as pretty-printed JSON
    pub fn write_summary(&self, summary: &StudySummary) -> Result<()> {
        let path = self.path(STUDY_SUMMARY_FILE);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, summary)?;
        writer.flush()?;
        debug_written(&path);
        Ok(())
    }

    /// Write every report of a finished run
    pub fn write_all(
        &self,
        records: &[MatchedRecord],
        balance: &BalanceReport,
        summary: &StudySummary,
    ) -> Result<()> {
        let model = &summary.model;
        self.write_matched_controls(records)?;
        self.write_balance(balance)?;
        self.write_accuracy(model.accuracy)?;
        self.write_model_summary(&model.summary)?;
        self.write_roc_curve(&model.roc)?;
        self.write_precision_recall_curve(&model.precision_recall)?;
        self.write_confusion_matrix(&model.confusion)?;
        self.write_summary(summary)?;

        info!("Reports written to {}", self.output_dir.display());
        Ok(())
    }

    fn write_rows<T: Serialize>(&self, file_name: &str, rows: &[T]) -> Result<()> {
        let path = self.path(file_name);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug_written(&path);
        Ok(())
    }
}

fn debug_written(path: &Path) {
    log::debug!("Wrote {}", path.display());
}
