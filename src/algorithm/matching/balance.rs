//! Balance assessment for case-control matching
//!
//! This module measures how well the matched controls resemble the cases on
//! the matching covariates (age and sex), using standardized differences.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::models::{Case, Gender, MatchedRecord};

/// Metric for balance between cases and controls for a single covariate
#[derive(Debug, Clone, Serialize)]
pub struct BalanceMetric {
    /// Name of the covariate
    pub name: String,

    /// Standardized difference between case and control groups
    pub standardized_difference: f64,

    /// Mean (or proportion) for cases
    pub case_mean: f64,

    /// Mean (or proportion) for controls
    pub control_mean: f64,

    /// Standard deviation for cases
    pub case_std: f64,

    /// Standard deviation for controls
    pub control_std: f64,

    /// Whether the covariate is categorical
    pub categorical: bool,
}

/// Summary statistics for a balance report
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSummary {
    /// Number of covariates with absolute standardized difference above the threshold
    pub imbalanced_covariates: usize,

    /// Maximum absolute standardized difference
    pub max_standardized_difference: f64,

    /// Mean absolute standardized difference
    pub mean_absolute_standardized_difference: f64,

    /// Total number of covariates
    pub total_covariates: usize,
}

/// Report on balance between cases and controls
#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    /// Balance metrics for each covariate
    pub metrics: Vec<BalanceMetric>,

    /// Summary statistics
    pub summary: BalanceSummary,
}

#[derive(Serialize)]
struct BalanceRow<'a> {
    #[serde(rename = "Covariate")]
    covariate: &'a str,
    #[serde(rename = "Type")]
    kind: &'a str,
    #[serde(rename = "Case Mean")]
    case_mean: f64,
    #[serde(rename = "Control Mean")]
    control_mean: f64,
    #[serde(rename = "Case SD")]
    case_std: f64,
    #[serde(rename = "Control SD")]
    control_std: f64,
    #[serde(rename = "Std Diff")]
    standardized_difference: f64,
}

impl BalanceReport {
    /// Metrics ordered by absolute standardized difference, largest first
    #[must_use]
    pub fn sorted_metrics(&self) -> Vec<&BalanceMetric> {
        let mut sorted: Vec<&BalanceMetric> = self.metrics.iter().collect();
        sorted.sort_by(|a, b| {
            b.standardized_difference
                .abs()
                .partial_cmp(&a.standardized_difference.abs())
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }

    /// Write the metrics table to a CSV file
    pub fn write_to_csv(&self, file_path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(file_path)?;
        for metric in self.sorted_metrics() {
            writer.serialize(BalanceRow {
                covariate: &metric.name,
                kind: covariate_type(metric),
                case_mean: metric.case_mean,
                control_mean: metric.control_mean,
                case_std: metric.case_std,
                control_std: metric.control_std,
                standardized_difference: metric.standardized_difference,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Balance Summary:\n\
             - Total covariates: {}\n\
             - Imbalanced covariates: {}\n\
             - Maximum standardized difference: {:.4}\n\
             - Mean absolute standardized difference: {:.4}\n",
            self.summary.total_covariates,
            self.summary.imbalanced_covariates,
            self.summary.max_standardized_difference,
            self.summary.mean_absolute_standardized_difference
        )?;

        writeln!(
            f,
            "Covariate      | Type        | Case Mean | Control Mean | Case SD  | Control SD | Std Diff"
        )?;
        writeln!(
            f,
            "---------------|-------------|-----------|--------------|----------|------------|----------"
        )?;

        for metric in self.sorted_metrics() {
            writeln!(
                f,
                "{:<14} | {:<11} | {:>9.4} | {:>12.4} | {:>8.4} | {:>10.4} | {:>8.4}",
                metric.name,
                covariate_type(metric),
                metric.case_mean,
                metric.control_mean,
                metric.case_std,
                metric.control_std,
                metric.standardized_difference
            )?;
        }
        Ok(())
    }
}

const fn covariate_type(metric: &BalanceMetric) -> &'static str {
    if metric.categorical {
        "Categorical"
    } else {
        "Continuous"
    }
}

/// Calculator for balance metrics between case and control groups
#[derive(Debug, Clone)]
pub struct BalanceCalculator {
    /// Minimum required observations per group for calculating balance
    min_observations: usize,

    /// Threshold for marking a covariate as imbalanced
    imbalance_threshold: f64,
}

impl Default for BalanceCalculator {
    fn default() -> Self {
        Self {
            min_observations: 2,
            imbalance_threshold: 0.1,
        }
    }
}

impl BalanceCalculator {
    /// Create a new balance calculator with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum required observations per group
    #[must_use]
    pub const fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    /// Set threshold for marking a covariate as imbalanced
    #[must_use]
    pub const fn with_imbalance_threshold(mut self, threshold: f64) -> Self {
        self.imbalance_threshold = threshold;
        self
    }

    /// Calculate age and sex balance between cases and their matched controls
    #[must_use]
    pub fn calculate_balance(&self, cases: &[Case], controls: &[MatchedRecord]) -> BalanceReport {
        let mut metrics = Vec::with_capacity(2);

        if cases.len() < self.min_observations || controls.len() < self.min_observations {
            warn!(
                "Too few observations for balance assessment (cases: {}, controls: {})",
                cases.len(),
                controls.len()
            );
        } else {
            let case_ages: Vec<f64> = cases.iter().map(Case::age).collect();
            let control_ages: Vec<f64> = controls.iter().map(|r| r.age).collect();
            metrics.push(numeric_metric("age", &case_ages, &control_ages));

            let case_male = proportion(cases.iter().map(|c| c.gender));
            let control_male = proportion(controls.iter().map(|r| r.gender));
            metrics.push(proportion_metric("gender_M", case_male, control_male));
        }

        let summary = self.calculate_summary_statistics(&metrics);

        info!(
            "Balance assessment complete: {} of {} covariates are imbalanced (stdiff > {})",
            summary.imbalanced_covariates, summary.total_covariates, self.imbalance_threshold
        );

        BalanceReport { metrics, summary }
    }

    /// Calculate summary statistics for a set of balance metrics
    fn calculate_summary_statistics(&self, metrics: &[BalanceMetric]) -> BalanceSummary {
        let mut imbalanced = 0;
        let mut max_std_diff: f64 = 0.0;
        let mut sum_abs_std_diff = 0.0;

        for metric in metrics {
            let abs_std_diff = metric.standardized_difference.abs();
            if abs_std_diff > self.imbalance_threshold {
                imbalanced += 1;
            }
            max_std_diff = max_std_diff.max(abs_std_diff);
            sum_abs_std_diff += abs_std_diff;
        }

        let mean_abs_std_diff = if metrics.is_empty() {
            0.0
        } else {
            sum_abs_std_diff / metrics.len() as f64
        };

        BalanceSummary {
            imbalanced_covariates: imbalanced,
            max_standardized_difference: max_std_diff,
            mean_absolute_standardized_difference: mean_abs_std_diff,
            total_covariates: metrics.len(),
        }
    }
}

/// Assess balance with the default calculator
#[must_use]
pub fn assess_balance(cases: &[Case], controls: &[MatchedRecord]) -> BalanceReport {
    BalanceCalculator::default().calculate_balance(cases, controls)
}

fn numeric_metric(name: &str, case_values: &[f64], control_values: &[f64]) -> BalanceMetric {
    let case_mean = calculate_mean(case_values);
    let control_mean = calculate_mean(control_values);
    let case_std = calculate_std_dev(case_values, case_mean);
    let control_std = calculate_std_dev(control_values, control_mean);

    BalanceMetric {
        name: name.to_string(),
        standardized_difference: calculate_standardized_difference(
            case_mean,
            control_mean,
            case_std,
            control_std,
        ),
        case_mean,
        control_mean,
        case_std,
        control_std,
        categorical: false,
    }
}

fn proportion_metric(name: &str, case_proportion: f64, control_proportion: f64) -> BalanceMetric {
    let case_std = (case_proportion * (1.0 - case_proportion)).sqrt();
    let control_std = (control_proportion * (1.0 - control_proportion)).sqrt();

    BalanceMetric {
        name: name.to_string(),
        standardized_difference: calculate_standardized_difference(
            case_proportion,
            control_proportion,
            case_std,
            control_std,
        ),
        case_mean: case_proportion,
        control_mean: control_proportion,
        case_std,
        control_std,
        categorical: true,
    }
}

fn proportion(genders: impl Iterator<Item = Gender>) -> f64 {
    let (male, total) = genders.fold((0usize, 0usize), |(male, total), g| {
        (male + usize::from(g == Gender::Male), total + 1)
    });
    if total == 0 {
        0.0
    } else {
        male as f64 / total as f64
    }
}

/// Calculate the mean of a slice of values
fn calculate_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the sample standard deviation of a slice of values
fn calculate_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let variance =
        values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Calculate the standardized difference between two groups
fn calculate_standardized_difference(mean1: f64, mean2: f64, std1: f64, std2: f64) -> f64 {
    if std1 == 0.0 && std2 == 0.0 {
        return 0.0; // Both are constants, no difference
    }

    let pooled_std = (std2.mul_add(std2, std1.powi(2)) / 2.0).sqrt();

    if pooled_std > 0.0 {
        (mean1 - mean2) / pooled_std
    } else {
        0.0
    }
}
