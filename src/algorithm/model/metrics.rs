//! Binary classifier evaluation metrics
//!
//! Accuracy, confusion matrix, and the ROC and precision-recall curves with
//! their area summaries, computed from labels and positive-class scores.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{CohortError, Result};

/// Fraction of predictions equal to the labels
#[must_use]
pub fn accuracy(labels: &[u8], predictions: &[u8]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(l, p)| l == p)
        .count();
    correct as f64 / labels.len() as f64
}

/// Counts of the four prediction outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionMatrix {
    /// Negatives predicted negative
    pub true_negative: usize,
    /// Negatives predicted positive
    pub false_positive: usize,
    /// Positives predicted negative
    pub false_negative: usize,
    /// Positives predicted positive
    pub true_positive: usize,
}

impl ConfusionMatrix {
    /// Tally labels against predictions
    #[must_use]
    pub fn from_predictions(labels: &[u8], predictions: &[u8]) -> Self {
        labels
            .iter()
            .zip(predictions)
            .fold(Self::default(), |mut m, (&label, &pred)| {
                match (label, pred) {
                    (0, 0) => m.true_negative += 1,
                    (0, _) => m.false_positive += 1,
                    (_, 0) => m.false_negative += 1,
                    _ => m.true_positive += 1,
                }
                m
            })
    }
}

/// One point of the ROC curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    /// Score threshold (predict positive when `score >= threshold`)
    pub threshold: f64,
    /// False positive rate
    pub false_positive_rate: f64,
    /// True positive rate
    pub true_positive_rate: f64,
}

/// One point of the precision-recall curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecisionRecallPoint {
    /// Score threshold (predict positive when `score >= threshold`)
    pub threshold: f64,
    /// Precision at the threshold
    pub precision: f64,
    /// Recall at the threshold
    pub recall: f64,
}

/// (threshold, false positives, true positives) at each distinct score
type CumulativeCounts = Vec<(f64, usize, usize)>;

/// Cumulative counts from the highest score down, with the total negatives and positives
fn cumulative_counts(labels: &[u8], scores: &[f64]) -> Result<(CumulativeCounts, usize, usize)> {
    if labels.len() != scores.len() {
        return Err(CohortError::model("labels and scores differ in length"));
    }
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(CohortError::model(
            "curves need both positive and negative labels",
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let mut counts = Vec::new();
    let (mut fp, mut tp) = (0, 0);
    for (pos, &i) in order.iter().enumerate() {
        if labels[i] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        let last_of_score = order
            .get(pos + 1)
            .is_none_or(|&next| scores[next] != scores[i]);
        if last_of_score {
            counts.push((scores[i], fp, tp));
        }
    }

    Ok((counts, positives, negatives))
}

/// ROC curve, starting at the origin
pub fn roc_curve(labels: &[u8], scores: &[f64]) -> Result<Vec<RocPoint>> {
    let (counts, positives, negatives) = cumulative_counts(labels, scores)?;

    let mut points = Vec::with_capacity(counts.len() + 1);
    points.push(RocPoint {
        threshold: f64::INFINITY,
        false_positive_rate: 0.0,
        true_positive_rate: 0.0,
    });
    points.extend(counts.into_iter().map(|(threshold, fp, tp)| RocPoint {
        threshold,
        false_positive_rate: fp as f64 / negatives as f64,
        true_positive_rate: tp as f64 / positives as f64,
    }));
    Ok(points)
}

/// Area under a ROC curve by the trapezoidal rule
#[must_use]
pub fn roc_auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| {
            let width = w[1].false_positive_rate - w[0].false_positive_rate;
            width * (w[0].true_positive_rate + w[1].true_positive_rate) / 2.0
        })
        .sum()
}

/// Precision-recall curve, ordered by decreasing threshold
pub fn precision_recall_curve(labels: &[u8], scores: &[f64]) -> Result<Vec<PrecisionRecallPoint>> {
    let (counts, positives, _) = cumulative_counts(labels, scores)?;

    Ok(counts
        .into_iter()
        .map(|(threshold, fp, tp)| PrecisionRecallPoint {
            threshold,
            precision: tp as f64 / (tp + fp) as f64,
            recall: tp as f64 / positives as f64,
        })
        .collect())
}

/// Average precision: precision weighted by each recall increment
#[must_use]
pub fn average_precision(points: &[PrecisionRecallPoint]) -> f64 {
    let mut previous_recall = 0.0;
    let mut total = 0.0;
    for point in points {
        total += (point.recall - previous_recall) * point.precision;
        previous_recall = point.recall;
    }
    total
}
