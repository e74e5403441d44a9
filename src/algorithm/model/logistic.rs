//! Logistic regression fitted by Newton-Raphson
//!
//! The model always includes an intercept. An optional L2 penalty with
//! inverse strength `C` shrinks the feature coefficients (never the
//! intercept); without it the fit is the plain maximum likelihood estimate
//! used for the statistical summary.

use log::{debug, warn};
use ndarray::{Array1, Array2, Axis, s};

use crate::algorithm::model::dataset::FeatureMatrix;
use crate::algorithm::model::linalg::invert;
use crate::error::{CohortError, Result};

/// Logistic regression estimator settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticRegression {
    /// Inverse L2 regularisation strength; `None` fits without penalty
    penalty_c: Option<f64>,
    /// Maximum Newton iterations
    max_iter: usize,
    /// Convergence threshold on the largest parameter update
    tolerance: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            penalty_c: Some(1.0),
            max_iter: 100,
            tolerance: 1e-8,
        }
    }
}

impl LogisticRegression {
    /// Penalised estimator with `C = 1.0`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum likelihood estimator without penalty
    #[must_use]
    pub fn unpenalized() -> Self {
        Self {
            penalty_c: None,
            ..Self::default()
        }
    }

    /// Set the inverse regularisation strength
    #[must_use]
    pub const fn with_penalty_c(mut self, c: f64) -> Self {
        self.penalty_c = Some(c);
        self
    }

    /// Set the maximum number of iterations
    #[must_use]
    pub const fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fit the model to a feature matrix and binary labels
    ///
    /// # Errors
    /// Fails when the data are empty, labels are not 0/1, only one class is
    /// present, or the information matrix becomes singular.
    pub fn fit(&self, x: &FeatureMatrix, y: &[u8]) -> Result<FittedLogistic> {
        self.check_inputs(x, y)?;

        let lambda = match self.penalty_c {
            Some(c) if c > 0.0 && c.is_finite() => 1.0 / c,
            Some(c) => {
                return Err(CohortError::invalid_parameter(format!(
                    "penalty C must be positive and finite, got {c}"
                )));
            }
            None => 0.0,
        };

        let mut design = Array2::<f64>::ones((x.n_rows(), x.values.ncols() + 1));
        design.slice_mut(s![.., 1..]).assign(&x.values);
        let y: Array1<f64> = y.iter().map(|&label| f64::from(label)).collect();
        let mut params = Array1::<f64>::zeros(design.ncols());
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iter {
            iterations += 1;
            let (gradient, hessian) = gradient_and_hessian(&design, &y, &params, lambda);
            let inverse = invert(&hessian).ok_or_else(|| {
                CohortError::model("information matrix is singular; features may be collinear")
            })?;
            let step = inverse.dot(&gradient);

            let max_step = step.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
            params += &step;
            if !max_step.is_finite() {
                return Err(CohortError::model("Newton iteration diverged"));
            }
            if max_step < self.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("Logistic regression converged after {iterations} iterations");
        } else {
            warn!(
                "Logistic regression stopped after {} iterations without converging",
                self.max_iter
            );
        }

        // Covariance from the unpenalised information at the estimate
        let (_, information) = gradient_and_hessian(&design, &y, &params, 0.0);
        let covariance = invert(&information)
            .ok_or_else(|| CohortError::model("information matrix is singular at the estimate"))?;

        Ok(FittedLogistic {
            feature_names: x.names.clone(),
            intercept: params[0],
            coefficients: params.slice(s![1..]).to_owned(),
            covariance,
            iterations,
            converged,
        })
    }

    fn check_inputs(&self, x: &FeatureMatrix, y: &[u8]) -> Result<()> {
        if x.n_rows() == 0 {
            return Err(CohortError::model("cannot fit on zero rows"));
        }
        if x.n_rows() != y.len() {
            return Err(CohortError::model(format!(
                "feature rows ({}) and labels ({}) differ in length",
                x.n_rows(),
                y.len()
            )));
        }
        if x.values.ncols() != x.names.len() {
            return Err(CohortError::model(format!(
                "{} feature names for {} feature columns",
                x.names.len(),
                x.values.ncols()
            )));
        }
        if y.iter().any(|&label| label > 1) {
            return Err(CohortError::model("labels must be 0 or 1"));
        }
        let positives = y.iter().filter(|&&label| label == 1).count();
        if positives == 0 || positives == y.len() {
            return Err(CohortError::model(
                "both outcome classes must be present to fit the classifier",
            ));
        }
        Ok(())
    }
}

/// Gradient of the penalised log-likelihood and the (positive definite) negative Hessian
///
/// # Arguments
/// * `design` - Design matrix with a leading intercept column
/// * `y` - Outcome labels as 0.0/1.0
/// * `params` - Current `[intercept, coefficients...]`
/// * `lambda` - L2 penalty weight on the coefficients
fn gradient_and_hessian(
    design: &Array2<f64>,
    y: &Array1<f64>,
    params: &Array1<f64>,
    lambda: f64,
) -> (Array1<f64>, Array2<f64>) {
    let mu = design.dot(params).mapv(sigmoid);
    let weights = mu.mapv(|m| m * (1.0 - m));

    let mut gradient = design.t().dot(&(y - &mu));
    let weighted = design * &weights.view().insert_axis(Axis(1));
    let mut hessian = design.t().dot(&weighted);

    // Intercept (index 0) is not penalised
    for i in 1..params.len() {
        gradient[i] -= lambda * params[i];
        hessian[[i, i]] += lambda;
    }

    (gradient, hessian)
}

/// Numerically stable logistic function
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// A fitted logistic regression model
#[derive(Debug, Clone, PartialEq)]
pub struct FittedLogistic {
    /// Feature names, in coefficient order
    pub feature_names: Vec<String>,
    /// Intercept term
    pub intercept: f64,
    /// Feature coefficients
    pub coefficients: Array1<f64>,
    /// Covariance of `[intercept, coefficients...]` from the inverse information
    pub covariance: Array2<f64>,
    /// Newton iterations performed
    pub iterations: usize,
    /// Whether the update fell below the tolerance
    pub converged: bool,
}

impl FittedLogistic {
    /// Probability of the positive class for each row
    #[must_use]
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Vec<f64> {
        x.values
            .dot(&self.coefficients)
            .mapv(|eta| sigmoid(self.intercept + eta))
            .to_vec()
    }

    /// Predicted class (1 when the probability exceeds one half)
    #[must_use]
    pub fn predict(&self, x: &FeatureMatrix) -> Vec<u8> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect()
    }

    /// Standard errors of `[intercept, coefficients...]`
    #[must_use]
    pub fn standard_errors(&self) -> Array1<f64> {
        self.covariance.diag().mapv(|v| v.max(0.0).sqrt())
    }
}
