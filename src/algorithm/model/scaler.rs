//! Standard scaling of continuous features

use ndarray::{Array1, Array2, Axis};

use crate::error::{CohortError, Result};

/// Per-column centring and scaling fitted on derivation data
///
/// Uses the population standard deviation. Constant columns are centred
/// but left unscaled.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl StandardScaler {
    /// Fit column means and standard deviations
    pub fn fit(values: &Array2<f64>) -> Result<Self> {
        let means = values
            .mean_axis(Axis(0))
            .ok_or_else(|| CohortError::model("cannot fit a scaler on zero rows"))?;
        let scales = values
            .std_axis(Axis(0), 0.0)
            .mapv(|std| if std > 0.0 { std } else { 1.0 });

        Ok(Self { means, scales })
    }

    /// Apply the fitted transformation
    #[must_use]
    pub fn transform(&self, values: &Array2<f64>) -> Array2<f64> {
        (values - &self.means) / &self.scales
    }

    /// Fitted column means
    #[must_use]
    pub const fn means(&self) -> &Array1<f64> {
        &self.means
    }

    /// Fitted column scales
    #[must_use]
    pub const fn scales(&self) -> &Array1<f64> {
        &self.scales
    }
}
