//! Statistical summary of a fitted logistic regression
//!
//! Wald tests and 95% confidence intervals for each predictor, reported on
//! the odds-ratio scale.

use serde::Serialize;

use crate::algorithm::model::logistic::FittedLogistic;

/// Two-sided 97.5% standard normal quantile
const Z_975: f64 = 1.959_963_984_540_054;

/// Summary row for one predictor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictorSummary {
    /// Predictor name
    #[serde(rename = "Predictor Variable")]
    pub predictor: String,
    /// Log-odds coefficient
    #[serde(rename = "Beta Coefficient")]
    pub beta: f64,
    /// Two-sided Wald p-value
    #[serde(rename = "p-value")]
    pub p_value: f64,
    /// `exp(beta)`
    #[serde(rename = "Odds Ratio")]
    pub odds_ratio: f64,
    /// Lower bound of the 95% odds-ratio interval
    #[serde(rename = "2.5% CI")]
    pub ci_lower: f64,
    /// Upper bound of the 95% odds-ratio interval
    #[serde(rename = "97.5% CI")]
    pub ci_upper: f64,
}

/// Summarise every predictor (the intercept is omitted), rounded to 3 decimals
#[must_use]
pub fn model_summary(model: &FittedLogistic) -> Vec<PredictorSummary> {
    let errors = model.standard_errors();

    model
        .feature_names
        .iter()
        .zip(model.coefficients.iter())
        .zip(errors.iter().skip(1))
        .map(|((name, &beta), &se)| {
            let z = beta / se;
            PredictorSummary {
                predictor: name.clone(),
                beta: round3(beta),
                p_value: round3(two_sided_p_value(z)),
                odds_ratio: round3(beta.exp()),
                ci_lower: round3((beta - Z_975 * se).exp()),
                ci_upper: round3((beta + Z_975 * se).exp()),
            }
        })
        .collect()
}

/// Two-sided p-value of a standard normal statistic
#[must_use]
pub fn two_sided_p_value(z: f64) -> f64 {
    if z.is_nan() {
        return f64::NAN;
    }
    erfc(z.abs() / std::f64::consts::SQRT_2)
}

/// Complementary error function (Chebyshev fit, relative error below 1.2e-7)
#[must_use]
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let r = t * poly.exp();
    if x >= 0.0 { r } else { 2.0 - r }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
