//! End-to-end study pipeline
//!
//! load → derive cases → filter → match → balance → model → write reports

use std::time::Instant;

use log::info;
use rustc_hash::FxHashSet;

use crate::algorithm::health::derive_cases;
use crate::algorithm::matching::{
    BalanceReport, Matcher, MatchingCriteria, MatchingResult, assess_balance, filter_cases,
};
use crate::algorithm::model::{Feature, ModelOptions, ModelOutcome, fit_and_evaluate};
use crate::config::{CaseSource, StudyConfig};
use crate::error::Result;
use crate::loader;
use crate::models::{Case, Control, PersonId};
use crate::report::{ParameterSummary, ReportWriter, StudySummary};

/// Everything a study run produced
#[derive(Debug, Clone)]
pub struct StudyOutcome {
    /// Cases that passed the onset age filter, in matching order
    pub cases: Vec<Case>,
    /// Allocation of controls to cases
    pub matching: MatchingResult,
    /// Covariate balance after matching
    pub balance: BalanceReport,
    /// Summary also written as `study_summary.json`
    pub summary: StudySummary,
}

impl StudyOutcome {
    /// Classifier results
    #[must_use]
    pub const fn model(&self) -> &ModelOutcome {
        &self.summary.model
    }
}

/// Cases together with every identifier that must stay out of the control pool
struct LoadedCases {
    cases: Vec<Case>,
    diagnosed_ids: FxHashSet<PersonId>,
}

fn load_cases(source: &CaseSource) -> Result<LoadedCases> {
    match source {
        CaseSource::Diagnoses {
            dementia_file,
            demographics_file,
        } => {
            let events = loader::load_diagnosis_events(dementia_file)?;
            let demographics = loader::load_demographics(demographics_file)?;
            let derivation = derive_cases(&events, &demographics)?;
            Ok(LoadedCases {
                cases: derivation.cases,
                diagnosed_ids: derivation.diagnosed_ids,
            })
        }
        CaseSource::Precomputed { cases_file } => {
            let cases = loader::load_cases(cases_file)?;
            let diagnosed_ids = cases.iter().map(|c| c.person_id.clone()).collect();
            Ok(LoadedCases {
                cases,
                diagnosed_ids,
            })
        }
    }
}

fn exclude_diagnosed(controls: &mut Vec<Control>, diagnosed: &FxHashSet<PersonId>) {
    let before = controls.len();
    controls.retain(|c| !diagnosed.contains(&c.person_id));
    info!(
        "Excluded {} diagnosed persons from the control pool ({} remain)",
        before - controls.len(),
        controls.len()
    );
}

/// Run a full study and write its reports to `config.output_dir`
///
/// # Arguments
/// * `config` - Input files, cohort parameters and modelling settings
///
/// # Returns
/// The eligible cases, matching result, balance report and run summary
///
/// # Errors
/// Fails on invalid parameters before any file is read, and on unreadable
/// or malformed inputs, a model that cannot be fitted or unwritable reports.
pub fn run_study(config: &StudyConfig) -> Result<StudyOutcome> {
    config.validate()?;
    let start = Instant::now();
    let cohort = &config.cohort;
    info!("{cohort}");

    let mut controls = loader::load_controls(&config.controls_file)?;
    let loaded = load_cases(&config.case_source)?;
    if config.exclude_diagnosed_controls {
        exclude_diagnosed(&mut controls, &loaded.diagnosed_ids);
    }

    let cases = filter_cases(&loaded.cases, cohort.age_cutoff_lower, cohort.age_cutoff_higher)?;

    let matching = Matcher::new(MatchingCriteria::from_config(cohort)?)
        .with_progress(config.show_progress)
        .match_all(&controls, &cases)?;

    let balance = assess_balance(&cases, &matching.records);
    info!("{balance}");

    let model = fit_and_evaluate(
        &cases,
        &matching.records,
        &ModelOptions {
            prediction_range: cohort.prediction_range,
            categorical: config.categorical_features.clone(),
            continuous: config.continuous_features.clone(),
            seed: config.seed,
            test_fraction: config.test_fraction,
        },
    )?;

    let summary = StudySummary {
        parameters: ParameterSummary {
            age_cutoff_lower: cohort.age_cutoff_lower,
            age_cutoff_higher: cohort.age_cutoff_higher,
            age_tolerance: cohort.age_tolerance,
            num_controls: cohort.num_controls,
            prediction_range: cohort.prediction_range,
            seed: config.seed,
            test_fraction: config.test_fraction,
            categorical_features: feature_names(&config.categorical_features),
            continuous_features: feature_names(&config.continuous_features),
            exclude_diagnosed_controls: config.exclude_diagnosed_controls,
        },
        cases_loaded: loaded.cases.len(),
        cases_eligible: cases.len(),
        control_pool_size: controls.len(),
        cases_matched: matching.matched_case_count(),
        cases_with_shortfall: matching.shortfall_cases().count(),
        matched_controls: matching.matched_control_count(),
        matching_seconds: matching.matching_time.as_secs_f64(),
        balance: balance.summary.clone(),
        model,
    };

    ReportWriter::create(&config.output_dir)?.write_all(&matching.records, &balance, &summary)?;

    info!("Study completed in {:.2?}", start.elapsed());
    Ok(StudyOutcome {
        cases,
        matching,
        balance,
        summary,
    })
}

fn feature_names(features: &[Feature]) -> Vec<String> {
    features.iter().map(|f| f.name().to_string()).collect()
}
