//! Command line arguments for the study binary

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use dementia_cohort::algorithm::model::Feature;
use dementia_cohort::config::{CaseSource, CohortConfig, StudyConfig};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "dementia-cohort",
    version,
    about = "Build a matched dementia case-control cohort and fit an age/sex risk model",
    long_about = "Derive dementia cases from recurrent diagnoses (or read precomputed cases),\n\
                  match each case to age- and sex-matched controls without replacement,\n\
                  and fit a logistic regression on the matched cohort."
)]
pub struct Cli {
    /// Table of candidate controls (person_id, gender, age)
    #[arg(long, value_name = "PATH")]
    pub controls_file: PathBuf,

    /// Table of dementia diagnoses (person_id, condition_start_date)
    #[arg(long, value_name = "PATH", requires = "demographics_file", conflicts_with = "cases_file")]
    pub dementia_file: Option<PathBuf>,

    /// Table of demographics (person_id, year/month/day_of_birth, gender)
    #[arg(long, value_name = "PATH", requires = "dementia_file")]
    pub demographics_file: Option<PathBuf>,

    /// Table of precomputed cases (person_id, gender, condition_start_age)
    #[arg(long, value_name = "PATH")]
    pub cases_file: Option<PathBuf>,

    /// Cases must have an onset age above this
    #[arg(long, default_value_t = 45.0)]
    pub age_cutoff_lower: f64,

    /// Cases must have an onset age below this
    #[arg(long, default_value_t = 85.0)]
    pub age_cutoff_higher: f64,

    /// Controls requested per case
    #[arg(long, default_value_t = 25)]
    pub num_controls: usize,

    /// Maximum age difference in years between a case and its controls
    #[arg(long, default_value_t = 1.0)]
    pub age_tolerance: f64,

    /// Years subtracted from age to build the age_model feature
    #[arg(long, default_value_t = 3.0)]
    pub prediction_range: f64,

    /// Features passed to the model unscaled
    #[arg(long, value_delimiter = ',', default_value = "gender")]
    pub categorical_columns: Vec<Feature>,

    /// Features standardised before fitting
    #[arg(long, value_delimiter = ',', default_value = "age_model")]
    pub continuous_columns: Vec<Feature>,

    /// Directory receiving the reports
    #[arg(long, value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Seed for shuffling and the train/test split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of the matched cohort held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Remove everyone with a dementia diagnosis from the control pool
    #[arg(long)]
    pub exclude_diagnosed_controls: bool,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Log level requested on the command line, if any
    pub fn log_level(&self) -> Option<LevelFilter> {
        match (self.quiet, self.verbose) {
            (true, _) => Some(LevelFilter::Warn),
            (false, 0) => None,
            (false, 1) => Some(LevelFilter::Debug),
            (false, _) => Some(LevelFilter::Trace),
        }
    }

    /// Assemble the validated study configuration
    pub fn study_config(&self) -> anyhow::Result<StudyConfig> {
        let case_source = match (&self.dementia_file, &self.demographics_file, &self.cases_file) {
            (Some(dementia_file), Some(demographics_file), None) => CaseSource::Diagnoses {
                dementia_file: dementia_file.clone(),
                demographics_file: demographics_file.clone(),
            },
            (None, None, Some(cases_file)) => CaseSource::Precomputed {
                cases_file: cases_file.clone(),
            },
            _ => bail!(
                "supply either --dementia-file with --demographics-file, or --cases-file"
            ),
        };

        let cohort = CohortConfig::builder()
            .age_cutoffs(self.age_cutoff_lower, self.age_cutoff_higher)
            .age_tolerance(self.age_tolerance)
            .num_controls(self.num_controls)
            .prediction_range(self.prediction_range)
            .build()?;

        let config = StudyConfig {
            cohort,
            controls_file: self.controls_file.clone(),
            case_source,
            output_dir: self.output_dir.clone(),
            categorical_features: self.categorical_columns.clone(),
            continuous_features: self.continuous_columns.clone(),
            seed: self.seed,
            test_fraction: self.test_fraction,
            exclude_diagnosed_controls: self.exclude_diagnosed_controls,
            show_progress: !(self.no_progress || self.quiet),
        };
        config.validate()?;
        Ok(config)
    }
}
