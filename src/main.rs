use anyhow::Context;
use clap::Parser;
use log::info;

mod cli;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; -v/-q override RUST_LOG
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = cli.log_level() {
        builder.filter_level(level);
    }
    builder.init();

    let config = cli.study_config().context("Invalid study configuration")?;
    let outcome = dementia_cohort::run_study(&config).context("Study run failed")?;

    let model = outcome.model();
    info!(
        "Matched {} controls to {} of {} cases; test accuracy {:.4}, ROC AUC {:.4}",
        outcome.matching.matched_control_count(),
        outcome.matching.matched_case_count(),
        outcome.cases.len(),
        model.accuracy,
        model.roc_auc
    );

    Ok(())
}
