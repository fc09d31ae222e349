//! The `run` and `sim` commands.

use std::path::Path;

use anyhow::{bail, Result};

use crate::cli::SelectArgs;
use crate::config::Config;
use crate::error::ConfigError;
use crate::fsops::SystemFileOps;
use crate::logging;
use crate::run::{Runner, TagSelection};

/// Load the rule file and run it, for real or as a simulation.
///
/// # Errors
///
/// Returns an error when the rule file cannot be loaded, when every rule
/// is rejected at compile time, or when the run finishes with failures.
pub fn execute(config_path: &Path, args: &SelectArgs, simulate: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    if config.rules.is_empty() {
        bail!("no rules defined in {}", config_path.display());
    }

    let fs = SystemFileOps;
    let runner = Runner::new(&fs, simulate);
    let selection = TagSelection::new(args.tags.clone(), args.skip_tags.clone());
    let report = runner.run(&config, &selection);

    if report.rules_run == 0 && !report.rule_errors.is_empty() {
        for err in &report.rule_errors {
            tracing::error!(rule = %err.rule, "{}", err.message);
        }
        return Err(ConfigError::NoValidRules(format!(
            "{} rule(s) rejected",
            report.rule_errors.len()
        ))
        .into());
    }

    logging::print_summary(&report);
    if report.has_failures() {
        bail!("run finished with failures");
    }
    Ok(())
}
