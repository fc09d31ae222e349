//! The `check` command: validate a rule file without running it.

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;
use crate::run::CompiledRule;

/// Load and compile every rule, printing one line per rule.
///
/// # Errors
///
/// Returns an error when the file cannot be loaded or any rule fails to
/// compile.
pub fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    if config.rules.is_empty() {
        bail!("no rules defined in {}", config_path.display());
    }

    let mut bad = 0usize;
    for (index, rule) in config.rules.iter().enumerate() {
        let display = rule.display_name(index);
        match CompiledRule::compile(rule, index) {
            Ok(_) => println!("✓ {display}"),
            Err(err) => {
                bad += 1;
                println!("✗ {display}: {err}");
            }
        }
    }
    println!(
        "{} rule(s), {} invalid",
        config.rules.len(),
        bad
    );
    if bad > 0 {
        bail!("{bad} invalid rule(s) in {}", config_path.display());
    }
    Ok(())
}
