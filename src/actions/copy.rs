//! Copy the entry to a templated destination.

use toml::Table;

use crate::actions::{io_error, render_destination, Action, ActionEnv, ActionOutcome};
use crate::config::params;
use crate::conflict::{self, Resolution};
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ActionError, ConfigError};
use crate::template::Template;

/// Copies the entry to `dest` (directories recursively). The entry's
/// tracked path stays on the original; later actions keep operating on it.
#[derive(Debug)]
pub struct CopyAction {
    dest: Template,
    policy: Option<crate::conflict::ConflictPolicy>,
}

impl CopyAction {
    /// Build from raw params: `dest` (required), `on_conflict` (optional).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unknown keys, a missing `dest` or a
    /// malformed template.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "copy", &["dest", "on_conflict"])?;
        let dest = Template::parse(&params::require_str(table, "copy", "dest")?)?;
        let policy = params::opt_policy(table, "copy")?;
        Ok(Self { dest, policy })
    }
}

impl Action for CopyAction {
    fn execute(
        &self,
        entry: &mut Entry,
        ctx: &mut Context,
        env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let dest = render_destination("copy", &self.dest, entry, ctx)?;
        if dest == entry.path() {
            return Ok(ActionOutcome::Skipped(format!(
                "source and destination are the same: {}",
                dest.display()
            )));
        }
        let policy = self.policy.or(env.policy);
        let target = match conflict::resolve(&dest, policy, env.fs, env.simulate)
            .map_err(|source| ActionError::Conflict {
                action: "copy".to_string(),
                source,
            })? {
            Resolution::Skip => {
                return Ok(ActionOutcome::Skipped(format!(
                    "target exists, skipping: {}",
                    dest.display()
                )))
            }
            Resolution::Proceed(target) => target,
        };

        let detail = format!("{} -> {}", entry.path().display(), target.display());
        if env.simulate {
            env.produced.insert(target);
            return Ok(ActionOutcome::Simulated(format!("would copy {detail}")));
        }
        if let Some(parent) = target.parent() {
            env.fs
                .create_dir_all(parent)
                .map_err(|e| io_error("copy", parent, e))?;
        }
        env.fs
            .copy_entry(entry.path(), &target)
            .map_err(|e| io_error("copy", &target, e))?;
        env.produced.insert(target);
        Ok(ActionOutcome::Performed(format!("copied {detail}")))
    }
}
