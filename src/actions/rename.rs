//! Rename the entry in place.

use toml::Table;

use crate::actions::{io_error, template_error, Action, ActionEnv, ActionOutcome};
use crate::config::params;
use crate::conflict::{self, Resolution};
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ActionError, ConfigError};
use crate::template::Template;

/// Renames the entry within its current directory. The rendered name must
/// be a bare file name; use `move` for cross-directory destinations.
#[derive(Debug)]
pub struct RenameAction {
    name: Template,
    policy: Option<crate::conflict::ConflictPolicy>,
}

impl RenameAction {
    /// Build from raw params: `name` (required), `on_conflict` (optional).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unknown keys, a missing `name` or a
    /// malformed template.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "rename", &["name", "on_conflict"])?;
        let name = Template::parse(&params::require_str(table, "rename", "name")?)?;
        let policy = params::opt_policy(table, "rename")?;
        Ok(Self { name, policy })
    }
}

impl Action for RenameAction {
    fn execute(
        &self,
        entry: &mut Entry,
        ctx: &mut Context,
        env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let name = self
            .name
            .render(ctx)
            .map_err(|e| template_error("rename", e))?;
        if name.is_empty() || name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            return Err(ActionError::BadDestination {
                action: "rename".to_string(),
                dest: name,
                message: "must be a bare file name without separators".to_string(),
            });
        }
        let parent = entry
            .path()
            .parent()
            .map_or_else(std::path::PathBuf::new, std::path::Path::to_path_buf);
        let dest = parent.join(&name);
        if dest == entry.path() {
            return Ok(ActionOutcome::Skipped(format!("already named {name}")));
        }
        let policy = self.policy.or(env.policy);
        let target = match conflict::resolve(&dest, policy, env.fs, env.simulate)
            .map_err(|source| ActionError::Conflict {
                action: "rename".to_string(),
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
            return Ok(ActionOutcome::Simulated(format!("would rename {detail}")));
        }
        env.fs
            .move_entry(entry.path(), &target)
            .map_err(|e| io_error("rename", &target, e))?;
        env.produced.insert(target.clone());
        entry.relocate(target, ctx);
        Ok(ActionOutcome::Performed(format!("renamed {detail}")))
    }
}
