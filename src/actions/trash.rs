//! Move the entry to the system trash.

use toml::Table;

use crate::actions::{io_error, Action, ActionEnv, ActionOutcome};
use crate::config::params;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ActionError, ConfigError};

/// Sends the entry to the platform trash / recycle bin. Terminal: the
/// registry only accepts it as the last action of a rule.
#[derive(Debug)]
pub struct TrashAction;

impl TrashAction {
    /// Build from raw params (none accepted).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] when any parameter is given.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "trash", &[])?;
        Ok(Self)
    }
}

impl Action for TrashAction {
    fn execute(
        &self,
        entry: &mut Entry,
        _ctx: &mut Context,
        env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let detail = entry.path().display().to_string();
        if env.simulate {
            return Ok(ActionOutcome::Simulated(format!("would trash {detail}")));
        }
        env.fs
            .trash(entry.path())
            .map_err(|e| io_error("trash", entry.path(), e))?;
        Ok(ActionOutcome::Performed(format!("trashed {detail}")))
    }
}
