//! Stop processing the current entry.

use toml::Table;

use crate::actions::{Action, ActionEnv, ActionOutcome};
use crate::config::params;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ActionError, ConfigError};

/// Halts the entry's action chain. Useful after a conditional branch
/// expressed through filters, or to make a rule explicitly terminal.
#[derive(Debug)]
pub struct StopAction;

impl StopAction {
    /// Build from raw params (none accepted).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] when any parameter is given.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "stop", &[])?;
        Ok(Self)
    }
}

impl Action for StopAction {
    fn execute(
        &self,
        _entry: &mut Entry,
        _ctx: &mut Context,
        _env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        Ok(ActionOutcome::Halt)
    }
}
