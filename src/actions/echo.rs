//! Log a templated message for the entry.

use toml::Table;

use crate::actions::{template_error, Action, ActionEnv, ActionOutcome};
use crate::config::params;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ActionError, ConfigError};
use crate::template::Template;

/// Renders `message` and records it. Read-only, so it behaves the same in
/// simulate and real mode.
#[derive(Debug)]
pub struct EchoAction {
    message: Template,
}

impl EchoAction {
    /// Build from raw params: `message` (required).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unknown keys, a missing `message` or a
    /// malformed template.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "echo", &["message"])?;
        let message = Template::parse(&params::require_str(table, "echo", "message")?)?;
        Ok(Self { message })
    }
}

impl Action for EchoAction {
    fn execute(
        &self,
        _entry: &mut Entry,
        ctx: &mut Context,
        _env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let message = self
            .message
            .render(ctx)
            .map_err(|e| template_error("echo", e))?;
        tracing::info!(%message, "echo");
        Ok(ActionOutcome::Performed(message))
    }
}
