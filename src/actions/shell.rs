//! Run a templated shell command for the entry.

use std::collections::BTreeMap;

use toml::Table;

use crate::actions::{template_error, Action, ActionEnv, ActionOutcome};
use crate::config::params;
use crate::context::{Context, Value};
use crate::entry::Entry;
use crate::error::{ActionError, ConfigError};
use crate::exec;
use crate::template::Template;

/// Runs `command` through the platform shell after template rendering.
///
/// The command's trimmed stdout and exit code are published to the context
/// as `shell.output` and `shell.returncode` for later actions. A non-zero
/// exit fails the action. Never executed in simulate mode.
#[derive(Debug)]
pub struct ShellAction {
    command: Template,
}

impl ShellAction {
    /// Build from raw params: `command` (required).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unknown keys, a missing `command` or a
    /// malformed template.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "shell", &["command"])?;
        let command = Template::parse(&params::require_str(table, "shell", "command")?)?;
        Ok(Self { command })
    }
}

impl Action for ShellAction {
    fn execute(
        &self,
        _entry: &mut Entry,
        ctx: &mut Context,
        env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let command = self
            .command
            .render(ctx)
            .map_err(|e| template_error("shell", e))?;
        if env.simulate {
            return Ok(ActionOutcome::Simulated(format!("would run `{command}`")));
        }
        let result = exec::run_shell(&command).map_err(|e| ActionError::Shell {
            code: None,
            stderr: e.to_string(),
        })?;
        let mut table = BTreeMap::new();
        table.insert("output".to_string(), Value::from(result.stdout.clone()));
        table.insert(
            "returncode".to_string(),
            Value::Int(i64::from(result.code.unwrap_or(-1))),
        );
        ctx.insert("shell", Value::Table(table));
        if result.success() {
            Ok(ActionOutcome::Performed(format!("ran `{command}`")))
        } else {
            Err(ActionError::Shell {
                code: result.code,
                stderr: result.stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use crate::entry::EntryKind;
    use crate::fsops::MockFileOps;
    use crate::walker::ProducedPaths;

    fn fixture() -> (Entry, Context) {
        let mut e = Entry::fake(
            Path::new("/inbox"),
            PathBuf::from("/inbox/a.txt"),
            EntryKind::File,
            0,
            None,
            None,
        );
        let mut ctx = Context::new();
        e.seed_context(&mut ctx);
        (e, ctx)
    }

    #[test]
    #[cfg(unix)]
    fn publishes_output_and_returncode() {
        let fs = MockFileOps::new();
        let produced = ProducedPaths::new();
        let env = ActionEnv {
            simulate: false,
            policy: None,
            fs: &fs,
            produced: &produced,
        };
        let (mut e, mut ctx) = fixture();

        let table: Table = r#"command = "printf {filename}""#.parse().unwrap();
        let out = ShellAction::from_params(&table)
            .unwrap()
            .execute(&mut e, &mut ctx, &env)
            .unwrap();
        assert!(matches!(out, ActionOutcome::Performed(_)));
        assert_eq!(
            ctx.get("shell.output").and_then(Value::render).as_deref(),
            Some("a.txt")
        );
        assert_eq!(
            ctx.get("shell.returncode").and_then(Value::render).as_deref(),
            Some("0")
        );
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_fails_the_action() {
        let fs = MockFileOps::new();
        let produced = ProducedPaths::new();
        let env = ActionEnv {
            simulate: false,
            policy: None,
            fs: &fs,
            produced: &produced,
        };
        let (mut e, mut ctx) = fixture();

        let table: Table = r#"command = "false""#.parse().unwrap();
        let err = ShellAction::from_params(&table)
            .unwrap()
            .execute(&mut e, &mut ctx, &env)
            .unwrap_err();
        assert!(matches!(err, ActionError::Shell { code: Some(_), .. }));
    }

    #[test]
    fn simulate_never_spawns_the_command() {
        let fs = MockFileOps::new();
        let produced = ProducedPaths::new();
        let env = ActionEnv {
            simulate: true,
            policy: None,
            fs: &fs,
            produced: &produced,
        };
        let (mut e, mut ctx) = fixture();

        let table: Table = r#"command = "rm -rf /should/never/run""#.parse().unwrap();
        let out = ShellAction::from_params(&table)
            .unwrap()
            .execute(&mut e, &mut ctx, &env)
            .unwrap();
        assert!(matches!(out, ActionOutcome::Simulated(_)));
        assert!(ctx.get("shell").is_none());
    }
}
