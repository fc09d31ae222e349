//! Write templated text to a file.

use std::path::PathBuf;

use toml::Table;

use crate::actions::{io_error, template_error, Action, ActionEnv, ActionOutcome};
use crate::config::params;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ActionError, ConfigError};
use crate::template::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Append,
    Overwrite,
}

/// Appends (default) or overwrites templated `text` at a templated `path`,
/// with a trailing newline unless `newline = false`. Useful for building
/// run manifests, e.g. one line per processed entry.
#[derive(Debug)]
pub struct WriteAction {
    text: Template,
    path: Template,
    mode: WriteMode,
    newline: bool,
}

impl WriteAction {
    /// Build from raw params: `text` and `path` (required), `mode`
    /// (`"append"` default, or `"overwrite"`), `newline` (default true).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unknown keys, missing required keys or a
    /// malformed template.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "write", &["text", "path", "mode", "newline"])?;
        let text = Template::parse(&params::require_str(table, "write", "text")?)?;
        let path = Template::parse(&params::require_str(table, "write", "path")?)?;
        let mode = match params::opt_str(table, "write", "mode")?.as_deref() {
            None | Some("append") => WriteMode::Append,
            Some("overwrite") => WriteMode::Overwrite,
            Some(other) => {
                return Err(ConfigError::BadParams {
                    capability: "write".into(),
                    message: format!("'mode' must be 'append' or 'overwrite', got '{other}'"),
                })
            }
        };
        let newline = params::opt_bool(table, "write", "newline", true)?;
        Ok(Self {
            text,
            path,
            mode,
            newline,
        })
    }
}

impl Action for WriteAction {
    fn execute(
        &self,
        _entry: &mut Entry,
        ctx: &mut Context,
        env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let mut text = self
            .text
            .render(ctx)
            .map_err(|e| template_error("write", e))?;
        if self.newline {
            text.push('\n');
        }
        let path = PathBuf::from(
            self.path
                .render(ctx)
                .map_err(|e| template_error("write", e))?,
        );

        let detail = format!("{} ({} bytes)", path.display(), text.len());
        if env.simulate {
            env.produced.insert(path);
            return Ok(ActionOutcome::Simulated(format!("would write {detail}")));
        }
        if let Some(parent) = path.parent() {
            env.fs
                .create_dir_all(parent)
                .map_err(|e| io_error("write", parent, e))?;
        }
        match self.mode {
            WriteMode::Append => env.fs.append(&path, &text),
            WriteMode::Overwrite => env.fs.write(&path, &text),
        }
        .map_err(|e| io_error("write", &path, e))?;
        env.produced.insert(path);
        Ok(ActionOutcome::Performed(format!("wrote {detail}")))
    }
}
