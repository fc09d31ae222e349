//! The action chain: operations applied to entries that matched a rule.
//!
//! Actions run in declaration order. Path-changing actions update the
//! entry's tracked path so later actions in the chain operate on the new
//! location. In simulate mode every action previews against the original
//! pre-run state and nothing on disk changes.

pub mod copy;
pub mod delete;
pub mod echo;
pub mod r#move;
pub mod rename;
pub mod shell;
pub mod stop;
pub mod trash;
pub mod write;

use std::path::{Path, PathBuf};

use crate::conflict::ConflictPolicy;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ActionError, TemplateError};
use crate::fsops::FileOps;
use crate::report::{ActionRecord, ActionStatus};
use crate::template::Template;
use crate::walker::ProducedPaths;

/// Everything an action needs beyond the entry itself.
#[derive(Debug)]
pub struct ActionEnv<'a> {
    /// Preview mode; actions must not touch the filesystem.
    pub simulate: bool,
    /// Rule-level conflict policy, overridable per action.
    pub policy: Option<ConflictPolicy>,
    /// Filesystem boundary.
    pub fs: &'a dyn FileOps,
    /// Run-scoped set of paths produced by earlier actions.
    pub produced: &'a ProducedPaths,
}

/// What a single action did (or would do) to one entry.
#[derive(Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran for real.
    Performed(String),
    /// Simulate mode: the action would have done this.
    Simulated(String),
    /// A conflict policy or a no-op condition skipped this action only.
    Skipped(String),
    /// Stop processing this entry's remaining actions.
    Halt,
}

/// One operation in a rule's action chain.
pub trait Action: Send + Sync + std::fmt::Debug {
    /// Apply the action to `entry`, honoring `env.simulate`.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] on filesystem, template, conflict or
    /// process failure; the entry's remaining actions are then abandoned.
    fn execute(
        &self,
        entry: &mut Entry,
        ctx: &mut Context,
        env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError>;
}

/// An action with the config name it was compiled from.
#[derive(Debug)]
pub struct CompiledAction {
    name: String,
    inner: Box<dyn Action>,
}

impl CompiledAction {
    #[must_use]
    pub fn new(name: impl Into<String>, inner: Box<dyn Action>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of running a whole chain against one entry.
#[derive(Debug)]
pub struct ChainResult {
    /// Per-action records in execution order.
    pub records: Vec<ActionRecord>,
    /// The error that aborted the chain, if any.
    pub error: Option<ActionError>,
}

/// The ordered actions of one rule.
#[derive(Debug)]
pub struct ActionChain {
    actions: Vec<CompiledAction>,
}

impl ActionChain {
    #[must_use]
    pub fn new(actions: Vec<CompiledAction>) -> Self {
        Self { actions }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run the chain. A failing action records its error and abandons the
    /// entry's remaining actions; the caller decides what that means for
    /// the run (it keeps going).
    pub fn run(&self, entry: &mut Entry, ctx: &mut Context, env: &ActionEnv<'_>) -> ChainResult {
        let mut records = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            match action.inner.execute(entry, ctx, env) {
                Ok(ActionOutcome::Performed(detail)) => {
                    tracing::info!(action = action.name(), %detail);
                    records.push(ActionRecord::new(action.name(), ActionStatus::Done, detail));
                }
                Ok(ActionOutcome::Simulated(detail)) => {
                    tracing::info!(action = action.name(), %detail, "simulated");
                    records.push(ActionRecord::new(
                        action.name(),
                        ActionStatus::WouldDo,
                        detail,
                    ));
                }
                Ok(ActionOutcome::Skipped(reason)) => {
                    tracing::debug!(action = action.name(), %reason, "action skipped");
                    records.push(ActionRecord::new(
                        action.name(),
                        ActionStatus::Skipped,
                        reason,
                    ));
                }
                Ok(ActionOutcome::Halt) => {
                    records.push(ActionRecord::new(
                        action.name(),
                        ActionStatus::Done,
                        "stopped processing this entry".to_string(),
                    ));
                    break;
                }
                Err(err) => {
                    tracing::warn!(action = action.name(), %err, "action failed");
                    records.push(ActionRecord::new(
                        action.name(),
                        ActionStatus::Failed,
                        err.to_string(),
                    ));
                    return ChainResult {
                        records,
                        error: Some(err),
                    };
                }
            }
        }
        ChainResult {
            records,
            error: None,
        }
    }
}

/// Render a destination template, treating a trailing separator as "into
/// this directory": the entry's current file name is appended.
///
/// # Errors
///
/// Returns [`ActionError::Template`] when rendering fails and
/// [`ActionError::BadDestination`] when the rendered destination is empty.
pub(crate) fn render_destination(
    action: &str,
    template: &Template,
    entry: &Entry,
    ctx: &Context,
) -> Result<PathBuf, ActionError> {
    let rendered = template.render(ctx).map_err(|source| ActionError::Template {
        action: action.to_string(),
        source,
    })?;
    if rendered.trim().is_empty() {
        return Err(ActionError::BadDestination {
            action: action.to_string(),
            dest: rendered,
            message: "destination rendered empty".to_string(),
        });
    }
    if rendered.ends_with('/') || rendered.ends_with(std::path::MAIN_SEPARATOR) {
        Ok(Path::new(&rendered).join(entry.file_name()))
    } else {
        Ok(PathBuf::from(rendered))
    }
}

/// Map a template failure into this action's error.
pub(crate) fn template_error(action: &str, source: TemplateError) -> ActionError {
    ActionError::Template {
        action: action.to_string(),
        source,
    }
}

/// Map an I/O failure on `path` into this action's error.
pub(crate) fn io_error(action: &str, path: &Path, source: std::io::Error) -> ActionError {
    ActionError::Io {
        action: action.to_string(),
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::entry::EntryKind;
    use crate::fsops::MockFileOps;

    #[derive(Debug)]
    struct Noop;

    impl Action for Noop {
        fn execute(
            &self,
            _: &mut Entry,
            _: &mut Context,
            _: &ActionEnv<'_>,
        ) -> Result<ActionOutcome, ActionError> {
            Ok(ActionOutcome::Performed("noop".to_string()))
        }
    }

    #[derive(Debug)]
    struct Fails;

    impl Action for Fails {
        fn execute(
            &self,
            _: &mut Entry,
            _: &mut Context,
            _: &ActionEnv<'_>,
        ) -> Result<ActionOutcome, ActionError> {
            Err(ActionError::Shell {
                code: Some(1),
                stderr: "broken".to_string(),
            })
        }
    }

    #[derive(Debug)]
    struct Halts;

    impl Action for Halts {
        fn execute(
            &self,
            _: &mut Entry,
            _: &mut Context,
            _: &ActionEnv<'_>,
        ) -> Result<ActionOutcome, ActionError> {
            Ok(ActionOutcome::Halt)
        }
    }

    fn entry() -> Entry {
        Entry::fake(
            Path::new("/inbox"),
            PathBuf::from("/inbox/a.txt"),
            EntryKind::File,
            1,
            None,
            None,
        )
    }

    fn env<'a>(fs: &'a MockFileOps, produced: &'a ProducedPaths) -> ActionEnv<'a> {
        ActionEnv {
            simulate: false,
            policy: None,
            fs,
            produced,
        }
    }

    #[test]
    fn failing_action_abandons_the_rest_of_the_chain() {
        let chain = ActionChain::new(vec![
            CompiledAction::new("shell", Box::new(Fails)),
            CompiledAction::new("echo", Box::new(Noop)),
        ]);
        let fs = MockFileOps::new();
        let produced = ProducedPaths::new();
        let result = chain.run(&mut entry(), &mut Context::new(), &env(&fs, &produced));
        assert!(result.error.is_some());
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].status, ActionStatus::Failed);
    }

    #[test]
    fn halt_stops_without_an_error() {
        let chain = ActionChain::new(vec![
            CompiledAction::new("stop", Box::new(Halts)),
            CompiledAction::new("echo", Box::new(Noop)),
        ]);
        let fs = MockFileOps::new();
        let produced = ProducedPaths::new();
        let result = chain.run(&mut entry(), &mut Context::new(), &env(&fs, &produced));
        assert!(result.error.is_none());
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn trailing_separator_means_into_directory() {
        let template = Template::parse("/archive/{extension}/").unwrap();
        let mut ctx = Context::new();
        let e = entry();
        e.seed_context(&mut ctx);
        let dest = render_destination("move", &template, &e, &ctx).unwrap();
        assert_eq!(dest, PathBuf::from("/archive/txt/a.txt"));
    }

    #[test]
    fn explicit_file_destination_is_kept() {
        let template = Template::parse("/archive/renamed.txt").unwrap();
        let mut ctx = Context::new();
        let e = entry();
        e.seed_context(&mut ctx);
        let dest = render_destination("move", &template, &e, &ctx).unwrap();
        assert_eq!(dest, PathBuf::from("/archive/renamed.txt"));
    }
}
