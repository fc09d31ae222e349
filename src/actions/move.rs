//! Move the entry to a templated destination.

use toml::Table;

use crate::actions::{io_error, render_destination, Action, ActionEnv, ActionOutcome};
use crate::config::params;
use crate::conflict::{self, Resolution};
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ActionError, ConfigError};
use crate::template::Template;

/// Moves the entry to `dest`. A destination ending in a separator means
/// "into this directory, keeping the file name". After a real move the
/// entry's tracked path points at the new location.
#[derive(Debug)]
pub struct MoveAction {
    dest: Template,
    policy: Option<crate::conflict::ConflictPolicy>,
}

impl MoveAction {
    /// Build from raw params: `dest` (required), `on_conflict` (optional
    /// override of the rule-level policy).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unknown keys, a missing `dest` or a
    /// malformed template.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "move", &["dest", "on_conflict"])?;
        let dest = Template::parse(&params::require_str(table, "move", "dest")?)?;
        let policy = params::opt_policy(table, "move")?;
        Ok(Self { dest, policy })
    }
}

impl Action for MoveAction {
    fn execute(
        &self,
        entry: &mut Entry,
        ctx: &mut Context,
        env: &ActionEnv<'_>,
    ) -> Result<ActionOutcome, ActionError> {
        let dest = render_destination("move", &self.dest, entry, ctx)?;
        if dest == entry.path() {
            return Ok(ActionOutcome::Skipped(format!(
                "already at {}",
                dest.display()
            )));
        }
        let policy = self.policy.or(env.policy);
        let target = match conflict::resolve(&dest, policy, env.fs, env.simulate)
            .map_err(|source| ActionError::Conflict {
                action: "move".to_string(),
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
            return Ok(ActionOutcome::Simulated(format!("would move {detail}")));
        }
        if let Some(parent) = target.parent() {
            env.fs
                .create_dir_all(parent)
                .map_err(|e| io_error("move", parent, e))?;
        }
        env.fs
            .move_entry(entry.path(), &target)
            .map_err(|e| io_error("move", &target, e))?;
        // Recorded after the move so the produced path normalizes against
        // the file that now exists.
        env.produced.insert(target.clone());
        entry.relocate(target, ctx);
        Ok(ActionOutcome::Performed(format!("moved {detail}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use crate::entry::EntryKind;
    use crate::fsops::MockFileOps;
    use crate::walker::ProducedPaths;

    fn entry() -> Entry {
        Entry::fake(
            Path::new("/inbox"),
            PathBuf::from("/inbox/report.pdf"),
            EntryKind::File,
            9,
            None,
            None,
        )
    }

    fn action(toml: &str) -> MoveAction {
        MoveAction::from_params(&toml.parse().unwrap()).unwrap()
    }

    #[test]
    fn real_move_updates_the_tracked_path() {
        let fs = MockFileOps::new().with_file("/inbox/report.pdf");
        let produced = ProducedPaths::new();
        let env = ActionEnv {
            simulate: false,
            policy: None,
            fs: &fs,
            produced: &produced,
        };
        let mut e = entry();
        let mut ctx = Context::new();
        e.seed_context(&mut ctx);

        let out = action(r#"dest = "/archive/""#)
            .execute(&mut e, &mut ctx, &env)
            .unwrap();
        assert!(matches!(out, ActionOutcome::Performed(_)));
        assert_eq!(e.path(), Path::new("/archive/report.pdf"));
        assert!(produced.contains(Path::new("/archive/report.pdf")));
        assert_eq!(
            fs.operations(),
            [
                "mkdir -p /archive",
                "move /inbox/report.pdf -> /archive/report.pdf"
            ]
        );
    }

    #[test]
    fn simulate_previews_without_touching_anything() {
        let fs = MockFileOps::new().with_file("/inbox/report.pdf");
        let produced = ProducedPaths::new();
        let env = ActionEnv {
            simulate: true,
            policy: None,
            fs: &fs,
            produced: &produced,
        };
        let mut e = entry();
        let mut ctx = Context::new();
        e.seed_context(&mut ctx);

        let out = action(r#"dest = "/archive/""#)
            .execute(&mut e, &mut ctx, &env)
            .unwrap();
        assert!(matches!(out, ActionOutcome::Simulated(_)));
        assert_eq!(e.path(), Path::new("/inbox/report.pdf"), "entry must not relocate");
        assert!(fs.operations().is_empty());
    }

    #[test]
    fn action_level_policy_overrides_the_rule_level_one() {
        let fs = MockFileOps::new()
            .with_file("/inbox/report.pdf")
            .with_dir_entries("/archive", vec![PathBuf::from("/archive/report.pdf")]);
        let produced = ProducedPaths::new();
        let env = ActionEnv {
            simulate: false,
            policy: Some(crate::conflict::ConflictPolicy::Skip),
            fs: &fs,
            produced: &produced,
        };
        let mut e = entry();
        let mut ctx = Context::new();
        e.seed_context(&mut ctx);

        let out = action("dest = \"/archive/\"\non_conflict = \"rename_new\"")
            .execute(&mut e, &mut ctx, &env)
            .unwrap();
        assert!(matches!(out, ActionOutcome::Performed(_)));
        assert_eq!(e.path(), Path::new("/archive/report (1).pdf"));
    }

    #[test]
    fn moving_onto_itself_is_a_noop() {
        let fs = MockFileOps::new().with_file("/inbox/report.pdf");
        let produced = ProducedPaths::new();
        let env = ActionEnv {
            simulate: false,
            policy: None,
            fs: &fs,
            produced: &produced,
        };
        let mut e = entry();
        let mut ctx = Context::new();
        e.seed_context(&mut ctx);

        let out = action(r#"dest = "/inbox/""#)
            .execute(&mut e, &mut ctx, &env)
            .unwrap();
        assert!(matches!(out, ActionOutcome::Skipped(_)));
        assert!(fs.operations().is_empty());
    }

    #[test]
    fn collision_without_policy_fails_the_action() {
        let fs = MockFileOps::new()
            .with_file("/inbox/report.pdf")
            .with_file("/archive/report.pdf");
        let produced = ProducedPaths::new();
        let env = ActionEnv {
            simulate: false,
            policy: None,
            fs: &fs,
            produced: &produced,
        };
        let mut e = entry();
        let mut ctx = Context::new();
        e.seed_context(&mut ctx);

        let err = action(r#"dest = "/archive/""#)
            .execute(&mut e, &mut ctx, &env)
            .unwrap_err();
        assert!(matches!(err, ActionError::Conflict { .. }));
    }
}
