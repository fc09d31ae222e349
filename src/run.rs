//! The run coordinator: compiles rules and drives them over their
//! locations in order.
//!
//! Rules run sequentially in declaration order. A rule that fails to
//! compile is recorded and skipped; a failing entry never aborts its rule;
//! a failing rule never aborts the run. The whole run shares one
//! [`ProducedPaths`] set so no rule reprocesses output created earlier in
//! the same run.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::actions::{ActionChain, ActionEnv};
use crate::config::{Config, RuleConfig, Targets};
use crate::conflict::ConflictPolicy;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ConfigError, WalkError};
use crate::filters::{ChainVerdict, FilterChain};
use crate::fsops::FileOps;
use crate::registry;
use crate::report::{EntryOutcome, EntryStatus, RuleError, RunReport};
use crate::walker::{CompiledLocation, ProducedPaths};

/// CLI tag selection applied to each rule before it runs.
///
/// Two tag names carry special meaning: a rule tagged `always` runs even
/// when it matches none of the requested tags, and a rule tagged `never`
/// runs only when one of its other tags is explicitly requested.
#[derive(Debug, Default)]
pub struct TagSelection {
    tags: BTreeSet<String>,
    skip: BTreeSet<String>,
}

impl TagSelection {
    #[must_use]
    pub fn new(tags: impl IntoIterator<Item = String>, skip: impl IntoIterator<Item = String>) -> Self {
        Self {
            tags: tags.into_iter().collect(),
            skip: skip.into_iter().collect(),
        }
    }

    /// Whether a rule with `rule_tags` should run under this selection.
    #[must_use]
    pub fn selects(&self, rule_tags: &BTreeSet<String>) -> bool {
        if rule_tags.iter().any(|t| self.skip.contains(t)) {
            return false;
        }
        if rule_tags.contains("always") {
            return true;
        }
        let explicit = rule_tags.iter().any(|t| self.tags.contains(t));
        if rule_tags.contains("never") {
            return explicit;
        }
        if self.tags.is_empty() {
            return true;
        }
        explicit
    }
}

/// One rule, fully resolved and ready to run.
#[derive(Debug)]
pub struct CompiledRule {
    name: String,
    targets: Targets,
    tags: BTreeSet<String>,
    locations: Vec<CompiledLocation>,
    filters: FilterChain,
    actions: ActionChain,
    policy: Option<ConflictPolicy>,
}

impl CompiledRule {
    /// Compile one rule config: locations, filter chain, action chain.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found; the rule is then excluded
    /// from the run.
    pub fn compile(cfg: &RuleConfig, index: usize) -> Result<Self, ConfigError> {
        let name = cfg.display_name(index);
        if cfg.locations.is_empty() {
            return Err(ConfigError::NoLocations(name));
        }
        if cfg.actions.is_empty() {
            return Err(ConfigError::NoActions(name));
        }
        let locations = cfg
            .locations
            .iter()
            .map(CompiledLocation::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let filters = cfg
            .filters
            .iter()
            .map(|spec| registry::compile_filter(spec, cfg.targets))
            .collect::<Result<Vec<_>, _>>()?;
        let last = cfg.actions.len() - 1;
        let actions = cfg
            .actions
            .iter()
            .enumerate()
            .map(|(i, spec)| registry::compile_action(spec, i == last))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            targets: cfg.targets,
            tags: cfg.tags.clone(),
            locations,
            filters: FilterChain::new(cfg.filter_mode, cfg.on_filter_error, filters),
            actions: ActionChain::new(actions),
            policy: cfg.on_conflict,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Drives a whole config over the filesystem, collecting a [`RunReport`].
#[derive(Debug)]
pub struct Runner<'a> {
    fs: &'a dyn FileOps,
    simulate: bool,
}

impl<'a> Runner<'a> {
    #[must_use]
    pub fn new(fs: &'a dyn FileOps, simulate: bool) -> Self {
        Self { fs, simulate }
    }

    /// Run every enabled, selected rule in declaration order.
    pub fn run(&self, config: &Config, selection: &TagSelection) -> RunReport {
        let mut report = RunReport::new(self.simulate);
        let produced = ProducedPaths::new();

        for (index, cfg) in config.rules.iter().enumerate() {
            let rule_name = cfg.display_name(index);
            if !cfg.enabled {
                debug!(rule = %rule_name, "rule disabled");
                report.rules_skipped.push(rule_name);
                continue;
            }
            if !selection.selects(&cfg.tags) {
                debug!(rule = %rule_name, "rule excluded by tag selection");
                report.rules_skipped.push(rule_name);
                continue;
            }
            match CompiledRule::compile(cfg, index) {
                Ok(rule) => {
                    info!(rule = rule.name(), "running rule");
                    self.run_rule(&rule, &produced, &mut report);
                    report.rules_run += 1;
                }
                Err(err) => {
                    warn!(rule = %rule_name, %err, "rule rejected");
                    report.rule_errors.push(RuleError {
                        rule: rule_name,
                        message: err.to_string(),
                    });
                }
            }
        }
        report
    }

    fn run_rule(&self, rule: &CompiledRule, produced: &ProducedPaths, report: &mut RunReport) {
        let env = ActionEnv {
            simulate: self.simulate,
            policy: rule.policy,
            fs: self.fs,
            produced,
        };
        // Overlapping locations must not process the same entry twice.
        let mut visited: HashSet<PathBuf> = HashSet::new();

        for location in &rule.locations {
            for walked in location.walk(rule.targets, produced) {
                let entry = match walked {
                    Ok(entry) => entry,
                    Err(err) => {
                        // A filesystem race is not a failure; everything
                        // else is.
                        let status = if matches!(err, WalkError::Disappeared { .. }) {
                            EntryStatus::Skipped
                        } else {
                            EntryStatus::Errored
                        };
                        report.entries.push(EntryOutcome {
                            path: err.path().to_path_buf(),
                            rule: rule.name.clone(),
                            status,
                            records: Vec::new(),
                            error: Some(err.to_string()),
                        });
                        continue;
                    }
                };
                if !visited.insert(identity(entry.path())) {
                    continue;
                }
                self.process_entry(rule, entry, &env, report);
            }
        }
    }

    fn process_entry(
        &self,
        rule: &CompiledRule,
        mut entry: Entry,
        env: &ActionEnv<'_>,
        report: &mut RunReport,
    ) {
        let mut ctx = Context::new();
        entry.seed_context(&mut ctx);

        match rule.filters.evaluate(&entry, &mut ctx) {
            ChainVerdict::NotMatched { errored } => {
                report.entries.push(EntryOutcome {
                    path: entry.path().to_path_buf(),
                    rule: rule.name.clone(),
                    status: EntryStatus::NotMatched { degraded: errored },
                    records: Vec::new(),
                    error: None,
                });
            }
            ChainVerdict::Errored(err) => {
                report.entries.push(EntryOutcome {
                    path: entry.path().to_path_buf(),
                    rule: rule.name.clone(),
                    status: EntryStatus::Errored,
                    records: Vec::new(),
                    error: Some(err.to_string()),
                });
            }
            ChainVerdict::Matched => {
                let original = entry.path().to_path_buf();
                let result = rule.actions.run(&mut entry, &mut ctx, env);
                report.entries.push(EntryOutcome {
                    path: original,
                    rule: rule.name.clone(),
                    status: EntryStatus::Matched,
                    records: result.records,
                    error: result.error.map(|e| e.to_string()),
                });
            }
        }
    }
}

/// The per-rule visited set and the produced-paths set agree on the same
/// canonical form, so an entry reached through two overlapping locations
/// is processed once.
fn identity(path: &Path) -> PathBuf {
    crate::walker::normalize(path)
}
