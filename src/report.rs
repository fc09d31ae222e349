//! Run reporting: what each rule did to each entry.

use std::path::PathBuf;

/// How a single action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// Performed for real.
    Done,
    /// Simulate mode preview.
    WouldDo,
    /// Skipped by a conflict policy or no-op condition.
    Skipped,
    /// Failed; the entry's remaining actions were abandoned.
    Failed,
}

/// One action's result for one entry.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    /// Config name of the action.
    pub action: String,
    /// How it ended.
    pub status: ActionStatus,
    /// Human-readable description of what happened (or would happen).
    pub detail: String,
}

impl ActionRecord {
    #[must_use]
    pub fn new(action: impl Into<String>, status: ActionStatus, detail: String) -> Self {
        Self {
            action: action.into(),
            status,
            detail,
        }
    }
}

/// Why an entry appears in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The filter chain matched and the action chain ran.
    Matched,
    /// The filter chain rejected the entry. `degraded` marks a rejection
    /// that absorbed a filter error along the way.
    NotMatched {
        /// Whether a filter errored while evaluating this entry.
        degraded: bool,
    },
    /// The entry vanished between enumeration and processing. Not a
    /// failure; the run moves on.
    Skipped,
    /// The entry could not be read or a filter error was escalated.
    Errored,
}

/// One reported entry under one rule.
#[derive(Debug)]
pub struct EntryOutcome {
    /// The entry's path at walk time.
    pub path: PathBuf,
    /// Display name of the owning rule.
    pub rule: String,
    /// Why the entry is reported.
    pub status: EntryStatus,
    /// Per-action records, in execution order.
    pub records: Vec<ActionRecord>,
    /// The walk, filter or action error that ended processing, if any.
    pub error: Option<String>,
}

/// A rule that could not run at all.
#[derive(Debug)]
pub struct RuleError {
    /// Display name of the rule.
    pub rule: String,
    /// Why it was rejected.
    pub message: String,
}

/// Aggregate outcome of one run, in rule order then walk order.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Whether this was a simulate run.
    pub simulate: bool,
    /// Number of rules that walked at least one location.
    pub rules_run: usize,
    /// Rules skipped by `enabled = false` or tag selection.
    pub rules_skipped: Vec<String>,
    /// Rules rejected at compile time; the run continued without them.
    pub rule_errors: Vec<RuleError>,
    /// Every walked entry's outcome, in rule order then walk order.
    pub entries: Vec<EntryOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn new(simulate: bool) -> Self {
        Self {
            simulate,
            ..Self::default()
        }
    }

    /// Number of entries whose action chain ran.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Matched)
            .count()
    }

    /// Number of entries the filter chain rejected.
    #[must_use]
    pub fn not_matched(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::NotMatched { .. }))
            .count()
    }

    /// Rejected entries where a filter error was absorbed on the way.
    #[must_use]
    pub fn filter_degraded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::NotMatched { degraded: true })
            .count()
    }

    /// Number of actions that completed (or previewed) successfully.
    #[must_use]
    pub fn actions_done(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|e| &e.records)
            .filter(|r| matches!(r.status, ActionStatus::Done | ActionStatus::WouldDo))
            .count()
    }

    /// Entries that ended in an error, walk failures included. Entries
    /// skipped by a filesystem race do not count.
    #[must_use]
    pub fn errored(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| match e.status {
                EntryStatus::Errored => true,
                EntryStatus::Matched => e.error.is_some(),
                EntryStatus::NotMatched { .. } | EntryStatus::Skipped => false,
            })
            .count()
    }

    /// `true` when anything in the run went wrong.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.rule_errors.is_empty() || self.errored() > 0
    }
}
