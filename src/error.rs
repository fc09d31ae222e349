//! Domain-specific error types for the organize engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`ActionError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! OrganizeError
//! ├── Config(ConfigError)     — rule loading, capability resolution, templates
//! ├── Walk(WalkError)         — per-entry traversal failures
//! ├── Filter(FilterError)     — filter extraction failures
//! ├── Conflict(ConflictError) — target-collision resolution failures
//! └── Action(ActionError)     — filesystem mutation failures
//! ```
//!
//! Each category maps to a different blast radius: a [`ConfigError`] disables
//! the owning rule before any entry is walked, while the walk/filter/
//! conflict/action categories are recorded per entry and never abort a run.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the organize engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum OrganizeError {
    /// Rule configuration error (unknown capability, bad params, template).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Traversal error for a single entry.
    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),

    /// A filter failed to extract the data it matches on.
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// A target collision could not be resolved.
    #[error("Conflict error: {0}")]
    Conflict(#[from] ConflictError),

    /// An action failed at the filesystem boundary.
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
}

/// Errors that arise while loading and compiling rules.
///
/// Fatal to the owning rule only: the run coordinator records the error and
/// moves on to the next rule. A run with no valid rules at all reports a
/// single setup error instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A filter name has no registered capability.
    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    /// An action name has no registered capability.
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    /// A capability rejected its parameter table.
    #[error("Invalid parameters for '{capability}': {message}")]
    BadParams {
        /// Name of the filter or action that rejected its parameters.
        capability: String,
        /// Human-readable reason for the rejection.
        message: String,
    },

    /// A destination or text template failed to parse.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// A glob pattern in a location could not be compiled.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    Glob {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob compiler message.
        message: String,
    },

    /// A capability does not support the rule's target kind.
    #[error("'{capability}' does not support targets = \"{targets}\"")]
    TargetsMismatch {
        /// Name of the filter or action.
        capability: String,
        /// The rule's configured target kind.
        targets: String,
    },

    /// A rule has an empty action chain.
    #[error("Rule '{0}' has no actions")]
    NoActions(String),

    /// A rule has no locations to walk.
    #[error("Rule '{0}' has no locations")]
    NoLocations(String),

    /// The config file contains a syntax error that prevents parsing.
    #[error("Invalid TOML in {file}: {message}")]
    Parse {
        /// Path to the config file.
        file: String,
        /// Parser diagnostic.
        message: String,
    },

    /// An I/O error occurred while reading the config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Every rule in the config failed to compile.
    #[error("No valid rules: {0}")]
    NoValidRules(String),
}

/// Errors that arise while parsing or rendering a placeholder template.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A `{` was never closed.
    #[error("unclosed '{{' at byte {0}")]
    UnclosedBrace(usize),

    /// An empty `{}` placeholder.
    #[error("empty placeholder at byte {0}")]
    EmptyPlaceholder(usize),

    /// A `}` with no matching `{`.
    #[error("unmatched '}}' at byte {0}")]
    UnmatchedBrace(usize),

    /// A placeholder referenced a key absent from the context.
    #[error("unknown template key '{0}'")]
    UnknownKey(String),

    /// A placeholder resolved to a non-scalar value.
    #[error("template key '{0}' is not a scalar value")]
    NotRenderable(String),
}

/// Errors that arise while walking a location.
///
/// Recorded per entry; the walk itself continues.
#[derive(Error, Debug)]
pub enum WalkError {
    /// An entry disappeared between enumeration and stat (filesystem race).
    #[error("entry disappeared during walk: {path}")]
    Disappeared {
        /// Path that vanished mid-walk.
        path: PathBuf,
    },

    /// Following symlinks led back into an ancestor directory.
    #[error("symlink loop at {path}: cycles back to {ancestor}")]
    SymlinkLoop {
        /// The link that closed the cycle.
        path: PathBuf,
        /// The ancestor directory it points back into.
        ancestor: PathBuf,
    },

    /// An entry could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl WalkError {
    /// The path this error is about.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Disappeared { path } | Self::SymlinkLoop { path, .. } | Self::Io { path, .. } => {
                path
            }
        }
    }
}

/// A filter's underlying extraction failed (e.g. missing timestamp metadata).
///
/// By default this counts as *not matched* for the entry, but the report
/// distinguishes it from an ordinary non-match.
#[derive(Error, Debug)]
#[error("filter '{filter}' failed: {message}")]
pub struct FilterError {
    /// Name of the filter that failed.
    pub filter: String,
    /// Human-readable failure description.
    pub message: String,
}

/// Errors that arise while resolving a target-path collision.
#[derive(Error, Debug)]
pub enum ConflictError {
    /// The target exists and the rule configured no conflict policy.
    #[error("target exists and no conflict policy is configured: {target}")]
    NoPolicy {
        /// The colliding target path.
        target: PathBuf,
    },

    /// `rename_new` ran out of counter suffixes.
    #[error("no free name for {target} within {bound} rename attempts")]
    CounterExhausted {
        /// The colliding target path.
        target: PathBuf,
        /// The configured counter bound.
        bound: u32,
    },

    /// Clearing the pre-existing target failed.
    #[error("cannot clear existing target {target}: {source}")]
    Clear {
        /// The colliding target path.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// An action failed at the filesystem or process boundary.
#[derive(Error, Debug)]
pub enum ActionError {
    /// A filesystem mutation failed.
    #[error("{action}: {path}: {source}")]
    Io {
        /// Name of the failing action.
        action: String,
        /// Path the action was operating on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A destination or text template failed to render.
    #[error("{action}: {source}")]
    Template {
        /// Name of the failing action.
        action: String,
        /// Underlying template error.
        source: TemplateError,
    },

    /// The conflict resolver gave up on the action's target.
    #[error("{action}: {source}")]
    Conflict {
        /// Name of the failing action.
        action: String,
        /// Underlying conflict error.
        source: ConflictError,
    },

    /// A shell command exited non-zero or could not be spawned.
    #[error("shell command failed (exit {code:?}): {stderr}")]
    Shell {
        /// Exit code reported by the process, if any.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An action produced an invalid destination (e.g. a rename containing
    /// a path separator).
    #[error("{action}: invalid destination '{dest}': {message}")]
    BadDestination {
        /// Name of the failing action.
        action: String,
        /// The rendered destination.
        dest: String,
        /// Why the destination is invalid.
        message: String,
    },
}
