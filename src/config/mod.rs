//! Rule-source loading from a TOML config file.
//!
//! The file is a `[[rules]]` array; each rule carries one or more
//! `[[rules.locations]]`, a filter chain and an action chain. Filters and
//! actions are named capabilities with a free-form `params` table that the
//! registry validates at compile time (see [`crate::registry`]).
//!
//! ```toml
//! [[rules]]
//! name = "archive pdfs"
//!
//! [[rules.locations]]
//! path = "~/inbox"
//!
//! [[rules.filters]]
//! name = "extension"
//! params = { extensions = ["pdf"] }
//!
//! [[rules.actions]]
//! name = "move"
//! params = { dest = "~/archive/{lastmodified.year}/{filename}" }
//! ```

pub mod params;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::conflict::ConflictPolicy;
use crate::error::ConfigError;

/// Which entry kinds a rule walks.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Targets {
    /// Regular files only (the default).
    #[default]
    Files,
    /// Directories only.
    Dirs,
    /// Files and directories.
    Both,
}

impl Targets {
    /// Whether this target kind includes files.
    #[must_use]
    pub const fn includes_files(self) -> bool {
        matches!(self, Self::Files | Self::Both)
    }

    /// Whether this target kind includes directories.
    #[must_use]
    pub const fn includes_dirs(self) -> bool {
        matches!(self, Self::Dirs | Self::Both)
    }
}

impl fmt::Display for Targets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Files => write!(f, "files"),
            Self::Dirs => write!(f, "dirs"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Combination mode for a rule's filter chain.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Every filter (post-negation) must match.
    #[default]
    All,
    /// At least one filter (post-negation) must match.
    Any,
    /// No filter (post-negation) may match.
    None,
}

/// What a filter extraction failure does to the owning entry.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterErrorMode {
    /// Count the failing filter as not-matched (the default).
    #[default]
    Ignore,
    /// Record the entry as errored.
    Error,
}

/// A directory tree to scan.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Location {
    /// Root of the tree.
    pub path: PathBuf,
    /// Recurse into subdirectories (depth-unbounded unless `max_depth` set).
    #[serde(default)]
    pub subfolders: bool,
    /// Explicit recursion depth; overrides `subfolders`.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Name globs an entry must match to be yielded (empty = all).
    #[serde(default)]
    pub include: Vec<String>,
    /// File-name globs to exclude.
    #[serde(default)]
    pub exclude_files: Vec<String>,
    /// Directory-name globs to prune.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    /// Follow symbolic links while walking.
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Location {
    /// Effective maximum walk depth relative to the root (1 = direct
    /// children only).
    #[must_use]
    pub fn effective_depth(&self) -> Option<usize> {
        match self.max_depth {
            Some(d) => Some(d.max(1)),
            None if self.subfolders => None,
            None => Some(1),
        }
    }
}

/// A named filter or action plus its raw parameter table.
///
/// Resolved to a concrete capability by the registry at rule compile time;
/// unknown names fail the rule before any entry is walked.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CapabilitySpec {
    /// Registered capability name, e.g. `"extension"` or `"move"`.
    pub name: String,
    /// Negate the filter's boolean result (filters only).
    #[serde(default)]
    pub not: bool,
    /// Capability-specific named parameters.
    #[serde(default)]
    pub params: toml::Table,
}

/// One declarative rule: locations, filter chain, action chain.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Display name; defaults to `rule #n` when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Disabled rules are recorded as skipped and never walked.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Which entry kinds to walk.
    #[serde(default)]
    pub targets: Targets,
    /// Free-form tags for CLI rule selection.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Directory trees this rule scans.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Filter combination mode.
    #[serde(default)]
    pub filter_mode: FilterMode,
    /// Filter failure escalation.
    #[serde(default)]
    pub on_filter_error: FilterErrorMode,
    /// Rule-level conflict policy for mutating actions.
    #[serde(default)]
    pub on_conflict: Option<ConflictPolicy>,
    /// Ordered filter chain.
    #[serde(default)]
    pub filters: Vec<CapabilitySpec>,
    /// Ordered action chain.
    #[serde(default)]
    pub actions: Vec<CapabilitySpec>,
}

impl RuleConfig {
    /// The rule's display name, falling back to its 1-based position.
    #[must_use]
    pub fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("rule #{}", index + 1))
    }
}

const fn default_true() -> bool {
    true
}

/// The full rule source: an ordered sequence of rules.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Rules in configured order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Config {
    /// Load and parse the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] on TOML syntax or shape errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse config text, attributing errors to `file`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on TOML syntax or shape errors.
    pub fn parse(content: &str, file: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            file: file.to_string(),
            message: e.to_string(),
        })
    }
}
