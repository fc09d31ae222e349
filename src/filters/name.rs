//! Match entries by substrings of the file stem.

use toml::Table;

use crate::config::params;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ConfigError, FilterError};
use crate::filters::Filter;

/// Matches the entry's stem (name without extension) against `startswith`,
/// `contains` and `endswith` conditions.
///
/// Each configured condition accepts a string or a list (any element
/// satisfies it); all configured conditions must hold. Comparison is
/// case-sensitive unless `case_sensitive = false`.
#[derive(Debug)]
pub struct NameFilter {
    startswith: Vec<String>,
    contains: Vec<String>,
    endswith: Vec<String>,
    case_sensitive: bool,
}

impl NameFilter {
    /// Build from raw params.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] on unknown or mistyped keys, or
    /// when no condition is configured at all.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(
            table,
            "name",
            &["startswith", "contains", "endswith", "case_sensitive"],
        )?;
        let filter = Self {
            startswith: params::str_list(table, "name", "startswith")?,
            contains: params::str_list(table, "name", "contains")?,
            endswith: params::str_list(table, "name", "endswith")?,
            case_sensitive: params::opt_bool(table, "name", "case_sensitive", true)?,
        };
        if filter.startswith.is_empty() && filter.contains.is_empty() && filter.endswith.is_empty()
        {
            return Err(ConfigError::BadParams {
                capability: "name".into(),
                message: "requires at least one of 'startswith', 'contains', 'endswith'".into(),
            });
        }
        Ok(filter)
    }

    fn fold(&self, s: &str) -> String {
        if self.case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    }
}

impl Filter for NameFilter {
    fn matches(&self, entry: &Entry, _ctx: &mut Context) -> Result<bool, FilterError> {
        let stem = self.fold(&entry.stem());
        let holds = |needles: &[String], test: &dyn Fn(&str) -> bool| {
            needles.is_empty() || needles.iter().any(|n| test(&self.fold(n)))
        };
        Ok(holds(&self.startswith, &|n| stem.starts_with(n))
            && holds(&self.contains, &|n| stem.contains(n))
            && holds(&self.endswith, &|n| stem.ends_with(n)))
    }
}
