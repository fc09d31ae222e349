//! Match file names against a regular expression and expose named captures.

use regex::Regex;
use toml::Table;

use crate::config::params;
use crate::context::{Context, Value};
use crate::entry::Entry;
use crate::error::{ConfigError, FilterError};
use crate::filters::Filter;

/// Matches the full file name (with extension) against `expr`.
///
/// On a match, named capture groups are published to the context as a
/// `regex` table, so an expression like `(?P<year>\d{4})` makes
/// `{regex.year}` available to action templates.
#[derive(Debug)]
pub struct RegexFilter {
    expr: Regex,
}

impl RegexFilter {
    /// Build from raw params: `expr` (required).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] on a missing key or an invalid
    /// expression.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "regex", &["expr"])?;
        let raw = params::require_str(table, "regex", "expr")?;
        let expr = Regex::new(&raw).map_err(|err| ConfigError::BadParams {
            capability: "regex".into(),
            message: format!("invalid expression '{raw}': {err}"),
        })?;
        Ok(Self { expr })
    }
}

impl Filter for RegexFilter {
    fn matches(&self, entry: &Entry, ctx: &mut Context) -> Result<bool, FilterError> {
        let name = entry.file_name();
        let Some(captures) = self.expr.captures(&name) else {
            return Ok(false);
        };
        let mut groups = std::collections::BTreeMap::new();
        for group in self.expr.capture_names().flatten() {
            if let Some(m) = captures.name(group) {
                groups.insert(group.to_string(), Value::from(m.as_str().to_string()));
            }
        }
        if !groups.is_empty() {
            ctx.insert("regex", Value::Table(groups));
        }
        Ok(true)
    }
}
