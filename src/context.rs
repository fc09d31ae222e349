//! Per-entry key/value store shared between filters and actions.
//!
//! A [`Context`] lives for exactly one entry's evaluation: the walker seeds
//! it with built-in keys derived from the entry's path and metadata, filters
//! enrich it with extracted data, and action templates interpolate it.
//! Built-in key roots are reserved — a filter attempting to overwrite one is
//! rejected. All other keys follow last-writer-wins in filter order.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local, Timelike};

/// A single context value: a closed, tagged union of the kinds filters may
/// extract and templates may interpolate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A UTF-8 string.
    Str(String),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A nested string-keyed mapping.
    Table(BTreeMap<String, Value>),
}

impl Value {
    /// Render this value for template interpolation.
    ///
    /// Scalars render to their natural textual form; lists and tables are
    /// not renderable and return `None` (templates must address their leaf
    /// keys instead).
    #[must_use]
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::List(_) | Self::Table(_) => None,
        }
    }

    /// Build a table value from a timestamp, exposing `year`, `month`,
    /// `day`, `hour`, `minute`, `second` and an ISO-8601 `timestamp` leaf.
    ///
    /// `month` and `day` are zero-padded to two digits so they concatenate
    /// naturally in destination templates (`{lastmodified.year}-{lastmodified.month}`).
    #[must_use]
    pub fn timestamp_table(t: DateTime<Local>) -> Self {
        let mut table = BTreeMap::new();
        table.insert("year".to_string(), Self::Int(i64::from(t.year())));
        table.insert("month".to_string(), Self::Str(format!("{:02}", t.month())));
        table.insert("day".to_string(), Self::Str(format!("{:02}", t.day())));
        table.insert("hour".to_string(), Self::Str(format!("{:02}", t.hour())));
        table.insert(
            "minute".to_string(),
            Self::Str(format!("{:02}", t.minute())),
        );
        table.insert(
            "second".to_string(),
            Self::Str(format!("{:02}", t.second())),
        );
        table.insert(
            "timestamp".to_string(),
            Self::Str(t.format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        Self::Table(table)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Key roots seeded by the engine and protected from filter writes.
pub const RESERVED_KEYS: &[&str] = &[
    "path",
    "relative_path",
    "name",
    "filename",
    "extension",
    "size",
    "created",
    "lastmodified",
    "now",
];

/// Mutable per-entry key/value store.
///
/// Scoped to one entry's evaluation and discarded once its action chain
/// completes.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` names a reserved built-in root.
    #[must_use]
    pub fn is_reserved(key: &str) -> bool {
        let root = key.split('.').next().unwrap_or(key);
        RESERVED_KEYS.contains(&root)
    }

    /// Set a built-in key. Engine use only — bypasses the reservation check.
    pub fn set_builtin(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Insert an enrichment key from a filter or action.
    ///
    /// Returns `false` (and leaves the context untouched) when `key` is a
    /// reserved built-in root. Non-reserved collisions overwrite: the last
    /// writer in chain order wins.
    pub fn insert(&mut self, key: &str, value: Value) -> bool {
        if Self::is_reserved(key) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }

    /// Look up a dotted key path (`"lastmodified.year"`), descending nested
    /// tables.
    #[must_use]
    pub fn get(&self, dotted: &str) -> Option<&Value> {
        let mut segments = dotted.split('.');
        let root = segments.next()?;
        let mut current = self.values.get(root)?;
        for segment in segments {
            match current {
                Value::Table(table) => current = table.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn insert_and_get_scalar() {
        let mut ctx = Context::new();
        assert!(ctx.insert("mimetype", Value::from("application/pdf")));
        assert_eq!(
            ctx.get("mimetype"),
            Some(&Value::Str("application/pdf".to_string()))
        );
    }

    #[test]
    fn reserved_roots_reject_filter_writes() {
        let mut ctx = Context::new();
        ctx.set_builtin("path", Value::from("/inbox/a.txt"));
        assert!(!ctx.insert("path", Value::from("/evil")));
        assert!(!ctx.insert("lastmodified.year", Value::Int(1999)));
        assert_eq!(ctx.get("path"), Some(&Value::Str("/inbox/a.txt".to_string())));
    }

    #[test]
    fn non_reserved_collision_is_last_writer_wins() {
        let mut ctx = Context::new();
        assert!(ctx.insert("label", Value::from("first")));
        assert!(ctx.insert("label", Value::from("second")));
        assert_eq!(ctx.get("label"), Some(&Value::Str("second".to_string())));
    }

    #[test]
    fn dotted_lookup_descends_tables() {
        let mut ctx = Context::new();
        let mut inner = BTreeMap::new();
        inner.insert("title".to_string(), Value::from("invoice"));
        ctx.insert("regex", Value::Table(inner));
        assert_eq!(
            ctx.get("regex.title"),
            Some(&Value::Str("invoice".to_string()))
        );
        assert_eq!(ctx.get("regex.missing"), None);
        assert_eq!(ctx.get("regex.title.deeper"), None);
    }

    #[test]
    fn timestamp_table_exposes_parts() {
        let t = Local.with_ymd_and_hms(2023, 4, 7, 9, 5, 0).unwrap();
        let value = Value::timestamp_table(t);
        let Value::Table(table) = &value else {
            panic!("expected table");
        };
        assert_eq!(table.get("year"), Some(&Value::Int(2023)));
        assert_eq!(table.get("month"), Some(&Value::Str("04".to_string())));
        assert_eq!(table.get("day"), Some(&Value::Str("07".to_string())));
    }

    #[test]
    fn render_scalars_but_not_tables() {
        assert_eq!(Value::Int(42).render(), Some("42".to_string()));
        assert_eq!(Value::Bool(true).render(), Some("true".to_string()));
        assert_eq!(Value::Table(BTreeMap::new()).render(), None);
        assert_eq!(Value::List(vec![]).render(), None);
    }

    #[test]
    fn is_reserved_checks_root_segment() {
        assert!(Context::is_reserved("created"));
        assert!(Context::is_reserved("created.year"));
        assert!(!Context::is_reserved("regex.year"));
    }
}
