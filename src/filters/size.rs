//! Match entries by size, with human-readable thresholds.

use toml::Table;

use crate::config::params;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ConfigError, FilterError};
use crate::filters::Filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cmp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

#[derive(Debug, Clone, Copy)]
struct Condition {
    op: Cmp,
    bytes: u64,
}

impl Condition {
    fn holds(self, size: u64) -> bool {
        match self.op {
            Cmp::Lt => size < self.bytes,
            Cmp::Le => size <= self.bytes,
            Cmp::Gt => size > self.bytes,
            Cmp::Ge => size >= self.bytes,
            Cmp::Eq => size == self.bytes,
        }
    }
}

/// Matches when the entry size satisfies every configured condition.
///
/// Conditions are strings like `"> 25 MB"`, `">= 1 KiB"` or `"= 0"`;
/// decimal units (`KB`, `MB`, ...) are powers of 1000 and binary units
/// (`KiB`, `MiB`, ...) powers of 1024. A bare number is bytes.
#[derive(Debug)]
pub struct SizeFilter {
    conditions: Vec<Condition>,
}

impl SizeFilter {
    /// Build from raw params: `conditions` (string or list, required).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] on unknown keys or an
    /// unparseable condition.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "size", &["conditions"])?;
        let raw = params::str_list(table, "size", "conditions")?;
        if raw.is_empty() {
            return Err(ConfigError::BadParams {
                capability: "size".into(),
                message: "requires at least one condition, e.g. \"> 25 MB\"".into(),
            });
        }
        let conditions = raw
            .iter()
            .map(|c| parse_condition(c))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| ConfigError::BadParams {
                capability: "size".into(),
                message,
            })?;
        Ok(Self { conditions })
    }
}

impl Filter for SizeFilter {
    fn matches(&self, entry: &Entry, _ctx: &mut Context) -> Result<bool, FilterError> {
        Ok(self.conditions.iter().all(|c| c.holds(entry.size())))
    }
}

fn parse_condition(raw: &str) -> Result<Condition, String> {
    let s = raw.trim();
    let (op, rest) = if let Some(r) = s.strip_prefix(">=") {
        (Cmp::Ge, r)
    } else if let Some(r) = s.strip_prefix("<=") {
        (Cmp::Le, r)
    } else if let Some(r) = s.strip_prefix('>') {
        (Cmp::Gt, r)
    } else if let Some(r) = s.strip_prefix('<') {
        (Cmp::Lt, r)
    } else if let Some(r) = s.strip_prefix('=') {
        (Cmp::Eq, r)
    } else {
        (Cmp::Eq, s)
    };
    let rest = rest.trim();
    let split = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    let (number, unit) = rest.split_at(split);
    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("cannot parse size condition '{raw}'"))?;
    let scale = unit_scale(unit.trim()).ok_or_else(|| {
        format!("unknown size unit '{}' in condition '{raw}'", unit.trim())
    })?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bytes = (value * scale).round().max(0.0) as u64;
    Ok(Condition { op, bytes })
}

fn unit_scale(unit: &str) -> Option<f64> {
    Some(match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 1.0,
        "kb" | "k" => 1e3,
        "mb" | "m" => 1e6,
        "gb" | "g" => 1e9,
        "tb" | "t" => 1e12,
        "kib" => 1024.0,
        "mib" => 1024.0 * 1024.0,
        "gib" => 1024.0 * 1024.0 * 1024.0,
        "tib" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use crate::entry::EntryKind;

    fn entry(size: u64) -> Entry {
        Entry::fake(
            Path::new("/inbox"),
            PathBuf::from("/inbox/blob.bin"),
            EntryKind::File,
            size,
            None,
            None,
        )
    }

    fn filter(toml: &str) -> SizeFilter {
        SizeFilter::from_params(&toml.parse().unwrap()).unwrap()
    }

    #[test]
    fn decimal_and_binary_units_differ() {
        let decimal = filter(r#"conditions = ">= 1 KB""#);
        let binary = filter(r#"conditions = ">= 1 KiB""#);
        let mut ctx = Context::new();
        assert!(decimal.matches(&entry(1000), &mut ctx).unwrap());
        assert!(!binary.matches(&entry(1000), &mut ctx).unwrap());
        assert!(binary.matches(&entry(1024), &mut ctx).unwrap());
    }

    #[test]
    fn multiple_conditions_form_a_range() {
        let f = filter(r#"conditions = ["> 1 MB", "< 2 MB"]"#);
        let mut ctx = Context::new();
        assert!(f.matches(&entry(1_500_000), &mut ctx).unwrap());
        assert!(!f.matches(&entry(500), &mut ctx).unwrap());
        assert!(!f.matches(&entry(3_000_000), &mut ctx).unwrap());
    }

    #[test]
    fn bare_number_means_exact_bytes() {
        let f = filter(r#"conditions = "0""#);
        let mut ctx = Context::new();
        assert!(f.matches(&entry(0), &mut ctx).unwrap());
        assert!(!f.matches(&entry(1), &mut ctx).unwrap());
    }

    #[test]
    fn fractional_values_are_accepted() {
        let f = filter(r#"conditions = "> 1.5 KB""#);
        let mut ctx = Context::new();
        assert!(f.matches(&entry(1501), &mut ctx).unwrap());
        assert!(!f.matches(&entry(1500), &mut ctx).unwrap());
    }

    #[test]
    fn garbage_condition_is_a_config_error() {
        let table: Table = r#"conditions = "roughly big""#.parse().unwrap();
        assert!(SizeFilter::from_params(&table).is_err());
    }
}
