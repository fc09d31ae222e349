//! Match entries by timestamp age (creation or last modification).

use chrono::{Duration, Local};
use toml::Table;

use crate::config::params;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ConfigError, FilterError};
use crate::filters::Filter;

/// Which entry timestamp the filter inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stamp {
    Created,
    Modified,
}

impl Stamp {
    const fn capability(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "lastmodified",
        }
    }
}

/// Matches entries whose timestamp is at least (`mode = "older"`, the
/// default) or less than (`mode = "newer"`) a configured age.
///
/// The age is the sum of the `weeks`, `days`, `hours` and `minutes`
/// parameters. An entry whose platform does not report the inspected
/// timestamp fails with a [`FilterError`] rather than silently not
/// matching.
#[derive(Debug)]
pub struct DateFilter {
    stamp: Stamp,
    threshold: Duration,
    newer: bool,
}

impl DateFilter {
    /// Build from raw params.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] on unknown keys, a zero total
    /// age, or a `mode` other than `"older"` / `"newer"`.
    pub fn from_params(stamp: Stamp, table: &Table) -> Result<Self, ConfigError> {
        let capability = stamp.capability();
        params::ensure_known(table, capability, &["weeks", "days", "hours", "minutes", "mode"])?;
        let weeks = params::opt_int(table, capability, "weeks")?.unwrap_or(0);
        let days = params::opt_int(table, capability, "days")?.unwrap_or(0);
        let hours = params::opt_int(table, capability, "hours")?.unwrap_or(0);
        let minutes = params::opt_int(table, capability, "minutes")?.unwrap_or(0);
        let threshold = [
            Duration::try_weeks(weeks),
            Duration::try_days(days),
            Duration::try_hours(hours),
            Duration::try_minutes(minutes),
        ]
        .into_iter()
        .try_fold(Duration::zero(), |total, part| {
            part.and_then(|p| total.checked_add(&p))
        })
        .ok_or_else(|| ConfigError::BadParams {
            capability: capability.into(),
            message: "age is out of range".into(),
        })?;
        if threshold <= Duration::zero() {
            return Err(ConfigError::BadParams {
                capability: capability.into(),
                message: "requires a positive age, e.g. days = 30".into(),
            });
        }
        let newer = match params::opt_str(table, capability, "mode")?.as_deref() {
            None | Some("older") => false,
            Some("newer") => true,
            Some(other) => {
                return Err(ConfigError::BadParams {
                    capability: capability.into(),
                    message: format!("'mode' must be 'older' or 'newer', got '{other}'"),
                })
            }
        };
        Ok(Self {
            stamp,
            threshold,
            newer,
        })
    }
}

impl Filter for DateFilter {
    fn matches(&self, entry: &Entry, _ctx: &mut Context) -> Result<bool, FilterError> {
        let stamp = match self.stamp {
            Stamp::Created => entry.created(),
            Stamp::Modified => entry.modified(),
        }
        .ok_or_else(|| FilterError {
            filter: self.stamp.capability().into(),
            message: format!(
                "no {} timestamp available for {}",
                self.stamp.capability(),
                entry.path().display()
            ),
        })?;
        let age = Local::now() - stamp;
        Ok(if self.newer {
            age < self.threshold
        } else {
            age >= self.threshold
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use crate::entry::EntryKind;

    fn entry_modified_days_ago(days: i64) -> Entry {
        Entry::fake(
            Path::new("/inbox"),
            PathBuf::from("/inbox/old.log"),
            EntryKind::File,
            0,
            None,
            Some(Local::now() - Duration::days(days)),
        )
    }

    fn filter(toml: &str) -> DateFilter {
        DateFilter::from_params(Stamp::Modified, &toml.parse().unwrap()).unwrap()
    }

    #[test]
    fn older_mode_matches_sufficiently_aged_entries() {
        let f = filter("days = 30");
        let mut ctx = Context::new();
        assert!(f.matches(&entry_modified_days_ago(45), &mut ctx).unwrap());
        assert!(!f.matches(&entry_modified_days_ago(5), &mut ctx).unwrap());
    }

    #[test]
    fn newer_mode_inverts_the_comparison() {
        let f = filter("days = 30\nmode = \"newer\"");
        let mut ctx = Context::new();
        assert!(f.matches(&entry_modified_days_ago(5), &mut ctx).unwrap());
        assert!(!f.matches(&entry_modified_days_ago(45), &mut ctx).unwrap());
    }

    #[test]
    fn unit_parameters_accumulate() {
        let f = filter("weeks = 1\ndays = 3");
        let mut ctx = Context::new();
        assert!(f.matches(&entry_modified_days_ago(11), &mut ctx).unwrap());
        assert!(!f.matches(&entry_modified_days_ago(9), &mut ctx).unwrap());
    }

    #[test]
    fn missing_timestamp_is_a_filter_error() {
        let f = DateFilter::from_params(Stamp::Created, &"days = 1".parse().unwrap()).unwrap();
        let entry = Entry::fake(
            Path::new("/inbox"),
            PathBuf::from("/inbox/x"),
            EntryKind::File,
            0,
            None,
            None,
        );
        let err = f.matches(&entry, &mut Context::new()).unwrap_err();
        assert_eq!(err.filter, "created");
    }

    #[test]
    fn zero_age_is_rejected() {
        let table: Table = Table::new();
        assert!(DateFilter::from_params(Stamp::Modified, &table).is_err());
    }

    #[test]
    fn out_of_range_age_is_rejected_not_a_panic() {
        let table: Table = format!("days = {}", i64::MAX).parse().unwrap();
        let err = DateFilter::from_params(Stamp::Modified, &table).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        // Each unit fits on its own; the sum does not.
        let table: Table = "weeks = 10_000_000_000\ndays = 100_000_000_000_000"
            .parse()
            .unwrap();
        assert!(DateFilter::from_params(Stamp::Modified, &table).is_err());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let table: Table = "days = 1\nmode = \"sideways\"".parse().unwrap();
        assert!(DateFilter::from_params(Stamp::Modified, &table).is_err());
    }
}
