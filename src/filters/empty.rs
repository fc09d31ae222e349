//! Match empty files and directories.

use toml::Table;

use crate::config::params;
use crate::context::Context;
use crate::entry::{Entry, EntryKind};
use crate::error::{ConfigError, FilterError};
use crate::filters::Filter;

/// Matches zero-byte files and directories with no children.
#[derive(Debug)]
pub struct EmptyFilter;

impl EmptyFilter {
    /// Build from raw params (none accepted).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] when any parameter is given.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "empty", &[])?;
        Ok(Self)
    }
}

impl Filter for EmptyFilter {
    fn matches(&self, entry: &Entry, _ctx: &mut Context) -> Result<bool, FilterError> {
        match entry.kind() {
            EntryKind::File => Ok(entry.size() == 0),
            EntryKind::Dir => {
                let mut children =
                    std::fs::read_dir(entry.path()).map_err(|err| FilterError {
                        filter: "empty".into(),
                        message: format!("cannot read {}: {err}", entry.path().display()),
                    })?;
                Ok(children.next().is_none())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn filter() -> EmptyFilter {
        EmptyFilter::from_params(&Table::new()).unwrap()
    }

    #[test]
    fn zero_byte_file_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("empty.txt"), "").unwrap();
        std::fs::write(dir.path().join("full.txt"), "x").unwrap();
        let mut ctx = Context::new();
        let empty = Entry::from_path(dir.path(), dir.path().join("empty.txt")).unwrap();
        let full = Entry::from_path(dir.path(), dir.path().join("full.txt")).unwrap();
        assert!(filter().matches(&empty, &mut ctx).unwrap());
        assert!(!filter().matches(&full, &mut ctx).unwrap());
    }

    #[test]
    fn childless_directory_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bare")).unwrap();
        std::fs::create_dir(dir.path().join("busy")).unwrap();
        std::fs::write(dir.path().join("busy/f"), "x").unwrap();
        let mut ctx = Context::new();
        let bare = Entry::from_path(dir.path(), dir.path().join("bare")).unwrap();
        let busy = Entry::from_path(dir.path(), dir.path().join("busy")).unwrap();
        assert!(filter().matches(&bare, &mut ctx).unwrap());
        assert!(!filter().matches(&busy, &mut ctx).unwrap());
    }

    #[test]
    fn unreadable_directory_is_a_filter_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = Entry::fake(
            dir.path(),
            PathBuf::from(dir.path().join("vanished")),
            EntryKind::Dir,
            0,
            None,
            None,
        );
        let mut ctx = Context::new();
        assert!(filter().matches(&gone, &mut ctx).is_err());
    }

    #[test]
    fn rejects_any_parameter() {
        let table: Table = "mode = 1".parse().unwrap();
        assert!(EmptyFilter::from_params(&table).is_err());
    }
}
