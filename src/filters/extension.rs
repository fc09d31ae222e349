//! Match entries by file extension.

use toml::Table;

use crate::config::params;
use crate::context::Context;
use crate::entry::Entry;
use crate::error::{ConfigError, FilterError};
use crate::filters::Filter;

/// Matches when the entry's extension is one of a configured set, or any
/// non-empty extension when the set is empty.
///
/// Comparison is case-insensitive and ignores a leading dot in the
/// configured values, so `"PDF"`, `"pdf"` and `".pdf"` are equivalent.
#[derive(Debug)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Build from raw params: `extensions` (string or list, optional).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] on unknown or mistyped keys.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "extension", &["extensions"])?;
        let extensions = params::str_list(table, "extension", "extensions")?
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        Ok(Self { extensions })
    }
}

impl Filter for ExtensionFilter {
    fn matches(&self, entry: &Entry, _ctx: &mut Context) -> Result<bool, FilterError> {
        let ext = entry.extension();
        if self.extensions.is_empty() {
            Ok(!ext.is_empty())
        } else {
            Ok(self.extensions.iter().any(|e| *e == ext))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use crate::entry::EntryKind;

    fn entry(path: &str) -> Entry {
        Entry::fake(
            Path::new("/inbox"),
            PathBuf::from(path),
            EntryKind::File,
            0,
            None,
            None,
        )
    }

    fn filter(toml: &str) -> ExtensionFilter {
        ExtensionFilter::from_params(&toml.parse().unwrap()).unwrap()
    }

    #[test]
    fn matches_listed_extensions_case_insensitively() {
        let f = filter(r#"extensions = ["pdf", ".JPG"]"#);
        let mut ctx = Context::new();
        assert!(f.matches(&entry("/inbox/a.PDF"), &mut ctx).unwrap());
        assert!(f.matches(&entry("/inbox/b.jpg"), &mut ctx).unwrap());
        assert!(!f.matches(&entry("/inbox/c.txt"), &mut ctx).unwrap());
    }

    #[test]
    fn empty_list_means_any_extension() {
        let f = filter("");
        let mut ctx = Context::new();
        assert!(f.matches(&entry("/inbox/a.tar"), &mut ctx).unwrap());
        assert!(!f.matches(&entry("/inbox/README"), &mut ctx).unwrap());
    }

    #[test]
    fn unknown_param_is_rejected() {
        let table: Table = r#"glob = "*.pdf""#.parse().unwrap();
        assert!(ExtensionFilter::from_params(&table).is_err());
    }
}
