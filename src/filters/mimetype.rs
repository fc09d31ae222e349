//! Match entries by guessed MIME type.

use toml::Table;

use crate::config::params;
use crate::context::{Context, Value};
use crate::entry::Entry;
use crate::error::{ConfigError, FilterError};
use crate::filters::Filter;

/// Matches when the MIME type guessed from the file name equals one of the
/// configured types, or falls under one of the configured major types
/// (`"image"` matches `image/png`).
///
/// On a match the full guessed type is published to the context as
/// `mimetype`. A name with no known mapping never matches.
#[derive(Debug)]
pub struct MimetypeFilter {
    wanted: Vec<String>,
}

impl MimetypeFilter {
    /// Build from raw params: `types` (string or list, required).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BadParams`] on unknown keys or an empty list.
    pub fn from_params(table: &Table) -> Result<Self, ConfigError> {
        params::ensure_known(table, "mimetype", &["types"])?;
        let wanted: Vec<String> = params::str_list(table, "mimetype", "types")?
            .into_iter()
            .map(|t| t.to_lowercase())
            .collect();
        if wanted.is_empty() {
            return Err(ConfigError::BadParams {
                capability: "mimetype".into(),
                message: "requires at least one type, e.g. \"image\" or \"application/pdf\""
                    .into(),
            });
        }
        Ok(Self { wanted })
    }
}

impl Filter for MimetypeFilter {
    fn matches(&self, entry: &Entry, ctx: &mut Context) -> Result<bool, FilterError> {
        let Some(guess) = mime_guess::from_path(entry.path()).first() else {
            return Ok(false);
        };
        let full = guess.essence_str().to_lowercase();
        let major = guess.type_().as_str().to_lowercase();
        if self.wanted.iter().any(|w| *w == full || *w == major) {
            ctx.insert("mimetype", Value::from(full));
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
