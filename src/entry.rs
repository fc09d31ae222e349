//! A filesystem entry under evaluation, with cached stat metadata.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::context::{Context, Value};

/// Kind of filesystem object an [`Entry`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Dir,
}

/// One filesystem entry yielded by the walker.
///
/// Created fresh per yield and never shared across entries. The tracked
/// `path` is updated in place when a real-mode action moves or renames the
/// entry, so later actions in the same chain observe the new location.
#[derive(Debug, Clone)]
pub struct Entry {
    path: PathBuf,
    root: PathBuf,
    kind: EntryKind,
    size: u64,
    created: Option<DateTime<Local>>,
    modified: Option<DateTime<Local>>,
}

impl Entry {
    /// Stat `path` and build an entry rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the path cannot be stat'ed
    /// (typically because it disappeared between enumeration and here).
    pub fn from_path(root: &Path, path: PathBuf) -> io::Result<Self> {
        let meta = std::fs::metadata(&path)?;
        let kind = if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        Ok(Self {
            path,
            root: root.to_path_buf(),
            kind,
            size: meta.len(),
            created: meta.created().ok().map(DateTime::<Local>::from),
            modified: meta.modified().ok().map(DateTime::<Local>::from),
        })
    }

    /// The entry's current (possibly action-updated) path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The location root this entry was walked from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether this entry is a file or a directory.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Size in bytes at stat time.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Creation timestamp, when the platform reports one.
    #[must_use]
    pub const fn created(&self) -> Option<DateTime<Local>> {
        self.created
    }

    /// Last-modification timestamp, when the platform reports one.
    #[must_use]
    pub const fn modified(&self) -> Option<DateTime<Local>> {
        self.modified
    }

    /// Final path component.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }

    /// File stem (name without the final extension).
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }

    /// Lower-cased extension without the leading dot, or an empty string.
    #[must_use]
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map_or_else(String::new, |e| e.to_string_lossy().to_lowercase())
    }

    /// Path relative to the location root, or the full path when the entry
    /// has moved outside it.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        self.path
            .strip_prefix(&self.root)
            .map_or_else(|_| self.path.clone(), Path::to_path_buf)
    }

    /// Update the tracked path after a real-mode move or rename, refreshing
    /// the path-derived built-in keys in `ctx` so subsequent actions see the
    /// new location.
    pub fn relocate(&mut self, new_path: PathBuf, ctx: &mut Context) {
        self.path = new_path;
        self.seed_path_keys(ctx);
    }

    /// Seed all built-in context keys for this entry (including the run
    /// timestamp `now`).
    pub fn seed_context(&self, ctx: &mut Context) {
        self.seed_path_keys(ctx);
        ctx.set_builtin("size", Value::Int(i64::try_from(self.size).unwrap_or(i64::MAX)));
        if let Some(t) = self.created {
            ctx.set_builtin("created", Value::timestamp_table(t));
        }
        if let Some(t) = self.modified {
            ctx.set_builtin("lastmodified", Value::timestamp_table(t));
        }
        ctx.set_builtin("now", Value::timestamp_table(Local::now()));
    }

    fn seed_path_keys(&self, ctx: &mut Context) {
        ctx.set_builtin("path", Value::from(self.path.to_string_lossy().into_owned()));
        ctx.set_builtin(
            "relative_path",
            Value::from(self.relative_path().to_string_lossy().into_owned()),
        );
        ctx.set_builtin("name", Value::from(self.stem()));
        ctx.set_builtin("filename", Value::from(self.file_name()));
        ctx.set_builtin("extension", Value::from(self.extension()));
    }

    /// Build an entry without touching the filesystem. Test use only.
    #[cfg(test)]
    #[must_use]
    pub fn fake(
        root: &Path,
        path: PathBuf,
        kind: EntryKind,
        size: u64,
        created: Option<DateTime<Local>>,
        modified: Option<DateTime<Local>>,
    ) -> Self {
        Self {
            path,
            root: root.to_path_buf(),
            kind,
            size,
            created,
            modified,
        }
    }
}
