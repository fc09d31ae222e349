//! Deterministic directory traversal for a rule location.
//!
//! Globs are compiled once per location at rule compile time; walking then
//! yields entries in natural name order, pruning excluded directories and
//! anything this run has already produced.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;
use std::sync::Mutex;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{Location, Targets};
use crate::entry::Entry;
use crate::error::{ConfigError, WalkError};

/// File names never yielded regardless of configuration.
const SYSTEM_EXCLUDE_FILES: &[&str] = &[
    ".DS_Store",
    ".localized",
    "thumbs.db",
    "desktop.ini",
    "~$*",
    "*.crdownload",
    "*.part",
];

/// Directory names never descended into regardless of configuration.
const SYSTEM_EXCLUDE_DIRS: &[&str] = &[".git", ".svn"];

/// Paths created by actions earlier in the same run.
///
/// Walkers consult this set so a run never reprocesses its own output, which
/// keeps a run a single pass even when a rule writes into a directory another
/// rule scans.
#[derive(Debug, Default)]
pub struct ProducedPaths(Mutex<HashSet<PathBuf>>);

impl ProducedPaths {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: PathBuf) {
        if let Ok(mut set) = self.0.lock() {
            set.insert(normalize(&path));
        }
    }

    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.0
            .lock()
            .map(|set| set.contains(&normalize(path)))
            .unwrap_or(false)
    }
}

/// Canonical form used for path identity, so the same file reached through
/// two spellings (trailing `./`, a symlinked root) compares equal. A path
/// that does not exist yet normalizes through its parent.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => dunce::canonicalize(parent)
            .map_or_else(|_| path.to_path_buf(), |canonical| canonical.join(name)),
        _ => path.to_path_buf(),
    }
}

/// A [`Location`] with its globs compiled, ready to walk.
#[derive(Debug)]
pub struct CompiledLocation {
    root: PathBuf,
    depth: Option<usize>,
    follow_symlinks: bool,
    include: Option<GlobSet>,
    exclude_files: GlobSet,
    exclude_dirs: GlobSet,
}

impl CompiledLocation {
    /// Compile the location's glob patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Glob`] for a malformed pattern.
    pub fn compile(location: &Location) -> Result<Self, ConfigError> {
        let include = if location.include.is_empty() {
            None
        } else {
            Some(build_glob_set(&location.include)?)
        };
        let mut exclude_files: Vec<String> =
            SYSTEM_EXCLUDE_FILES.iter().map(ToString::to_string).collect();
        exclude_files.extend(location.exclude_files.iter().cloned());
        let mut exclude_dirs: Vec<String> =
            SYSTEM_EXCLUDE_DIRS.iter().map(ToString::to_string).collect();
        exclude_dirs.extend(location.exclude_dirs.iter().cloned());

        Ok(Self {
            root: location.path.clone(),
            depth: location.effective_depth(),
            follow_symlinks: location.follow_symlinks,
            include,
            exclude_files: build_glob_set(&exclude_files)?,
            exclude_dirs: build_glob_set(&exclude_dirs)?,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the location and collect entries matching `targets`.
    ///
    /// Per-entry read failures become `Err` items so a single unreadable
    /// entry never aborts the walk. A missing root yields a single
    /// [`WalkError`] for the root itself.
    pub fn walk(&self, targets: Targets, produced: &ProducedPaths) -> Vec<Result<Entry, WalkError>> {
        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(self.follow_symlinks)
            .sort_by(|a, b| {
                natural_cmp(
                    &a.file_name().to_string_lossy(),
                    &b.file_name().to_string_lossy(),
                )
            });
        if let Some(depth) = self.depth {
            walker = walker.max_depth(depth);
        }

        let mut out = Vec::new();
        let iter = walker
            .into_iter()
            .filter_entry(|dirent| self.keep(dirent.path(), dirent.file_type().is_dir(), produced));
        for item in iter {
            match item {
                Ok(dirent) => {
                    let is_dir = dirent.file_type().is_dir();
                    if is_dir && !targets.includes_dirs() {
                        continue;
                    }
                    if !is_dir && !targets.includes_files() {
                        continue;
                    }
                    if !is_dir && !self.include_matches(dirent.path()) {
                        continue;
                    }
                    let path = dirent.into_path();
                    out.push(
                        Entry::from_path(&self.root, path.clone())
                            .map_err(|source| WalkError::Io { path, source }),
                    );
                }
                Err(err) => out.push(Err(convert_walk_error(err, &self.root))),
            }
        }
        debug!(root = %self.root.display(), entries = out.len(), "walked location");
        out
    }

    /// Traversal predicate: excluded directories are pruned with their whole
    /// subtree, excluded and produced paths are dropped. The include globs
    /// are deliberately not applied here since a non-matching directory may
    /// still contain matching files.
    fn keep(&self, path: &Path, is_dir: bool, produced: &ProducedPaths) -> bool {
        if produced.contains(path) {
            debug!(path = %path.display(), "skipping path produced by this run");
            return false;
        }
        let Some(name) = path.file_name() else {
            return true;
        };
        if is_dir {
            !self.exclude_dirs.is_match(Path::new(name))
        } else {
            !self.exclude_files.is_match(Path::new(name))
        }
    }

    fn include_matches(&self, path: &Path) -> bool {
        match (&self.include, path.file_name()) {
            (Some(set), Some(name)) => set.is_match(Path::new(name)),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| ConfigError::Glob {
                pattern: pattern.clone(),
                message: err.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|err| ConfigError::Glob {
        pattern: patterns.join(", "),
        message: err.to_string(),
    })
}

fn convert_walk_error(err: walkdir::Error, root: &Path) -> WalkError {
    let path = err
        .path()
        .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    // Loop errors carry no io::Error, so check for the cycle first.
    if let Some(ancestor) = err.loop_ancestor() {
        return WalkError::SymlinkLoop {
            path,
            ancestor: ancestor.to_path_buf(),
        };
    }
    match err.into_io_error() {
        Some(source) if source.kind() == std::io::ErrorKind::NotFound => {
            WalkError::Disappeared { path }
        }
        Some(source) => WalkError::Io { path, source },
        None => WalkError::Io {
            path,
            source: std::io::Error::other("walk failed"),
        },
    }
}

/// Case-insensitive ordering that compares digit runs by numeric value, so
/// `file2` sorts before `file10`. Falls back to byte order for names that
/// differ only in case or zero padding.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_cmp_chunks(a, b).then_with(|| a.cmp(b))
}

fn natural_cmp_chunks(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let ord = take_number(&mut ai).cmp(&take_number(&mut bi));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x
                    .to_lowercase()
                    .cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_number(it: &mut Peekable<Chars<'_>>) -> u64 {
    let mut n = 0u64;
    while let Some(d) = it.peek().and_then(|c| c.to_digit(10)) {
        n = n.saturating_mul(10).saturating_add(u64::from(d));
        it.next();
    }
    n
}
