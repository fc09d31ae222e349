//! Filesystem mutation boundary for dependency injection.
//!
//! Actions and the conflict resolver never call [`std::fs`] directly; they
//! go through the [`FileOps`] trait so unit tests can swap in
//! [`MockFileOps`] and assert on intended mutations without touching the
//! disk. Production code uses [`SystemFileOps`].

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem operations the engine performs.
pub trait FileOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns the immediate child paths inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be read as a directory.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Create `path` and all missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Move `from` to `to`, falling back to copy-and-delete when the rename
    /// crosses a filesystem boundary.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn move_entry(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy `from` to `to` (recursively for directories).
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn copy_entry(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Permanently remove `path` (recursively for directories).
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Move `path` to the system trash.
    ///
    /// # Errors
    ///
    /// Returns the underlying error on failure (no trash location, IPC
    /// failure, ...).
    fn trash(&self, path: &Path) -> io::Result<()>;

    /// Create or truncate `path` with `text`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;

    /// Append `text` to `path`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error on failure.
    fn append(&self, path: &Path, text: &str) -> io::Result<()>;
}

/// Production [`FileOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileOps;

impl FileOps for SystemFileOps {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.path()))
            .collect()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn move_entry(&self, from: &Path, to: &Path) -> io::Result<()> {
        match std::fs::rename(from, to) {
            Ok(()) => Ok(()),
            // Cross-device rename: stage a copy, then drop the source.
            Err(_) => {
                self.copy_entry(from, to)?;
                self.remove(from)
            }
        }
    }

    fn copy_entry(&self, from: &Path, to: &Path) -> io::Result<()> {
        if from.is_dir() {
            copy_dir_recursive(from, to)
        } else {
            std::fs::copy(from, to).map(|_| ())
        }
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }

    fn trash(&self, path: &Path) -> io::Result<()> {
        trash::delete(path).map_err(io::Error::other)
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        std::fs::write(path, text)
    }

    fn append(&self, path: &Path, text: &str) -> io::Result<()> {
        use std::io::Write as _;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(text.as_bytes())
    }
}

/// Copy a directory tree, following symlinks within the source.
fn copy_dir_recursive(from: &Path, to: &Path) -> io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

/// Mock [`FileOps`] for unit tests.
///
/// Pre-configure existing paths and directory listings with the
/// builder-style methods, then inspect the recorded operation log with
/// [`operations`](Self::operations). Mutating calls update the internal
/// "present" set so `exists` reflects earlier mock mutations.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileOps {
    state: std::sync::Mutex<MockState>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct MockState {
    present: std::collections::BTreeSet<PathBuf>,
    dirs: std::collections::BTreeMap<PathBuf, Vec<PathBuf>>,
    ops: Vec<String>,
}

#[cfg(test)]
impl MockFileOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as existing.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.lock(|s| {
            s.present.insert(path.into());
        });
        self
    }

    /// Mark `dir` as an existing directory with the given child paths.
    #[must_use]
    pub fn with_dir_entries(self, dir: impl Into<PathBuf>, entries: Vec<PathBuf>) -> Self {
        self.lock(|s| {
            let d = dir.into();
            s.present.insert(d.clone());
            for e in &entries {
                s.present.insert(e.clone());
            }
            s.dirs.insert(d, entries);
        });
        self
    }

    /// The recorded mutation log, in call order.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.lock(|s| s.clone()).ops
    }

    fn lock<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }

    fn record(&self, op: String) {
        self.lock(|s| s.ops.push(op));
    }
}

#[cfg(test)]
impl Clone for MockState {
    fn clone(&self) -> Self {
        Self {
            present: self.present.clone(),
            dirs: self.dirs.clone(),
            ops: self.ops.clone(),
        }
    }
}

#[cfg(test)]
impl FileOps for MockFileOps {
    fn exists(&self, path: &Path) -> bool {
        self.lock(|s| s.present.contains(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.lock(|s| s.dirs.contains_key(path))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        self.lock(|s| s.dirs.get(path).cloned()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock: no entries for {}", path.display()),
            )
        })
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.record(format!("mkdir -p {}", path.display()));
        self.lock(|s| {
            s.present.insert(path.to_path_buf());
        });
        Ok(())
    }

    fn move_entry(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(format!("move {} -> {}", from.display(), to.display()));
        self.lock(|s| {
            s.present.remove(from);
            s.present.insert(to.to_path_buf());
        });
        Ok(())
    }

    fn copy_entry(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(format!("copy {} -> {}", from.display(), to.display()));
        self.lock(|s| {
            s.present.insert(to.to_path_buf());
        });
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.record(format!("remove {}", path.display()));
        self.lock(|s| {
            s.present.remove(path);
        });
        Ok(())
    }

    fn trash(&self, path: &Path) -> io::Result<()> {
        self.record(format!("trash {}", path.display()));
        self.lock(|s| {
            s.present.remove(path);
        });
        Ok(())
    }

    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        self.record(format!("write {} ({} bytes)", path.display(), text.len()));
        self.lock(|s| {
            s.present.insert(path.to_path_buf());
        });
        Ok(())
    }

    fn append(&self, path: &Path, text: &str) -> io::Result<()> {
        self.record(format!("append {} ({} bytes)", path.display(), text.len()));
        self.lock(|s| {
            s.present.insert(path.to_path_buf());
        });
        Ok(())
    }
}
