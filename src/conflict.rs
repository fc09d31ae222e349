//! Target-collision resolution for mutating actions.
//!
//! When an action's intended target already exists, the configured
//! [`ConflictPolicy`] decides what happens. A collision with *no* configured
//! policy is always an error — the resolver never silently picks one.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConflictError;
use crate::fsops::FileOps;

/// Upper bound for the `rename_new` counter search.
pub const RENAME_BOUND: u32 = 1000;

/// Configured strategy for a target-path collision.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Abort this action only; the entry continues with its next action.
    Skip,
    /// Replace the existing target. Never a default — the original
    /// destination contents are lost.
    Overwrite,
    /// Append ` (n)` with the smallest counter strictly greater than any
    /// existing same-stem sibling's counter.
    RenameNew,
    /// Move the existing target to the system trash before the new write.
    Trash,
}

/// Outcome of resolving an intended target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Write may proceed at this (possibly counter-renamed) path. In real
    /// mode any pre-existing target has already been cleared.
    Proceed(PathBuf),
    /// The policy chose to skip this action.
    Skip,
}

/// Resolve `target` under `policy`.
///
/// In simulate mode the resolver only reads the filesystem: overwrite and
/// trash report the path they would clear without clearing it.
///
/// # Errors
///
/// Returns [`ConflictError::NoPolicy`] on a collision without a configured
/// policy, [`ConflictError::CounterExhausted`] when `rename_new` runs past
/// [`RENAME_BOUND`], and [`ConflictError::Clear`] when removing or trashing
/// the existing target fails.
pub fn resolve(
    target: &Path,
    policy: Option<ConflictPolicy>,
    fs: &dyn FileOps,
    simulate: bool,
) -> Result<Resolution, ConflictError> {
    resolve_bounded(target, policy, fs, simulate, RENAME_BOUND)
}

fn resolve_bounded(
    target: &Path,
    policy: Option<ConflictPolicy>,
    fs: &dyn FileOps,
    simulate: bool,
    bound: u32,
) -> Result<Resolution, ConflictError> {
    if !fs.exists(target) {
        return Ok(Resolution::Proceed(target.to_path_buf()));
    }

    match policy {
        None => Err(ConflictError::NoPolicy {
            target: target.to_path_buf(),
        }),
        Some(ConflictPolicy::Skip) => Ok(Resolution::Skip),
        Some(ConflictPolicy::Overwrite) => {
            if !simulate {
                fs.remove(target).map_err(|source| ConflictError::Clear {
                    target: target.to_path_buf(),
                    source,
                })?;
            }
            Ok(Resolution::Proceed(target.to_path_buf()))
        }
        Some(ConflictPolicy::Trash) => {
            if !simulate {
                fs.trash(target).map_err(|source| ConflictError::Clear {
                    target: target.to_path_buf(),
                    source,
                })?;
            }
            Ok(Resolution::Proceed(target.to_path_buf()))
        }
        Some(ConflictPolicy::RenameNew) => counter_rename(target, fs, bound),
    }
}

/// Find `stem (n)suffix` with `n` strictly greater than any existing
/// same-stem sibling counter. Deterministic for an unchanged filesystem.
fn counter_rename(
    target: &Path,
    fs: &dyn FileOps,
    bound: u32,
) -> Result<Resolution, ConflictError> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let stem = target
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    let suffix = target
        .extension()
        .map_or_else(String::new, |e| format!(".{}", e.to_string_lossy()));

    // The bare colliding target counts as counter 0.
    let mut highest = 0u32;
    if let Ok(siblings) = fs.list_dir(parent) {
        for sibling in siblings {
            let Some(name) = sibling.file_name() else {
                continue;
            };
            if let Some(n) = counter_of(&name.to_string_lossy(), &stem, &suffix) {
                highest = highest.max(n);
            }
        }
    }

    let mut n = highest.saturating_add(1);
    while n <= bound {
        let candidate = parent.join(format!("{stem} ({n}){suffix}"));
        if !fs.exists(&candidate) {
            return Ok(Resolution::Proceed(candidate));
        }
        n += 1;
    }
    Err(ConflictError::CounterExhausted {
        target: target.to_path_buf(),
        bound,
    })
}

/// Parse the counter out of `"stem (n)suffix"`, or `None` when `name` does
/// not follow that shape.
fn counter_of(name: &str, stem: &str, suffix: &str) -> Option<u32> {
    let rest = name.strip_prefix(stem)?.strip_prefix(" (")?;
    let rest = rest.strip_suffix(suffix)?;
    let digits = rest.strip_suffix(')')?;
    digits.parse().ok()
}
