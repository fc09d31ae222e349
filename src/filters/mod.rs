//! The filter chain: predicates that decide whether an entry matches a rule.
//!
//! Filters are compiled from raw config at rule compile time and evaluated
//! in declaration order with short-circuiting. A filter may also enrich the
//! entry's [`Context`] with extracted values (regex captures, mime type) for
//! later filters and action templates to use.

pub mod dates;
pub mod empty;
pub mod extension;
pub mod mimetype;
pub mod name;
pub mod regex;
pub mod size;

use crate::config::{FilterErrorMode, FilterMode};
use crate::context::Context;
use crate::entry::Entry;
use crate::error::FilterError;

/// A single predicate over an entry.
///
/// Implementations must not touch the filesystem beyond the entry itself,
/// and must treat a failed extraction (unreadable metadata, missing
/// timestamp) as a [`FilterError`] rather than a silent non-match.
pub trait Filter: Send + Sync + std::fmt::Debug {
    /// Evaluate the predicate, optionally enriching `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] when the underlying extraction fails.
    fn matches(&self, entry: &Entry, ctx: &mut Context) -> Result<bool, FilterError>;
}

/// A filter plus its configured negation, as it appears in a rule.
#[derive(Debug)]
pub struct CompiledFilter {
    name: String,
    negate: bool,
    inner: Box<dyn Filter>,
}

impl CompiledFilter {
    #[must_use]
    pub fn new(name: impl Into<String>, negate: bool, inner: Box<dyn Filter>) -> Self {
        Self {
            name: name.into(),
            negate,
            inner,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Post-negation result for this filter.
    ///
    /// # Errors
    ///
    /// Propagates the inner filter's [`FilterError`]. Negation does not
    /// apply to errors; a failed extraction is never a match either way.
    pub fn evaluate(&self, entry: &Entry, ctx: &mut Context) -> Result<bool, FilterError> {
        let hit = self.inner.matches(entry, ctx)?;
        Ok(hit != self.negate)
    }
}

/// How a whole filter chain judged one entry.
#[derive(Debug)]
pub enum ChainVerdict {
    /// The entry matched; actions run.
    Matched,
    /// The entry did not match. `errored` is set when a filter error was
    /// absorbed on the way to this verdict, so reports can tell a clean
    /// non-match from a degraded one.
    NotMatched {
        /// At least one filter failed and was counted as non-matching.
        errored: bool,
    },
    /// A filter failed and the rule escalates filter errors.
    Errored(FilterError),
}

/// An ordered set of filters combined under a [`FilterMode`].
#[derive(Debug)]
pub struct FilterChain {
    mode: FilterMode,
    on_error: FilterErrorMode,
    filters: Vec<CompiledFilter>,
}

impl FilterChain {
    #[must_use]
    pub fn new(mode: FilterMode, on_error: FilterErrorMode, filters: Vec<CompiledFilter>) -> Self {
        Self {
            mode,
            on_error,
            filters,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Evaluate the chain against one entry.
    ///
    /// An empty chain matches everything. Evaluation short-circuits as soon
    /// as the mode's outcome is decided: `all` stops at the first
    /// non-match, `any` at the first match, `none` at the first match.
    /// Under the default error mode a failed filter counts as non-matching;
    /// under escalation the first failure decides the entry.
    pub fn evaluate(&self, entry: &Entry, ctx: &mut Context) -> ChainVerdict {
        let mut errored = false;
        let mut step = |filter: &CompiledFilter, ctx: &mut Context| match filter
            .evaluate(entry, ctx)
        {
            Ok(hit) => Ok(hit),
            Err(err) if self.on_error == FilterErrorMode::Error => Err(err),
            Err(err) => {
                tracing::debug!(filter = filter.name(), %err, "filter failed, counting as non-match");
                errored = true;
                Ok(false)
            }
        };

        let matched = match self.mode {
            FilterMode::All => {
                let mut all = true;
                for filter in &self.filters {
                    match step(filter, ctx) {
                        Ok(true) => {}
                        Ok(false) => {
                            all = false;
                            break;
                        }
                        Err(err) => return ChainVerdict::Errored(err),
                    }
                }
                all
            }
            FilterMode::Any => {
                let mut any = self.filters.is_empty();
                for filter in &self.filters {
                    match step(filter, ctx) {
                        Ok(true) => {
                            any = true;
                            break;
                        }
                        Ok(false) => {}
                        Err(err) => return ChainVerdict::Errored(err),
                    }
                }
                any
            }
            FilterMode::None => {
                let mut none = true;
                for filter in &self.filters {
                    match step(filter, ctx) {
                        Ok(true) => {
                            none = false;
                            break;
                        }
                        Ok(false) => {}
                        Err(err) => return ChainVerdict::Errored(err),
                    }
                }
                none
            }
        };

        if matched {
            ChainVerdict::Matched
        } else {
            ChainVerdict::NotMatched { errored }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::entry::EntryKind;

    #[derive(Debug)]
    struct Fixed(bool);

    impl Filter for Fixed {
        fn matches(&self, _: &Entry, _: &mut Context) -> Result<bool, FilterError> {
            Ok(self.0)
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Filter for Failing {
        fn matches(&self, _: &Entry, _: &mut Context) -> Result<bool, FilterError> {
            Err(FilterError {
                filter: "failing".into(),
                message: "boom".into(),
            })
        }
    }

    #[derive(Debug)]
    struct Counting(&'static AtomicUsize);

    impl Filter for Counting {
        fn matches(&self, _: &Entry, _: &mut Context) -> Result<bool, FilterError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    fn entry() -> Entry {
        Entry::fake(
            Path::new("/inbox"),
            PathBuf::from("/inbox/a.txt"),
            EntryKind::File,
            10,
            None,
            None,
        )
    }

    fn plain(hit: bool) -> CompiledFilter {
        CompiledFilter::new("fixed", false, Box::new(Fixed(hit)))
    }

    #[test]
    fn empty_chain_matches_everything() {
        for mode in [FilterMode::All, FilterMode::Any, FilterMode::None] {
            let chain = FilterChain::new(mode, FilterErrorMode::Ignore, Vec::new());
            assert!(matches!(
                chain.evaluate(&entry(), &mut Context::new()),
                ChainVerdict::Matched
            ));
        }
    }

    #[test]
    fn all_mode_requires_every_filter() {
        let chain = FilterChain::new(
            FilterMode::All,
            FilterErrorMode::Ignore,
            vec![plain(true), plain(false)],
        );
        assert!(matches!(
            chain.evaluate(&entry(), &mut Context::new()),
            ChainVerdict::NotMatched { errored: false }
        ));
    }

    #[test]
    fn any_mode_needs_one_filter() {
        let chain = FilterChain::new(
            FilterMode::Any,
            FilterErrorMode::Ignore,
            vec![plain(false), plain(true)],
        );
        assert!(matches!(
            chain.evaluate(&entry(), &mut Context::new()),
            ChainVerdict::Matched
        ));
    }

    #[test]
    fn none_mode_rejects_on_any_match() {
        let chain = FilterChain::new(
            FilterMode::None,
            FilterErrorMode::Ignore,
            vec![plain(false), plain(true)],
        );
        assert!(matches!(
            chain.evaluate(&entry(), &mut Context::new()),
            ChainVerdict::NotMatched { errored: false }
        ));
    }

    #[test]
    fn negation_flips_the_result() {
        let f = CompiledFilter::new("fixed", true, Box::new(Fixed(false)));
        assert!(f.evaluate(&entry(), &mut Context::new()).unwrap());
    }

    #[test]
    fn all_mode_short_circuits_after_a_non_match() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let chain = FilterChain::new(
            FilterMode::All,
            FilterErrorMode::Ignore,
            vec![
                CompiledFilter::new("counting", false, Box::new(Counting(&CALLS))),
                CompiledFilter::new("counting", false, Box::new(Counting(&CALLS))),
            ],
        );
        chain.evaluate(&entry(), &mut Context::new());
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn filter_error_counts_as_non_match_by_default() {
        let chain = FilterChain::new(
            FilterMode::All,
            FilterErrorMode::Ignore,
            vec![CompiledFilter::new("failing", false, Box::new(Failing))],
        );
        assert!(matches!(
            chain.evaluate(&entry(), &mut Context::new()),
            ChainVerdict::NotMatched { errored: true }
        ));
    }

    #[test]
    fn filter_error_is_not_flipped_by_negation() {
        let chain = FilterChain::new(
            FilterMode::All,
            FilterErrorMode::Ignore,
            vec![CompiledFilter::new("failing", true, Box::new(Failing))],
        );
        assert!(matches!(
            chain.evaluate(&entry(), &mut Context::new()),
            ChainVerdict::NotMatched { errored: true }
        ));
    }

    #[test]
    fn error_mode_escalates_the_first_failure() {
        let chain = FilterChain::new(
            FilterMode::Any,
            FilterErrorMode::Error,
            vec![
                CompiledFilter::new("failing", false, Box::new(Failing)),
                plain(true),
            ],
        );
        assert!(matches!(
            chain.evaluate(&entry(), &mut Context::new()),
            ChainVerdict::Errored(_)
        ));
    }
}
