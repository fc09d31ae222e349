//! Rule-based file organization engine.
//!
//! A rule pairs *locations* (directory trees to walk) with a *filter
//! chain* (predicates that decide whether an entry matches) and an
//! *action chain* (ordered operations applied to matches). The run
//! coordinator in [`run`] drives rules sequentially, resolves target
//! collisions through [`conflict`], and collects a [`report::RunReport`].
//! Simulate mode previews every action against the pre-run state without
//! touching the filesystem.

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conflict;
pub mod context;
pub mod entry;
pub mod error;
pub mod exec;
pub mod filters;
pub mod fsops;
pub mod logging;
pub mod registry;
pub mod report;
pub mod run;
pub mod template;
pub mod walker;
