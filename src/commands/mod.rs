//! Command handlers: the thin layer between the CLI and the engine.

pub mod check;
pub mod run;
