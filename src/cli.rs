//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Rule-based file organizer: declarative rules walk directories, match
/// entries through filters and apply ordered actions.
#[derive(Parser, Debug)]
#[command(name = "organize", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Path to the rule file.
    #[arg(short, long, global = true, default_value = "organize.toml")]
    pub config: PathBuf,

    /// Increase diagnostic verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the rules, changing the filesystem.
    Run(SelectArgs),

    /// Preview what a run would do without changing anything.
    Sim(SelectArgs),

    /// Load and compile the rule file, reporting problems.
    Check,
}

/// Tag-based rule selection.
#[derive(Args, Debug, Default)]
pub struct SelectArgs {
    /// Only run rules carrying one of these tags.
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Never run rules carrying one of these tags.
    #[arg(long, value_delimiter = ',')]
    pub skip_tags: Vec<String>,
}
