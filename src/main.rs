use clap::Parser;

use organize_cli::cli::{Cli, Command};
use organize_cli::{commands, logging};

fn main() -> std::process::ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let result = match &cli.command {
        Command::Run(args) => commands::run::execute(&cli.global.config, args, false),
        Command::Sim(args) => commands::run::execute(&cli.global.config, args, true),
        Command::Check => commands::check::execute(&cli.global.config),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::ExitCode::FAILURE
        }
    }
}
