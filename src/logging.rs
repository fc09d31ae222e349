//! Tracing setup and end-of-run summary output.
//!
//! Diagnostics go to stderr through `tracing`; the user-facing run summary
//! goes to stdout so it can be piped and diffed.

use tracing_subscriber::EnvFilter;

use crate::report::{ActionStatus, EntryStatus, RunReport};

/// Install the global tracing subscriber.
///
/// Verbosity maps `-v` to info and `-vv` to debug; `RUST_LOG` overrides
/// both when set. Safe to call once per process.
pub fn init(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "organize_cli=info",
        _ => "organize_cli=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn status_mark(status: ActionStatus) -> &'static str {
    match status {
        ActionStatus::Done => "✓",
        ActionStatus::WouldDo => "~",
        ActionStatus::Skipped => "-",
        ActionStatus::Failed => "✗",
    }
}

/// Print the user-facing run summary to stdout.
pub fn print_summary(report: &RunReport) {
    for err in &report.rule_errors {
        println!("✗ rule {}: {}", err.rule, err.message);
    }
    for entry in &report.entries {
        let mark = match entry.status {
            // Clean rejections are summarized by the totals line only.
            EntryStatus::NotMatched { .. } => continue,
            EntryStatus::Matched if entry.error.is_none() => "✓",
            EntryStatus::Skipped => "-",
            _ => "✗",
        };
        println!("{mark} [{}] {}", entry.rule, entry.path.display());
        for record in &entry.records {
            println!(
                "    {} {}: {}",
                status_mark(record.status),
                record.action,
                record.detail
            );
        }
        if entry.records.is_empty() {
            if let Some(error) = &entry.error {
                println!("    ✗ {error}");
            }
        }
    }

    let mut line = format!(
        "{} matched, {} not matched, {} actions",
        report.matched(),
        report.not_matched(),
        report.actions_done(),
    );
    let degraded = report.filter_degraded();
    if degraded > 0 {
        line.push_str(&format!(" ({degraded} degraded by filter errors)"));
    }
    let failures = report.errored() + report.rule_errors.len();
    if failures > 0 {
        line.push_str(&format!(", {failures} failed"));
    }
    println!("{line}");
    if report.simulate {
        println!("simulation only, nothing was changed");
    }
}
