// Entry point and high-level flow.
//
// The run is four independent steps over one in-memory database:
// - load and clean the users CSV,
// - load and clean the call logs CSV,
// - write the per-user analytics report,
// - write the ordered call export.
// A failing step is logged and the remaining steps still run.
mod config;
mod error;
mod loader;
mod output;
mod reports;
mod storage;
mod types;
mod util;

use anyhow::Result;
use clap::Parser;
use config::Settings;
use storage::Storage;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use types::RunSummary;
use util::format_int;

fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

/// Record a failed step in the summary and log it; the run carries on.
fn step_failed(summary: &mut RunSummary, step: &str, e: &error::ReportError) {
    error!("Error {}: {}", step, e);
    summary.failed_steps.push(step.to_string());
}

fn handle_load_users(settings: &Settings, storage: &mut Storage, summary: &mut RunSummary) {
    match loader::load_and_clean_users(storage, &settings.users) {
        Ok(report) => {
            summary.users_loaded = report.inserted;
            summary.users_skipped = report.skipped;
        }
        Err(e) => step_failed(summary, "loading users", &e),
    }
}

fn handle_load_call_logs(settings: &Settings, storage: &mut Storage, summary: &mut RunSummary) {
    match loader::load_and_clean_call_logs(storage, &settings.call_logs) {
        Ok(report) => {
            summary.call_logs_loaded = report.inserted;
            summary.call_logs_skipped = report.skipped;
        }
        Err(e) => step_failed(summary, "loading call logs", &e),
    }
}

fn handle_dump(storage: &Storage) {
    match storage.users() {
        Ok(rows) => output::print_table("PRINTING DATA FROM USERS", &rows),
        Err(e) => error!("Error reading users: {}", e),
    }
    match storage.call_logs() {
        Ok(rows) => output::print_table("PRINTING DATA FROM CALLLOGS", &rows),
        Err(e) => error!("Error reading call logs: {}", e),
    }
}

fn handle_reports(settings: &Settings, storage: &Storage, summary: &mut RunSummary) {
    match reports::write_user_analytics(storage, &settings.analytics_out) {
        Ok(rows) => {
            summary.analytics_rows = rows.len();
            if settings.preview_rows > 0 {
                println!("User Analytics (avg call duration and calls per user)\n");
                output::preview_table_rows(&rows, settings.preview_rows);
                println!("(Full table exported to {})\n", settings.analytics_out.display());
            }
        }
        Err(e) => step_failed(summary, "writing user analytics", &e),
    }

    match reports::write_ordered_calls(storage, &settings.ordered_out) {
        Ok(rows) => {
            summary.ordered_rows = rows.len();
            if settings.preview_rows > 0 {
                println!("Ordered Calls (by userId, then startTime)\n");
                output::preview_table_rows(&rows, settings.preview_rows);
                println!("(Full table exported to {})\n", settings.ordered_out.display());
            }
        }
        Err(e) => step_failed(summary, "writing ordered calls", &e),
    }
}

/// Run every step against `storage` and report what happened.
fn run(settings: &Settings, storage: &mut Storage) -> RunSummary {
    let mut summary = RunSummary::default();

    handle_load_users(settings, storage, &mut summary);
    handle_load_call_logs(settings, storage, &mut summary);
    if let (Ok(users), Ok(calls)) = (storage.count_users(), storage.count_call_logs()) {
        debug!("Storage holds {} users and {} call logs", users, calls);
    }
    if settings.dump {
        handle_dump(storage);
    }
    handle_reports(settings, storage, &mut summary);

    info!(
        "Run finished: {} users, {} call logs, {} analytics rows, {} ordered rows, {} failed steps",
        format_int(summary.users_loaded),
        format_int(summary.call_logs_loaded),
        format_int(summary.analytics_rows),
        format_int(summary.ordered_rows),
        summary.failed_steps.len()
    );

    if let Some(path) = &settings.summary {
        if let Err(e) = output::write_json(path, &summary) {
            error!("Error writing run summary to {}: {}", path.display(), e);
        }
    }
    summary
}

fn main() -> Result<()> {
    let settings = Settings::parse();
    setup_logging(&settings.log_level);
    info!("call_report v{} starting", env!("CARGO_PKG_VERSION"));

    let mut storage = Storage::open_in_memory()?;
    run(&settings, &mut storage);
    Ok(())
}
