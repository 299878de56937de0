use std::fs;

use anyhow::{Context, Result};
use unitime_sync_core::{
    Error, ScheduleEntry, SyncReport,
    calendar::GoogleCalendarClient,
    extract::ScheduleExtractor,
    ics::{IcsExporter, IcsOptions},
    sync::SyncEngine,
};

/// Loads entries from a saved page or a previously exported JSON file.
///
/// JSON inputs let an edited entry set round-trip through the sync/export
/// commands without re-scraping the page.
fn load_entries(input: &str) -> Result<Vec<ScheduleEntry>> {
    let content =
        fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?;

    if input.ends_with(".json") {
        serde_json::from_str(&content).with_context(|| format!("invalid entries JSON in {input}"))
    } else {
        match ScheduleExtractor::new().extract(&content) {
            Ok(entries) => Ok(entries),
            Err(Error::WrongView) => Err(anyhow::anyhow!(
                "the saved page is showing the Time Grid view; \
                 switch to List of Classes and save it again"
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// Extracts entries and writes them as JSON.
pub fn extract_command(input: &str, output: Option<String>) -> Result<()> {
    let entries = load_entries(input)?;
    tracing::info!(count = entries.len(), "extracted schedule entries");

    if entries.is_empty() {
        println!("No schedule entries found (the schedule may be empty).");
    }

    let json = serde_json::to_string_pretty(&entries)?;
    match output {
        Some(path) => {
            fs::write(&path, json)?;
            println!("✓ {} entries written to {}", entries.len(), path);
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Runs the sync engine and prints the aggregated report.
pub async fn sync_command(
    input: &str,
    token: &str,
    calendar: String,
    timezone: String,
) -> Result<()> {
    // A failure before the per-entry loop becomes one synthetic failed
    // result so the report shape stays uniform.
    let report = match load_entries(input) {
        Ok(entries) => {
            if entries.is_empty() {
                println!("No schedule entries found; nothing to sync.");
                return Ok(());
            }
            println!("Syncing {} entries...", entries.len());
            let engine = SyncEngine::new(GoogleCalendarClient::new())
                .with_calendar_id(calendar)
                .with_time_zone(timezone);
            engine.synchronize_report(&entries, token).await
        }
        Err(e) => SyncReport::from_batch_error("Calendar sync", format!("{e:#}")),
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!("{}", report.headline());
    println!(
        "  added: {}  skipped: {}  failed: {}",
        report.added, report.skipped, report.failed
    );
    for result in &report.results {
        if result.success && result.skipped {
            println!("  - {} (already exists)", result.summary);
        } else if result.success && result.updated {
            println!("  ✓ {} (updated)", result.summary);
        } else if result.success {
            println!("  ✓ {}", result.summary);
        } else {
            println!("  ✗ {}: {}", result.summary, result.friendly_error());
            if let Some(ref raw) = result.error {
                tracing::debug!(entry = %result.summary, error = %raw, "sync failure detail");
            }
        }
    }
}

/// Exports entries as an ICS file.
pub fn export_command(
    input: &str,
    output: Option<String>,
    calendar_name: Option<String>,
    timezone: String,
) -> Result<()> {
    let entries = load_entries(input)?;
    tracing::info!(count = entries.len(), "exporting schedule entries");

    let exporter = IcsExporter::new(IcsOptions {
        calendar_name,
        timezone,
        ..IcsOptions::default()
    });
    let ics = exporter.export(&entries)?;

    let output_file = output.unwrap_or_else(|| "schedule.ics".to_string());
    fs::write(&output_file, ics)?;
    println!("✓ ICS file saved to {output_file}");
    Ok(())
}
