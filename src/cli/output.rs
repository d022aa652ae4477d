//! Output formatting helpers for CLI commands

use crate::aggregator::FleetSummary;
use crate::api::DiagnosisResponse;
use crate::probe::ProbeStatus;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::fmt::Write;

fn status_label(status: ProbeStatus) -> String {
    match status {
        ProbeStatus::Up => "up".green().to_string(),
        ProbeStatus::Slow => "slow".yellow().to_string(),
        ProbeStatus::Down => "down".red().to_string(),
    }
}

/// Get status icon for a probe status
pub fn status_icon(status: ProbeStatus) -> &'static str {
    match status {
        ProbeStatus::Up => "✓",
        ProbeStatus::Slow => "~",
        ProbeStatus::Down => "✗",
    }
}

/// Format a fleet round as a table followed by the up/total line.
pub fn format_fleet_table(summary: &FleetSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Machine", "Service", "Category", "Status", "Latency", "Detail"]);

    for s in &summary.services {
        table.add_row(vec![
            Cell::new(&s.machine),
            Cell::new(&s.name),
            Cell::new(s.category),
            Cell::new(status_label(s.status)),
            Cell::new(format!("{}ms", s.latency_ms())),
            Cell::new(s.detail.as_deref().unwrap_or("")),
        ]);
    }

    format!(
        "{}\n{}/{} services up ({:.0}%)",
        table,
        summary.summary.up,
        summary.summary.total,
        summary.summary.health * 100.0
    )
}

/// Format a machine diagnosis as indented text.
pub fn format_diagnosis(report: &DiagnosisResponse) -> String {
    let mut output = String::new();

    let host = if report.host_reachable {
        "reachable".green()
    } else {
        "unreachable".red()
    };
    let _ = writeln!(output, "{} ({}) - host {}", report.machine, report.ip, host);

    for s in &report.services {
        let _ = writeln!(
            output,
            "  {} {:<16} :{:<5} {:>6}ms {}",
            status_icon(s.status),
            s.name,
            s.port,
            s.latency,
            s.detail.as_deref().unwrap_or("")
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "{}", report.diagnosis.bold());
    for (i, step) in report.fix_steps.iter().enumerate() {
        let _ = writeln!(output, "  {}. {}", i + 1, step);
    }

    output
}
