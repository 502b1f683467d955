//! Terminal output for run reports

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use vaultsync_core::error::ErrorSeverity;
use vaultsync_core::SyncReport;

fn header(table: &mut Table, names: &[&str], no_color: bool) {
    if no_color {
        table.set_header(names.to_vec());
    } else {
        table.set_header(
            names
                .iter()
                .map(|name| Cell::new(name).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

fn severity_label(severity: ErrorSeverity) -> &'static str {
    match severity {
        ErrorSeverity::Warning => "warning",
        ErrorSeverity::Error => "error",
    }
}

/// Counts table, followed by failed documents and rejected records if any
pub fn format_sync_report(report: &SyncReport, no_color: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(
        &mut table,
        &["Created", "Replaced", "Skipped", "Failed", "Records", "Rejected"],
        no_color,
    );
    table.add_row(Row::from(vec![
        report.created.to_string(),
        report.replaced.to_string(),
        report.skipped.to_string(),
        report.failures.len().to_string(),
        report.load.records_decoded.to_string(),
        report.load.records_rejected.to_string(),
    ]));

    let mut out = table.to_string();

    if !report.failures.is_empty() {
        let mut failures = Table::new();
        failures.set_content_arrangement(ContentArrangement::Dynamic);
        header(&mut failures, &["Document", "Error"], no_color);
        for failure in &report.failures {
            failures.add_row(Row::from(vec![&failure.document, &failure.message]));
        }
        out.push_str("\n\nFailed documents:\n");
        out.push_str(&failures.to_string());
    }

    if report.load.has_errors() {
        let mut problems = Table::new();
        problems.set_content_arrangement(ContentArrangement::Dynamic);
        header(&mut problems, &["Severity", "Source", "Message"], no_color);
        for error in &report.load.errors {
            problems.add_row(Row::from(vec![
                severity_label(error.severity),
                error.source.as_str(),
                error.message.as_str(),
            ]));
        }
        out.push_str("\n\nLoad problems:\n");
        out.push_str(&problems.to_string());
    }

    out
}
