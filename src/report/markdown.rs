//! Markdown report body.
//!
//! Layout:
//! - title and embedded chart
//! - statistics table (average consumption, estimated days remaining)
//! - detail table with one row per retained snapshot, newest first

use std::fmt::Write;

use super::rows;
use crate::history::History;
use crate::stats::{OrNa, Summary};

pub struct ReportText {
    pub title: String,
    pub unit_label: String,
    /// Link to the chart, relative to the report file.
    pub chart_link: String,
}

pub fn compose(history: &History, summary: &Summary, text: &ReportText) -> String {
    let mut out = String::new();
    let unit = &text.unit_label;

    // writing to a String never fails
    let _ = writeln!(out, "# {}\n", text.title);
    let _ = writeln!(out, "![Usage trend]({})\n", text.chart_link);

    let _ = writeln!(out, "## Usage statistics\n");
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|------|------|");
    let _ = writeln!(out, "| Average {unit} used per day | {} |", OrNa(summary.average));
    let _ = writeln!(out, "| Estimated days remaining | {} |\n", OrNa(summary.days_remaining));

    let _ = writeln!(out, "## Details\n");
    let _ = writeln!(out, "| Date | Remaining {unit} | {unit} used |");
    let _ = writeln!(out, "|------|------|------|");
    for row in rows(history) {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            row.date.format("%Y-%m-%d"),
            row.remaining,
            OrNa(row.consumed)
        );
    }

    out
}
