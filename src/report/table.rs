//! Terminal table for the `show` command.
//!
//! Same rows as the markdown detail table, aligned for a terminal, with
//! refills called out and the summary underneath.

use super::Row;
use crate::stats::{OrNa, Summary};

pub fn render(rows: &[Row], summary: &Summary, unit_label: &str) -> String {
    if rows.is_empty() {
        return String::from("No snapshots recorded.\n");
    }

    let mut output = String::new();

    output.push_str(&format!(
        "{:<12} {:>14} {:>14}  {}\n",
        "Date",
        truncate(&format!("remaining {unit_label}"), 14),
        truncate(&format!("{unit_label} used"), 14),
        "note"
    ));
    output.push_str(&"-".repeat(56));
    output.push('\n');

    for row in rows {
        let note = match (row.consumed, row.refilled) {
            (_, Some(added)) => format!("refill +{added}"),
            (None, _) => String::from("oldest"),
            _ => String::new(),
        };
        output.push_str(
            format!(
                "{:<12} {:>14} {:>14}  {note}",
                row.date.format("%Y-%m-%d"),
                row.remaining,
                OrNa(row.consumed).to_string()
            )
            .trim_end(),
        );
        output.push('\n');
    }

    output.push_str(&format!(
        "\naverage per day: {}\ndays remaining:  {}\n",
        OrNa(summary.average),
        OrNa(summary.days_remaining)
    ));

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
