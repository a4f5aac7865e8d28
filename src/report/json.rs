//! JSON output for the `show` command.
//!
//! Serializes detail rows and summary for scripting and piping.

use serde::Serialize;

use super::Row;
use crate::error::Result;
use crate::stats::Summary;

#[derive(Serialize)]
struct ShowDocument<'a> {
    summary: &'a Summary,
    rows: &'a [Row],
}

pub fn render(rows: &[Row], summary: &Summary) -> Result<String> {
    let doc = ShowDocument { summary, rows };
    Ok(serde_json::to_string_pretty(&doc)?)
}
