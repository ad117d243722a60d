//! CSV and Markdown rendering of diff rows.
//!
//! Column order and header text are fixed; downstream scripts index
//! columns by position.

use csv::{Terminator, WriterBuilder};

use super::DiffRow;
use crate::error::{Result, SpecError};

pub const CSV_HEADER: [&str; 8] = [
    "name",
    "id",
    "lStatus",
    "rStatus",
    "typeDiff",
    "paramsDiff",
    "bodyDiff",
    "responseDiff",
];

fn columns(row: &DiffRow) -> [&str; 8] {
    [
        row.name.as_str(),
        row.id.as_str(),
        row.l_status.as_str(),
        row.r_status.as_str(),
        row.type_diff.as_str(),
        row.params_diff.as_str(),
        row.body_diff.as_str(),
        row.response_diff.as_str(),
    ]
}

/// Header line plus one line per row, `\n` terminated
pub fn to_csv(rows: &[DiffRow]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record(columns(row))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| SpecError::format(format!("diff export is not UTF-8: {}", e)))
}

fn md_cell(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

/// Markdown table with the CSV columns
pub fn to_markdown(rows: &[DiffRow]) -> String {
    let mut out = format!("| {} |\n", CSV_HEADER.join(" | "));
    out.push_str(&format!("|{}\n", " --- |".repeat(CSV_HEADER.len())));
    for row in rows {
        let cells: Vec<String> = columns(row).iter().map(|c| md_cell(c)).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}
