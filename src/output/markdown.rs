//! Markdown digest generation
//!
//! This module renders notification bodies as markdown tables: the
//! new-content digest sent after a pass and the error digest sent when the
//! worker gives up.

use crate::model::{MovieRecord, ScrapedItem};

/// Formats the new-content digest
///
/// # Arguments
///
/// * `new_series` - Titles that just got a new episode available
/// * `new_seasons` - Tracked titles whose detail page reports newer content
///
/// # Returns
///
/// A markdown string with one table per non-empty group
pub fn format_new_content_digest(new_series: &[ScrapedItem], new_seasons: &[ScrapedItem]) -> String {
    let mut md = String::new();

    if !new_series.is_empty() {
        md.push_str(&format!("New series available: {}\n\n", new_series.len()));
        md.push_str("| Title | Info | Link |\n");
        md.push_str("|-------|------|------|\n");

        for item in new_series {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                cell(&item.title),
                cell(&item.info),
                cell(item.link.as_deref().unwrap_or_default())
            ));
        }
    }

    if !new_seasons.is_empty() {
        if !md.is_empty() {
            md.push('\n');
        }

        md.push_str(&format!(
            "New season(s) or episode(s) available: {}\n\n",
            new_seasons.len()
        ));
        md.push_str("| Title | Info | Season | Episode | Link |\n");
        md.push_str("|-------|------|--------|---------|------|\n");

        for item in new_seasons {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                cell(&item.title),
                cell(&item.info),
                optional(item.last_season),
                optional(item.last_episode),
                cell(item.link.as_deref().unwrap_or_default())
            ));
        }
    }

    md
}

/// Formats an error notification body
pub fn format_error_digest(title: &str, detail: &str) -> String {
    format!("{}: {}\n", title, detail)
}

/// Formats newly tracked records as a table for the log
pub fn format_record_table(records: &[MovieRecord]) -> String {
    let mut md = String::new();
    md.push_str("| Id | Title | Info | Season | Episode | State | Link |\n");
    md.push_str("|----|-------|------|--------|---------|-------|------|\n");

    for record in records {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            record.id,
            cell(&record.title),
            cell(record.info.as_deref().unwrap_or_default()),
            optional(record.last_season),
            optional(record.last_episode),
            record.state,
            cell(record.link.as_deref().unwrap_or_default())
        ));
    }

    md
}

// Keeps user text from breaking the table layout
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn optional(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
