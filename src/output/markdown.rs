//! Markdown export
//!
//! This module renders the page store as a markdown document: a header with
//! run metadata followed by one section per crawl depth.

use crate::output::OutputResult;
use crate::store::{PageRecord, PageStore};
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown export to `output_path`
///
/// # Arguments
///
/// * `store` - The crawl results
/// * `max_depth` - The configured depth bound, recorded in the header
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the file
/// * `Err(OutputError)` - Failed to write it
pub fn write_markdown(store: &PageStore, max_depth: u32, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown(store, max_depth, Local::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the page store as markdown
///
/// Sections follow [`PageStore::by_depth`]: ascending depth, URL order
/// within a depth. Depth 0 is titled `Root`. Pages with extracted content
/// get it as a quoted block under their entry.
pub fn format_markdown(store: &PageStore, max_depth: u32, scraped_at: DateTime<Local>) -> String {
    let mut md = String::new();

    md.push_str("# Documentation URLs\n\n");
    md.push_str(&format!("**Total URLs collected:** {}\n", store.len()));
    md.push_str(&format!(
        "**Scraping date:** {}\n",
        scraped_at.format("%Y-%m-%d %H:%M:%S")
    ));
    md.push_str(&format!("**Max depth:** {}\n\n", max_depth));

    for (depth, records) in store.by_depth() {
        if depth == 0 {
            md.push_str("## Root\n\n");
        } else {
            md.push_str(&format!("## Level {} ({} URLs)\n\n", depth, records.len()));
        }

        for record in records {
            push_entry(&mut md, record);
        }
        md.push('\n');
    }

    md
}

fn push_entry(md: &mut String, record: &PageRecord) {
    md.push_str(&format!(
        "- [{}]({})\n",
        escape_link_text(&record.title),
        record.url
    ));

    if record.content.is_empty() {
        return;
    }

    md.push('\n');
    for line in record.content.lines() {
        if line.is_empty() {
            md.push_str("  >\n");
        } else {
            md.push_str(&format!("  > {}\n", line));
        }
    }
    md.push('\n');
}

/// Escapes characters that would end the link text early
fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
