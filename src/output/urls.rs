//! Plain URL list export: one URL per line, in page store order

use crate::output::OutputResult;
use crate::store::PageStore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn format_url_list(store: &PageStore) -> String {
    let mut out = String::new();
    for record in store {
        out.push_str(&record.url);
        out.push('\n');
    }
    out
}

pub fn write_url_list(store: &PageStore, output_path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    for record in store {
        writeln!(writer, "{}", record.url)?;
    }
    writer.flush()?;
    Ok(())
}
