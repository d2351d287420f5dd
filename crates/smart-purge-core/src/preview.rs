//! Read-only grouping and tabular export of scan items ahead of a purge.

use crate::error::Error;
use crate::model::ScanItem;
use chrono::NaiveDateTime;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const CSV_HEADER: &str = "Category,Name,Type,ID";

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    pub name: String,
    pub item_type: String,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewGroup {
    pub category: String,
    pub rows: Vec<PreviewRow>,
}

/// Group items by category label, categories sorted, item order kept within each.
pub fn group_items<'a>(items: impl IntoIterator<Item = &'a ScanItem>) -> Vec<PreviewGroup> {
    let mut grouped: BTreeMap<String, Vec<PreviewRow>> = BTreeMap::new();
    for item in items {
        grouped
            .entry(item.metadata.category.clone())
            .or_default()
            .push(PreviewRow {
                name: item.metadata.name.clone(),
                item_type: item.item_type.clone(),
                id: item.entity.id.value(),
            });
    }
    grouped
        .into_iter()
        .map(|(category, rows)| PreviewGroup { category, rows })
        .collect()
}

/// Human-readable listing, one section per category.
pub fn render_text(groups: &[PreviewGroup]) -> String {
    let total: usize = groups.iter().map(|g| g.rows.len()).sum();
    let mut out = format!("{} items in {} categories\n", total, groups.len());
    for group in groups {
        out.push_str(&format!("\n{} ({})\n", group.category, group.rows.len()));
        for row in &group.rows {
            out.push_str(&format!("  {:<48} {:<24} {}\n", row.name, row.item_type, row.id));
        }
    }
    out
}

/// Write the `Category,Name,Type,ID` table. Text fields are quoted, ids are not.
pub fn write_csv<W: Write>(mut writer: W, groups: &[PreviewGroup]) -> Result<usize, Error> {
    writeln!(writer, "{}", CSV_HEADER)?;

    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::NonNumeric)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut rows = 0;
    for group in groups {
        for row in &group.rows {
            let id = row.id.to_string();
            wtr.write_record([
                group.category.as_str(),
                row.name.as_str(),
                row.item_type.as_str(),
                id.as_str(),
            ])?;
            rows += 1;
        }
    }
    wtr.flush()?;
    Ok(rows)
}

pub fn to_csv_string(groups: &[PreviewGroup]) -> Result<String, Error> {
    let mut buf = Vec::new();
    write_csv(&mut buf, groups)?;
    String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))
}

pub fn export_csv(path: &Path, groups: &[PreviewGroup]) -> Result<usize, Error> {
    let file = File::create(path)?;
    let rows = write_csv(BufWriter::new(file), groups)?;
    info!("Exported {} rows to {}", rows, path.display());
    Ok(rows)
}

/// `PurgePreview_yyyyMMdd_HHmmss.csv`
pub fn default_export_name(now: NaiveDateTime) -> String {
    format!("PurgePreview_{}.csv", now.format("%Y%m%d_%H%M%S"))
}
