//! CSV bulk import and export
//!
//! Import is deliberately lenient: rows are never rejected, only degraded.
//! The line splitter is hand-written because it must reproduce the exact
//! quote-toggle behaviour of the existing export files (an unbalanced quote
//! swallows the rest of the line instead of failing).
//!
//! Column order of data rows (row 0 is a header and is always discarded):
//!
//! | index | field |
//! |---|---|
//! | 0 | name |
//! | 1 | category |
//! | 2 | participants |
//! | 3 | videoLink2 |
//! | 4 | videoLink3 |
//! | 5 | videoLink1 |
//! | 6 | thumbnail |
//! | 7 | link |
//! | 8 | endDate |
//! | 9 | startDate |
//!
//! The video columns are not in numeric order. Every existing producer writes
//! them this way, so both import and export keep it.

use thiserror::Error;
use tracing::debug;

use crate::album::{Album, AlbumRecord, DEFAULT_CATEGORY, DEFAULT_NAME};

/// File extensions accepted for import; content is always comma-separated
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// Header row written by [`export_csv`]
pub const EXPORT_HEADER: [&str; 10] = [
    "相簿名稱",
    "分類",
    "參與者",
    "影片連結2",
    "影片連結3",
    "影片連結1",
    "縮圖",
    "相簿連結",
    "結束日期",
    "開始日期",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsvImportError {
    /// The document produced no albums at all
    #[error("cannot parse file: no album rows found")]
    NoRecords,

    #[error("unsupported file type: {0} (expected .csv, .tsv or .txt)")]
    UnsupportedExtension(String),
}

/// Split one line into fields
///
/// A double quote toggles quoted mode; a comma only splits outside quotes.
/// Each field is trimmed, one wrapping pair of quotes is removed, and `""`
/// collapses to `"`.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut raw_fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                raw_fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    raw_fields.push(&line[start..]);

    raw_fields.into_iter().map(clean_field).collect()
}

fn clean_field(raw: &str) -> String {
    let mut val = raw.trim();
    if val.len() >= 2 && val.starts_with('"') && val.ends_with('"') {
        val = &val[1..val.len() - 1];
    }
    val.replace("\"\"", "\"")
}

/// Build an album record from one data row
///
/// Returns `None` only for a row without any column. Missing or empty
/// optional columns become absent; `name` and `category` get defaults.
pub fn map_row(cols: &[String]) -> Option<AlbumRecord> {
    if cols.is_empty() {
        return None;
    }

    let col = |i: usize| -> Option<String> { cols.get(i).filter(|v| !v.is_empty()).cloned() };

    Some(AlbumRecord {
        name: col(0).unwrap_or_else(|| DEFAULT_NAME.to_string()),
        category: col(1).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        participants: col(2).unwrap_or_default(),
        video_link2: col(3),
        video_link3: col(4),
        video_link1: col(5),
        thumbnail: AlbumRecord::accept_thumbnail(col(6)),
        link: col(7),
        end_date: col(8),
        start_date: col(9),
    })
}

/// Parse a whole import document
///
/// Accepts `\r\n`, `\n` and `\r` line endings. The first line is the header;
/// blank lines are skipped.
pub fn parse_csv_document(text: &str) -> Result<Vec<AlbumRecord>, CsvImportError> {
    let normalized = text.replace("\r\n", "\n");
    let records: Vec<AlbumRecord> = normalized
        .split(['\n', '\r'])
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| map_row(&parse_csv_line(line)))
        .collect();

    debug!("Parsed {} album rows from import document", records.len());

    if records.is_empty() {
        return Err(CsvImportError::NoRecords);
    }
    Ok(records)
}

/// Check a file name against [`ACCEPTED_EXTENSIONS`] (case-insensitive)
pub fn check_import_file_name(file_name: &str) -> Result<(), CsvImportError> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(CsvImportError::UnsupportedExtension(file_name.to_string())),
    }
}

/// Write albums in the import column order, header first
pub fn export_csv(albums: &[Album]) -> crate::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(EXPORT_HEADER)
        .map_err(|e| crate::Error::Internal(format!("CSV write failed: {}", e)))?;

    for album in albums {
        let r = &album.record;
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        writer
            .write_record([
                r.name.clone(),
                r.category.clone(),
                r.participants.clone(),
                opt(&r.video_link2),
                opt(&r.video_link3),
                opt(&r.video_link1),
                opt(&r.thumbnail),
                opt(&r.link),
                opt(&r.end_date),
                opt(&r.start_date),
            ])
            .map_err(|e| crate::Error::Internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::Error::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| crate::Error::Internal(e.to_string()))
}
