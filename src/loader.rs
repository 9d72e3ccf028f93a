//! CSV ingest for dated amounts
//!
//! Turns the backing data file into `(date, amount)` records:
//! - Header names are trimmed (and lose a UTF-8 BOM) before lookup
//! - Rows older than the date range are excluded, future dates are kept
//! - Bad rows are skipped and reported, never fatal to the whole load
//! - Only a missing/unreadable/structurally broken file fails the load

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use thiserror::Error;

/// Column holding the record date
pub const DATE_COLUMN: &str = "Date";
/// Column holding the record amount
pub const AMOUNT_COLUMN: &str = "Amount";

/// Date-only layouts accepted in the `Date` column, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Date-time layouts; only the date component is kept.
/// `%.f` also matches when the fraction is absent.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// File-level load failure; the caller falls back to an empty population
#[derive(Debug, Error)]
pub enum SourceLoadError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read CSV header of '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("'{path}' has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Why a single row was skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowErrorKind {
    #[error("unparseable date {0:?}")]
    Date(String),
    #[error("unparseable amount {0:?}")]
    Amount(String),
    #[error("malformed row: {0}")]
    Malformed(String),
}

/// A skipped row, with its 1-based line number in the file
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {kind}")]
pub struct RowError {
    pub line: usize,
    pub kind: RowErrorKind,
}

/// One accepted row
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub line: usize,
    pub date: NaiveDate,
    pub amount: f64,
    /// Whole days between the load date and `date`; negative for future dates
    pub age_days: i64,
}

/// Outcome of a successful load
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<SourceRecord>,
    pub row_errors: Vec<RowError>,
    /// Data rows seen, including skipped and excluded ones
    pub rows_read: usize,
    /// Rows dropped for being older than the date range
    pub rows_excluded: usize,
}

impl LoadReport {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }
}

/// Load all records from the CSV file at `path`, dated relative to `today`
pub fn load_records(
    path: &Path,
    today: NaiveDate,
    date_range: i64,
) -> Result<LoadReport, SourceLoadError> {
    let file = File::open(path).map_err(|source| SourceLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let report = read_records(file, path, today, date_range)?;

    log::info!(
        "Loaded {} of {} rows from {} ({} too old, {} invalid)",
        report.rows_used(),
        report.rows_read,
        path.display(),
        report.rows_excluded,
        report.row_errors.len()
    );
    Ok(report)
}

/// Parse CSV from any reader; `path` is only used in errors and logs
pub fn read_records<R: Read>(
    reader: R,
    path: &Path,
    today: NaiveDate,
    date_range: i64,
) -> Result<LoadReport, SourceLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| SourceLoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let column = |name: &'static str| {
        find_column(&headers, name).ok_or_else(|| SourceLoadError::MissingColumn {
            path: path.to_path_buf(),
            column: name,
        })
    };
    let date_idx = column(DATE_COLUMN)?;
    let amount_idx = column(AMOUNT_COLUMN)?;

    let mut report = LoadReport::default();

    let mut last_line = 1;
    for result in reader.records() {
        report.rows_read += 1;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let line = record_line(e.position(), last_line);
                last_line = line;
                report.skip(path, RowError {
                    line,
                    kind: RowErrorKind::Malformed(e.to_string()),
                });
                continue;
            }
        };
        // Quoted fields may span lines, so ask the reader where the row began
        let line = record_line(row.position(), last_line);
        last_line = line;

        let raw_date = row.get(date_idx).unwrap_or_default();
        let date = match parse_date(raw_date) {
            Some(date) => date,
            None => {
                report.skip(path, RowError {
                    line,
                    kind: RowErrorKind::Date(raw_date.to_string()),
                });
                continue;
            }
        };

        let age_days = (today - date).num_days();
        if age_days > date_range {
            report.rows_excluded += 1;
            continue;
        }

        let raw_amount = row.get(amount_idx).unwrap_or_default();
        let amount = match parse_amount(raw_amount) {
            Some(amount) => amount,
            None => {
                report.skip(path, RowError {
                    line,
                    kind: RowErrorKind::Amount(raw_amount.to_string()),
                });
                continue;
            }
        };

        report.records.push(SourceRecord {
            line,
            date,
            amount,
            age_days,
        });
    }

    Ok(report)
}

impl LoadReport {
    fn skip(&mut self, path: &Path, error: RowError) {
        log::warn!("Skipping row in {}: {}", path.display(), error);
        self.row_errors.push(error);
    }
}

fn record_line(position: Option<&csv::Position>, last_line: usize) -> usize {
    position.map_or(last_line + 1, |p| p.line() as usize)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}

/// Strip `$`, `,` and surrounding whitespace, then parse a finite decimal
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(['$', ','], "");
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Parse a calendar date, discarding any time component
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
