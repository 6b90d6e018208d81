//! Row-stream adapters for tabular media.
//!
//! - [`dsv`] - CSV/TSV reading and writing
//! - [`markdown`] - Markdown pipe tables
//! - [`section`] - grouping rows by top-level field, one group per sheet
//!
//! Plain-text media carry no types, so the value column is coerced on load:
//! see [`coerce_cell`].

pub mod dsv;
pub mod markdown;
pub mod section;

pub use dsv::{read_records, read_rows, write_rows};
pub use markdown::render_markdown;
pub use section::{split_sections, Section};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{Address, MarkerScheme};
use crate::codec::CodecError;
use crate::row::{EnrichedRow, Row, BASE_HEADER, ENRICHED_HEADER, NESTED};
use crate::value::Scalar;

/// Errors raised while reading or writing a sheet.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Configuration for delimited text I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Field delimiter (default: b',')
    pub delimiter: u8,
    /// Write a header row (default: true)
    pub header: bool,
    /// Reinterpret numeric-looking value cells on load (default: true)
    pub coerce_numbers: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            header: true,
            coerce_numbers: true,
        }
    }
}

impl SheetConfig {
    /// Create a CSV configuration (comma-separated).
    pub fn csv() -> Self {
        Self::default()
    }

    /// Create a TSV configuration (tab-separated).
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }

    /// Set the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether a header row is written.
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Set whether value cells are coerced to numbers on load.
    pub fn with_coerce_numbers(mut self, coerce: bool) -> Self {
        self.coerce_numbers = coerce;
        self
    }
}

/// A row type that can be laid out as sheet cells.
pub trait SheetRow {
    /// Column titles.
    fn header() -> &'static [&'static str];

    /// The row's address.
    fn address(&self) -> &Address;

    /// The row's key.
    fn key(&self) -> &str;

    /// The row's cells, in column order.
    fn cells(&self, scheme: MarkerScheme) -> Vec<Scalar>;
}

impl SheetRow for Row {
    fn header() -> &'static [&'static str] {
        &BASE_HEADER
    }

    fn address(&self) -> &Address {
        &self.address
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn cells(&self, scheme: MarkerScheme) -> Vec<Scalar> {
        self.to_record(scheme)
    }
}

impl SheetRow for EnrichedRow {
    fn header() -> &'static [&'static str] {
        &ENRICHED_HEADER
    }

    fn address(&self) -> &Address {
        &self.row.address
    }

    fn key(&self) -> &str {
        &self.row.key
    }

    fn cells(&self, scheme: MarkerScheme) -> Vec<Scalar> {
        self.to_record(scheme)
    }
}

/// Interpret a plain-text value cell.
///
/// The nested sentinel stays as is. Text without a `.` becomes an integer if
/// it parses as one; text with a `.` becomes a float if it parses as one.
/// Everything else, including `true`/`false` and the empty cell, stays text.
pub fn coerce_cell(text: &str) -> Scalar {
    if text == NESTED {
        return Scalar::string(text);
    }
    if !text.contains('.') {
        if let Ok(n) = text.parse::<i64>() {
            return Scalar::Int(n);
        }
        if let Ok(n) = text.parse::<u64>() {
            return Scalar::UInt(n);
        }
    } else if let Ok(x) = text.parse::<f64>() {
        return Scalar::Float(x);
    }
    Scalar::string(text)
}
