//! Delimited text (CSV/TSV) row streams.

use std::io::{Read, Write};

use super::{coerce_cell, SheetConfig, SheetError, SheetRow};
use crate::address::MarkerScheme;
use crate::codec::{parse_records, CodecConfig};
use crate::row::Row;
use crate::value::Scalar;

/// Index of the value column.
const VALUE_COLUMN: usize = 2;

/// Read raw records.
///
/// Every cell is text except the value column, which is coerced when
/// `config.coerce_numbers` is set. Records may have any number of fields;
/// the codec checks the count.
pub fn read_records<R: Read>(reader: R, config: &SheetConfig) -> Result<Vec<Vec<Scalar>>, SheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let cells = record
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == VALUE_COLUMN && config.coerce_numbers {
                    coerce_cell(cell)
                } else {
                    Scalar::string(cell)
                }
            })
            .collect();
        records.push(cells);
    }
    Ok(records)
}

/// Read rows, skipping a leading header record.
pub fn read_rows<R: Read>(
    reader: R,
    config: &SheetConfig,
    codec: &CodecConfig,
) -> Result<Vec<Row>, SheetError> {
    let records = read_records(reader, config)?;
    Ok(parse_records(records, codec)?)
}

/// Write rows, preceded by a header record when `config.header` is set.
pub fn write_rows<W: Write, T: SheetRow>(
    writer: W,
    rows: &[T],
    scheme: MarkerScheme,
    config: &SheetConfig,
) -> Result<(), SheetError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .from_writer(writer);

    if config.header {
        csv_writer.write_record(T::header())?;
    }
    for row in rows {
        let cells: Vec<String> = row.cells(scheme).iter().map(Scalar::to_string).collect();
        csv_writer.write_record(&cells)?;
    }
    csv_writer.flush()?;
    Ok(())
}
