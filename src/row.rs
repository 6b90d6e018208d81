//! Tabular rows.
//!
//! A [`Row`] is one line of the flat form: `(address, key, value)`, where the
//! value is either a scalar or the nested sentinel. An [`EnrichedRow`] adds
//! the example and description columns.

use crate::address::{Address, MarkerScheme};
use crate::codec::CodecError;
use crate::value::Scalar;

/// Literal cell text marking a container row.
pub const NESTED: &str = "<nested>";

/// Column titles of the base row stream.
pub const BASE_HEADER: [&str; 3] = ["Number", "Key", "Value"];

/// Column titles of the enriched row stream.
pub const ENRICHED_HEADER: [&str; 5] = ["Number", "Key", "Value", "Example", "Description"];

/// The value column of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// Leaf value
    Scalar(Scalar),
    /// Container header; its content follows as child rows
    Nested,
}

impl RowValue {
    /// Interpret a value cell, recognizing the nested sentinel.
    pub fn from_cell(cell: Scalar) -> Self {
        match cell {
            Scalar::String(ref s) if s == NESTED => RowValue::Nested,
            other => RowValue::Scalar(other),
        }
    }

    /// Check whether this is the nested sentinel.
    pub fn is_nested(&self) -> bool {
        matches!(self, RowValue::Nested)
    }

    /// Cell form of this value.
    pub fn to_cell(&self) -> Scalar {
        match self {
            RowValue::Scalar(s) => s.clone(),
            RowValue::Nested => Scalar::string(NESTED),
        }
    }
}

/// One addressed row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub address: Address,
    pub key: String,
    pub value: RowValue,
}

impl Row {
    /// Create a leaf row.
    pub fn scalar(address: Address, key: impl Into<String>, value: Scalar) -> Self {
        Row {
            address,
            key: key.into(),
            value: RowValue::Scalar(value),
        }
    }

    /// Create a container header row.
    pub fn nested(address: Address, key: impl Into<String>) -> Self {
        Row {
            address,
            key: key.into(),
            value: RowValue::Nested,
        }
    }

    /// Build a row from a raw record of 3 cells (or 5, the last two ignored).
    ///
    /// `index` is the record's position in its stream, used for errors. The
    /// address cell may be text or an integer (typed spreadsheet cells).
    pub fn from_record(
        index: usize,
        record: Vec<Scalar>,
        scheme: MarkerScheme,
    ) -> Result<Self, CodecError> {
        if record.len() != 3 && record.len() != 5 {
            return Err(CodecError::MalformedRow {
                index,
                fields: record.len(),
            });
        }
        let mut cells = record.into_iter();
        let (address, key, value) = match (cells.next(), cells.next(), cells.next()) {
            (Some(a), Some(k), Some(v)) => (a, k, v),
            _ => {
                return Err(CodecError::MalformedRow { index, fields: 0 });
            }
        };
        let address_text = match address {
            Scalar::String(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::UInt(n) => n.to_string(),
            other => {
                return Err(CodecError::AddressCell {
                    index,
                    found: other.type_name(),
                })
            }
        };
        let address = Address::parse(address_text.trim(), scheme)
            .map_err(|source| CodecError::InvalidAddress { index, source })?;
        let key = match key {
            Scalar::Null => String::new(),
            other => other.to_string(),
        };
        Ok(Row {
            address,
            key,
            value: RowValue::from_cell(value),
        })
    }

    /// Cells of this row in column order.
    pub fn to_record(&self, scheme: MarkerScheme) -> Vec<Scalar> {
        vec![
            Scalar::String(self.address.display(scheme).to_string()),
            Scalar::String(self.key.clone()),
            self.value.to_cell(),
        ]
    }
}

/// A row annotated from the schema graph.
///
/// Missing annotations are empty, never absent.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub row: Row,
    pub example: Scalar,
    pub description: String,
}

impl EnrichedRow {
    /// Annotate a row.
    pub fn new(row: Row, example: Option<Scalar>, description: Option<String>) -> Self {
        EnrichedRow {
            row,
            example: example.unwrap_or_else(|| Scalar::string("")),
            description: description.unwrap_or_default(),
        }
    }

    /// Check whether a description was found.
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }

    /// Cells of this row in column order.
    pub fn to_record(&self, scheme: MarkerScheme) -> Vec<Scalar> {
        let mut record = self.row.to_record(scheme);
        record.push(self.example.clone());
        record.push(Scalar::String(self.description.clone()));
        record
    }
}

/// Check whether a record is a column header.
///
/// A header contains both `number` and `key` cells, compared
/// case-insensitively.
pub fn is_header(record: &[Scalar]) -> bool {
    let cells: Vec<String> = record
        .iter()
        .filter_map(Scalar::as_str)
        .map(|s| s.trim().to_lowercase())
        .collect();
    cells.iter().any(|c| c == "number") && cells.iter().any(|c| c == "key")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Segment;

    fn cells(values: &[&str]) -> Vec<Scalar> {
        values.iter().map(|v| Scalar::string(*v)).collect()
    }

    #[test]
    fn test_from_record_scalar() {
        let row = Row::from_record(
            0,
            vec![Scalar::string("1.2"), Scalar::string("units"), Scalar::string("mV")],
            MarkerScheme::Indexed,
        )
        .unwrap();
        assert_eq!(row.address, Address::root(1).child(Segment::ordinal(2)));
        assert_eq!(row.key, "units");
        assert_eq!(row.value, RowValue::Scalar(Scalar::string("mV")));
    }

    #[test]
    fn test_from_record_nested_and_int_address() {
        let row = Row::from_record(
            3,
            vec![Scalar::Int(4), Scalar::string("tags"), Scalar::string(NESTED)],
            MarkerScheme::Indexed,
        )
        .unwrap();
        assert_eq!(row.address, Address::root(4));
        assert!(row.value.is_nested());
    }

    #[test]
    fn test_from_record_five_fields() {
        let row = Row::from_record(
            0,
            cells(&["1.a", "", "x", "example", "description"]),
            MarkerScheme::Letters,
        )
        .unwrap();
        assert_eq!(row.address, Address::root(1).child(Segment::item(0)));
        assert_eq!(row.key, "");
    }

    #[test]
    fn test_from_record_malformed() {
        let err = Row::from_record(7, cells(&["1", "a"]), MarkerScheme::Indexed).unwrap_err();
        assert!(matches!(err, CodecError::MalformedRow { index: 7, fields: 2 }));
        let err =
            Row::from_record(0, cells(&["1", "a", "b", "c"]), MarkerScheme::Indexed).unwrap_err();
        assert!(matches!(err, CodecError::MalformedRow { fields: 4, .. }));
        let err =
            Row::from_record(2, cells(&["1.x", "a", "b"]), MarkerScheme::Indexed).unwrap_err();
        assert!(matches!(err, CodecError::InvalidAddress { index: 2, .. }));
        let err = Row::from_record(
            0,
            vec![Scalar::Float(1.5), Scalar::string("a"), Scalar::string("b")],
            MarkerScheme::Indexed,
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::AddressCell { found: "number", .. }));
    }

    #[test]
    fn test_is_header() {
        assert!(is_header(&cells(&["Number", "Key", "Value"])));
        assert!(is_header(&cells(&["number", "KEY", "value", "Example", "Description"])));
        assert!(!is_header(&cells(&["1", "key", "x"])));
        assert!(!is_header(&cells(&["1", "experiment", "<nested>"])));
    }

    #[test]
    fn test_to_record() {
        let row = Row::nested(Address::root(1).child(Segment::item(1)), "");
        assert_eq!(
            row.to_record(MarkerScheme::Indexed),
            cells(&["1.i2", "", NESTED])
        );
        let enriched = EnrichedRow::new(
            Row::scalar(Address::root(2), "value", Scalar::Int(42)),
            None,
            Some("A number".into()),
        );
        assert!(enriched.has_description());
        assert_eq!(
            enriched.to_record(MarkerScheme::Indexed),
            vec![
                Scalar::string("2"),
                Scalar::string("value"),
                Scalar::Int(42),
                Scalar::string(""),
                Scalar::string("A number"),
            ]
        );
    }
}
