//! Rows to tree.
//!
//! Rows are linked to their parents by address. A node whose children all
//! carry item markers is a list; a node whose children all carry ordinals is
//! an object. Anything else means the rows were corrupted and is rejected.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{CodecConfig, CodecError};
use crate::address::{Address, MarkerScheme};
use crate::row::{is_header, Row, RowValue, NESTED};
use crate::value::{Scalar, Value};

/// Parse raw records into rows.
///
/// A leading header record (`number`, `key`, ... in any case) is skipped.
/// Record indexes in errors count from 0 and include the header.
pub fn parse_records<I>(records: I, config: &CodecConfig) -> Result<Vec<Row>, CodecError>
where
    I: IntoIterator<Item = Vec<Scalar>>,
{
    let mut rows = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        if index == 0 && is_header(&record) {
            continue;
        }
        rows.push(Row::from_record(index, record, config.markers)?);
    }
    Ok(rows)
}

/// Parse raw records and rebuild the tree they describe.
pub fn unflatten_records<I>(records: I, config: &CodecConfig) -> Result<Value, CodecError>
where
    I: IntoIterator<Item = Vec<Scalar>>,
{
    let rows = parse_records(records, config)?;
    unflatten(&rows, config)
}

/// Rebuild a tree from addressed rows.
///
/// Roots are rows whose parent address has no row. Each root with a
/// non-empty key becomes a top-level field, in row order. Children are
/// ordered by their last segment. A `<nested>` row without children reads
/// back as the literal string `"<nested>"`.
pub fn unflatten(rows: &[Row], config: &CodecConfig) -> Result<Value, CodecError> {
    let scheme = config.markers;
    let mut by_address: HashMap<&Address, usize> = HashMap::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if row.address.depth() > config.max_depth {
            return Err(CodecError::TooDeep {
                max: config.max_depth,
            });
        }
        if by_address.insert(&row.address, index).is_some() {
            return Err(CodecError::DuplicateAddress {
                index,
                address: row.address.display(scheme).to_string(),
            });
        }
    }

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match row.address.parent().and_then(|p| by_address.get(&p).copied()) {
            Some(parent) => children.entry(parent).or_default().push(index),
            None => roots.push(index),
        }
    }
    for siblings in children.values_mut() {
        siblings.sort_by_key(|&i| rows[i].address.last());
    }

    let tree = Tree {
        rows,
        children,
        scheme,
    };
    let mut result = IndexMap::new();
    for index in roots {
        let row = &rows[index];
        if row.key.is_empty() {
            continue;
        }
        let value = tree.build(index)?;
        if result.insert(row.key.clone(), value).is_some() {
            return Err(CodecError::AmbiguousShape {
                address: row.address.display(scheme).to_string(),
                reason: format!("duplicate top-level key {:?}", row.key),
            });
        }
    }
    Ok(Value::Object(result))
}

struct Tree<'r> {
    rows: &'r [Row],
    children: HashMap<usize, Vec<usize>>,
    scheme: MarkerScheme,
}

impl Tree<'_> {
    fn ambiguous(&self, index: usize, reason: impl Into<String>) -> CodecError {
        CodecError::AmbiguousShape {
            address: self.rows[index].address.display(self.scheme).to_string(),
            reason: reason.into(),
        }
    }

    fn build(&self, index: usize) -> Result<Value, CodecError> {
        let row = &self.rows[index];
        let kids = match self.children.get(&index) {
            Some(kids) => kids,
            None => {
                return Ok(match &row.value {
                    RowValue::Scalar(s) => Value::Scalar(s.clone()),
                    RowValue::Nested => Value::string(NESTED),
                })
            }
        };

        if let RowValue::Scalar(s) = &row.value {
            return Err(self.ambiguous(
                index,
                format!("scalar row {:?} has child rows", s.to_string()),
            ));
        }

        let items = kids
            .iter()
            .filter(|&&k| self.rows[k].address.last().is_item())
            .count();
        if items == kids.len() {
            let list = kids
                .iter()
                .map(|&k| self.build(k))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Value::List(list));
        }
        if items > 0 {
            return Err(self.ambiguous(index, "children mix item markers and ordinals"));
        }

        let mut obj = IndexMap::with_capacity(kids.len());
        for &k in kids {
            let child = &self.rows[k];
            if child.key.is_empty() {
                return Err(self.ambiguous(k, "object field has an empty key"));
            }
            let value = self.build(k)?;
            if obj.insert(child.key.clone(), value).is_some() {
                return Err(self.ambiguous(k, format!("duplicate key {:?}", child.key)));
            }
        }
        Ok(Value::Object(obj))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[&str]) -> Vec<Scalar> {
        cells.iter().map(|c| Scalar::string(*c)).collect()
    }

    fn records(rows: &[&[&str]]) -> Vec<Vec<Scalar>> {
        rows.iter().map(|r| record(r)).collect()
    }

    #[test]
    fn test_unflatten_nested_object() {
        let rows = records(&[
            &["1", "experiment", "<nested>"],
            &["1.1", "value", "42"],
            &["1.2", "units", "mV"],
        ]);
        let value = unflatten_records(rows, &CodecConfig::default()).unwrap();
        assert_eq!(
            value,
            Value::object_from([(
                "experiment",
                Value::object_from([
                    ("value", Value::string("42")),
                    ("units", Value::string("mV")),
                ]),
            )])
        );
    }

    #[test]
    fn test_unflatten_skips_header() {
        let body: &[&[&str]] = &[&["1", "a", "x"], &["2", "b", "y"]];
        let plain = unflatten_records(records(body), &CodecConfig::default()).unwrap();
        let mut with_header = records(&[&["Number", "Key", "Value"]]);
        with_header.extend(records(body));
        assert_eq!(
            unflatten_records(with_header, &CodecConfig::default()).unwrap(),
            plain
        );
    }

    #[test]
    fn test_unflatten_list_of_objects_letters() {
        let rows = records(&[
            &["number", "key", "value"],
            &["1", "experiment", "<nested>"],
            &["1.a", "", "<nested>"],
            &["1.a.1", "A", "<nested>"],
            &["1.a.1.1", "value", "1"],
            &["1.a.1.2", "units", "mV"],
            &["1.a.2", "B", "2"],
            &["1.b", "", "<nested>"],
            &["1.b.1", "A", "3"],
            &["1.b.2", "B", "4"],
        ]);
        let value = unflatten_records(rows, &CodecConfig::letters()).unwrap();
        let expected = Value::object_from([(
            "experiment",
            Value::list_from(vec![
                Value::object_from([
                    (
                        "A",
                        Value::object_from([
                            ("value", Value::string("1")),
                            ("units", Value::string("mV")),
                        ]),
                    ),
                    ("B", Value::string("2")),
                ]),
                Value::object_from([("A", Value::string("3")), ("B", Value::string("4"))]),
            ]),
        )]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_unflatten_orders_children_numerically() {
        let mut rows = vec![record(&["1", "obj", "<nested>"])];
        for n in (1..=11).rev() {
            let address = format!("1.{}", n);
            let key = format!("k{}", n);
            rows.push(record(&[address.as_str(), key.as_str(), "v"]));
        }
        let value = unflatten_records(rows, &CodecConfig::default()).unwrap();
        let keys: Vec<String> = value
            .get("obj")
            .and_then(Value::as_object)
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();
        let expected: Vec<String> = (1..=11).map(|n| format!("k{}", n)).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_unflatten_childless_nested_is_literal() {
        let rows = records(&[&["1", "empty", "<nested>"]]);
        let value = unflatten_records(rows, &CodecConfig::default()).unwrap();
        assert_eq!(value, Value::object_from([("empty", Value::string("<nested>"))]));
    }

    #[test]
    fn test_unflatten_orphans_become_roots() {
        let rows = records(&[&["3.2", "orphan", "x"], &["4", "", "skipped"], &["5", "k", "y"]]);
        let value = unflatten_records(rows, &CodecConfig::default()).unwrap();
        assert_eq!(
            value,
            Value::object_from([("orphan", Value::string("x")), ("k", Value::string("y"))])
        );
    }

    #[test]
    fn test_unflatten_empty() {
        let value = unflatten_records(Vec::new(), &CodecConfig::default()).unwrap();
        assert_eq!(value, Value::object());
        let header_only = records(&[&["Number", "Key", "Value"]]);
        assert_eq!(
            unflatten_records(header_only, &CodecConfig::default()).unwrap(),
            Value::object()
        );
    }

    #[test]
    fn test_unflatten_rejects_mixed_children() {
        let rows = records(&[
            &["1", "x", "<nested>"],
            &["1.i1", "", "a"],
            &["1.2", "b", "c"],
        ]);
        let err = unflatten_records(rows, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, CodecError::AmbiguousShape { ref address, .. } if address == "1"));
    }

    #[test]
    fn test_unflatten_rejects_empty_key_in_object() {
        let rows = records(&[&["1", "x", "<nested>"], &["1.1", "", "a"]]);
        let err = unflatten_records(rows, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, CodecError::AmbiguousShape { ref address, .. } if address == "1.1"));
    }

    #[test]
    fn test_unflatten_rejects_duplicates() {
        let rows = records(&[&["1", "x", "a"], &["1", "y", "b"]]);
        let err = unflatten_records(rows, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, CodecError::DuplicateAddress { index: 1, .. }));

        let rows = records(&[&["1", "x", "<nested>"], &["1.1", "k", "a"], &["1.2", "k", "b"]]);
        let err = unflatten_records(rows, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, CodecError::AmbiguousShape { .. }));
    }

    #[test]
    fn test_unflatten_rejects_scalar_with_children() {
        let rows = records(&[&["1", "x", "leaf"], &["1.1", "k", "a"]]);
        let err = unflatten_records(rows, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, CodecError::AmbiguousShape { .. }));
    }

    #[test]
    fn test_unflatten_malformed_aborts() {
        let rows = records(&[&["1", "x", "a"], &["2", "y"]]);
        let err = unflatten_records(rows, &CodecConfig::default()).unwrap_err();
        assert_eq!(err, CodecError::MalformedRow { index: 1, fields: 2 });
    }

    #[test]
    fn test_unflatten_wrong_scheme_is_invalid_address() {
        let rows = records(&[&["1", "x", "<nested>"], &["1.a", "", "v"]]);
        let err = unflatten_records(rows, &CodecConfig::indexed()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidAddress { index: 1, .. }));
    }
}
