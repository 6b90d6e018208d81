//! Tree to rows.

use super::{CodecConfig, CodecError};
use crate::address::{Address, Segment};
use crate::row::Row;
use crate::value::Value;

/// Flatten a tree into addressed rows, depth first.
///
/// The root must be an object; it emits no row of its own. Every other node
/// emits exactly one row: containers a `<nested>` header followed by their
/// children, scalars their value. List elements carry an empty key, so an
/// object key may not be empty.
pub fn flatten(value: &Value, config: &CodecConfig) -> Result<Vec<Row>, CodecError> {
    let root = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(CodecError::UnsupportedRoot {
                found: other.type_name(),
            })
        }
    };

    let mut flattener = Flattener {
        config,
        rows: Vec::with_capacity(row_count(value)),
    };
    for (i, (key, child)) in root.iter().enumerate() {
        flattener.visit_field(Address::root(i + 1), key, child)?;
    }
    Ok(flattener.rows)
}

/// Number of rows [`flatten`] produces for `value`.
///
/// Equals the number of leaf scalars plus the number of containers below the
/// root.
pub fn row_count(value: &Value) -> usize {
    fn below(value: &Value) -> usize {
        match value {
            Value::Object(obj) => obj.values().map(|v| 1 + below(v)).sum(),
            Value::List(items) => items.iter().map(|v| 1 + below(v)).sum(),
            Value::Scalar(_) => 0,
        }
    }
    below(value)
}

struct Flattener<'c> {
    config: &'c CodecConfig,
    rows: Vec<Row>,
}

impl Flattener<'_> {
    fn visit_field(&mut self, address: Address, key: &str, value: &Value) -> Result<(), CodecError> {
        if key.is_empty() {
            return Err(CodecError::EmptyKey {
                address: address.display(self.config.markers).to_string(),
            });
        }
        self.visit(address, key, value)
    }

    fn visit(&mut self, address: Address, key: &str, value: &Value) -> Result<(), CodecError> {
        if address.depth() > self.config.max_depth {
            return Err(CodecError::TooDeep {
                max: self.config.max_depth,
            });
        }

        match value {
            Value::Scalar(scalar) => {
                self.rows.push(Row::scalar(address, key, scalar.clone()));
            }
            Value::Object(obj) => {
                self.rows.push(Row::nested(address.clone(), key));
                for (i, (child_key, child)) in obj.iter().enumerate() {
                    self.visit_field(address.child(Segment::ordinal(i + 1)), child_key, child)?;
                }
            }
            Value::List(items) => {
                let scheme = self.config.markers;
                if let Some(max) = scheme.capacity() {
                    if items.len() > max {
                        return Err(CodecError::ListTooLong {
                            address: address.display(scheme).to_string(),
                            len: items.len(),
                            max,
                            scheme,
                        });
                    }
                }
                self.rows.push(Row::nested(address.clone(), key));
                for (i, item) in items.iter().enumerate() {
                    self.visit(address.child(Segment::item(i)), "", item)?;
                }
            }
        }
        Ok(())
    }
}
