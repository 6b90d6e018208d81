//! Flatten/unflatten codec.
//!
//! Maps a metadata tree to an ordered list of addressed rows and back.
//!
//! # Example
//!
//! ```
//! use flatmeta::codec::{flatten, unflatten, CodecConfig};
//! use flatmeta::value::Value;
//!
//! let tree: Value = serde_yaml::from_str("experiment:\n  value: 42\n  units: mV\n").unwrap();
//! let config = CodecConfig::default();
//!
//! let rows = flatten(&tree, &config).unwrap();
//! assert_eq!(rows.len(), 3);
//! assert_eq!(unflatten(&rows, &config).unwrap(), tree);
//! ```

mod flatten;
mod unflatten;

pub use flatten::{flatten, row_count};
pub use unflatten::{parse_records, unflatten, unflatten_records};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{AddressError, MarkerScheme};

/// Errors raised by the codec.
///
/// All of these abort the conversion; no partial tree is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("record {index}: expected 3 or 5 fields, found {fields}")]
    MalformedRow { index: usize, fields: usize },

    #[error("record {index}: {source}")]
    InvalidAddress { index: usize, source: AddressError },

    #[error("record {index}: address cell must be text or an integer, found {found}")]
    AddressCell { index: usize, found: &'static str },

    #[error("record {index}: duplicate address {address}")]
    DuplicateAddress { index: usize, address: String },

    #[error("ambiguous shape at {address}: {reason}")]
    AmbiguousShape { address: String, reason: String },

    #[error("list at {address} has {len} items, {scheme} markers address at most {max}")]
    ListTooLong {
        address: String,
        len: usize,
        max: usize,
        scheme: MarkerScheme,
    },

    #[error("empty object key at {address}: only list items may have an empty key")]
    EmptyKey { address: String },

    #[error("root must be an object, found {found}")]
    UnsupportedRoot { found: &'static str },

    #[error("nesting deeper than {max} levels")]
    TooDeep { max: usize },
}

/// Configuration for flattening and unflattening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Item marker encoding (default: `Indexed`)
    pub markers: MarkerScheme,
    /// Maximum nesting depth (default: 64)
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            markers: MarkerScheme::Indexed,
            max_depth: 64,
        }
    }
}

impl CodecConfig {
    /// Configuration using `i1`, `i2`, ... item markers.
    pub fn indexed() -> Self {
        Self::default()
    }

    /// Configuration using `a`, `b`, ... item markers.
    pub fn letters() -> Self {
        Self {
            markers: MarkerScheme::Letters,
            ..Self::default()
        }
    }

    /// Set the item marker encoding.
    pub fn with_markers(mut self, markers: MarkerScheme) -> Self {
        self.markers = markers;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
