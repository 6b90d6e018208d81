//! # Flatmeta
//!
//! Lossless conversion between hierarchical metadata documents and flat,
//! addressed row streams, plus schema-driven annotation of those rows.
//!
//! A document such as
//!
//! ```yaml
//! system:
//!   type: electrochemical
//!   electrodes: [WE, CE]
//! ```
//!
//! flattens into rows whose address encodes the position of every node:
//!
//! | Number | Key        | Value            |
//! |--------|------------|------------------|
//! | 1      | system     | `<nested>`       |
//! | 1.1    | type       | electrochemical  |
//! | 1.2    | electrodes | `<nested>`       |
//! | 1.2.i1 |            | WE               |
//! | 1.2.i2 |            | CE               |
//!
//! ## Module Organization
//!
//! - [`value`] - Document tree ([`Value`], [`Scalar`])
//! - [`address`] - Hierarchical row addresses and list item markers
//! - [`row`] - Base and enriched rows
//! - [`codec`] - Flatten and unflatten
//! - [`schema`] - JSON-Schema graph: loading, `$ref` resolution, field lookup
//! - [`enrich`] - Annotating rows with schema descriptions and examples
//! - [`sheet`] - CSV/TSV and Markdown row streams
//!
//! ## Quick Start
//!
//! ```
//! use flatmeta::{flatten, unflatten, CodecConfig, MarkerScheme, Value};
//!
//! let tree: Value = serde_yaml::from_str("system:\n  type: electrochemical\n").unwrap();
//! let config = CodecConfig::default();
//!
//! let rows = flatten(&tree, &config).unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].address.display(MarkerScheme::Indexed).to_string(), "1.1");
//!
//! assert_eq!(unflatten(&rows, &config).unwrap(), tree);
//! ```
//!
//! ## Features
//!
//! - `cli` - Build the `flatmeta` command-line tool

// =============================================================================
// Data model
// =============================================================================

/// Document tree values.
pub mod value;

/// Row addresses.
pub mod address;

/// Flat rows.
pub mod row;

// =============================================================================
// Conversion
// =============================================================================

/// Flatten and unflatten.
pub mod codec;

/// Schema graph.
pub mod schema;

/// Row enrichment.
pub mod enrich;

/// Tabular media.
pub mod sheet;

// =============================================================================
// Public re-exports
// =============================================================================

pub use address::{Address, AddressError, MarkerScheme, Segment};
pub use codec::{flatten, unflatten, CodecConfig, CodecError};
pub use enrich::{enrich, Coverage, Enricher};
pub use row::{EnrichedRow, Row, RowValue, NESTED};
pub use schema::{FieldInfo, SchemaError, SchemaGraph, SchemaGraphConfig};
pub use sheet::{SheetConfig, SheetError};
pub use value::{Scalar, Value};
