//! JSON-Schema graph and field annotation lookup.
//!
//! A [`SchemaGraph`] is built once from a directory of schema files (JSON or
//! YAML) and then answers read-only queries:
//!
//! - [`SchemaGraph::lookup`] finds a schema by file stem, definition name or
//!   title;
//! - [`SchemaGraph::resolve_ref`] and [`SchemaGraph::follow_refs`] resolve
//!   internal and cross-file `$ref`s with a bounded chain length;
//! - [`SchemaGraph::field_info`] returns the description and an example value
//!   for a dotted field path;
//! - [`SchemaGraph::bundle`] inlines every schema reachable from one file
//!   into a single self-contained document.
//!
//! # Example
//!
//! ```
//! use flatmeta::schema::{SchemaGraphBuilder, SchemaGraphConfig};
//! use serde_json::json;
//!
//! let mut builder = SchemaGraphBuilder::new(SchemaGraphConfig::default());
//! builder
//!     .add(
//!         "system.json",
//!         json!({"definitions": {"System": {"properties": {
//!             "type": {"description": "Kind of system", "examples": ["electrochemical"]}
//!         }}}}),
//!     )
//!     .unwrap();
//! let graph = builder.build();
//!
//! let info = graph.field_info("system.type");
//! assert_eq!(info.description.as_deref(), Some("Kind of system"));
//! ```

mod bundle;
mod error;
mod graph;
mod lookup;
mod node;
mod resolve;

pub use error::SchemaError;
pub use graph::{
    Located, LookupKey, SchemaDocument, SchemaGraph, SchemaGraphBuilder, SchemaGraphConfig,
};
pub use lookup::FieldInfo;
pub use node::{Items, SchemaNode};
pub use resolve::Resolution;
