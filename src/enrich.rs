//! Row enrichment.
//!
//! Rows carry only their own key, so the full dotted path of a field has to
//! be reconstructed from the stream. The enricher keeps a stack of
//! `(depth, key)` pairs:
//!
//! 1. entries at the row's depth or deeper are popped (closed scopes);
//! 2. a non-empty key is pushed (list item rows push nothing);
//! 3. the keys on the stack, joined with `.`, form the row's path;
//! 4. a leaf row pops its own entry again after the lookup.
//!
//! List item rows therefore share the path of their list, and fields of list
//! elements resolve through the list's `items` schema.

use std::collections::HashMap;

use crate::row::{EnrichedRow, Row};
use crate::schema::{FieldInfo, SchemaGraph};

/// Annotates rows from a schema graph.
pub struct Enricher<'g> {
    graph: &'g SchemaGraph,
    cache: HashMap<String, FieldInfo>,
}

impl<'g> Enricher<'g> {
    /// Create an enricher over `graph`.
    pub fn new(graph: &'g SchemaGraph) -> Self {
        Enricher {
            graph,
            cache: HashMap::new(),
        }
    }

    /// Annotate every row. The output has one row per input row, in order.
    pub fn enrich(&mut self, rows: &[Row]) -> Vec<EnrichedRow> {
        let mut stack: Vec<(usize, &str)> = Vec::new();
        let mut enriched = Vec::with_capacity(rows.len());

        for row in rows {
            let depth = row.address.depth();
            while stack.last().map_or(false, |&(d, _)| d >= depth) {
                stack.pop();
            }
            let pushed = !row.key.is_empty();
            if pushed {
                stack.push((depth, row.key.as_str()));
            }

            let path = stack.iter().map(|&(_, k)| k).collect::<Vec<_>>().join(".");
            let info = self.field_info(path);
            enriched.push(EnrichedRow::new(row.clone(), info.example, info.description));

            if pushed && !row.value.is_nested() {
                stack.pop();
            }
        }
        enriched
    }

    fn field_info(&mut self, path: String) -> FieldInfo {
        let graph = self.graph;
        self.cache
            .entry(path)
            .or_insert_with_key(|path| graph.field_info(path))
            .clone()
    }
}

/// Annotate rows from `graph`.
pub fn enrich(rows: &[Row], graph: &SchemaGraph) -> Vec<EnrichedRow> {
    Enricher::new(graph).enrich(rows)
}

/// How many rows received a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub described: usize,
    pub total: usize,
}

impl Coverage {
    /// Count described rows.
    pub fn of(rows: &[EnrichedRow]) -> Self {
        Coverage {
            described: rows.iter().filter(|r| r.has_description()).count(),
            total: rows.len(),
        }
    }

    /// Percentage of described rows (0 for no rows).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.described as f64 / self.total as f64
        }
    }
}
