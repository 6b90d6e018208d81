//! Field annotation lookup.

use super::graph::{Located, SchemaGraph};
use crate::value::Scalar;

/// Description and example found for a dotted field path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldInfo {
    pub description: Option<String>,
    pub example: Option<Scalar>,
}

impl FieldInfo {
    /// Check whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.example.is_none()
    }
}

impl SchemaGraph {
    /// Look up the annotations for a dotted field path such as
    /// `curation.process.role`.
    ///
    /// The first segment selects a schema via [`SchemaGraph::lookup`]; each
    /// further segment descends through `properties`, following `$ref`s and
    /// stepping into array `items` between segments. A path naming only the
    /// top-level schema has no annotations.
    pub fn field_info(&self, path: &str) -> FieldInfo {
        let mut parts = path.split('.').filter(|p| !p.is_empty());
        let top = match parts.next() {
            Some(top) => top,
            None => return FieldInfo::default(),
        };
        let fields: Vec<&str> = parts.collect();
        if fields.is_empty() {
            return FieldInfo::default();
        }
        match self.lookup(top) {
            Some(schema) => self.walk(schema, &fields).unwrap_or_default(),
            None => FieldInfo::default(),
        }
    }

    fn walk(&self, schema: Located<'_>, fields: &[&str]) -> Option<FieldInfo> {
        let mut current = schema;
        for (i, field) in fields.iter().enumerate() {
            current = self.follow_refs(current);
            let property = self.find_property(current, field, 0)?;
            let target = self.follow_refs(property);

            if i == fields.len() - 1 {
                return Some(self.annotations(property, target));
            }

            current = match target.node.item_schema() {
                Some(items) => target.at(items),
                None => target,
            };
        }
        None
    }

    /// Find `field` under `properties`, searching composition branches when
    /// the node has no such property itself.
    fn find_property<'g>(&'g self, at: Located<'g>, field: &str, depth: usize) -> Option<Located<'g>> {
        if let Some(property) = at.node.properties.get(field) {
            return Some(at.at(property));
        }
        if depth >= self.config().max_ref_depth {
            return None;
        }
        at.node.branches().find_map(|branch| {
            let branch = self.follow_refs(at.at(branch));
            self.find_property(branch, field, depth + 1)
        })
    }

    fn annotations(&self, property: Located<'_>, target: Located<'_>) -> FieldInfo {
        let mut description = target
            .node
            .description
            .clone()
            .or_else(|| property.node.description.clone());

        let mut example = target
            .node
            .direct_example()
            .or_else(|| property.node.direct_example())
            .map(Scalar::from_json);

        if example.is_none() {
            let options = target.node.any_of.iter().chain(target.node.one_of.iter());
            for option in options {
                let option = self.follow_refs(target.at(option));
                if let Some(constant) = &option.node.constant {
                    example = Some(Scalar::from_json(constant));
                    if description.is_none() {
                        description = option.node.description.clone();
                    }
                    break;
                }
            }
        }

        FieldInfo {
            description,
            example,
        }
    }
}
