//! Typed JSON-Schema nodes.
//!
//! Only the keywords needed for reference resolution and annotation lookup
//! are modelled; everything else in a schema file is ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A (sub)schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaNode {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `type`: a type name or a list of them
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,

    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,

    #[serde(rename = "anyOf", skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,

    #[serde(rename = "allOf", skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,

    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enumeration: Vec<serde_json::Value>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, SchemaNode>,

    #[serde(rename = "$defs", skip_serializing_if = "IndexMap::is_empty")]
    pub defs: IndexMap<String, SchemaNode>,
}

/// The `items` keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    /// Positional item schemas
    Tuple(Vec<SchemaNode>),
    /// One schema for every element
    Single(Box<SchemaNode>),
}

impl SchemaNode {
    /// Parse a node from a JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut node: SchemaNode = serde_json::from_value(value)?;
        node.normalize();
        Ok(node)
    }

    /// Make `definitions` and `$defs` interchangeable, recursively.
    ///
    /// After normalizing, each map holds every entry of the other; where both
    /// declare the same name the existing entry is kept.
    pub fn normalize(&mut self) {
        for (name, def) in &self.defs {
            if !self.definitions.contains_key(name) {
                self.definitions.insert(name.clone(), def.clone());
            }
        }
        for (name, def) in &self.definitions {
            if !self.defs.contains_key(name) {
                self.defs.insert(name.clone(), def.clone());
            }
        }
        for child in self.children_mut() {
            child.normalize();
        }
    }

    fn children_mut(&mut self) -> impl Iterator<Item = &mut SchemaNode> + '_ {
        let items: Vec<&mut SchemaNode> = match &mut self.items {
            Some(Items::Single(node)) => vec![&mut **node],
            Some(Items::Tuple(nodes)) => nodes.iter_mut().collect(),
            None => Vec::new(),
        };
        self.properties
            .values_mut()
            .chain(items)
            .chain(self.one_of.iter_mut())
            .chain(self.any_of.iter_mut())
            .chain(self.all_of.iter_mut())
            .chain(self.definitions.values_mut())
            .chain(self.defs.values_mut())
    }

    /// Look up a definition under either `definitions` or `$defs`.
    pub fn definition(&self, name: &str) -> Option<&SchemaNode> {
        self.definitions.get(name).or_else(|| self.defs.get(name))
    }

    /// All definitions, `definitions` first then any `$defs` not shadowed.
    pub fn all_definitions(&self) -> impl Iterator<Item = (&String, &SchemaNode)> + '_ {
        self.definitions.iter().chain(
            self.defs
                .iter()
                .filter(move |(name, _)| !self.definitions.contains_key(*name)),
        )
    }

    /// Check whether `type` is or includes `array`.
    pub fn is_array(&self) -> bool {
        match &self.kind {
            Some(serde_json::Value::String(t)) => t == "array",
            Some(serde_json::Value::Array(ts)) => ts.iter().any(|t| t == "array"),
            _ => false,
        }
    }

    /// The schema of list elements, if declared.
    ///
    /// For positional `items` the first schema is used.
    pub fn item_schema(&self) -> Option<&SchemaNode> {
        match &self.items {
            Some(Items::Single(node)) => Some(&**node),
            Some(Items::Tuple(nodes)) => nodes.first(),
            None => None,
        }
    }

    /// The first example declared directly on this node.
    ///
    /// Checked in order: `examples[0]`, `example`, `const`, `enum[0]`.
    pub fn direct_example(&self) -> Option<&serde_json::Value> {
        let first_example = match &self.examples {
            Some(serde_json::Value::Array(values)) => values.first(),
            _ => None,
        };
        first_example
            .or(self.example.as_ref())
            .or(self.constant.as_ref())
            .or(self.enumeration.first())
    }

    /// Composition branches: `allOf`, then `anyOf`, then `oneOf`.
    pub fn branches(&self) -> impl Iterator<Item = &SchemaNode> + '_ {
        self.all_of
            .iter()
            .chain(self.any_of.iter())
            .chain(self.one_of.iter())
    }

    /// Navigate a JSON pointer (the part of a `$ref` after `#`).
    ///
    /// Understands `definitions`/`$defs`, `properties`, `items`, and
    /// `allOf`/`anyOf`/`oneOf` indexes. An empty pointer addresses `self`.
    pub fn pointer(&self, pointer: &str) -> Option<&SchemaNode> {
        let mut tokens = pointer
            .split('/')
            .filter(|t| !t.is_empty())
            .map(unescape_token);
        let mut node = self;
        while let Some(token) = tokens.next() {
            node = match token.as_str() {
                "definitions" | "$defs" => node.definition(&tokens.next()?)?,
                "properties" => node.properties.get(&tokens.next()?)?,
                "items" => match node.items.as_ref()? {
                    Items::Single(item) => &**item,
                    Items::Tuple(items) => items.get(tokens.next()?.parse::<usize>().ok()?)?,
                },
                "allOf" => node.all_of.get(tokens.next()?.parse::<usize>().ok()?)?,
                "anyOf" => node.any_of.get(tokens.next()?.parse::<usize>().ok()?)?,
                "oneOf" => node.one_of.get(tokens.next()?.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

/// Undo JSON-pointer (`~1`, `~0`) and percent escaping of `%24`/`%25`.
pub(super) fn unescape_token(token: &str) -> String {
    token
        .replace("~1", "/")
        .replace("~0", "~")
        .replace("%24", "$")
        .replace("%25", "%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> SchemaNode {
        SchemaNode::from_json(value).unwrap()
    }

    #[test]
    fn test_parse_keywords() {
        let schema = node(json!({
            "$ref": "#/definitions/A",
            "title": "T",
            "description": "D",
            "type": ["array", "null"],
            "items": {"type": "string"},
            "enum": ["x", "y"],
            "additionalProperties": false
        }));
        assert_eq!(schema.reference.as_deref(), Some("#/definitions/A"));
        assert_eq!(schema.title.as_deref(), Some("T"));
        assert!(schema.is_array());
        assert_eq!(
            schema.item_schema().and_then(|i| i.kind.clone()),
            Some(json!("string"))
        );
        assert_eq!(schema.direct_example(), Some(&json!("x")));
    }

    #[test]
    fn test_tuple_items() {
        let schema = node(json!({"items": [{"title": "first"}, {"title": "second"}]}));
        assert_eq!(
            schema.item_schema().and_then(|i| i.title.as_deref()),
            Some("first")
        );
        assert_eq!(
            schema.pointer("/items/1").and_then(|i| i.title.as_deref()),
            Some("second")
        );
    }

    #[test]
    fn test_example_priority() {
        let schema = node(json!({
            "examples": ["from-examples"],
            "example": "from-example",
            "const": "from-const",
            "enum": ["from-enum"]
        }));
        assert_eq!(schema.direct_example(), Some(&json!("from-examples")));
        let schema = node(json!({"examples": [], "const": 3, "enum": [1]}));
        assert_eq!(schema.direct_example(), Some(&json!(3)));
        let schema = node(json!({"examples": "not-a-list", "enum": [1]}));
        assert_eq!(schema.direct_example(), Some(&json!(1)));
        assert_eq!(node(json!({})).direct_example(), None);
    }

    #[test]
    fn test_normalize_defs() {
        let schema = node(json!({
            "$defs": {"A": {"title": "a"}},
            "definitions": {"B": {"title": "b"}},
            "properties": {"inner": {"$defs": {"C": {"title": "c"}}}}
        }));
        assert!(schema.definitions.contains_key("A"));
        assert!(schema.defs.contains_key("B"));
        assert_eq!(schema.definitions.len(), 2);
        assert_eq!(schema.defs.len(), 2);
        assert!(schema.properties["inner"].definitions.contains_key("C"));
        let names: Vec<&str> = schema.all_definitions().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_pointer() {
        let schema = node(json!({
            "definitions": {
                "Process": {
                    "properties": {"role": {"description": "Role"}},
                    "anyOf": [{"title": "opt"}]
                },
                "a/b": {"title": "slash"}
            }
        }));
        assert_eq!(
            schema
                .pointer("/definitions/Process/properties/role")
                .and_then(|n| n.description.as_deref()),
            Some("Role")
        );
        assert_eq!(
            schema
                .pointer("/$defs/Process/anyOf/0")
                .and_then(|n| n.title.as_deref()),
            Some("opt")
        );
        assert_eq!(
            schema.pointer("/definitions/a~1b").and_then(|n| n.title.as_deref()),
            Some("slash")
        );
        assert_eq!(schema.pointer(""), Some(&schema));
        assert_eq!(schema.pointer("/definitions/Missing"), None);
        assert_eq!(schema.pointer("/definitions"), None);
        assert_eq!(schema.pointer("/unknown/x"), None);
    }

    #[test]
    fn test_branches_order() {
        let schema = node(json!({
            "oneOf": [{"title": "one"}],
            "anyOf": [{"title": "any"}],
            "allOf": [{"title": "all"}]
        }));
        let titles: Vec<&str> = schema.branches().filter_map(|b| b.title.as_deref()).collect();
        assert_eq!(titles, vec!["all", "any", "one"]);
    }
}
