//! Bundling a schema and everything it references into one document.
//!
//! The bundle is the named file's content with every `$ref` rewritten to a
//! local `#/definitions/<Name>` pointer. Its `definitions` hold:
//!
//! - all definitions of the file itself;
//! - every definition of another file reachable through refs, and nothing
//!   else from those files;
//! - a whole file, under `PascalCase(stem)`, when a ref targets the file
//!   rather than one of its definitions.
//!
//! `$id` keywords are dropped so the result forms a single resolution scope.
//! References that cannot be followed (absolute URLs, unknown files, missing
//! definitions) are kept as written.

use std::collections::{HashMap, HashSet, VecDeque};

use heck::ToUpperCamelCase;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::error::SchemaError;
use super::graph::{SchemaDocument, SchemaGraph};
use super::node::unescape_token;

const DEFINITION_KEYS: [&str; 2] = ["definitions", "$defs"];

/// What a ref points at inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Part {
    Definition(String),
    Whole,
}

impl SchemaGraph {
    /// Produce a self-contained schema for the file with stem `stem`.
    ///
    /// Every definition is emitted at most once, so reference cycles across
    /// files terminate.
    pub fn bundle(&self, stem: &str) -> Result<Value, SchemaError> {
        let root = self
            .document_index(stem)
            .ok_or_else(|| SchemaError::UnknownSchema(stem.to_string()))?;
        let document = &self.documents()[root];

        let mut bundler = Bundler::new(self, root);
        for name in definition_names(&document.source) {
            bundler.register(root, Part::Definition(name));
        }

        let mut bundled = without_definitions(&document.source);
        bundler.rewrite(&mut bundled, root);

        let mut definitions = Map::new();
        while let Some((doc, part, name)) = bundler.queue.pop_front() {
            let mut value = match part_source(&self.documents()[doc], &part) {
                Some(value) => value,
                None => continue,
            };
            bundler.rewrite(&mut value, doc);
            definitions.insert(name, value);
        }

        info!(stem, definitions = definitions.len(), "bundled schema");
        if let Value::Object(object) = &mut bundled {
            object.insert("definitions".to_string(), Value::Object(definitions));
        }
        Ok(bundled)
    }
}

struct Bundler<'g> {
    graph: &'g SchemaGraph,
    root: usize,
    names: HashMap<(usize, Part), String>,
    taken: HashSet<String>,
    queue: VecDeque<(usize, Part, String)>,
}

impl<'g> Bundler<'g> {
    fn new(graph: &'g SchemaGraph, root: usize) -> Self {
        Bundler {
            graph,
            root,
            names: HashMap::new(),
            taken: HashSet::new(),
            queue: VecDeque::new(),
        }
    }

    /// The bundle name of a part, queueing the part on first sight.
    fn register(&mut self, doc: usize, part: Part) -> String {
        if let Some(name) = self.names.get(&(doc, part.clone())) {
            return name.clone();
        }
        let base = match &part {
            Part::Definition(name) => name.clone(),
            Part::Whole => self.graph.documents()[doc].stem.to_upper_camel_case(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{}{}", base, n);
            n += 1;
        }
        self.taken.insert(name.clone());
        self.names.insert((doc, part.clone()), name.clone());
        self.queue.push_back((doc, part, name.clone()));
        name
    }

    /// Drop `$id`s and retarget `$ref`s below `value`, which lives in `doc`.
    fn rewrite(&mut self, value: &mut Value, doc: usize) {
        match value {
            Value::Object(object) => {
                object.retain(|key, _| key != "$id");
                let retargeted = match object.get("$ref") {
                    Some(Value::String(reference)) => self.retarget(reference, doc),
                    _ => None,
                };
                if let Some(reference) = retargeted {
                    object.insert("$ref".to_string(), Value::String(reference));
                }
                for child in object.values_mut() {
                    self.rewrite(child, doc);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.rewrite(item, doc);
                }
            }
            _ => {}
        }
    }

    /// The local form of `reference`, or `None` to keep it unchanged.
    fn retarget(&mut self, reference: &str, doc: usize) -> Option<String> {
        let (path, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        if path.contains("://") {
            return None;
        }
        let target = if path.is_empty() {
            doc
        } else {
            let stem = std::path::Path::new(path).file_stem()?.to_str()?;
            match self.graph.document_index(stem) {
                Some(target) => target,
                None => {
                    debug!(reference, "bundle keeps reference to unknown file");
                    return None;
                }
            }
        };

        let tokens: Vec<&str> = fragment.split('/').filter(|t| !t.is_empty()).collect();
        let (part, rest) = match tokens.as_slice() {
            [kind, name, rest @ ..] if DEFINITION_KEYS.contains(kind) => {
                (Part::Definition(unescape_token(name)), rest)
            }
            [] if !path.is_empty() => (self.entry_part(target), &[][..]),
            rest => (Part::Whole, rest),
        };

        if part == Part::Whole && target == self.root {
            return Some(local_pointer(None, rest));
        }
        if part_value(&self.graph.documents()[target], &part).is_none() {
            debug!(reference, "bundle keeps reference to missing definition");
            return None;
        }
        let name = self.register(target, part);
        Some(local_pointer(Some(&name), rest))
    }

    /// What a fragment-less reference to `doc` points at.
    fn entry_part(&self, doc: usize) -> Part {
        let document = &self.graph.documents()[doc];
        let main = document.stem.to_upper_camel_case();
        if part_value(document, &Part::Definition(main.clone())).is_some() {
            Part::Definition(main)
        } else {
            Part::Whole
        }
    }
}

fn definition_names(source: &Value) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for key in DEFINITION_KEYS {
        if let Some(Value::Object(definitions)) = source.get(key) {
            for name in definitions.keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
    }
    names
}

fn part_value<'d>(document: &'d SchemaDocument, part: &Part) -> Option<&'d Value> {
    match part {
        Part::Definition(name) => DEFINITION_KEYS
            .iter()
            .find_map(|key| document.source.get(key)?.get(name)),
        Part::Whole => Some(&document.source),
    }
}

fn part_source(document: &SchemaDocument, part: &Part) -> Option<Value> {
    match part {
        Part::Definition(_) => part_value(document, part).cloned(),
        Part::Whole => Some(without_definitions(&document.source)),
    }
}

fn without_definitions(source: &Value) -> Value {
    let mut value = source.clone();
    if let Value::Object(object) = &mut value {
        object.retain(|key, _| !DEFINITION_KEYS.contains(&key.as_str()));
    }
    value
}

/// `#/definitions/<name>/<rest>`, or `#/<rest>` without a name.
fn local_pointer(name: Option<&str>, rest: &[&str]) -> String {
    let mut pointer = String::from("#");
    if let Some(name) = name {
        pointer.push_str("/definitions/");
        pointer.push_str(&name.replace('~', "~0").replace('/', "~1"));
    }
    for token in rest {
        pointer.push('/');
        pointer.push_str(token);
    }
    pointer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaGraphBuilder;
    use serde_json::json;

    #[test]
    fn test_local_pointer() {
        assert_eq!(local_pointer(Some("A"), &[]), "#/definitions/A");
        assert_eq!(
            local_pointer(Some("A/B"), &["properties", "x"]),
            "#/definitions/A~1B/properties/x"
        );
        assert_eq!(local_pointer(None, &["properties", "x"]), "#/properties/x");
    }

    #[test]
    fn test_internal_defs_become_definitions() {
        let mut builder = SchemaGraphBuilder::default();
        builder
            .add(
                "sample.json",
                json!({
                    "$id": "urn:sample",
                    "type": "object",
                    "properties": {"unit": {"$ref": "#/$defs/Unit"}, "self": {"$ref": "#/properties/unit"}},
                    "$defs": {"Unit": {"$id": "urn:unit", "const": "mV"}}
                }),
            )
            .unwrap();
        let bundled = builder.build().bundle("sample").unwrap();
        assert_eq!(
            bundled,
            json!({
                "type": "object",
                "properties": {"unit": {"$ref": "#/definitions/Unit"}, "self": {"$ref": "#/properties/unit"}},
                "definitions": {"Unit": {"const": "mV"}}
            })
        );
    }

    #[test]
    fn test_name_collisions_are_suffixed() {
        let mut builder = SchemaGraphBuilder::default();
        builder
            .add(
                "a.json",
                json!({"definitions": {"Name": {"properties": {"other": {"$ref": "b.json#/definitions/Name"}}}}}),
            )
            .unwrap()
            .add("b.json", json!({"definitions": {"Name": {"type": "string"}}}))
            .unwrap();
        let bundled = builder.build().bundle("a").unwrap();
        assert_eq!(
            bundled["definitions"]["Name"]["properties"]["other"]["$ref"],
            json!("#/definitions/Name2")
        );
        assert_eq!(bundled["definitions"]["Name2"], json!({"type": "string"}));
    }
}
