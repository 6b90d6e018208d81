//! Name-indexed schema graph.
//!
//! A directory scan parses every schema file once and indexes it under
//! several [`LookupKey`]s. The graph is immutable after construction and can
//! be shared freely between threads.

use core::fmt;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::error::SchemaError;
use super::node::SchemaNode;

/// Configuration for loading and resolving schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaGraphConfig {
    /// Maximum length of a `$ref` chain before giving up (default: 20)
    pub max_ref_depth: usize,
    /// File extensions to load (default: json, yaml, yml)
    pub extensions: Vec<String>,
}

impl Default for SchemaGraphConfig {
    fn default() -> Self {
        Self {
            max_ref_depth: 20,
            extensions: vec!["json".into(), "yaml".into(), "yml".into()],
        }
    }
}

impl SchemaGraphConfig {
    /// Set the maximum `$ref` chain length.
    pub fn with_max_ref_depth(mut self, depth: usize) -> Self {
        self.max_ref_depth = depth;
        self
    }

    /// Set the file extensions to load.
    pub fn with_extensions<S: Into<String>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

/// A name under which a schema can be found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupKey {
    /// File stem, e.g. `curation` for `curation.json`
    File(String),
    /// Definition name, as declared or in PascalCase
    Definition(String),
    /// Declared `title`, as declared or in camelCase
    Title(String),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::File(name) => write!(f, "file:{}", name),
            LookupKey::Definition(name) => write!(f, "definition:{}", name),
            LookupKey::Title(name) => write!(f, "title:{}", name),
        }
    }
}

/// A parsed schema file.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    pub path: PathBuf,
    pub stem: String,
    pub root: SchemaNode,
    /// The file content as loaded (after reshaping), with every keyword kept
    pub source: serde_json::Value,
}

impl SchemaDocument {
    /// The node a bare reference to this file points at.
    ///
    /// That is the definition named after the file (`process_step.json` ->
    /// `ProcessStep`) if there is one, else the document root.
    pub fn entry_point(&self) -> &SchemaNode {
        self.root
            .definition(&self.stem.to_upper_camel_case())
            .unwrap_or(&self.root)
    }
}

/// A node together with the document root its `#/` refs resolve against.
#[derive(Debug, Clone, Copy)]
pub struct Located<'g> {
    pub node: &'g SchemaNode,
    pub root: &'g SchemaNode,
}

impl<'g> Located<'g> {
    /// A document root.
    pub fn root(root: &'g SchemaNode) -> Self {
        Located { node: root, root }
    }

    /// Another node in the same document.
    pub fn at(&self, node: &'g SchemaNode) -> Self {
        Located {
            node,
            root: self.root,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    document: usize,
    definition: Option<String>,
}

/// Immutable index of schema documents.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    documents: Vec<SchemaDocument>,
    index: HashMap<LookupKey, Entry>,
    config: SchemaGraphConfig,
}

impl SchemaGraph {
    /// Load every schema file under `dir` with the default configuration.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::load_with(dir, SchemaGraphConfig::default())
    }

    /// Load every schema file under `dir`, recursively.
    ///
    /// Files are visited in sorted path order. Files that fail to parse are
    /// skipped with a warning.
    pub fn load_with(dir: impl AsRef<Path>, config: SchemaGraphConfig) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SchemaError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut builder = SchemaGraphBuilder::new(config);
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|source| SchemaError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !builder.config.accepts(path) {
                continue;
            }
            let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if let Err(err) = parse_schema_text(path, &text).and_then(|value| builder.add(path, value)) {
                warn!(error = %err, "skipping schema file");
            }
        }

        let graph = builder.build();
        info!(
            dir = %dir.display(),
            documents = graph.documents.len(),
            keys = graph.index.len(),
            "loaded schema graph"
        );
        Ok(graph)
    }

    /// The configuration this graph was built with.
    pub fn config(&self) -> &SchemaGraphConfig {
        &self.config
    }

    /// All loaded documents, in load order.
    pub fn documents(&self) -> &[SchemaDocument] {
        &self.documents
    }

    /// All registered lookup keys, sorted.
    pub fn keys(&self) -> Vec<&LookupKey> {
        let mut keys: Vec<&LookupKey> = self.index.keys().collect();
        keys.sort();
        keys
    }

    /// Number of registered lookup keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check whether nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Look up a schema by exact key.
    pub fn get(&self, key: &LookupKey) -> Option<Located<'_>> {
        let entry = self.index.get(key)?;
        let root = &self.documents[entry.document].root;
        let node = match &entry.definition {
            Some(name) => root.definition(name)?,
            None => root,
        };
        Some(Located { node, root })
    }

    /// Look up a schema by a top-level field name.
    ///
    /// Tried in order: file stem, definition name, PascalCase definition
    /// name, title (which also covers camelCase titles).
    pub fn lookup(&self, name: &str) -> Option<Located<'_>> {
        self.get(&LookupKey::File(name.to_string()))
            .or_else(|| self.get(&LookupKey::Definition(name.to_string())))
            .or_else(|| self.get(&LookupKey::Definition(name.to_upper_camel_case())))
            .or_else(|| self.get(&LookupKey::Title(name.to_string())))
    }

    /// The document registered under a file stem.
    pub fn document(&self, stem: &str) -> Option<&SchemaDocument> {
        self.documents.get(self.document_index(stem)?)
    }

    pub(crate) fn document_index(&self, stem: &str) -> Option<usize> {
        self.index
            .get(&LookupKey::File(stem.to_string()))
            .map(|entry| entry.document)
    }
}

/// Incremental construction of a [`SchemaGraph`].
///
/// The first registration of a key wins; later documents cannot shadow it.
#[derive(Debug, Clone, Default)]
pub struct SchemaGraphBuilder {
    documents: Vec<SchemaDocument>,
    index: HashMap<LookupKey, Entry>,
    config: SchemaGraphConfig,
}

impl SchemaGraphBuilder {
    /// Create an empty builder.
    pub fn new(config: SchemaGraphConfig) -> Self {
        SchemaGraphBuilder {
            documents: Vec::new(),
            index: HashMap::new(),
            config,
        }
    }

    /// Add a parsed schema document.
    ///
    /// The document is indexed according to its shape:
    /// - with `definitions`/`$defs`: used as-is;
    /// - with `type` or `properties`: the whole document is also a
    ///   definition named after the file stem in PascalCase;
    /// - otherwise every top-level mapping is a definition.
    pub fn add(
        &mut self,
        path: impl Into<PathBuf>,
        value: serde_json::Value,
    ) -> Result<&mut Self, SchemaError> {
        let path = path.into();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let object = match value {
            serde_json::Value::Object(object) => object,
            other => {
                return Err(SchemaError::parse(
                    &path,
                    format!("expected a mapping at the top level, found {}", json_type(&other)),
                ))
            }
        };
        let standalone = object.contains_key("type") || object.contains_key("properties");
        let has_definitions = object.contains_key("definitions") || object.contains_key("$defs");
        let shaped = if has_definitions || standalone {
            serde_json::Value::Object(object)
        } else {
            let definitions: serde_json::Map<String, serde_json::Value> = object
                .into_iter()
                .filter(|(_, v)| v.is_object())
                .collect();
            serde_json::json!({ "definitions": definitions })
        };
        let root = SchemaNode::from_json(shaped.clone()).map_err(|e| SchemaError::parse(&path, e))?;

        let document = self.documents.len();
        let main = stem.to_upper_camel_case();
        let mut keys: Vec<(LookupKey, Option<String>)> = Vec::new();
        let entry_definition = root.definition(&main).map(|_| main.clone());
        keys.push((LookupKey::File(stem.clone()), entry_definition));
        if standalone {
            keys.push((LookupKey::Definition(main.clone()), None));
        }
        if let Some(title) = &root.title {
            keys.push((LookupKey::Title(title.clone()), None));
            keys.push((LookupKey::Title(title.to_lower_camel_case()), None));
        }
        for (name, def) in root.all_definitions() {
            keys.push((LookupKey::Definition(name.clone()), Some(name.clone())));
            keys.push((LookupKey::Definition(name.to_upper_camel_case()), Some(name.clone())));
            if let Some(title) = &def.title {
                keys.push((LookupKey::Title(title.clone()), Some(name.clone())));
                keys.push((LookupKey::Title(title.to_lower_camel_case()), Some(name.clone())));
            }
        }

        debug!(path = %path.display(), stem = %stem, keys = keys.len(), "registering schema");
        for (key, definition) in keys {
            self.index.entry(key).or_insert(Entry {
                document,
                definition,
            });
        }
        self.documents.push(SchemaDocument {
            path,
            stem,
            root,
            source: shaped,
        });
        Ok(self)
    }

    /// Freeze into an immutable graph.
    pub fn build(self) -> SchemaGraph {
        SchemaGraph {
            documents: self.documents,
            index: self.index,
            config: self.config,
        }
    }
}

/// Parse schema file text as JSON or YAML, by extension.
fn parse_schema_text(path: &Path, text: &str) -> Result<serde_json::Value, SchemaError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        serde_json::from_str(text).map_err(|e| SchemaError::parse(path, e))
    } else {
        serde_yaml::from_str(text).map_err(|e| SchemaError::parse(path, e))
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn graph(docs: Vec<(&str, serde_json::Value)>) -> SchemaGraph {
        let mut builder = SchemaGraphBuilder::new(SchemaGraphConfig::default());
        for (path, value) in docs {
            builder.add(path, value).unwrap();
        }
        builder.build()
    }

    fn title_of(located: Option<Located<'_>>) -> Option<&str> {
        located.and_then(|l| l.node.title.as_deref())
    }

    #[test]
    fn test_file_entry_point_prefers_named_definition() {
        let g = graph(vec![(
            "curation.json",
            json!({"definitions": {"Curation": {"title": "The curation"}, "Other": {}}}),
        )]);
        assert_eq!(
            title_of(g.get(&LookupKey::File("curation".into()))),
            Some("The curation")
        );
        assert_eq!(title_of(g.lookup("curation")), Some("The curation"));
        assert_eq!(
            g.document("curation").map(|d| d.entry_point().title.as_deref()),
            Some(Some("The curation"))
        );
    }

    #[test]
    fn test_definition_and_title_keys() {
        let g = graph(vec![(
            "bundle.json",
            json!({"$defs": {"figure_description": {"title": "Figure Description"}}}),
        )]);
        for key in [
            LookupKey::Definition("figure_description".into()),
            LookupKey::Definition("FigureDescription".into()),
            LookupKey::Title("Figure Description".into()),
            LookupKey::Title("figureDescription".into()),
        ] {
            assert_eq!(title_of(g.get(&key)), Some("Figure Description"), "{}", key);
        }
        assert_eq!(title_of(g.lookup("figureDescription")), Some("Figure Description"));
        assert_eq!(title_of(g.lookup("figure_description")), Some("Figure Description"));
        assert!(g.lookup("missing").is_none());
    }

    #[test]
    fn test_standalone_schema_is_a_definition() {
        let g = graph(vec![(
            "process_step.yaml",
            json!({"type": "object", "title": "Step", "properties": {"a": {}}}),
        )]);
        let located = g.get(&LookupKey::Definition("ProcessStep".into())).unwrap();
        assert!(located.node.properties.contains_key("a"));
        assert!(g.lookup("process_step").is_some());
    }

    #[test]
    fn test_flat_definitions_file() {
        let g = graph(vec![(
            "general.yaml",
            json!({"Url": {"type": "string", "description": "A URL"}, "version": 2}),
        )]);
        let doc = g.document("general").unwrap();
        assert!(doc.root.definition("Url").is_some());
        assert!(doc.root.definition("version").is_none());
        assert_eq!(
            g.lookup("url").and_then(|l| l.node.description.clone()),
            Some("A URL".into())
        );
    }

    #[test]
    fn test_first_registration_wins() {
        let g = graph(vec![
            ("a/system.json", json!({"definitions": {"System": {"title": "first"}}})),
            ("b/system.json", json!({"definitions": {"System": {"title": "second"}}})),
        ]);
        assert_eq!(title_of(g.lookup("system")), Some("first"));
        assert_eq!(g.documents().len(), 2);
    }

    #[test]
    fn test_rejects_non_mapping_document() {
        let mut builder = SchemaGraphBuilder::default();
        let err = builder.add("list.json", json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn test_keys_are_sorted() {
        let g = graph(vec![("x.json", json!({"definitions": {"X": {}}}))]);
        let keys: Vec<String> = g.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["file:x", "definition:X"]);
        assert_eq!(g.len(), 2);
        assert!(!g.is_empty());
    }

    #[test]
    fn test_config_accepts_extensions() {
        let config = SchemaGraphConfig::default();
        assert!(config.accepts(Path::new("a/b.JSON")));
        assert!(config.accepts(Path::new("a/b.yml")));
        assert!(!config.accepts(Path::new("a/b.txt")));
        let config = config.with_extensions(["json"]).with_max_ref_depth(5);
        assert!(!config.accepts(Path::new("a.yaml")));
        assert_eq!(config.max_ref_depth, 5);
    }
}
