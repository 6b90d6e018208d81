//! `$ref` resolution.
//!
//! Supported reference forms:
//!
//! | Form | Target |
//! |------|--------|
//! | `#/definitions/X` | pointer into the current document |
//! | `./x.json#/definitions/X`, `../x.yaml#/...` | pointer into the document with stem `x` |
//! | `x.json#/...` | same, without the leading `./` |
//! | `./x.json` | entry point of document `x` |
//! | `http://...`, `https://...` | never resolved |

use std::path::Path;

use tracing::{debug, warn};

use super::graph::{Located, SchemaGraph};
use super::node::SchemaNode;

/// Outcome of resolving a single `$ref`.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'g> {
    /// The target node and the root its own refs resolve against
    Resolved(Located<'g>),
    /// The reference could not be followed
    Unresolved,
}

impl<'g> Resolution<'g> {
    /// Convert into an `Option`.
    pub fn ok(self) -> Option<Located<'g>> {
        match self {
            Resolution::Resolved(located) => Some(located),
            Resolution::Unresolved => None,
        }
    }

    /// Check whether the reference was resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

impl SchemaGraph {
    /// Resolve one `$ref` string relative to the document `root`.
    ///
    /// Never fails: anything that cannot be followed is
    /// [`Resolution::Unresolved`].
    pub fn resolve_ref<'g>(&'g self, reference: &str, root: &'g SchemaNode) -> Resolution<'g> {
        let (path, fragment) = match reference.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (reference, None),
        };

        if path.contains("://") {
            debug!(reference, "leaving absolute reference unresolved");
            return Resolution::Unresolved;
        }

        let located = if path.is_empty() {
            root.pointer(fragment.unwrap_or_default())
                .map(|node| Located { node, root })
        } else {
            self.resolve_external(path, fragment)
        };

        match located {
            Some(located) => Resolution::Resolved(located),
            None => {
                debug!(reference, "unresolved reference");
                Resolution::Unresolved
            }
        }
    }

    fn resolve_external<'g>(&'g self, path: &str, fragment: Option<&str>) -> Option<Located<'g>> {
        let stem = Path::new(path).file_stem()?.to_str()?;
        let document = self.document(stem)?;
        let root = &document.root;
        let node = match fragment {
            Some(pointer) if !pointer.trim_matches('/').is_empty() => root.pointer(pointer)?,
            _ => document.entry_point(),
        };
        Some(Located { node, root })
    }

    /// Follow the `$ref` chain starting at `start`.
    ///
    /// Stops at the first node without a `$ref`, at the first reference that
    /// cannot be resolved (returning the node holding it), or after
    /// `max_ref_depth` hops.
    pub fn follow_refs<'g>(&'g self, start: Located<'g>) -> Located<'g> {
        let mut current = start;
        for _ in 0..self.config().max_ref_depth {
            let reference = match &current.node.reference {
                Some(reference) => reference,
                None => return current,
            };
            match self.resolve_ref(reference, current.root) {
                Resolution::Resolved(next) => current = next,
                Resolution::Unresolved => return current,
            }
        }
        if let Some(reference) = &current.node.reference {
            warn!(
                reference = %reference,
                max = self.config().max_ref_depth,
                "reference chain too long, stopping"
            );
        }
        current
    }
}
