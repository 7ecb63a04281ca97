//! Content catalog - the registry of distributable content records

use ahash::AHashMap;

use crate::core::types::{ContentId, ContentKind};

/// A single registered content record
#[derive(Debug, Clone)]
pub struct ContentDef {
    pub id: ContentId,
    pub name: String,
    pub kind: ContentKind,
}

/// Registry of all content records known to the host simulation
///
/// Rules reference content by name; the rule repository resolves those
/// references against this catalog when it is built. A rule naming content
/// that was never registered here is skipped with a diagnostic.
#[derive(Debug, Default)]
pub struct ContentCatalog {
    defs: Vec<ContentDef>,
    by_name: AHashMap<String, ContentId>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content record under a unique name, returning its id.
    ///
    /// Registering a name twice returns the id of the first registration.
    pub fn register(&mut self, name: &str, kind: ContentKind) -> ContentId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }

        let id = ContentId(self.defs.len() as u32);
        self.defs.push(ContentDef {
            id,
            name: name.to_string(),
            kind,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn find(&self, name: &str) -> Option<&ContentDef> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    pub fn get(&self, id: ContentId) -> Option<&ContentDef> {
        self.defs.get(id.0 as usize)
    }

    pub fn kind(&self, id: ContentId) -> Option<ContentKind> {
        self.get(id).map(|def| def.kind)
    }

    /// Display name for diagnostics; ids never registered print as unknown.
    pub fn name(&self, id: ContentId) -> &str {
        self.get(id).map(|def| def.name.as_str()).unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
