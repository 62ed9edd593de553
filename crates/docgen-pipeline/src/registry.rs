//! Registry of document layouts, loaded from declarative JSON tables.

use docgen_types::{DocumentTypeSpec, ValidationError};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const BUILTIN_LAYOUTS: &str = include_str!("../layouts/builtin.json");

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid layout for {document_type:?}: {reason}")]
    Invalid {
        document_type: String,
        reason: String,
    },
    #[error("cannot read layout file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse layout JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document type tag -> layout.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    types: BTreeMap<String, DocumentTypeSpec>,
}

impl DocumentRegistry {
    /// Empty registry; see [`DocumentRegistry::builtin`] for the shipped layouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the layouts shipped in `layouts/builtin.json`.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut reg = Self::new();
        reg.extend_from_json_str(BUILTIN_LAYOUTS)?;
        Ok(reg)
    }

    /// Adds or replaces a layout after checking it.
    pub fn register(&mut self, spec: DocumentTypeSpec) -> Result<(), RegistryError> {
        validate_layout(&spec)?;
        if self.types.contains_key(&spec.document_type) {
            tracing::info!(document_type = %spec.document_type, "replacing document layout");
        }
        self.types.insert(spec.document_type.clone(), spec);
        Ok(())
    }

    /// Parses a JSON array of layouts and registers each. Nothing is registered if any
    /// layout is invalid.
    pub fn extend_from_json_str(&mut self, json: &str) -> Result<usize, RegistryError> {
        let specs: Vec<DocumentTypeSpec> = serde_json::from_str(json)?;
        for spec in &specs {
            validate_layout(spec)?;
        }
        let n = specs.len();
        for spec in specs {
            self.register(spec)?;
        }
        Ok(n)
    }

    /// Reads a JSON array of layouts from `path`; same rules as `extend_from_json_str`.
    pub fn extend_from_json_file(&mut self, path: impl AsRef<Path>) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        self.extend_from_json_str(&content)
    }

    /// Layout for a document type tag.
    pub fn get(&self, document_type: &str) -> Option<&DocumentTypeSpec> {
        self.types.get(document_type)
    }

    /// Like `get`, but an unknown tag is `UnsupportedDocumentType`.
    pub fn resolve(&self, document_type: &str) -> Result<&DocumentTypeSpec, ValidationError> {
        self.get(document_type)
            .ok_or_else(|| ValidationError::UnsupportedDocumentType(document_type.to_string()))
    }

    /// Layouts sorted by tag.
    pub fn document_types(&self) -> impl Iterator<Item = &DocumentTypeSpec> {
        self.types.values()
    }

    /// Number of registered document types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when no document type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn validate_layout(spec: &DocumentTypeSpec) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::Invalid {
        document_type: spec.document_type.clone(),
        reason,
    };
    if spec.document_type.trim().is_empty() {
        return Err(invalid("empty document type tag".to_string()));
    }
    if spec.sections.is_empty() {
        return Err(invalid("no sections".to_string()));
    }
    let mut seen = HashSet::new();
    for section in &spec.sections {
        if section.id.trim().is_empty() || section.title.trim().is_empty() {
            return Err(invalid("section with empty id or title".to_string()));
        }
        if !seen.insert(section.id.as_str()) {
            return Err(invalid(format!("duplicate section id {:?}", section.id)));
        }
    }
    if let Some(ref split) = spec.split {
        if split.first_count == 0 || split.first_count >= spec.sections.len() {
            return Err(invalid(format!(
                "split after {} sections leaves an empty part",
                split.first_count
            )));
        }
    }
    Ok(())
}
