use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{ElementFactory, FeatureKind, Registry};

/// Snapshot of common elements, validated by build.rs
const BUILTIN_REGISTRY: &str = include_str!("builtin-registry.toml");

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("element '{0}' is registered twice")]
    DuplicateElement(String),
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "element")]
    elements: Vec<ElementFactory>,
}

/// In-memory registry, built by hand or loaded from TOML
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    elements: Vec<ElementFactory>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from factories; later duplicates are rejected
    pub fn from_factories(
        factories: impl IntoIterator<Item = ElementFactory>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for factory in factories {
            registry.insert(factory)?;
        }
        Ok(registry)
    }

    /// Parse a registry document with `[[element]]` / `[[element.pad]]` tables
    pub fn from_toml_str(contents: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = toml::from_str(contents)?;
        Self::from_factories(file.elements)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// The bundled snapshot of common encoders, decoders and muxers
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_toml_str(BUILTIN_REGISTRY)
    }

    pub fn insert(&mut self, factory: ElementFactory) -> Result<(), RegistryError> {
        if self.elements.iter().any(|f| f.name == factory.name) {
            return Err(RegistryError::DuplicateElement(factory.name));
        }
        self.elements.push(factory);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Registry for StaticRegistry {
    fn lookup_feature(&self, name: &str) -> Option<ElementFactory> {
        self.elements.iter().find(|f| f.name == name).cloned()
    }

    fn feature_list(&self, kind: FeatureKind) -> Vec<ElementFactory> {
        match kind {
            FeatureKind::Element => self.elements.clone(),
            FeatureKind::TypeFind => Vec::new(),
        }
    }
}
