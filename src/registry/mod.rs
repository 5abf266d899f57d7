//! The tool registry: a read-only catalog mapping editor labels to tool schemas.
//!
//! Registries are plain values. Load one at startup and hand a reference to every
//! compiler that needs it; nothing in the crate keeps a global copy.

pub mod schema;
pub mod types;

pub use schema::*;
pub use types::*;

use crate::error::RegistryError;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

pub const TRACING_TARGET: &str = "cwlforge::registry";

const BUILTIN_TOOLS: &str = include_str!("../../data/tools.json");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolRegistry {
    tools: IndexMap<String, ToolSchema>,
}

impl ToolRegistry {
    /// The catalog shipped with the crate (FSL brain extraction and segmentation).
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_json_str(BUILTIN_TOOLS)
    }

    /// Parses a registry from its JSON source form: an object of label -> schema.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let tools: IndexMap<String, ToolSchema> =
            serde_json::from_str(json).map_err(|e| RegistryError::Parse(e.to_string()))?;
        Self::from_tools(tools)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| RegistryError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Builds a registry from already-constructed schemas, validating each one.
    pub fn from_tools<I, L>(tools: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (L, ToolSchema)>,
        L: Into<String>,
    {
        let tools: IndexMap<String, ToolSchema> = tools
            .into_iter()
            .map(|(label, schema)| (label.into(), schema))
            .collect();
        for (label, schema) in &tools {
            schema.validate(label)?;
        }
        tracing::debug!(
            target: TRACING_TARGET,
            tools = tools.len(),
            "Loaded tool registry"
        );
        Ok(Self { tools })
    }

    pub fn lookup(&self, label: &str) -> Option<&ToolSchema> {
        self.tools.get(label)
    }

    /// Labels in catalog order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
