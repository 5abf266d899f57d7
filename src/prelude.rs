//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the cwlforge crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use cwlforge::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let registry = ToolRegistry::from_file("path/to/tools.json")?;
//! let editor_json = std::fs::read_to_string("path/to/graph.json")?;
//! let graph = UiGraph::from_json_str(&editor_json)?.into_graph()?;
//!
//! let yaml = Compiler::new(&registry).compile_to_string(&graph, OutputFormat::Yaml)?;
//! println!("{}", yaml);
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{
    CompileOptions, CompiledWorkflow, Compiler, CompilerBuilder, FanInPolicy, OutputArtifact,
    ParameterValue, Setting, ToolReference, VariantSelection,
};

// Graph model and conversion
pub use crate::graph::{Edge, Graph, IntoGraph, Node};
pub use crate::ui::UiGraph;

// Registry
pub use crate::registry::{CwlType, ToolRegistry, ToolSchema};

// Emitted document
pub use crate::workflow::{OutputFormat, StepInput, WorkflowDocument};

// Error types
pub use crate::error::{CompileError, GraphConversionError, RegistryError};

#[cfg(feature = "bundle")]
pub use crate::bundle::{Bundle, DirectorySource, ToolSource};
#[cfg(feature = "bundle")]
pub use crate::error::BundleError;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
