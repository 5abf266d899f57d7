use crate::registry::CwlType;
use thiserror::Error;

/// Errors that can occur while compiling a graph into a workflow document.
///
/// Every variant is deterministic for a given graph and registry, so none of
/// them is worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("The graph contains no nodes")]
    EmptyGraph,

    #[error("Node id '{0}' is used by more than one node")]
    DuplicateNode(String),

    #[error("Node '{missing_node_id}' not found, which is referenced by an edge from '{source_node_id}' to '{target_node_id}'")]
    NodeNotFound {
        missing_node_id: String,
        source_node_id: String,
        target_node_id: String,
    },

    #[error("Node '{node_id}' references tool '{label}', which is not in the registry")]
    UnknownTool { node_id: String, label: String },

    #[error("Workflow graph has cycles; unresolved nodes: {}", .node_ids.join(", "))]
    CyclicGraph { node_ids: Vec<String> },

    #[error("Input '{input}' of node '{node_id}' has no source")]
    UnboundRequiredInput { node_id: String, input: String },

    #[error("Input '{input}' of node '{node_id}' has {count} incoming edges, but only one is allowed")]
    MultipleIncomingEdges {
        node_id: String,
        input: String,
        count: usize,
    },

    #[error(
        "Parameter '{parameter}' of node '{node_id}' must select exactly one variant, but {}",
        describe_active(.active)
    )]
    InvalidVariantSelection {
        node_id: String,
        parameter: String,
        active: Vec<String>,
    },

    #[error("Parameter '{parameter}' of node '{node_id}' is invalid: {message}")]
    InvalidParameter {
        node_id: String,
        parameter: String,
        message: String,
    },

    #[error("Workflow input '{name}' is declared as both {existing} and {incoming}")]
    InputNameCollision {
        name: String,
        existing: CwlType,
        incoming: CwlType,
    },

    #[error("Workflow output '{name}' is produced by more than one step")]
    OutputNameCollision { name: String },

    #[error("Failed to render workflow document: {0}")]
    Serialization(String),
}

fn describe_active(active: &[String]) -> String {
    match active {
        [] => "none was active".to_string(),
        _ => format!("{} were active ({})", active.len(), active.join(", ")),
    }
}

/// Errors that can occur while loading or validating a tool registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Failed to parse tool registry: {0}")]
    Parse(String),

    #[error("Failed to read tool registry '{path}': {message}")]
    Io { path: String, message: String },

    #[error("'{0}' is not a valid CWL type")]
    InvalidType(String),

    #[error("Tool '{label}' lists primary output '{output}', which is not declared in its outputs")]
    UndeclaredPrimaryOutput { label: String, output: String },

    #[error("Output '{output}' of tool '{label}' requires '{requires}', which is not an optional input")]
    UnknownRequirement {
        label: String,
        output: String,
        requires: String,
    },
}

/// Errors that can occur when converting a caller's graph format into a `Graph`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphConversionError {
    #[error("Invalid graph document: {0}")]
    Parse(String),

    #[error("Parameters of node '{node_id}' are invalid: {message}")]
    InvalidParameters { node_id: String, message: String },
}

/// Errors that can occur while packaging a compiled workflow into an archive.
#[cfg(feature = "bundle")]
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to fetch tool definition '{path}': {source}")]
    Fetch {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Render(#[from] CompileError),

    #[error("Failed to write archive: {0}")]
    Archive(String),
}
