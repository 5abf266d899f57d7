use super::definition::Graph;
use crate::error::GraphConversionError;

/// A trait for editor or file formats that can be converted into a `Graph`.
///
/// This is the seam between whatever the caller stores and the compiler. The
/// crate ships an implementation for the canvas editor's document
/// (`ui::UiGraph`); other front ends implement it for their own structs.
///
/// # Example
///
/// ```rust,no_run
/// use cwlforge::prelude::*;
/// use cwlforge::error::GraphConversionError;
///
/// struct Pipeline { steps: Vec<(String, String)> }
///
/// impl IntoGraph for Pipeline {
///     fn into_graph(self) -> std::result::Result<Graph, GraphConversionError> {
///         let nodes = self
///             .steps
///             .iter()
///             .map(|(id, label)| Node::new(id.as_str(), label.as_str()))
///             .collect();
///         let edges = self
///             .steps
///             .windows(2)
///             .map(|pair| Edge::new(pair[0].0.as_str(), pair[1].0.as_str()))
///             .collect();
///         Ok(Graph::new(nodes, edges))
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a compilable graph.
    fn into_graph(self) -> Result<Graph, GraphConversionError>;
}

impl IntoGraph for Graph {
    fn into_graph(self) -> Result<Graph, GraphConversionError> {
        Ok(self)
    }
}
