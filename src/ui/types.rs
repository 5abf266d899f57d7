use crate::error::GraphConversionError;
use crate::graph::{Edge, Graph, IntoGraph, Node};
use indexmap::IndexMap;
use serde::Deserialize;

/// Node payload as the editor stores it.
#[derive(Debug, Deserialize, Clone)]
pub struct UiNodeData {
    pub label: String,
    /// Either an object or a JSON-encoded object string.
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

/// Canvas node with ID and data
#[derive(Debug, Deserialize, Clone)]
pub struct UiNode {
    pub id: String,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    pub data: UiNodeData,
}

/// Canvas edge connecting nodes
#[derive(Debug, Deserialize, Clone)]
pub struct UiEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
}

/// Complete canvas document
#[derive(Debug, Deserialize, Clone)]
pub struct UiGraph {
    pub nodes: Vec<UiNode>,
    #[serde(default)]
    pub edges: Vec<UiEdge>,
}

impl UiGraph {
    pub fn from_json_str(json: &str) -> Result<Self, GraphConversionError> {
        serde_json::from_str(json).map_err(|e| GraphConversionError::Parse(e.to_string()))
    }
}

impl IntoGraph for UiGraph {
    fn into_graph(self) -> Result<Graph, GraphConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|ui_node| {
                let parameters = parse_parameters(&ui_node.id, ui_node.data.parameters)?;
                Ok(Node {
                    id: ui_node.id,
                    label: ui_node.data.label,
                    parameters,
                })
            })
            .collect::<Result<Vec<_>, GraphConversionError>>()?;

        let edges = self
            .edges
            .into_iter()
            .map(|ui_edge| Edge::new(ui_edge.source, ui_edge.target))
            .collect();

        Ok(Graph { nodes, edges })
    }
}

fn parse_parameters(
    node_id: &str,
    raw: Option<serde_json::Value>,
) -> Result<IndexMap<String, serde_json::Value>, GraphConversionError> {
    let invalid = |message: String| GraphConversionError::InvalidParameters {
        node_id: node_id.to_string(),
        message,
    };

    let value = match raw {
        None | Some(serde_json::Value::Null) => return Ok(IndexMap::new()),
        Some(serde_json::Value::String(text)) if text.trim().is_empty() => {
            return Ok(IndexMap::new());
        }
        Some(serde_json::Value::String(text)) => {
            serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?
        }
        Some(value) => value,
    };

    match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(invalid(format!("expected an object, found {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_editor_document() {
        let json = r#"{
            "nodes": [
                { "id": "0", "type": "default", "position": { "x": 10, "y": 20 },
                  "data": { "label": "Brain Extraction", "parameters": { "mask": true } } },
                { "id": "1", "data": { "label": "Segmentation", "parameters": "{\"nclass\": 3}" } },
                { "id": "2", "data": { "label": "Segmentation", "parameters": "" } }
            ],
            "edges": [ { "id": "e0-1", "source": "0", "target": "1" } ]
        }"#;
        let graph = UiGraph::from_json_str(json).unwrap().into_graph().unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[0].parameters["mask"], serde_json::json!(true));
        assert_eq!(graph.nodes[1].parameters["nclass"], serde_json::json!(3));
        assert!(graph.nodes[2].parameters.is_empty());
        assert_eq!(graph.edges, vec![Edge::new("0", "1")]);
    }

    #[test]
    fn rejects_non_object_parameters() {
        let json = r#"{ "nodes": [ { "id": "7", "data": { "label": "X", "parameters": "[1, 2]" } } ] }"#;
        let err = UiGraph::from_json_str(json).unwrap().into_graph().unwrap_err();
        match err {
            GraphConversionError::InvalidParameters { node_id, .. } => assert_eq!(node_id, "7"),
            other => panic!("expected InvalidParameters, got {:?}", other),
        }
    }
}
