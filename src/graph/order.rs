use super::TRACING_TARGET;
use super::definition::{Edge, Graph, Node};
use crate::error::CompileError;
use ahash::AHashMap;
use std::collections::VecDeque;

/// Adjacency view over a validated `Graph`.
///
/// Construction checks that node ids are unique and that every edge endpoint
/// exists. Edge lists keep the order in which edges appear in the graph.
#[derive(Debug)]
pub struct GraphIndex<'a> {
    graph: &'a Graph,
    nodes: AHashMap<&'a str, &'a Node>,
    incoming: AHashMap<&'a str, Vec<&'a Edge>>,
    outgoing: AHashMap<&'a str, Vec<&'a Edge>>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(graph: &'a Graph) -> Result<Self, CompileError> {
        if graph.nodes.is_empty() {
            return Err(CompileError::EmptyGraph);
        }

        let mut nodes = AHashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            if nodes.insert(node.id.as_str(), node).is_some() {
                return Err(CompileError::DuplicateNode(node.id.clone()));
            }
        }

        let mut incoming: AHashMap<&str, Vec<&Edge>> = AHashMap::new();
        let mut outgoing: AHashMap<&str, Vec<&Edge>> = AHashMap::new();
        for edge in &graph.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !nodes.contains_key(endpoint.as_str()) {
                    return Err(CompileError::NodeNotFound {
                        missing_node_id: endpoint.clone(),
                        source_node_id: edge.source.clone(),
                        target_node_id: edge.target.clone(),
                    });
                }
            }
            incoming.entry(edge.target.as_str()).or_default().push(edge);
            outgoing.entry(edge.source.as_str()).or_default().push(edge);
        }

        Ok(Self {
            graph,
            nodes,
            incoming,
            outgoing,
        })
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    pub fn incoming(&self, id: &str) -> &[&'a Edge] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn outgoing(&self, id: &str) -> &[&'a Edge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Nodes without incoming edges, in graph order.
    pub fn sources(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.graph
            .nodes
            .iter()
            .filter(|node| self.incoming(&node.id).is_empty())
    }

    /// Nodes without outgoing edges, in graph order.
    pub fn terminals(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.graph
            .nodes
            .iter()
            .filter(|node| self.outgoing(&node.id).is_empty())
    }

    /// Orders the nodes so that every edge points forward (Kahn's algorithm).
    ///
    /// The queue is seeded with zero in-degree nodes in graph order and nodes
    /// become eligible in the order their last incoming edge is released.
    /// Ties are never re-sorted, so the order is deterministic but depends on
    /// the order of nodes and edges in the graph.
    pub fn topological_order(&self) -> Result<Vec<&'a Node>, CompileError> {
        let mut in_degree: AHashMap<&str, usize> = self
            .graph
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), self.incoming(&node.id).len()))
            .collect();

        let mut queue: VecDeque<&'a Node> = self.sources().collect();
        let mut order = Vec::with_capacity(self.graph.nodes.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for edge in self.outgoing(&node.id) {
                let Some(degree) = in_degree.get_mut(edge.target.as_str()) else {
                    continue;
                };
                *degree -= 1;
                if *degree == 0 {
                    if let Some(target) = self.node(&edge.target) {
                        queue.push_back(target);
                    }
                }
            }
        }

        if order.len() != self.graph.nodes.len() {
            let node_ids: Vec<String> = self
                .graph
                .nodes
                .iter()
                .filter(|node| in_degree.get(node.id.as_str()).is_some_and(|d| *d > 0))
                .map(|node| node.id.clone())
                .collect();
            return Err(CompileError::CyclicGraph { node_ids });
        }

        tracing::debug!(
            target: TRACING_TARGET,
            order = ?order.iter().map(|node| node.id.as_str()).collect::<Vec<_>>(),
            "Computed execution order"
        );
        Ok(order)
    }
}
