use super::TRACING_TARGET;
use super::CompileOptions;
use super::parameters::ParameterValue;
use crate::error::CompileError;
use crate::graph::{GraphIndex, Node};
use crate::registry::{CwlType, ToolSchema};
use crate::workflow::{WorkflowDocument, WorkflowInput, WorkflowStep};
use ahash::AHashMap;
use indexmap::IndexMap;

/// Decides the names of steps, workflow inputs, and workflow outputs.
///
/// Names stay bare when there is nothing to collide with and are namespaced by
/// step id otherwise.
#[derive(Debug)]
pub(super) struct Naming<'a> {
    prefix: &'a str,
    single_node: bool,
    sole_source: bool,
    single_terminal: bool,
}

impl<'a> Naming<'a> {
    pub(super) fn new(prefix: &'a str, index: &GraphIndex<'_>, node_count: usize) -> Self {
        Self {
            prefix,
            single_node: node_count == 1,
            sole_source: index.sources().count() == 1,
            single_terminal: index.terminals().count() == 1,
        }
    }

    pub(super) fn step_id(&self, node_id: &str) -> String {
        format!("{}{}", self.prefix, node_id)
    }

    fn namespaced(&self, node_id: &str, name: &str) -> String {
        format!("{}{}_{}", self.prefix, node_id, name)
    }

    /// Name for a required or exposed input promoted to the workflow.
    pub(super) fn workflow_input(&self, node_id: &str, name: &str) -> String {
        if self.single_node {
            name.to_string()
        } else {
            self.namespaced(node_id, name)
        }
    }

    /// Name for a passthrough input of a node with no upstream step.
    pub(super) fn source_input(&self, node_id: &str, name: &str) -> String {
        if self.sole_source {
            name.to_string()
        } else {
            self.namespaced(node_id, name)
        }
    }

    pub(super) fn workflow_output(&self, node_id: &str, name: &str) -> String {
        if self.single_terminal {
            name.to_string()
        } else {
            self.namespaced(node_id, name)
        }
    }
}

/// Everything a compile call knows about the graph before emitting steps.
pub(super) struct CompileScope<'a> {
    pub(super) index: GraphIndex<'a>,
    pub(super) order: Vec<&'a Node>,
    pub(super) tools: AHashMap<&'a str, &'a ToolSchema>,
    pub(super) naming: Naming<'a>,
    pub(super) options: &'a CompileOptions,
}

impl<'a> CompileScope<'a> {
    pub(super) fn tool(&self, node_id: &str) -> Option<&'a ToolSchema> {
        self.tools.get(node_id).copied()
    }
}

/// The step being assembled for one node, plus the document it writes inputs into.
pub(super) struct StepContext<'a> {
    pub(super) node: &'a Node,
    pub(super) schema: &'a ToolSchema,
    pub(super) scope: &'a CompileScope<'a>,
    pub(super) step: WorkflowStep,
    pub(super) resolved: IndexMap<String, ParameterValue>,
    pub(super) document: &'a mut WorkflowDocument,
}

impl<'a> StepContext<'a> {
    pub(super) fn new(
        node: &'a Node,
        schema: &'a ToolSchema,
        scope: &'a CompileScope<'a>,
        document: &'a mut WorkflowDocument,
    ) -> Self {
        Self {
            node,
            schema,
            scope,
            step: WorkflowStep {
                run: schema.cwl_path.clone(),
                inputs: IndexMap::new(),
                out: schema.primary_outputs.clone(),
            },
            resolved: IndexMap::new(),
            document,
        }
    }

    /// Adds a workflow-level input.
    ///
    /// A name that is already declared with the same type is shared between
    /// the steps that use it; a different type is a collision.
    pub(super) fn declare_input(
        &mut self,
        name: &str,
        ty: CwlType,
        label: Option<String>,
    ) -> Result<(), CompileError> {
        match self.document.inputs.get(name) {
            Some(existing) if existing.ty == ty => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    node_id = %self.node.id,
                    input = name,
                    "Sharing existing workflow input"
                );
                Ok(())
            }
            Some(existing) => Err(CompileError::InputNameCollision {
                name: name.to_string(),
                existing: existing.ty,
                incoming: ty,
            }),
            None => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    node_id = %self.node.id,
                    input = name,
                    ty = %ty,
                    "Promoted workflow input"
                );
                self.document
                    .inputs
                    .insert(name.to_string(), WorkflowInput { ty, label });
                Ok(())
            }
        }
    }
}
