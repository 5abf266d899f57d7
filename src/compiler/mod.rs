use crate::error::CompileError;
use crate::graph::{Graph, GraphIndex};
use crate::registry::ToolRegistry;
use crate::workflow::{OutputFormat, WorkflowDocument};
use ahash::AHashMap;

mod builder;
mod context;
mod parameters;
mod wiring;

pub use parameters::{ParameterValue, Setting, VariantSelection};

use builder::DocumentBuilder;
use context::{CompileScope, Naming};

pub const TRACING_TARGET: &str = "cwlforge::compiler";

/// What to do when a passthrough input has more than one incoming edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FanInPolicy {
    /// Bind to the first incoming edge and ignore the rest.
    #[default]
    First,
    /// Fail with `CompileError::MultipleIncomingEdges`.
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    pub fan_in: FanInPolicy,
    /// Drop terminal primary outputs whose `requires` input is not set.
    pub enforce_output_requirements: bool,
    /// Also expose a terminal tool's non-primary outputs, subject to their `requires`.
    pub expose_secondary_outputs: bool,
    pub step_prefix: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            fan_in: FanInPolicy::First,
            enforce_output_requirements: false,
            expose_secondary_outputs: false,
            step_prefix: "step_".to_string(),
        }
    }
}

/// A tool definition file the compiled workflow runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReference {
    pub id: String,
    pub path: String,
}

/// The files a workflow output is expected to be collected from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub output: String,
    pub step_id: String,
    /// Glob patterns with baked `$(inputs.*)` references substituted.
    pub patterns: Vec<String>,
}

/// The result of a successful compile.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWorkflow {
    pub document: WorkflowDocument,
    /// Distinct tool definitions, in the order their steps first appear.
    pub tools: Vec<ToolReference>,
    pub artifacts: Vec<OutputArtifact>,
}

impl CompiledWorkflow {
    pub fn render(&self, format: OutputFormat) -> Result<String, CompileError> {
        self.document.render(format)
    }
}

/// Compiles editor graphs into CWL workflows against a borrowed tool registry.
///
/// The compiler holds no state between calls; one instance can compile any
/// number of graphs, from any number of threads.
#[derive(Debug, Clone)]
pub struct Compiler<'r> {
    registry: &'r ToolRegistry,
    options: CompileOptions,
}

pub struct CompilerBuilder<'r> {
    registry: &'r ToolRegistry,
    options: CompileOptions,
}

impl<'r> CompilerBuilder<'r> {
    pub fn new(registry: &'r ToolRegistry) -> Self {
        Self {
            registry,
            options: CompileOptions::default(),
        }
    }
    pub fn fan_in(mut self, policy: FanInPolicy) -> Self {
        self.options.fan_in = policy;
        self
    }
    pub fn enforce_output_requirements(mut self, enforce: bool) -> Self {
        self.options.enforce_output_requirements = enforce;
        self
    }
    pub fn expose_secondary_outputs(mut self, expose: bool) -> Self {
        self.options.expose_secondary_outputs = expose;
        self
    }
    pub fn step_prefix(mut self, prefix: &str) -> Self {
        self.options.step_prefix = prefix.to_string();
        self
    }
    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }
    pub fn build(self) -> Compiler<'r> {
        Compiler {
            registry: self.registry,
            options: self.options,
        }
    }
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r ToolRegistry) -> Self {
        CompilerBuilder::new(registry).build()
    }

    pub fn builder(registry: &'r ToolRegistry) -> CompilerBuilder<'r> {
        CompilerBuilder::new(registry)
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles a graph into a workflow document.
    ///
    /// Compilation is all-or-nothing: any error leaves no partial document behind.
    pub fn compile(&self, graph: &Graph) -> Result<CompiledWorkflow, CompileError> {
        let _span = tracing::debug_span!(
            target: TRACING_TARGET,
            "compile",
            nodes = graph.nodes.len(),
            edges = graph.edges.len()
        )
        .entered();

        let index = GraphIndex::new(graph)?;

        let mut tools = AHashMap::with_capacity(graph.nodes.len());
        for node in &graph.nodes {
            let schema =
                self.registry
                    .lookup(&node.label)
                    .ok_or_else(|| CompileError::UnknownTool {
                        node_id: node.id.clone(),
                        label: node.label.clone(),
                    })?;
            tools.insert(node.id.as_str(), schema);
        }

        let order = index.topological_order()?;
        let naming = Naming::new(&self.options.step_prefix, &index, graph.nodes.len());
        let scope = CompileScope {
            index,
            order,
            tools,
            naming,
            options: &self.options,
        };

        let mut builder = DocumentBuilder::new(&scope);
        for &node in &scope.order {
            let Some(schema) = scope.tool(&node.id) else {
                continue;
            };
            builder.add_step(node, schema)?;
        }
        let compiled = builder.finish()?;

        tracing::debug!(
            target: TRACING_TARGET,
            steps = compiled.document.steps.len(),
            inputs = compiled.document.inputs.len(),
            outputs = compiled.document.outputs.len(),
            "Compilation finished"
        );
        Ok(compiled)
    }

    /// Compiles and renders in one call.
    pub fn compile_to_string(
        &self,
        graph: &Graph,
        format: OutputFormat,
    ) -> Result<String, CompileError> {
        self.compile(graph)?.render(format)
    }
}
