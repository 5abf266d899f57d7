use super::TRACING_TARGET;
use super::context::{CompileScope, StepContext};
use super::parameters::{self, ParameterValue};
use super::wiring;
use super::{CompiledWorkflow, OutputArtifact, ToolReference};
use crate::error::CompileError;
use crate::graph::Node;
use crate::registry::{OutputDeclaration, ToolSchema};
use crate::workflow::{StepInput, WorkflowDocument, WorkflowOutput, WorkflowStep};
use ahash::AHashMap;
use indexmap::IndexMap;
use itertools::Itertools;

/// Responsible for assembling the workflow document one step at a time.
pub(super) struct DocumentBuilder<'a> {
    scope: &'a CompileScope<'a>,
    document: WorkflowDocument,
    resolved: AHashMap<&'a str, IndexMap<String, ParameterValue>>,
}

impl<'a> DocumentBuilder<'a> {
    pub(super) fn new(scope: &'a CompileScope<'a>) -> Self {
        Self {
            scope,
            document: WorkflowDocument::default(),
            resolved: AHashMap::new(),
        }
    }

    /// Wires and parameterizes the step for `node`. Nodes must arrive in execution order.
    pub(super) fn add_step(
        &mut self,
        node: &'a Node,
        schema: &'a ToolSchema,
    ) -> Result<(), CompileError> {
        let step_id = self.scope.naming.step_id(&node.id);
        let mut ctx = StepContext::new(node, schema, self.scope, &mut self.document);

        // 1. Required inputs: upstream outputs or promoted workflow inputs
        wiring::wire_required_inputs(&mut ctx)?;

        // 2. User configuration, baked or exposed
        for (name, raw) in &node.parameters {
            let value = ParameterValue::from_raw(
                &node.id,
                name,
                raw,
                schema.optional_inputs.get(name),
            )?;
            parameters::apply(&mut ctx, name, &value)?;
            ctx.resolved.insert(name.clone(), value);
        }

        let StepContext { step, resolved, .. } = ctx;
        tracing::debug!(
            target: TRACING_TARGET,
            step_id = %step_id,
            run = %step.run,
            inputs = step.inputs.len(),
            "Assembled step"
        );
        self.document.steps.insert(step_id, step);
        self.resolved.insert(node.id.as_str(), resolved);
        Ok(())
    }

    /// Declares workflow outputs from the terminal nodes and hands back the finished document.
    pub(super) fn finish(mut self) -> Result<CompiledWorkflow, CompileError> {
        let scope = self.scope;
        let mut artifacts = Vec::new();

        let terminals = scope
            .order
            .iter()
            .filter(|node| scope.index.outgoing(&node.id).is_empty());

        for node in terminals {
            let Some(schema) = scope.tool(&node.id) else {
                continue;
            };
            let step_id = scope.naming.step_id(&node.id);
            let empty = IndexMap::new();
            let resolved = self.resolved.get(node.id.as_str()).unwrap_or(&empty);
            let Some(step) = self.document.steps.get_mut(&step_id) else {
                return Err(CompileError::Serialization(format!(
                    "step '{}' was never assembled",
                    step_id
                )));
            };

            let mut exposed = Vec::new();
            for output in &schema.primary_outputs {
                let declaration = schema.outputs.get(output);
                if scope.options.enforce_output_requirements
                    && !requirement_met(declaration, resolved)
                {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        step_id = %step_id,
                        output = %output,
                        "Skipping output whose requirement is not set"
                    );
                    continue;
                }
                exposed.push(output.clone());
            }
            if scope.options.expose_secondary_outputs {
                for (output, declaration) in &schema.outputs {
                    if schema.primary_outputs.contains(output)
                        || !requirement_met(Some(declaration), resolved)
                    {
                        continue;
                    }
                    step.out.push(output.clone());
                    exposed.push(output.clone());
                }
            }

            let step = &*step;
            for output in exposed {
                let name = scope.naming.workflow_output(&node.id, &output);
                if self.document.outputs.contains_key(&name) {
                    return Err(CompileError::OutputNameCollision { name });
                }

                let patterns = schema
                    .outputs
                    .get(&output)
                    .map(|declaration| {
                        declaration.resolved_globs(|input| baked_string(step, input))
                    })
                    .unwrap_or_default();
                artifacts.push(OutputArtifact {
                    output: name.clone(),
                    step_id: step_id.clone(),
                    patterns,
                });

                tracing::debug!(
                    target: TRACING_TARGET,
                    output = %name,
                    step_id = %step_id,
                    "Declared workflow output"
                );
                self.document.outputs.insert(
                    name,
                    WorkflowOutput {
                        ty: schema.output_type(&output),
                        output_source: format!("{}/{}", step_id, output),
                    },
                );
            }
        }

        let tools = scope
            .order
            .iter()
            .filter_map(|node| scope.tool(&node.id))
            .unique_by(|schema| schema.cwl_path.clone())
            .map(|schema| ToolReference {
                id: schema.id.clone(),
                path: schema.cwl_path.clone(),
            })
            .collect();

        Ok(CompiledWorkflow {
            document: self.document,
            tools,
            artifacts,
        })
    }
}

/// An output without `requires` is always produced; otherwise the gating parameter must be active.
fn requirement_met(
    declaration: Option<&OutputDeclaration>,
    resolved: &IndexMap<String, ParameterValue>,
) -> bool {
    match declaration.and_then(|declaration| declaration.requires.as_ref()) {
        None => true,
        Some(requires) => resolved.get(requires).is_some_and(ParameterValue::is_active),
    }
}

fn baked_string(step: &WorkflowStep, input: &str) -> Option<String> {
    step.inputs
        .get(input)
        .and_then(StepInput::as_constant)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}
