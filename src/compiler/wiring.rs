use super::TRACING_TARGET;
use super::FanInPolicy;
use super::context::StepContext;
use super::parameters::Setting;
use crate::error::CompileError;
use crate::registry::RequiredInput;
use crate::workflow::StepInput;

/// Binds every required input of the step, either to an upstream primary
/// output or to a promoted workflow input.
///
/// Inputs the node supplies through its parameters are left to the parameter
/// resolver, unless the parameter is an unexposed wrapper without a value.
pub(super) fn wire_required_inputs(ctx: &mut StepContext<'_>) -> Result<(), CompileError> {
    let schema = ctx.schema;
    let node = ctx.node;
    let scope = ctx.scope;

    for (name, input) in &schema.required_inputs {
        if node
            .parameters
            .get(name)
            .is_some_and(|raw| Setting::from_raw(raw).binds_input())
        {
            tracing::trace!(
                target: TRACING_TARGET,
                node_id = %node.id,
                input = %name,
                "Input supplied by parameter"
            );
            continue;
        }

        let binding = if input.passthrough {
            passthrough_binding(ctx, name, input)?
        } else {
            let workflow_input = scope.naming.workflow_input(&node.id, name);
            ctx.declare_input(&workflow_input, input.ty, input.label.clone())?;
            StepInput::source(workflow_input)
        };
        ctx.step.inputs.insert(name.clone(), binding);
    }

    if !scope.index.incoming(&node.id).is_empty()
        && !schema.required_inputs.values().any(|input| input.passthrough)
    {
        tracing::warn!(
            target: TRACING_TARGET,
            node_id = %node.id,
            "Node has incoming edges but its tool declares no passthrough input"
        );
    }
    Ok(())
}

fn passthrough_binding(
    ctx: &mut StepContext<'_>,
    name: &str,
    input: &RequiredInput,
) -> Result<StepInput, CompileError> {
    let node = ctx.node;
    let scope = ctx.scope;
    let incoming = scope.index.incoming(&node.id);

    let Some(first) = incoming.first() else {
        let workflow_input = scope.naming.source_input(&node.id, name);
        ctx.declare_input(&workflow_input, input.ty, input.label.clone())?;
        return Ok(StepInput::source(workflow_input));
    };

    if incoming.len() > 1 {
        match scope.options.fan_in {
            FanInPolicy::Reject => {
                return Err(CompileError::MultipleIncomingEdges {
                    node_id: node.id.clone(),
                    input: name.to_string(),
                    count: incoming.len(),
                });
            }
            FanInPolicy::First => tracing::debug!(
                target: TRACING_TARGET,
                node_id = %node.id,
                input = name,
                ignored = incoming.len() - 1,
                "Binding passthrough input to the first incoming edge only"
            ),
        }
    }

    let unbound = || CompileError::UnboundRequiredInput {
        node_id: node.id.clone(),
        input: name.to_string(),
    };
    let upstream = scope.tool(&first.source).ok_or_else(unbound)?;
    let output = upstream.primary_outputs.first().ok_or_else(unbound)?;
    let source = format!("{}/{}", scope.naming.step_id(&first.source), output);

    tracing::debug!(
        target: TRACING_TARGET,
        node_id = %node.id,
        input = name,
        source = %source,
        "Wired upstream output"
    );
    Ok(StepInput::source(source))
}
