//! Typed per-node parameters and their resolution into step inputs.

use super::TRACING_TARGET;
use super::context::StepContext;
use crate::error::CompileError;
use crate::registry::{CwlType, OptionalInput, RecordInput, ScalarInput};
use crate::workflow::{INLINE_JAVASCRIPT, STEP_INPUT_EXPRESSION, StepInput};
use serde_json::Value;

/// How a single parameter reaches its step.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    /// A raw constant, baked into the step.
    Literal(Value),
    /// Promoted to a workflow input supplied at run time.
    Exposed,
    /// A constant given as `{ "value": V }`, baked into the step.
    Bound(Value),
    /// `{ "expose": false }` without a value: the step leaves the input unbound
    /// and the tool's own default applies.
    Omitted,
}

/// The one active choice of a mutually exclusive option group.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSelection {
    pub variant: String,
    pub setting: Setting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Scalar(Setting),
    Variant(VariantSelection),
}

impl Setting {
    /// Reads the editor's wrapper forms: `{expose: true}`, `{value: V}`,
    /// `{expose: false}`, or a raw literal.
    pub fn from_raw(raw: &Value) -> Self {
        if let Value::Object(map) = raw {
            match (map.get("expose"), map.get("value")) {
                (Some(expose), _) if is_truthy(expose) => return Setting::Exposed,
                (_, Some(value)) => return Setting::Bound(value.clone()),
                (Some(_), None) => return Setting::Omitted,
                (None, None) => {}
            }
        }
        Setting::Literal(raw.clone())
    }

    /// The baked value, if any.
    pub fn constant(&self) -> Option<&Value> {
        match self {
            Setting::Literal(value) | Setting::Bound(value) => Some(value),
            Setting::Exposed | Setting::Omitted => None,
        }
    }

    /// Whether the parameter may be set when the workflow runs.
    ///
    /// Exposed parameters are decided by the caller at run time, so they count.
    pub fn is_active(&self) -> bool {
        match self {
            Setting::Literal(value) | Setting::Bound(value) => is_truthy(value),
            Setting::Exposed => true,
            Setting::Omitted => false,
        }
    }

    /// Whether the step receives a value for this input at all.
    pub fn binds_input(&self) -> bool {
        !matches!(self, Setting::Omitted)
    }
}

impl ParameterValue {
    /// Interprets a raw parameter against its optional-input declaration, if the tool has one.
    pub fn from_raw(
        node_id: &str,
        name: &str,
        raw: &Value,
        declaration: Option<&OptionalInput>,
    ) -> Result<Self, CompileError> {
        match declaration {
            Some(OptionalInput::Record(record)) => {
                select_variant(node_id, name, raw, record).map(ParameterValue::Variant)
            }
            Some(OptionalInput::Scalar(scalar)) => {
                let setting = Setting::from_raw(raw);
                check_constraints(node_id, name, &setting, scalar)?;
                Ok(ParameterValue::Scalar(setting))
            }
            None => Ok(ParameterValue::Scalar(Setting::from_raw(raw))),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            ParameterValue::Scalar(setting) => setting.is_active(),
            ParameterValue::Variant(_) => true,
        }
    }
}

/// A variant is active unless it is `null`, `false`, or an unexposed wrapper without a value.
fn select_variant(
    node_id: &str,
    name: &str,
    raw: &Value,
    record: &RecordInput,
) -> Result<VariantSelection, CompileError> {
    let Value::Object(choices) = raw else {
        return Err(CompileError::InvalidParameter {
            node_id: node_id.to_string(),
            parameter: name.to_string(),
            message: "expected an object keyed by variant name".to_string(),
        });
    };

    let mut active = Vec::new();
    for (variant, value) in choices {
        let Some(declaration) = record.variants.get(variant) else {
            return Err(CompileError::InvalidParameter {
                node_id: node_id.to_string(),
                parameter: name.to_string(),
                message: format!("'{}' is not a variant of this option group", variant),
            });
        };
        if matches!(value, Value::Null | Value::Bool(false)) {
            continue;
        }
        let setting = Setting::from_raw(value);
        if !setting.binds_input() {
            continue;
        }
        active.push((variant, setting, declaration));
    }

    match active.as_slice() {
        [(variant, setting, declaration)] => {
            check_constraints(node_id, name, setting, declaration)?;
            Ok(VariantSelection {
                variant: (*variant).clone(),
                setting: setting.clone(),
            })
        }
        _ => Err(CompileError::InvalidVariantSelection {
            node_id: node_id.to_string(),
            parameter: name.to_string(),
            active: active.iter().map(|(variant, ..)| (*variant).clone()).collect(),
        }),
    }
}

fn check_constraints(
    node_id: &str,
    name: &str,
    setting: &Setting,
    declaration: &ScalarInput,
) -> Result<(), CompileError> {
    let Some(value) = setting.constant() else {
        return Ok(());
    };
    let invalid = |message: String| CompileError::InvalidParameter {
        node_id: node_id.to_string(),
        parameter: name.to_string(),
        message,
    };

    if let (Some((low, high)), Some(number)) = (declaration.bounds, value.as_f64()) {
        if number < low || number > high {
            return Err(invalid(format!(
                "{} is outside the allowed range [{}, {}]",
                number, low, high
            )));
        }
    }
    if let Some(options) = &declaration.options {
        if !options.iter().any(|option| same_value(option, value)) {
            return Err(invalid(format!(
                "{} is not one of the allowed options",
                value
            )));
        }
    }
    Ok(())
}

/// Compares numbers by value so that `1` and `1.0` match.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Binds one resolved parameter into the step being assembled.
pub(super) fn apply(
    ctx: &mut StepContext<'_>,
    name: &str,
    value: &ParameterValue,
) -> Result<(), CompileError> {
    let input = match value {
        ParameterValue::Scalar(Setting::Omitted)
        | ParameterValue::Variant(VariantSelection {
            setting: Setting::Omitted,
            ..
        }) => {
            tracing::trace!(
                target: TRACING_TARGET,
                node_id = %ctx.node.id,
                parameter = name,
                "Parameter left to the tool default"
            );
            return Ok(());
        }
        ParameterValue::Scalar(Setting::Literal(v) | Setting::Bound(v)) => {
            StepInput::constant(v.clone())
        }
        ParameterValue::Scalar(Setting::Exposed) => {
            let ty = ctx.schema.input_type(name).unwrap_or(CwlType::STRING);
            let label = input_label(ctx, name);
            let workflow_input = ctx.scope.naming.workflow_input(&ctx.node.id, name);
            ctx.declare_input(&workflow_input, ty, label)?;
            StepInput::source(workflow_input)
        }
        ParameterValue::Variant(selection) => match &selection.setting {
            Setting::Literal(v) | Setting::Bound(v) => {
                let mut record = serde_json::Map::new();
                record.insert(selection.variant.clone(), v.clone());
                StepInput::constant(Value::Object(record))
            }
            Setting::Omitted => return Ok(()),
            Setting::Exposed => {
                let ty = variant_type(ctx, name, &selection.variant);
                let exposed_name = format!("{}_{}", name, selection.variant);
                let workflow_input = ctx.scope.naming.workflow_input(&ctx.node.id, &exposed_name);
                ctx.declare_input(&workflow_input, ty, None)?;
                ctx.document.requirements.insert(INLINE_JAVASCRIPT);
                ctx.document.requirements.insert(STEP_INPUT_EXPRESSION);
                StepInput::Expression {
                    source: workflow_input,
                    value_from: format!("$({{\"{}\": self}})", selection.variant),
                }
            }
        },
    };

    tracing::trace!(
        target: TRACING_TARGET,
        node_id = %ctx.node.id,
        parameter = name,
        "Bound parameter"
    );
    ctx.step.inputs.insert(name.to_string(), input);
    Ok(())
}

fn input_label(ctx: &StepContext<'_>, name: &str) -> Option<String> {
    match ctx.schema.optional_inputs.get(name) {
        Some(OptionalInput::Scalar(scalar)) => scalar.label.clone(),
        Some(OptionalInput::Record(record)) => record.label.clone(),
        None => ctx
            .schema
            .required_inputs
            .get(name)
            .and_then(|required| required.label.clone()),
    }
}

fn variant_type(ctx: &StepContext<'_>, name: &str, variant: &str) -> CwlType {
    match ctx.schema.optional_inputs.get(name) {
        Some(OptionalInput::Record(record)) => record
            .variants
            .get(variant)
            .map(|declaration| declaration.ty)
            .unwrap_or(CwlType::STRING),
        _ => CwlType::STRING,
    }
}
