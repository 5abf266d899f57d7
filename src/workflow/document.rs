use crate::registry::CwlType;
use indexmap::{IndexMap, IndexSet};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const CWL_VERSION: &str = "v1.2";
pub const WORKFLOW_CLASS: &str = "Workflow";

/// Needed when a step input is computed from its source with `valueFrom`.
pub const STEP_INPUT_EXPRESSION: &str = "StepInputExpressionRequirement";
/// Needed when that `valueFrom` is a JavaScript expression rather than a plain parameter reference.
pub const INLINE_JAVASCRIPT: &str = "InlineJavascriptRequirement";

/// A compiled CWL workflow. Field order here is the field order of the rendered text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    pub cwl_version: &'static str,
    pub class: &'static str,
    #[serde(skip_serializing_if = "Requirements::is_empty")]
    pub requirements: Requirements,
    pub inputs: IndexMap<String, WorkflowInput>,
    pub outputs: IndexMap<String, WorkflowOutput>,
    pub steps: IndexMap<String, WorkflowStep>,
}

impl Default for WorkflowDocument {
    fn default() -> Self {
        Self {
            cwl_version: CWL_VERSION,
            class: WORKFLOW_CLASS,
            requirements: Requirements::default(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            steps: IndexMap::new(),
        }
    }
}

/// Workflow-level requirement classes, rendered as `{Class: {}}` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Requirements(IndexSet<&'static str>);

impl Requirements {
    pub fn insert(&mut self, class: &'static str) {
        self.0.insert(class);
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.contains(class)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Serialize)]
struct Empty {}

impl Serialize for Requirements {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for class in &self.0 {
            map.serialize_entry(class, &Empty {})?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowInput {
    #[serde(rename = "type")]
    pub ty: CwlType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOutput {
    #[serde(rename = "type")]
    pub ty: CwlType,
    /// `<step-id>/<output-name>` of the producing step.
    pub output_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowStep {
    pub run: String,
    #[serde(rename = "in")]
    pub inputs: IndexMap<String, StepInput>,
    pub out: Vec<String>,
}

/// How a step input gets its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepInput {
    /// A workflow input name or an upstream `<step-id>/<output>`.
    Source(String),
    /// A constant baked into the step.
    Default { default: serde_json::Value },
    /// A source reshaped by a parameter reference before it reaches the tool.
    Expression {
        source: String,
        #[serde(rename = "valueFrom")]
        value_from: String,
    },
}

impl StepInput {
    pub fn source(source: impl Into<String>) -> Self {
        StepInput::Source(source.into())
    }

    pub fn constant(value: serde_json::Value) -> Self {
        StepInput::Default { default: value }
    }

    /// The baked constant, if this input is one.
    pub fn as_constant(&self) -> Option<&serde_json::Value> {
        match self {
            StepInput::Default { default } => Some(default),
            _ => None,
        }
    }
}
