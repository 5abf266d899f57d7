use super::document::WorkflowDocument;
use crate::error::CompileError;

const YAML_SHEBANG: &str = "#!/usr/bin/env cwl-runner\n\n";

/// The textual formats a workflow document can be rendered to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Conventional file extension for a workflow rendered in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "cwl",
            OutputFormat::Json => "json",
        }
    }
}

impl WorkflowDocument {
    /// Renders the document as CWL YAML.
    ///
    /// Field order is fixed by the document model and every map preserves
    /// insertion order, so equal documents render to identical text.
    pub fn to_yaml(&self) -> Result<String, CompileError> {
        let body =
            serde_yaml::to_string(self).map_err(|e| CompileError::Serialization(e.to_string()))?;
        Ok(format!("{}{}", YAML_SHEBANG, body))
    }

    /// Renders the document as pretty-printed JSON, which CWL runners accept as well.
    pub fn to_json(&self) -> Result<String, CompileError> {
        serde_json::to_string_pretty(self).map_err(|e| CompileError::Serialization(e.to_string()))
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, CompileError> {
        match format {
            OutputFormat::Yaml => self.to_yaml(),
            OutputFormat::Json => self.to_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CwlType;
    use crate::workflow::{StepInput, WorkflowInput, WorkflowOutput, WorkflowStep};
    use indexmap::IndexMap;

    fn sample() -> WorkflowDocument {
        let mut doc = WorkflowDocument::default();
        doc.inputs.insert(
            "input".to_string(),
            WorkflowInput {
                ty: CwlType::FILE,
                label: None,
            },
        );
        doc.outputs.insert(
            "brain".to_string(),
            WorkflowOutput {
                ty: CwlType::FILE.nullable(),
                output_source: "step_0/brain".to_string(),
            },
        );
        let mut inputs = IndexMap::new();
        inputs.insert("input".to_string(), StepInput::source("input"));
        inputs.insert("mask".to_string(), StepInput::constant(serde_json::json!(true)));
        doc.steps.insert(
            "step_0".to_string(),
            WorkflowStep {
                run: "cwl/fsl/bet.cwl".to_string(),
                inputs,
                out: vec!["brain".to_string()],
            },
        );
        doc
    }

    #[test]
    fn yaml_starts_with_the_format_header() {
        let yaml = sample().to_yaml().unwrap();
        assert!(yaml.starts_with("#!/usr/bin/env cwl-runner\n\ncwlVersion: v1.2\nclass: Workflow\n"));
        assert!(!yaml.contains("requirements"));
        assert!(yaml.contains("outputSource: step_0/brain"));
    }

    #[test]
    fn json_uses_native_cwl_shapes() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["class"], "Workflow");
        assert_eq!(json["outputs"]["brain"]["type"], serde_json::json!(["null", "File"]));
        assert_eq!(json["steps"]["step_0"]["in"]["input"], "input");
        assert_eq!(json["steps"]["step_0"]["in"]["mask"]["default"], true);
    }
}
