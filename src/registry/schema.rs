use super::types::CwlType;
use crate::error::RegistryError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Describes what a tool consumes and produces, and where its CWL definition lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    pub id: String,
    pub cwl_path: String,
    /// Outputs that flow to downstream steps by default.
    pub primary_outputs: Vec<String>,
    #[serde(default)]
    pub required_inputs: IndexMap<String, RequiredInput>,
    #[serde(default)]
    pub optional_inputs: IndexMap<String, OptionalInput>,
    #[serde(default)]
    pub outputs: IndexMap<String, OutputDeclaration>,
}

/// An input the tool cannot run without.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredInput {
    #[serde(rename = "type")]
    pub ty: CwlType,
    /// Fed by an upstream primary output, or promoted when the node has no incoming edge.
    #[serde(default)]
    pub passthrough: bool,
    #[serde(default)]
    pub label: Option<String>,
}

/// A single configurable flag or value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarInput {
    #[serde(rename = "type")]
    pub ty: CwlType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub bounds: Option<(f64, f64)>,
    #[serde(default)]
    pub options: Option<Vec<serde_json::Value>>,
}

/// A group of mutually exclusive settings, exactly one of which may be active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInput {
    #[serde(default)]
    pub label: Option<String>,
    pub variants: IndexMap<String, ScalarInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionalInput {
    Record(RecordInput),
    Scalar(ScalarInput),
}

/// One or more file patterns an output is collected from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Glob {
    One(String),
    Many(Vec<String>),
}

impl Glob {
    pub fn patterns(&self) -> &[String] {
        match self {
            Glob::One(pattern) => std::slice::from_ref(pattern),
            Glob::Many(patterns) => patterns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDeclaration {
    #[serde(rename = "type")]
    pub ty: CwlType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub glob: Option<Glob>,
    /// Optional input that must be truthy for this output to be produced.
    #[serde(default)]
    pub requires: Option<String>,
}

impl OutputDeclaration {
    /// Substitutes `$(inputs.NAME)` references in the glob patterns.
    ///
    /// References `lookup` cannot resolve are left untouched.
    pub fn resolved_globs<F>(&self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(glob) = &self.glob else {
            return Vec::new();
        };
        glob.patterns()
            .iter()
            .map(|pattern| substitute_inputs(pattern, &lookup))
            .collect()
    }
}

const INPUT_REFERENCE: &str = "$(inputs.";

fn substitute_inputs<F>(pattern: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find(INPUT_REFERENCE) {
        let after = &rest[start + INPUT_REFERENCE.len()..];
        let Some(end) = after.find(')') else {
            break;
        };
        let name = &after[..end];
        resolved.push_str(&rest[..start]);
        match lookup(name) {
            Some(value) => resolved.push_str(&value),
            None => resolved.push_str(&rest[start..start + INPUT_REFERENCE.len() + end + 1]),
        }
        rest = &after[end + 1..];
    }
    resolved.push_str(rest);
    resolved
}

impl ToolSchema {
    /// The declared type of an input the tool accepts, required or optional.
    ///
    /// Record groups have no single type and yield `None`.
    pub fn input_type(&self, name: &str) -> Option<CwlType> {
        if let Some(required) = self.required_inputs.get(name) {
            return Some(required.ty);
        }
        match self.optional_inputs.get(name)? {
            OptionalInput::Scalar(scalar) => Some(scalar.ty),
            OptionalInput::Record(_) => None,
        }
    }

    /// The declared type of an output, defaulting to `File`.
    pub fn output_type(&self, name: &str) -> CwlType {
        self.outputs
            .get(name)
            .map(|output| output.ty)
            .unwrap_or(CwlType::FILE)
    }

    /// Checks the schema is internally consistent.
    pub fn validate(&self, label: &str) -> Result<(), RegistryError> {
        for output in &self.primary_outputs {
            if !self.outputs.is_empty() && !self.outputs.contains_key(output) {
                return Err(RegistryError::UndeclaredPrimaryOutput {
                    label: label.to_string(),
                    output: output.clone(),
                });
            }
        }
        for (name, output) in &self.outputs {
            if let Some(requires) = &output.requires {
                if !self.optional_inputs.contains_key(requires) {
                    return Err(RegistryError::UnknownRequirement {
                        label: label.to_string(),
                        output: name.clone(),
                        requires: requires.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_record_and_scalar_inputs() {
        let json = serde_json::json!({
            "mask": { "type": "boolean", "flag": "-m" },
            "frac": { "type": "double", "flag": "-f", "bounds": [0, 1] },
            "exclusive": {
                "type": "record",
                "variants": {
                    "robust": { "type": "boolean", "flag": "-R" },
                    "betsurfT2": { "type": "File", "flag": "-A2" }
                }
            }
        });
        let inputs: IndexMap<String, OptionalInput> = serde_json::from_value(json).unwrap();

        assert!(matches!(inputs["mask"], OptionalInput::Scalar(_)));
        match &inputs["frac"] {
            OptionalInput::Scalar(scalar) => assert_eq!(scalar.bounds, Some((0.0, 1.0))),
            other => panic!("expected scalar, got {:?}", other),
        }
        match &inputs["exclusive"] {
            OptionalInput::Record(record) => {
                let names: Vec<_> = record.variants.keys().cloned().collect();
                assert_eq!(names, vec!["robust", "betsurfT2"]);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn resolves_known_glob_references() {
        let output = OutputDeclaration {
            ty: CwlType::FILE,
            label: None,
            glob: Some(Glob::Many(vec![
                "$(inputs.output)_mask.nii.gz".to_string(),
                "$(inputs.prefix)_$(inputs.output).log".to_string(),
            ])),
            requires: None,
        };
        let resolved =
            output.resolved_globs(|name| (name == "output").then(|| "subj01".to_string()));
        assert_eq!(
            resolved,
            vec!["subj01_mask.nii.gz", "$(inputs.prefix)_subj01.log"]
        );
    }
}
