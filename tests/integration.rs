//! Integration tests for cwlforge
//!
//! End-to-end tests from an editor document to rendered workflow text.
//!
mod common;
use common::*;
use cwlforge::prelude::*;
use cwlforge::workflow::{INLINE_JAVASCRIPT, STEP_INPUT_EXPRESSION};
use serde_json::Value;

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn compile_editor_document(json: &str) -> CompiledWorkflow {
        let graph = UiGraph::from_json_str(json)
            .expect("Failed to parse editor document")
            .into_graph()
            .expect("Failed to convert editor document");
        let registry = builtin_registry();
        Compiler::new(&registry)
            .compile(&graph)
            .expect("Failed to compile editor document")
    }

    #[test]
    fn test_brain_pipeline_from_editor_document() {
        let compiled = compile_editor_document(BRAIN_PIPELINE_UI_JSON);
        let doc = &compiled.document;

        assert_eq!(doc.steps.keys().collect::<Vec<_>>(), vec!["step_1", "step_2"]);

        let bet = &doc.steps["step_1"];
        assert_eq!(bet.run, "cwl/fsl/bet.cwl");
        assert_eq!(bet.inputs["input"], StepInput::source("input"));
        assert_eq!(bet.inputs["frac"], StepInput::constant(serde_json::json!(0.4)));
        assert_eq!(
            bet.inputs["exclusive"],
            StepInput::constant(serde_json::json!({ "robust": true }))
        );

        let fast = &doc.steps["step_2"];
        assert_eq!(fast.run, "cwl/fsl/fast.cwl");
        assert_eq!(
            fast.inputs["input"],
            StepInput::source("step_1/brain_extraction")
        );
        assert_eq!(fast.inputs["nclass"], StepInput::constant(serde_json::json!(3)));
        assert_eq!(fast.inputs["image_type"], StepInput::source("step_2_image_type"));

        assert_eq!(
            doc.inputs.keys().collect::<Vec<_>>(),
            vec!["input", "step_1_output", "step_2_output", "step_2_image_type"]
        );

        // Only the segmentation step is terminal.
        assert_eq!(doc.outputs.keys().collect::<Vec<_>>(), vec!["segmented_files"]);
        assert_eq!(
            doc.outputs["segmented_files"].output_source,
            "step_2/segmented_files"
        );

        let paths: Vec<_> = compiled.tools.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, vec!["cwl/fsl/bet.cwl", "cwl/fsl/fast.cwl"]);
        assert!(!doc.requirements.contains(STEP_INPUT_EXPRESSION));
        assert!(!doc.requirements.contains(INLINE_JAVASCRIPT));
    }

    #[test]
    fn test_rendered_yaml_is_a_cwl_workflow() {
        let compiled = compile_editor_document(BRAIN_PIPELINE_UI_JSON);
        let yaml = compiled
            .render(OutputFormat::Yaml)
            .expect("Failed to render YAML");

        assert!(yaml.starts_with("#!/usr/bin/env cwl-runner\n\n"));
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(&yaml).expect("Rendered YAML should parse");
        assert_eq!(parsed["cwlVersion"].as_str(), Some("v1.2"));
        assert_eq!(parsed["class"].as_str(), Some("Workflow"));
        assert_eq!(
            parsed["steps"]["step_2"]["in"]["input"].as_str(),
            Some("step_1/brain_extraction")
        );
        assert_eq!(
            parsed["outputs"]["segmented_files"]["type"]["type"].as_str(),
            Some("array")
        );

        // Section order is fixed by the document model.
        let position = |key: &str| yaml.find(key).expect("section present");
        assert!(position("cwlVersion:") < position("inputs:"));
        assert!(position("inputs:") < position("outputs:"));
        assert!(position("outputs:") < position("steps:"));
    }

    #[test]
    fn test_rendered_json_matches_document() {
        let compiled = compile_editor_document(BRAIN_PIPELINE_UI_JSON);
        let json = compiled
            .render(OutputFormat::Json)
            .expect("Failed to render JSON");
        let parsed: Value = serde_json::from_str(&json).expect("Rendered JSON should parse");

        assert_eq!(parsed["class"], "Workflow");
        assert_eq!(parsed["inputs"]["input"]["type"], "File");
        assert_eq!(parsed["steps"]["step_1"]["in"]["frac"]["default"], 0.4);
        assert_eq!(
            parsed["steps"]["step_2"]["out"],
            serde_json::json!(["segmented_files"])
        );
    }

    #[test]
    fn test_exposed_variant_through_editor_document() {
        let json = r#"{
            "nodes": [
                {
                    "id": "0",
                    "data": {
                        "label": "Brain Extraction",
                        "parameters": { "exclusive": { "betsurfT2": { "expose": true } } }
                    }
                }
            ],
            "edges": []
        }"#;
        let compiled = compile_editor_document(json);
        let doc = &compiled.document;

        assert_eq!(doc.inputs["exclusive_betsurfT2"].ty, CwlType::FILE);
        assert!(doc.requirements.contains(STEP_INPUT_EXPRESSION));
        assert!(doc.requirements.contains(INLINE_JAVASCRIPT));

        let yaml = compiled.render(OutputFormat::Yaml).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed["steps"]["step_0"]["in"]["exclusive"]["valueFrom"].as_str(),
            Some("$({\"betsurfT2\": self})")
        );
        assert!(parsed["requirements"]["StepInputExpressionRequirement"].is_mapping());
        assert!(parsed["requirements"]["InlineJavascriptRequirement"].is_mapping());
    }

    #[test]
    fn test_editor_document_errors_name_the_node() {
        let json = r#"{
            "nodes": [
                { "id": "0", "data": { "label": "Brain Extraction", "parameters": { "frac": 1.5 } } }
            ]
        }"#;
        let graph = UiGraph::from_json_str(json).unwrap().into_graph().unwrap();
        let registry = builtin_registry();
        let err = Compiler::new(&registry).compile(&graph).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("'frac'"));
        assert!(message.contains("node '0'"));
    }

    #[test]
    fn test_malformed_editor_document_is_rejected() {
        assert!(matches!(
            UiGraph::from_json_str("{ \"nodes\": 5 }"),
            Err(GraphConversionError::Parse(_))
        ));
    }

    #[test]
    fn test_compiler_is_shareable_across_threads() {
        let registry = builtin_registry();
        let compiler = Compiler::new(&registry);
        let graph = UiGraph::from_json_str(BRAIN_PIPELINE_UI_JSON)
            .unwrap()
            .into_graph()
            .unwrap();

        let rendered: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        compiler
                            .compile_to_string(&graph, OutputFormat::Yaml)
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(rendered.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
