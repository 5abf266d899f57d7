//! Common test utilities: synthetic registries and graphs.
use cwlforge::prelude::*;
use serde_json::json;

/// A small registry whose tools cover every input and output shape the compiler handles.
///
/// - `Smooth`: one passthrough image, tunable scalars, a `requires`-gated report output.
/// - `Threshold`: passthrough image plus a promoted `output` name and a variant group.
/// - `Inspect`: passthrough image, no primary outputs (a dead end for wiring).
/// - `Typed`: passthrough image and an `int` option named `c`.
#[allow(dead_code)]
pub const SYNTHETIC_REGISTRY_JSON: &str = r#"{
    "Smooth": {
        "id": "smooth",
        "cwlPath": "tools/smooth.cwl",
        "primaryOutputs": ["smoothed"],
        "requiredInputs": {
            "input": { "type": "File", "passthrough": true, "label": "Image to smooth" }
        },
        "optionalInputs": {
            "prefix": { "type": "string", "label": "Output prefix" },
            "sigma": { "type": "double", "label": "Kernel width", "bounds": [0, 10] },
            "mode": { "type": "int", "options": [1, 2, 3] },
            "report": { "type": "boolean", "label": "Write a report" }
        },
        "outputs": {
            "smoothed": { "type": "File", "glob": "$(inputs.prefix)_smooth.nii.gz" },
            "report_file": { "type": "File?", "glob": ["report.txt"], "requires": "report" }
        }
    },
    "Threshold": {
        "id": "threshold",
        "cwlPath": "tools/threshold.cwl",
        "primaryOutputs": ["mask", "stats"],
        "requiredInputs": {
            "input": { "type": "File", "passthrough": true },
            "output": { "type": "string", "label": "Output name" }
        },
        "optionalInputs": {
            "strategy": {
                "type": "record",
                "label": "Thresholding strategy",
                "variants": {
                    "fixed": { "type": "double", "bounds": [0, 1] },
                    "otsu": { "type": "boolean" },
                    "reference": { "type": "File" }
                }
            },
            "keep_stats": { "type": "boolean" }
        },
        "outputs": {
            "mask": { "type": "File", "glob": "$(inputs.output)_mask.nii.gz" },
            "stats": { "type": "File?", "glob": "$(inputs.output).csv", "requires": "keep_stats" }
        }
    },
    "Inspect": {
        "id": "inspect",
        "cwlPath": "tools/inspect.cwl",
        "primaryOutputs": [],
        "requiredInputs": {
            "input": { "type": "File", "passthrough": true }
        }
    },
    "Typed": {
        "id": "typed",
        "cwlPath": "tools/typed.cwl",
        "primaryOutputs": ["result"],
        "requiredInputs": {
            "input": { "type": "File", "passthrough": true }
        },
        "optionalInputs": {
            "c": { "type": "int" }
        },
        "outputs": {
            "result": { "type": "File[]" }
        }
    }
}"#;

#[allow(dead_code)]
pub fn synthetic_registry() -> ToolRegistry {
    ToolRegistry::from_json_str(SYNTHETIC_REGISTRY_JSON).expect("synthetic registry is valid")
}

#[allow(dead_code)]
pub fn builtin_registry() -> ToolRegistry {
    ToolRegistry::builtin().expect("builtin registry is valid")
}

/// `A (Smooth) -> B (Threshold)`.
#[allow(dead_code)]
pub fn create_chain_graph() -> Graph {
    Graph::new(
        vec![
            Node::new("A", "Smooth").with_parameter("prefix", json!("subj01")),
            Node::new("B", "Threshold").with_parameter("strategy", json!({ "otsu": true })),
        ],
        vec![Edge::new("A", "B")],
    )
}

/// Two sources joined into one threshold step.
///
/// `left` and `right` both feed `join`, so the passthrough input of `join` has
/// two incoming edges.
#[allow(dead_code)]
pub fn create_fan_in_graph() -> Graph {
    Graph::new(
        vec![
            Node::new("left", "Smooth"),
            Node::new("right", "Smooth"),
            Node::new("join", "Threshold"),
        ],
        vec![Edge::new("left", "join"), Edge::new("right", "join")],
    )
}

/// An editor document for `Brain Extraction -> Segmentation`, as the canvas saves it.
#[allow(dead_code)]
pub const BRAIN_PIPELINE_UI_JSON: &str = r#"{
    "nodes": [
        {
            "id": "1",
            "type": "default",
            "position": { "x": 120, "y": 40 },
            "data": {
                "label": "Brain Extraction",
                "parameters": { "frac": 0.4, "mask": true, "exclusive": { "robust": true, "eye": false } }
            }
        },
        {
            "id": "2",
            "type": "default",
            "position": { "x": 120, "y": 200 },
            "data": {
                "label": "Segmentation",
                "parameters": "{\"nclass\": 3, \"image_type\": {\"expose\": true}}"
            }
        }
    ],
    "edges": [
        { "id": "e1-2", "source": "1", "target": "2" }
    ]
}"#;
