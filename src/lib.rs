//! # cwlforge - Pipeline Graph to CWL Workflow Compiler
//!
//! **cwlforge** turns the node graphs users draw in a neuroimaging pipeline
//! editor into portable [Common Workflow Language](https://www.commonwl.org/)
//! workflows. Each node names a tool from a declarative registry; edges say
//! which step consumes which. The compiler orders the steps, wires inputs to
//! upstream outputs, decides which parameters become workflow inputs and which
//! are baked in, and renders a deterministic CWL document.
//!
//! ## Core Workflow
//!
//! 1.  **Load a Registry**: `ToolRegistry::builtin()` or `ToolRegistry::from_file(...)`.
//!     The registry is an ordinary value; share it by reference.
//! 2.  **Build a Graph**: Convert the editor document (`ui::UiGraph`) or your own
//!     format with the `IntoGraph` trait.
//! 3.  **Compile**: `Compiler::builder(&registry).build().compile(&graph)` returns a
//!     `CompiledWorkflow` or a `CompileError` naming the offending node.
//! 4.  **Render or Bundle**: Render the document as YAML or JSON, or zip it with the
//!     referenced tool definitions using `bundle::Bundle`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cwlforge::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let registry = ToolRegistry::builtin()?;
//!
//!     let graph = Graph::new(
//!         vec![
//!             Node::new("0", "Brain Extraction")
//!                 .with_parameter("mask", json!(true))
//!                 .with_parameter("frac", json!({ "expose": true })),
//!             Node::new("1", "Segmentation").with_parameter("nclass", json!(3)),
//!         ],
//!         vec![Edge::new("0", "1")],
//!     );
//!
//!     let compiler = Compiler::builder(&registry)
//!         .fan_in(FanInPolicy::Reject)
//!         .build();
//!     let compiled = compiler.compile(&graph)?;
//!
//!     println!("{}", compiled.render(OutputFormat::Yaml)?);
//!     for tool in &compiled.tools {
//!         println!("uses {}", tool.path);
//!     }
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod registry;
pub mod ui;
pub mod workflow;

#[cfg(feature = "bundle")]
pub mod bundle;
