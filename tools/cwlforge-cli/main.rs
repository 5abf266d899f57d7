use clap::{Args, Parser, Subcommand, ValueEnum};
use cwlforge::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Define CLI-specific enums for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatCli {
    Yaml,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FanInCli {
    First,
    Reject,
}

/// Compile pipeline editor graphs into CWL workflows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile an editor graph into a workflow document
    Compile {
        #[command(flatten)]
        compile: CompileArgs,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the expected output files after compiling
        #[arg(long)]
        show_outputs: bool,
    },
    /// Compile and zip the workflow together with the tool definitions it runs
    Bundle {
        #[command(flatten)]
        compile: CompileArgs,

        /// Directory the registry's tool paths are relative to
        #[arg(long)]
        tools_dir: PathBuf,

        /// Path of the zip archive to write
        #[arg(short, long)]
        output: PathBuf,
    },
    /// List the tools in the registry
    Tools {
        /// Tool registry JSON file (defaults to the built-in catalog)
        #[arg(long)]
        registry: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct CompileArgs {
    /// Path to the editor graph JSON file
    graph_path: PathBuf,

    /// Tool registry JSON file (defaults to the built-in catalog)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Output format of the workflow document
    #[arg(short, long, value_enum, default_value = "yaml")]
    format: FormatCli,

    /// How to treat several edges into one passthrough input
    #[arg(long, value_enum, default_value = "first")]
    fan_in: FanInCli,

    /// Only expose outputs whose required option is set
    #[arg(long)]
    enforce_requires: bool,

    /// Also expose non-primary outputs of terminal steps
    #[arg(long)]
    secondary_outputs: bool,
}

impl CompileArgs {
    fn output_format(&self) -> OutputFormat {
        match self.format {
            FormatCli::Yaml => OutputFormat::Yaml,
            FormatCli::Json => OutputFormat::Json,
        }
    }

    fn options(&self) -> CompileOptions {
        CompileOptions {
            fan_in: match self.fan_in {
                FanInCli::First => FanInPolicy::First,
                FanInCli::Reject => FanInPolicy::Reject,
            },
            enforce_output_requirements: self.enforce_requires,
            expose_secondary_outputs: self.secondary_outputs,
            ..CompileOptions::default()
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compile {
            compile,
            output,
            show_outputs,
        } => run_compile(compile, output, show_outputs),
        Command::Bundle {
            compile,
            tools_dir,
            output,
        } => run_bundle(compile, tools_dir, output),
        Command::Tools { registry } => run_tools(registry),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(path: Option<&PathBuf>) -> ToolRegistry {
    let result = match path {
        Some(path) => ToolRegistry::from_file(path),
        None => ToolRegistry::builtin(),
    };
    result.unwrap_or_else(|e| exit_with_error(&e.to_string()))
}

/// Loads, converts and compiles the graph named on the command line.
fn compile_graph(args: &CompileArgs, registry: &ToolRegistry) -> CompiledWorkflow {
    let graph_json = fs::read_to_string(&args.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read graph file '{}': {}",
            args.graph_path.display(),
            e
        ))
    });
    let graph = UiGraph::from_json_str(&graph_json)
        .and_then(IntoGraph::into_graph)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    let compile_start = Instant::now();
    let compiler = Compiler::builder(registry).options(args.options()).build();
    let compiled = compiler
        .compile(&graph)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    tracing::debug!(
        elapsed = ?compile_start.elapsed(),
        steps = compiled.document.steps.len(),
        "Compiled graph"
    );
    compiled
}

fn run_compile(args: CompileArgs, output: Option<PathBuf>, show_outputs: bool) {
    let registry = load_registry(args.registry.as_ref());
    let compiled = compile_graph(&args, &registry);
    let text = compiled
        .render(args.output_format())
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    match output {
        Some(path) => {
            fs::write(&path, &text).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
            });
            eprintln!("Workflow written to {}", path.display());
        }
        None => print!("{}", text),
    }

    if show_outputs {
        eprintln!("\n--- Expected Outputs ---");
        for artifact in &compiled.artifacts {
            eprintln!("{} (from {})", artifact.output, artifact.step_id);
            for pattern in &artifact.patterns {
                eprintln!("    {}", pattern);
            }
        }
    }
}

fn run_bundle(args: CompileArgs, tools_dir: PathBuf, output: PathBuf) {
    let registry = load_registry(args.registry.as_ref());
    let compiled = compile_graph(&args, &registry);
    let source = DirectorySource::new(tools_dir);

    let archive = Bundle::package(&compiled, args.output_format(), &source)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));
    fs::write(&output, archive).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to write '{}': {}", output.display(), e))
    });

    eprintln!(
        "Bundle with {} tool definition(s) written to {}",
        compiled.tools.len(),
        output.display()
    );
}

fn run_tools(registry_path: Option<PathBuf>) {
    let registry = load_registry(registry_path.as_ref());
    for label in registry.labels() {
        if let Some(tool) = registry.lookup(label) {
            println!("{:<24} {:<8} {}", label, tool.id, tool.cwl_path);
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
