//! Packages a compiled workflow and the tool definitions it runs into one zip archive.
//!
//! Tool files are fetched concurrently. If any fetch fails the whole bundle is
//! abandoned and the error names the file; no partial archive is produced.

use crate::compiler::CompiledWorkflow;
use crate::error::BundleError;
use crate::workflow::OutputFormat;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Component, Path, PathBuf};
use std::thread;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const TRACING_TARGET: &str = "cwlforge::bundle";

/// Where tool definition files are fetched from.
pub trait ToolSource: Sync {
    fn fetch(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads tool definitions relative to a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ToolSource for DirectorySource {
    fn fetch(&self, path: &str) -> io::Result<Vec<u8>> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "tool path must stay inside the tools directory",
            ));
        }
        fs::read(self.root.join(relative))
    }
}

pub struct Bundle;

impl Bundle {
    /// Name of the workflow document inside the archive, for a given format.
    pub fn workflow_entry(format: OutputFormat) -> String {
        format!("workflow.{}", format.extension())
    }

    /// Renders the workflow and zips it together with every distinct tool file it references.
    pub fn package<S: ToolSource>(
        compiled: &CompiledWorkflow,
        format: OutputFormat,
        source: &S,
    ) -> Result<Vec<u8>, BundleError> {
        let workflow = compiled.render(format)?;
        let paths: Vec<&str> = compiled.tools.iter().map(|tool| tool.path.as_str()).collect();

        let fetched: Vec<io::Result<Vec<u8>>> = thread::scope(|scope| {
            let handles: Vec<_> = paths
                .iter()
                .map(|path| scope.spawn(move || source.fetch(path)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(io::Error::other("tool fetch panicked"))
                    })
                })
                .collect()
        });

        let mut files = Vec::with_capacity(paths.len());
        for (path, result) in paths.iter().zip(fetched) {
            let bytes = result.map_err(|source| {
                tracing::warn!(target: TRACING_TARGET, path = %path, error = %source, "Tool fetch failed");
                BundleError::Fetch {
                    path: path.to_string(),
                    source,
                }
            })?;
            files.push((*path, bytes));
        }

        let archive = |e: zip::result::ZipError| BundleError::Archive(e.to_string());
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = || SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        writer
            .start_file(Self::workflow_entry(format), options())
            .map_err(archive)?;
        writer
            .write_all(workflow.as_bytes())
            .map_err(|e| BundleError::Archive(e.to_string()))?;
        for (path, bytes) in &files {
            writer.start_file(*path, options()).map_err(archive)?;
            writer
                .write_all(bytes)
                .map_err(|e| BundleError::Archive(e.to_string()))?;
        }

        let cursor = writer.finish().map_err(archive)?;
        tracing::debug!(
            target: TRACING_TARGET,
            tools = files.len(),
            "Packaged workflow bundle"
        );
        Ok(cursor.into_inner())
    }
}
