// src/error.rs

//! Error taxonomy for the patching pipeline.
//!
//! Configuration errors abort a whole batch before any archive is touched;
//! every other kind is scoped to the single archive that produced it and ends
//! up inside that archive's `Failed` outcome.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the patching pipeline and the tool wrappers
#[derive(Error, Debug)]
pub enum Error {
    /// Archive missing, corrupt, or unreadable
    #[error("cannot read archive '{}': {reason}", path.display())]
    ArchiveRead { path: PathBuf, reason: String },

    /// Archive not writable, or the staged rewrite did not complete
    #[error("cannot update archive '{}': {reason}", path.display())]
    ArchiveWrite { path: PathBuf, reason: String },

    /// Dependency-analysis tool exited nonzero
    #[error("jdeps failed for '{archive}' (exit code {code}):\n{diagnostics}")]
    GenerationTool {
        archive: String,
        code: i32,
        diagnostics: String,
    },

    /// Descriptor compilation exited nonzero
    #[error("javac failed for '{source_file}' (exit code {code}):\n{diagnostics}")]
    Compile {
        source_file: String,
        code: i32,
        diagnostics: String,
    },

    /// Any other external tool (jlink, jpackage) exited nonzero
    #[error("{tool} failed (exit code {code}):\n{diagnostics}")]
    Tool {
        tool: &'static str,
        code: i32,
        diagnostics: String,
    },

    /// External tool did not finish within the configured timeout
    #[error("{tool} timed out after {secs}s")]
    ToolTimeout { tool: &'static str, secs: u64 },

    /// Module-path directory missing or not a directory, JDK not found, etc.
    /// Fatal to the whole batch, checked once up front.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operator-initiated stop; archives not yet started carry this
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
