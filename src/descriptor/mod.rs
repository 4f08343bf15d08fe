// src/descriptor/mod.rs

//! Descriptor synthesis: generation of `module-info.java` sources by the
//! dependency-analysis tool, and their compilation against the module path
//! with the original archive overlaid via `--patch-module`.

pub mod compile;
pub mod generate;

pub use compile::DescriptorCompiler;
pub use generate::DescriptorGenerator;

use std::path::PathBuf;

/// One synthesized descriptor source, discovered from the generator's output
/// directory structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDescriptor {
    /// Name of the module the descriptor declares
    pub module_name: String,
    /// Version layer the descriptor targets; `None` for an unversioned jar
    pub version: Option<u32>,
    /// Path to the generated `module-info.java`
    pub source: PathBuf,
}

/// A compiled descriptor class, owned by the per-archive scratch directory
#[derive(Debug, Clone)]
pub struct CompiledDescriptor {
    /// Path to the compiled `module-info.class`
    pub class_file: PathBuf,
}
