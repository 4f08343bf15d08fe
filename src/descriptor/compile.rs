// src/descriptor/compile.rs

//! Descriptor compilation.
//!
//! The original archive's classes are overlaid onto the declared module with
//! `--patch-module` so the descriptor's self-references resolve; the archive
//! itself is only ever read. Warnings that are expected in synthesized
//! descriptors (unused exports, requires on automatic modules) are
//! suppressed.

use super::{CompiledDescriptor, GeneratedDescriptor};
use crate::error::{Error, Result};
use crate::toolchain::{ModulePath, Tool, Toolchain};
use std::ffi::OsString;
use std::path::Path;

/// Relative path of the compiled descriptor inside the output directory
const DESCRIPTOR_CLASS: &str = "module-info.class";

/// Lint suppressions for warnings that are harmless in synthesized descriptors
const LINT_FLAGS: &str = "-Xlint:-exports,-requires-automatic,-requires-transitive-automatic";

/// Compiles one generated descriptor source
pub struct DescriptorCompiler<'a> {
    toolchain: &'a dyn Toolchain,
}

impl<'a> DescriptorCompiler<'a> {
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        Self { toolchain }
    }

    /// Compile `descriptor` against the module path, with `archive` patched
    /// onto the descriptor's own module. On success the compiled class sits
    /// at `<classes_dir>/module-info.class`.
    pub fn compile(
        &self,
        descriptor: &GeneratedDescriptor,
        archive: &Path,
        module_path: &ModulePath,
        classes_dir: &Path,
    ) -> Result<CompiledDescriptor> {
        std::fs::create_dir_all(classes_dir)?;

        let mut patch_arg = OsString::from(&descriptor.module_name);
        patch_arg.push("=");
        patch_arg.push(archive);

        let args: Vec<OsString> = vec![
            "--module-path".into(),
            module_path.to_arg(),
            "--patch-module".into(),
            patch_arg,
            LINT_FLAGS.into(),
            "-d".into(),
            classes_dir.into(),
            descriptor.source.clone().into(),
        ];

        let output = self.toolchain.run(Tool::Javac, &args)?;
        if !output.success() {
            return Err(Error::Compile {
                source_file: descriptor.source.display().to_string(),
                code: output.code,
                diagnostics: output.diagnostics(),
            });
        }

        let class_file = classes_dir.join(DESCRIPTOR_CLASS);
        if !class_file.is_file() {
            return Err(Error::Compile {
                source_file: descriptor.source.display().to_string(),
                code: output.code,
                diagnostics: format!(
                    "compiler reported success but produced no {}",
                    class_file.display()
                ),
            });
        }

        Ok(CompiledDescriptor { class_file })
    }
}
