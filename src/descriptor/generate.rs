// src/descriptor/generate.rs

//! Descriptor source generation via the dependency-analysis tool.
//!
//! jdeps writes one subdirectory per discovered module into the scratch
//! sources directory, containing either `module-info.java` directly or a
//! `versions/<N>/module-info.java` subtree for multi-release jars. The module
//! name and layer are recovered from that directory structure; the tool's
//! console output is never parsed, as directory names are a stable contract
//! and output phrasing is not.

use super::GeneratedDescriptor;
use crate::archive::TargetVersion;
use crate::error::{Error, Result};
use crate::toolchain::{ModulePath, Tool, Toolchain};
use std::ffi::OsString;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Name of the descriptor source file jdeps generates
const DESCRIPTOR_SOURCE: &str = "module-info.java";

/// Synthesizes descriptor sources for one archive
pub struct DescriptorGenerator<'a> {
    toolchain: &'a dyn Toolchain,
}

impl<'a> DescriptorGenerator<'a> {
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        Self { toolchain }
    }

    /// Run the analysis tool against `archive` and report the descriptors it
    /// generated under `sources_dir`, in ascending version-layer order.
    ///
    /// Zero descriptors is a valid result, not an error. The scratch sources
    /// directory is cleared first so stale descriptors from an earlier run
    /// cannot be picked up; on tool failure, partial output is left in place
    /// for diagnostics but nothing is reported to later stages.
    pub fn generate(
        &self,
        archive: &Path,
        module_path: &ModulePath,
        target: TargetVersion,
        multi_release: bool,
        ignore_missing_deps: bool,
        sources_dir: &Path,
    ) -> Result<Vec<GeneratedDescriptor>> {
        if sources_dir.exists() {
            std::fs::remove_dir_all(sources_dir)?;
        }
        std::fs::create_dir_all(sources_dir)?;

        let mut args: Vec<OsString> = Vec::new();
        if ignore_missing_deps {
            args.push("--ignore-missing-deps".into());
        }
        if multi_release {
            // Only layered archives accept the flag
            args.push("--multi-release".into());
            args.push(target.to_string().into());
        }
        args.push("--module-path".into());
        args.push(module_path.to_arg());
        args.push("--generate-module-info".into());
        args.push(sources_dir.into());
        args.push(archive.into());

        let output = self.toolchain.run(Tool::Jdeps, &args)?;
        if !output.success() {
            return Err(Error::GenerationTool {
                archive: archive.display().to_string(),
                code: output.code,
                diagnostics: output.diagnostics(),
            });
        }

        discover_descriptors(sources_dir)
    }
}

/// Recover generated descriptors from the output directory structure.
///
/// Expected layouts below `sources_dir`:
/// `<module>/module-info.java` and `<module>/versions/<N>/module-info.java`.
/// Anything else is ignored with a warning.
pub fn discover_descriptors(sources_dir: &Path) -> Result<Vec<GeneratedDescriptor>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(sources_dir).min_depth(2).max_depth(4) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() || entry.file_name() != DESCRIPTOR_SOURCE {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(sources_dir)
            .expect("walked path is under its root");
        let components: Vec<&str> = relative
            .iter()
            .filter_map(|c| c.to_str())
            .collect();

        match components.as_slice() {
            [module, DESCRIPTOR_SOURCE] => {
                found.push(GeneratedDescriptor {
                    module_name: (*module).to_string(),
                    version: None,
                    source: entry.path().to_path_buf(),
                });
            }
            [module, "versions", layer, DESCRIPTOR_SOURCE] => match layer.parse::<u32>() {
                Ok(version) => found.push(GeneratedDescriptor {
                    module_name: (*module).to_string(),
                    version: Some(version),
                    source: entry.path().to_path_buf(),
                }),
                Err(_) => warn!(
                    "ignoring descriptor under non-numeric version layer: {}",
                    entry.path().display()
                ),
            },
            _ => warn!(
                "ignoring descriptor at unexpected depth: {}",
                entry.path().display()
            ),
        }
    }

    // Lower layers are compiled and patched before higher ones
    found.sort_by(|a, b| {
        (a.version.unwrap_or(0), &a.module_name).cmp(&(b.version.unwrap_or(0), &b.module_name))
    });
    debug!(
        "discovered {} generated descriptor(s) under {}",
        found.len(),
        sources_dir.display()
    );
    Ok(found)
}
