// src/link.rs

//! jlink invocation wrapper: assembles patched modules into an executable
//! runtime image.

use crate::error::{Error, Result};
use crate::toolchain::{ModulePath, Tool, Toolchain};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::info;

/// Settings for one runtime-image link
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Root module to resolve the image from
    pub module: String,
    /// Output directory of the runtime image
    pub output: PathBuf,
    /// Optional launcher spec (`name=module/mainclass`)
    pub launcher: Option<String>,
    /// Skip signature verification of signed jars
    pub ignore_signing_information: bool,
    /// Extra options passed through to jlink verbatim
    pub extra_options: Vec<String>,
}

/// Link a runtime image from the module path
pub fn link(toolchain: &dyn Toolchain, module_path: &ModulePath, options: &LinkOptions) -> Result<()> {
    info!("linking runtime image for module {}", options.module);

    let mut args: Vec<OsString> = vec![
        "--module-path".into(),
        module_path.to_arg(),
        "--add-modules".into(),
        options.module.clone().into(),
        "--output".into(),
        options.output.clone().into(),
    ];
    if let Some(launcher) = &options.launcher {
        args.push(format!("--launcher={launcher}").into());
    }
    if options.ignore_signing_information {
        args.push("--ignore-signing-information".into());
    }
    for option in &options.extra_options {
        args.push(option.clone().into());
    }

    let output = toolchain.run(Tool::Jlink, &args)?;
    if !output.success() {
        return Err(Error::Tool {
            tool: Tool::Jlink.name(),
            code: output.code,
            diagnostics: output.diagnostics(),
        });
    }
    Ok(())
}
