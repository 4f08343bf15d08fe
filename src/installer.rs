// src/installer.rs

//! jpackage invocation wrapper: turns a runtime image into an OS-specific
//! installer.

use crate::error::{Error, Result};
use crate::toolchain::{Tool, Toolchain};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::info;

/// Settings for one installer build
#[derive(Debug, Clone)]
pub struct InstallerOptions {
    /// Application name
    pub name: String,
    /// Main module of the application
    pub module: String,
    /// Fully qualified main class inside the module
    pub main_class: String,
    /// Runtime image the installer wraps
    pub runtime_image: PathBuf,
    /// Destination directory of the installer artifact
    pub dest: PathBuf,
    pub vendor: Option<String>,
    pub app_version: Option<String>,
    pub copyright: Option<String>,
    pub description: Option<String>,
    pub icon: Option<PathBuf>,
    pub license_file: Option<PathBuf>,
    /// Options passed to the bundled JVM at application launch
    pub java_options: Option<String>,
}

/// Package a runtime image into an installer
pub fn package(toolchain: &dyn Toolchain, options: &InstallerOptions) -> Result<()> {
    info!("packaging installer for {}", options.name);

    let mut args: Vec<OsString> = vec![
        "--name".into(),
        options.name.clone().into(),
        "--runtime-image".into(),
        options.runtime_image.clone().into(),
        "--module".into(),
        format!("{}/{}", options.module, options.main_class).into(),
        "--dest".into(),
        options.dest.clone().into(),
    ];

    let text_flags = [
        ("--vendor", &options.vendor),
        ("--app-version", &options.app_version),
        ("--copyright", &options.copyright),
        ("--description", &options.description),
        ("--java-options", &options.java_options),
    ];
    for (flag, value) in text_flags {
        if let Some(value) = value {
            args.push(flag.into());
            args.push(value.clone().into());
        }
    }
    if let Some(icon) = &options.icon {
        args.push("--icon".into());
        args.push(icon.clone().into());
    }
    if let Some(license) = &options.license_file {
        args.push("--license-file".into());
        args.push(license.clone().into());
    }

    let output = toolchain.run(Tool::Jpackage, &args)?;
    if !output.success() {
        return Err(Error::Tool {
            tool: Tool::Jpackage.name(),
            code: output.code,
            diagnostics: output.diagnostics(),
        });
    }
    Ok(())
}
