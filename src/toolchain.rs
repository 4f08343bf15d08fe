// src/toolchain.rs

//! External JDK tool invocation.
//!
//! The pipeline drives four JDK tools (jdeps, javac, jlink, jpackage). Each is
//! modelled as a stateless capability behind the [`Toolchain`] trait so tests
//! can substitute fakes; the real implementation shells out to the binaries of
//! a discovered JDK installation with piped output, nulled stdin, and a hard
//! timeout with kill-on-expiry.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Default timeout for a single external tool invocation
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Path-list separator for module-path arguments
const PATH_LIST_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// The JDK tools the pipeline invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Jdeps,
    Javac,
    Jlink,
    Jpackage,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jdeps => "jdeps",
            Self::Javac => "javac",
            Self::Jlink => "jlink",
            Self::Jpackage => "jpackage",
        }
    }

    fn file_name(&self) -> String {
        if cfg!(windows) {
            format!("{}.exe", self.name())
        } else {
            self.name().to_string()
        }
    }
}

/// Captured result of one tool invocation
#[derive(Debug)]
pub struct ToolOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Diagnostic text for error reporting: stderr, falling back to stdout
    pub fn diagnostics(&self) -> String {
        if self.stderr.trim().is_empty() {
            self.stdout.clone()
        } else {
            self.stderr.clone()
        }
    }
}

/// Invocable external tool capability.
///
/// Implementations must be safe to call concurrently from the batch worker
/// pool; a nonzero exit is reported through [`ToolOutput::code`], not as an
/// `Err` (spawn failures and timeouts are errors).
pub trait Toolchain: Send + Sync {
    fn run(&self, tool: Tool, args: &[OsString]) -> Result<ToolOutput>;
}

/// An installed JDK, located once per run
#[derive(Debug, Clone)]
pub struct Jdk {
    home: PathBuf,
}

impl Jdk {
    /// Locate a JDK: `$JAVA_HOME` if set, otherwise the installation that
    /// owns the `java` launcher on `PATH`.
    pub fn discover() -> Result<Self> {
        if let Some(home) = std::env::var_os("JAVA_HOME") {
            let home = PathBuf::from(home);
            if !home.is_dir() {
                return Err(Error::Config(format!(
                    "JAVA_HOME is not a directory: {}",
                    home.display()
                )));
            }
            return Ok(Self { home });
        }

        let launcher = which::which("java")
            .map_err(|_| Error::Config("no JAVA_HOME set and no 'java' on PATH".to_string()))?;
        let launcher = launcher.canonicalize()?;
        let home = launcher
            .parent()
            .and_then(|bin| bin.parent())
            .ok_or_else(|| {
                Error::Config(format!(
                    "cannot derive JDK home from launcher path {}",
                    launcher.display()
                ))
            })?;
        Ok(Self {
            home: home.to_path_buf(),
        })
    }

    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Directory holding the platform's built-in modules
    pub fn jmods(&self) -> PathBuf {
        self.home.join("jmods")
    }

    pub fn tool_path(&self, tool: Tool) -> PathBuf {
        self.home.join("bin").join(tool.file_name())
    }

    /// Major version of this JDK, from the `JAVA_VERSION` line of its
    /// `release` file (e.g. `JAVA_VERSION="17.0.2"` yields 17).
    pub fn release_major(&self) -> Result<u32> {
        let release = self.home.join("release");
        let text = std::fs::read_to_string(&release).map_err(|e| {
            Error::Config(format!(
                "cannot read JDK release file {}: {}",
                release.display(),
                e
            ))
        })?;
        parse_release_major(&text).ok_or_else(|| {
            Error::Config(format!(
                "no JAVA_VERSION entry in JDK release file {}",
                release.display()
            ))
        })
    }
}

/// Extract the major version from JDK `release` file contents
fn parse_release_major(text: &str) -> Option<u32> {
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("JAVA_VERSION=") {
            let version = rest.trim().trim_matches('"');
            let major = version.split('.').next()?;
            return major.parse().ok();
        }
    }
    None
}

/// Ordered set of directories visible to the analysis and compile tools.
///
/// Always non-empty: the batch's own module directory is the final entry, so
/// the archive currently being processed is on the path its neighbors resolve
/// against.
#[derive(Debug, Clone)]
pub struct ModulePath {
    entries: Vec<PathBuf>,
}

impl ModulePath {
    /// Module path for a batch run: the platform's built-in modules (when a
    /// JDK is in play) followed by the directory of archives being patched.
    pub fn for_batch(platform_modules: Option<PathBuf>, modules_dir: &Path) -> Self {
        let mut entries = Vec::new();
        if let Some(jmods) = platform_modules {
            if jmods.is_dir() {
                entries.push(jmods);
            } else {
                warn!("platform modules directory not found: {}", jmods.display());
            }
        }
        entries.push(modules_dir.to_path_buf());
        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Joined argument form, using the platform path-list separator
    pub fn to_arg(&self) -> OsString {
        let mut arg = OsString::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                arg.push(PATH_LIST_SEPARATOR);
            }
            arg.push(entry);
        }
        arg
    }
}

/// Real toolchain backed by a JDK installation
pub struct JdkToolchain {
    jdk: Jdk,
    timeout: Duration,
}

impl JdkToolchain {
    pub fn new(jdk: Jdk) -> Self {
        Self {
            jdk,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Toolchain for JdkToolchain {
    fn run(&self, tool: Tool, args: &[OsString]) -> Result<ToolOutput> {
        let program = self.jdk.tool_path(tool);
        debug!("invoking {} {:?}", program.display(), args);

        let mut child = Command::new(&program)
            .args(args)
            .stdin(Stdio::null()) // prevent stdin hangs
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::Config(format!(
                    "failed to spawn {} ({}): {}",
                    tool.name(),
                    program.display(),
                    e
                ))
            })?;

        match child.wait_timeout(self.timeout)? {
            Some(status) => {
                let output = child.wait_with_output()?;
                Ok(ToolOutput {
                    code: status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            None => {
                let _ = child.kill();
                Err(Error::ToolTimeout {
                    tool: tool.name(),
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_major() {
        let text = "IMPLEMENTOR=\"Eclipse Adoptium\"\nJAVA_VERSION=\"17.0.2\"\nOS_ARCH=\"x86_64\"\n";
        assert_eq!(parse_release_major(text), Some(17));
    }

    #[test]
    fn test_parse_release_major_single_component() {
        assert_eq!(parse_release_major("JAVA_VERSION=\"21\"\n"), Some(21));
    }

    #[test]
    fn test_parse_release_major_missing() {
        assert_eq!(parse_release_major("IMPLEMENTOR=\"x\"\n"), None);
    }

    #[test]
    fn test_module_path_arg_joins_entries() {
        let temp = tempfile::tempdir().unwrap();
        let jmods = temp.path().join("jmods");
        std::fs::create_dir(&jmods).unwrap();
        let modules = temp.path().join("modules");

        let path = ModulePath::for_batch(Some(jmods.clone()), &modules);
        assert_eq!(path.entries().len(), 2);

        let arg = path.to_arg().into_string().unwrap();
        let expected = format!(
            "{}{}{}",
            jmods.display(),
            PATH_LIST_SEPARATOR,
            modules.display()
        );
        assert_eq!(arg, expected);
    }

    #[test]
    fn test_module_path_skips_missing_platform_dir() {
        let temp = tempfile::tempdir().unwrap();
        let modules = temp.path().join("modules");
        let path = ModulePath::for_batch(Some(temp.path().join("no-jmods")), &modules);
        assert_eq!(path.entries(), &[modules]);
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(Tool::Jdeps.name(), "jdeps");
        assert_eq!(Tool::Javac.name(), "javac");
        assert_eq!(Tool::Jlink.name(), "jlink");
        assert_eq!(Tool::Jpackage.name(), "jpackage");
    }

    #[test]
    fn test_jdk_paths() {
        let jdk = Jdk::from_home("/opt/jdk");
        assert_eq!(jdk.jmods(), PathBuf::from("/opt/jdk/jmods"));
        let javac = jdk.tool_path(Tool::Javac);
        assert!(javac.starts_with("/opt/jdk/bin"));
    }

    #[test]
    fn test_diagnostics_prefers_stderr() {
        let out = ToolOutput {
            code: 1,
            stdout: "progress".to_string(),
            stderr: "error: bad module\n".to_string(),
        };
        assert_eq!(out.diagnostics(), "error: bad module\n");

        let out = ToolOutput {
            code: 1,
            stdout: "only stdout".to_string(),
            stderr: "  \n".to_string(),
        };
        assert_eq!(out.diagnostics(), "only stdout");
    }
}
