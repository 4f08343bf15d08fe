// tests/common/mod.rs

//! Shared test utilities: jar builders and a scripted fake toolchain.

use modpatch::{Result, Tool, ToolOutput, Toolchain};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Build a small jar with the given entries
pub fn make_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// A plain non-modular jar with one class entry
pub fn make_plain_jar(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    make_jar(&path, &[("com/example/Main.class", b"\xCA\xFE\xBA\xBE")]);
    path
}

/// Scripted behavior of the fake jdeps for one jar
#[derive(Clone)]
pub enum JdepsScript {
    /// Write one descriptor source per listed layer (`None` = unversioned)
    Generate(Vec<Option<u32>>),
    /// Report success but write nothing
    NoModules,
    /// Exit nonzero with the given diagnostics
    Fail(String),
}

/// Fake toolchain: interprets jdeps/javac argument contracts against the
/// filesystem, without a JDK. Counts invocations so tests can assert that a
/// second run performs none.
pub struct FakeToolchain {
    pub jdeps_calls: AtomicUsize,
    pub javac_calls: AtomicUsize,
    /// jdeps behavior keyed by jar file name; unlisted jars get one
    /// unversioned descriptor
    jdeps_scripts: Mutex<HashMap<String, JdepsScript>>,
    /// jar file names whose descriptor compilation should fail
    javac_failures: Mutex<Vec<String>>,
    /// every invocation, for argument assertions
    pub recorded: Mutex<Vec<(Tool, Vec<String>)>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self {
            jdeps_calls: AtomicUsize::new(0),
            javac_calls: AtomicUsize::new(0),
            jdeps_scripts: Mutex::new(HashMap::new()),
            javac_failures: Mutex::new(Vec::new()),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn script_jdeps(&self, jar_name: &str, script: JdepsScript) {
        self.jdeps_scripts
            .lock()
            .unwrap()
            .insert(jar_name.to_string(), script);
    }

    pub fn fail_javac_for(&self, jar_name: &str) {
        self.javac_failures
            .lock()
            .unwrap()
            .push(jar_name.to_string());
    }

    pub fn total_calls(&self) -> usize {
        self.jdeps_calls.load(Ordering::SeqCst) + self.javac_calls.load(Ordering::SeqCst)
    }

    /// Module name the fake derives for a jar, the way jdeps derives
    /// automatic module names from file names
    pub fn module_name_for(jar_name: &str) -> String {
        jar_name.trim_end_matches(".jar").replace('-', ".")
    }

    /// Descriptor class bytes the fake javac writes for a module
    pub fn class_bytes_for(module_name: &str) -> Vec<u8> {
        let mut bytes = b"\xCA\xFE\xBA\xBE".to_vec();
        bytes.extend_from_slice(module_name.as_bytes());
        bytes
    }

    fn value_of(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    }

    fn run_jdeps(&self, args: &[String]) -> ToolOutput {
        self.jdeps_calls.fetch_add(1, Ordering::SeqCst);

        let sources = PathBuf::from(
            Self::value_of(args, "--generate-module-info").expect("missing output dir"),
        );
        let jar = PathBuf::from(args.last().expect("missing target jar"));
        let jar_name = jar.file_name().unwrap().to_str().unwrap().to_string();
        let module_name = Self::module_name_for(&jar_name);

        let script = self
            .jdeps_scripts
            .lock()
            .unwrap()
            .get(&jar_name)
            .cloned()
            .unwrap_or(JdepsScript::Generate(vec![None]));

        match script {
            JdepsScript::Fail(diagnostics) => ToolOutput {
                code: 1,
                stdout: String::new(),
                stderr: diagnostics,
            },
            JdepsScript::NoModules => ToolOutput {
                code: 0,
                stdout: String::new(),
                stderr: String::new(),
            },
            JdepsScript::Generate(layers) => {
                for layer in layers {
                    let source = match layer {
                        None => sources.join(&module_name).join("module-info.java"),
                        Some(version) => sources
                            .join(&module_name)
                            .join("versions")
                            .join(version.to_string())
                            .join("module-info.java"),
                    };
                    std::fs::create_dir_all(source.parent().unwrap()).unwrap();
                    std::fs::write(&source, format!("module {module_name} {{}}\n")).unwrap();
                }
                ToolOutput {
                    code: 0,
                    stdout: String::new(),
                    stderr: String::new(),
                }
            }
        }
    }

    fn run_javac(&self, args: &[String]) -> ToolOutput {
        self.javac_calls.fetch_add(1, Ordering::SeqCst);

        let patch = Self::value_of(args, "--patch-module").expect("missing patch-module");
        let (module_name, jar_path) = patch.split_once('=').expect("malformed patch-module");
        let jar_name = Path::new(jar_path)
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        if self.javac_failures.lock().unwrap().contains(&jar_name) {
            return ToolOutput {
                code: 1,
                stdout: String::new(),
                stderr: format!("error: module {module_name} does not compile"),
            };
        }

        let classes = PathBuf::from(Self::value_of(args, "-d").expect("missing -d"));
        std::fs::create_dir_all(&classes).unwrap();
        std::fs::write(
            classes.join("module-info.class"),
            Self::class_bytes_for(module_name),
        )
        .unwrap();

        ToolOutput {
            code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

impl Toolchain for FakeToolchain {
    fn run(&self, tool: Tool, args: &[OsString]) -> Result<ToolOutput> {
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.recorded.lock().unwrap().push((tool, args.clone()));

        let output = match tool {
            Tool::Jdeps => self.run_jdeps(&args),
            Tool::Javac => self.run_javac(&args),
            Tool::Jlink | Tool::Jpackage => ToolOutput {
                code: 0,
                stdout: String::new(),
                stderr: String::new(),
            },
        };
        Ok(output)
    }
}
