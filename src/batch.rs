// src/batch.rs

//! Batch orchestration across a directory of archives.
//!
//! Each archive runs the same sequential pipeline (inspect, generate,
//! compile, patch); archives are mutually independent and fan out across a
//! rayon worker pool. A failure halts only its own archive: the batch always
//! completes and reports one outcome per candidate.

use crate::archive::{self, classify, is_multi_release, Classification, TargetVersion};
use crate::descriptor::{DescriptorCompiler, DescriptorGenerator};
use crate::error::{Error, Result};
use crate::toolchain::{ModulePath, Toolchain};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// One candidate archive, enumerated at batch start
#[derive(Debug, Clone)]
pub struct ArchiveArtifact {
    /// Absolute path of the jar
    pub path: PathBuf,
    /// File name, the key of the batch report
    pub file_name: String,
    /// Per-archive scratch directory, derived from the base name
    pub scratch_root: PathBuf,
}

impl ArchiveArtifact {
    fn new(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let base_name = file_name.strip_suffix(".jar")?.to_string();
        let scratch_root = path.parent()?.join(base_name);
        Some(Self {
            path,
            file_name,
            scratch_root,
        })
    }

    fn sources_dir(&self) -> PathBuf {
        self.scratch_root.join("sources")
    }

    fn classes_dir(&self) -> PathBuf {
        self.scratch_root.join("classes")
    }
}

/// Terminal state of one archive's processing
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// A descriptor already applied at or below the target version
    Skipped,
    /// Pipeline completed; carries the number of descriptors injected
    /// (zero when the analysis tool found nothing to generate)
    Patched(usize),
    /// Pipeline aborted for this archive alone
    Failed(Error),
}

impl ArchiveOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Cooperative stop signal, checked between archives.
///
/// Archives not yet started when the token fires are reported as failed with
/// a `Cancelled` cause; an archive already in flight runs to completion so it
/// is never left with a half-written descriptor entry.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Runtime version layered descriptors are resolved against
    pub target: TargetVersion,
    /// Directory of the platform's built-in modules, when a JDK is in play
    pub platform_modules: Option<PathBuf>,
    /// Best-effort mode: unresolved dependencies are noted, not fatal
    pub ignore_missing_deps: bool,
    /// Worker pool size; `None` sizes to available cores
    pub jobs: Option<usize>,
    /// Operator stop signal
    pub cancel: CancelToken,
}

impl BatchOptions {
    pub fn new(target: TargetVersion) -> Self {
        Self {
            target,
            platform_modules: None,
            ignore_missing_deps: false,
            jobs: None,
            cancel: CancelToken::default(),
        }
    }
}

/// Drives the per-archive pipeline over a directory of archives
pub struct Batch<'a> {
    toolchain: &'a dyn Toolchain,
}

impl<'a> Batch<'a> {
    pub fn new(toolchain: &'a dyn Toolchain) -> Self {
        Self { toolchain }
    }

    /// Patch every non-modular jar directly inside `modules_dir`.
    ///
    /// Returns one outcome per candidate archive. Only configuration
    /// problems (directory missing or not a directory, pool setup) abort the
    /// run as a whole; per-archive errors land in that archive's outcome.
    pub fn run(
        &self,
        modules_dir: &Path,
        options: &BatchOptions,
    ) -> Result<BTreeMap<String, ArchiveOutcome>> {
        if !modules_dir.exists() {
            return Err(Error::Config(format!(
                "modules folder does not exist: {}",
                modules_dir.display()
            )));
        }
        if !modules_dir.is_dir() {
            return Err(Error::Config(format!(
                "modules folder is not a directory: {}",
                modules_dir.display()
            )));
        }

        let artifacts = enumerate_archives(modules_dir)?;
        info!(
            "patching {} candidate archive(s) in {}",
            artifacts.len(),
            modules_dir.display()
        );

        let module_path = ModulePath::for_batch(options.platform_modules.clone(), modules_dir);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs.unwrap_or(0))
            .build()
            .map_err(|e| Error::Config(format!("cannot build worker pool: {e}")))?;

        let outcomes = pool.install(|| {
            artifacts
                .par_iter()
                .map(|artifact| {
                    let outcome = if options.cancel.is_cancelled() {
                        ArchiveOutcome::Failed(Error::Cancelled(
                            "stop requested before archive was processed".to_string(),
                        ))
                    } else {
                        match self.process(artifact, &module_path, options) {
                            Ok(outcome) => outcome,
                            Err(e) => {
                                error!("[{}] {}", artifact.file_name, e);
                                ArchiveOutcome::Failed(e)
                            }
                        }
                    };
                    (artifact.file_name.clone(), outcome)
                })
                .collect()
        });

        Ok(outcomes)
    }

    /// The per-archive state machine: inspect, generate, then per generated
    /// descriptor compile and patch, lower version layers first.
    fn process(
        &self,
        artifact: &ArchiveArtifact,
        module_path: &ModulePath,
        options: &BatchOptions,
    ) -> Result<ArchiveOutcome> {
        info!("[{}] checking module info", artifact.file_name);
        if classify(&artifact.path, options.target)? == Classification::AlreadyModular {
            return Ok(ArchiveOutcome::Skipped);
        }
        let multi_release = is_multi_release(&artifact.path)?;

        info!("[{}] generating module info", artifact.file_name);
        let generated = DescriptorGenerator::new(self.toolchain).generate(
            &artifact.path,
            module_path,
            options.target,
            multi_release,
            options.ignore_missing_deps,
            &artifact.sources_dir(),
        )?;

        let compiler = DescriptorCompiler::new(self.toolchain);
        let classes_dir = artifact.classes_dir();
        let mut injected = 0;

        for descriptor in &generated {
            info!(
                "[{}] compiling descriptor for module {} (layer {:?})",
                artifact.file_name, descriptor.module_name, descriptor.version
            );
            let compiled =
                compiler.compile(descriptor, &artifact.path, module_path, &classes_dir)?;

            info!("[{}] packaging module-info.class", artifact.file_name);
            archive::patch(&artifact.path, &compiled.class_file, descriptor.version)?;
            injected += 1;
        }

        Ok(ArchiveOutcome::Patched(injected))
    }
}

/// Files with the jar extension directly inside the directory; everything
/// else, including the per-archive scratch directories, is ignored
fn enumerate_archives(modules_dir: &Path) -> Result<Vec<ArchiveArtifact>> {
    let mut artifacts = Vec::new();
    for entry in std::fs::read_dir(modules_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("jar") {
            continue;
        }
        if let Some(artifact) = ArchiveArtifact::new(path) {
            artifacts.push(artifact);
        }
    }
    artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(artifacts)
}
