// src/lib.rs

//! Modpatch
//!
//! Retrofits legacy, non-modular jar archives with synthesized module
//! descriptors so they can participate in a module-aware link and package
//! pipeline, without touching their compiled classes.
//!
//! # Architecture
//!
//! - Inspect: classify each archive as already-modular or not, respecting
//!   multi-release version layers against a target runtime version
//! - Generate: run jdeps against the archive and its module-path neighbors
//!   to synthesize `module-info.java` sources
//! - Compile: run javac with the archive patched onto its own module via
//!   `--patch-module`
//! - Patch: inject the compiled descriptor back into the archive in place
//!
//! Archives are independent; the batch fans out across a worker pool and a
//! failure in one archive never aborts its siblings.

pub mod archive;
pub mod batch;
pub mod descriptor;
mod error;
pub mod installer;
pub mod link;
pub mod toolchain;

pub use archive::{classify, Classification, DescriptorLayers, TargetVersion};
pub use batch::{ArchiveArtifact, ArchiveOutcome, Batch, BatchOptions, CancelToken};
pub use descriptor::{
    CompiledDescriptor, DescriptorCompiler, DescriptorGenerator, GeneratedDescriptor,
};
pub use error::{Error, Result};
pub use installer::{package, InstallerOptions};
pub use link::{link, LinkOptions};
pub use toolchain::{Jdk, JdkToolchain, ModulePath, Tool, ToolOutput, Toolchain};
