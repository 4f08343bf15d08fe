// src/archive/mod.rs

//! Jar archive inspection and in-place descriptor injection.
//!
//! A jar may carry its module descriptor at the archive root or inside one or
//! more `META-INF/versions/<N>/` layers of a multi-release jar. Layer
//! resolution is modelled explicitly: [`DescriptorLayers`] is the ordered set
//! of layers that carry a descriptor, and a layer satisfies a target runtime
//! version exactly when its number is less than or equal to the target.

pub mod inspect;
pub mod patch;

pub use inspect::{classify, is_multi_release, Classification};
pub use patch::patch;

/// Conventional root entry path of a module descriptor
pub const DESCRIPTOR_ENTRY: &str = "module-info.class";

/// Prefix of version-layered entries in a multi-release jar
pub const VERSIONS_PREFIX: &str = "META-INF/versions/";

/// Target runtime version a batch resolves descriptors against.
///
/// Resolved once per run, either from explicit configuration or from the
/// JDK's own version; immutable for the duration of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetVersion(pub u32);

impl std::fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Entry path of the descriptor for a given version layer (root when absent)
pub fn descriptor_entry(layer: Option<u32>) -> String {
    match layer {
        None => DESCRIPTOR_ENTRY.to_string(),
        Some(version) => format!("{VERSIONS_PREFIX}{version}/{DESCRIPTOR_ENTRY}"),
    }
}

/// Parse the layer number out of a version-layered descriptor entry path.
///
/// Returns `None` for the root descriptor, for non-descriptor entries, and
/// for malformed layer paths (non-numeric or nested).
pub fn descriptor_layer_of(entry_name: &str) -> Option<u32> {
    let rest = entry_name.strip_prefix(VERSIONS_PREFIX)?;
    let version = rest.strip_suffix(DESCRIPTOR_ENTRY)?.strip_suffix('/')?;
    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    version.parse().ok()
}

/// The descriptor-carrying layers of one archive, in ascending version order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorLayers {
    /// Descriptor present at the archive root
    pub root: bool,
    /// Version layers carrying a descriptor, sorted ascending
    pub versions: Vec<u32>,
}

impl DescriptorLayers {
    /// Collect layers from an archive's entry names
    pub fn from_entry_names<'a>(names: impl Iterator<Item = &'a str>) -> Self {
        let mut layers = Self::default();
        for name in names {
            if name == DESCRIPTOR_ENTRY {
                layers.root = true;
            } else if let Some(version) = descriptor_layer_of(name) {
                layers.versions.push(version);
            }
        }
        layers.versions.sort_unstable();
        layers.versions.dedup();
        layers
    }

    /// Does any layer satisfy the target version?
    ///
    /// The root descriptor always qualifies; a version layer qualifies when
    /// its number is `<=` the target. Layers above the target are irrelevant
    /// and never produce a false positive.
    pub fn qualifies(&self, target: TargetVersion) -> bool {
        self.root || self.versions.iter().any(|&v| v <= target.0)
    }
}
