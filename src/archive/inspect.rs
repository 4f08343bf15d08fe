// src/archive/inspect.rs

//! Read-only archive classification.

use super::{DescriptorLayers, TargetVersion, VERSIONS_PREFIX};
use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Outcome of inspecting one archive against a target version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A descriptor already applies at or below the target version
    AlreadyModular,
    /// No applicable descriptor; the archive needs one synthesized
    NeedsPatch,
}

fn open(archive: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(archive).map_err(|e| Error::ArchiveRead {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    })?;
    ZipArchive::new(file).map_err(|e| Error::ArchiveRead {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Classify an archive: does a module descriptor already exist, considering
/// version-layered entries at or below `target`?
///
/// Read-only and side-effect free; safe to call repeatedly and concurrently
/// across different archives. Archives without any version layering are
/// treated as a single unversioned layer.
pub fn classify(archive: &Path, target: TargetVersion) -> Result<Classification> {
    let zip = open(archive)?;
    let layers = DescriptorLayers::from_entry_names(zip.file_names());
    debug!(
        "{}: descriptor layers root={} versions={:?}",
        archive.display(),
        layers.root,
        layers.versions
    );
    if layers.qualifies(target) {
        Ok(Classification::AlreadyModular)
    } else {
        Ok(Classification::NeedsPatch)
    }
}

/// Does the archive carry any version-layered entries at all?
///
/// Decides whether the analysis tool is told to restrict itself to a version
/// layer; the flag is rejected by jdeps for plain archives.
pub fn is_multi_release(archive: &Path) -> Result<bool> {
    let zip = open(archive)?;
    Ok(zip.file_names().any(|name| name.starts_with(VERSIONS_PREFIX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_classify_plain_archive_needs_patch() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("plain.jar");
        write_jar(&jar, &[("com/example/Main.class", b"\xCA\xFE\xBA\xBE")]);

        assert_eq!(
            classify(&jar, TargetVersion(17)).unwrap(),
            Classification::NeedsPatch
        );
        assert!(!is_multi_release(&jar).unwrap());
    }

    #[test]
    fn test_classify_root_descriptor_already_modular() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("modular.jar");
        write_jar(
            &jar,
            &[
                ("module-info.class", b"\xCA\xFE\xBA\xBE"),
                ("com/example/Main.class", b"\xCA\xFE\xBA\xBE"),
            ],
        );

        assert_eq!(
            classify(&jar, TargetVersion(9)).unwrap(),
            Classification::AlreadyModular
        );
    }

    #[test]
    fn test_classify_layered_descriptor_respects_target() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("layered.jar");
        write_jar(
            &jar,
            &[
                ("com/example/Main.class", b"\xCA\xFE\xBA\xBE"),
                ("META-INF/versions/9/module-info.class", b"\xCA\xFE\xBA\xBE"),
                ("META-INF/versions/17/module-info.class", b"\xCA\xFE\xBA\xBE"),
            ],
        );

        // 9 <= 11 qualifies even though 17 does not
        assert_eq!(
            classify(&jar, TargetVersion(11)).unwrap(),
            Classification::AlreadyModular
        );
        // nothing at or below 8
        assert_eq!(
            classify(&jar, TargetVersion(8)).unwrap(),
            Classification::NeedsPatch
        );
        assert!(is_multi_release(&jar).unwrap());
    }

    #[test]
    fn test_classify_corrupt_archive() {
        let temp = tempfile::tempdir().unwrap();
        let jar = temp.path().join("corrupt.jar");
        std::fs::write(&jar, b"this is not a zip file").unwrap();

        match classify(&jar, TargetVersion(17)) {
            Err(Error::ArchiveRead { .. }) => {}
            other => panic!("expected ArchiveRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_missing_archive() {
        match classify(Path::new("/nonexistent/x.jar"), TargetVersion(17)) {
            Err(Error::ArchiveRead { .. }) => {}
            other => panic!("expected ArchiveRead error, got {:?}", other),
        }
    }
}
