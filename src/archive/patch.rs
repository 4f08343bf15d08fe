// src/archive/patch.rs

//! In-place descriptor injection.
//!
//! The archive is rewritten to a staged temp file in the same directory and
//! atomically renamed over the original, so a failed write never leaves a
//! half-written entry behind. Unrelated entries are raw-copied without
//! recompression; the descriptor entry is written with fixed metadata so
//! re-patching identical bytes yields a byte-identical archive.

use super::descriptor_entry;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Inject a compiled descriptor into the archive at the root entry path, or
/// at the version-layer path when `layer` is given. Any pre-existing entry at
/// that exact path is overwritten.
pub fn patch(archive: &Path, descriptor_class: &Path, layer: Option<u32>) -> Result<()> {
    let bytes = std::fs::read(descriptor_class)?;
    write_entry(archive, &descriptor_entry(layer), &bytes)
}

fn write_err(archive: &Path, reason: impl ToString) -> Error {
    Error::ArchiveWrite {
        path: archive.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Replace or add a single named entry, leaving all other entries untouched
fn write_entry(archive: &Path, entry_name: &str, bytes: &[u8]) -> Result<()> {
    let file = File::open(archive).map_err(|e| Error::ArchiveRead {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut source = ZipArchive::new(file).map_err(|e| Error::ArchiveRead {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    })?;

    let parent = archive.parent().ok_or_else(|| {
        write_err(archive, "archive path has no parent directory")
    })?;
    let staged = tempfile::NamedTempFile::new_in(parent).map_err(|e| write_err(archive, e))?;
    let mut writer = ZipWriter::new(staged);

    for index in 0..source.len() {
        let entry = source
            .by_index_raw(index)
            .map_err(|e| Error::ArchiveRead {
                path: archive.to_path_buf(),
                reason: e.to_string(),
            })?;
        if entry.name() == entry_name {
            debug!("{}: replacing stale entry {}", archive.display(), entry_name);
            continue;
        }
        writer.raw_copy_file(entry).map_err(|e| write_err(archive, e))?;
    }

    // Fixed timestamp and compression keep re-patching deterministic
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    writer
        .start_file(entry_name, options)
        .map_err(|e| write_err(archive, e))?;
    writer.write_all(bytes).map_err(|e| write_err(archive, e))?;

    let staged = writer.finish().map_err(|e| write_err(archive, e))?;
    staged.persist(archive).map_err(|e| write_err(archive, e))?;
    Ok(())
}
