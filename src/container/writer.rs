//! Emitting a new container from an existing one plus replacements.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::{EntryInfo, Replacements};
use crate::error::{Error, Result};

/// Copy every entry of `archive` into `writer`, swapping in replaced content.
///
/// Untouched entries are raw-copied: their compressed bytes, name and
/// compression method come through unchanged. Replaced entries keep their
/// position, name, compression method and permissions.
pub(super) fn write_archive<R, W>(
    archive: &mut ZipArchive<R>,
    entries: &[EntryInfo],
    replacements: &Replacements,
    writer: W,
) -> Result<W>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut zip = ZipWriter::new(writer);

    for (index, info) in entries.iter().enumerate() {
        let file = archive.by_index_raw(index)?;

        match replacements.get(&info.name) {
            Some(data) => {
                let mut options = SimpleFileOptions::default()
                    .compression_method(info.method)
                    .large_file(data.len() as u64 >= u32::MAX as u64);
                if let Some(mode) = file.unix_mode() {
                    options = options.unix_permissions(mode);
                }
                drop(file);

                log::debug!("Rewriting entry {} ({} bytes)", info.name, data.len());
                zip.start_file(info.name.as_str(), options)?;
                zip.write_all(data)?;
            }
            None => {
                zip.raw_copy_file(file)?;
            }
        }
    }

    for name in replacements.names() {
        if !entries.iter().any(|e| e.name == name) {
            log::warn!("Replacement for unknown entry {} was ignored", name);
        }
    }

    Ok(zip.finish()?)
}

/// Write a file through a temporary sibling, renaming it over `path` only
/// once `write` has succeeded.
///
/// On failure the temporary file is removed and `path` is left untouched.
pub(super) fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".docfill-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}
