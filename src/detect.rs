//! Zip container detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Signature found at the start of a zip container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerSignature {
    /// Starts with a local file header (the usual case)
    LocalFile,
    /// An archive with no entries (end-of-central-directory only)
    Empty,
    /// First volume of a spanned archive
    Spanned,
}

impl std::fmt::Display for ContainerSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerSignature::LocalFile => write!(f, "zip"),
            ContainerSignature::Empty => write!(f, "zip (empty)"),
            ContainerSignature::Spanned => write!(f, "zip (spanned)"),
        }
    }
}

const LOCAL_FILE_MAGIC: &[u8] = b"PK\x03\x04";
const EMPTY_ARCHIVE_MAGIC: &[u8] = b"PK\x05\x06";
const SPANNED_MAGIC: &[u8] = b"PK\x07\x08";
const MAGIC_LEN: usize = 4;

/// Detect the container signature of a file.
///
/// # Returns
/// * `Err(Error::TemplateFileMissing)` if the path does not exist
/// * `Err(Error::InvalidTemplate)` if the file is not a zip container
///
/// # Example
/// ```no_run
/// use docfill::detect::detect_container_from_path;
///
/// let signature = detect_container_from_path("carta.docx").unwrap();
/// println!("{}", signature);
/// ```
pub fn detect_container_from_path<P: AsRef<Path>>(path: P) -> Result<ContainerSignature> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::TemplateFileMissing(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = Vec::with_capacity(MAGIC_LEN);
    reader.take(MAGIC_LEN as u64).read_to_end(&mut header)?;
    detect_container_from_bytes(&header)
}

/// Detect the container signature from the first bytes of a file.
pub fn detect_container_from_bytes(data: &[u8]) -> Result<ContainerSignature> {
    if data.len() < MAGIC_LEN {
        return Err(Error::InvalidTemplate("file too short for a zip container".into()));
    }

    let magic = &data[..MAGIC_LEN];
    if magic == LOCAL_FILE_MAGIC {
        Ok(ContainerSignature::LocalFile)
    } else if magic == EMPTY_ARCHIVE_MAGIC {
        Ok(ContainerSignature::Empty)
    } else if magic == SPANNED_MAGIC {
        Ok(ContainerSignature::Spanned)
    } else {
        Err(Error::InvalidTemplate("missing zip signature".into()))
    }
}

/// Check if a file looks like a zip container.
pub fn is_container<P: AsRef<Path>>(path: P) -> bool {
    detect_container_from_path(path).is_ok()
}

/// Check if bytes look like a zip container.
pub fn is_container_bytes(data: &[u8]) -> bool {
    detect_container_from_bytes(data).is_ok()
}
