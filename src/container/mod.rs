//! Zip document containers.
//!
//! A [`Container`] is opened read-only and never modified in place. Output is
//! always a new archive built from the original plus a set of
//! [`Replacements`]; every entry that is not replaced is copied byte for byte.
//!
//! # Example
//!
//! ```no_run
//! use docfill::container::{Container, Replacements};
//!
//! fn main() -> docfill::Result<()> {
//!     let mut container = Container::open("carta.docx")?;
//!     let body = container.read_text_entry("word/document.xml")?;
//!
//!     let mut replacements = Replacements::new();
//!     replacements.insert("word/document.xml", body.replace("Hola", "Buenos días"));
//!     container.write("carta_final.docx", &replacements)?;
//!     Ok(())
//! }
//! ```

mod writer;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use zip::{CompressionMethod, ZipArchive};

use crate::detect::detect_container_from_bytes;
use crate::error::{Error, Result};

/// Main body part of a WordprocessingML package.
pub const BODY_ENTRY: &str = "word/document.xml";

/// Content-types manifest of an OPC package.
pub const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";

/// What an entry holds, judged from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// The document body (`word/document.xml`)
    Body,
    /// A page header (`word/headerN.xml`)
    Header,
    /// A page footer (`word/footerN.xml`)
    Footer,
    /// Footnotes or endnotes
    Notes,
    /// Anything else: styles, relationships, media, settings...
    Other,
}

impl EntryKind {
    /// Classify an entry by name.
    pub fn classify(name: &str) -> Self {
        if name == BODY_ENTRY {
            return EntryKind::Body;
        }

        let Some(stem) = name
            .strip_prefix("word/")
            .and_then(|rest| rest.strip_suffix(".xml"))
        else {
            return EntryKind::Other;
        };

        let numbered = |prefix: &str| {
            stem.strip_prefix(prefix)
                .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
        };

        if numbered("header") {
            EntryKind::Header
        } else if numbered("footer") {
            EntryKind::Footer
        } else if stem == "footnotes" || stem == "endnotes" {
            EntryKind::Notes
        } else {
            EntryKind::Other
        }
    }

    /// Whether entries of this kind carry document text.
    pub fn is_textual(&self) -> bool {
        !matches!(self, EntryKind::Other)
    }
}

/// Compression method of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// No compression
    Stored,
    /// Deflate
    Deflated,
    /// Any other method (copied through untouched)
    Other,
}

impl From<CompressionMethod> for Compression {
    fn from(method: CompressionMethod) -> Self {
        match method {
            CompressionMethod::Stored => Compression::Stored,
            CompressionMethod::Deflated => Compression::Deflated,
            _ => Compression::Other,
        }
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Compression::Stored => "stored",
            Compression::Deflated => "deflated",
            Compression::Other => "other",
        };
        f.pad(name)
    }
}

/// Metadata for one entry of a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryInfo {
    /// Path of the entry inside the archive
    pub name: String,

    /// Compression method
    pub compression: Compression,

    /// Uncompressed size in bytes
    pub size: u64,

    /// Compressed size in bytes
    pub compressed_size: u64,

    /// Entry kind
    pub kind: EntryKind,

    #[serde(skip, default = "default_method")]
    pub(crate) method: CompressionMethod,
}

fn default_method() -> CompressionMethod {
    CompressionMethod::Deflated
}

impl EntryInfo {
    /// Whether this is a directory entry.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// Overall package type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A WordprocessingML package (content types manifest and body present)
    WordProcessing,
    /// Some other zip container
    Generic,
}

/// New content for entries of a container, keyed by entry name.
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    entries: BTreeMap<String, Vec<u8>>,
}

impl Replacements {
    /// Create an empty set of replacements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content of an entry.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), data.into());
    }

    /// Replacement content for an entry, if any.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(|d| d.as_slice())
    }

    /// Check whether an entry is replaced.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of replaced entries, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Number of replaced entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is replaced.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A zip document container held in memory.
///
/// The source file is read completely when opening, so no file handle is
/// kept open between calls.
pub struct Container {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entries: Vec<EntryInfo>,
}

impl Container {
    /// Open a container from a file.
    ///
    /// Fails with [`Error::TemplateFileMissing`] if the path does not exist,
    /// [`Error::Io`] if it cannot be inspected or read and
    /// [`Error::InvalidTemplate`] if it is not a zip archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::TemplateFileMissing(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(Error::InvalidTemplate(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let data = fs::read(path)?;
        log::debug!("Opened {} ({} bytes)", path.display(), data.len());
        Self::from_vec(data)
    }

    /// Open a container from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_vec(data.to_vec())
    }

    /// Open a container from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_vec(data)
    }

    /// Open a container from an owned buffer.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        detect_container_from_bytes(&data)?;

        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            let name = file.name().to_string();
            entries.push(EntryInfo {
                kind: EntryKind::classify(&name),
                compression: file.compression().into(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                method: file.compression(),
                name,
            });
        }

        Ok(Self { archive, entries })
    }

    /// All entries, in archive order.
    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    /// Metadata for a named entry.
    pub fn entry(&self, name: &str) -> Option<&EntryInfo> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Check whether an entry exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the container has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Package type of this container.
    pub fn document_kind(&self) -> DocumentKind {
        if self.contains(CONTENT_TYPES_ENTRY) && self.contains(BODY_ENTRY) {
            DocumentKind::WordProcessing
        } else {
            DocumentKind::Generic
        }
    }

    /// Read the uncompressed bytes of an entry.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::EntryNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an entry as UTF-8 text.
    pub fn read_text_entry(&mut self, name: &str) -> Result<String> {
        let data = self.read_entry(name)?;
        String::from_utf8(data)
            .map_err(|e| Error::Encoding(format!("{} is not valid UTF-8: {}", name, e)))
    }

    /// Write a new container to `path`.
    ///
    /// The archive is assembled in a temporary file next to `path` and moved
    /// into place only when complete, so a failure never leaves a partial
    /// document behind. `path` may be the file this container was opened from.
    pub fn write<P: AsRef<Path>>(&mut self, path: P, replacements: &Replacements) -> Result<()> {
        let path = path.as_ref();
        writer::write_atomic(path, |file| self.write_to(file, replacements).map(|_| ()))?;
        log::debug!(
            "Wrote {} ({} replaced entries)",
            path.display(),
            replacements.len()
        );
        Ok(())
    }

    /// Write a new container into any seekable writer.
    pub fn write_to<W: Write + Seek>(&mut self, writer: W, replacements: &Replacements) -> Result<W> {
        writer::write_archive(&mut self.archive, &self.entries, replacements, writer)
    }

    /// Build a new container in memory.
    pub fn to_bytes(&mut self, replacements: &Replacements) -> Result<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()), replacements)?;
        Ok(cursor.into_inner())
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build(entries: &[(&str, &[u8], CompressionMethod)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data, method) in entries {
            let options = SimpleFileOptions::default().compression_method(*method);
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn sample() -> Vec<u8> {
        build(&[
            (CONTENT_TYPES_ENTRY, b"<Types/>", CompressionMethod::Deflated),
            (BODY_ENTRY, b"<w:document>Hola</w:document>", CompressionMethod::Deflated),
            ("word/media/image1.png", &[0x89, b'P', b'N', b'G', 0, 1, 2], CompressionMethod::Stored),
        ])
    }

    #[test]
    fn test_classify_entries() {
        assert_eq!(EntryKind::classify("word/document.xml"), EntryKind::Body);
        assert_eq!(EntryKind::classify("word/header1.xml"), EntryKind::Header);
        assert_eq!(EntryKind::classify("word/header.xml"), EntryKind::Header);
        assert_eq!(EntryKind::classify("word/footer12.xml"), EntryKind::Footer);
        assert_eq!(EntryKind::classify("word/footnotes.xml"), EntryKind::Notes);
        assert_eq!(EntryKind::classify("word/styles.xml"), EntryKind::Other);
        assert_eq!(EntryKind::classify("word/headerStyles.xml"), EntryKind::Other);
        assert_eq!(EntryKind::classify("word/_rels/document.xml.rels"), EntryKind::Other);
        assert_eq!(EntryKind::classify("word/media/image1.png"), EntryKind::Other);
        assert!(!EntryKind::Other.is_textual());
        assert!(EntryKind::Footer.is_textual());
    }

    #[test]
    fn test_open_from_bytes() {
        let container = Container::from_bytes(&sample()).unwrap();
        assert_eq!(container.len(), 3);
        assert_eq!(container.document_kind(), DocumentKind::WordProcessing);

        let image = container.entry("word/media/image1.png").unwrap();
        assert_eq!(image.compression, Compression::Stored);
        assert_eq!(image.kind, EntryKind::Other);
    }

    #[test]
    fn test_invalid_bytes() {
        let result = Container::from_bytes(b"not a zip at all");
        assert!(matches!(result, Err(Error::InvalidTemplate(_))));

        // Right magic, garbage after it.
        let result = Container::from_bytes(b"PK\x03\x04garbage garbage garbage");
        assert!(matches!(result, Err(Error::InvalidTemplate(_))));
    }

    #[test]
    fn test_read_entries() {
        let mut container = Container::from_bytes(&sample()).unwrap();
        assert_eq!(
            container.read_text_entry(BODY_ENTRY).unwrap(),
            "<w:document>Hola</w:document>"
        );
        assert!(matches!(
            container.read_entry("word/missing.xml"),
            Err(Error::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_read_non_utf8_entry() {
        let data = build(&[(BODY_ENTRY, &[0xff, 0xfe, 0x00], CompressionMethod::Stored)]);
        let mut container = Container::from_bytes(&data).unwrap();
        assert!(matches!(
            container.read_text_entry(BODY_ENTRY),
            Err(Error::Encoding(_))
        ));
    }

    #[test]
    fn test_write_preserves_untouched_entries() {
        let mut container = Container::from_bytes(&sample()).unwrap();
        let mut replacements = Replacements::new();
        replacements.insert(BODY_ENTRY, "<w:document>Adiós</w:document>");

        let output = container.to_bytes(&replacements).unwrap();
        let mut written = Container::from_vec(output).unwrap();

        let names: Vec<_> = written.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(
            names,
            vec![CONTENT_TYPES_ENTRY, BODY_ENTRY, "word/media/image1.png"]
        );
        assert_eq!(
            written.read_text_entry(BODY_ENTRY).unwrap(),
            "<w:document>Adiós</w:document>"
        );
        assert_eq!(
            written.read_entry("word/media/image1.png").unwrap(),
            vec![0x89, b'P', b'N', b'G', 0, 1, 2]
        );
        assert_eq!(
            written.entry("word/media/image1.png").unwrap().compression,
            Compression::Stored
        );
        assert_eq!(
            written.entry(BODY_ENTRY).unwrap().compression,
            Compression::Deflated
        );
    }

    #[test]
    fn test_open_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = Container::open(dir.path().join("no_existe.docx"));
        assert!(matches!(result, Err(Error::TemplateFileMissing(_))));
    }

    #[test]
    fn test_open_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = Container::open(dir.path());
        assert!(matches!(result, Err(Error::InvalidTemplate(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_uninspectable_path_is_io_error() {
        // A path that runs through a regular file fails with ENOTDIR,
        // which is not a missing template.
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("carta.docx");
        std::fs::write(&file, sample()).unwrap();

        let result = Container::open(file.join("word.docx"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_empty_archive() {
        let data = build(&[]);
        let container = Container::from_bytes(&data).unwrap();
        assert!(container.is_empty());
        assert_eq!(container.document_kind(), DocumentKind::Generic);
    }

    #[test]
    fn test_replacements() {
        let mut replacements = Replacements::new();
        assert!(replacements.is_empty());
        replacements.insert("b.xml", "b");
        replacements.insert("a.xml", vec![b'a']);
        assert_eq!(replacements.len(), 2);
        assert!(replacements.contains("a.xml"));
        assert_eq!(replacements.get("b.xml"), Some(&b"b"[..]));
        assert_eq!(replacements.names().collect::<Vec<_>>(), vec!["a.xml", "b.xml"]);
    }
}
