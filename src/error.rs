//! Error types for docfill library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during template processing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The template path does not point to an existing file.
    #[error("Template file not found: {}", .0.display())]
    TemplateFileMissing(PathBuf),

    /// The container is not a readable zip archive.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// A named entry does not exist in the container.
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// A textual entry is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The supplied values could not be turned into a value map.
    #[error("Invalid values: {0}")]
    InvalidValues(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::InvalidTemplate(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidValues(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TemplateFileMissing(PathBuf::from("carta.docx"));
        assert_eq!(err.to_string(), "Template file not found: carta.docx");

        let err = Error::EntryNotFound("word/document.xml".into());
        assert_eq!(err.to_string(), "Entry not found: word/document.xml");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: Error = zip::result::ZipError::InvalidArchive("bad header".into()).into();
        assert!(matches!(err, Error::InvalidTemplate(_)));

        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = zip::result::ZipError::Io(io_err).into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::InvalidValues(_)));
    }
}
