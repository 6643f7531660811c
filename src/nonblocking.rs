//! Async wrappers over the blocking operations.
//!
//! Work runs on tokio's blocking pool, so a caller can bound it with
//! `tokio::time::timeout` without stalling its executor.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::model::{TagSet, ValueMap};
use crate::SubstitutionReport;

/// Extract the tags of a template file without blocking the executor.
pub async fn extract_tags_async(path: impl Into<PathBuf>) -> Result<TagSet> {
    let path = path.into();
    tokio::task::spawn_blocking(move || crate::extract_tags(path))
        .await
        .map_err(|e| Error::Other(format!("tag extraction task failed: {}", e)))?
}

/// Fill a template without blocking the executor.
pub async fn substitute_async(
    path: impl Into<PathBuf>,
    values: ValueMap,
    output: impl Into<PathBuf>,
) -> Result<SubstitutionReport> {
    let path = path.into();
    let output = output.into();
    tokio::task::spawn_blocking(move || crate::substitute(path, &values, output))
        .await
        .map_err(|e| Error::Other(format!("substitution task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
    }

    fn template() -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<w:document><w:body><w:p><w:r><w:t>{{nombre}}</w:t></w:r></w:p></w:body></w:document>")
            .unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_tags_async() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plantilla.docx");
        std::fs::write(&path, template()).unwrap();

        let tags = runtime().block_on(extract_tags_async(path)).unwrap();
        assert_eq!(tags.into_vec(), vec!["nombre"]);
    }

    #[test]
    fn test_substitute_async_with_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plantilla.docx");
        let output = dir.path().join("salida.docx");
        std::fs::write(&path, template()).unwrap();

        let values: ValueMap = [("nombre", "Ana")].into_iter().collect();
        let report = runtime()
            .block_on(async {
                tokio::time::timeout(
                    std::time::Duration::from_secs(30),
                    substitute_async(path, values, output.clone()),
                )
                .await
            })
            .unwrap()
            .unwrap();

        assert_eq!(report.replacements, 1);
        assert!(output.exists());
    }

    #[test]
    fn test_extract_tags_async_missing() {
        let result = runtime().block_on(extract_tags_async("/no/such/plantilla.docx"));
        assert!(matches!(result, Err(Error::TemplateFileMissing(_))));
    }
}
