//! Shared fixtures: small DOCX packages built in memory.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

/// Bytes that are not valid UTF-8 and not a valid image either.
pub const MEDIA: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0xfe, 0x00, 0x7b, 0x7b];

/// A text run with bold formatting.
pub fn run(text: &str) -> String {
    format!(
        r#"<w:r><w:rPr><w:b/><w:sz w:val="24"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        text
    )
}

/// A paragraph made of one run per text piece.
pub fn paragraph(pieces: &[&str]) -> String {
    let runs: String = pieces.iter().map(|p| run(p)).collect();
    format!(r#"<w:p><w:pPr><w:spacing w:after="120"/></w:pPr>{}</w:p>"#, runs)
}

/// Wrap paragraphs in a document body.
pub fn document(paragraphs: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#,
        paragraphs.concat()
    )
}

/// Wrap paragraphs in a header or footer part.
pub fn part(root: &str, paragraphs: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{root} xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:{root}>"#,
        paragraphs.concat()
    )
}

/// Builds a zip package entry by entry.
pub struct PackageBuilder {
    entries: Vec<(String, Vec<u8>, CompressionMethod)>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A package with a content-types manifest and the given body.
    pub fn docx(body: &str) -> Self {
        Self::new()
            .entry(
                "[Content_Types].xml",
                CONTENT_TYPES.as_bytes(),
                CompressionMethod::Deflated,
            )
            .entry("word/document.xml", body.as_bytes(), CompressionMethod::Deflated)
    }

    pub fn entry(mut self, name: &str, data: &[u8], method: CompressionMethod) -> Self {
        self.entries.push((name.to_string(), data.to_vec(), method));
        self
    }

    pub fn text(self, name: &str, xml: &str) -> Self {
        self.entry(name, xml.as_bytes(), CompressionMethod::Deflated)
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data, method) in self.entries {
            zip.start_file(name, SimpleFileOptions::default().compression_method(method))
                .unwrap();
            zip.write_all(&data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn write_to(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

/// The scenario letter: a body, a header, a footer and an image.
pub fn letter() -> PackageBuilder {
    PackageBuilder::docx(&document(&[
        paragraph(&["Estimado {{nombre}}, usted cursa {{curso}}."]),
        paragraph(&["Fecha: ", "{{fe", "cha}}"]),
        paragraph(&["Sin etiquetas en este párrafo."]),
    ]))
    .text(
        "word/header1.xml",
        &part("hdr", &[paragraph(&["Colegio {{colegio}}"])]),
    )
    .text(
        "word/footer1.xml",
        &part("ftr", &[paragraph(&["Página 1"])]),
    )
    .text(
        "word/styles.xml",
        r#"<w:styles><w:style w:styleId="{{notATag}}"/></w:styles>"#,
    )
    .entry("word/media/image1.png", MEDIA, CompressionMethod::Stored)
}

/// Names and decompressed contents of every entry, in archive order.
pub fn entries(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

/// Decompressed content of one entry.
pub fn entry(data: &[u8], name: &str) -> Vec<u8> {
    entries(data)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, content)| content)
        .unwrap_or_else(|| panic!("no entry {}", name))
}

/// Text of an entry with markup removed.
pub fn visible_text(data: &[u8], name: &str) -> String {
    let xml = String::from_utf8(entry(data, name)).unwrap();
    docfill::markup::strip_tags(&xml)
}
