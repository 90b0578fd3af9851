//! Domain types for uploaded files and the text extracted from them.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::markers;

/// An uploaded file handed to the pipeline by the caller.
///
/// Any upload adapter (a file on disk, a request body, a test fixture) can
/// implement this; the core only ever reads the name and the bytes.
pub trait UploadedFile {
    /// The original file name, including its extension.
    fn name(&self) -> &str;

    /// Read the full file contents.
    fn read_bytes(&self) -> io::Result<Vec<u8>>;
}

impl<T: UploadedFile + ?Sized> UploadedFile for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        (**self).read_bytes()
    }
}

impl<T: UploadedFile + ?Sized> UploadedFile for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        (**self).read_bytes()
    }
}

/// An upload whose bytes are already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryUpload {
    name: String,
    bytes: Vec<u8>,
}

impl InMemoryUpload {
    /// Create an upload from a file name and its contents.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl UploadedFile for InMemoryUpload {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// The format of an uploaded source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// PowerPoint presentation (Office Open XML).
    Pptx,
    /// Excel workbook (Office Open XML).
    Xlsx,
    /// Portable Document Format.
    Pdf,
    /// Plain text in an unknown encoding.
    Text,
}

impl SourceFormat {
    /// Detect format from file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    /// Detect format from a file name such as `report.PDF`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Like [`SourceFormat::from_file_name`], failing with
    /// [`Error::UnsupportedFormat`] for anything that cannot be read.
    pub fn detect(name: &str) -> Result<Self> {
        Self::from_file_name(name).ok_or_else(|| Error::UnsupportedFormat(name.to_string()))
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pptx => "PPTX",
            Self::Xlsx => "XLSX",
            Self::Pdf => "PDF",
            Self::Text => "TXT",
        }
    }
}

/// Text extracted from one uploaded file.
///
/// The first line is always the source-attribution header; structural
/// markers (slide, sheet and page boundaries) are interleaved with content
/// lines in extraction order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Original file name the lines came from.
    pub source_name: String,

    /// Extracted lines, markers included.
    pub lines: Vec<String>,
}

impl ExtractedDocument {
    /// Start a document for the given source, seeded with its attribution header.
    pub fn new(source_name: impl Into<String>) -> Self {
        let source_name = source_name.into();
        let header = markers::source_header(&source_name);
        Self {
            source_name,
            lines: vec![header],
        }
    }

    /// Append a single line.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append every line of a multi-line block of text.
    pub fn push_text(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_string));
    }

    /// Lines that carry content, i.e. not blank and not a marker.
    pub fn content_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !markers::is_marker(l))
    }
}

/// A content line assigned to a category, tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    /// Trimmed line text.
    pub text: String,

    /// File name the line was extracted from.
    pub source_name: String,
}

impl ClassifiedItem {
    pub fn new(text: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_name: source_name.into(),
        }
    }
}
