//! Error types for report extraction and rendering.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting, rendering or configuring a report.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read an input.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file extension is not one of the accepted formats.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the PPTX file structure.
    #[error("PPTX parsing error: {0}")]
    PptxParseError(String),

    /// Failed to parse the XLSX workbook.
    #[error("XLSX parsing error: {0}")]
    XlsxParseError(String),

    /// Failed to load or read a PDF document.
    #[error("PDF parsing error: {0}")]
    PdfParseError(String),

    /// Failed to extract text from a document.
    #[error("Text extraction error: {0}")]
    ExtractionError(String),

    /// None of the candidate encodings decoded a text file cleanly.
    #[error("No candidate encoding could decode the text")]
    EncodingUndetected,

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// Failed to serialize the slide deck.
    #[error("Render error: {0}")]
    RenderError(String),

    /// Invalid report configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
