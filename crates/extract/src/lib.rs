//! Format readers that turn uploaded office documents into source-tagged
//! text lines.
//!
//! Each file is extracted in isolation: a malformed file yields a diagnostic
//! line in its own output and never stops the rest of the batch.

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod pdf;
pub mod pptx;
pub mod text;
pub mod xlsx;

pub use pdf::PdfReader;
pub use pptx::PptxReader;
pub use text::TextReader;
pub use xlsx::XlsxReader;

use relay_core::{markers, Error, ExtractedDocument, ReportConfig, Result, SourceFormat, UploadedFile};
use std::panic::{self, AssertUnwindSafe};

/// Result of extracting a single file.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// Every part of the file was read.
    Ok(ExtractedDocument),

    /// Reading stopped early; `document` holds what was read plus the
    /// diagnostic line.
    Partial {
        document: ExtractedDocument,
        diagnostic: String,
    },

    /// The upload itself could not be read; no document was produced.
    Failed { source_name: String, error: Error },
}

impl ExtractionOutcome {
    /// The extracted document, if any.
    pub fn document(&self) -> Option<&ExtractedDocument> {
        match self {
            Self::Ok(document) | Self::Partial { document, .. } => Some(document),
            Self::Failed { .. } => None,
        }
    }
}

/// Documents produced from a batch of uploads, plus the diagnostic log.
#[derive(Debug, Default)]
pub struct BatchExtraction {
    /// One document per readable upload of a supported format, in upload order.
    pub documents: Vec<ExtractedDocument>,

    /// Human-readable log, one or more entries per file.
    pub logs: Vec<String>,
}

/// Dispatches uploads to the reader for their format.
pub struct Extractor {
    pptx: PptxReader,
    xlsx: XlsxReader,
    pdf: PdfReader,
    text: TextReader,
}

impl Extractor {
    /// Create an extractor using the configured text encodings.
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            pptx: PptxReader::new(),
            xlsx: XlsxReader::new(),
            pdf: PdfReader::new(),
            text: TextReader::new(&config.text_encodings),
        }
    }

    /// Extract every upload in order. Unsupported files are skipped with a
    /// log entry.
    pub fn extract_batch<U: UploadedFile>(&self, uploads: &[U]) -> BatchExtraction {
        let mut batch = BatchExtraction::default();

        for upload in uploads {
            let name = upload.name();
            let format = match SourceFormat::detect(name) {
                Ok(format) => format,
                Err(e) => {
                    log::info!("Skipping '{}': {}", name, e);
                    batch.logs.push(format!("⏭  スキップ: {}（非対応フォーマット）", name));
                    continue;
                }
            };

            batch.logs.push(format!("📄  {} を読み込み中...", name));

            match self.extract_file(upload, format) {
                ExtractionOutcome::Ok(document) => {
                    batch.logs.push(format!("✅  {} の読み込み完了", name));
                    batch.documents.push(document);
                }
                ExtractionOutcome::Partial {
                    document,
                    diagnostic,
                } => {
                    batch
                        .logs
                        .push(format!("⚠  {} の一部を読み込めませんでした: {}", name, diagnostic));
                    batch.documents.push(document);
                }
                ExtractionOutcome::Failed { error, .. } => {
                    batch.logs.push(format!("❌  {} の読み込みに失敗: {}", name, error));
                }
            }
        }

        batch
    }

    /// Extract one upload of a known format.
    pub fn extract_file<U: UploadedFile + ?Sized>(&self, upload: &U, format: SourceFormat) -> ExtractionOutcome {
        let source_name = upload.name().to_string();

        let bytes = match upload.read_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to read upload '{}': {}", source_name, e);
                return ExtractionOutcome::Failed {
                    source_name,
                    error: Error::IoError(e),
                };
            }
        };

        let mut document = ExtractedDocument::new(source_name);
        match self.read_guarded(format, &bytes, &mut document) {
            Ok(()) => ExtractionOutcome::Ok(document),
            Err(error) => {
                log::warn!(
                    "{} extraction of '{}' stopped early: {}",
                    format.label(),
                    document.source_name,
                    error
                );
                let diagnostic = diagnostic_for(&error);
                document.push_line(diagnostic.clone());
                ExtractionOutcome::Partial {
                    document,
                    diagnostic,
                }
            }
        }
    }

    /// Run the reader for `format`, turning a parser panic into an error so
    /// one hostile file cannot take down the batch.
    fn read_guarded(&self, format: SourceFormat, bytes: &[u8], document: &mut ExtractedDocument) -> Result<()> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| match format {
            SourceFormat::Pptx => self.pptx.read_into(bytes, document),
            SourceFormat::Xlsx => self.xlsx.read_into(bytes, document),
            SourceFormat::Pdf => self.pdf.read_into(bytes, document),
            SourceFormat::Text => self.text.read_into(bytes, document),
        }));

        result.unwrap_or_else(|payload| {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "parser panicked".to_string());
            Err(Error::ExtractionError(detail))
        })
    }
}

/// The line recorded in a document in place of content that failed to read.
fn diagnostic_for(error: &Error) -> String {
    match error {
        Error::EncodingUndetected => markers::ENCODING_PLACEHOLDER.to_string(),
        other => markers::diagnostic_line(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::InMemoryUpload;
    use std::io;

    struct UnreadableUpload;

    impl UploadedFile for UnreadableUpload {
        fn name(&self) -> &str {
            "locked.txt"
        }

        fn read_bytes(&self) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        }
    }

    fn extractor() -> Extractor {
        Extractor::new(&ReportConfig::default())
    }

    #[test]
    fn test_unsupported_file_skipped() {
        let uploads = vec![
            InMemoryUpload::new("data.csv", "売上,100".as_bytes()),
            InMemoryUpload::new("memo.txt", "売上が増加しました".as_bytes()),
        ];

        let batch = extractor().extract_batch(&uploads);

        assert_eq!(batch.documents.len(), 1);
        assert_eq!(batch.documents[0].source_name, "memo.txt");
        assert_eq!(
            batch.logs,
            vec![
                "⏭  スキップ: data.csv（非対応フォーマット）",
                "📄  memo.txt を読み込み中...",
                "✅  memo.txt の読み込み完了",
            ]
        );
    }

    #[test]
    fn test_dispatch_is_case_insensitive() {
        let uploads = vec![InMemoryUpload::new("MEMO.TXT", "hello there".as_bytes())];
        let batch = extractor().extract_batch(&uploads);
        assert_eq!(batch.documents[0].lines, vec!["【出典：MEMO.TXT】", "hello there"]);
    }

    #[test]
    fn test_corrupted_file_yields_diagnostic_and_batch_continues() {
        let uploads = vec![
            InMemoryUpload::new("broken.pdf", b"not a pdf at all".to_vec()),
            InMemoryUpload::new("deck.pptx", b"not a zip either".to_vec()),
            InMemoryUpload::new("memo.txt", "障害が発生しました".as_bytes()),
        ];

        let batch = extractor().extract_batch(&uploads);

        assert_eq!(batch.documents.len(), 3);
        let pdf = &batch.documents[0];
        assert_eq!(pdf.lines.len(), 2);
        assert!(pdf.lines[1].starts_with("（読み込みエラー: PDF parsing error"));
        assert!(batch.documents[1].lines[1].starts_with("（読み込みエラー: ZIP error"));
        assert_eq!(batch.documents[2].lines[1], "障害が発生しました");
        assert!(batch.logs[1].starts_with("⚠  broken.pdf の一部を読み込めませんでした"));
    }

    #[test]
    fn test_undetected_encoding_uses_placeholder() {
        let config = ReportConfig::default().with_encodings(["utf-8"]);
        let upload = InMemoryUpload::new("odd.txt", vec![0xFF, 0xFE, 0xFD]);

        let outcome = Extractor::new(&config).extract_file(&upload, SourceFormat::Text);

        match outcome {
            ExtractionOutcome::Partial {
                document,
                diagnostic,
            } => {
                assert_eq!(diagnostic, markers::ENCODING_PLACEHOLDER);
                assert_eq!(
                    document.lines,
                    vec!["【出典：odd.txt】", markers::ENCODING_PLACEHOLDER]
                );
            }
            other => panic!("expected partial outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_upload_fails_without_document() {
        let ex = extractor();
        let outcome = ex.extract_file(&UnreadableUpload, SourceFormat::Text);
        assert!(matches!(outcome, ExtractionOutcome::Failed { .. }));
        assert!(outcome.document().is_none());

        let batch = ex.extract_batch(&[UnreadableUpload]);
        assert!(batch.documents.is_empty());
        assert!(batch.logs[1].starts_with("❌  locked.txt の読み込みに失敗"));
    }

    #[test]
    fn test_mixed_formats_in_upload_order() {
        let pptx = fixtures::build_pptx(&[(1, fixtures::slide_xml(&[&["新サービスをリリース"]]))]);
        let xlsx = fixtures::build_xlsx(&[("Sheet1", vec![vec!["来月", "展示会の予定"]])]);
        let uploads: Vec<Box<dyn UploadedFile>> = vec![
            Box::new(InMemoryUpload::new("b.xlsx", xlsx)),
            Box::new(InMemoryUpload::new("a.pptx", pptx)),
        ];

        let batch = extractor().extract_batch(&uploads);

        let names: Vec<&str> = batch.documents.iter().map(|d| d.source_name.as_str()).collect();
        assert_eq!(names, vec!["b.xlsx", "a.pptx"]);
        assert_eq!(
            batch.documents[0].lines,
            vec!["【出典：b.xlsx】", "--- シート: Sheet1 ---", "来月 | 展示会の予定"]
        );
        assert_eq!(
            batch.documents[1].lines,
            vec!["【出典：a.pptx】", "--- スライド 1 ---", "新サービスをリリース"]
        );
    }
}
