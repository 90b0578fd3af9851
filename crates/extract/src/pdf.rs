//! PDF reader built on lopdf page text extraction, with a pdf-extract
//! pass for fonts lopdf cannot decode.

use std::panic;

use lopdf::Document;
use relay_core::{markers, Error, ExtractedDocument, Result};

/// What lopdf emits in place of text set in an Identity-H (CID) font.
/// Japanese PDFs almost always use such fonts.
const UNDECODED_RUN: &str = "?Identity-H Unimplemented?";

/// Reader for PDF documents.
///
/// Pages are visited in page order; pages without any text (scans, blank
/// separators) are skipped without a marker.
///
/// When lopdf cannot decode some text, the whole file is also run through
/// pdf-extract and whichever result carries more readable characters wins.
/// pdf-extract has no page boundaries, so its text is emitted as page 1.
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }

    /// Read page text into `doc`. Pages read before a failure stay in `doc`.
    pub fn read_into(&self, bytes: &[u8], doc: &mut ExtractedDocument) -> Result<()> {
        let document = Document::load_mem(bytes)
            .map_err(|e| Error::PdfParseError(format!("Failed to load PDF: {}", e)))?;

        let pages = document.get_pages();
        log::debug!("PDF '{}' has {} pages", doc.source_name, pages.len());

        let mut page_texts: Vec<(usize, String)> = Vec::with_capacity(pages.len());
        let mut undecoded = false;

        for (page_number, _page_id) in pages {
            let text = match document.extract_text(&[page_number]) {
                Ok(text) => text,
                Err(e) => {
                    push_pages(doc, &page_texts);
                    return Err(Error::PdfParseError(format!(
                        "Failed to extract page {}: {}",
                        page_number, e
                    )));
                }
            };

            if text.contains(UNDECODED_RUN) {
                undecoded = true;
            }
            let text = text.replace(UNDECODED_RUN, "");
            let text = text.trim();
            if text.is_empty() {
                log::debug!("Skipping page {} without text", page_number);
                continue;
            }
            page_texts.push((page_number as usize, text.to_string()));
        }

        if undecoded {
            log::debug!("PDF '{}' uses fonts lopdf cannot decode", doc.source_name);
            if let Some(text) = whole_text(bytes) {
                if prefer_whole_text(&page_texts, &text) {
                    log::info!("Using pdf-extract text for '{}'", doc.source_name);
                    push_pages(doc, &[(1, text.trim().to_string())]);
                    return Ok(());
                }
            }
        }

        push_pages(doc, &page_texts);
        Ok(())
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

fn push_pages(doc: &mut ExtractedDocument, pages: &[(usize, String)]) {
    for (page_number, text) in pages {
        doc.push_line(markers::page_marker(*page_number));
        doc.push_text(text);
    }
}

/// Whole-document text from pdf-extract, or `None` if it fails or panics.
fn whole_text(bytes: &[u8]) -> Option<String> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
        Ok(Ok(_)) => {
            log::debug!("pdf-extract returned no text");
            None
        }
        Ok(Err(e)) => {
            log::warn!("pdf-extract failed: {}", e);
            None
        }
        Err(_) => {
            log::warn!("pdf-extract panicked");
            None
        }
    }
}

fn readable_chars(text: &str) -> usize {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_ascii_punctuation())
        .count()
}

fn prefer_whole_text(pages: &[(usize, String)], whole: &str) -> bool {
    let per_page: usize = pages.iter().map(|(_, text)| readable_chars(text)).sum();
    readable_chars(whole) > per_page
}
