//! Plain-text reader with encoding detection by trial decoding.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use relay_core::{Error, ExtractedDocument, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reader for plain-text files of unknown encoding.
///
/// Candidate encodings are tried in order and the first one that decodes the
/// whole file without a malformed sequence wins.
pub struct TextReader {
    encodings: Vec<&'static Encoding>,
}

impl TextReader {
    /// Create a reader from encoding labels such as `utf-8` or `shift_jis`.
    /// Unknown labels are ignored.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let encodings = labels
            .iter()
            .filter_map(|label| {
                let label = label.as_ref();
                let encoding = Encoding::for_label(label.as_bytes());
                if encoding.is_none() {
                    log::warn!("Ignoring unknown text encoding '{}'", label);
                }
                encoding
            })
            .collect();
        Self { encodings }
    }

    /// Encodings that will be tried, in order.
    pub fn encodings(&self) -> &[&'static Encoding] {
        &self.encodings
    }

    /// Decode the file and append its lines to `doc`.
    ///
    /// Returns `Error::EncodingUndetected` when no candidate fits.
    pub fn read_into(&self, bytes: &[u8], doc: &mut ExtractedDocument) -> Result<()> {
        let (encoding, text) = self.decode(bytes).ok_or(Error::EncodingUndetected)?;
        log::debug!("Decoded '{}' as {}", doc.source_name, encoding.name());
        doc.push_text(text.trim());
        Ok(())
    }

    /// Decode with the first candidate that accepts the bytes.
    pub fn decode(&self, bytes: &[u8]) -> Option<(&'static Encoding, String)> {
        self.encodings
            .iter()
            .find_map(|&encoding| decode_strict(encoding, bytes).map(|text| (encoding, text)))
    }
}

/// Decode without replacement characters. UTF-16 honours a byte order mark
/// and otherwise assumes the candidate's own byte order.
fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let (encoding, body) = if encoding == UTF_16LE || encoding == UTF_16BE {
        match Encoding::for_bom(bytes) {
            Some((bom_encoding, bom_len)) if bom_encoding == UTF_16LE || bom_encoding == UTF_16BE => {
                (bom_encoding, &bytes[bom_len..])
            }
            _ => (encoding, bytes),
        }
    } else if encoding == UTF_8 {
        (encoding, bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
    } else {
        (encoding, bytes)
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
}
