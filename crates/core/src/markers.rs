//! Structural marker lines shared by the extractors and the classifier.
//!
//! Extractors interleave these with content so a reader of the raw text can
//! see where each slide, sheet or page begins. The classifier recognises them
//! by prefix and never classifies them.

/// Prefix of slide, sheet and page boundary markers.
pub const BOUNDARY_PREFIX: &str = "---";

/// Prefix of the source-attribution header.
pub const SOURCE_PREFIX: &str = "【出典";

/// Placeholder emitted when a text file matches no candidate encoding.
pub const ENCODING_PLACEHOLDER: &str = "（文字コードを特定できませんでした）";

/// Source-attribution header, always the first line of a document.
pub fn source_header(source_name: &str) -> String {
    format!("{}：{}】", SOURCE_PREFIX, source_name)
}

/// 1-based slide boundary.
pub fn slide_marker(number: usize) -> String {
    format!("{} スライド {} ---", BOUNDARY_PREFIX, number)
}

/// Worksheet boundary, keyed by sheet name.
pub fn sheet_marker(name: &str) -> String {
    format!("{} シート: {} ---", BOUNDARY_PREFIX, name)
}

/// 1-based PDF page boundary.
pub fn page_marker(number: usize) -> String {
    format!("{} ページ {} ---", BOUNDARY_PREFIX, number)
}

/// Diagnostic line recorded in place of content that failed to extract.
pub fn diagnostic_line(detail: &str) -> String {
    format!("（読み込みエラー: {}）", detail)
}

/// Whether a trimmed line is a marker rather than content.
pub fn is_marker(trimmed: &str) -> bool {
    trimmed.starts_with(BOUNDARY_PREFIX) || trimmed.starts_with(SOURCE_PREFIX)
}
