//! PPTX (Office Open XML) reader.
//!
//! A .pptx file is a ZIP archive of XML parts. Slides are read in
//! presentation order and every non-empty text-shape paragraph becomes one
//! line, preceded by a slide marker when the slide has any text.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use relay_core::{markers, Error, ExtractedDocument, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Reader for PPTX (Office Open XML) files.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Read slide text into `doc`. Slides parsed before a failure stay in `doc`.
    pub fn read_into(&self, bytes: &[u8], doc: &mut ExtractedDocument) -> Result<()> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("PPTX '{}' has {} slides", doc.source_name, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let content = read_file_from_archive(&mut archive, slide_path)?;
            let paragraphs = extract_paragraphs(&content)?;

            if paragraphs.is_empty() {
                continue;
            }
            doc.push_line(markers::slide_marker(idx + 1));
            for paragraph in paragraphs {
                doc.push_line(paragraph);
            }
        }

        Ok(())
    }

    /// Get the ordered list of slide part paths.
    ///
    /// The slide id list in presentation.xml is authoritative; when it is
    /// missing or unresolvable, slides are ordered by the number in their
    /// relationship id or file name.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let relationships = parse_slide_relationships(&rels_content)?;

        let listed_ids = match read_file_from_archive(archive, PRESENTATION_PATH) {
            Ok(content) => parse_slide_id_list(&content)?,
            Err(e) => {
                log::warn!("Falling back to relationship order: {}", e);
                Vec::new()
            }
        };

        let by_id: HashMap<&str, &str> = relationships
            .iter()
            .map(|(id, target)| (id.as_str(), target.as_str()))
            .collect();
        let ordered: Vec<String> = listed_ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()))
            .map(|target| resolve_target(target))
            .collect();

        if !ordered.is_empty() {
            return Ok(ordered);
        }

        let mut slides: Vec<(String, Option<usize>)> = relationships
            .iter()
            .map(|(id, target)| {
                let order_num = extract_slide_number(target).or_else(|| extract_slide_number(id));
                (resolve_target(target), order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect `(Id, Target)` for every slide relationship.
fn parse_slide_relationships(xml: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut slides = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let rel_type = attribute(e, b"Type").unwrap_or_default();
                if rel_type.ends_with("/slide") {
                    let id = attribute(e, b"Id").unwrap_or_default();
                    let target = attribute(e, b"Target").unwrap_or_default();
                    slides.push((id, target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Collect the relationship ids of `<p:sldId>` entries in presentation order.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // The relationship id is the namespaced `r:id`, not the numeric `id`.
                let rel_id = e.attributes().flatten().find_map(|attr| {
                    let key = attr.key.as_ref();
                    (key != b"id" && local_name(key) == b"id")
                        .then(|| String::from_utf8_lossy(&attr.value).to_string())
                });
                if let Some(rel_id) = rel_id {
                    ids.push(rel_id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Extract trimmed, non-empty paragraph texts from a slide, in shape order.
///
/// Only text bodies of shapes sitting directly in the slide's shape tree
/// (`p:spTree/p:sp/p:txBody`) count. Shapes inside group shapes or
/// `mc:AlternateContent` blocks are skipped, and table cells in graphic
/// frames are not text shapes.
fn extract_paragraphs(xml_content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml_content);
    let mut paragraphs = Vec::new();

    // Local names of the currently open elements.
    let mut open: Vec<Vec<u8>> = Vec::new();
    // Depth of the open top-level shape, if any.
    let mut shape_depth: Option<usize> = None;
    let mut in_text_body = false;
    let mut in_paragraph = false;
    let mut in_run_text = false;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.name().as_ref()).to_vec();
                match (name.as_slice(), shape_depth) {
                    (b"sp", None) if open.last().map(Vec::as_slice) == Some(b"spTree".as_slice()) => {
                        shape_depth = Some(open.len());
                    }
                    (b"txBody", Some(depth)) if open.len() == depth + 1 => in_text_body = true,
                    (b"p", Some(_)) if in_text_body => {
                        in_paragraph = true;
                        current_text.clear();
                    }
                    (b"t", Some(_)) if in_paragraph => in_run_text = true,
                    _ => {}
                }
                open.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                if in_paragraph && local_name(e.name().as_ref()) == b"br" {
                    current_text.push(' ');
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_run_text {
                    let text = e
                        .unescape()
                        .map_err(|err| Error::XmlError(format!("Bad slide text: {}", err)))?;
                    current_text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                open.pop();
                match local_name(e.name().as_ref()) {
                    b"sp" if shape_depth == Some(open.len()) => {
                        shape_depth = None;
                        in_text_body = false;
                    }
                    b"txBody" => in_text_body = false,
                    b"p" if in_paragraph => {
                        in_paragraph = false;
                        let text = current_text.trim();
                        if !text.is_empty() {
                            paragraphs.push(text.to_string());
                        }
                        current_text.clear();
                    }
                    b"t" => in_run_text = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Read a file from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Value of an attribute matched by local name.
fn attribute(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == name)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Turn a relationship target into an archive path.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
