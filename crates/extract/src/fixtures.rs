//! In-memory document builders for tests.
//!
//! Enabled for this crate's own tests and, through the `fixtures` feature,
//! for downstream test suites. Builders write to memory only and panic if
//! the writer fails.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const RELS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Minimal slide XML with one text shape per entry; each entry's lines
/// become separate paragraphs.
pub fn slide_xml(shapes: &[&[&str]]) -> String {
    let mut body = String::new();
    for paragraphs in shapes {
        body.push_str("<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Text\"/></p:nvSpPr><p:txBody><a:bodyPr/>");
        for text in *paragraphs {
            body.push_str(&format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", text));
        }
        body.push_str("</p:txBody></p:sp>");
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         <p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>",
        body
    )
}

/// Build a PPTX archive whose presentation lists `slides` in the given
/// order. Each slide is `(file number, slide xml)`.
pub fn build_pptx(slides: &[(usize, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    let mut rels = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">");
    let mut ids = String::new();
    for (n, (file_no, xml)) in slides.iter().enumerate() {
        let rid = format!("rId{}", n + 10);
        rels.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"{}/slide\" Target=\"slides/slide{}.xml\"/>",
            rid, RELS_NS, file_no
        ));
        ids.push_str(&format!("<p:sldId id=\"{}\" r:id=\"{}\"/>", 256 + n, rid));

        zip.start_file(format!("ppt/slides/slide{}.xml", file_no), options)
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    rels.push_str(&format!(
        "<Relationship Id=\"rId1\" Type=\"{}/slideMaster\" Target=\"slideMasters/slideMaster1.xml\"/>",
        RELS_NS
    ));
    rels.push_str("</Relationships>");

    zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
    zip.write_all(rels.as_bytes()).unwrap();

    let presentation = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <p:presentation xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" xmlns:r=\"{}\">\
         <p:sldIdLst>{}</p:sldIdLst></p:presentation>",
        RELS_NS, ids
    );
    zip.start_file("ppt/presentation.xml", options).unwrap();
    zip.write_all(presentation.as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

/// One cell of a typed workbook fixture.
#[derive(Debug, Clone, Copy)]
pub enum CellValue<'a> {
    /// Numbers are written as numeric cells, anything else as an inline string.
    Text(&'a str),
    /// Serial date shown with the built-in short date format.
    Date(f64),
    Bool(bool),
}

fn cell_xml(reference: &str, value: &CellValue) -> String {
    match value {
        CellValue::Text(text) => match text.parse::<f64>() {
            Ok(_) => format!("<c r=\"{}\"><v>{}</v></c>", reference, text),
            Err(_) => format!(
                "<c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                reference, text
            ),
        },
        CellValue::Date(serial) => format!("<c r=\"{}\" s=\"1\"><v>{}</v></c>", reference, serial),
        CellValue::Bool(flag) => format!(
            "<c r=\"{}\" t=\"b\"><v>{}</v></c>",
            reference,
            if *flag { 1 } else { 0 }
        ),
    }
}

const STYLES_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
     <styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
     <fonts count=\"1\"><font><sz val=\"11\"/><name val=\"Calibri\"/></font></fonts>\
     <fills count=\"1\"><fill><patternFill patternType=\"none\"/></fill></fills>\
     <borders count=\"1\"><border/></borders>\
     <cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>\
     <cellXfs count=\"2\">\
     <xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/>\
     <xf numFmtId=\"14\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\" applyNumberFormat=\"1\"/>\
     </cellXfs></styleSheet>";

/// Build a workbook from `(sheet name, rows)`; empty strings are blank cells.
pub fn build_xlsx(sheets: &[(&str, Vec<Vec<&str>>)]) -> Vec<u8> {
    let typed: Vec<(&str, Vec<Vec<CellValue>>)> = sheets
        .iter()
        .map(|(name, rows)| {
            let rows = rows
                .iter()
                .map(|row| row.iter().map(|text| CellValue::Text(*text)).collect())
                .collect();
            (*name, rows)
        })
        .collect();
    build_typed_xlsx(&typed)
}

/// Like [`build_xlsx`], with dates and booleans. Empty text cells are blank.
pub fn build_typed_xlsx(sheets: &[(&str, Vec<Vec<CellValue>>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    let mut content_types = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
         <Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>",
    );
    let mut workbook_sheets = String::new();
    let mut workbook_rels = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    );

    for (idx, (name, rows)) in sheets.iter().enumerate() {
        let n = idx + 1;
        content_types.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            n
        ));
        workbook_sheets.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            name, n, n
        ));
        workbook_rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
            n, n
        ));

        let mut sheet_data = String::new();
        for (r, row) in rows.iter().enumerate() {
            sheet_data.push_str(&format!("<row r=\"{}\">", r + 1));
            for (c, value) in row.iter().enumerate() {
                if matches!(value, CellValue::Text("")) {
                    continue;
                }
                let column = (b'A' + c as u8) as char;
                sheet_data.push_str(&cell_xml(&format!("{}{}", column, r + 1), value));
            }
            sheet_data.push_str("</row>");
        }
        let sheet = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
             <sheetData>{}</sheetData></worksheet>",
            sheet_data
        );
        zip.start_file(format!("xl/worksheets/sheet{}.xml", n), options)
            .unwrap();
        zip.write_all(sheet.as_bytes()).unwrap();
    }
    content_types.push_str("</Types>");
    workbook_rels.push_str(
        "<Relationship Id=\"rIdStyles\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>\
         </Relationships>",
    );

    let workbook = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
         <sheets>{}</sheets></workbook>",
        workbook_sheets
    );
    let root_rels = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>\
         </Relationships>";

    for (path, body) in [
        ("[Content_Types].xml", content_types.as_str()),
        ("_rels/.rels", root_rels),
        ("xl/workbook.xml", workbook.as_str()),
        ("xl/_rels/workbook.xml.rels", workbook_rels.as_str()),
        ("xl/styles.xml", STYLES_XML),
    ] {
        zip.start_file(path, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// Build a PDF with one page per entry; `None` produces a page without
/// any text operators.
pub fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let operations = match page {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Build a one-page PDF whose text is set in a Type0 font with Identity-H
/// encoding, the way CJK text is usually embedded. Each distinct character
/// gets its own two-byte CID and a ToUnicode entry.
pub fn build_cid_pdf(text: &str) -> Vec<u8> {
    let mut chars: Vec<char> = Vec::new();
    let mut codes: Vec<u8> = Vec::new();
    for ch in text.chars() {
        let cid = match chars.iter().position(|c| *c == ch) {
            Some(i) => i + 1,
            None => {
                chars.push(ch);
                chars.len()
            }
        };
        codes.extend_from_slice(&(cid as u16).to_be_bytes());
    }

    let mut bfchar = String::new();
    for (i, ch) in chars.iter().enumerate() {
        let mut utf16 = [0u16; 2];
        let unicode: String = ch
            .encode_utf16(&mut utf16)
            .iter()
            .map(|unit| format!("{:04X}", unit))
            .collect();
        bfchar.push_str(&format!("<{:04X}> <{}>\n", i + 1, unicode));
    }
    let cmap = format!(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n\
         {} beginbfchar\n{}endbfchar\n\
         endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\nend\n",
        chars.len(),
        bfchar
    );

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, cmap.into_bytes()));
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => "HeiseiMin-W3",
        "Flags" => 4,
        "FontBBox" => vec![0.into(), (-200).into(), 1000.into(), 900.into()],
        "ItalicAngle" => 0,
        "Ascent" => 880,
        "Descent" => -120,
        "CapHeight" => 700,
        "StemV" => 80,
    });
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType0",
        "BaseFont" => "HeiseiMin-W3",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Japan1"),
            "Supplement" => 2,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 1000,
    });
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "HeiseiMin-W3",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![cid_font_id.into()],
        "ToUnicode" => to_unicode_id,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::String(codes, StringFormat::Hexadecimal)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
