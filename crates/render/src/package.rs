//! Static OOXML parts of a presentation package and the zip writer.

use std::io::{Cursor, Write};

use relay_core::{Error, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::theme::{emu, SLIDE_HEIGHT_IN, SLIDE_WIDTH_IN};

const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";

/// First slide id allowed by PresentationML.
const FIRST_SLIDE_ID: usize = 256;

fn relationships(entries: &[(String, &str, String)]) -> String {
    let mut xml = format!("{}<Relationships xmlns=\"{}\">", XML_DECL, REL_NS);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"{}/{}\" Target=\"{}\"/>",
            id, REL_TYPE_BASE, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        "{}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/ppt/presentation.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml\"/>\
         <Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml\"/>\
         <Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml\"/>\
         <Override PartName=\"/ppt/theme/theme1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>",
        XML_DECL
    );
    for n in 1..=slide_count {
        xml.push_str(&format!(
            "<Override PartName=\"/ppt/slides/slide{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.presentationml.slide+xml\"/>",
            n
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn presentation(slide_count: usize) -> String {
    let slide_ids: String = (1..=slide_count)
        .map(|n| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", FIRST_SLIDE_ID + n - 1, n + 1))
        .collect();

    format!(
        "{}<p:presentation xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"{}\" xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" saveSubsetFonts=\"1\">\
         <p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>\
         <p:sldIdLst>{}</p:sldIdLst>\
         <p:sldSz cx=\"{}\" cy=\"{}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/>\
         </p:presentation>",
        XML_DECL,
        REL_TYPE_BASE,
        slide_ids,
        emu(SLIDE_WIDTH_IN),
        emu(SLIDE_HEIGHT_IN)
    )
}

/// Master rel is rId1, slides are rId2.., theme comes last.
fn presentation_rels(slide_count: usize) -> String {
    let mut entries = vec![("rId1".to_string(), "slideMaster", "slideMasters/slideMaster1.xml".to_string())];
    for n in 1..=slide_count {
        entries.push((format!("rId{}", n + 1), "slide", format!("slides/slide{}.xml", n)));
    }
    entries.push((format!("rId{}", slide_count + 2), "theme", "theme/theme1.xml".to_string()));
    relationships(&entries)
}

const EMPTY_TREE: &str = "<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
     <p:grpSpPr/></p:spTree></p:cSld>";

fn slide_master() -> String {
    format!(
        "{}<p:sldMaster xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"{}\" xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">{}\
         <p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" \
         accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>\
         <p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>\
         </p:sldMaster>",
        XML_DECL, REL_TYPE_BASE, EMPTY_TREE
    )
}

fn slide_layout() -> String {
    format!(
        "{}<p:sldLayout xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:r=\"{}\" xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" type=\"blank\" preserve=\"1\">\
         {}<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
        XML_DECL,
        REL_TYPE_BASE,
        EMPTY_TREE.replace("<p:cSld>", "<p:cSld name=\"Blank\">")
    )
}

fn theme_part() -> String {
    let colors = [
        ("dk1", "000000"),
        ("lt1", "FFFFFF"),
        ("dk2", "333333"),
        ("lt2", "EEEEEE"),
        ("accent1", "D60036"),
        ("accent2", "333333"),
        ("accent3", "999999"),
        ("accent4", "5B6770"),
        ("accent5", "A5A5A5"),
        ("accent6", "7F7F7F"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ];
    let scheme: String = colors
        .iter()
        .map(|(slot, rgb)| format!("<a:{slot}><a:srgbClr val=\"{rgb}\"/></a:{slot}>"))
        .collect();
    let fill = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>";
    let line = "<a:ln w=\"6350\"><a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill></a:ln>";

    format!(
        "{decl}<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"Relay\"><a:themeElements>\
         <a:clrScheme name=\"Relay\">{scheme}</a:clrScheme>\
         <a:fontScheme name=\"Relay\"><a:majorFont><a:latin typeface=\"Arial\"/><a:ea typeface=\"Meiryo\"/><a:cs typeface=\"\"/></a:majorFont>\
         <a:minorFont><a:latin typeface=\"Arial\"/><a:ea typeface=\"Meiryo\"/><a:cs typeface=\"\"/></a:minorFont></a:fontScheme>\
         <a:fmtScheme name=\"Relay\"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>\
         <a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>\
         <a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>\
         <a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme>\
         </a:themeElements></a:theme>",
        decl = XML_DECL,
        scheme = scheme,
        fill = fill,
        line = line
    )
}

/// Zip the given slide parts, in order, into a complete `.pptx` package.
pub fn write_package(slides: &[String]) -> Result<Vec<u8>> {
    if slides.is_empty() {
        return Err(Error::RenderError("A deck needs at least one slide".to_string()));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let slide_count = slides.len();

    let layout_rel = relationships(&[(
        "rId1".to_string(),
        "slideLayout",
        "../slideLayouts/slideLayout1.xml".to_string(),
    )]);

    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".to_string(), content_types(slide_count)),
        (
            "_rels/.rels".to_string(),
            relationships(&[("rId1".to_string(), "officeDocument", "ppt/presentation.xml".to_string())]),
        ),
        ("ppt/presentation.xml".to_string(), presentation(slide_count)),
        ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels(slide_count)),
        ("ppt/slideMasters/slideMaster1.xml".to_string(), slide_master()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            relationships(&[
                ("rId1".to_string(), "slideLayout", "../slideLayouts/slideLayout1.xml".to_string()),
                ("rId2".to_string(), "theme", "../theme/theme1.xml".to_string()),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".to_string(), slide_layout()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            relationships(&[(
                "rId1".to_string(),
                "slideMaster",
                "../slideMasters/slideMaster1.xml".to_string(),
            )]),
        ),
        ("ppt/theme/theme1.xml".to_string(), theme_part()),
    ];

    for (i, slide) in slides.iter().enumerate() {
        let n = i + 1;
        parts.push((format!("ppt/slides/slide{}.xml", n), slide.clone()));
        parts.push((format!("ppt/slides/_rels/slide{}.xml.rels", n), layout_rel.clone()));
    }

    for (name, body) in &parts {
        zip.start_file(name.as_str(), options)
            .map_err(|e| Error::RenderError(format!("Failed to add {}: {}", name, e)))?;
        zip.write_all(body.as_bytes())?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| Error::RenderError(format!("Failed to finish package: {}", e)))?;
    log::debug!("Wrote package with {} slides and {} parts", slide_count, parts.len());
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_lists_every_slide() {
        let slides = vec!["<a/>".to_string(), "<b/>".to_string(), "<c/>".to_string()];
        let bytes = write_package(&slides).unwrap();

        let presentation = read_part(&bytes, "ppt/presentation.xml");
        assert!(presentation.contains("<p:sldId id=\"256\" r:id=\"rId2\"/>"));
        assert!(presentation.contains("<p:sldId id=\"258\" r:id=\"rId4\"/>"));
        assert!(presentation.contains("<p:sldSz cx=\"9144000\" cy=\"6858000\"/>"));

        let rels = read_part(&bytes, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains("Id=\"rId4\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" Target=\"slides/slide3.xml\""));
        assert!(rels.contains("Id=\"rId5\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme\""));

        assert_eq!(read_part(&bytes, "ppt/slides/slide2.xml"), "<b/>");
        assert!(read_part(&bytes, "[Content_Types].xml").contains("/ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_every_slide_has_layout_rel() {
        let bytes = write_package(&["<a/>".to_string(), "<b/>".to_string()]).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert!(archive.by_name("ppt/slides/_rels/slide1.xml.rels").is_ok());
        assert!(archive.by_name("ppt/slides/_rels/slide2.xml.rels").is_ok());
        assert!(archive.by_name("ppt/slides/slide3.xml").is_err());
    }

    #[test]
    fn test_empty_deck_is_render_error() {
        assert!(matches!(write_package(&[]), Err(Error::RenderError(_))));
    }
}
