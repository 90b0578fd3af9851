//! The three slide templates (title, index, content) and the shape writer
//! they share.

use quick_xml::escape::escape;
use relay_core::{ContentSlide, DeckText, IndexEntry};

use crate::theme::{self, Frame, TextStyle};

const NAMESPACES: &str = "xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
     xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" \
     xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\"";

/// Bullet placed before every content item.
pub const ITEM_BULLET: &str = "■ ";

/// Accumulates shapes for one slide and serializes it.
struct SlideXml {
    background: &'static str,
    shapes: String,
    next_id: u32,
}

impl SlideXml {
    fn new(background: &'static str) -> Self {
        // Id 1 belongs to the shape tree itself.
        Self {
            background,
            shapes: String::new(),
            next_id: 2,
        }
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Text box with one paragraph per entry of `paragraphs`.
    fn text_box<S: AsRef<str>>(&mut self, paragraphs: &[S], frame: Frame, style: TextStyle) {
        let id = self.take_id();
        let mut body = String::new();

        for text in paragraphs {
            body.push_str(&format!(
                "<a:p><a:pPr algn=\"{}\"/><a:r><a:rPr lang=\"ja-JP\" sz=\"{}\" b=\"{}\" dirty=\"0\">\
                 <a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r></a:p>",
                style.align.as_attr(),
                style.size_pt * 100,
                if style.bold { 1 } else { 0 },
                style.color,
                escape(text.as_ref())
            ));
        }
        if paragraphs.is_empty() {
            body.push_str("<a:p/>");
        }

        self.shapes.push_str(&format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"TextBox {id}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>\
             <p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>\
             <p:txBody><a:bodyPr wrap=\"square\" rtlCol=\"0\"/><a:lstStyle/>{}</p:txBody></p:sp>",
            frame.xfrm(),
            body,
            id = id
        ));
    }

    /// Borderless filled shape with a preset geometry (`rect`, `ellipse`).
    fn filled_shape(&mut self, geometry: &str, frame: Frame, color: &str) {
        let id = self.take_id();
        self.shapes.push_str(&format!(
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"Shape {id}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>\
             <p:spPr>{}<a:prstGeom prst=\"{}\"><a:avLst/></a:prstGeom>\
             <a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill><a:ln><a:noFill/></a:ln></p:spPr></p:sp>",
            frame.xfrm(),
            geometry,
            color,
            id = id
        ));
    }

    /// Wordmark with the red dot beside its last letter.
    fn brand_mark(&mut self, mark: &str) {
        self.text_box(
            &[mark],
            Frame::new(8.6, 0.2, 1.0, 0.5),
            TextStyle::new(28, theme::CHARCOAL).bold(),
        );
        self.filled_shape("ellipse", Frame::new(9.34, 0.48, 0.12, 0.12), theme::RED);
    }

    fn finish(self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <p:sld {}><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>\
             <p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>\
             <p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/><a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>\
             {}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>",
            NAMESPACES, self.background, self.shapes
        )
    }
}

/// Opening slide: deck title, greeting and generation date.
pub fn title_slide(deck: &DeckText, generated_at: &str) -> String {
    let mut slide = SlideXml::new(theme::CHARCOAL);

    slide.filled_shape("rect", Frame::new(0.0, 0.0, 0.2, theme::SLIDE_HEIGHT_IN), theme::RED);

    let title: Vec<&str> = deck.title.lines().collect();
    slide.text_box(
        &title,
        Frame::new(0.6, 2.0, 9.0, 2.5),
        TextStyle::new(44, theme::WHITE).bold(),
    );

    let greeting: Vec<&str> = deck.greeting.lines().collect();
    slide.text_box(&greeting, Frame::new(0.6, 4.5, 8.5, 2.0), TextStyle::new(16, theme::WHITE));

    slide.text_box(
        &[format!("生成日: {}", generated_at)],
        Frame::new(0.6, 6.8, 9.0, 0.4),
        TextStyle::new(12, theme::WHITE),
    );

    slide.finish()
}

/// Index slide listing every non-empty category with its full item count.
pub fn index_slide(deck: &DeckText, entries: &[IndexEntry]) -> String {
    let mut slide = SlideXml::new(theme::WHITE);

    slide.brand_mark(&deck.brand_mark);
    slide.text_box(
        &[deck.index_heading.as_str()],
        Frame::new(0.5, 0.5, 8.0, 1.0),
        TextStyle::new(28, theme::CHARCOAL).bold(),
    );
    slide.filled_shape("rect", Frame::new(0.5, 1.3, 9.0, 0.02), theme::RED);

    let lines: Vec<String> = entries.iter().map(IndexEntry::label).collect();
    slide.text_box(&lines, Frame::new(0.8, 1.8, 8.5, 5.0), TextStyle::new(20, theme::CHARCOAL));

    slide.finish()
}

/// Paragraphs of a content slide body: bulleted items, then the note.
pub fn content_lines(content: &ContentSlide) -> Vec<String> {
    content
        .items
        .iter()
        .map(|item| format!("{}{}", ITEM_BULLET, item.text))
        .chain(content.truncation_note.iter().cloned())
        .collect()
}

/// One category: heading, item list and source citation.
pub fn content_slide(deck: &DeckText, content: &ContentSlide) -> String {
    let mut slide = SlideXml::new(theme::WHITE);

    slide.brand_mark(&deck.brand_mark);
    slide.text_box(
        &[content.category.as_str()],
        Frame::new(0.5, 0.4, 8.0, 0.8),
        TextStyle::new(28, theme::CHARCOAL).bold(),
    );
    slide.filled_shape("rect", Frame::new(0.5, 1.1, 4.0, 0.03), theme::RED);

    slide.text_box(
        &content_lines(content),
        Frame::new(0.6, 1.6, 8.8, 5.0),
        TextStyle::new(14, theme::BODY_TEXT),
    );
    slide.text_box(
        &[content.citation()],
        Frame::new(3.5, 7.0, 6.0, 0.3),
        TextStyle::new(9, theme::CITATION).right(),
    );

    slide.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::ClassifiedItem;

    fn sample_content(note: Option<&str>) -> ContentSlide {
        ContentSlide {
            category: "発生した課題".to_string(),
            items: vec![
                ClassifiedItem::new("障害 <A> & 復旧", "ops.txt"),
                ClassifiedItem::new("遅延が発生", "plan.xlsx"),
            ],
            truncated_count: note.map_or(0, |_| 3),
            truncation_note: note.map(str::to_string),
            cited_sources: vec!["ops.txt".to_string(), "plan.xlsx".to_string()],
        }
    }

    #[test]
    fn test_content_lines_order_and_note() {
        let lines = content_lines(&sample_content(Some("（他 3 件）")));
        assert_eq!(lines, vec!["■ 障害 <A> & 復旧", "■ 遅延が発生", "（他 3 件）"]);

        let lines = content_lines(&sample_content(None));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_content_slide_escapes_text() {
        let xml = content_slide(&DeckText::default(), &sample_content(None));

        assert!(xml.contains("■ 障害 &lt;A&gt; &amp; 復旧"));
        assert!(xml.contains("Source: ops.txt, plan.xlsx"));
        assert!(xml.contains("algn=\"r\""));
        assert!(!xml.contains("<A>"));
    }

    #[test]
    fn test_shape_ids_unique() {
        let xml = content_slide(&DeckText::default(), &sample_content(None));
        for id in 2..=7 {
            assert_eq!(xml.matches(&format!("id=\"{}\" name=", id)).count(), 1);
        }
        assert!(!xml.contains("id=\"8\" name="));
    }

    #[test]
    fn test_title_slide_texts() {
        let xml = title_slide(&DeckText::default(), "2026年10月16日 09:30");

        assert!(xml.contains("<a:t>Project Relay</a:t>"));
        assert!(xml.contains("<a:t>統合報告レポート</a:t>"));
        assert!(xml.contains("<a:t>生成日: 2026年10月16日 09:30</a:t>"));
        assert!(xml.contains("<a:srgbClr val=\"333333\"/></a:solidFill><a:effectLst/>"));
    }

    #[test]
    fn test_index_slide_without_entries_is_well_formed() {
        let xml = index_slide(&DeckText::default(), &[]);
        assert!(xml.contains("<a:t>目次 / Index</a:t>"));
        assert!(xml.contains("<a:p/>"));
    }
}
