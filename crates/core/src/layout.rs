//! Slide layout: turns category buckets into a fixed-shape slide plan.
//!
//! The deck always opens with a title slide and an index slide, followed by
//! exactly one content slide per non-empty category. A category never spills
//! onto a second slide; items beyond the cap are summarised by one note.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{CategoryBuckets, ClassifiedItem, ReportConfig};

/// Number of fixed slides (title and index) preceding the content slides.
pub const FIXED_SLIDES: usize = 2;

/// One line of the index slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Sequential number starting at the configured offset.
    pub number: usize,
    pub category: String,
    /// Untruncated number of items in the category.
    pub item_count: usize,
}

impl IndexEntry {
    /// Text as printed on the index slide, e.g. `01.  数値指標 (3 items)`.
    pub fn label(&self) -> String {
        format!("{:02}.  {} ({} items)", self.number, self.category, self.item_count)
    }
}

/// The content slide of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSlide {
    pub category: String,

    /// At most `slide_cap` items, in classification order.
    pub items: Vec<ClassifiedItem>,

    /// Number of items left off the slide.
    pub truncated_count: usize,

    /// Summary line for the truncated items, present iff `truncated_count > 0`.
    pub truncation_note: Option<String>,

    /// Sorted, distinct sources of the displayed items only.
    pub cited_sources: Vec<String>,
}

impl ContentSlide {
    /// Citation footer text, e.g. `Source: a.pdf, b.xlsx`.
    pub fn citation(&self) -> String {
        format!("Source: {}", self.cited_sources.join(", "))
    }
}

/// The finished, ordered deck structure handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidePlan {
    pub index: Vec<IndexEntry>,
    pub content: Vec<ContentSlide>,
}

impl SlidePlan {
    /// Total slides including the title and index slides.
    pub fn slide_count(&self) -> usize {
        FIXED_SLIDES + self.content.len()
    }
}

/// Note printed below a truncated category.
pub fn truncation_note(remaining: usize) -> String {
    format!("（他 {} 件の情報を省略 — 元資料を確認してください）", remaining)
}

/// Builds slide plans from classified buckets.
#[derive(Debug, Clone, Copy)]
pub struct LayoutEngine<'a> {
    config: &'a ReportConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Lay out every non-empty bucket, preserving bucket order.
    pub fn plan(&self, buckets: &CategoryBuckets) -> SlidePlan {
        let cap = self.config.slide_cap.max(1);
        let mut index = Vec::new();
        let mut content = Vec::new();

        for (offset, bucket) in buckets.non_empty().enumerate() {
            let total = bucket.items.len();

            index.push(IndexEntry {
                number: self.config.index_start + offset,
                category: bucket.name.clone(),
                item_count: total,
            });

            let items: Vec<ClassifiedItem> = bucket.items.iter().take(cap).cloned().collect();
            let truncated_count = total.saturating_sub(cap);
            let cited_sources: Vec<String> = items
                .iter()
                .map(|i| i.source_name.as_str())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_string)
                .collect();

            if truncated_count > 0 {
                log::debug!(
                    "Category '{}' truncated: showing {} of {}",
                    bucket.name,
                    items.len(),
                    total
                );
            }

            content.push(ContentSlide {
                category: bucket.name.clone(),
                items,
                truncated_count,
                truncation_note: (truncated_count > 0).then(|| truncation_note(truncated_count)),
                cited_sources,
            });
        }

        SlidePlan { index, content }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classifier, ExtractedDocument};

    fn buckets_from(config: &ReportConfig, docs: &[(&str, Vec<String>)]) -> CategoryBuckets {
        let docs: Vec<ExtractedDocument> = docs
            .iter()
            .map(|(name, lines)| {
                let mut doc = ExtractedDocument::new(*name);
                for line in lines {
                    doc.push_line(line.as_str());
                }
                doc
            })
            .collect();
        Classifier::new(config).classify(&docs)
    }

    #[test]
    fn test_empty_buckets_give_fixed_slides_only() {
        let config = ReportConfig::default();
        let plan = LayoutEngine::new(&config).plan(&buckets_from(&config, &[]));

        assert!(plan.index.is_empty());
        assert!(plan.content.is_empty());
        assert_eq!(plan.slide_count(), 2);
    }

    #[test]
    fn test_truncation_at_cap() {
        let config = ReportConfig::default();
        let lines: Vec<String> = (1..=15).map(|i| format!("案件{}を受注", i)).collect();
        let plan = LayoutEngine::new(&config)
            .plan(&buckets_from(&config, &[("sales.xlsx", lines)]));

        assert_eq!(plan.slide_count(), 3);
        let slide = &plan.content[0];
        assert_eq!(slide.category, "今月の成果");
        assert_eq!(slide.items.len(), 10);
        assert_eq!(slide.items[0].text, "案件1を受注");
        assert_eq!(slide.items[9].text, "案件10を受注");
        assert_eq!(slide.truncated_count, 5);
        assert_eq!(
            slide.truncation_note.as_deref(),
            Some("（他 5 件の情報を省略 — 元資料を確認してください）")
        );
        assert_eq!(plan.index[0].item_count, 15);
    }

    #[test]
    fn test_no_note_at_exact_cap() {
        let config = ReportConfig::default().with_slide_cap(3);
        let lines: Vec<String> = (1..=3).map(|i| format!("契約{}件目", i)).collect();
        let plan = LayoutEngine::new(&config).plan(&buckets_from(&config, &[("a.txt", lines)]));

        assert_eq!(plan.content[0].items.len(), 3);
        assert_eq!(plan.content[0].truncated_count, 0);
        assert!(plan.content[0].truncation_note.is_none());
    }

    #[test]
    fn test_citations_cover_displayed_items_only() {
        let config = ReportConfig::default().with_slide_cap(2);
        let plan = LayoutEngine::new(&config).plan(&buckets_from(
            &config,
            &[
                ("zeta.txt", vec!["受注Aを獲得".to_string()]),
                ("alpha.txt", vec!["受注Bを獲得".to_string()]),
                ("hidden.txt", vec!["受注Cを獲得".to_string()]),
            ],
        ));

        let slide = &plan.content[0];
        assert_eq!(slide.cited_sources, vec!["alpha.txt", "zeta.txt"]);
        assert_eq!(slide.citation(), "Source: alpha.txt, zeta.txt");
        assert_eq!(slide.truncated_count, 1);
    }

    #[test]
    fn test_citations_and_items_kept_together() {
        let config = ReportConfig::default();
        let plan = LayoutEngine::new(&config).plan(&buckets_from(
            &config,
            &[
                ("b.txt", vec!["受注Aを獲得".to_string(), "障害が発生".to_string()]),
                ("a.txt", vec!["受注Bを獲得".to_string()]),
            ],
        ));

        assert_eq!(plan.content.len(), 2);
        for slide in &plan.content {
            let mut from_items: Vec<&str> =
                slide.items.iter().map(|i| i.source_name.as_str()).collect();
            from_items.sort_unstable();
            from_items.dedup();
            assert_eq!(slide.cited_sources, from_items);
        }
    }

    #[test]
    fn test_citations_deduplicated() {
        let config = ReportConfig::default();
        let plan = LayoutEngine::new(&config).plan(&buckets_from(
            &config,
            &[(
                "one.txt",
                vec!["受注Aを獲得".to_string(), "受注Bを獲得".to_string()],
            )],
        ));

        assert_eq!(plan.content[0].cited_sources, vec!["one.txt"]);
    }

    #[test]
    fn test_index_follows_taxonomy_with_overflow_last() {
        let config = ReportConfig::default();
        let plan = LayoutEngine::new(&config).plan(&buckets_from(
            &config,
            &[(
                "mix.txt",
                vec![
                    "来月の計画を策定".to_string(),
                    "どこにも当てはまらない行".to_string(),
                    "売上が増加".to_string(),
                ],
            )],
        ));

        let labels: Vec<String> = plan.index.iter().map(IndexEntry::label).collect();
        assert_eq!(
            labels,
            vec![
                "01.  数値指標 (1 items)",
                "02.  次月の予定 (1 items)",
                "03.  その他・参考情報 (1 items)",
            ]
        );
        assert_eq!(plan.slide_count(), 2 + 3);
    }

    #[test]
    fn test_index_start_offset() {
        let config = ReportConfig {
            index_start: 5,
            ..ReportConfig::default()
        };
        let plan = LayoutEngine::new(&config).plan(&buckets_from(
            &config,
            &[("a.txt", vec!["売上が増加".to_string()])],
        ));

        assert_eq!(plan.index[0].number, 5);
        assert_eq!(plan.index[0].label(), "05.  数値指標 (1 items)");
    }

    #[test]
    fn test_plan_is_deterministic() {
        let config = ReportConfig::default();
        let docs = [("a.txt", vec!["売上が増加".to_string(), "障害が発生した".to_string()])];

        let first = LayoutEngine::new(&config).plan(&buckets_from(&config, &docs));
        let second = LayoutEngine::new(&config).plan(&buckets_from(&config, &docs));

        assert_eq!(first, second);
    }
}
