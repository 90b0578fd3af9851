//! Keyword classification of extracted lines into the report taxonomy.
//!
//! Every content line ends up in exactly one place: the first taxonomy
//! category with a matching keyword, the overflow bucket, or nowhere (noise).

use serde::{Deserialize, Serialize};

use crate::{ClassifiedItem, ExtractedDocument, ReportConfig};

/// Where a single content line is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Index of the matching category in taxonomy order.
    Category(usize),
    /// No category matched but the line is long enough to keep.
    Overflow,
    /// No category matched and the line is too short to keep.
    Noise,
}

/// Items collected for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub items: Vec<ClassifiedItem>,
}

/// Classified items grouped by category.
///
/// Holds every taxonomy category in taxonomy order, even empty ones, followed
/// by the overflow bucket only when it has items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBuckets {
    buckets: Vec<Bucket>,
}

impl CategoryBuckets {
    /// All buckets in order.
    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    /// Buckets with at least one item, in order.
    pub fn non_empty(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter().filter(|b| !b.items.is_empty())
    }

    /// Items of a category, if the category exists.
    pub fn get(&self, name: &str) -> Option<&[ClassifiedItem]> {
        self.buckets
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.items.as_slice())
    }

    /// Category names in order.
    pub fn names(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.name.as_str()).collect()
    }

    /// Total number of classified items across all buckets.
    pub fn total_items(&self) -> usize {
        self.buckets.iter().map(|b| b.items.len()).sum()
    }

    /// Number of buckets that have items.
    pub fn non_empty_count(&self) -> usize {
        self.non_empty().count()
    }

    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }
}

/// First-match keyword classifier over a fixed taxonomy.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    config: &'a ReportConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Route one trimmed content line.
    pub fn classify_line(&self, line: &str) -> LineOutcome {
        match self.config.categories.iter().position(|c| c.matches(line)) {
            Some(idx) => LineOutcome::Category(idx),
            None if line.chars().count() > self.config.noise_threshold => LineOutcome::Overflow,
            None => LineOutcome::Noise,
        }
    }

    /// Classify every content line of every document, in upload order then
    /// line order.
    pub fn classify(&self, documents: &[ExtractedDocument]) -> CategoryBuckets {
        let mut buckets: Vec<Bucket> = self
            .config
            .categories
            .iter()
            .map(|c| Bucket {
                name: c.name.clone(),
                items: Vec::new(),
            })
            .collect();
        let mut overflow = Vec::new();
        let mut dropped = 0usize;

        for doc in documents {
            for line in doc.content_lines() {
                let item = || ClassifiedItem::new(line, doc.source_name.as_str());
                match self.classify_line(line) {
                    LineOutcome::Category(idx) => buckets[idx].items.push(item()),
                    LineOutcome::Overflow => overflow.push(item()),
                    LineOutcome::Noise => dropped += 1,
                }
            }
        }

        log::debug!(
            "Classified {} documents: {} overflow, {} dropped as noise",
            documents.len(),
            overflow.len(),
            dropped
        );

        if !overflow.is_empty() {
            buckets.push(Bucket {
                name: self.config.overflow_category.clone(),
                items: overflow,
            });
        }

        CategoryBuckets { buckets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryRule, OVERFLOW_CATEGORY};
    use crate::markers;

    fn doc(name: &str, lines: &[&str]) -> ExtractedDocument {
        let mut doc = ExtractedDocument::new(name);
        for line in lines {
            doc.push_line(*line);
        }
        doc
    }

    fn texts(buckets: &CategoryBuckets, name: &str) -> Vec<String> {
        buckets
            .get(name)
            .unwrap_or_default()
            .iter()
            .map(|i| i.text.clone())
            .collect()
    }

    #[test]
    fn test_basic_routing() {
        let config = ReportConfig::default();
        let docs = vec![doc(
            "memo.txt",
            &["売上が増加しました", "障害が発生しました", "hi"],
        )];

        let buckets = Classifier::new(&config).classify(&docs);

        assert_eq!(texts(&buckets, "数値指標"), vec!["売上が増加しました"]);
        assert_eq!(texts(&buckets, "発生した課題"), vec!["障害が発生しました"]);
        assert!(buckets.get(OVERFLOW_CATEGORY).is_none());
        assert_eq!(buckets.total_items(), 2);
        assert_eq!(buckets.non_empty_count(), 2);
    }

    #[test]
    fn test_first_match_wins() {
        let config = ReportConfig::default();
        // "リリース" selects 今月の成果, "予定" selects 次月の予定; the earlier category wins.
        let docs = vec![doc("a.txt", &["新機能のリリース予定を共有"])];

        let buckets = Classifier::new(&config).classify(&docs);

        assert_eq!(texts(&buckets, "今月の成果"), vec!["新機能のリリース予定を共有"]);
        assert!(buckets.get("次月の予定").unwrap().is_empty());
        assert_eq!(buckets.total_items(), 1);
    }

    #[test]
    fn test_keyword_order_does_not_matter() {
        let forward = ReportConfig {
            categories: vec![CategoryRule::new("A", "", &["alpha", "beta"])],
            ..ReportConfig::default()
        };
        let reversed = ReportConfig {
            categories: vec![CategoryRule::new("A", "", &["beta", "alpha"])],
            ..ReportConfig::default()
        };
        let docs = vec![doc("x.txt", &["beta then alpha", "only alpha here", "neither"])];

        let a = Classifier::new(&forward).classify(&docs);
        let b = Classifier::new(&reversed).classify(&docs);

        assert_eq!(a, b);
        assert_eq!(texts(&a, "A"), vec!["beta then alpha", "only alpha here"]);
    }

    #[test]
    fn test_noise_threshold() {
        let config = ReportConfig::default();
        let classifier = Classifier::new(&config);

        assert_eq!(classifier.classify_line("hello"), LineOutcome::Noise);
        assert_eq!(classifier.classify_line("hello!"), LineOutcome::Overflow);
        // Counted in characters, not bytes.
        assert_eq!(classifier.classify_line("あいうえお"), LineOutcome::Noise);
        assert_eq!(classifier.classify_line("あいうえおか"), LineOutcome::Overflow);
        // A short line that matches a keyword is still classified.
        assert_eq!(classifier.classify_line("数"), LineOutcome::Category(1));
    }

    #[test]
    fn test_markers_and_blanks_skipped() {
        let config = ReportConfig::default();
        let docs = vec![doc(
            "deck.pptx",
            &[markers::slide_marker(1).as_str(), "", "   ", "---- divider ----", "会議メモの共有事項"],
        )];

        let buckets = Classifier::new(&config).classify(&docs);

        assert_eq!(texts(&buckets, OVERFLOW_CATEGORY), vec!["会議メモの共有事項"]);
        assert_eq!(buckets.total_items(), 1);
    }

    #[test]
    fn test_order_and_attribution_across_documents() {
        let config = ReportConfig::default();
        let docs = vec![
            doc("first.txt", &["  受注が確定  ", "未分類の長いメモです"]),
            doc("second.txt", &["契約を締結", "別の未分類メモです"]),
        ];

        let buckets = Classifier::new(&config).classify(&docs);

        let wins = buckets.get("今月の成果").unwrap();
        assert_eq!(wins[0], ClassifiedItem::new("受注が確定", "first.txt"));
        assert_eq!(wins[1], ClassifiedItem::new("契約を締結", "second.txt"));

        assert_eq!(
            buckets.names(),
            vec!["今月の成果", "数値指標", "発生した課題", "次月の予定", OVERFLOW_CATEGORY]
        );
        assert_eq!(
            texts(&buckets, OVERFLOW_CATEGORY),
            vec!["未分類の長いメモです", "別の未分類メモです"]
        );
    }

    #[test]
    fn test_empty_input() {
        let config = ReportConfig::default();
        let buckets = Classifier::new(&config).classify(&[]);

        assert!(buckets.is_empty());
        assert_eq!(buckets.names().len(), 4);
        assert_eq!(buckets.non_empty_count(), 0);
    }
}
