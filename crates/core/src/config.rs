//! Report configuration: the category taxonomy, its keywords, and the
//! fixed deck texts.
//!
//! A `ReportConfig` is built once (from `Default` or a JSON file) and passed
//! by reference to the classifier, the layout engine and the renderer. Nothing
//! mutates it after construction.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::{Error, Result};

/// Name of the catch-all bucket for unmatched lines.
pub const OVERFLOW_CATEGORY: &str = "その他・参考情報";

/// One category of the taxonomy and the keywords that route lines into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Display name, also the bucket key.
    pub name: String,

    /// Icon shown next to the category in summaries.
    #[serde(default)]
    pub icon: String,

    /// Substrings that select this category (case-sensitive).
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: &str, icon: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            icon: icon.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Whether any keyword occurs in the line.
    pub fn matches(&self, line: &str) -> bool {
        self.keywords.iter().any(|kw| line.contains(kw.as_str()))
    }
}

/// Fixed texts printed on the generated deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckText {
    /// Title slide heading; may span several lines.
    pub title: String,
    /// Title slide body text.
    pub greeting: String,
    /// Index slide heading.
    pub index_heading: String,
    /// Wordmark drawn in the corner of index and content slides.
    pub brand_mark: String,
    /// Prefix of the suggested output file name.
    pub file_prefix: String,
}

impl Default for DeckText {
    fn default() -> Self {
        Self {
            title: "Project Relay\n統合報告レポート".to_string(),
            greeting: "各部門資料から抽出された最新のステータスを統合しました。\n\
                       IIJブランドに準拠したフォーマットで整理しております。"
                .to_string(),
            index_heading: "目次 / Index".to_string(),
            brand_mark: "IIJ".to_string(),
            file_prefix: "IIJ_Project_Relay".to_string(),
        }
    }
}

/// Complete configuration of a report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Categories in taxonomy order; earlier categories win ties.
    pub categories: Vec<CategoryRule>,

    /// Name of the bucket for unmatched lines.
    pub overflow_category: String,

    /// Icon for the overflow bucket.
    pub overflow_icon: String,

    /// Maximum items shown on one content slide.
    pub slide_cap: usize,

    /// Unmatched lines of at most this many characters are dropped as noise.
    pub noise_threshold: usize,

    /// First number used on the index slide.
    pub index_start: usize,

    /// Candidate encodings for plain-text files, tried in order.
    pub text_encodings: Vec<String>,

    /// Fixed deck texts.
    pub deck: DeckText,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            categories: default_taxonomy(),
            overflow_category: OVERFLOW_CATEGORY.to_string(),
            overflow_icon: "📎".to_string(),
            slide_cap: 10,
            noise_threshold: 5,
            index_start: 1,
            text_encodings: ["utf-8", "shift_jis", "utf-16", "latin1"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            deck: DeckText::default(),
        }
    }
}

impl ReportConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-slide item cap.
    pub fn with_slide_cap(mut self, cap: usize) -> Self {
        self.slide_cap = cap.max(1); // At least 1 item per slide
        self
    }

    /// Replace the candidate text encodings.
    pub fn with_encodings<I, S>(mut self, encodings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_encodings = encodings.into_iter().map(Into::into).collect();
        self
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the classifier and layout rely on.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(Error::ConfigError("taxonomy has no categories".to_string()));
        }
        if self.slide_cap == 0 {
            return Err(Error::ConfigError("slide_cap must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        for rule in &self.categories {
            if !seen.insert(rule.name.as_str()) {
                return Err(Error::ConfigError(format!(
                    "duplicate category '{}'",
                    rule.name
                )));
            }
            if rule.keywords.iter().any(|k| k.is_empty()) {
                return Err(Error::ConfigError(format!(
                    "category '{}' has an empty keyword",
                    rule.name
                )));
            }
        }
        if seen.contains(self.overflow_category.as_str()) {
            return Err(Error::ConfigError(format!(
                "overflow category '{}' collides with a taxonomy category",
                self.overflow_category
            )));
        }

        Ok(())
    }

    /// Icon for a category name, falling back to a generic document icon.
    pub fn icon_for(&self, category: &str) -> &str {
        if category == self.overflow_category {
            return &self.overflow_icon;
        }
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.icon.as_str())
            .filter(|icon| !icon.is_empty())
            .unwrap_or("📄")
    }
}

/// The built-in monthly-report taxonomy.
fn default_taxonomy() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "今月の成果",
            "🏆",
            &[
                "成果", "達成", "完了", "リリース", "ローンチ", "公開", "獲得", "受注",
                "契約", "成功", "実施", "完成", "提供", "展開", "運用開始",
            ],
        ),
        CategoryRule::new(
            "数値指標",
            "📊",
            &[
                "売上", "収益", "利益", "コスト", "費用", "予算", "KPI", "目標", "達成率",
                "前月比", "前年比", "増加", "減少", "%", "万円", "千件", "PV", "CVR",
                "ROI", "CPA", "CPC", "クリック率", "転換率", "件数", "数",
            ],
        ),
        CategoryRule::new(
            "発生した課題",
            "⚠️",
            &[
                "課題", "問題", "障害", "遅延", "バグ", "エラー", "リスク", "懸念",
                "未達", "不足", "改善が必要", "検討が必要", "対応中", "調査中",
                "ペンディング",
            ],
        ),
        CategoryRule::new(
            "次月の予定",
            "📅",
            &[
                "予定", "計画", "スケジュール", "来月", "次月", "今後", "方針", "施策",
                "実施予定", "リリース予定", "検討予定", "対応予定", "目標設定",
            ],
        ),
    ]
}
