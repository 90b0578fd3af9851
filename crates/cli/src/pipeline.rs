//! End-to-end report generation: extract, classify, lay out, render.

use chrono::NaiveDateTime;
use relay_core::{CategoryBuckets, Classifier, LayoutEngine, ReportConfig, Result, SlidePlan, UploadedFile};
use relay_extract::Extractor;
use relay_render::{suggested_file_name, DeckRenderer};

/// Headline numbers of one generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStats {
    /// Uploads that produced a document.
    pub files_read: usize,
    /// Items across all categories, before truncation.
    pub total_items: usize,
    /// Slides in the deck, including title and index.
    pub slide_count: usize,
}

/// A rendered deck together with everything computed on the way.
#[derive(Debug)]
pub struct GeneratedReport {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub buckets: CategoryBuckets,
    pub plan: SlidePlan,
    pub logs: Vec<String>,
    pub stats: ReportStats,
}

/// Run the whole pipeline over `uploads`.
///
/// Per-file failures only show up in `logs`; the only errors returned are
/// from serializing the deck.
pub fn generate_report<U: UploadedFile>(
    uploads: &[U],
    config: &ReportConfig,
    generated_at: NaiveDateTime,
) -> Result<GeneratedReport> {
    let batch = Extractor::new(config).extract_batch(uploads);
    let mut logs = batch.logs;

    let buckets = Classifier::new(config).classify(&batch.documents);
    logs.push(format!(
        "🗂  {} 件の情報を {} カテゴリに分類しました",
        buckets.total_items(),
        buckets.non_empty_count()
    ));

    let plan = LayoutEngine::new(config).plan(&buckets);
    logs.push(format!("🖼  スライド {} 枚を構成しました", plan.slide_count()));

    let stats = ReportStats {
        files_read: batch.documents.len(),
        total_items: buckets.total_items(),
        slide_count: plan.slide_count(),
    };
    log::info!(
        "Read {} files, classified {} items into {} slides",
        stats.files_read,
        stats.total_items,
        stats.slide_count
    );

    let bytes = DeckRenderer::new(config).render(&plan, generated_at)?;

    Ok(GeneratedReport {
        bytes,
        file_name: suggested_file_name(config, generated_at),
        buckets,
        plan,
        logs,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use relay_core::{ExtractedDocument, InMemoryUpload};
    use relay_extract::{fixtures, PptxReader};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(18, 45, 0)
            .unwrap()
    }

    fn run(uploads: &[InMemoryUpload]) -> GeneratedReport {
        generate_report(uploads, &ReportConfig::default(), at()).unwrap()
    }

    fn categories(plan: &SlidePlan) -> Vec<(&str, usize)> {
        plan.index
            .iter()
            .map(|e| (e.category.as_str(), e.item_count))
            .collect()
    }

    #[test]
    fn test_text_file_with_noise_line() {
        let uploads = vec![InMemoryUpload::new(
            "status.txt",
            "売上が増加しました\n障害が発生しました\nhi\n".as_bytes(),
        )];

        let report = run(&uploads);

        assert_eq!(report.stats.slide_count, 4);
        assert_eq!(report.stats.total_items, 2);
        assert_eq!(
            categories(&report.plan),
            vec![("数値指標", 1), ("発生した課題", 1)]
        );
        assert_eq!(report.file_name, "IIJ_Project_Relay_20261016_184500.pptx");
    }

    #[test]
    fn test_spreadsheet_truncated_at_cap() {
        let rows: Vec<String> = (1..=15).map(|i| format!("案件{}を受注しました", i)).collect();
        let sheet: Vec<Vec<&str>> = rows.iter().map(|r| vec![r.as_str()]).collect();
        let uploads = vec![InMemoryUpload::new(
            "results.xlsx",
            fixtures::build_xlsx(&[("実績", sheet)]),
        )];

        let report = run(&uploads);

        assert_eq!(categories(&report.plan), vec![("今月の成果", 15)]);
        let slide = &report.plan.content[0];
        assert_eq!(slide.items.len(), 10);
        assert_eq!(slide.items[0].text, "案件1を受注しました");
        assert_eq!(slide.items[9].text, "案件10を受注しました");
        assert_eq!(slide.truncated_count, 5);
        assert!(slide.truncation_note.as_deref().unwrap().contains("他 5 件"));
        assert_eq!(slide.cited_sources, vec!["results.xlsx"]);
    }

    #[test]
    fn test_unsupported_upload_is_skipped() {
        let uploads = vec![
            InMemoryUpload::new("numbers.csv", "売上,120%".as_bytes()),
            InMemoryUpload::new("memo.txt", "来月の展示会に出展予定".as_bytes()),
        ];

        let report = run(&uploads);

        assert_eq!(report.logs[0], "⏭  スキップ: numbers.csv（非対応フォーマット）");
        assert_eq!(report.stats.files_read, 1);
        assert_eq!(categories(&report.plan), vec![("次月の予定", 1)]);
        assert!(report
            .buckets
            .iter()
            .flat_map(|b| b.items.iter())
            .all(|item| item.source_name == "memo.txt"));
    }

    #[test]
    fn test_corrupted_pdf_does_not_stop_pipeline() {
        let uploads = vec![
            InMemoryUpload::new("broken.pdf", b"%PDF-1.7 garbage".to_vec()),
            InMemoryUpload::new("memo.txt", "新サービスをリリースしました".as_bytes()),
        ];

        let report = run(&uploads);

        assert_eq!(report.stats.files_read, 2);
        assert!(report.logs.iter().any(|l| l.starts_with("⚠  broken.pdf")));

        let issues = report.buckets.get("発生した課題").unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].source_name, "broken.pdf");
        assert!(issues[0].text.starts_with("（読み込みエラー:"));
        assert_eq!(report.buckets.get("今月の成果").unwrap().len(), 1);
    }

    #[test]
    fn test_nothing_categorizable_gives_title_and_index() {
        let uploads = vec![InMemoryUpload::new("short.txt", "ok\nyes\n".as_bytes())];
        let report = run(&uploads);

        assert_eq!(report.stats.slide_count, 2);
        assert!(report.plan.content.is_empty());
        assert_eq!(report.logs.last().unwrap(), "🖼  スライド 2 枚を構成しました");
    }

    #[test]
    fn test_same_input_same_plan() {
        let uploads = vec![
            InMemoryUpload::new(
                "deck.pptx",
                fixtures::build_pptx(&[(1, fixtures::slide_xml(&[&["KPI目標を達成", "障害対応中"]]))]),
            ),
            InMemoryUpload::new("memo.txt", "次月の計画を策定する\n".as_bytes()),
        ];

        let first = run(&uploads);
        let second = run(&uploads);

        assert_eq!(first.buckets, second.buckets);
        assert_eq!(first.plan, second.plan);
        assert_eq!(first.logs, second.logs);
        assert_eq!(first.file_name, second.file_name);
    }

    #[test]
    fn test_rendered_deck_reads_back_in_order() {
        let uploads = vec![InMemoryUpload::new(
            "status.txt",
            "売上が増加しました\n障害が発生しました\n遅延が続いています\n".as_bytes(),
        )];
        let report = run(&uploads);

        let mut doc = ExtractedDocument::new(report.file_name.as_str());
        PptxReader::new().read_into(&report.bytes, &mut doc).unwrap();
        let lines: Vec<&str> = doc.content_lines().collect();

        let position = |needle: &str| lines.iter().position(|l| *l == needle).unwrap();
        assert!(position("01.  数値指標 (1 items)") < position("02.  発生した課題 (2 items)"));
        assert!(position("■ 売上が増加しました") < position("■ 障害が発生しました"));
        assert!(position("■ 障害が発生しました") < position("■ 遅延が続いています"));
        assert!(lines.contains(&"Source: status.txt"));
        assert!(lines.contains(&"生成日: 2026年10月16日 18:45"));
        assert_eq!(
            doc.lines.iter().filter(|l| l.starts_with("--- スライド")).count(),
            report.stats.slide_count
        );
    }
}
