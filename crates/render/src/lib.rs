//! PPTX writer for slide plans.
//!
//! A plan is rendered as a title slide, an index slide and one content slide
//! per category, in plan order, using a fixed corporate theme.

mod package;
pub mod slides;
pub mod theme;

use chrono::NaiveDateTime;
use relay_core::{ReportConfig, Result, SlidePlan};

/// MIME type of the generated deck.
pub const PPTX_MIME: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Suggested download name, e.g. `IIJ_Project_Relay_20261016_093000.pptx`.
pub fn suggested_file_name(config: &ReportConfig, generated_at: NaiveDateTime) -> String {
    format!(
        "{}_{}.pptx",
        config.deck.file_prefix,
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Renders slide plans to `.pptx` bytes.
pub struct DeckRenderer<'a> {
    config: &'a ReportConfig,
}

impl<'a> DeckRenderer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    /// Slide XML for every slide of the deck, in presentation order.
    pub fn slide_parts(&self, plan: &SlidePlan, generated_at: NaiveDateTime) -> Vec<String> {
        let deck = &self.config.deck;
        let date = generated_at.format("%Y年%m月%d日 %H:%M").to_string();

        let mut parts = Vec::with_capacity(plan.slide_count());
        parts.push(slides::title_slide(deck, &date));
        parts.push(slides::index_slide(deck, &plan.index));
        parts.extend(plan.content.iter().map(|content| slides::content_slide(deck, content)));
        parts
    }

    /// Render the plan into a complete presentation package.
    pub fn render(&self, plan: &SlidePlan, generated_at: NaiveDateTime) -> Result<Vec<u8>> {
        let parts = self.slide_parts(plan, generated_at);
        log::info!("Rendering deck with {} slides", parts.len());
        package::write_package(&parts)
    }
}
