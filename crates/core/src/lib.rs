//! Core domain types, keyword classification, and slide layout
//! for Project Relay report generation.

pub mod classify;
pub mod config;
pub mod error;
pub mod layout;
pub mod markers;
pub mod types;

pub use classify::{CategoryBuckets, Classifier};
pub use config::{CategoryRule, DeckText, ReportConfig};
pub use error::{Error, Result};
pub use layout::{ContentSlide, IndexEntry, LayoutEngine, SlidePlan};
pub use types::{ClassifiedItem, ExtractedDocument, InMemoryUpload, SourceFormat, UploadedFile};
