//! Report pipeline, deck archive and file-system uploads behind the
//! `relay-report` command.

pub mod archive;
pub mod pipeline;
pub mod upload;

pub use archive::{ArchivedReport, DirectoryArchive, ReportArchive};
pub use pipeline::{generate_report, GeneratedReport, ReportStats};
pub use upload::FileUpload;
