//! Storage for generated decks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use relay_core::{Error, Result};

/// A deck kept in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedReport {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

/// Somewhere finished decks can be kept and listed again.
pub trait ReportArchive {
    /// Store a deck under `name`, replacing any deck of the same name.
    fn store(&self, bytes: &[u8], name: &str) -> Result<ArchivedReport>;

    /// All stored decks, newest first.
    fn list(&self) -> Result<Vec<ArchivedReport>>;
}

/// Archive backed by a plain directory of `.pptx` files.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(path: PathBuf) -> Result<ArchivedReport> {
        let metadata = fs::metadata(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ArchivedReport {
            name,
            path,
            modified: metadata.modified()?,
            size: metadata.len(),
        })
    }
}

fn is_deck(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pptx"))
        .unwrap_or(false)
}

impl ReportArchive for DirectoryArchive {
    fn store(&self, bytes: &[u8], name: &str) -> Result<ArchivedReport> {
        // Only the final component is used so a name cannot escape the root.
        let file_name = Path::new(name).file_name().ok_or_else(|| {
            Error::IoError(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid report name: {:?}", name),
            ))
        })?;

        fs::create_dir_all(&self.root)?;
        let path = self.root.join(file_name);
        fs::write(&path, bytes)?;
        log::debug!("Archived {} bytes to {}", bytes.len(), path.display());

        Self::entry(path)
    }

    fn list(&self) -> Result<Vec<ArchivedReport>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && is_deck(&path) {
                reports.push(Self::entry(path)?);
            }
        }

        reports.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
        Ok(reports)
    }
}
