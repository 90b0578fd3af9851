//! Uploads backed by files on disk.

use relay_core::UploadedFile;
use std::fs;
use std::io;
use std::path::PathBuf;

/// A file on disk presented as an upload. The upload name is the file name
/// without its directory.
#[derive(Debug, Clone)]
pub struct FileUpload {
    path: PathBuf,
    name: String,
}

impl FileUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self { path, name }
    }
}

impl UploadedFile for FileUpload {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_bytes(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}
