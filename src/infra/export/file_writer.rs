// Writes finished exports to disk and reports where they landed and how
// big they are, so the caller can decide between upload and local-path
// reply.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct WrittenFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

pub struct ExportWriter {
    export_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn write(&self, filename: &str, contents: &[u8]) -> Result<WrittenFile> {
        std::fs::create_dir_all(&self.export_dir)
            .with_context(|| format!("creating export dir {}", self.export_dir.display()))?;

        let path = self.export_dir.join(filename);
        std::fs::write(&path, contents)
            .with_context(|| format!("writing export file {}", path.display()))?;

        Ok(WrittenFile {
            size_bytes: contents.len() as u64,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_and_reports_size() {
        let dir = tempdir().unwrap();
        let writer = ExportWriter::new(dir.path().join("nested"));

        let written = writer.write("export.txt", b"twelve bytes").unwrap();
        assert_eq!(written.size_bytes, 12);
        assert_eq!(std::fs::read(written.path).unwrap(), b"twelve bytes");
    }
}
