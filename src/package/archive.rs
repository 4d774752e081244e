// ABOUTME: In-memory ZIP writer for deployment bundles.
// ABOUTME: Adds single files and whole directory trees with deterministic ordering.

use std::io::{Cursor, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::PackageError;

pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// Add one file at `name` (forward slashes).
    pub fn add_file(
        &mut self,
        name: &str,
        contents: &[u8],
        executable: bool,
    ) -> Result<(), PackageError> {
        let mode = if executable { 0o755 } else { 0o644 };
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(mode);

        self.zip.start_file(name, options)?;
        self.zip.write_all(contents)?;
        self.entries += 1;
        tracing::trace!(name, bytes = contents.len(), "added archive entry");
        Ok(())
    }

    /// Add every file below `dir` under `prefix`, marked executable.
    pub fn add_executable_tree(&mut self, prefix: &str, dir: &Path) -> Result<(), PackageError> {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|_| PackageError::OutsideTree(entry.path().to_path_buf()))?;
            let mut name = prefix.trim_end_matches('/').to_string();
            for component in relative.components() {
                name.push('/');
                name.push_str(&component.as_os_str().to_string_lossy());
            }

            let contents = std::fs::read(entry.path())?;
            self.add_file(&name, &contents, true)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn finish(self) -> Result<Vec<u8>, PackageError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}
