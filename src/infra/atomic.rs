// ============================================================
// Layer 6: Atomic File Writer
// ============================================================
// Writes go to `<dest>.tmp`; commit() flushes, syncs and renames
// the temporary file over `<dest>`. A reader of `<dest>` sees
// either the previous content or the complete new content.
//
// Dropping an AtomicFile without committing removes the
// temporary file and leaves `<dest>` untouched.

use anyhow::{anyhow, Context, Result};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct AtomicFile {
    dest:     PathBuf,
    tmp_path: PathBuf,
    writer:   Option<BufWriter<File>>,
}

impl AtomicFile {
    /// Start a replacement of `dest`
    pub fn create(dest: impl Into<PathBuf>) -> Result<Self> {
        let dest     = dest.into();
        let tmp_path = temp_path_for(&dest)?;
        let file     = File::create(&tmp_path)
            .with_context(|| format!("Cannot create '{}'", tmp_path.display()))?;

        Ok(Self {
            dest,
            tmp_path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Make the written content visible at the destination path
    pub fn commit(mut self) -> Result<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| anyhow!("'{}' already committed", self.dest.display()))?;

        let file = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("Cannot flush '{}'", self.tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Cannot sync '{}'", self.tmp_path.display()))?;

        fs::rename(&self.tmp_path, &self.dest).with_context(|| {
            format!(
                "Cannot rename '{}' to '{}'",
                self.tmp_path.display(),
                self.dest.display()
            )
        })?;
        Ok(())
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "atomic file already committed"))
    }
}

impl Write for AtomicFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl Drop for AtomicFile {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            drop(writer);
            if let Err(e) = fs::remove_file(&self.tmp_path) {
                tracing::debug!("Cannot remove '{}': {}", self.tmp_path.display(), e);
            }
        }
    }
}

fn temp_path_for(dest: &Path) -> Result<PathBuf> {
    let name = dest
        .file_name()
        .ok_or_else(|| anyhow!("'{}' has no file name", dest.display()))?;
    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    Ok(dest.with_file_name(tmp_name))
}
