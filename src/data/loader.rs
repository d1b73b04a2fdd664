// ============================================================
// Layer 4: Log Loader
// ============================================================
// Finds log files and streams their lines.
//
//   LogDirLoader  - every regular `*.log` file directly inside a
//                   directory (no recursion), sorted by path so
//                   repeated runs see the same order
//   LineReader    - iterator over the lines of any BufRead,
//                   one String per line, never the whole file
//
// Lines are split on '\n' and decoded as UTF-8 with invalid
// sequences replaced, so a stray byte never aborts a run and
// both vectorizer passes decode a line identically.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::domain::traits::LogSource;

/// Extension of the files an aggregation run picks up
pub const LOG_EXTENSION: &str = "log";

/// Lists `*.log` files from a single directory.
pub struct LogDirLoader {
    dir: PathBuf,
}

impl LogDirLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LogSource for LogDirLoader {
    fn log_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir.display()))?
        {
            let entry = entry?;
            let path  = entry.path();

            // file_type() does not follow symlinks; metadata() does
            let is_file = fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false);

            if is_file && path.extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION) {
                files.push(path);
            }
        }

        files.sort();
        tracing::debug!("Found {} log files in '{}'", files.len(), self.dir.display());
        Ok(files)
    }
}

/// Open a file for line-by-line reading
pub fn open_lines(path: &Path) -> io::Result<LineReader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(LineReader::new(BufReader::new(file)))
}

// ─── LineReader ───────────────────────────────────────────────────────────────
/// Streams lines out of a reader without buffering the whole input.
/// The trailing '\n' is stripped; nothing else is.
pub struct LineReader<R> {
    reader: R,
    buf:    Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
