// ============================================================
// Layer 6: Vectorizer Artifact Store
// ============================================================
// Owns the output directory of a vectorizer run:
//
//   out_dir/
//     templates.json  ← [{ "id": 0, "tokens": ["<*>", "up"] }, ...]
//     meta.json       ← { "num_docs", "vocab_size", "templates" }
//     vectors.jsonl   ← one VectorRecord object per line
//
// Writes go through AtomicFile so a partially written artifact is
// never visible under its final name. Read paths serve consumers
// that inspect a finished run.
//
// Reference: Rust Book §12 (I/O and File Handling)
//            serde_json documentation

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use crate::data::loader::LineReader;
use crate::domain::{
    dictionary::TemplateDictionary,
    records::{ArtifactStatus, CorpusMeta, TemplateEntry, VectorBatch, VectorRecord},
};
use crate::infra::atomic::AtomicFile;

pub const TEMPLATES_FILE: &str = "templates.json";
pub const META_FILE: &str = "meta.json";
pub const VECTORS_FILE: &str = "vectors.jsonl";

/// Reads and writes the artifacts of one output directory.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the output directory (and parents) if missing
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create directory '{}'", self.dir.display()))
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    // ─── Writers ──────────────────────────────────────────────────────────────

    /// Write the template catalog in ID order
    pub fn write_catalog(&self, dictionary: &TemplateDictionary) -> Result<()> {
        let entries: Vec<TemplateEntry> = dictionary
            .iter()
            .map(|(id, template)| TemplateEntry::new(id, template))
            .collect();
        self.write_json(TEMPLATES_FILE, &entries)
    }

    pub fn write_meta(&self, meta: &CorpusMeta) -> Result<()> {
        self.write_json(META_FILE, meta)
    }

    /// Open the vector stream. Nothing is visible under
    /// `vectors.jsonl` until the returned file is committed.
    pub fn create_vectors(&self) -> Result<AtomicFile> {
        AtomicFile::create(self.path(VECTORS_FILE))
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        let path    = self.path(file);
        let mut out = AtomicFile::create(&path)?;
        serde_json::to_writer_pretty(&mut out, value)
            .with_context(|| format!("Cannot serialise '{}'", path.display()))?;
        out.write_all(b"\n")?;
        out.commit()?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }

    // ─── Readers ──────────────────────────────────────────────────────────────

    pub fn read_meta(&self) -> Result<CorpusMeta> {
        let path = self.path(META_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'. Has 'vectorize' been run?", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Malformed '{}'", path.display()))
    }

    /// Whether all three artifacts exist, plus the metadata if readable
    pub fn status(&self) -> ArtifactStatus {
        let built = [TEMPLATES_FILE, META_FILE, VECTORS_FILE]
            .iter()
            .all(|f| self.path(f).exists());

        let meta = if built {
            match self.read_meta() {
                Ok(meta) => Some(meta),
                Err(e) => {
                    tracing::warn!("{:#}", e);
                    None
                }
            }
        } else {
            None
        };

        ArtifactStatus { built, meta }
    }

    /// Vector records at physical lines `[offset, offset + limit)`
    /// of `vectors.jsonl`. Blank lines in the window are skipped.
    pub fn read_vectors(&self, offset: u64, limit: u64) -> Result<VectorBatch> {
        let path  = self.path(VECTORS_FILE);
        let lines = open_reader(&path)?;

        let mut data = Vec::new();
        for (n, line) in lines.skip(offset as usize).take(limit as usize).enumerate() {
            let line = line.with_context(|| format!("Cannot read '{}'", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let record: VectorRecord = serde_json::from_str(&line).with_context(|| {
                format!("'{}' line {}: malformed record", path.display(), offset + n as u64 + 1)
            })?;
            data.push(record);
        }

        let total = self.read_meta().ok().map(|m| m.num_docs);

        Ok(VectorBatch {
            start: offset,
            end: offset + data.len() as u64,
            total,
            data,
        })
    }
}

fn open_reader(path: &Path) -> Result<LineReader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Cannot open '{}'", path.display()))?;
    Ok(LineReader::new(BufReader::new(file)))
}

/// Append one record to a JSON-lines stream
pub fn write_jsonl_record<W: Write>(w: &mut W, record: &VectorRecord) -> Result<()> {
    serde_json::to_writer(&mut *w, record)?;
    w.write_all(b"\n")?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::{Template, TemplateId};
    use tempfile::TempDir;

    fn write_vectors(store: &ArtifactStore, n: u64) {
        let mut out = store.create_vectors().unwrap();
        for i in 0..n {
            let r = VectorRecord::resolved(i, "-".into(), TemplateId::new(0), 0.5, 1);
            write_jsonl_record(&mut out, &r).unwrap();
        }
        out.commit().unwrap();
    }

    #[test]
    fn test_catalog_and_meta_round_trip() {
        let dir   = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());

        let mut d = TemplateDictionary::new();
        d.assign(Template::from_canonical("<*> up"));
        d.assign(Template::from_canonical(""));
        store.write_catalog(&d).unwrap();
        store.write_meta(&CorpusMeta::new(5, 2)).unwrap();

        let json = fs::read_to_string(store.path(TEMPLATES_FILE)).unwrap();
        let catalog: Vec<TemplateEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].tokens, vec!["<*>", "up"]);
        assert!(catalog[1].tokens.is_empty());
        assert_eq!(store.read_meta().unwrap(), CorpusMeta::new(5, 2));
    }

    #[test]
    fn test_status_requires_all_three_files() {
        let dir   = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.write_meta(&CorpusMeta::new(3, 1)).unwrap();
        assert!(!store.status().built);

        store.write_catalog(&TemplateDictionary::new()).unwrap();
        write_vectors(&store, 3);

        let status = store.status();
        assert!(status.built);
        assert_eq!(status.meta, Some(CorpusMeta::new(3, 1)));
    }

    #[test]
    fn test_read_vectors_window() {
        let dir   = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_vectors(&store, 5);

        let batch = store.read_vectors(1, 3).unwrap();
        assert_eq!(batch.start, 1);
        assert_eq!(batch.end, 4);
        assert_eq!(batch.total, None);
        let ids: Vec<u64> = batch.data.iter().map(|r| r.line_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_read_vectors_past_end_is_empty() {
        let dir   = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        write_vectors(&store, 2);
        store.write_meta(&CorpusMeta::new(2, 1)).unwrap();

        let batch = store.read_vectors(10, 5).unwrap();
        assert!(batch.data.is_empty());
        assert_eq!(batch.start, 10);
        assert_eq!(batch.end, 10);
        assert_eq!(batch.total, Some(2));
    }

    #[test]
    fn test_jsonl_record_shape() {
        let mut out = Vec::new();
        let r = VectorRecord::resolved(0, "KERNDTLB".into(), TemplateId::new(3), 2.0, 7);
        write_jsonl_record(&mut out, &r).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        let v: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(v["line_id"], 0);
        assert_eq!(v["alert_tag"], "KERNDTLB");
        assert_eq!(v["is_alert"], true);
        assert_eq!(v["template_id"], 3);
        assert_eq!(v["dim"], 7);
        assert_eq!(v["indices"], serde_json::json!([3]));
        assert_eq!(v["values"], serde_json::json!([2.0]));
    }
}
