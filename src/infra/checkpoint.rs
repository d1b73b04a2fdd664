// ============================================================
// Layer 6: Dictionary Checkpoints
// ============================================================
// Persists the aggregation dictionary as a CSV snapshot and reads
// snapshots back.
//
// File layout (dest_dir/dict_templ.csv), rows in ascending byte
// order of the template text, not in ID order:
//   id,template
//   2,"it's 'quoted'"
//   0,disk failure
//   1,"link down, retry"
//
// Escaping: a template holding ',' or '"' is wrapped in double
// quotes after every '"' inside it has been replaced by '\''.
// This is lossy; readers get the apostrophe form back.
//
// Every checkpoint rewrites the whole snapshot through an
// AtomicFile, so the old snapshot stays readable until the new
// one has been renamed into place.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use std::{
    borrow::Cow,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::{dictionary::TemplateDictionary, records::SnapshotEntry, traits::Checkpointer};
use crate::infra::atomic::AtomicFile;

/// File name of the aggregation snapshot inside the destination dir
pub const SNAPSHOT_FILE: &str = "dict_templ.csv";

/// First line of every snapshot
pub const SNAPSHOT_HEADER: &str = "id,template";

/// Writes dictionary snapshots to `<dest_dir>/dict_templ.csv`.
pub struct SnapshotCheckpointer {
    path: PathBuf,
}

impl SnapshotCheckpointer {
    pub fn new(dest_dir: impl AsRef<Path>) -> Self {
        Self {
            path: dest_dir.as_ref().join(SNAPSHOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Checkpointer for SnapshotCheckpointer {
    fn checkpoint(&mut self, dictionary: &TemplateDictionary) -> Result<()> {
        let mut file = AtomicFile::create(&self.path)?;
        write_snapshot(&mut file, dictionary)
            .with_context(|| format!("Cannot write snapshot '{}'", self.path.display()))?;
        file.commit()?;

        tracing::debug!(
            "Checkpoint: {} templates → '{}'",
            dictionary.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Serialise the whole dictionary, rows sorted by template text
pub fn write_snapshot<W: Write>(w: &mut W, dictionary: &TemplateDictionary) -> std::io::Result<()> {
    let mut rows: Vec<_> = dictionary.iter().collect();
    rows.sort_unstable_by(|a, b| a.1.as_str().cmp(b.1.as_str()));

    writeln!(w, "{SNAPSHOT_HEADER}")?;
    for (id, template) in rows {
        writeln!(w, "{},{}", id, escape_template(template.as_str()))?;
    }
    Ok(())
}

/// Quote a template field, replacing inner quotes with apostrophes
pub fn escape_template(template: &str) -> Cow<'_, str> {
    if template.contains(',') || template.contains('"') {
        Cow::Owned(format!("\"{}\"", template.replace('"', "'")))
    } else {
        Cow::Borrowed(template)
    }
}

/// Read a snapshot back, sorted by ID.
/// Rows with an empty template are dropped.
pub fn load_snapshot(path: &Path) -> Result<Vec<SnapshotEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read snapshot '{}'", path.display()))?;

    let mut lines = text.lines();
    match lines.next().map(|h| h.trim_end_matches('\r')) {
        Some(SNAPSHOT_HEADER) => {}
        other => bail!(
            "'{}' must start with '{}', found {:?}",
            path.display(),
            SNAPSHOT_HEADER,
            other
        ),
    }

    let mut entries = Vec::new();
    for (n, line) in lines.enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let (id, field) = line
            .split_once(',')
            .with_context(|| format!("'{}' line {}: missing ','", path.display(), n + 2))?;
        let id: usize = id
            .parse()
            .with_context(|| format!("'{}' line {}: bad id '{}'", path.display(), n + 2, id))?;

        let template = unquote(field);
        if !template.is_empty() {
            entries.push(SnapshotEntry {
                id,
                template: template.to_string(),
            });
        }
    }

    entries.sort_by_key(|e| e.id);
    Ok(entries)
}

fn unquote(field: &str) -> &str {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        &field[1..field.len() - 1]
    } else {
        field
    }
}
