use crate::types::{dir_ref, EntryKind, Record};
use anyhow::{anyhow, Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::Path,
    time::SystemTime,
};
use walkdir::WalkDir;

#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub root_marker: String,
    pub follow_links: bool,
}

/// Directory ids per directory *name*: -1, -2, -3 ... for each distinct name.
#[derive(Debug, Default)]
pub struct DirIdCounter {
    by_name: HashMap<String, i64>,
}

impl DirIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, name: &str) -> i64 {
        let slot = self.by_name.entry(name.to_string()).or_insert(0);
        *slot -= 1;
        *slot
    }
}

/// mtime unix (seconds, truncated toward zero)
fn mtime_unix_secs(meta: &fs::Metadata) -> Result<i64> {
    let m = meta.modified()?;
    let secs = match m.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(before) => -(before.duration().as_secs() as i64),
    };
    Ok(secs)
}

/// Flatten everything below `root` (the root itself is not recorded).
///
/// Entries come out depth-first, pre-order, in the order the OS lists them.
/// Any I/O error aborts the whole scan.
pub fn scan_directory(root: &Path, opts: &ScanOptions) -> Result<Vec<Record>> {
    let root_meta = fs::metadata(root).with_context(|| format!("metadata {}", root.display()))?;
    if !root_meta.is_dir() {
        return Err(anyhow!("Not a directory: {}", root.display()));
    }

    let mut records = Vec::new();
    let mut ids = DirIdCounter::new();

    // parent_refs[d - 1] is the parent reference for entries at depth d
    let mut parent_refs: Vec<String> = vec![opts.root_marker.clone()];

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(opts.follow_links);

    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        let depth = entry.depth();
        parent_refs.truncate(depth);

        let parent_ref = parent_refs
            .last()
            .cloned()
            .ok_or_else(|| anyhow!("no parent for {}", entry.path().display()))?;

        let meta = entry
            .metadata()
            .with_context(|| format!("metadata {}", entry.path().display()))?;
        let timestamp = mtime_unix_secs(&meta)
            .with_context(|| format!("mtime {}", entry.path().display()))?;
        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| anyhow!("name is not valid UTF-8: {}", entry.path().display()))?
            .to_string();

        if entry.file_type().is_dir() {
            let id = ids.next_id(&name);
            tracing::debug!(dir = %entry.path().display(), id, "enter");
            parent_refs.push(dir_ref(&name, id));
            records.push(Record {
                parent_ref,
                timestamp,
                kind: EntryKind::Dir { id },
                name,
            });
        } else {
            records.push(Record {
                parent_ref,
                timestamp,
                kind: EntryKind::File { size: meta.len() },
                name,
            });
        }
    }

    tracing::info!(root = %root.display(), records = records.len(), "scan finished");
    Ok(records)
}
