use crate::fs_scan::{self, ScanOptions};
use crate::hierarchy::{build_hierarchy, Node};
use crate::writer::{self, StringStyle};
use crate::{listing, reader};

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub struct AppConfig {
    pub output_dir: PathBuf,
    pub root_marker: String,
    pub follow_links: bool,
    pub style: StringStyle,
}

/// base name of the canonical root
pub fn dataset_name_for(root: &Path) -> Result<String> {
    let abs = std::fs::canonicalize(root).with_context(|| format!("canonicalize {}", root.display()))?;
    abs.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("cannot derive a dataset name from {}", abs.display()))
}

/// Scan + write <output_dir>/<name>.js
pub fn snapshot(cfg: &AppConfig, root: &Path, name: Option<&str>) -> Result<PathBuf> {
    let dataset = match name {
        Some(n) => n.to_string(),
        None => dataset_name_for(root)?,
    };

    let opts = ScanOptions {
        root_marker: cfg.root_marker.clone(),
        follow_links: cfg.follow_links,
    };
    let records = fs_scan::scan_directory(root, &opts)?;
    let dirs = records.iter().filter(|r| r.is_dir()).count();
    tracing::debug!(dataset = %dataset, dirs, files = records.len() - dirs, "snapshot ready");

    let output_path = writer::output_path(&cfg.output_dir, &dataset);
    writer::generate_js_file(&records, &dataset, &output_path, cfg.style)?;

    println!("Generated: {}", output_path.display());
    println!("Records: {}", records.len());
    Ok(output_path)
}

/// A loaded dataset and its rebuilt tree.
pub struct LoadedRoot {
    pub name: String,
    pub root: Node,
}

/// Expand the inputs: files as given, directories to their `*.js` files (sorted).
pub fn collect_js_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            out.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in std::fs::read_dir(input).with_context(|| format!("read_dir {}", input.display()))? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().map(|e| e == "js").unwrap_or(false) {
                found.push(path);
            }
        }
        found.sort();
        out.extend(found);
    }
    Ok(out)
}

pub fn load_roots(cfg: &AppConfig, files: &[PathBuf]) -> Result<Vec<LoadedRoot>> {
    let mut roots = Vec::with_capacity(files.len());
    for file in files {
        let ds = reader::read_js_file(file, cfg.style)?;
        let root = build_hierarchy(&ds.records, &cfg.root_marker)
            .with_context(|| format!("rebuild tree from {}", file.display()))?;
        tracing::debug!(dataset = %ds.name, file = %file.display(), "loaded");
        roots.push(LoadedRoot { name: ds.name, root });
    }
    Ok(roots)
}

fn render_root_list(roots: &[LoadedRoot]) -> String {
    let mut out = String::from("Storage Directories\n");
    for r in roots {
        out.push_str(&r.name);
        out.push('\n');
    }
    out
}

fn totals_line(root: &Node) -> String {
    let (files, dirs, bytes) = root.totals();
    format!("{} files, {} dirs, {}\n", files, dirs, listing::format_size(bytes))
}

/// Root list, then either every tree or the chain down to `dataset/a/b`.
pub fn show_text(roots: &[LoadedRoot], path: Option<&str>) -> String {
    let offset = listing::local_offset();
    let mut parts = vec![render_root_list(roots)];

    let segments: Vec<&str> = path
        .unwrap_or("")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match segments.split_first() {
        None => {
            for r in roots {
                parts.push(listing::render_tree(&r.name, &r.root, offset));
                parts.push(totals_line(&r.root));
            }
        }
        Some((dataset, rest)) => match roots.iter().find(|r| r.name == *dataset) {
            Some(r) => parts.push(listing::render_chain(&r.name, &r.root, rest, offset)),
            None => tracing::warn!(dataset = %dataset, "no such dataset loaded"),
        },
    }
    parts.join("\n")
}

/// `inputs` empty => every `*.js` under the output dir.
pub fn show(cfg: &AppConfig, inputs: &[PathBuf], path: Option<&str>) -> Result<()> {
    let files = if inputs.is_empty() {
        collect_js_files(std::slice::from_ref(&cfg.output_dir))?
    } else {
        collect_js_files(inputs)?
    };
    let roots = load_roots(cfg, &files)?;
    print!("{}", show_text(&roots, path));
    Ok(())
}
