use crate::types::Record;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// How string fields are embedded in the literal.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum StringStyle {
    /// quoted as-is
    #[default]
    Raw,
    Escaped,
}

fn needs_escaping(s: &str) -> bool {
    s.chars().any(|c| c == '"' || c == '\\' || c.is_control())
}

fn quoted(s: &str, style: StringStyle) -> String {
    match style {
        StringStyle::Raw => format!("\"{}\"", s),
        // serializing a &str cannot fail
        StringStyle::Escaped => serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s)),
    }
}

/// <output_dir>/<dataset>.js
pub fn output_path(output_dir: &Path, dataset_name: &str) -> PathBuf {
    output_dir.join(format!("{}.js", dataset_name))
}

/// window["<name>"] = [ ...records ];
pub fn write_records<W: Write>(
    mut w: W,
    var_name: &str,
    records: &[Record],
    style: StringStyle,
) -> io::Result<()> {
    if style == StringStyle::Raw && needs_escaping(var_name) {
        tracing::warn!(name = var_name, "dataset name breaks the literal; consider --escape");
    }
    writeln!(w, "window[{}] = [", quoted(var_name, style))?;

    for rec in records {
        if style == StringStyle::Raw
            && (needs_escaping(&rec.name) || needs_escaping(&rec.parent_ref))
        {
            tracing::warn!(
                parent = %rec.parent_ref,
                name = %rec.name,
                "unescaped quote/control character written; output will not parse"
            );
        }
        writeln!(
            w,
            "    [{}, {}, {}, {}],",
            quoted(&rec.parent_ref, style),
            rec.timestamp,
            rec.size_or_id(),
            quoted(&rec.name, style)
        )?;
    }

    writeln!(w, "];")?;
    Ok(())
}

pub fn render_to_string(var_name: &str, records: &[Record], style: StringStyle) -> String {
    let mut buf = Vec::new();
    // Vec<u8> sink never fails
    let _ = write_records(&mut buf, var_name, records, style);
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn generate_js_file(
    records: &[Record],
    var_name: &str,
    output_file: &Path,
    style: StringStyle,
) -> Result<()> {
    if let Some(parent) = output_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create_dir_all {}", parent.display()))?;
    }

    let f = File::create(output_file).with_context(|| format!("create {}", output_file.display()))?;
    let mut w = BufWriter::new(f);
    write_records(&mut w, var_name, records, style)
        .with_context(|| format!("write {}", output_file.display()))?;
    w.flush()
        .with_context(|| format!("flush {}", output_file.display()))?;
    Ok(())
}
