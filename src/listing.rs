use crate::hierarchy::Node;
use std::fmt::Write as _;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// YYMMDD hhmmss, "" for 0
pub fn format_date(ts: i64, offset: UtcOffset) -> String {
    if ts == 0 {
        return String::new();
    }
    let fmt = format_description!("[year repr:last_two][month][day] [hour][minute][second]");
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|d| d.to_offset(offset).format(&fmt).ok())
        .unwrap_or_default()
}

/// ties round up (1.25 -> 1.3), `{:.1}` alone would round half to even
fn one_decimal(x: f64) -> String {
    format!("{:.1}", (x * 10.0).round() / 10.0)
}

pub fn format_size(bytes: u64) -> String {
    const K: f64 = 1024.0;
    let b = bytes as f64;
    if b < K {
        format!("{}B", bytes)
    } else if b < K * K {
        format!("{}K", one_decimal(b / K))
    } else if b < K * K * K {
        format!("{}M", one_decimal(b / K / K))
    } else {
        format!("{}G", one_decimal(b / (K * K * K)))
    }
}

pub fn render_section(path: &[&str], dir: &Node, offset: UtcOffset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", path.join(" / "));

    for child in dir.children() {
        let size = match child {
            Node::File { size, .. } => format_size(*size),
            Node::Dir { .. } => "<dir>".to_string(),
        };
        let _ = writeln!(
            out,
            "{}  {} {}",
            format_date(child.timestamp(), offset),
            size,
            child.name()
        );
    }
    out
}

/// one section per directory, pre-order
pub fn render_tree(root_name: &str, root: &Node, offset: UtcOffset) -> String {
    let mut sections = Vec::new();
    let mut path = vec![root_name];
    collect_sections(root, &mut path, offset, &mut sections);
    sections.join("\n")
}

fn collect_sections<'a>(
    dir: &'a Node,
    path: &mut Vec<&'a str>,
    offset: UtcOffset,
    sections: &mut Vec<String>,
) {
    sections.push(render_section(path.as_slice(), dir, offset));
    for child in dir.children() {
        if let Node::Dir { name, .. } = child {
            path.push(name);
            collect_sections(child, path, offset, sections);
            path.pop();
        }
    }
}

/// Sections for `root` and each directory along `segments`, stopping at the first miss.
pub fn render_chain(root_name: &str, root: &Node, segments: &[&str], offset: UtcOffset) -> String {
    let mut sections = vec![render_section(&[root_name], root, offset)];
    let mut path = vec![root_name];
    let mut current = root;

    for seg in segments {
        let Some(next) = current.find_dir(&[seg]) else {
            break;
        };
        path.push(*seg);
        sections.push(render_section(&path, next, offset));
        current = next;
    }
    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build_hierarchy;
    use crate::types::Record;

    #[test]
    fn date_format_utc() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(format_date(1700000000, UtcOffset::UTC), "231114 221320");
        assert_eq!(format_date(0, UtcOffset::UTC), "");
    }

    #[test]
    fn date_format_respects_offset() {
        let plus7 = UtcOffset::from_hms(7, 0, 0).unwrap();
        assert_eq!(format_date(1700000000, plus7), "231115 051320");
    }

    #[test]
    fn size_units() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1536), "1.5K");
        assert_eq!(format_size(1280), "1.3K");
        assert_eq!(format_size(2304), "2.3K");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0M");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0G");
    }

    fn tree() -> Node {
        let records = vec![
            Record::from_wire("root".into(), 1700000000, 10, "a.txt".into()),
            Record::from_wire("root".into(), 1700000000, -1, "sub".into()),
            Record::from_wire("sub#-1".into(), 1700000000, 2048, "b.bin".into()),
            Record::from_wire("sub#-1".into(), 1700000000, -1, "deep".into()),
        ];
        build_hierarchy(&records, "root").unwrap()
    }

    #[test]
    fn full_tree_has_section_per_dir() {
        let out = render_tree("Docs", &tree(), UtcOffset::UTC);
        let expected = "Docs\n\
                        231114 221320  10B a.txt\n\
                        231114 221320  <dir> sub\n\
                        \n\
                        Docs / sub\n\
                        231114 221320  2.0K b.bin\n\
                        231114 221320  <dir> deep\n\
                        \n\
                        Docs / sub / deep\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn chain_stops_at_unknown_segment() {
        let out = render_chain("Docs", &tree(), &["sub", "missing", "deep"], UtcOffset::UTC);
        assert!(out.contains("Docs / sub\n"));
        assert!(!out.contains("Docs / sub / deep"));
        assert_eq!(out.matches(" / ").count(), 1);
    }
}
