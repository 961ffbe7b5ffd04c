use crate::types::Record;
use crate::writer::StringStyle;
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("empty input")]
    Empty,
    #[error("line {line}: expected `window[\"NAME\"] = [`")]
    BadHeader { line: usize },
    #[error("line {line}: malformed record ({reason})")]
    BadRecord { line: usize, reason: String },
    #[error("missing closing `];`")]
    Unterminated,
    #[error("line {line}: content after closing `];`")]
    TrailingContent { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub records: Vec<Record>,
}

fn unquote(s: &str, style: StringStyle) -> Option<String> {
    match style {
        StringStyle::Raw => s
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .map(str::to_string),
        StringStyle::Escaped => serde_json::from_str::<String>(s).ok(),
    }
}

fn parse_header(line: &str, style: StringStyle) -> Option<String> {
    let inner = line.strip_prefix("window[")?.strip_suffix("] = [")?;
    unquote(inner, style)
}

fn parse_int(s: &str, what: &str, line: usize) -> Result<i64, ReadError> {
    s.trim().parse::<i64>().map_err(|_| ReadError::BadRecord {
        line,
        reason: format!("{} is not an integer: {:?}", what, s),
    })
}

/// `"parent", ts, size_or_id, "name"` without any unescaping.
fn parse_raw_fields(inner: &str, line: usize) -> Result<Record, ReadError> {
    let bad = |reason: &str| ReadError::BadRecord {
        line,
        reason: reason.to_string(),
    };

    let rest = inner.strip_prefix('"').ok_or_else(|| bad("parent not quoted"))?;
    let (parent, rest) = rest.split_once('"').ok_or_else(|| bad("parent not closed"))?;
    let rest = rest.strip_prefix(", ").ok_or_else(|| bad("missing separator"))?;
    let (ts, rest) = rest.split_once(", ").ok_or_else(|| bad("missing timestamp"))?;
    let (size_or_id, rest) = rest.split_once(", ").ok_or_else(|| bad("missing size/id"))?;
    let name = rest
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| bad("name not quoted"))?;

    Ok(Record::from_wire(
        parent.to_string(),
        parse_int(ts, "timestamp", line)?,
        parse_int(size_or_id, "size/id", line)?,
        name.to_string(),
    ))
}

fn parse_record(line_text: &str, style: StringStyle, line: usize) -> Result<Record, ReadError> {
    let body = line_text
        .strip_suffix(',')
        .unwrap_or(line_text)
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| ReadError::BadRecord {
            line,
            reason: "expected `[...]`".to_string(),
        })?;

    match style {
        StringStyle::Raw => parse_raw_fields(body, line),
        StringStyle::Escaped => {
            let (parent, ts, size_or_id, name): (String, i64, i64, String) =
                serde_json::from_str(&format!("[{}]", body)).map_err(|e| ReadError::BadRecord {
                    line,
                    reason: e.to_string(),
                })?;
            Ok(Record::from_wire(parent, ts, size_or_id, name))
        }
    }
}

pub fn parse_literal(text: &str, style: StringStyle) -> Result<Dataset, ReadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (hline, header) = lines.next().ok_or(ReadError::Empty)?;
    let name = parse_header(header, style).ok_or(ReadError::BadHeader { line: hline })?;

    let mut records = Vec::new();
    let mut closed = false;
    for (n, l) in lines {
        if closed {
            return Err(ReadError::TrailingContent { line: n });
        }
        if l == "];" {
            closed = true;
            continue;
        }
        records.push(parse_record(l, style, n)?);
    }

    if !closed {
        return Err(ReadError::Unterminated);
    }
    Ok(Dataset { name, records })
}

pub fn read_js_file(path: &Path, style: StringStyle) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let ds = parse_literal(&text, style).with_context(|| format!("parse {}", path.display()))?;
    Ok(ds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::render_to_string;

    fn sample() -> Vec<Record> {
        vec![
            Record::from_wire("root".into(), 1700000000, 10, "a.txt".into()),
            Record::from_wire("root".into(), 1700000100, -1, "sub dir, old".into()),
            Record::from_wire("sub dir, old#-1".into(), -86400, 0, "b.txt".into()),
            Record::from_wire("sub dir, old#-1".into(), 3, 5_000_000_000, "héllo wörld".into()),
        ]
    }

    #[test]
    fn raw_round_trip() {
        let text = render_to_string("Data", &sample(), StringStyle::Raw);
        let ds = parse_literal(&text, StringStyle::Raw).unwrap();
        assert_eq!(ds.name, "Data");
        assert_eq!(ds.records, sample());
    }

    #[test]
    fn escaped_round_trip_with_awkward_names() {
        let mut recs = sample();
        recs.push(Record::from_wire("root".into(), 1, 2, "q\"uote\\back\tslash".into()));
        let text = render_to_string("we\"ird", &recs, StringStyle::Escaped);
        let ds = parse_literal(&text, StringStyle::Escaped).unwrap();
        assert_eq!(ds.name, "we\"ird");
        assert_eq!(ds.records, recs);
    }

    #[test]
    fn tolerates_crlf_and_blank_lines() {
        let text = "window[\"x\"] = [\r\n\r\n    [\"root\", 1, 2, \"f\"],\r\n];\r\n\r\n";
        let ds = parse_literal(text, StringStyle::Raw).unwrap();
        assert_eq!(ds.records.len(), 1);
    }

    #[test]
    fn reports_bad_header() {
        let err = parse_literal("var x = [\n];\n", StringStyle::Raw).unwrap_err();
        assert_eq!(err, ReadError::BadHeader { line: 1 });
    }

    #[test]
    fn reports_bad_record_line() {
        let text = "window[\"x\"] = [\n    [\"root\", abc, 2, \"f\"],\n];\n";
        match parse_literal(text, StringStyle::Raw) {
            Err(ReadError::BadRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn reports_missing_close_and_trailing_content() {
        let open = "window[\"x\"] = [\n    [\"root\", 1, 2, \"f\"],\n";
        assert_eq!(parse_literal(open, StringStyle::Raw), Err(ReadError::Unterminated));

        let trailing = "window[\"x\"] = [\n];\nalert(1);\n";
        assert_eq!(
            parse_literal(trailing, StringStyle::Raw),
            Err(ReadError::TrailingContent { line: 3 })
        );
        assert_eq!(parse_literal("  \n", StringStyle::Raw), Err(ReadError::Empty));
    }
}
