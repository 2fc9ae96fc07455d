//! Reader for `.properties` key/value files.
//!
//! Follows the classic Java properties layout: `#` and `!` start comment
//! lines, a key ends at the first unescaped `=`, `:` or whitespace, a line
//! ending in an odd number of backslashes continues on the next line, and
//! values may carry `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes.

use thiserror::Error;

/// One key/value entry, with the physical line the entry started on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyEntry {
    pub key: String,
    pub value: String,
    pub line: usize,
}

/// Syntax errors raised while reading a properties document.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PropertiesError {
    #[error("line {line}: malformed \\uXXXX escape")]
    MalformedUnicodeEscape { line: usize },
    #[error("line {line}: line continuation at end of input")]
    DanglingContinuation { line: usize },
}

impl PropertiesError {
    /// Line the error was detected on.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedUnicodeEscape { line } | Self::DanglingContinuation { line } => *line,
        }
    }
}

/// Parses a properties document into its entries, in document order.
///
/// Repeated keys are all returned; callers decide which occurrence wins.
pub fn parse(text: &str) -> Result<Vec<PropertyEntry>, PropertiesError> {
    let mut entries = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let start_line = index + 1;
        let first = raw.trim_start();
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = String::from(first);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => {
                    return Err(PropertiesError::DanglingContinuation { line: start_line });
                }
            }
        }

        let (raw_key, raw_value) = split_entry(&logical);
        entries.push(PropertyEntry {
            key: unescape(raw_key, start_line)?,
            value: unescape(raw_value, start_line)?,
            line: start_line,
        });
    }

    Ok(entries)
}

fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    trailing % 2 == 1
}

/// Splits a logical line into its raw (still escaped) key and value parts.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (pos, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = pos;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
    }
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or(PropertiesError::MalformedUnicodeEscape { line })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{parse, PropertiesError};

    fn pairs(text: &str) -> Vec<(String, String)> {
        parse(text)
            .expect("valid properties")
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# comment\n! another\n\n   \nlabel_properties = a\n";
        assert_eq!(pairs(text), vec![("label_properties".into(), "a".into())]);
    }

    #[test]
    fn accepts_all_separators() {
        let text = "a=1\nb:2\nc 3\nd = 4\ne\t:\t5\nf\n";
        assert_eq!(
            pairs(text),
            vec![
                ("a".into(), "1".into()),
                ("b".into(), "2".into()),
                ("c".into(), "3".into()),
                ("d".into(), "4".into()),
                ("e".into(), "5".into()),
                ("f".into(), String::new()),
            ]
        );
    }

    #[test]
    fn joins_continued_lines() {
        let text = "synonym_properties = http://a.org/x, \\\n    http://b.org/y\nnext=z\n";
        let entries = parse(text).expect("valid properties");
        assert_eq!(entries[0].value, "http://a.org/x, http://b.org/y");
        assert_eq!(entries[0].line, 1);
        assert_eq!(entries[1].key, "next");
        assert_eq!(entries[1].line, 3);
    }

    #[test]
    fn even_backslashes_do_not_continue() {
        let text = "path = c:\\\\\nother = 1\n";
        assert_eq!(
            pairs(text),
            vec![
                ("path".into(), "c:\\".into()),
                ("other".into(), "1".into()),
            ]
        );
    }

    #[test]
    fn decodes_escapes_in_keys_and_values() {
        let text = "my\\ key = caf\\u00e9\\tbar\nhash\\#tag = x\\:y\n";
        assert_eq!(
            pairs(text),
            vec![
                ("my key".into(), "café\tbar".into()),
                ("hash#tag".into(), "x:y".into()),
            ]
        );
    }

    #[test]
    fn reports_malformed_unicode_escape() {
        let err = parse("ok = 1\nbad = \\u12\n").expect_err("malformed escape");
        assert_eq!(err, PropertiesError::MalformedUnicodeEscape { line: 2 });
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn reports_dangling_continuation() {
        let err = parse("key = value \\").expect_err("dangling continuation");
        assert_eq!(err, PropertiesError::DanglingContinuation { line: 1 });
    }
}
