// src/status/record.rs

//! The key/value status record written by the managed process.
//!
//! The on-disk format is the line-oriented properties format:
//!
//! ```text
//! # comment
//! state=SHUTDOWN
//! started\ at: 2024-01-01
//! ```
//!
//! Keys the supervisor does not know about are carried through unchanged
//! when the record is written back.

use std::collections::BTreeMap;

use chrono::Utc;

/// Key holding the [`ResponseState`](crate::types::ResponseState) name.
pub const STATE_KEY: &str = "state";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRecord {
    entries: BTreeMap<String, String>,
}

impl StatusRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(input: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in logical_lines(input) {
            let (key, value) = split_entry(&line);
            entries.insert(key, value);
        }
        Self { entries }
    }

    /// Render the record with a `#` header line and a timestamp comment.
    pub fn render(&self, header: &str) -> String {
        let mut out = String::new();
        out.push('#');
        out.push_str(header);
        out.push('\n');
        out.push('#');
        out.push_str(&Utc::now().to_rfc2822());
        out.push('\n');
        for (key, value) in &self.entries {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn state(&self) -> Option<&str> {
        self.get(STATE_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

const BLANKS: [char; 3] = [' ', '\t', '\u{c}'];

/// Join continuation lines and drop blanks and comments.
fn logical_lines(input: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    // `\r\n`, lone `\r` and `\n` all end a line.
    let normalized = input.replace("\r\n", "\n");
    for raw in normalized.split(['\r', '\n']) {
        let trimmed = raw.trim_start_matches(BLANKS);
        let line = match pending.take() {
            Some(mut acc) => {
                acc.push_str(trimmed);
                acc
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        if ends_with_continuation(&line) {
            let mut line = line;
            line.pop();
            pending = Some(line);
        } else {
            lines.push(line);
        }
    }

    if let Some(rest) = pending {
        if !rest.is_empty() {
            lines.push(rest);
        }
    }

    lines
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split at the first unescaped `=`, `:` or whitespace.
fn split_entry(line: &str) -> (String, String) {
    let mut chars = line.char_indices().peekable();
    let mut split_at = None;

    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '=' | ':' | ' ' | '\t' | '\u{c}' => {
                split_at = Some(idx);
                break;
            }
            _ => {}
        }
    }

    let Some(idx) = split_at else {
        return (unescape(line), String::new());
    };

    let key = &line[..idx];
    let rest = line[idx..].trim_start_matches(BLANKS);
    let rest = rest
        .strip_prefix(['=', ':'])
        .unwrap_or(rest)
        .trim_start_matches(BLANKS);

    (unescape(key), unescape(rest))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let mut chars = after.chars();

        match chars.next() {
            Some('u') => match decode_unicode(&after[1..]) {
                Some((c, used)) => {
                    out.push(c);
                    rest = &after[1 + used..];
                }
                // Malformed `\u` stays as written.
                None => {
                    out.push_str("\\u");
                    rest = &after[1..];
                }
            },
            Some(c) => {
                out.push(match c {
                    't' => '\t',
                    'n' => '\n',
                    'r' => '\r',
                    'f' => '\u{c}',
                    other => other,
                });
                rest = chars.as_str();
            }
            None => rest = "",
        }
    }

    out.push_str(rest);
    out
}

/// Decode the four hex digits after `\u`, joining a surrogate pair written
/// as two escapes. Returns the char and how many bytes were consumed.
fn decode_unicode(s: &str) -> Option<(char, usize)> {
    let unit = hex_unit(s)?;

    if (0xD800..0xDC00).contains(&unit) {
        let low = s[4..]
            .strip_prefix("\\u")
            .and_then(hex_unit)
            .filter(|low| (0xDC00..0xE000).contains(low));
        if let Some(low) = low {
            let c = char::decode_utf16([unit, low])
                .next()
                .and_then(|c| c.ok())
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            return Some((c, 10));
        }
    }

    let c = char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER);
    Some((c, 4))
}

fn hex_unit(s: &str) -> Option<u16> {
    let digits = s.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (idx, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || idx == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_separators_and_comments() {
        let record = StatusRecord::parse(
            "# written by the bot\n\
             ! also a comment\n\
             \n\
             state=SHUTDOWN\n\
             owner : somebody\n\
             uptime 42\n",
        );
        assert_eq!(record.state(), Some("SHUTDOWN"));
        assert_eq!(record.get("owner"), Some("somebody"));
        assert_eq!(record.get("uptime"), Some("42"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn honours_escapes_and_continuations() {
        let record = StatusRecord::parse("path\\ name=C\\:\\\\bot\nlong=one \\\n    two\n");
        assert_eq!(record.get("path name"), Some("C:\\bot"));
        assert_eq!(record.get("long"), Some("one two"));
    }

    #[test]
    fn decodes_unicode_escapes() {
        let record = StatusRecord::parse(
            "state=UPDATE\nowner=K\\u00e4se\nemoji=\\ud83d\\ude00!\n",
        );
        assert_eq!(record.get("owner"), Some("K\u{e4}se"));
        assert_eq!(record.get("emoji"), Some("\u{1F600}!"));
    }

    #[test]
    fn unicode_values_survive_a_state_rewrite() {
        let mut record = StatusRecord::parse("state=UPDATE\nowner=K\\u00e4se\n");
        record.set(STATE_KEY, "UPDATED");

        let reparsed = StatusRecord::parse(&record.render("instance status"));
        assert_eq!(reparsed.get("owner"), Some("K\u{e4}se"));
    }

    #[test]
    fn malformed_unicode_escapes_are_kept_literally() {
        let record = StatusRecord::parse("a=\\u12\nb=\\uzzzz\nc=\\ud83dx\nd=\\u\n");
        assert_eq!(record.get("a"), Some("\\u12"));
        assert_eq!(record.get("b"), Some("\\uzzzz"));
        assert_eq!(record.get("c"), Some("\u{FFFD}x"));
        assert_eq!(record.get("d"), Some("\\u"));
    }

    #[test]
    fn lone_carriage_returns_end_lines() {
        let record = StatusRecord::parse("state=SHUTDOWN\rowner=K\r\nlong=a\\\r  b\r");
        assert_eq!(record.state(), Some("SHUTDOWN"));
        assert_eq!(record.get("owner"), Some("K"));
        assert_eq!(record.get("long"), Some("ab"));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn key_without_value_is_empty_string() {
        let record = StatusRecord::parse("state\n");
        assert_eq!(record.state(), Some(""));
    }

    #[test]
    fn comment_only_file_is_empty() {
        assert!(StatusRecord::parse("# nothing\n\n").is_empty());
    }

    #[test]
    fn render_keeps_unknown_keys() {
        let mut record = StatusRecord::parse("state=UPDATE\nversion=1.2\n");
        record.set(STATE_KEY, "UPDATED");
        let text = record.render("instance status");

        assert!(text.starts_with("#instance status\n#"));
        let reparsed = StatusRecord::parse(&text);
        assert_eq!(reparsed.state(), Some("UPDATED"));
        assert_eq!(reparsed.get("version"), Some("1.2"));
    }
}
