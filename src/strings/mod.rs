//! Printable string extraction with indicator harvesting.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_LEN: usize = 4;
pub const MAX_ASCII_STRINGS: usize = 1000;
pub const MAX_UNICODE_STRINGS: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringReport {
    pub ascii_strings: Vec<String>,
    pub unicode_strings: Vec<String>,
    pub urls: Vec<String>,
    pub emails: Vec<String>,
    pub ip_addresses: Vec<String>,
    /// Runs found before de-duplication and capping
    pub total_count: usize,
}

struct Patterns {
    url: Regex,
    email: Regex,
    ipv4: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        url: compile(r#"https?://[^\s<>"{}|\\^`\[\]]+"#),
        email: compile(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
        ipv4: compile(
            r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\b",
        ),
    })
}

// Literal patterns only, covered by test_patterns_compile
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex must compile")
}

#[inline]
fn is_printable(c: u32) -> bool {
    (0x20..=0x7E).contains(&c)
}

/// Printable ASCII runs of at least `min_len` bytes
pub fn ascii_runs(data: &[u8], min_len: usize) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for &b in data {
        if is_printable(b as u32) {
            current.push(b as char);
        } else {
            if current.len() >= min_len {
                runs.push(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if current.len() >= min_len {
        runs.push(current);
    }
    runs
}

/// UTF-16LE runs of printable ASCII code units, read at even offsets
pub fn utf16le_runs(data: &[u8], min_len: usize) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for pair in data.chunks_exact(2) {
        let unit = u16::from_le_bytes([pair[0], pair[1]]) as u32;
        if is_printable(unit) {
            current.push(unit as u8 as char);
        } else {
            if current.len() >= min_len {
                runs.push(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if current.len() >= min_len {
        runs.push(current);
    }
    runs
}

/// Keep the first occurrence of each value, in order
fn dedup(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

pub fn extract_strings(data: &[u8], min_len: usize) -> StringReport {
    let min_len = min_len.max(1);
    let ascii = ascii_runs(data, min_len);
    let unicode = utf16le_runs(data, min_len);
    let total_count = ascii.len() + unicode.len();

    let p = patterns();
    let harvest = |re: &Regex| {
        dedup(
            ascii
                .iter()
                .chain(&unicode)
                .flat_map(|s| re.find_iter(s).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>(),
        )
    };
    let urls = harvest(&p.url);
    let emails = harvest(&p.email);
    let ip_addresses = harvest(&p.ipv4);

    let mut ascii_strings = dedup(ascii);
    ascii_strings.truncate(MAX_ASCII_STRINGS);
    let mut unicode_strings = dedup(unicode);
    unicode_strings.truncate(MAX_UNICODE_STRINGS);

    StringReport {
        ascii_strings,
        unicode_strings,
        urls,
        emails,
        ip_addresses,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_ascii_runs_respect_min_len() {
        let data = b"abc\0defg\x01hijklmn";
        assert_eq!(ascii_runs(data, 4), vec!["defg", "hijklmn"]);
        assert_eq!(ascii_runs(data, 3), vec!["abc", "defg", "hijklmn"]);
    }

    #[test]
    fn test_utf16_runs() {
        let mut data = utf16("C:\\Windows\\System32");
        data.extend_from_slice(&[0, 0]);
        data.extend(utf16("ab"));
        assert_eq!(utf16le_runs(&data, 4), vec!["C:\\Windows\\System32"]);
    }

    #[test]
    fn test_dedup_and_total_count() {
        let data = b"repeat\0repeat\0other\0";
        let report = extract_strings(data, 4);
        assert_eq!(report.ascii_strings, vec!["repeat", "other"]);
        assert_eq!(report.total_count, 3);
    }

    #[test]
    fn test_indicator_harvest() {
        let data = b"see http://evil.example.com/payload.bin now\0mail admin@corp.example.org\0c2 at 10.0.13.37:443\0bad 999.1.1.1\0";
        let report = extract_strings(data, 4);
        assert_eq!(report.urls, vec!["http://evil.example.com/payload.bin"]);
        assert_eq!(report.emails, vec!["admin@corp.example.org"]);
        assert_eq!(report.ip_addresses, vec!["10.0.13.37"]);
    }

    #[test]
    fn test_ascii_cap() {
        let mut data = Vec::new();
        for i in 0..1500 {
            data.extend_from_slice(format!("string{:05}\0", i).as_bytes());
        }
        let report = extract_strings(&data, 4);
        assert_eq!(report.ascii_strings.len(), MAX_ASCII_STRINGS);
        assert_eq!(report.total_count, 1500);
    }

    #[test]
    fn test_patterns_compile() {
        let p = patterns();
        assert!(p.url.is_match("https://a.b"));
        assert!(p.email.is_match("a@b.cd"));
        assert!(p.ipv4.is_match("127.0.0.1"));
    }
}
