use once_cell::sync::Lazy;
use regex::bytes::Regex;

const INCLUDE: &[u8] = b"#include";

static ANGLED: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([./a-zA-Z0-9_-]*)>").unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([./a-zA-Z0-9_-]*)""#).unwrap());

/// How the expansion engine treats one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Text,
    /// `#include` appears, but not as the first token of the line.
    Guarded,
    /// `#include` leads the line but names nothing we can read.
    Unparsed,
    Include(&'a str),
}

/// Classifies a raw line. Lines are bytes so that text in any encoding
/// passes through untouched.
pub fn classify(line: &[u8]) -> Line<'_> {
    if !contains(line, INCLUDE) {
        return Line::Text;
    }
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    if !line[start..].starts_with(INCLUDE) {
        return Line::Guarded;
    }

    let captured = ANGLED
        .captures(line)
        .or_else(|| QUOTED.captures(line))
        .and_then(|caps| caps.get(1))
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
        .map(strip_relative_prefix);

    match captured {
        Some(name) if !name.is_empty() => Line::Include(name),
        _ => Line::Unparsed,
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Drops every leading `.` and `/`, so `./a.h` and `../a.h` both look up
/// `a.h` by suffix.
fn strip_relative_prefix(name: &str) -> &str {
    name.trim_start_matches(['.', '/'])
}
