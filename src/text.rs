//! Small pure helpers for cleaning loosely-formatted source text.

/// Trim and collapse internal whitespace runs to single spaces.
/// Non-breaking spaces count as whitespace.
pub fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = true;
    for ch in s.chars() {
        if ch.is_whitespace() || ch == '\u{a0}' {
            if !in_ws {
                out.push(' ');
                in_ws = true;
            }
        } else {
            out.push(ch);
            in_ws = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Coerce a textual field to an integer. Empty or unparsable input is
/// absent, never an error.
pub fn parse_optional_int(s: &str) -> Option<i64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<i64>().ok()
}

/// Like `parse_optional_int` but rejects negatives (scores, counts).
pub fn parse_optional_count(s: &str) -> Option<u32> {
    parse_optional_int(s).and_then(|n| u32::try_from(n).ok())
}

/// Site furniture that gets glued onto the last field of a scraped row
/// (share widgets, ad labels). Trim everything from the first marker on.
const FURNITURE_MARKERS: &[&str] = &["Distribuie", "Share", "Publicitate", "ADVERTISEMENT"];

pub fn strip_furniture(s: &str) -> String {
    let mut end = s.len();
    for marker in FURNITURE_MARKERS {
        if let Some(idx) = s.find(marker) {
            end = end.min(idx);
        }
    }
    collapse_ws(&s[..end])
}

/// Empty-after-trim strings become None.
pub fn non_empty(s: &str) -> Option<String> {
    let t = collapse_ws(s);
    if t.is_empty() { None } else { Some(t) }
}
