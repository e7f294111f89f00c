use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ExtractError;

// ── Metadata file format ─────────────────────────────────────────────────
//
// Real data examples:
//   AUTH#SHUHRA##AR: al-Ṭabarī
//   AUTH#ISM#####AR: Muḥammad
//   AUTH#DIED####AH: 0310-XX-XX
//   TEXT#TITLE###AR: Taʾrīkh al-rusul wa-l-mulūk
//   TEXT#GENRES####: chronicle ¶ history
//   AUTH#BIBLIO####: GAS I, 323 ¶
//       EI² X, 11
//   #END#OF#META#
//
// Keys are padded with '#' to a fixed label width and terminated by the
// first ':'. A value continued onto the next line carries the '¶' marker,
// either trailing on the first line or implied by leading whitespace on
// the continuation line.

/// Explicit end-of-header marker; parsing stops here.
pub const HEADER_END_MARKER: &str = "#END#OF#META#";

/// A value equal to this sentinel means "unset" and normalizes to empty.
pub const UNSET_SENTINEL: &str = "NODATA";

/// Internal line-continuation marker kept in stored values.
pub const CONTINUATION_MARK: char = '¶';

/// Never read past this many lines even without an end marker.
pub const HEADER_LINE_CEILING: usize = 100;

/// Result of parsing one metadata file: normalized key → raw value
/// (continuations kept as '¶' markers), plus the lines that had no
/// recognizable separator.
#[derive(Debug, Default)]
pub struct HeaderFields {
    pub fields: BTreeMap<String, String>,
    pub unreadable: Vec<String>,
}

impl HeaderFields {
    /// Cleaned single-string value for a key, empty if absent.
    pub fn get(&self, key: &str) -> String {
        self.fields.get(key).map(|v| clean(v)).unwrap_or_default()
    }

    /// Multi-item value for a key, split on continuation marks and ';'.
    pub fn get_items(&self, key: &str) -> Vec<String> {
        self.fields.get(key).map(|v| split_items(v)).unwrap_or_default()
    }
}

pub fn parse_meta_file(path: &Path) -> Result<HeaderFields, ExtractError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ExtractError::Io { path: path.to_path_buf(), source })?;
    Ok(parse_meta_str(&content))
}

/// Parse labeled `KEY###: value` lines until the end marker or the line
/// ceiling. Lines with no separator are collected as unreadable unless they
/// continue the previous value.
pub fn parse_meta_str(content: &str) -> HeaderFields {
    let mut out = HeaderFields::default();
    let mut last_key: Option<String> = None;

    for raw_line in content.lines().take(HEADER_LINE_CEILING) {
        if raw_line.trim() == HEADER_END_MARKER {
            break;
        }
        if raw_line.trim().is_empty() {
            continue;
        }

        let continues_previous = raw_line.starts_with([' ', '\t'])
            || last_key
                .as_ref()
                .and_then(|k| out.fields.get(k))
                .is_some_and(|v| v.ends_with(CONTINUATION_MARK));

        if continues_previous && !raw_line.contains(':') {
            if let Some(key) = &last_key {
                let value = out.fields.get_mut(key).unwrap();
                if !value.ends_with(CONTINUATION_MARK) {
                    value.push(CONTINUATION_MARK);
                }
                value.push_str(raw_line.trim());
                continue;
            }
        }

        let Some((raw_key, raw_value)) = raw_line.split_once(':') else {
            out.unreadable.push(raw_line.to_string());
            continue;
        };

        let key = normalize_key(raw_key);
        if key.is_empty() {
            out.unreadable.push(raw_line.to_string());
            continue;
        }

        let mut value = raw_value.trim().to_string();
        if value == UNSET_SENTINEL {
            value.clear();
        }

        out.fields.insert(key.clone(), value);
        last_key = Some(key);
    }

    out
}

/// Strip '#' padding from a raw label: "AUTH#ISM#####AR" → "AUTH#ISM#AR".
fn normalize_key(raw: &str) -> String {
    let mut key = String::new();
    let mut prev_hash = false;
    for c in raw.trim().chars() {
        if c == '#' {
            prev_hash = true;
            continue;
        }
        if prev_hash && !key.is_empty() {
            key.push('#');
        }
        prev_hash = false;
        key.push(c);
    }
    key
}

/// Collapse continuation marks to single spaces for display values.
pub fn clean(value: &str) -> String {
    value
        .split(CONTINUATION_MARK)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a logical field into discrete items on '¶' and ';'.
pub fn split_items(value: &str) -> Vec<String> {
    value
        .split([CONTINUATION_MARK, ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_fields() {
        let h = parse_meta_str("AUTH#SHUHRA##AR: al-Ṭabarī\nAUTH#DIED####AH: 0310-XX-XX\n");
        assert_eq!(h.get("AUTH#SHUHRA#AR"), "al-Ṭabarī");
        assert_eq!(h.get("AUTH#DIED#AH"), "0310-XX-XX");
        assert!(h.unreadable.is_empty());
    }

    #[test]
    fn test_key_padding_stripped() {
        let h = parse_meta_str("AUTH#ISM#####AR: Muḥammad\n");
        assert_eq!(h.get("AUTH#ISM#AR"), "Muḥammad");
        assert!(!h.fields.contains_key("AUTH#ISM#####AR"));
    }

    #[test]
    fn test_unset_sentinel_normalized() {
        let h = parse_meta_str("AUTH#KUNYA###AR: NODATA\n");
        assert_eq!(h.fields.get("AUTH#KUNYA#AR").map(String::as_str), Some(""));
        assert_eq!(h.get("AUTH#KUNYA#AR"), "");
    }

    #[test]
    fn test_continuation_joined_with_marker() {
        let h = parse_meta_str("AUTH#BIBLIO####: GAS I, 323 ¶\n    EI² X, 11\n");
        // Marker preserved in storage …
        assert_eq!(h.fields["AUTH#BIBLIO"], "GAS I, 323 ¶EI² X, 11");
        // … collapsed for display …
        assert_eq!(h.get("AUTH#BIBLIO"), "GAS I, 323 EI² X, 11");
        // … and splittable for list fields.
        assert_eq!(h.get_items("AUTH#BIBLIO"), vec!["GAS I, 323", "EI² X, 11"]);
    }

    #[test]
    fn test_multi_genre_split() {
        let h = parse_meta_str("TEXT#GENRES####: chronicle ¶ history\n");
        assert_eq!(h.get_items("TEXT#GENRES"), vec!["chronicle", "history"]);
    }

    #[test]
    fn test_unreadable_line_collected() {
        let h = parse_meta_str("AUTH#SHUHRA##AR: al-Ṭabarī\nthis line has no separator\n");
        assert_eq!(h.unreadable, vec!["this line has no separator"]);
        assert_eq!(h.fields.len(), 1);
    }

    #[test]
    fn test_end_marker_stops_parse() {
        let h = parse_meta_str("A#X: one\n#END#OF#META#\nB#Y: two\n");
        assert_eq!(h.get("A#X"), "one");
        assert!(!h.fields.contains_key("B#Y"));
    }

    #[test]
    fn test_line_ceiling() {
        let mut content = String::new();
        for i in 0..150 {
            content.push_str(&format!("KEY{i:03}#: v{i}\n"));
        }
        let h = parse_meta_str(&content);
        assert_eq!(h.fields.len(), HEADER_LINE_CEILING);
        assert!(h.fields.contains_key("KEY099"));
        assert!(!h.fields.contains_key("KEY100"));
    }
}
