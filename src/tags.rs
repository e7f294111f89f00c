use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ExtractError;

// ── Tag classification ───────────────────────────────────────────────────
//
// Upstream tag lists are undifferentiated:
//   mARkdown; completed; born@REGION_R; _SHICR; TAFSIR@QURAN; NO_MAJOR_ISSUES
//
// Each token belongs to exactly one scope. Rules are evaluated in order
// and the first match wins; that order is the contract, since a token can
// match several patterns ("born@X" also contains '@').

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    Version,
    Text,
    Author,
}

/// One classification rule: a label (for the contract/tests), a predicate,
/// and the scope assigned on match.
pub struct TagRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub scope: TagScope,
}

/// Annotation-workflow keywords marking a token version-scoped.
const VERSION_KEYWORDS: &[&str] = &["MARKDOWN", "COMPLETED", "INPROGRESS", "NOMAJORISSUES"];

/// Author-scoped geographic tag markers.
const GEO_MARKERS: &[&str] = &["born@", "died@", "resided@", "visited@"];

fn has_version_keyword(tag: &str) -> bool {
    let folded: String = tag
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_ascii_uppercase();
    VERSION_KEYWORDS.iter().any(|k| folded.contains(k))
}

fn has_geo_marker(tag: &str) -> bool {
    GEO_MARKERS.iter().any(|m| tag.contains(m))
}

fn is_text_shaped(tag: &str) -> bool {
    tag.contains('@') || tag.starts_with('_')
}

fn always(_tag: &str) -> bool {
    true
}

/// The ordered rule list. Evaluation order is significant.
pub const RULES: &[TagRule] = &[
    TagRule { name: "workflow-keyword", matches: has_version_keyword, scope: TagScope::Version },
    TagRule { name: "geo-marker", matches: has_geo_marker, scope: TagScope::Author },
    TagRule { name: "category-or-underscore", matches: is_text_shaped, scope: TagScope::Text },
    TagRule { name: "default", matches: always, scope: TagScope::Version },
];

pub fn classify(tag: &str) -> TagScope {
    for rule in RULES {
        if (rule.matches)(tag) {
            return rule.scope;
        }
    }
    unreachable!("the default rule matches everything")
}

/// Tags split into their three scopes, original order preserved.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ClassifiedTags {
    pub version: Vec<String>,
    pub text: Vec<String>,
    pub author: Vec<String>,
}

pub fn classify_all<I, S>(tags: I) -> ClassifiedTags
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = ClassifiedTags::default();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            continue;
        }
        match classify(tag) {
            TagScope::Version => out.version.push(tag.to_string()),
            TagScope::Text => out.text.push(tag.to_string()),
            TagScope::Author => out.author.push(tag.to_string()),
        }
    }
    out
}

// ── Flat tags file ───────────────────────────────────────────────────────
//
// One line per version: `version_identifier<TAB>tag;tag;tag`.

pub fn parse_tags_file(path: &Path) -> Result<BTreeMap<String, Vec<String>>, ExtractError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ExtractError::Io { path: path.to_path_buf(), source })?;
    Ok(parse_tags_str(&content))
}

pub fn parse_tags_str(content: &str) -> BTreeMap<String, Vec<String>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((id, tags)) = line.split_once('\t') else {
            continue;
        };
        let entry = out.entry(id.trim().to_string()).or_default();
        for tag in tags.split(';') {
            let tag = tag.trim();
            if !tag.is_empty() {
                entry.push(tag.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mixed_list() {
        let c = classify_all(["SHOULD_BE_VERSION", "_GENRE_TAG", "born@REGION_R", "TopicA@Subtopic"]);
        assert_eq!(c.version, vec!["SHOULD_BE_VERSION"]);
        assert_eq!(c.text, vec!["_GENRE_TAG", "TopicA@Subtopic"]);
        assert_eq!(c.author, vec!["born@REGION_R"]);
    }

    #[test]
    fn test_workflow_keywords_win_over_everything() {
        // "_COMPLETED@X" is underscore-prefixed AND contains '@', but the
        // workflow keyword rule comes first.
        assert_eq!(classify("_COMPLETED@X"), TagScope::Version);
        assert_eq!(classify("mARkdown"), TagScope::Version);
        assert_eq!(classify("NO_MAJOR_ISSUES"), TagScope::Version);
        assert_eq!(classify("inProgress"), TagScope::Version);
    }

    #[test]
    fn test_geo_markers_before_generic_at() {
        // "died@X" contains '@' but is author-scoped by the earlier rule.
        assert_eq!(classify("died@BAGHDAD_RE"), TagScope::Author);
        assert_eq!(classify("resided@KUFA_S"), TagScope::Author);
    }

    #[test]
    fn test_bare_token_defaults_to_version() {
        assert_eq!(classify("CHECKED"), TagScope::Version);
    }

    #[test]
    fn test_parse_tags_file_format() {
        let m = parse_tags_str(
            "# comment\n0310Tabari.Tarikh.Shamela0009783-ara1\tmARkdown;_TARIKH\n\nbadline\n",
        );
        assert_eq!(m.len(), 1);
        assert_eq!(
            m["0310Tabari.Tarikh.Shamela0009783-ara1"],
            vec!["mARkdown", "_TARIKH"]
        );
    }
}
