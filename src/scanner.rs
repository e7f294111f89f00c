use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use corpus_types::AnnotationStatus;

use crate::report::{Diagnostic, Diagnostics};

// ── Filename conventions ─────────────────────────────────────────────────
//
// Expected directory layout:
//   {root}/{era}/{author}/{author}.meta
//   {root}/{era}/{author}/{author.text}/{author.text}.meta
//   {root}/{era}/{author}/{author.text}/{author.text.Code-lang1[.stage]}
//
// Real data examples:
//   0325AH/0310Tabari/0310Tabari.meta
//   0325AH/0310Tabari/0310Tabari.Tarikh/0310Tabari.Tarikh.meta
//   0325AH/0310Tabari/0310Tabari.Tarikh/0310Tabari.Tarikh.Shamela0009783-ara1.completed
//   0275AH/0255Jahiz/0255Jahiz.Hayawan/0255Jahiz.Hayawan.Shia0012129-ara1

static RE_ERA_DIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}AH$").unwrap());

static RE_AUTHOR_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}[A-Za-z]+$").unwrap());

static RE_VERSION_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<author>\d{4}[A-Za-z]+)\.(?P<text>[A-Za-z0-9]+)\.(?P<code>[A-Za-z]+\d+(?:Vols)?)-(?P<lang>[a-z]{3})(?P<copy>\d+)(?:\.(?P<stage>inProgress|completed|mARkdown))?$",
    )
    .unwrap()
});

/// Suffix of author- and text-level metadata files.
pub const META_SUFFIX: &str = ".meta";

// ── Discovered corpus shapes ─────────────────────────────────────────────

/// One digitized version file discovered under a text directory.
#[derive(Debug, Clone)]
pub struct VersionFile {
    /// Identifier without the annotation-stage suffix,
    /// e.g. "0310Tabari.Tarikh.Shamela0009783-ara1".
    pub identifier: String,
    pub version_code: String,
    /// 3-letter language code, e.g. "ara".
    pub language: String,
    pub status: AnnotationStatus,
    pub path: PathBuf,
}

/// One text directory with its metadata file and version files.
#[derive(Debug)]
pub struct TextDir {
    pub identifier: String,
    pub meta_file: Option<PathBuf>,
    pub versions: Vec<VersionFile>,
}

/// One author directory with its metadata file and text directories.
#[derive(Debug)]
pub struct AuthorDir {
    pub identifier: String,
    pub era: String,
    pub meta_file: Option<PathBuf>,
    pub texts: Vec<TextDir>,
}

// ── Corpus walk ──────────────────────────────────────────────────────────

/// Scan the corpus root and discover all author/text/version subtrees.
///
/// Entries are visited in sorted filename order so repeated runs see the
/// same sequence (duplicate resolution downstream is first-wins). Files
/// matching no convention produce an `UnexpectedFile` warning and are
/// skipped; missing metadata files produce `MissingMeta` and processing
/// continues with identifier-derived defaults downstream.
pub fn scan_corpus(root: &Path, diags: &mut Diagnostics) -> Vec<AuthorDir> {
    let mut authors = Vec::new();

    for era_dir in sorted_dirs(root) {
        let era = dir_name(&era_dir);
        if !RE_ERA_DIR.is_match(&era) {
            diags.push(Diagnostic::UnexpectedFile { path: era_dir.display().to_string() });
            continue;
        }

        for author_dir in sorted_dirs(&era_dir) {
            let identifier = dir_name(&author_dir);
            if !RE_AUTHOR_DIR.is_match(&identifier) {
                diags.push(Diagnostic::UnexpectedFile { path: author_dir.display().to_string() });
                continue;
            }
            authors.push(scan_author(&author_dir, &identifier, &era, diags));
        }
    }

    authors
}

fn scan_author(dir: &Path, identifier: &str, era: &str, diags: &mut Diagnostics) -> AuthorDir {
    let expected_meta = format!("{identifier}{META_SUFFIX}");
    let mut meta_file = None;
    let mut texts = Vec::new();

    for entry in sorted_entries(dir) {
        let name = dir_name(&entry);

        if entry.is_file() {
            if name == expected_meta {
                meta_file = Some(entry);
            } else {
                diags.push(Diagnostic::UnexpectedFile { path: entry.display().to_string() });
            }
            continue;
        }

        // Text directories are "<author>.<TextToken>"
        let is_text_dir = name
            .strip_prefix(identifier)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_alphanumeric()));
        if is_text_dir {
            texts.push(scan_text(&entry, &name, diags));
        } else {
            diags.push(Diagnostic::UnexpectedFile { path: entry.display().to_string() });
        }
    }

    if meta_file.is_none() {
        diags.push(Diagnostic::MissingMeta {
            identifier: identifier.to_string(),
            expected: expected_meta,
        });
    }

    AuthorDir { identifier: identifier.to_string(), era: era.to_string(), meta_file, texts }
}

fn scan_text(dir: &Path, identifier: &str, diags: &mut Diagnostics) -> TextDir {
    let expected_meta = format!("{identifier}{META_SUFFIX}");
    let mut meta_file = None;
    let mut versions: Vec<VersionFile> = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path().to_path_buf();
        let name = dir_name(&path);

        if !path.is_file() {
            diags.push(Diagnostic::UnexpectedFile { path: path.display().to_string() });
            continue;
        }
        if name == expected_meta {
            meta_file = Some(path);
            continue;
        }

        match parse_version_filename(&name) {
            Some((version_identifier, code, lang, status)) => {
                // First-wins on duplicate identifiers (same version digitized
                // at two annotation stages, or a stray copy).
                if versions.iter().any(|v| v.identifier == version_identifier) {
                    diags.push(Diagnostic::DuplicateVersion {
                        identifier: version_identifier,
                        path: path.display().to_string(),
                    });
                    continue;
                }
                versions.push(VersionFile {
                    identifier: version_identifier,
                    version_code: code,
                    language: lang,
                    status,
                    path,
                });
            }
            None => {
                diags.push(Diagnostic::UnexpectedFile { path: path.display().to_string() });
            }
        }
    }

    if meta_file.is_none() {
        diags.push(Diagnostic::MissingMeta {
            identifier: identifier.to_string(),
            expected: expected_meta,
        });
    }

    TextDir { identifier: identifier.to_string(), meta_file, versions }
}

/// Parse a version filename into (identifier, version code, language, status).
/// The identifier excludes the annotation-stage suffix so the same version
/// keeps its key as it moves through the workflow.
pub fn parse_version_filename(name: &str) -> Option<(String, String, String, AnnotationStatus)> {
    let caps = RE_VERSION_FILE.captures(name)?;
    let author = caps.name("author")?.as_str();
    let text = caps.name("text")?.as_str();
    let code = caps.name("code")?.as_str();
    let lang = caps.name("lang")?.as_str();
    let copy = caps.name("copy")?.as_str();
    let status = AnnotationStatus::from_suffix(caps.name("stage").map(|m| m.as_str()));

    let identifier = format!("{author}.{text}.{code}-{lang}{copy}");
    Some((identifier, code.to_string(), lang.to_string(), status))
}

// ── Directory helpers ────────────────────────────────────────────────────

fn dir_name(p: &Path) -> String {
    p.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string()
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();
    entries
}

fn sorted_dirs(dir: &Path) -> Vec<PathBuf> {
    sorted_entries(dir).into_iter().filter(|p| p.is_dir()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_filename_plain() {
        let (id, code, lang, status) =
            parse_version_filename("0255Jahiz.Hayawan.Shia0012129-ara1").unwrap();
        assert_eq!(id, "0255Jahiz.Hayawan.Shia0012129-ara1");
        assert_eq!(code, "Shia0012129");
        assert_eq!(lang, "ara");
        assert_eq!(status, AnnotationStatus::NotYetAnnotated);
    }

    #[test]
    fn test_parse_version_filename_with_stage() {
        let (id, _, _, status) =
            parse_version_filename("0310Tabari.Tarikh.Shamela0009783-ara1.mARkdown").unwrap();
        // Identifier drops the stage suffix.
        assert_eq!(id, "0310Tabari.Tarikh.Shamela0009783-ara1");
        assert_eq!(status, AnnotationStatus::Markdown);
    }

    #[test]
    fn test_parse_version_filename_rejects_noise() {
        assert!(parse_version_filename("0310Tabari.Tarikh.meta").is_none());
        assert!(parse_version_filename("notes.txt").is_none());
        assert!(parse_version_filename("0310Tabari.Tarikh.Shamela0009783-arabic1").is_none());
    }

    #[test]
    fn test_scan_corpus_tree() {
        let root = tempfile::tempdir().unwrap();
        let text_dir = root.path().join("0325AH/0310Tabari/0310Tabari.Tarikh");
        std::fs::create_dir_all(&text_dir).unwrap();
        std::fs::write(root.path().join("0325AH/0310Tabari/0310Tabari.meta"), "").unwrap();
        std::fs::write(text_dir.join("0310Tabari.Tarikh.meta"), "").unwrap();
        std::fs::write(text_dir.join("0310Tabari.Tarikh.Shamela0009783-ara1.completed"), "")
            .unwrap();
        std::fs::write(text_dir.join("stray.txt"), "").unwrap();

        let mut diags = Diagnostics::default();
        let authors = scan_corpus(root.path(), &mut diags);

        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].identifier, "0310Tabari");
        assert_eq!(authors[0].era, "0325AH");
        assert!(authors[0].meta_file.is_some());
        assert_eq!(authors[0].texts.len(), 1);
        assert_eq!(authors[0].texts[0].versions.len(), 1);
        assert_eq!(authors[0].texts[0].versions[0].language, "ara");

        // The stray file is a warning, not an error.
        assert!(diags
            .warnings
            .iter()
            .any(|d| matches!(d, Diagnostic::UnexpectedFile { path } if path.ends_with("stray.txt"))));
    }

    #[test]
    fn test_scan_reports_missing_meta() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("0300AH/0279Baladhuri")).unwrap();

        let mut diags = Diagnostics::default();
        let authors = scan_corpus(root.path(), &mut diags);

        assert_eq!(authors.len(), 1);
        assert!(authors[0].meta_file.is_none());
        assert!(diags
            .warnings
            .iter()
            .any(|d| matches!(d, Diagnostic::MissingMeta { identifier, .. } if identifier == "0279Baladhuri")));
    }

    #[test]
    fn test_duplicate_version_first_wins() {
        let root = tempfile::tempdir().unwrap();
        let text_dir = root.path().join("0325AH/0310Tabari/0310Tabari.Tarikh");
        std::fs::create_dir_all(&text_dir).unwrap();
        // Same identifier at two annotation stages: sorted order visits the
        // suffix-free file first, the .completed copy is reported.
        std::fs::write(text_dir.join("0310Tabari.Tarikh.Shamela0009783-ara1"), "").unwrap();
        std::fs::write(text_dir.join("0310Tabari.Tarikh.Shamela0009783-ara1.completed"), "")
            .unwrap();

        let mut diags = Diagnostics::default();
        let authors = scan_corpus(root.path(), &mut diags);

        assert_eq!(authors[0].texts[0].versions.len(), 1);
        assert_eq!(
            authors[0].texts[0].versions[0].status,
            AnnotationStatus::NotYetAnnotated
        );
        assert!(diags
            .warnings
            .iter()
            .any(|d| matches!(d, Diagnostic::DuplicateVersion { .. })));
    }
}
