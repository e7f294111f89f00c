use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use corpus_types::{EntityRef, RelationRecord};

use crate::error::ExtractError;
use crate::header::HeaderFields;
use crate::report::{Diagnostic, Diagnostics};

// ── Relation clause formats ──────────────────────────────────────────────
//
// A relation field holds clauses in two co-existing conventions:
//
//   (a) TYPE[.SUBTYPE][,TYPE2…]@TARGET
//       COMM.sharh@0255Jahiz.Hayawan
//       STUDENT@0360Author
//       ABR,SEL@0310Tabari.Tarikh
//
//   (b) TARGET (TYPE[.SUBTYPE])
//       0255Jahiz.Hayawan (COMM.sharh)
//
// Targets with a period are texts ("0255Jahiz.Hayawan"); without, persons
// ("0360Author"). Clauses are ;/:/newline separated.

static RE_PAREN_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<target>[^()]+?)\s*\((?P<types>[^()]+)\)$").unwrap());

static RE_TYPE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// Gazetteer-style place identifiers, shared by all four geographic
/// fields: BAGHDAD_RE, KUFA_S, REGION_R, …
static RE_GEO_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z][A-Za-z0-9]*_[A-Z]{1,2}\b").unwrap());

/// Author-style identifiers embedded in free-text teacher/student entries:
/// "al-Farra 0207Farra" → "0207Farra".
static RE_EMBEDDED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}[A-Za-z][A-Za-z0-9]*").unwrap());

/// The four person→place relation fields, scanned with RE_GEO_URI.
pub const GEO_FIELDS: [&str; 4] = ["BORN", "DIED", "RESID", "VISIT"];

// ── Relation-type vocabulary ─────────────────────────────────────────────

/// One row of the tab-separated relation-type definition table.
#[derive(Debug, Clone)]
pub struct RelationType {
    pub code: String,
    pub subtype: String,
    pub name: String,
    pub inverted_name: String,
    pub description: String,
}

/// Vocabulary seeded from the TSV table. Used for diagnostics only; an
/// unknown code is warned about but the record is still emitted.
#[derive(Debug, Default)]
pub struct RelationVocab {
    pub types: Vec<RelationType>,
    codes: BTreeSet<String>,
}

impl RelationVocab {
    pub fn from_tsv_file(path: &Path) -> Result<Self, ExtractError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ExtractError::Io { path: path.to_path_buf(), source })?;
        Self::from_tsv(&content, path)
    }

    pub fn from_tsv(content: &str, path: &Path) -> Result<Self, ExtractError> {
        let mut vocab = Self::default();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() < 2 {
                return Err(ExtractError::RelationTable {
                    path: path.to_path_buf(),
                    line: i + 1,
                    reason: format!("expected at least 2 tab-separated columns, got {}", cols.len()),
                });
            }
            let rt = RelationType {
                code: cols[0].trim().to_string(),
                subtype: cols[1].trim().to_string(),
                name: cols.get(2).map(|s| s.trim().to_string()).unwrap_or_default(),
                inverted_name: cols.get(3).map(|s| s.trim().to_string()).unwrap_or_default(),
                description: cols.get(4).map(|s| s.trim().to_string()).unwrap_or_default(),
            };
            vocab.codes.insert(rt.code.clone());
            vocab.types.push(rt);
        }
        Ok(vocab)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ── Run-scoped registries ────────────────────────────────────────────────

/// Deduplication registries scoped to a single run, passed explicitly into
/// extraction calls. They detect duplicates and inconsistencies within the
/// run; they never gate which records are emitted.
#[derive(Debug, Default)]
pub struct RunRegistries {
    /// gazetteer URI → authors referencing it
    pub places: BTreeMap<String, BTreeSet<String>>,
    /// (subject, object, code) edges seen so far, both directions
    relation_index: BTreeSet<(String, String, String)>,
}

impl RunRegistries {
    /// Register a text↔text edge under both endpoints; true if new.
    fn index_edge(&mut self, subject: &str, object: &str, code: &str) -> bool {
        let fresh = self
            .relation_index
            .insert((subject.to_string(), object.to_string(), code.to_string()));
        self.relation_index
            .insert((object.to_string(), subject.to_string(), code.to_string()));
        fresh
    }
}

// ── Free-text relation field ─────────────────────────────────────────────

/// Parse one relation field into typed records. `subject` is the clause's
/// source entity (a text identifier for text metadata, an author identifier
/// for author metadata).
pub fn parse_relation_field(
    subject: &str,
    raw: &str,
    vocab: &RelationVocab,
    reg: &mut RunRegistries,
    diags: &mut Diagnostics,
) -> Vec<RelationRecord> {
    let mut records = Vec::new();

    for clause in raw.split([';', ':', '\n']) {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }

        let (types_part, target) = match split_clause(clause) {
            Some(pair) => pair,
            None => {
                diags.push(Diagnostic::AmbiguousRelation {
                    subject: subject.to_string(),
                    clause: clause.to_string(),
                });
                continue;
            }
        };

        let object = entity_ref_for(&target);
        let mut any_valid = false;

        for type_token in types_part.split(',') {
            let type_token = type_token.trim();
            if type_token.is_empty() {
                continue;
            }
            let (code, subtype) = match type_token.split_once('.') {
                Some((main, sub)) => (main.to_string(), Some(sub.to_string())),
                None => (type_token.to_string(), None),
            };
            if !RE_TYPE_TOKEN.is_match(&code) {
                continue;
            }
            any_valid = true;

            if !vocab.is_empty() && !vocab.contains_code(&code) {
                diags.push(Diagnostic::UnknownRelationCode {
                    subject: subject.to_string(),
                    code: code.clone(),
                });
            }

            // Cross-index text↔text edges for duplicate detection only.
            if subject.contains('.') && target.contains('.') && !reg.index_edge(subject, &target, &code)
            {
                diags.push(Diagnostic::DuplicateRelation {
                    subject: subject.to_string(),
                    object: target.clone(),
                    code: code.clone(),
                });
            }

            records.push(RelationRecord {
                subject: entity_ref_for(subject),
                object: object.clone(),
                code,
                subtype,
                start_date: None,
                end_date: None,
            });
        }

        if !any_valid {
            diags.push(Diagnostic::AmbiguousRelation {
                subject: subject.to_string(),
                clause: clause.to_string(),
            });
        }
    }

    records
}

/// Split one clause into (types, target) handling both conventions.
fn split_clause(clause: &str) -> Option<(String, String)> {
    if let Some((types, target)) = clause.split_once('@') {
        let (types, target) = (types.trim(), target.trim());
        if types.is_empty() || target.is_empty() {
            return None;
        }
        return Some((types.to_string(), target.to_string()));
    }
    let caps = RE_PAREN_CLAUSE.captures(clause)?;
    Some((caps["types"].trim().to_string(), caps["target"].trim().to_string()))
}

/// Identifiers with a period are texts; the rest are persons.
fn entity_ref_for(id: &str) -> EntityRef {
    if id.contains('.') {
        EntityRef::text(id)
    } else {
        EntityRef::person(id)
    }
}

// ── Geographic relations ─────────────────────────────────────────────────

/// Scan the four dedicated geographic fields (AUTH#BORN, AUTH#DIED,
/// AUTH#RESID, AUTH#VISIT) for gazetteer URIs. Each occurrence produces
/// one person→place relation and registers the place.
pub fn extract_geo_relations(
    author: &str,
    fields: &HeaderFields,
    reg: &mut RunRegistries,
) -> Vec<RelationRecord> {
    let mut records = Vec::new();

    for code in GEO_FIELDS {
        let value = fields.get(&format!("AUTH#{code}"));
        if value.is_empty() {
            continue;
        }
        for m in RE_GEO_URI.find_iter(&value) {
            let uri = m.as_str();
            reg.places.entry(uri.to_string()).or_default().insert(author.to_string());
            records.push(RelationRecord {
                subject: EntityRef::person(author),
                object: EntityRef::place(uri),
                code: code.to_string(),
                subtype: None,
                start_date: None,
                end_date: None,
            });
        }
    }

    records
}

// ── Teacher / student relations ──────────────────────────────────────────

/// Parse the comma-separated teacher and student fields. Entries carry an
/// embedded author identifier ("al-Farrāʾ 0207Farra"); an entry whose full
/// text is not exactly the identifier is reported as a data-quality
/// warning, not dropped.
pub fn extract_person_relations(
    author: &str,
    fields: &HeaderFields,
    diags: &mut Diagnostics,
) -> Vec<RelationRecord> {
    let mut records = Vec::new();

    for (field, code) in [("AUTH#TEACHERS", "STUDENT"), ("AUTH#STUDENTS", "TEACHER")] {
        let value = fields.get(field);
        if value.is_empty() {
            continue;
        }
        for entry in value.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let Some(m) = RE_EMBEDDED_ID.find(entry) else {
                diags.push(Diagnostic::AmbiguousRelation {
                    subject: author.to_string(),
                    clause: entry.to_string(),
                });
                continue;
            };
            if m.as_str() != entry {
                diags.push(Diagnostic::IdentifierMismatch {
                    entry: entry.to_string(),
                    extracted: m.as_str().to_string(),
                });
            }
            records.push(RelationRecord {
                subject: EntityRef::person(author),
                object: EntityRef::person(m.as_str()),
                code: code.to_string(),
                subtype: None,
                start_date: None,
                end_date: None,
            });
        }
    }

    records
}
