use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Annotation workflow status ───────────────────────────────────────────

/// How far a digitized version has progressed through the annotation
/// workflow. Encoded in the version filename suffix:
///   0310Tabari.Tarikh.Shamela0009783-ara1            → NotYetAnnotated
///   0310Tabari.Tarikh.Shamela0009783-ara1.inProgress → InProgress
///   0310Tabari.Tarikh.Shamela0009783-ara1.completed  → Completed
///   0310Tabari.Tarikh.Shamela0009783-ara1.mARkdown   → Markdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationStatus {
    #[serde(rename = "notYetAnnotated")]
    NotYetAnnotated,
    #[serde(rename = "inProgress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "mARkdown")]
    Markdown,
}

impl AnnotationStatus {
    pub fn from_suffix(suffix: Option<&str>) -> Self {
        match suffix {
            Some("inProgress") => Self::InProgress,
            Some("completed") => Self::Completed,
            Some("mARkdown") => Self::Markdown,
            _ => Self::NotYetAnnotated,
        }
    }

    /// Ordering used by primary-version selection: higher tier wins.
    pub fn tier(&self) -> u8 {
        match self {
            Self::NotYetAnnotated => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
            Self::Markdown => 3,
        }
    }
}

/// Whether a version is the canonical digitization of its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisPriority {
    Primary,
    Secondary,
}

// ── Entity references ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Person,
    Text,
    Place,
}

/// A typed reference to one endpoint of a relation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn person(id: impl Into<String>) -> Self {
        Self { kind: EntityKind::Person, id: id.into() }
    }
    pub fn text(id: impl Into<String>) -> Self {
        Self { kind: EntityKind::Text, id: id.into() }
    }
    pub fn place(id: impl Into<String>) -> Self {
        Self { kind: EntityKind::Place, id: id.into() }
    }
}

// ── Relations ────────────────────────────────────────────────────────────

/// A typed edge between two entities.
///
/// `code` is the primary relation type (BORN, DIED, STUDENT, COMM, …),
/// `subtype` an optional secondary qualifier (e.g. COMM.sharh). Date bounds
/// are used for time-scoped relations such as WRITTEN.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationRecord {
    pub subject: EntityRef,
    pub object: EntityRef,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl RelationRecord {
    /// Check the kind constraints on subject/object for the known codes.
    /// Codes outside the constrained set are unconstrained.
    pub fn kinds_are_legal(&self) -> bool {
        match self.code.as_str() {
            "BORN" | "DIED" | "RESID" | "VISIT" => {
                self.subject.kind == EntityKind::Person && self.object.kind == EntityKind::Place
            }
            "STUDENT" | "TEACHER" => {
                self.subject.kind == EntityKind::Person && self.object.kind == EntityKind::Person
            }
            _ => true,
        }
    }
}

// ── Name elements ────────────────────────────────────────────────────────

/// Per-author, per-language name components. Unattested components are
/// empty strings; placeholder markers from the source are never stored.
/// Storage treats (author, language) as a composite unique key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameElements {
    pub author: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub shuhra: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kunya: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ism: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub laqab: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nasab: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nisba: String,
}

impl NameElements {
    pub fn is_empty(&self) -> bool {
        self.shuhra.is_empty()
            && self.kunya.is_empty()
            && self.ism.is_empty()
            && self.laqab.is_empty()
            && self.nasab.is_empty()
            && self.nisba.is_empty()
    }

    /// Join the non-shuhra components in conventional order.
    pub fn joined(&self) -> String {
        [&self.kunya, &self.ism, &self.laqab, &self.nasab, &self.nisba]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ── Author ───────────────────────────────────────────────────────────────

/// One author record. `identifier` is globally unique and is the join key
/// for every relation naming this author ("0310Tabari": 4-digit Hijri
/// death date + name token).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub identifier: String,
    /// language → raw concatenated name string
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub name_forms: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preferred_name_ar: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preferred_name_lat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date_hijri: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date_gregorian: Option<i32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bibliography: String,
}

// ── Text ─────────────────────────────────────────────────────────────────

/// One text record, child of exactly one author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRecord {
    pub identifier: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub titles_ar: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub titles_lat: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preferred_title_ar: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preferred_title_lat: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text_type: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bibliography: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

// ── Version ──────────────────────────────────────────────────────────────

/// Edition metadata harvested from the text's own header. These fields
/// have no other source in the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub editor: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub publisher: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub place: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date: String,
    /// Free-text combined form, "editor, publisher, place, date".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub combined: String,
}

impl EditionInfo {
    pub fn combine(&mut self) {
        self.combined = [&self.editor, &self.publisher, &self.place, &self.date]
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
    }
}

/// One digitized version of a text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub identifier: String,
    pub text: String,
    /// 3-letter language code from the filename, e.g. "ara", "per".
    pub language: String,
    pub char_length: usize,
    pub token_length: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_url: String,
    pub annotation_status: AnnotationStatus,
    pub analysis_priority: AnalysisPriority,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "edition_is_empty")]
    pub edition: EditionInfo,
}

fn edition_is_empty(e: &EditionInfo) -> bool {
    *e == EditionInfo::default()
}

// ── Place ────────────────────────────────────────────────────────────────

/// A place keyed by its gazetteer URI (e.g. "BAGHDAD_RE").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub names: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_status_from_suffix() {
        assert_eq!(AnnotationStatus::from_suffix(None), AnnotationStatus::NotYetAnnotated);
        assert_eq!(AnnotationStatus::from_suffix(Some("completed")), AnnotationStatus::Completed);
        assert_eq!(AnnotationStatus::from_suffix(Some("mARkdown")), AnnotationStatus::Markdown);
        assert_eq!(AnnotationStatus::from_suffix(Some("bogus")), AnnotationStatus::NotYetAnnotated);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(AnnotationStatus::Markdown.tier() > AnnotationStatus::Completed.tier());
        assert!(AnnotationStatus::Completed.tier() > AnnotationStatus::InProgress.tier());
        assert!(AnnotationStatus::InProgress.tier() > AnnotationStatus::NotYetAnnotated.tier());
    }

    #[test]
    fn test_relation_kind_constraints() {
        let died = RelationRecord {
            subject: EntityRef::person("0310Tabari"),
            object: EntityRef::place("BAGHDAD_RE"),
            code: "DIED".into(),
            subtype: None,
            start_date: None,
            end_date: None,
        };
        assert!(died.kinds_are_legal());

        let bad = RelationRecord {
            subject: EntityRef::person("0310Tabari"),
            object: EntityRef::text("0255Jahiz.Hayawan"),
            code: "BORN".into(),
            subtype: None,
            start_date: None,
            end_date: None,
        };
        assert!(!bad.kinds_are_legal());
    }

    #[test]
    fn test_name_elements_joined() {
        let ne = NameElements {
            author: "0310Tabari".into(),
            language: "LAT".into(),
            kunya: "Abū Jaʿfar".into(),
            ism: "Muḥammad".into(),
            nasab: "b. Jarīr".into(),
            ..Default::default()
        };
        assert_eq!(ne.joined(), "Abū Jaʿfar Muḥammad b. Jarīr");
    }
}
