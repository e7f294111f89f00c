use serde::Serialize;

// ── Diagnostics channel ──────────────────────────────────────────────────
//
// Every recoverable problem in a run lands here: the record in question is
// skipped or defaulted, the run continues, and the operator gets the full
// list at the end. Nothing in the pipeline prompts or aborts.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    /// A filename matching no known corpus convention.
    UnexpectedFile { path: String },
    /// An author or text directory without its metadata file.
    MissingMeta { identifier: String, expected: String },
    /// A header line with no recognizable field separator.
    UnreadableLine { file: String, line: String },
    /// A discovered file whose contents could not be read.
    UnreadableFile { path: String },
    /// A field the record format expects but the file does not carry.
    MissingField { identifier: String, field: String },
    /// A relation clause with no recognizable type token.
    AmbiguousRelation { subject: String, clause: String },
    /// A relation code absent from the seeded vocabulary.
    UnknownRelationCode { subject: String, code: String },
    /// A teacher/student entry whose text differs from the extracted id.
    IdentifierMismatch { entry: String, extracted: String },
    /// A second version file carrying an already-seen identifier.
    DuplicateVersion { identifier: String, path: String },
    /// A date string that resolved only to full-range uncertainty.
    UnparseableDate { identifier: String, raw: String },
    /// Two texts claiming the same relation edge.
    DuplicateRelation { subject: String, object: String, code: String },
}

/// Collected warnings for one run, emitted alongside the record sets.
#[derive(Debug, Default, Serialize)]
pub struct Diagnostics {
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, d: Diagnostic) {
        tracing::warn!(?d, "extraction diagnostic");
        self.warnings.push(d);
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Count warnings per kind label, for the end-of-run summary.
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        let mut counts: std::collections::BTreeMap<&'static str, usize> = Default::default();
        for w in &self.warnings {
            let label = match w {
                Diagnostic::UnexpectedFile { .. } => "unexpected-file",
                Diagnostic::MissingMeta { .. } => "missing-meta",
                Diagnostic::UnreadableLine { .. } => "unreadable-line",
                Diagnostic::UnreadableFile { .. } => "unreadable-file",
                Diagnostic::MissingField { .. } => "missing-field",
                Diagnostic::AmbiguousRelation { .. } => "ambiguous-relation",
                Diagnostic::UnknownRelationCode { .. } => "unknown-relation-code",
                Diagnostic::IdentifierMismatch { .. } => "identifier-mismatch",
                Diagnostic::DuplicateVersion { .. } => "duplicate-version",
                Diagnostic::UnparseableDate { .. } => "unparseable-date",
                Diagnostic::DuplicateRelation { .. } => "duplicate-relation",
            };
            *counts.entry(label).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    }
}
