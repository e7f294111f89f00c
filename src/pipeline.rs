use std::collections::BTreeMap;
use std::path::Path;

use corpus_types::{
    AuthorRecord, EditionInfo, NameElements, PlaceRecord, RelationRecord, TextRecord,
    VersionRecord,
};

use crate::dates::{self, DateResolver};
use crate::error::ExtractError;
use crate::harvest::{self, Category, Harvest, SynonymTable, TEXT_HEADER_END};
use crate::header::{self, HeaderFields};
use crate::names;
use crate::primary;
use crate::relations::{self, RelationVocab, RunRegistries};
use crate::report::{Diagnostic, Diagnostics};
use crate::scanner::{self, AuthorDir, TextDir};
use crate::tags;

// ── Run context ──────────────────────────────────────────────────────────

/// Everything one extraction run carries: configuration, the seeded
/// relation vocabulary, the flat version-tag table, and the run-scoped
/// registries. Passed explicitly so per-author processing has no hidden
/// shared state.
#[derive(Debug, Default)]
pub struct RunContext {
    pub dates: DateResolver,
    pub synonyms: SynonymTable,
    pub vocab: RelationVocab,
    /// version identifier → undifferentiated tag list (flat tags file)
    pub version_tags: BTreeMap<String, Vec<String>>,
    pub registries: RunRegistries,
    pub diagnostics: Diagnostics,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The assembled output of one run, handed to the storage collaborator as
/// upserts keyed by each record's identifier.
#[derive(Debug, Default, serde::Serialize)]
pub struct RecordSet {
    pub authors: Vec<AuthorRecord>,
    pub name_elements: Vec<NameElements>,
    pub texts: Vec<TextRecord>,
    pub versions: Vec<VersionRecord>,
    pub places: Vec<PlaceRecord>,
    pub relations: Vec<RelationRecord>,
}

impl RecordSet {
    /// Sort every record vector by its natural key so emission order is
    /// deterministic across runs.
    fn sort(&mut self) {
        self.authors.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        self.name_elements
            .sort_by(|a, b| (&a.author, &a.language).cmp(&(&b.author, &b.language)));
        self.texts.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        self.versions.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        self.places.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        self.relations.sort();
    }
}

// ── Run ──────────────────────────────────────────────────────────────────

/// Walk the corpus and assemble the full record set. Each author subtree
/// is processed independently; only the run registries cross subtrees, and
/// those exist for duplicate detection, not correctness.
pub fn run(root: &Path, ctx: &mut RunContext) -> Result<RecordSet, ExtractError> {
    std::fs::read_dir(root)
        .map_err(|source| ExtractError::CorpusRoot { path: root.to_path_buf(), source })?;

    let author_dirs = scanner::scan_corpus(root, &mut ctx.diagnostics);

    let mut out = RecordSet::default();
    for dir in &author_dirs {
        process_author(dir, ctx, &mut out);
    }

    // The places-seen registry becomes the place records; creation requests
    // are emitted once per URI regardless of how many authors reference it.
    for uri in ctx.registries.places.keys() {
        out.places.push(PlaceRecord { identifier: uri.clone(), names: Default::default() });
    }

    out.sort();
    Ok(out)
}

// ── Author assembly ──────────────────────────────────────────────────────

pub fn process_author(dir: &AuthorDir, ctx: &mut RunContext, out: &mut RecordSet) {
    let fields = read_fields(dir.meta_file.as_deref(), ctx);

    let resolved = names::resolve_names(&dir.identifier, &fields);
    out.name_elements.extend(resolved.elements.iter().cloned());

    let mut author = AuthorRecord {
        identifier: dir.identifier.clone(),
        name_forms: resolved.name_forms.clone(),
        preferred_name_ar: resolved.preferred_ar.clone(),
        preferred_name_lat: resolved.preferred_lat.clone(),
        death_date_hijri: death_date_hijri(&dir.identifier, &fields, ctx),
        death_date_gregorian: None,
        notes: fields.get("AUTH#NOTES"),
        bibliography: fields.get("AUTH#BIBLIO"),
        ..Default::default()
    };
    author.death_date_gregorian = author.death_date_hijri.map(dates::ah_to_ce);

    let mut geo = relations::extract_geo_relations(&dir.identifier, &fields, &mut ctx.registries);
    // Time-scope the death-place relation with the resolved date range.
    let died_raw = fields.get("AUTH#DIED#AH");
    if !died_raw.is_empty() && dates::is_well_formed(&died_raw) {
        let (start, end) = ctx.dates.resolve_range(&died_raw);
        for r in geo.iter_mut().filter(|r| r.code == "DIED") {
            r.start_date = Some(start.clone());
            r.end_date = Some(end.clone());
        }
    }
    out.relations.extend(geo);
    out.relations.extend(relations::extract_person_relations(
        &dir.identifier,
        &fields,
        &mut ctx.diagnostics,
    ));

    for text_dir in &dir.texts {
        process_text(text_dir, &mut author, ctx, out);
    }

    out.authors.push(author);
}

/// Death date: the explicit AUTH#DIED#AH field when its year is fully
/// numeric, else the 4-digit identifier prefix.
fn death_date_hijri(identifier: &str, fields: &HeaderFields, ctx: &mut RunContext) -> Option<u32> {
    let raw = fields.get("AUTH#DIED#AH");
    if !raw.is_empty() {
        if !dates::is_well_formed(&raw) {
            ctx.diagnostics.push(Diagnostic::UnparseableDate {
                identifier: identifier.to_string(),
                raw: raw.clone(),
            });
        } else if let Some(year) = raw.split('-').next().and_then(|y| y.parse::<u32>().ok()) {
            return Some(year);
        }
    }
    identifier.get(..4).and_then(|p| p.parse().ok())
}

// ── Text assembly ────────────────────────────────────────────────────────

fn process_text(
    dir: &TextDir,
    author: &mut AuthorRecord,
    ctx: &mut RunContext,
    out: &mut RecordSet,
) {
    let fields = read_fields(dir.meta_file.as_deref(), ctx);

    let mut text = TextRecord {
        identifier: dir.identifier.clone(),
        author: author.identifier.clone(),
        titles_ar: fields.get_items("TEXT#TITLE#AR").into_iter().collect(),
        titles_lat: fields.get_items("TEXT#TITLE#LAT").into_iter().collect(),
        text_type: fields
            .get_items("TEXT#GENRES")
            .into_iter()
            .next()
            .unwrap_or_default(),
        bibliography: fields.get("TEXT#BIBLIO"),
        notes: fields.get("TEXT#NOTES"),
        ..Default::default()
    };
    text.preferred_title_ar = text.titles_ar.iter().next().cloned().unwrap_or_default();
    text.preferred_title_lat = text.titles_lat.iter().next().cloned().unwrap_or_default();

    // Every text record is expected to carry a relations field; its
    // absence is a diagnostic and the text proceeds relation-less.
    match fields.fields.get("TEXT#RELATIONS") {
        Some(raw) if !raw.is_empty() => {
            let raw = raw.clone();
            out.relations.extend(relations::parse_relation_field(
                &dir.identifier,
                &header::clean(&raw),
                &ctx.vocab,
                &mut ctx.registries,
                &mut ctx.diagnostics,
            ));
        }
        _ => {
            if dir.meta_file.is_some() {
                ctx.diagnostics.push(Diagnostic::MissingField {
                    identifier: dir.identifier.clone(),
                    field: "TEXT#RELATIONS".to_string(),
                });
            }
        }
    }

    // Versions: all collected before primary selection runs.
    let mut versions: Vec<VersionRecord> = Vec::new();
    for vf in &dir.versions {
        match assemble_version(vf, author, &mut text, ctx) {
            Some(v) => versions.push(v),
            None => continue,
        }
    }
    primary::select_primary(&mut versions);
    out.versions.extend(versions);

    out.texts.push(text);
}

fn assemble_version(
    vf: &scanner::VersionFile,
    author: &mut AuthorRecord,
    text: &mut TextRecord,
    ctx: &mut RunContext,
) -> Option<VersionRecord> {
    let content = match std::fs::read_to_string(&vf.path) {
        Ok(c) => c,
        Err(_) => {
            ctx.diagnostics
                .push(Diagnostic::UnreadableFile { path: vf.path.display().to_string() });
            return None;
        }
    };

    let harvested = harvest::harvest_str(&content, &ctx.synonyms);
    let (char_length, token_length) = body_stats(&content);

    // Undifferentiated tags for this version, split across the three scopes.
    let raw_tags = ctx.version_tags.get(&vf.identifier).cloned().unwrap_or_default();
    let classified = tags::classify_all(&raw_tags);
    text.tags.extend(classified.text);
    author.tags.extend(classified.author);

    apply_harvest_fallbacks(&harvested, author, text);

    let mut edition = EditionInfo {
        editor: harvested.first(Category::EditionEditor),
        publisher: harvested.first(Category::EditionPublisher),
        place: harvested.first(Category::EditionPlace),
        date: harvested.first(Category::EditionDate),
        combined: String::new(),
    };
    edition.combine();

    let source_url = harvested
        .all
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case("url"))
        .map(|(_, v)| v.clone())
        .unwrap_or_default();

    Some(VersionRecord {
        identifier: vf.identifier.clone(),
        text: text.identifier.clone(),
        language: vf.language.clone(),
        char_length,
        token_length,
        source_url,
        annotation_status: vf.status,
        analysis_priority: corpus_types::AnalysisPriority::Secondary,
        tags: classified.version.into_iter().collect(),
        edition,
    })
}

/// Harvested header metadata supplements author name and title only when
/// the metadata files provided none; edition fields always come from it.
fn apply_harvest_fallbacks(harvested: &Harvest, author: &mut AuthorRecord, text: &mut TextRecord) {
    if author.preferred_name_ar.is_empty() {
        author.preferred_name_ar = harvested.first(Category::AuthorName);
    }
    if text.titles_ar.is_empty() {
        let title = harvested.first(Category::Title);
        if !title.is_empty() {
            text.preferred_title_ar = title.clone();
            text.titles_ar.insert(title);
        }
    }
    if text.text_type.is_empty() {
        text.text_type = harvested.first(Category::Genre);
    }
}

/// Character and token counts of the literary body, excluding the in-band
/// header.
fn body_stats(content: &str) -> (usize, usize) {
    let body = match content.split_once(TEXT_HEADER_END) {
        Some((_, body)) => body,
        None => content,
    };
    (body.chars().count(), body.split_whitespace().count())
}

fn read_fields(meta_file: Option<&Path>, ctx: &mut RunContext) -> HeaderFields {
    let Some(path) = meta_file else {
        return HeaderFields::default();
    };
    match header::parse_meta_file(path) {
        Ok(fields) => {
            for line in &fields.unreadable {
                ctx.diagnostics.push(Diagnostic::UnreadableLine {
                    file: path.display().to_string(),
                    line: line.clone(),
                });
            }
            fields
        }
        Err(_) => {
            ctx.diagnostics
                .push(Diagnostic::UnreadableFile { path: path.display().to_string() });
            HeaderFields::default()
        }
    }
}
