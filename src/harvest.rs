use std::collections::BTreeMap;

// ── In-band text header ──────────────────────────────────────────────────
//
// The literary text files carry their own free-text metadata in the first
// lines, under a different marker than the .meta files:
//
//   #META# 000.SortField :: Shamela_0009783
//   #META# العنوان :: تاريخ الرسل والملوك
//   #META# المؤلف :: محمد بن جرير الطبري
//   #META# المحقق :: محمد أبو الفضل إبراهيم
//   #META# الناشر :: دار المعارف
//   #META# سنة النشر: 1387
//   #META#Header#End
//
// Labels are looked up in a language-mixed synonym table; anything
// unmapped is kept in a side table for diagnostics but does not feed the
// categorized output.

/// Marker prefix of in-band metadata lines.
pub const META_MARKER: &str = "#META#";

/// End of the in-band header; the literary text proper starts after it.
pub const TEXT_HEADER_END: &str = "#META#Header#End";

/// Never scan past this many lines looking for header metadata.
pub const HARVEST_LINE_CEILING: usize = 100;

/// Categories the synonym table maps labels onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    AuthorName,
    Title,
    Date,
    Genre,
    EditionEditor,
    EditionPublisher,
    EditionPlace,
    EditionDate,
}

// ── Synonym table ────────────────────────────────────────────────────────

/// label (lowercased) → category. Injectable so new corpus spellings can
/// be added without touching the parsing logic.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    map: BTreeMap<String, Category>,
}

/// Builtin label spellings across Arabic, Latin/English and Persian.
const BUILTIN_SYNONYMS: &[(&str, Category)] = &[
    // Author
    ("المؤلف", Category::AuthorName),
    ("مؤلف", Category::AuthorName),
    ("اسم المؤلف", Category::AuthorName),
    ("author", Category::AuthorName),
    ("author name", Category::AuthorName),
    ("al-muʾallif", Category::AuthorName),
    ("نویسنده", Category::AuthorName),
    ("نام مؤلف", Category::AuthorName),
    // Title
    ("العنوان", Category::Title),
    ("عنوان", Category::Title),
    ("عنوان الكتاب", Category::Title),
    ("الكتاب", Category::Title),
    ("title", Category::Title),
    ("book title", Category::Title),
    ("نام كتاب", Category::Title),
    // Date
    ("التاريخ", Category::Date),
    ("تاريخ", Category::Date),
    ("تاريخ الوفاة", Category::Date),
    ("date", Category::Date),
    ("death date", Category::Date),
    ("سال وفات", Category::Date),
    // Genre
    ("الموضوع", Category::Genre),
    ("موضوع", Category::Genre),
    ("فن", Category::Genre),
    ("genre", Category::Genre),
    ("subject", Category::Genre),
    // Edition: editor
    ("المحقق", Category::EditionEditor),
    ("تحقيق", Category::EditionEditor),
    ("محقق", Category::EditionEditor),
    ("مصحح", Category::EditionEditor),
    ("editor", Category::EditionEditor),
    // Edition: publisher
    ("الناشر", Category::EditionPublisher),
    ("دار النشر", Category::EditionPublisher),
    ("ناشر", Category::EditionPublisher),
    ("publisher", Category::EditionPublisher),
    // Edition: place
    ("مكان النشر", Category::EditionPlace),
    ("مدينة النشر", Category::EditionPlace),
    ("محل نشر", Category::EditionPlace),
    ("place of publication", Category::EditionPlace),
    // Edition: date
    ("سنة النشر", Category::EditionDate),
    ("سنة الطبع", Category::EditionDate),
    ("تاريخ النشر", Category::EditionDate),
    ("سال چاپ", Category::EditionDate),
    ("publication date", Category::EditionDate),
    ("edition date", Category::EditionDate),
];

impl Default for SynonymTable {
    fn default() -> Self {
        let map = BUILTIN_SYNONYMS
            .iter()
            .map(|(label, cat)| (label.to_string(), *cat))
            .collect();
        Self { map }
    }
}

impl SynonymTable {
    /// Extend the builtin table with corpus-specific spellings.
    pub fn with_entries(mut self, entries: &[(&str, Category)]) -> Self {
        for (label, cat) in entries {
            self.map.insert(normalize_label(label), *cat);
        }
        self
    }

    pub fn lookup(&self, label: &str) -> Option<Category> {
        self.map.get(&normalize_label(label)).copied()
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().trim_matches(['.', '؛', ':']).trim().to_lowercase()
}

// ── Harvest ──────────────────────────────────────────────────────────────

/// Harvested header metadata: categorized values plus the full label/value
/// side table (including unmapped labels, for diagnostics).
#[derive(Debug, Default)]
pub struct Harvest {
    pub by_category: BTreeMap<Category, Vec<String>>,
    pub all: Vec<(String, String)>,
}

impl Harvest {
    /// First harvested value for a category, empty if none.
    pub fn first(&self, cat: Category) -> String {
        self.by_category
            .get(&cat)
            .and_then(|v| v.first())
            .cloned()
            .unwrap_or_default()
    }
}

/// Scan the first lines of a literary text for `#META#` metadata lines.
pub fn harvest_str(content: &str, table: &SynonymTable) -> Harvest {
    let mut out = Harvest::default();

    for line in content.lines().take(HARVEST_LINE_CEILING) {
        let line = line.trim();
        if line == TEXT_HEADER_END {
            break;
        }
        let Some(rest) = line.strip_prefix(META_MARKER) else {
            continue;
        };

        // Prefer the double-colon separator, fall back to the first colon.
        let (label, value) = match rest.split_once("::") {
            Some((l, v)) => (l, v),
            None => match rest.split_once(':') {
                Some((l, v)) => (l, v),
                None => continue,
            },
        };
        let label = label.trim();
        let value = normalize_value(value.trim());
        if label.is_empty() || value.is_empty() {
            continue;
        }

        out.all.push((label.to_string(), value.clone()));
        if let Some(cat) = table.lookup(label) {
            out.by_category.entry(cat).or_default().push(value);
        }
    }

    out
}

/// Numeric-looking values lose their leading zeros ("0923" → "923").
fn normalize_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        let stripped = value.trim_start_matches('0');
        if stripped.is_empty() { "0".to_string() } else { stripped.to_string() }
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
#META# العنوان :: تاريخ الرسل والملوك
#META# المؤلف :: محمد بن جرير الطبري
#META# المحقق :: محمد أبو الفضل إبراهيم
#META# الناشر :: دار المعارف
#META# سنة النشر: 01387
#META# 000.SortField :: Shamela_0009783
#META#Header#End
body text starts here
#META# الكتاب :: should not be read
";

    #[test]
    fn test_harvest_categorized() {
        let h = harvest_str(SAMPLE, &SynonymTable::default());
        assert_eq!(h.first(Category::Title), "تاريخ الرسل والملوك");
        assert_eq!(h.first(Category::AuthorName), "محمد بن جرير الطبري");
        assert_eq!(h.first(Category::EditionEditor), "محمد أبو الفضل إبراهيم");
        assert_eq!(h.first(Category::EditionPublisher), "دار المعارف");
    }

    #[test]
    fn test_single_colon_fallback_and_zero_stripping() {
        let h = harvest_str(SAMPLE, &SynonymTable::default());
        assert_eq!(h.first(Category::EditionDate), "1387");
    }

    #[test]
    fn test_unmapped_label_in_side_table_only() {
        let h = harvest_str(SAMPLE, &SynonymTable::default());
        assert!(h.all.iter().any(|(l, _)| l == "000.SortField"));
        let categorized: usize = h.by_category.values().map(Vec::len).sum();
        assert_eq!(categorized, 5);
        assert_eq!(h.all.len(), 6);
    }

    #[test]
    fn test_stops_at_header_end() {
        let h = harvest_str(SAMPLE, &SynonymTable::default());
        assert!(h.by_category[&Category::Title].len() == 1);
    }

    #[test]
    fn test_injectable_synonyms() {
        let table =
            SynonymTable::default().with_entries(&[("digitized by", Category::EditionPublisher)]);
        let h = harvest_str("#META# Digitized By :: al-Maktaba al-Shamela\n", &table);
        assert_eq!(h.first(Category::EditionPublisher), "al-Maktaba al-Shamela");
    }

    #[test]
    fn test_english_labels() {
        let h = harvest_str("#META# Title :: The Book of Animals\n", &SynonymTable::default());
        assert_eq!(h.first(Category::Title), "The Book of Animals");
    }
}
