use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use corpus_types::NameElements;

use crate::header::HeaderFields;
use crate::translit;

// ── Name resolution ──────────────────────────────────────────────────────
//
// Per-language name components arrive as header fields:
//   AUTH#SHUHRA##AR: al-Ṭabarī
//   AUTH#KUNYA###AR: Abū Jaʿfar
//   AUTH#ISM#####AR: Muḥammad
//   AUTH#NASAB###AR: b. Jarīr b. Yazīd
//   AUTH#NISBA###AR: al-Āmulī
//   AUTH#SHUHRA##FA: Ṭabarī
//
// Values are transliterated; languages other than EN/LAT get an
// Arabic-script rendering, with the romanized original filed under the
// "LAT" slot (the one slot storage may see twice per author).

/// Placeholder name values meaning "unattested". Never stored.
pub const NAME_PLACEHOLDERS: &[&str] = &[
    "Fulān",
    "Fulāna",
    "Fulān b. Fulān",
    "Fulāna bt. Fulān",
    "Ibn Fulān",
];

/// Language slot for romanized (Latin-transcription) name forms.
pub const LAT: &str = "LAT";

/// Field-key suffixes that look like languages but are calendar codes.
const DATE_CODES: &[&str] = &["AH", "CE"];

static RE_AUTH_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^AUTH#(?P<component>[A-Z]+)#(?P<lang>[A-Z]{2,3})$").unwrap());

const COMPONENTS: &[&str] = &["SHUHRA", "KUNYA", "ISM", "LAQAB", "NASAB", "NISBA"];

/// Everything name-related resolved for one author.
#[derive(Debug, Default)]
pub struct ResolvedNames {
    pub elements: Vec<NameElements>,
    /// language → preferred raw name string, for the author record.
    pub name_forms: BTreeMap<String, String>,
    pub preferred_ar: String,
    pub preferred_lat: String,
}

pub fn resolve_names(author_id: &str, fields: &HeaderFields) -> ResolvedNames {
    let mut out = ResolvedNames::default();

    // Languages present in the source, by field-key suffix scan.
    let mut languages: BTreeSet<String> = BTreeSet::new();
    for key in fields.fields.keys() {
        if let Some(caps) = RE_AUTH_KEY.captures(key) {
            let lang = caps.name("lang").unwrap().as_str();
            if !DATE_CODES.contains(&lang) {
                languages.insert(lang.to_string());
            }
        }
    }

    for lang in &languages {
        let raw = collect_elements(author_id, lang, fields);
        if raw.is_empty() {
            continue;
        }

        let display = preferred_form(&raw);
        out.name_forms.insert(lang.clone(), display);

        if lang == "EN" || lang == LAT {
            out.elements.push(raw);
        } else {
            // Arabic-script rendering under the source language, romanized
            // original under the LAT slot.
            out.elements.push(arabicize(&raw));
            let mut lat = raw;
            lat.language = LAT.to_string();
            out.elements.push(lat);
        }
    }

    out.preferred_lat = out
        .name_forms
        .get(LAT)
        .or_else(|| out.name_forms.get("EN"))
        .cloned()
        .unwrap_or_else(|| {
            languages
                .iter()
                .filter(|l| *l != "EN" && *l != LAT)
                .find_map(|l| out.name_forms.get(l))
                .cloned()
                .unwrap_or_else(|| derive_name_from_identifier(author_id))
        });

    out.preferred_ar = out
        .elements
        .iter()
        .find(|e| e.language == "AR")
        .map(|e| {
            if e.shuhra.is_empty() {
                e.joined()
            } else {
                e.shuhra.clone()
            }
        })
        .unwrap_or_else(|| translit::to_arabic(&out.preferred_lat));

    out.elements.sort_by(|a, b| a.language.cmp(&b.language));
    out
}

fn collect_elements(author_id: &str, lang: &str, fields: &HeaderFields) -> NameElements {
    let get = |component: &str| {
        let value = fields.get(&format!("AUTH#{component}#{lang}"));
        if is_placeholder(&value) {
            String::new()
        } else {
            value
        }
    };
    let mut ne = NameElements {
        author: author_id.to_string(),
        language: lang.to_string(),
        ..Default::default()
    };
    for component in COMPONENTS {
        let value = get(component);
        match *component {
            "SHUHRA" => ne.shuhra = value,
            "KUNYA" => ne.kunya = value,
            "ISM" => ne.ism = value,
            "LAQAB" => ne.laqab = value,
            "NASAB" => ne.nasab = value,
            "NISBA" => ne.nisba = value,
            _ => unreachable!(),
        }
    }
    ne
}

fn arabicize(ne: &NameElements) -> NameElements {
    NameElements {
        author: ne.author.clone(),
        language: ne.language.clone(),
        shuhra: translit::to_arabic(&ne.shuhra),
        kunya: translit::to_arabic(&ne.kunya),
        ism: translit::to_arabic(&ne.ism),
        laqab: translit::to_arabic(&ne.laqab),
        nasab: translit::to_arabic(&ne.nasab),
        nisba: translit::to_arabic(&ne.nisba),
    }
}

/// Preference chain for the display form: shuhra, else the joined
/// components. The identifier-derived fallback applies at the author
/// level, not per language.
fn preferred_form(ne: &NameElements) -> String {
    if !ne.shuhra.is_empty() {
        ne.shuhra.clone()
    } else {
        ne.joined()
    }
}

pub fn is_placeholder(value: &str) -> bool {
    NAME_PLACEHOLDERS.contains(&value)
}

/// Derive a display name from the identifier when no name is recorded:
/// strip the 4-digit death-date prefix, insert spaces before interior
/// capitals, and render the 'C'-before-capital convention as ʿayn.
///   "0310Tabari"     → "Tabari"
///   "0429CAbdJabbar" → "ʿAbd Jabbar"
pub fn derive_name_from_identifier(identifier: &str) -> String {
    let name_part = identifier.trim_start_matches(|c: char| c.is_ascii_digit());
    let chars: Vec<char> = name_part.chars().collect();

    let mut words: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut i = 0;
    while i < chars.len() {
        let mut c = chars[i];
        if c.is_ascii_uppercase() && !cur.is_empty() {
            words.push(std::mem::take(&mut cur));
        }
        if c == 'C' && chars.get(i + 1).is_some_and(|n| n.is_ascii_uppercase()) {
            cur.push('ʿ');
            i += 1;
            c = chars[i];
        }
        cur.push(c);
        i += 1;
    }
    if !cur.is_empty() {
        words.push(cur);
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::parse_meta_str;

    #[test]
    fn test_derive_name_plain() {
        assert_eq!(derive_name_from_identifier("0310Tabari"), "Tabari");
    }

    #[test]
    fn test_derive_name_multi_word() {
        assert_eq!(derive_name_from_identifier("0279IbnAbiTahirTayfur"), "Ibn Abi Tahir Tayfur");
    }

    #[test]
    fn test_derive_name_ayn_convention() {
        assert_eq!(derive_name_from_identifier("0429CAbdJabbar"), "ʿAbd Jabbar");
    }

    #[test]
    fn test_no_fields_falls_back_to_identifier() {
        let fields = parse_meta_str("");
        let resolved = resolve_names("0310Tabari", &fields);
        assert_eq!(resolved.preferred_lat, "Tabari");
        assert!(resolved.elements.is_empty());
    }

    #[test]
    fn test_shuhra_preferred_over_joined() {
        let fields = parse_meta_str(
            "AUTH#SHUHRA##AR: al-Ṭabarī\nAUTH#ISM#####AR: Muḥammad\nAUTH#NASAB###AR: b. Jarīr\n",
        );
        let resolved = resolve_names("0310Tabari", &fields);
        assert_eq!(resolved.name_forms["AR"], "al-Ṭabarī");
    }

    #[test]
    fn test_joined_when_no_shuhra() {
        let fields =
            parse_meta_str("AUTH#ISM#####AR: Muḥammad\nAUTH#NASAB###AR: b. Jarīr\n");
        let resolved = resolve_names("0310Tabari", &fields);
        assert_eq!(resolved.name_forms["AR"], "Muḥammad b. Jarīr");
    }

    #[test]
    fn test_placeholder_treated_absent() {
        let fields = parse_meta_str("AUTH#ISM#####AR: Fulān\nAUTH#SHUHRA##AR: al-Ṭabarī\n");
        let resolved = resolve_names("0310Tabari", &fields);
        let ar = resolved.elements.iter().find(|e| e.language == "AR").unwrap();
        assert!(ar.ism.is_empty());
    }

    #[test]
    fn test_non_latin_language_duplicated_into_lat_slot() {
        let fields = parse_meta_str("AUTH#SHUHRA##AR: al-Ṭabarī\n");
        let resolved = resolve_names("0310Tabari", &fields);

        let langs: Vec<&str> = resolved.elements.iter().map(|e| e.language.as_str()).collect();
        assert_eq!(langs, vec!["AR", "LAT"]);

        let ar = &resolved.elements[0];
        let lat = &resolved.elements[1];
        assert_eq!(ar.shuhra, "الطبري"); // converted
        assert_eq!(lat.shuhra, "al-Ṭabarī"); // romanized original
    }

    #[test]
    fn test_date_codes_not_treated_as_languages() {
        let fields = parse_meta_str("AUTH#DIED####AH: 0310-XX-XX\nAUTH#DIED####CE: 0922-XX-XX\n");
        let resolved = resolve_names("0310Tabari", &fields);
        assert!(resolved.elements.is_empty());
        assert!(resolved.name_forms.is_empty());
    }
}
