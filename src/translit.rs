// ── Romanized → Arabic-script rendering ──────────────────────────────────
//
// Name fields arrive in Library-of-Congress-style transliteration
// ("al-Ṭabarī", "Muḥammad b. Jarīr"). For languages recorded only in
// transliteration we derive an Arabic-script form by reversing the scheme
// letter by letter. Short vowels are unwritten in Arabic script and are
// dropped; the rendering is orthographic, not phonological.

/// Digraphs must be checked BEFORE single letters (longest match first).
const DIGRAPHS: &[(&str, &str)] = &[
    ("kh", "خ"),
    ("gh", "غ"),
    ("sh", "ش"),
    ("th", "ث"),
    ("dh", "ذ"),
];

const SINGLES: &[(&str, &str)] = &[
    ("ʾ", "ء"),
    ("ʿ", "ع"),
    ("ā", "ا"),
    ("á", "ى"),
    ("ī", "ي"),
    ("ū", "و"),
    ("ḥ", "ح"),
    ("ṣ", "ص"),
    ("ḍ", "ض"),
    ("ṭ", "ط"),
    ("ẓ", "ظ"),
    ("b", "ب"),
    ("t", "ت"),
    ("j", "ج"),
    ("d", "د"),
    ("r", "ر"),
    ("z", "ز"),
    ("s", "س"),
    ("f", "ف"),
    ("q", "ق"),
    ("k", "ك"),
    ("l", "ل"),
    ("m", "م"),
    ("n", "ن"),
    ("h", "ه"),
    ("w", "و"),
    ("y", "ي"),
    // Short vowels are unwritten.
    ("a", ""),
    ("e", ""),
    ("i", ""),
    ("o", ""),
    ("u", ""),
];

/// Render one romanized name string in Arabic script.
pub fn to_arabic(romanized: &str) -> String {
    let words: Vec<String> = romanized
        .split_whitespace()
        .map(render_word)
        .filter(|w| !w.is_empty())
        .collect();
    words.join(" ")
}

fn render_word(word: &str) -> String {
    // "b." is the conventional abbreviation of "ibn" in nasab chains.
    if word == "b." || word == "bn" {
        return "بن".to_string();
    }

    let lower = word.to_lowercase();
    let (article, rest) = match lower.strip_prefix("al-") {
        Some(rest) => ("ال", rest),
        None => ("", lower.as_str()),
    };

    let mut out = String::from(article);
    let mut remaining = rest;
    'outer: while !remaining.is_empty() {
        for (src, dst) in DIGRAPHS {
            if let Some(tail) = remaining.strip_prefix(src) {
                out.push_str(dst);
                remaining = tail;
                continue 'outer;
            }
        }
        for (src, dst) in SINGLES {
            if let Some(tail) = remaining.strip_prefix(src) {
                out.push_str(dst);
                remaining = tail;
                continue 'outer;
            }
        }
        // Unknown character: drop punctuation, keep anything else as-is.
        let c = remaining.chars().next().unwrap();
        if !c.is_ascii_punctuation() {
            out.push(c);
        }
        remaining = &remaining[c.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definite_article() {
        assert_eq!(to_arabic("al-Ṭabarī"), "الطبري");
    }

    #[test]
    fn test_short_vowels_dropped() {
        assert_eq!(to_arabic("Muḥammad"), "محمد");
    }

    #[test]
    fn test_nasab_abbreviation() {
        assert_eq!(to_arabic("b. Jarīr"), "بن جرير");
    }

    #[test]
    fn test_digraphs_before_singles() {
        // "kh" must render as خ, not ك + ه.
        assert_eq!(to_arabic("khalīl"), "خليل");
    }

    #[test]
    fn test_ayn_and_hamza() {
        assert_eq!(to_arabic("ʿAbd"), "عبد");
        assert_eq!(to_arabic("Jāḥiẓ"), "جاحظ");
    }
}
