// ── Date resolution ──────────────────────────────────────────────────────
//
// Death/birth dates come as `YEAR-MONTH-DAY` with 'X' for unknown digits
// and optional lunar month tokens:
//   0310-XX-XX      → year known, month and day unknown
//   03XX-XX-XX      → only the century known
//   0255-RAM-XX     → year and month known, day unknown
//   0310-02-17      → fully known
//
// Resolution always yields a [start, end] range; a fully known date is the
// degenerate range [d, d].

/// The 12 lunar months, mapped to 2-digit numeric months.
pub const LUNAR_MONTHS: [(&str, u32); 12] = [
    ("MUH", 1),  // Muḥarram
    ("SAF", 2),  // Ṣafar
    ("RB1", 3),  // Rabīʿ I
    ("RB2", 4),  // Rabīʿ II
    ("JM1", 5),  // Jumādā I
    ("JM2", 6),  // Jumādā II
    ("RAJ", 7),  // Rajab
    ("SHB", 8),  // Shaʿbān
    ("RAM", 9),  // Ramaḍān
    ("SHW", 10), // Shawwāl
    ("DHQ", 11), // Dhū l-Qaʿda
    ("DHH", 12), // Dhū l-Ḥijja
];

/// Unknown-digit placeholder in date components.
pub const PLACEHOLDER: char = 'X';

#[derive(Debug, Clone, Copy, Default)]
pub struct DateResolver {
    /// Reproduce the upstream endpoint-mutation quirk: an overflowing end
    /// day forces the *start* day to 30 as well. Off by default; the
    /// default clamps each endpoint to its own bound.
    pub legacy_day_clamp: bool,
}

impl DateResolver {
    /// Resolve a partial date string into `[start, end]` bound strings.
    /// Empty input yields `("", "")`.
    pub fn resolve_range(&self, raw: &str) -> (String, String) {
        let raw = raw.trim();
        if raw.is_empty() {
            return (String::new(), String::new());
        }

        let mut parts = raw.split('-');
        let year = parts.next().unwrap_or("");
        let month = parts.next().unwrap_or("");
        let day = parts.next().unwrap_or("");

        let (ys, ye) = resolve_digits(year, 4);
        let (ms, me) = resolve_month(month);
        let (ds, de) = self.resolve_day(day);

        (format!("{ys}-{ms:02}-{ds:02}"), format!("{ye}-{me:02}-{de:02}"))
    }

    fn resolve_day(&self, day: &str) -> (u32, u32) {
        let (s, e) = resolve_digits(day, 2);
        let mut start: u32 = s.parse().unwrap_or(1);
        let mut end: u32 = e.parse().unwrap_or(30);

        if self.legacy_day_clamp && end > 30 {
            start = 30;
        }
        if start < 1 {
            start = 1;
        }
        if end > 30 {
            end = 30;
        }
        (start, end)
    }
}

/// True if every component of the date is digits or placeholders (or a
/// recognized month token in the month slot).
pub fn is_well_formed(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return true;
    }
    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() > 3 {
        return false;
    }
    for (i, part) in parts.iter().enumerate() {
        let digits_ok = part
            .chars()
            .all(|c| c.is_ascii_digit() || c.to_ascii_uppercase() == PLACEHOLDER);
        let month_ok = i == 1 && month_number(part).is_some();
        if !digits_ok && !month_ok {
            return false;
        }
    }
    true
}

/// Per-digit resolution: placeholder → 0 (start) / 9 (end). The component
/// is right-padded with placeholders to `width`; anything else unparseable
/// degrades to the full range for that width.
fn resolve_digits(component: &str, width: usize) -> (String, String) {
    let mut chars: Vec<char> = component.trim().chars().collect();
    while chars.len() < width {
        chars.push(PLACEHOLDER);
    }

    let mut start = String::with_capacity(width);
    let mut end = String::with_capacity(width);
    for c in chars.iter().take(width) {
        if c.is_ascii_digit() {
            start.push(*c);
            end.push(*c);
        } else {
            start.push('0');
            end.push('9');
        }
    }
    (start, end)
}

fn month_number(token: &str) -> Option<u32> {
    let token = token.trim().to_ascii_uppercase();
    LUNAR_MONTHS.iter().find(|(name, _)| *name == token).map(|(_, n)| *n)
}

/// Month resolution: a recognized lunar month token is precise even when
/// the day is not; placeholders span the whole year.
fn resolve_month(month: &str) -> (u32, u32) {
    if let Some(n) = month_number(month) {
        return (n, n);
    }
    let (s, e) = resolve_digits(month, 2);
    let start: u32 = s.parse().unwrap_or(1);
    let end: u32 = e.parse().unwrap_or(12);
    (start.clamp(1, 12), end.clamp(1, 12))
}

// ── Calendar conversion ──────────────────────────────────────────────────
//
// Linear approximation between the lunar Hijri year count and the solar
// Gregorian year: CE = 622 + AH × 354/365.25. This is not a calendrical
// conversion; exact day-level round-trips are not guaranteed.

pub fn ah_to_ce(ah: u32) -> i32 {
    (622.0 + ah as f64 * 354.0 / 365.25).round() as i32
}

pub fn ce_to_ah(ce: i32) -> f64 {
    (ce as f64 - 622.0) * 365.25 / 354.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_date_degenerate_range() {
        let r = DateResolver::default();
        let (s, e) = r.resolve_range("0310-02-17");
        assert_eq!(s, "0310-02-17");
        assert_eq!(e, "0310-02-17");
    }

    #[test]
    fn test_fully_unknown_spans_everything() {
        let r = DateResolver::default();
        let (s, e) = r.resolve_range("XXXX-XX-XX");
        assert_eq!(s, "0000-01-01");
        assert_eq!(e, "9999-12-30");
    }

    #[test]
    fn test_partial_year_digits() {
        let r = DateResolver::default();
        let (s, e) = r.resolve_range("03XX-XX-XX");
        assert_eq!(s, "0300-01-01");
        assert_eq!(e, "0399-12-30");
    }

    #[test]
    fn test_month_token_is_precise() {
        let r = DateResolver::default();
        let (s, e) = r.resolve_range("0255-RAM-XX");
        assert_eq!(s, "0255-09-01");
        assert_eq!(e, "0255-09-30");
    }

    #[test]
    fn test_missing_components_treated_unknown() {
        let r = DateResolver::default();
        let (s, e) = r.resolve_range("0310");
        assert_eq!(s, "0310-01-01");
        assert_eq!(e, "0310-12-30");
    }

    #[test]
    fn test_partial_day_digits() {
        let r = DateResolver::default();
        let (s, e) = r.resolve_range("0310-02-1X");
        assert_eq!(s, "0310-02-10");
        assert_eq!(e, "0310-02-19");
    }

    #[test]
    fn test_legacy_day_clamp_mutates_start() {
        let legacy = DateResolver { legacy_day_clamp: true };
        let (s, e) = legacy.resolve_range("0310-02-XX");
        // end resolves to 99 → overflow forces the start day to 30 too.
        assert_eq!(s, "0310-02-30");
        assert_eq!(e, "0310-02-30");

        let sane = DateResolver::default();
        let (s, e) = sane.resolve_range("0310-02-XX");
        assert_eq!(s, "0310-02-01");
        assert_eq!(e, "0310-02-30");
    }

    #[test]
    fn test_empty_input() {
        let r = DateResolver::default();
        assert_eq!(r.resolve_range(""), (String::new(), String::new()));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("0310-XX-XX"));
        assert!(is_well_formed("0255-RAM-07"));
        assert!(is_well_formed(""));
        assert!(!is_well_formed("ca. 310"));
        assert!(!is_well_formed("0310-XX-XX-XX"));
    }

    #[test]
    fn test_ah_ce_round_trip_is_approximate() {
        for ah in [1u32, 100, 310, 656, 900, 1200, 1500] {
            let back = ce_to_ah(ah_to_ce(ah));
            assert!(
                (back - ah as f64).abs() < 1.0,
                "round trip for {ah} drifted to {back}"
            );
        }
    }

    #[test]
    fn test_ah_to_ce_known_points() {
        assert_eq!(ah_to_ce(310), 922);
        assert_eq!(ah_to_ce(1), 622 + 1);
    }
}
