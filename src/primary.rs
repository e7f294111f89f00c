use corpus_types::{AnalysisPriority, VersionRecord};

// ── Primary version selection ────────────────────────────────────────────
//
// Among competing digitizations of one text, exactly one selection rule
// fires, checked in fixed order. The order is the contract:
//   1. a single version is primary by default
//   2. an explicit upstream flag wins over everything inferred
//   3. the highest annotation tier present wins (mARkdown > completed >
//      inProgress)
//   4. with no annotation progress at all, the longest version wins

/// Upstream "this is the primary version" tag.
pub const PRIMARY_FLAG_TAG: &str = "PRIMARY_VERSION";

/// One selection rule: returns the indices to mark primary, or None if the
/// rule does not apply and the next one should be tried.
pub struct SelectionRule {
    pub name: &'static str,
    pub apply: fn(&[VersionRecord]) -> Option<Vec<usize>>,
}

fn single_version(versions: &[VersionRecord]) -> Option<Vec<usize>> {
    (versions.len() == 1).then(|| vec![0])
}

fn explicit_flag(versions: &[VersionRecord]) -> Option<Vec<usize>> {
    let flagged: Vec<usize> = versions
        .iter()
        .enumerate()
        .filter(|(_, v)| v.tags.contains(PRIMARY_FLAG_TAG))
        .map(|(i, _)| i)
        .collect();
    (!flagged.is_empty()).then_some(flagged)
}

fn highest_annotation_tier(versions: &[VersionRecord]) -> Option<Vec<usize>> {
    let top = versions.iter().map(|v| v.annotation_status.tier()).max()?;
    if top == 0 {
        return None; // no annotation progress anywhere
    }
    Some(
        versions
            .iter()
            .enumerate()
            .filter(|(_, v)| v.annotation_status.tier() == top)
            .map(|(i, _)| i)
            .collect(),
    )
}

fn longest_version(versions: &[VersionRecord]) -> Option<Vec<usize>> {
    versions
        .iter()
        .enumerate()
        .max_by_key(|(i, v)| (v.char_length, std::cmp::Reverse(*i)))
        .map(|(i, _)| vec![i])
}

/// The fixed rule order. The first applicable rule wins.
pub const RULES: &[SelectionRule] = &[
    SelectionRule { name: "single-version", apply: single_version },
    SelectionRule { name: "explicit-flag", apply: explicit_flag },
    SelectionRule { name: "annotation-tier", apply: highest_annotation_tier },
    SelectionRule { name: "longest", apply: longest_version },
];

/// Mark primaries among one text's versions. Returns the name of the rule
/// that fired, or None for an empty slice (no-op).
pub fn select_primary(versions: &mut [VersionRecord]) -> Option<&'static str> {
    if versions.is_empty() {
        return None;
    }
    for v in versions.iter_mut() {
        v.analysis_priority = AnalysisPriority::Secondary;
    }
    for rule in RULES {
        if let Some(indices) = (rule.apply)(versions) {
            for i in indices {
                versions[i].analysis_priority = AnalysisPriority::Primary;
            }
            return Some(rule.name);
        }
    }
    unreachable!("the longest-version rule always applies to a non-empty slice")
}
