#![forbid(unsafe_code)]

use crate::normalize::matches_keyword;

/// Short ministry name → canonical full name.
pub const MINISTRIES: &[(&str, &str)] = &[
    ("אוצר", "משרד האוצר"),
    ("אנרגיה", "משרד האנרגיה"),
    ("ביטחון", "משרד הביטחון"),
    ("בריאות", "משרד הבריאות"),
    ("חוץ", "משרד החוץ"),
    ("חינוך", "משרד החינוך"),
    ("חקלאות", "משרד החקלאות"),
    ("כלכלה", "משרד הכלכלה"),
    ("משפטים", "משרד המשפטים"),
    ("פנים", "משרד הפנים"),
    ("רווחה", "משרד הרווחה"),
    ("תחבורה", "משרד התחבורה"),
    ("תיירות", "משרד התיירות"),
    ("תקשורת", "משרד התקשורת"),
];

/// Fixed titles that are already canonical and never take the משרד prefix.
pub const EXEMPT_TITLES: &[&str] = &["ראש הממשלה", "מזכיר הממשלה", "מבקר המדינה"];

const MINISTRY_ANCHOR: &str = "משרד";
const MINISTRY_ANCHOR_PLURAL: &str = "משרדי";

/// Canonicalize one organizational-unit name. Applied once at extraction
/// and re-applied at assembly, so a short form can never leak downstream.
pub fn canonicalize_ministry(name: &str) -> String {
    let name = name.trim();
    if EXEMPT_TITLES.contains(&name) || name.starts_with(MINISTRY_ANCHOR) {
        return name.to_string();
    }
    let short = name.strip_prefix('ה').unwrap_or(name);
    for (short_form, canonical) in MINISTRIES {
        if short == *short_form {
            return (*canonical).to_string();
        }
    }
    // Unknown short form: build the canonical shape deterministically.
    format!("משרד ה{short}")
}

/// Extract ministries anchored on משרד/משרדי, supporting ו-conjunction and
/// comma lists ("משרדי החינוך והביטחון"), plus the exempt fixed titles.
pub fn extract_ministries(text: &str) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut found: Vec<String> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if let Some(title) = exempt_title_at(&tokens, i) {
            push_unique(&mut found, title.to_string());
            continue;
        }
        if !is_anchor(token) {
            continue;
        }
        let mut j = i + 1;
        let mut first = true;
        while j < tokens.len() {
            let raw = tokens[j].trim_end_matches(',');
            let had_list_marker = tokens[j - 1].ends_with(',') || raw.starts_with('ו');
            if !first && !had_list_marker {
                break;
            }
            let candidate = raw.strip_prefix('ו').unwrap_or(raw);
            match short_form(candidate) {
                Some(canonical) => push_unique(&mut found, canonical),
                None if first && candidate.starts_with('ה') => {
                    // "משרד התפוצות": not in the table but already shaped
                    // like a canonical name; pass it through unchanged.
                    push_unique(&mut found, format!("{MINISTRY_ANCHOR} {candidate}"));
                }
                None => break,
            }
            first = false;
            j += 1;
        }
    }
    found
}

fn is_anchor(token: &str) -> bool {
    matches_keyword(token, MINISTRY_ANCHOR) || matches_keyword(token, MINISTRY_ANCHOR_PLURAL)
}

fn exempt_title_at<'a>(tokens: &[&'a str], i: usize) -> Option<&'static str> {
    let second = tokens.get(i + 1)?;
    let pair = format!("{} {}", tokens[i], second.trim_end_matches(','));
    EXEMPT_TITLES.iter().copied().find(|title| *title == pair)
}

fn short_form(candidate: &str) -> Option<String> {
    let short = candidate.strip_prefix('ה').unwrap_or(candidate);
    for (short_form, canonical) in MINISTRIES {
        if short == *short_form {
            return Some((*canonical).to_string());
        }
    }
    None
}

fn push_unique(found: &mut Vec<String>, ministry: String) {
    if !found.contains(&ministry) {
        found.push(ministry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_orgunit_01_single_ministry_is_canonicalized() {
        assert_eq!(
            extract_ministries("החלטות של משרד החינוך"),
            vec!["משרד החינוך".to_string()]
        );
        assert_eq!(
            extract_ministries("החלטות של משרד חינוך"),
            vec!["משרד החינוך".to_string()]
        );
    }

    #[test]
    fn at_orgunit_02_conjunction_and_comma_lists() {
        assert_eq!(
            extract_ministries("משרדי החינוך והביטחון"),
            vec!["משרד החינוך".to_string(), "משרד הביטחון".to_string()]
        );
        assert_eq!(
            extract_ministries("משרד החינוך, הביטחון והאוצר"),
            vec![
                "משרד החינוך".to_string(),
                "משרד הביטחון".to_string(),
                "משרד האוצר".to_string()
            ]
        );
    }

    #[test]
    fn at_orgunit_03_unknown_canonical_shape_passes_through() {
        assert_eq!(
            extract_ministries("החלטות של משרד התפוצות"),
            vec!["משרד התפוצות".to_string()]
        );
    }

    #[test]
    fn at_orgunit_04_exempt_titles_skip_the_prefix_rule() {
        assert_eq!(
            extract_ministries("החלטות של ראש הממשלה"),
            vec!["ראש הממשלה".to_string()]
        );
        assert_eq!(canonicalize_ministry("ראש הממשלה"), "ראש הממשלה");
    }

    #[test]
    fn at_orgunit_05_bare_topic_words_are_not_ministries() {
        // "חינוך" as a topic must not be read as an organizational unit.
        assert!(extract_ministries("כמה החלטות יש בנושא חינוך").is_empty());
    }

    #[test]
    fn at_orgunit_06_canonicalize_is_idempotent() {
        for (_, canonical) in MINISTRIES {
            assert_eq!(canonicalize_ministry(canonical), *canonical);
        }
        assert_eq!(canonicalize_ministry("חינוך"), "משרד החינוך");
        assert_eq!(canonicalize_ministry("הביטחון"), "משרד הביטחון");
    }
}
