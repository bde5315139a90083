#![forbid(unsafe_code)]

use remez_kernel_contracts::route::{GOVERNMENT_NUMBER_MAX, GOVERNMENT_NUMBER_MIN};

use crate::normalize::{matches_keyword, parse_unsigned};

/// Hebrew number words, masculine and feminine forms side by side. Values
/// compose additively: tens, then a ו-conjuncted unit ("שלושים ושבע"), or a
/// unit followed by עשרה for the teens ("שבע עשרה").
pub const NUMBER_WORDS: &[(&str, u32)] = &[
    ("אחת", 1),
    ("אחד", 1),
    ("שתיים", 2),
    ("שתים", 2),
    ("שניים", 2),
    ("שנים", 2),
    ("שלוש", 3),
    ("שלושה", 3),
    ("ארבע", 4),
    ("ארבעה", 4),
    ("חמש", 5),
    ("חמישה", 5),
    ("שש", 6),
    ("שישה", 6),
    ("שבע", 7),
    ("שבעה", 7),
    ("שמונה", 8),
    ("תשע", 9),
    ("תשעה", 9),
    ("עשר", 10),
    ("עשרה", 10),
    ("עשרים", 20),
    ("שלושים", 30),
    ("ארבעים", 40),
];

const GOVERNMENT_STEM: &str = "ממשלה";
const DECISION_STEM: &str = "החלטה";
const DECISIONS_STEM: &str = "החלטות";
const RESULTS_STEM: &str = "תוצאות";
const NUMBER_MARKERS: &[&str] = &["מספר", "מס'", "מס׳"];
const GIVE_VERBS: &[&str] = &["תן", "הבא", "הצג", "תביא", "תראה"];

fn word_value(token: &str) -> Option<u32> {
    for (word, value) in NUMBER_WORDS {
        if token == *word {
            return Some(*value);
        }
    }
    None
}

/// Parse a number-word run starting at the head of `tokens`, returning the
/// summed value and how many tokens were consumed. Only grammatical
/// compositions continue the run: a ו-conjuncted unit after a tens word
/// ("שלושים ושבע"), or עשרה/עשר closing a teen after a unit ("שבע עשרה").
pub fn parse_number_words(tokens: &[&str]) -> Option<(u32, usize)> {
    let first = tokens.first()?;
    let first_value = word_value(first)?;
    let mut sum = first_value;
    let mut consumed = 1;

    if let Some(next) = tokens.get(1) {
        if (1..=9).contains(&first_value) && (*next == "עשרה" || *next == "עשר") {
            sum += 10;
            consumed = 2;
        } else if first_value >= 20 {
            let unit = next.strip_prefix('ו').and_then(word_value);
            if let Some(unit) = unit.filter(|u| (1..=9).contains(u)) {
                sum += unit;
                consumed = 2;
            }
        }
    }
    Some((sum, consumed))
}

/// Government ("org-cycle") number after a government keyword, as digits
/// ("ממשלה 37", "הממשלה ה-37") or number words ("ממשלה שלושים ושבע").
/// Out-of-range values are dropped rather than clamped.
pub fn extract_government_number(tokens: &[&str]) -> Option<u32> {
    for (i, token) in tokens.iter().enumerate() {
        if !matches_keyword(token, GOVERNMENT_STEM) && !matches_keyword(token, "ממשלת") {
            continue;
        }
        let mut j = i + 1;
        if j < tokens.len() && NUMBER_MARKERS.contains(&tokens[j]) {
            j += 1;
        }
        // "ממשלת ישראל ה-37" carries the state name between keyword and number.
        if j < tokens.len() && tokens[j] == "ישראל" {
            j += 1;
        }
        if j >= tokens.len() {
            continue;
        }
        // A digit run wider than u32 is noise, never a wrapped-around cycle.
        let value = match parse_unsigned(tokens[j]) {
            Some(n) => u32::try_from(n).ok(),
            None => parse_number_words(&tokens[j..]).map(|(n, _)| n),
        };
        if let Some(n) = value {
            if (GOVERNMENT_NUMBER_MIN..=GOVERNMENT_NUMBER_MAX).contains(&n) {
                return Some(n);
            }
        }
    }
    None
}

/// Decision ("record") number: a positive integer after the singular
/// decision keyword, optionally via "מספר". Plural forms never match.
pub fn extract_decision_number(tokens: &[&str]) -> Option<u64> {
    for (i, token) in tokens.iter().enumerate() {
        if !matches_keyword(token, DECISION_STEM) {
            continue;
        }
        let mut j = i + 1;
        if j < tokens.len() && NUMBER_MARKERS.contains(&tokens[j]) {
            j += 1;
        }
        if j >= tokens.len() {
            continue;
        }
        if let Some(n) = parse_unsigned(tokens[j]) {
            if n >= 1 {
                return Some(n);
            }
        }
    }
    None
}

/// Result limit: an integer immediately before the subject keyword
/// ("5 החלטות"), or after a give-me verb ("תן לי 3"). Ordinal words belong
/// to the reference resolver and are never read as a limit.
pub fn extract_limit(tokens: &[&str]) -> Option<u32> {
    for (i, token) in tokens.iter().enumerate() {
        let Some(n) = parse_unsigned(token).and_then(|n| u32::try_from(n).ok()) else {
            continue;
        };
        if n == 0 || n > 1000 {
            continue;
        }
        let follows_subject = tokens
            .get(i + 1)
            .is_some_and(|next| {
                matches_keyword(next, DECISIONS_STEM) || matches_keyword(next, RESULTS_STEM)
            });
        if follows_subject {
            return Some(n as u32);
        }
        let after_give = match i {
            0 => false,
            _ => {
                let prev = tokens[i - 1];
                GIVE_VERBS.contains(&prev)
                    || (prev == "לי" && i >= 2 && GIVE_VERBS.contains(&tokens[i - 2]))
            }
        };
        if after_give {
            return Some(n as u32);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn at_numword_01_digit_and_word_forms_agree() {
        let digits = toks("החלטות של ממשלה 37");
        let words = toks("החלטות של ממשלה שלושים ושבע");
        assert_eq!(extract_government_number(&digits), Some(37));
        assert_eq!(extract_government_number(&words), Some(37));
        assert_eq!(
            extract_government_number(&digits),
            extract_government_number(&words)
        );
    }

    #[test]
    fn at_numword_02_every_in_range_cycle_has_a_word_form() {
        let tens = [("עשרים", 20), ("שלושים", 30), ("ארבעים", 40)];
        let units = [
            ("ואחת", 1),
            ("ושתיים", 2),
            ("ושלוש", 3),
            ("וארבע", 4),
            ("וחמש", 5),
            ("ושש", 6),
            ("ושבע", 7),
            ("ושמונה", 8),
            ("ותשע", 9),
        ];
        for (ten_word, ten) in tens {
            let bare = parse_number_words(&[ten_word]).unwrap();
            assert_eq!(bare.0, ten);
            for (unit_word, unit) in units {
                let composed = ten + unit;
                if !(GOVERNMENT_NUMBER_MIN..=GOVERNMENT_NUMBER_MAX).contains(&composed) {
                    continue;
                }
                let (value, consumed) = parse_number_words(&[ten_word, unit_word]).unwrap();
                assert_eq!(value, composed);
                assert_eq!(consumed, 2);
            }
        }
    }

    #[test]
    fn at_numword_03_teens_compose_with_esre() {
        assert_eq!(parse_number_words(&toks("שבע עשרה")), Some((17, 2)));
        assert_eq!(parse_number_words(&toks("שתים עשרה")), Some((12, 2)));
    }

    #[test]
    fn at_numword_04_out_of_range_government_is_dropped() {
        assert_eq!(extract_government_number(&toks("ממשלה 19")), None);
        assert_eq!(extract_government_number(&toks("ממשלה 41")), None);
        assert_eq!(extract_government_number(&toks("ממשלה חמש")), None);
    }

    #[test]
    fn at_numword_05_prefixed_digit_forms_match() {
        assert_eq!(extract_government_number(&toks("הממשלה ה-37")), Some(37));
        assert_eq!(
            extract_government_number(&toks("ממשלת ישראל ה-36")),
            Some(36)
        );
    }

    #[test]
    fn at_numword_06_decision_number_requires_singular_keyword() {
        assert_eq!(extract_decision_number(&toks("נתח את החלטה 2983")), Some(2983));
        assert_eq!(
            extract_decision_number(&toks("ההחלטה מספר 550")),
            Some(550)
        );
        // Plural "decisions of government 37" must not read 37 as a record id.
        assert_eq!(extract_decision_number(&toks("החלטות של ממשלה 37")), None);
    }

    #[test]
    fn at_numword_07_limit_before_subject_and_after_give_verb() {
        assert_eq!(extract_limit(&toks("5 החלטות בנושא חינוך")), Some(5));
        assert_eq!(extract_limit(&toks("תן לי 3 החלטות")), Some(3));
        assert_eq!(extract_limit(&toks("החלטות של ממשלה 37")), None);
    }

    #[test]
    fn at_numword_08_overwide_digits_never_wrap_into_range() {
        // 2^32 + 37 would land on a "valid" 37 if truncated to u32.
        assert_eq!(
            extract_government_number(&toks("החלטות של ממשלה 4294967333")),
            None
        );
        // 2^32 + 5 likewise must not become a limit of 5.
        assert_eq!(extract_limit(&toks("תן לי 4294967301 החלטות")), None);
    }

    #[test]
    fn at_numword_09_only_grammatical_compositions_continue() {
        // "עשרים ועשר" is not a number phrase; the run stops at the tens word.
        assert_eq!(parse_number_words(&toks("עשרים ועשר")), Some((20, 1)));
        // A tens word cannot conjoin another tens word.
        assert_eq!(parse_number_words(&toks("עשרים ושלושים")), Some((20, 1)));
        // עשרה closes a teen only directly after a unit.
        assert_eq!(parse_number_words(&toks("עשרים עשרה")), Some((20, 1)));
    }
}
