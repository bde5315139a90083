#![forbid(unsafe_code)]

/// Whole-word corrections for letter confusions that show up constantly in
/// informal Hebrew typing: ט/ת and ח/כ swaps inside the domain keywords,
/// and a dropped final ה. Outputs never appear on the left-hand side, which
/// keeps the pass idempotent.
pub const TYPO_TABLE: &[(&str, &str)] = &[
    ("החלתה", "החלטה"),
    ("החלתות", "החלטות"),
    ("הכלטה", "החלטה"),
    ("הכלטות", "החלטות"),
    ("ממשלא", "ממשלה"),
    ("ממשילה", "ממשלה"),
    ("בנושה", "בנושא"),
    ("השוה", "השווה"),
];

const TRAILING_PUNCTUATION: &[char] = &['?', '!', '.', ',', ';', ':', '…'];

/// Hebrew proclitic prefixes that can sit in front of a keyword token.
const WORD_PREFIXES: &[&str] = &["ו", "ש", "ה", "ב", "ל", "מ", "כ"];

/// Collapse whitespace, strip trailing sentence punctuation, and apply the
/// typo table token-wise. Total and idempotent; an empty input stays empty.
pub fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = collapsed
        .trim_end_matches(TRAILING_PUNCTUATION)
        .trim_end();

    stripped
        .split_whitespace()
        .map(correct_typo)
        .collect::<Vec<_>>()
        .join(" ")
}

fn correct_typo(token: &str) -> &str {
    for (wrong, right) in TYPO_TABLE {
        if token == *wrong {
            return right;
        }
    }
    token
}

/// True when `token` is `stem` carrying at most two proclitic prefixes
/// ("ההחלטה", "ולממשלה"). Stems stay at least two characters long, so short
/// words are never hollowed out into a false match.
pub fn matches_keyword(token: &str, stem: &str) -> bool {
    let token = token.trim_matches(TRAILING_PUNCTUATION);
    if token == stem {
        return true;
    }
    let mut t = token;
    for _ in 0..2 {
        match strip_one_prefix(t) {
            Some(rest) => {
                t = rest;
                if t == stem {
                    return true;
                }
            }
            None => break,
        }
    }
    false
}

fn strip_one_prefix(token: &str) -> Option<&str> {
    for prefix in WORD_PREFIXES {
        if let Some(rest) = token.strip_prefix(prefix) {
            if rest.chars().count() >= 2 {
                return Some(rest);
            }
        }
    }
    None
}

/// Parse a token as an unsigned integer, tolerating an attached Hebrew
/// prefix ("ה-37", "מ2020") and trailing punctuation.
pub fn parse_unsigned(token: &str) -> Option<u64> {
    let token = token.trim_matches(TRAILING_PUNCTUATION);
    let digits = strip_number_prefix(token);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // Reject absurd widths before handing to parse.
    if digits.len() > 12 {
        return None;
    }
    digits.parse().ok()
}

fn strip_number_prefix(token: &str) -> &str {
    for prefix in ["ה-", "ל-", "מ-", "ב-", "ה", "ל", "מ", "ב", "-"] {
        if let Some(rest) = token.strip_prefix(prefix) {
            if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return rest;
            }
        }
    }
    token
}

/// Char-boundary-safe truncation used when assembling free-text fields.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
