#![forbid(unsafe_code)]

use remez_kernel_contracts::route::ReferenceKind;

/// Definite ordinal words, feminine and masculine, mapped 1-based.
pub const ORDINALS: &[(&str, u32)] = &[
    ("הראשונה", 1),
    ("הראשון", 1),
    ("השנייה", 2),
    ("השניה", 2),
    ("השני", 2),
    ("השלישית", 3),
    ("השלישי", 3),
    ("הרביעית", 4),
    ("הרביעי", 4),
    ("החמישית", 5),
    ("החמישי", 5),
    ("השישית", 6),
    ("השישי", 6),
    ("השביעית", 7),
    ("השביעי", 7),
    ("השמינית", 8),
    ("השמיני", 8),
    ("התשיעית", 9),
    ("התשיעי", 9),
    ("העשירית", 10),
    ("העשירי", 10),
];

const SENT_TOKENS: &[&str] = &["ששלחת", "ששלחתם", "שהצגת", "שהראית"];
const LAST_TOKENS: &[&str] = &["האחרונה", "האחרון"];
const PREVIOUS_TOKENS: &[&str] = &["הקודמת", "הקודם"];
const CONTEXT_PHRASES: &[&str] = &["כמו ששאלתי", "ששאלתי קודם", "כמו קודם", "בהמשך למה"];

/// Time-unit words that turn "האחרונה" into a date phrase ("בשנה האחרונה"),
/// not a result reference.
const TIME_UNIT_TOKENS: &[&str] = &["בשנה", "בשנים", "בחודש", "בחודשים", "בשבוע", "בשבועות"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceMatch {
    pub kind: ReferenceKind,
    pub position: Option<u32>,
    /// Explicit positional phrasing scores higher than a loose topical echo.
    pub explicit: bool,
}

/// Detect a reference to already-shown results. `has_standalone_filters`
/// suppresses the bare-ordinal rule: "ההחלטה הראשונה של ממשלה 37" is a
/// fresh filtered query, not a pointer into the previous result set.
pub fn detect_reference(text: &str, has_standalone_filters: bool) -> Option<ReferenceMatch> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if tokens.iter().any(|t| SENT_TOKENS.contains(t)) {
        // "the one you sent me": the most recent single result.
        let position = ordinal_position(&tokens).or(Some(1));
        let kind = if position == Some(1) {
            ReferenceKind::Last
        } else {
            ReferenceKind::Specific
        };
        return Some(ReferenceMatch {
            kind,
            position,
            explicit: true,
        });
    }

    if CONTEXT_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        return Some(ReferenceMatch {
            kind: ReferenceKind::Context,
            position: None,
            explicit: false,
        });
    }

    if tokens.iter().any(|t| PREVIOUS_TOKENS.contains(t)) {
        return Some(ReferenceMatch {
            kind: ReferenceKind::Previous,
            position: None,
            explicit: true,
        });
    }

    for (i, token) in tokens.iter().enumerate() {
        if !LAST_TOKENS.contains(token) {
            continue;
        }
        let after_time_unit = i > 0 && TIME_UNIT_TOKENS.contains(&tokens[i - 1]);
        if !after_time_unit {
            return Some(ReferenceMatch {
                kind: ReferenceKind::Last,
                position: Some(1),
                explicit: true,
            });
        }
    }

    if !has_standalone_filters {
        if let Some(position) = ordinal_position(&tokens) {
            return Some(ReferenceMatch {
                kind: ReferenceKind::Specific,
                position: Some(position),
                explicit: true,
            });
        }
    }

    None
}

fn ordinal_position(tokens: &[&str]) -> Option<u32> {
    for token in tokens {
        for (word, position) in ORDINALS {
            if token == word {
                return Some(*position);
            }
        }
    }
    None
}
