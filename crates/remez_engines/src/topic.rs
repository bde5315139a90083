#![forbid(unsafe_code)]

use crate::daterange::is_date_token;
use crate::normalize::matches_keyword;

/// Prefixes that introduce a free-text topic.
pub const TOPIC_TRIGGERS: &[&str] = &["בנושא", "בתחום", "לגבי", "אודות", "על"];

/// Keyword stems that end a topic capture: the query moved on to another
/// clause (possessive, government/ministry filter, date, range connector).
const TERMINATOR_STEMS: &[&str] = &["ממשלה", "ממשלת", "משרד", "משרדי", "החלטה", "החלטות"];
const TERMINATOR_TOKENS: &[&str] = &["של", "בין", "לעומת", "מול"];

/// Capture the free-text topic after the first trigger prefix, cut at the
/// next trigger, date expression, or clause keyword.
pub fn extract_topic(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let trigger_at = tokens
        .iter()
        .position(|t| TOPIC_TRIGGERS.contains(t))?;

    let mut captured: Vec<&str> = Vec::new();
    for &token in &tokens[trigger_at + 1..] {
        if is_terminator(token) {
            break;
        }
        captured.push(token);
    }

    let topic = strip_leading_triggers(&captured.join(" ")).to_string();
    if topic.is_empty() {
        None
    } else {
        Some(topic)
    }
}

fn is_terminator(token: &str) -> bool {
    TOPIC_TRIGGERS.contains(&token)
        || TERMINATOR_TOKENS.contains(&token)
        || TERMINATOR_STEMS
            .iter()
            .any(|stem| matches_keyword(token, stem))
        || is_date_token(token)
}

/// Defensive double-strip: a trigger word occasionally rides along at the
/// head of a captured topic ("בנושא על חינוך"); assembly strips it again.
pub fn strip_leading_triggers(topic: &str) -> &str {
    let mut rest = topic.trim();
    loop {
        let Some(first) = rest.split_whitespace().next() else {
            return rest;
        };
        if !TOPIC_TRIGGERS.contains(&first) {
            return rest;
        }
        rest = rest[first.len()..].trim_start();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_topic_01_captures_after_trigger() {
        assert_eq!(
            extract_topic("כמה החלטות יש בנושא חינוך"),
            Some("חינוך".to_string())
        );
        assert_eq!(
            extract_topic("החלטות בתחום איכות הסביבה"),
            Some("איכות הסביבה".to_string())
        );
    }

    #[test]
    fn at_topic_02_terminates_at_date_and_clause_keywords() {
        assert_eq!(
            extract_topic("החלטות על חינוך מ-2020"),
            Some("חינוך".to_string())
        );
        assert_eq!(
            extract_topic("החלטות בנושא בריאות של ממשלה 37"),
            Some("בריאות".to_string())
        );
    }

    #[test]
    fn at_topic_03_no_trigger_no_topic() {
        assert_eq!(extract_topic("החלטות של ממשלה 37"), None);
        assert_eq!(extract_topic("בנושא"), None);
    }

    #[test]
    fn at_topic_04_double_strip_is_defensive() {
        assert_eq!(strip_leading_triggers("על חינוך"), "חינוך");
        assert_eq!(strip_leading_triggers("בנושא על חינוך"), "חינוך");
        assert_eq!(strip_leading_triggers("חינוך"), "חינוך");
        assert_eq!(strip_leading_triggers(""), "");
    }
}
