#![forbid(unsafe_code)]

use chrono::{Datelike, Days, NaiveDate};

use remez_kernel_contracts::route::DateRange;

use crate::normalize::matches_keyword;

pub const MONTHS: &[(&str, u32)] = &[
    ("ינואר", 1),
    ("פברואר", 2),
    ("מרץ", 3),
    ("אפריל", 4),
    ("מאי", 5),
    ("יוני", 6),
    ("יולי", 7),
    ("אוגוסט", 8),
    ("ספטמבר", 9),
    ("אוקטובר", 10),
    ("נובמבר", 11),
    ("דצמבר", 12),
];

const FROM_MARKERS: &[&str] = &["מאז", "החל"];
const UNTIL_MARKER: &str = "עד";
const ONWARD_MARKER: &str = "ואילך";

/// Stems that claim the number after them for another extractor; a bare
/// 4-digit value following one of these is an identifier, not a year.
const NUMBER_OWNER_STEMS: &[&str] = &["החלטה", "ממשלה", "ממשלת", "מספר"];

const YEAR_MIN: u64 = 1948;
const YEAR_MAX: u64 = 2099;

/// Resolve a date window from the query, in fixed priority: relative words
/// (needs `now`), explicit day/month/year literals, month-name + year, bare
/// year. One-sided phrases leave the other bound open; nothing is ever
/// defaulted to "today" or "beginning of time".
pub fn extract_date_range(text: &str, now: Option<NaiveDate>) -> Option<DateRange> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if let Some(now) = now {
        if let Some(range) = relative_range(&tokens, now) {
            return Some(range);
        }
    }
    if let Some(range) = explicit_range(&tokens) {
        return Some(range);
    }
    if let Some(range) = month_year_range(&tokens) {
        return Some(range);
    }
    bare_year_range(&tokens)
}

/// Used by the topic extractor to cut a capture at the first date expression.
pub fn is_date_token(token: &str) -> bool {
    let token = token.trim_end_matches([',', '.', '?', '!']);
    if matches!(token, "היום" | "אתמול" | "השבוע" | "החודש" | "השנה") {
        return true;
    }
    if token == ONWARD_MARKER {
        return true;
    }
    if month_of(token).is_some() {
        return true;
    }
    if explicit_date(token).is_some() {
        return true;
    }
    matches!(year_of(token), Some((_, _)))
}

fn relative_range(tokens: &[&str], now: NaiveDate) -> Option<DateRange> {
    for token in tokens {
        let bounds = match *token {
            "היום" => Some((now, now)),
            "אתמול" => {
                let yesterday = now.checked_sub_days(Days::new(1))?;
                Some((yesterday, yesterday))
            }
            // Israeli civil week starts on Sunday.
            "השבוע" => {
                let back = now.weekday().num_days_from_sunday() as u64;
                Some((now.checked_sub_days(Days::new(back))?, now))
            }
            "החודש" => Some((now.with_day(1)?, now)),
            "השנה" => Some((NaiveDate::from_ymd_opt(now.year(), 1, 1)?, now)),
            _ => None,
        };
        if let Some((start, end)) = bounds {
            return DateRange::v1(Some(start), Some(end)).ok();
        }
    }
    None
}

fn explicit_range(tokens: &[&str]) -> Option<DateRange> {
    let mut dates: Vec<(usize, NaiveDate, bool)> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if let Some((date, from_prefix)) = explicit_date(token) {
            dates.push((i, date, from_prefix));
        }
    }
    match dates.as_slice() {
        [] => None,
        [(i, date, from_prefix)] => one_sided(tokens, *i, *from_prefix, (*date, *date)),
        [(_, first, _), (_, second, _), ..] => {
            let start = (*first).min(*second);
            let end = (*first).max(*second);
            DateRange::v1(Some(start), Some(end)).ok()
        }
    }
}

fn month_year_range(tokens: &[&str]) -> Option<DateRange> {
    for (i, token) in tokens.iter().enumerate() {
        let Some(month) = month_of(token) else {
            continue;
        };
        let Some((year, _)) = tokens.get(i + 1).and_then(|t| year_of(t)) else {
            continue;
        };
        let (start, end) = month_span(year as i32, month)?;
        return DateRange::v1(Some(start), Some(end)).ok();
    }
    None
}

fn bare_year_range(tokens: &[&str]) -> Option<DateRange> {
    for (i, token) in tokens.iter().enumerate() {
        let Some((year, from_prefix)) = year_of(token) else {
            continue;
        };
        if i > 0 && owner_before(tokens[i - 1]) {
            continue;
        }
        let start = NaiveDate::from_ymd_opt(year as i32, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year as i32, 12, 31)?;
        return one_sided(tokens, i, from_prefix, (start, end));
    }
    None
}

/// Apply the surrounding direction markers to a single dated expression.
fn one_sided(
    tokens: &[&str],
    i: usize,
    from_prefix: bool,
    (start, end): (NaiveDate, NaiveDate),
) -> Option<DateRange> {
    let prev = i.checked_sub(1).map(|p| tokens[p]);
    let next = tokens.get(i + 1).copied();
    let from = from_prefix
        || prev.is_some_and(|p| FROM_MARKERS.contains(&p))
        || next == Some(ONWARD_MARKER);
    let until = prev == Some(UNTIL_MARKER);
    if from {
        DateRange::v1(Some(start), None).ok()
    } else if until {
        DateRange::v1(None, Some(end)).ok()
    } else {
        DateRange::v1(Some(start), Some(end)).ok()
    }
}

fn owner_before(prev: &str) -> bool {
    NUMBER_OWNER_STEMS
        .iter()
        .any(|stem| matches_keyword(prev, stem))
        || prev == "מס'"
        || prev == "מס׳"
}

/// Parse a dd/mm/yyyy or dd.mm.yyyy literal, reporting whether the token
/// carried a "from" prefix ("מ-1/1/2020").
fn explicit_date(token: &str) -> Option<(NaiveDate, bool)> {
    let token = token.trim_end_matches([',', '.', '?', '!']);
    let (token, from_prefix) = strip_from_prefix(token);
    let parts: Vec<&str> = token.split(['/', '.']).collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parse_digits(parts[0], 1, 2)?;
    let month: u32 = parse_digits(parts[1], 1, 2)?;
    let year: u32 = parse_digits(parts[2], 4, 4)?;
    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    Some((date, from_prefix))
}

fn year_of(token: &str) -> Option<(u64, bool)> {
    let token = token.trim_end_matches([',', '.', '?', '!']);
    let (digits, from_prefix) = strip_from_prefix(token);
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: u64 = digits.parse().ok()?;
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return None;
    }
    Some((year, from_prefix))
}

fn month_of(token: &str) -> Option<u32> {
    for (name, month) in MONTHS {
        if matches_keyword(token, name) {
            return Some(*month);
        }
    }
    None
}

fn month_span(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, next_first.pred_opt()?))
}

fn strip_from_prefix(token: &str) -> (&str, bool) {
    for prefix in ["מ-", "מ"] {
        if let Some(rest) = token.strip_prefix(prefix) {
            if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return (rest, true);
            }
        }
    }
    for prefix in ["ב-", "ב", "ל-", "ל", "ה-"] {
        if let Some(rest) = token.strip_prefix(prefix) {
            if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return (rest, false);
            }
        }
    }
    (token, false)
}

fn parse_digits(part: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if part.len() < min_len || part.len() > max_len || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn at_daterange_01_relative_words_resolve_against_now() {
        let now = d(2024, 6, 12); // a Wednesday
        assert_eq!(
            extract_date_range("מה הוחלט היום", Some(now)).unwrap(),
            DateRange::v1(Some(now), Some(now)).unwrap()
        );
        assert_eq!(
            extract_date_range("מה הוחלט אתמול", Some(now)).unwrap(),
            DateRange::v1(Some(d(2024, 6, 11)), Some(d(2024, 6, 11))).unwrap()
        );
        assert_eq!(
            extract_date_range("החלטות השבוע", Some(now)).unwrap(),
            DateRange::v1(Some(d(2024, 6, 9)), Some(now)).unwrap()
        );
        assert_eq!(
            extract_date_range("החלטות השנה", Some(now)).unwrap(),
            DateRange::v1(Some(d(2024, 1, 1)), Some(now)).unwrap()
        );
    }

    #[test]
    fn at_daterange_02_relative_words_without_now_are_skipped() {
        assert_eq!(extract_date_range("מה הוחלט היום", None), None);
        assert_eq!(extract_date_range("החלטות השבוע", None), None);
    }

    #[test]
    fn at_daterange_03_explicit_literals_and_ranges() {
        assert_eq!(
            extract_date_range("החלטות בין 1/1/2020 ל-31/12/2020", None).unwrap(),
            DateRange::v1(Some(d(2020, 1, 1)), Some(d(2020, 12, 31))).unwrap()
        );
        assert_eq!(
            extract_date_range("החלטות מ-15/3/2021", None).unwrap(),
            DateRange::v1(Some(d(2021, 3, 15)), None).unwrap()
        );
    }

    #[test]
    fn at_daterange_04_month_name_plus_year() {
        assert_eq!(
            extract_date_range("החלטות מרץ 2021", None).unwrap(),
            DateRange::v1(Some(d(2021, 3, 1)), Some(d(2021, 3, 31))).unwrap()
        );
        assert_eq!(
            extract_date_range("החלטות בפברואר 2020", None).unwrap(),
            DateRange::v1(Some(d(2020, 2, 1)), Some(d(2020, 2, 29))).unwrap()
        );
        // A bare month with no year is not a window.
        assert_eq!(extract_date_range("החלטות מרץ", None), None);
    }

    #[test]
    fn at_daterange_05_bare_year_expands_to_full_year() {
        assert_eq!(
            extract_date_range("החלטות בנושא חינוך 2020", None).unwrap(),
            DateRange::v1(Some(d(2020, 1, 1)), Some(d(2020, 12, 31))).unwrap()
        );
    }

    #[test]
    fn at_daterange_06_one_sided_years_leave_open_bounds() {
        assert_eq!(
            extract_date_range("החלטות מ-2020 ואילך", None).unwrap(),
            DateRange::v1(Some(d(2020, 1, 1)), None).unwrap()
        );
        assert_eq!(
            extract_date_range("החלטות מאז 2019", None).unwrap(),
            DateRange::v1(Some(d(2019, 1, 1)), None).unwrap()
        );
        assert_eq!(
            extract_date_range("החלטות עד 2018", None).unwrap(),
            DateRange::v1(None, Some(d(2018, 12, 31))).unwrap()
        );
    }

    #[test]
    fn at_daterange_07_identifier_numbers_are_not_years() {
        assert_eq!(extract_date_range("נתח את החלטה 2020", None), None);
        assert_eq!(extract_date_range("החלטה מספר 2021", None), None);
    }
}
