use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// Pulls an optional `due:YYYY-MM-DD` token out of the raw input line.
/// The first valid token wins; every token is removed from the title.
pub fn parse_todo_input(input: &str) -> ParsedInput {
    let due_re = Regex::new(r"due:(\d{4}-\d{2}-\d{2})\s*").unwrap();

    let mut due_date = None;

    for caps in due_re.captures_iter(input) {
        if let Some(date_match) = caps.get(1) {
            if let Ok(date) = date_match.as_str().parse::<NaiveDate>() {
                if due_date.is_none() {
                    due_date = midnight_utc(date);
                }
            }
        }
    }

    let title = due_re.replace_all(input, "").to_string();

    let title = Regex::new(r"\s+")
        .unwrap()
        .replace_all(&title, " ")
        .trim()
        .to_string();

    ParsedInput { title, due_date }
}

/// Parses a bare `YYYY-MM-DD` into a UTC midnight timestamp. Used by
/// the inline edit form.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim().parse::<NaiveDate>().ok().and_then(midnight_utc)
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}
