use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

const CANDIDATE_SELECTOR: &str = "[data-date], [data-release], [data-year], td, dd, p, span, div";
const DATE_ATTRIBUTES: &[&str] = &["data-date", "data-release", "data-year"];
const META_SELECTOR: &str = r#"meta[property="music:release_date"], meta[name="music:release_date"], meta[property="release_date"]"#;

const MONTH: &str = "(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\\.?";

/// Ordered from most to least specific; every pattern exposes the year as `year`
/// and is delimited by whitespace or the ends of the text.
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:^|\s)(?P<date>(?P<year>\d{4})-\d{2}-\d{2})(?:\s|$)".to_string(),
        r"(?:^|\s)(?P<date>\d{1,2}\.\d{1,2}\.(?P<year>\d{4}))(?:\s|$)".to_string(),
        r"(?:^|\s)(?P<date>\d{1,2}/\d{1,2}/(?P<year>\d{4}))(?:\s|$)".to_string(),
        format!(r"(?:^|\s)(?P<date>{MONTH} \d{{1,2}},? (?P<year>\d{{4}}))(?:\s|$)"),
        format!(r"(?:^|\s)(?P<date>\d{{1,2}} {MONTH} (?P<year>\d{{4}}))(?:\s|$)"),
        r"(?:^|\s)(?P<date>(?P<year>\d{4}))(?:\s|$)".to_string(),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("date pattern"))
    .collect()
});

/// Finds the first plausible release date on the page, in document order.
///
/// Falls back to release-date meta tags. Returns `None` when nothing looks like a
/// date between 1900 and 2099.
pub fn extract_release_date(document: &Html) -> Option<String> {
    let candidates = Selector::parse(CANDIDATE_SELECTOR).ok()?;
    for element in document.select(&candidates) {
        let attrs = DATE_ATTRIBUTES
            .iter()
            .filter_map(|name| element.value().attr(name));
        for attr in attrs {
            if let Some(date) = match_date(attr) {
                return Some(date);
            }
        }
        let text = element.text().collect::<String>();
        if let Some(date) = match_date(&text) {
            return Some(date);
        }
    }

    let meta = Selector::parse(META_SELECTOR).ok()?;
    document
        .select(&meta)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Tries each pattern in order on `text`; the first in-range match wins.
pub fn match_date(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for pattern in DATE_PATTERNS.iter() {
        let Some(captures) = pattern.captures(text) else {
            continue;
        };
        let in_range = captures
            .name("year")
            .and_then(|year| year.as_str().parse::<u16>().ok())
            .is_some_and(|year| (1900..=2099).contains(&year));
        if in_range {
            return captures.name("date").map(|date| date.as_str().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::match_date;

    #[test]
    fn recognises_each_format() {
        assert_eq!(match_date("2020-05-01").as_deref(), Some("2020-05-01"));
        assert_eq!(match_date("01.05.2020").as_deref(), Some("01.05.2020"));
        assert_eq!(match_date("5/1/2020").as_deref(), Some("5/1/2020"));
        assert_eq!(match_date("May 1, 2020").as_deref(), Some("May 1, 2020"));
        assert_eq!(match_date("1 May 2020").as_deref(), Some("1 May 2020"));
        assert_eq!(match_date("Released 1998").as_deref(), Some("1998"));
    }

    #[test]
    fn rejects_three_and_five_digit_years() {
        assert_eq!(match_date("199"), None);
        assert_eq!(match_date("12345"), None);
        assert_eq!(match_date("track 20201 of 2"), None);
    }

    #[test]
    fn rejects_years_out_of_range() {
        assert_eq!(match_date("1850"), None);
        assert_eq!(match_date("2150-01-01"), None);
    }

    #[test]
    fn more_specific_pattern_wins() {
        assert_eq!(
            match_date("1999 reissue of 2001-02-03 edition").as_deref(),
            Some("2001-02-03")
        );
    }
}
