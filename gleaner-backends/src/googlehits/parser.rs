//! Result-count extraction from Google search pages.

use std::sync::LazyLock;

use gleaner_fetch::FetchError;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::warn;

/// Element holding the "About N results" text.
static RESULT_STATS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#resultStats").expect("Invalid selector"));

/// First run of digits.
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("Invalid regex"));

/// Thousands/decimal separators used by the locales Google serves.
const SEPARATORS: &[char] = &[',', '.', '\'', '\u{a0}', '\u{202f}'];

/// Extracts the hit count from a search results page.
///
/// An empty marker, or one without digits, counts as zero hits. A page
/// without the marker fails with [`FetchError::Parse`].
pub fn parse_hits(html: &str) -> Result<u64, FetchError> {
    let document = Html::parse_document(html);
    let stats = document
        .select(&RESULT_STATS)
        .next()
        .ok_or_else(|| FetchError::Parse("result stats marker not found".to_string()))?;

    let text: String = stats.text().collect::<String>().replace(SEPARATORS, "");
    let Some(digits) = DIGITS_RE.find(&text) else {
        warn!(text = %text.trim(), "No hits found");
        return Ok(0);
    };

    digits
        .as_str()
        .parse()
        .map_err(|e| FetchError::Parse(format!("invalid hit count '{}': {e}", digits.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(stats: &str) -> String {
        format!(
            "<html><body><div id=\"topstuff\"></div>\
             <div id=\"resultStats\">{stats}</div></body></html>"
        )
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(parse_hits(&page("12,345 results")).unwrap(), 12_345);
        assert_eq!(parse_hits(&page("About 1.234.567 results")).unwrap(), 1_234_567);
        assert_eq!(parse_hits(&page("Environ 8\u{a0}910 résultats")).unwrap(), 8_910);
    }

    #[test]
    fn test_first_number_wins() {
        let hits = parse_hits(&page("About 4,560 results<nobr> (0.31 seconds)</nobr>")).unwrap();
        assert_eq!(hits, 4_560);
    }

    #[test]
    fn test_empty_marker_is_zero() {
        assert_eq!(parse_hits(&page("")).unwrap(), 0);
        assert_eq!(parse_hits(&page("No results")).unwrap(), 0);
    }

    #[test]
    fn test_missing_marker() {
        let err = parse_hits("<html><body><p>captcha</p></body></html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
