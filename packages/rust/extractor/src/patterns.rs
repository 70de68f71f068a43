//! Text pattern extractors.
//!
//! Every numeric lookup over flattened row text goes through one [`PatternTable`],
//! so win/loss/percentage matching has a single definition per locale.

use std::sync::LazyLock;

use regex::Regex;

use champscout_shared::Locale;

// ---------------------------------------------------------------------------
// Pattern table
// ---------------------------------------------------------------------------

/// Compiled patterns used by the field projectors.
///
/// Each pattern captures the number in group 1.
#[derive(Debug)]
pub struct PatternTable {
    /// A run of digits followed by the "win" suffix.
    pub wins: Regex,
    /// A run of digits followed by the "loss" suffix.
    pub losses: Regex,
    /// A (possibly decimal) number followed by `%`.
    pub percentage: Regex,
    /// A whole number, optionally thousands-separated (`850`, `1,234,567`),
    /// alone in its element.
    pub score: Regex,
}

static KO: LazyLock<PatternTable> = LazyLock::new(|| PatternTable::with_suffixes("승", "패"));

// `\b` keeps "12 Wards" or "3 Lanes" from counting.
static EN: LazyLock<PatternTable> = LazyLock::new(|| PatternTable::with_suffixes(r"W\b", r"L\b"));

impl PatternTable {
    /// The shared table for a locale.
    pub fn for_locale(locale: Locale) -> &'static PatternTable {
        match locale {
            Locale::Ko => &KO,
            Locale::En => &EN,
        }
    }

    fn with_suffixes(win: &str, loss: &str) -> Self {
        Self {
            wins: Regex::new(&format!(r"(\d+)\s*{win}")).expect("valid win regex"),
            losses: Regex::new(&format!(r"(\d+)\s*{loss}")).expect("valid loss regex"),
            percentage: Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*%").expect("valid percentage regex"),
            score: Regex::new(r"^\s*(\d{1,3}(?:,\d{3})+|\d+)\s*$").expect("valid score regex"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// First capture group of `pattern` in `text`, trimmed.
pub fn first_capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Parse a captured count. Counts too large for `u32` are treated as missing.
pub fn parse_count(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Parse a captured percentage.
pub fn parse_percentage(raw: &str) -> Option<f32> {
    raw.trim().parse::<f32>().ok().filter(|p| (0.0..=100.0).contains(p))
}

/// Find a count (wins or losses) in free text.
pub fn find_count(pattern: &Regex, text: &str) -> Option<u32> {
    first_capture(pattern, text).and_then(parse_count)
}
