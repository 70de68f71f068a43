//! The extraction pipeline: parse → locate → project → assemble.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use champscout_shared::{AppConfig, ChampionRecord, Locale, MasteryRecord, Result, ScoutError};

use crate::assembler::{Record, assemble};
use crate::locator::locate_with_strategy;
use crate::profile::{ExtractionProfile, RecordKind};
use crate::projector::project;

/// Share of control characters above which input is treated as binary.
const MAX_CONTROL_RATIO: f64 = 0.1;

static ROW_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<tr(\s[^>]*)?>").expect("valid row regex"));
static ROW_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</tr\s*>").expect("valid row regex"));
static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid table selector"));

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a page, rejecting input that cannot be a document at all.
///
/// Markup errors are tolerated (third-party pages are rarely valid HTML);
/// empty, binary, or content-free input is a [`ScoutError::Parse`].
pub fn parse_html(html: &str) -> Result<Html> {
    if html.trim().is_empty() {
        return Err(ScoutError::parse("document is empty"));
    }
    if html.contains('\0') {
        return Err(ScoutError::parse("document contains NUL bytes"));
    }

    let total = html.chars().count();
    let control = html
        .chars()
        .filter(|c| c.is_control() && !c.is_whitespace())
        .count();
    if control as f64 / total as f64 > MAX_CONTROL_RATIO {
        return Err(ScoutError::parse(format!(
            "document looks binary ({control} of {total} characters are control characters)"
        )));
    }

    let mut doc = Html::parse_document(html);
    if doc.select(&TABLE).next().is_none() && ROW_OPEN.is_match(html) {
        debug!("re-parsing table rows found outside any table");
        doc = Html::parse_document(&rehome_stray_rows(html));
    }
    if !has_content(&doc) {
        return Err(ScoutError::parse("document has no elements or text"));
    }

    debug!(
        bytes = html.len(),
        markup_errors = doc.errors.len(),
        "parsed document"
    );
    Ok(doc)
}

/// Like [`parse_html`], for raw bytes that must be UTF-8.
pub fn parse_html_bytes(bytes: &[u8]) -> Result<Html> {
    let html = std::str::from_utf8(bytes)
        .map_err(|e| ScoutError::parse(format!("document is not valid UTF-8: {e}")))?;
    parse_html(html)
}

/// Give every `<tr>` its own table and a single cell around its content.
///
/// The HTML5 tree builder drops row tags outside a table and foster-parents
/// non-cell content out of a row, so a bare `<tr><img> 12승</tr>` would lose
/// its row entirely.
fn rehome_stray_rows(html: &str) -> String {
    let opened = ROW_OPEN.replace_all(html, "<table><tbody><tr${1}><td>");
    ROW_CLOSE
        .replace_all(&opened, "</td></tr></tbody></table>")
        .into_owned()
}

/// Anything besides the implied `<html>`, `<head>` and `<body>` shell.
fn has_content(doc: &Html) -> bool {
    doc.root_element().descendants().skip(1).any(|node| {
        if let Some(text) = node.value().as_text() {
            return !text.trim().is_empty();
        }
        node.value()
            .as_element()
            .is_some_and(|el| !matches!(el.name(), "head" | "body"))
    })
}

// ---------------------------------------------------------------------------
// Running a profile
// ---------------------------------------------------------------------------

/// Run one profile over an already parsed document.
pub fn run_profile<R: Record>(doc: &Html, profile: &ExtractionProfile, top_n: usize) -> Vec<R> {
    let Some(located) = locate_with_strategy(&doc, &profile.strategies) else {
        debug!(kind = %profile.kind, "no item nodes found");
        return Vec::new();
    };

    let candidates = located.nodes.len();
    let rows = located
        .nodes
        .into_iter()
        .map(|node| project(node, &profile.chains));
    let records = assemble(rows, &profile.filters, top_n);

    debug!(
        kind = %profile.kind,
        strategy = %located.strategy,
        fallback = located.rank > 0,
        candidates,
        kept = records.len(),
        "extraction finished"
    );
    records
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// A pair of profiles ready to extract either record kind.
///
/// Holds only compiled selectors and patterns; every call parses its own document.
#[derive(Debug, Clone)]
pub struct Extractor {
    champions: ExtractionProfile,
    masteries: ExtractionProfile,
}

impl Extractor {
    /// Built-in profiles for `locale`.
    pub fn new(locale: Locale) -> Result<Self> {
        Ok(Self {
            champions: ExtractionProfile::champions(locale)?,
            masteries: ExtractionProfile::masteries(locale)?,
        })
    }

    /// Built-in profiles with the config file's overrides applied.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            champions: ExtractionProfile::from_config(RecordKind::Champions, config)?,
            masteries: ExtractionProfile::from_config(RecordKind::Masteries, config)?,
        })
    }

    /// Up to `top_n` most-played champions, in page order.
    #[instrument(skip(self, html), fields(bytes = html.len()))]
    pub fn champions(&self, html: &str, top_n: usize) -> Result<Vec<ChampionRecord>> {
        let doc = parse_html(html)?;
        Ok(self.champions_in(&doc, top_n))
    }

    /// Up to `top_n` champion masteries, in page order.
    #[instrument(skip(self, html), fields(bytes = html.len()))]
    pub fn masteries(&self, html: &str, top_n: usize) -> Result<Vec<MasteryRecord>> {
        let doc = parse_html(html)?;
        Ok(self.masteries_in(&doc, top_n))
    }

    /// Champions from a document parsed with [`parse_html`] or [`parse_html_bytes`].
    pub fn champions_in(&self, doc: &Html, top_n: usize) -> Vec<ChampionRecord> {
        run_profile(doc, &self.champions, top_n)
    }

    /// Masteries from a document parsed with [`parse_html`] or [`parse_html_bytes`].
    pub fn masteries_in(&self, doc: &Html, top_n: usize) -> Vec<MasteryRecord> {
        run_profile(doc, &self.masteries, top_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_input_is_a_parse_error() {
        assert!(parse_html("").unwrap_err().is_parse());
        assert!(parse_html("  \n\t ").unwrap_err().is_parse());
    }

    #[test]
    fn binary_input_is_a_parse_error() {
        assert!(parse_html("PK\u{3}\u{4}\0\0\u{14}").unwrap_err().is_parse());
        assert!(parse_html("\u{1}\u{2}\u{3}\u{4}ab").unwrap_err().is_parse());
        assert!(parse_html_bytes(&[0xff, 0xfe, 0x00, 0x3c]).unwrap_err().is_parse());
    }

    #[test]
    fn shell_only_document_is_a_parse_error() {
        assert!(parse_html("<!DOCTYPE html>").unwrap_err().is_parse());
        assert!(parse_html("<html><head></head><body></body></html>").unwrap_err().is_parse());
    }

    #[test]
    fn plain_text_parses() {
        assert!(parse_html("nothing to see here").is_ok());
        assert!(parse_html_bytes("<p>안녕</p>".as_bytes()).is_ok());
    }

    #[test]
    fn rows_outside_a_table_are_kept() {
        let html = r#"<tr class="row"><img alt="Ahri"> 12승 8패</tr><TR>Zed</TR>"#;
        let doc = parse_html(html).unwrap();
        let rows = Selector::parse("tbody tr").unwrap();
        let texts: Vec<String> = doc
            .select(&rows)
            .map(|tr| tr.text().collect::<String>().trim().to_string())
            .collect();
        assert_eq!(texts, vec!["12승 8패", "Zed"]);

        let img = Selector::parse("tr.row img").unwrap();
        assert!(doc.select(&img).next().is_some());
    }

    #[test]
    fn rows_inside_a_table_are_left_alone() {
        let html = "<table><tr><td>Ahri</td><td>12승 8패</td></tr></table>";
        let doc = parse_html(html).unwrap();
        let cells = Selector::parse("td").unwrap();
        assert_eq!(doc.select(&cells).count(), 2);
    }

    #[test]
    fn lone_empty_row_is_still_content() {
        assert!(parse_html("<tr></tr>").is_ok());
    }

    #[test]
    fn byte_input_runs_through_the_same_profiles() {
        let extractor = Extractor::new(Locale::Ko).unwrap();
        let html = "<table><tbody><tr><td>Ahri</td><td>3승 1패</td></tr></tbody></table>";
        let doc = parse_html_bytes(html.as_bytes()).unwrap();
        assert_eq!(
            extractor.champions_in(&doc, 5),
            extractor.champions(html, 5).unwrap()
        );
    }

    #[test]
    fn no_matching_nodes_is_empty_not_error() {
        let extractor = Extractor::new(Locale::Ko).unwrap();
        let html = "<html><body><p>이 소환사는 기록이 없습니다</p></body></html>";
        assert!(extractor.champions(html, 5).unwrap().is_empty());
        assert!(extractor.masteries(html, 5).unwrap().is_empty());
    }
}
