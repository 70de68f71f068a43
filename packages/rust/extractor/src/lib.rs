//! Resilient extraction of player statistics from summoner pages.
//!
//! This crate provides:
//! - [`patterns`]: the shared table of win/loss/percentage patterns
//! - [`locator`]: ordered selector strategies for finding item nodes
//! - [`projector`]: per-field fallback chains over one node
//! - [`assembler`]: row filters, record building, and top-N truncation
//! - [`profile`]: strategies, chains, and filters for each record kind, as data
//! - [`extract_top_champions`] / [`extract_top_masteries`]: the entry points
//!
//! Extraction is a pure function of the input string. Only an unreadable page is
//! an error; a page without matching data yields an empty list.

pub mod assembler;
pub mod locator;
pub mod patterns;
pub mod pipeline;
pub mod profile;
pub mod projector;

use std::sync::LazyLock;

use champscout_shared::{ChampionRecord, Locale, MasteryRecord, Result};

pub use assembler::{MarkerKind, Record, Rejection, RowFilter, assemble};
pub use locator::{Located, NodeSource, SelectorStrategy, locate_item_nodes, locate_with_strategy};
pub use pipeline::{Extractor, parse_html, parse_html_bytes, run_profile};
pub use profile::{ExtractionProfile, RecordKind};
pub use projector::{Field, FieldChain, ProjectedFields, project, project_field};

static DEFAULT_EXTRACTOR: LazyLock<Extractor> =
    LazyLock::new(|| Extractor::new(Locale::default()).expect("built-in profiles compile"));

/// Up to `top_n` most-played champions from a champions page, in page order.
///
/// Every returned record has at least one game played.
pub fn extract_top_champions(html: &str, top_n: usize) -> Result<Vec<ChampionRecord>> {
    DEFAULT_EXTRACTOR.champions(html, top_n)
}

/// Up to `top_n` champion masteries from a mastery page, in page order.
pub fn extract_top_masteries(html: &str, top_n: usize) -> Result<Vec<MasteryRecord>> {
    DEFAULT_EXTRACTOR.masteries(html, top_n)
}
