//! Extraction profiles: the selector strategies, field chains, and row filters
//! for each record kind.
//!
//! Profiles are plain data. Supporting a new page revision means adding a
//! selector or a chain step here (or in the config file), not a new code path.

use regex::Regex;

use champscout_shared::{AppConfig, Locale, Result};

use crate::assembler::RowFilter;
use crate::locator::SelectorStrategy;
use crate::patterns::PatternTable;
use crate::projector::{Extract, Field, FieldChain, Locate, Scope, Step};

/// "Most played" row selectors, current markup first.
pub const CHAMPION_STRATEGIES: &[&str] = &["tbody tr", "div.ChampionBox", "div.champion", "tr"];

/// Mastery entry selectors, current markup first.
pub const MASTERY_STRATEGIES: &[&str] = &[
    "div[data-tooltip-id^='opgg-tooltip']",
    "div.MasteryChampionList div.champion",
    "div.MasteryChampionItem",
    "li > div > img",
];

/// Substring of a head-to-head sub-row, matched case-insensitively.
pub const VERSUS_MARKER: &str = "vs";

/// Champion portraits. Mastery badge paths also contain "champion", hence the exclusion.
const CHAMPION_IMG: &str = "img[src*='champion']:not([src*='mastery'])";
const ANY_IMG: &str = "img:not([src*='mastery'])";
const BADGE_IMG: &str = "img[src*='mastery']";

/// Level badges are also bare numbers; a score span is anything else.
const SCORE_SPAN: &str = "span:not(.text-2xs)";
const LEVEL_SPAN: &str = "span.relative span.text-2xs";

/// A mastery list entry. Score lookups past the item node stay inside it.
const MASTERY_ITEM: &str = "li";

/// Aggregate-row markers for a locale.
pub fn aggregate_markers(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Ko => &["모든 챔피언"],
        Locale::En => &["All Champions"],
    }
}

/// Which record a profile produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Champions,
    Masteries,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Champions => f.write_str("champions"),
            Self::Masteries => f.write_str("masteries"),
        }
    }
}

/// Everything needed to turn one page into records of one kind.
#[derive(Debug, Clone)]
pub struct ExtractionProfile {
    pub kind: RecordKind,
    pub strategies: Vec<SelectorStrategy>,
    pub chains: Vec<FieldChain>,
    pub filters: Vec<RowFilter>,
}

impl ExtractionProfile {
    /// Built-in profile for "most played" rows.
    pub fn champions(locale: Locale) -> Result<Self> {
        let patterns = PatternTable::for_locale(locale);

        let mut chains = portrait_chains()?;
        chains.extend([
            FieldChain::new(Field::Wins, vec![node_pattern(&patterns.wins)]),
            FieldChain::new(Field::Losses, vec![node_pattern(&patterns.losses)]),
            FieldChain::new(Field::WinRate, vec![node_pattern(&patterns.percentage)]),
        ]);

        Ok(Self {
            kind: RecordKind::Champions,
            strategies: SelectorStrategy::parse_all(CHAMPION_STRATEGIES)?,
            chains,
            filters: default_filters(locale, true),
        })
    }

    /// Built-in profile for mastery entries.
    pub fn masteries(locale: Locale) -> Result<Self> {
        let patterns = PatternTable::for_locale(locale);

        let mut chains = portrait_chains()?;
        chains.extend([
            FieldChain::new(
                Field::Score,
                vec![
                    Step::new(
                        Locate::matching(Scope::Descendant, "span.mx-auto")?,
                        Extract::Text,
                    ),
                    Step::new(
                        Locate::matching(Scope::Descendant, SCORE_SPAN)?
                            .with_own_text(patterns.score.clone()),
                        Extract::Text,
                    ),
                    Step::new(
                        Locate::matching(Scope::Following, SCORE_SPAN)?
                            .with_own_text(patterns.score.clone())
                            .within(MASTERY_ITEM)?,
                        Extract::Text,
                    ),
                ],
            ),
            FieldChain::new(
                Field::Level,
                vec![
                    Step::new(
                        Locate::matching(Scope::Descendant, LEVEL_SPAN)?,
                        Extract::Text,
                    ),
                    Step::new(
                        Locate::matching(Scope::NodeOrDescendant, BADGE_IMG)?,
                        Extract::attr("alt"),
                    ),
                ],
            ),
            FieldChain::new(
                Field::Badge,
                vec![Step::new(
                    Locate::matching(Scope::NodeOrDescendant, BADGE_IMG)?,
                    Extract::attr("src"),
                )],
            ),
        ]);

        Ok(Self {
            kind: RecordKind::Masteries,
            strategies: SelectorStrategy::parse_all(MASTERY_STRATEGIES)?,
            chains,
            filters: default_filters(locale, false),
        })
    }

    /// Built-in profile for `kind`, with selector and marker overrides from `config`.
    pub fn from_config(kind: RecordKind, config: &AppConfig) -> Result<Self> {
        let locale = config.defaults.locale;
        let (profile, selectors) = match kind {
            RecordKind::Champions => (Self::champions(locale)?, &config.selectors.champions),
            RecordKind::Masteries => (Self::masteries(locale)?, &config.selectors.mastery),
        };

        let profile = if selectors.is_empty() {
            profile
        } else {
            profile.with_strategies(selectors)?
        };

        let markers = &config.markers;
        if markers.aggregate.is_empty() && markers.versus.is_none() {
            return Ok(profile);
        }

        let aggregate: Vec<String> = if markers.aggregate.is_empty() {
            aggregate_markers(locale).iter().map(|m| m.to_string()).collect()
        } else {
            markers.aggregate.clone()
        };
        let versus = markers.versus.as_deref().unwrap_or(VERSUS_MARKER);

        Ok(profile.with_markers(&aggregate, versus))
    }

    /// Replace the selector strategies.
    pub fn with_strategies<S: AsRef<str>>(mut self, sources: &[S]) -> Result<Self> {
        self.strategies = SelectorStrategy::parse_all(sources)?;
        Ok(self)
    }

    /// Replace the marker filters, keeping the games filter if present.
    pub fn with_markers<S: AsRef<str>>(mut self, aggregate: &[S], versus: &str) -> Self {
        let require_games = self.filters.contains(&RowFilter::RequireGames);
        self.filters = marker_filters(aggregate, versus);
        if require_games {
            self.filters.push(RowFilter::RequireGames);
        }
        self
    }
}

fn portrait_chains() -> Result<Vec<FieldChain>> {
    Ok(vec![
        FieldChain::new(
            Field::Name,
            vec![
                Step::new(
                    Locate::matching(Scope::NodeOrDescendant, CHAMPION_IMG)?,
                    Extract::attr("alt"),
                ),
                Step::new(
                    Locate::matching(Scope::NodeOrDescendant, ANY_IMG)?,
                    Extract::attr("alt"),
                ),
            ],
        ),
        FieldChain::new(
            Field::Image,
            vec![
                Step::new(
                    Locate::matching(Scope::NodeOrDescendant, CHAMPION_IMG)?,
                    Extract::attr("src"),
                ),
                Step::new(
                    Locate::matching(Scope::NodeOrDescendant, ANY_IMG)?,
                    Extract::attr("src"),
                ),
            ],
        ),
    ])
}

fn node_pattern(pattern: &Regex) -> Step {
    Step::new(Locate::node(), Extract::Pattern(pattern.clone()))
}

fn marker_filters<S: AsRef<str>>(aggregate: &[S], versus: &str) -> Vec<RowFilter> {
    aggregate
        .iter()
        .map(|m| RowFilter::aggregate(m.as_ref()))
        .chain(std::iter::once(RowFilter::versus(versus)))
        .collect()
}

fn default_filters(locale: Locale, require_games: bool) -> Vec<RowFilter> {
    let mut filters = marker_filters(aggregate_markers(locale), VERSUS_MARKER);
    if require_games {
        filters.push(RowFilter::RequireGames);
    }
    filters
}
