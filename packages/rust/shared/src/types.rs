//! Core domain types: extracted records and player identifiers.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Default number of records returned by each extractor.
pub const DEFAULT_TOP_N: usize = 5;

/// Display value for a text field that could not be resolved.
pub const PLACEHOLDER: &str = "-";

/// Display name used when no champion name could be resolved.
pub const UNKNOWN_NAME: &str = "Unknown";

// ---------------------------------------------------------------------------
// Locale
// ---------------------------------------------------------------------------

/// Language the source page was rendered in.
///
/// Determines the win/loss suffixes and the aggregate-row marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ko,
    En,
}

impl Locale {
    /// Path segment the site uses for this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ko" | "kr" | "korean" => Ok(Self::Ko),
            "en" | "english" => Ok(Self::En),
            other => Err(ScoutError::validation(format!(
                "unsupported locale '{other}': expected 'ko' or 'en'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// RiotId
// ---------------------------------------------------------------------------

/// A `name#tag` player identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiotId {
    pub name: String,
    pub tag: String,
}

impl RiotId {
    /// The `name-tag` form used in summoner page paths (not yet percent-encoded).
    pub fn slug(&self) -> String {
        format!("{}-{}", self.name, self.tag)
    }
}

impl std::fmt::Display for RiotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.tag)
    }
}

impl std::str::FromStr for RiotId {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, tag) = s.split_once('#').ok_or_else(|| {
            ScoutError::validation(format!(
                "'{s}' is not a Riot ID: expected name#tag (e.g. Hide on bush#KR1)"
            ))
        })?;

        let name = name.trim();
        let tag = tag.trim();
        if name.is_empty() || tag.is_empty() {
            return Err(ScoutError::validation(format!(
                "'{s}' is not a Riot ID: name and tag must both be non-empty"
            )));
        }

        Ok(Self {
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One "most played" row: a champion with its win/loss tally.
///
/// Extractors only emit records with `wins + losses > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionRecord {
    pub name: String,
    pub image_url: Option<String>,
    pub wins: u32,
    pub losses: u32,
    /// Win rate printed on the row itself, when the page shows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_win_rate: Option<f32>,
}

impl ChampionRecord {
    /// Total games played.
    pub fn games(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }

    /// Win rate in percent, derived from the tally.
    pub fn win_rate(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => f64::from(self.wins) / f64::from(games) * 100.0,
        }
    }
}

/// One mastery entry. `score` is kept exactly as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub name: String,
    pub image_url: Option<String>,
    pub score: String,
    /// Tier/badge label, [`PLACEHOLDER`] when the page has none.
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn riot_id_parses_name_and_tag() {
        let id: RiotId = "Hide on bush#KR1".parse().unwrap();
        assert_eq!(id.name, "Hide on bush");
        assert_eq!(id.tag, "KR1");
        assert_eq!(id.slug(), "Hide on bush-KR1");
        assert_eq!(id.to_string(), "Hide on bush#KR1");
    }

    #[test]
    fn riot_id_rejects_missing_tag() {
        assert!("Hide on bush".parse::<RiotId>().is_err());
        assert!("Faker#".parse::<RiotId>().is_err());
        assert!("#KR1".parse::<RiotId>().is_err());
    }

    #[test]
    fn locale_from_str() {
        assert_eq!("ko".parse::<Locale>().unwrap(), Locale::Ko);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert!("jp".parse::<Locale>().is_err());
    }

    #[test]
    fn win_rate_is_derived() {
        let rec = ChampionRecord {
            name: "Ahri".into(),
            image_url: None,
            wins: 12,
            losses: 8,
            listed_win_rate: None,
        };
        assert_eq!(rec.games(), 20);
        assert!((rec.win_rate() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn records_serialize_without_empty_extras() {
        let rec = MasteryRecord {
            name: "Zed".into(),
            image_url: Some("https://cdn.example/zed.png".into()),
            score: "1,234,567".into(),
            level: PLACEHOLDER.into(),
            badge_url: None,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains(r#""score":"1,234,567""#));
        assert!(!json.contains("badge_url"));
    }
}
