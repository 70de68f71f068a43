//! Record assembler: validity filters, normalization, and top-N truncation.
//!
//! Rows arrive in document order, which the site already ranks. Assembly never
//! re-sorts; it drops invalid rows and keeps a prefix.

use tracing::trace;

use champscout_shared::{ChampionRecord, MasteryRecord, PLACEHOLDER, UNKNOWN_NAME};

use crate::patterns::{parse_count, parse_percentage};
use crate::projector::{Field, ProjectedFields};

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A validity check applied to each projected row, in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    /// Reject rows whose flattened text contains `marker`.
    Marker {
        kind: MarkerKind,
        marker: String,
        ignore_case: bool,
    },
    /// Reject rows with no games played (wins + losses == 0).
    RequireGames,
}

/// What a text marker identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// An "all champions" summary row.
    Aggregate,
    /// A head-to-head sub-row nested inside a champion row.
    Versus,
}

/// Why a row was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Marker { kind: MarkerKind, marker: String },
    NoGames,
}

impl RowFilter {
    pub fn aggregate(marker: impl Into<String>) -> Self {
        Self::Marker {
            kind: MarkerKind::Aggregate,
            marker: marker.into(),
            ignore_case: true,
        }
    }

    pub fn versus(marker: impl Into<String>) -> Self {
        Self::Marker {
            kind: MarkerKind::Versus,
            marker: marker.into(),
            ignore_case: true,
        }
    }

    /// `Err` with the reason if `row` fails this filter.
    pub fn check(&self, row: &ProjectedFields) -> Result<(), Rejection> {
        match self {
            Self::Marker {
                kind,
                marker,
                ignore_case,
            } => {
                let hit = if *ignore_case {
                    row.text.to_lowercase().contains(&marker.to_lowercase())
                } else {
                    row.text.contains(marker.as_str())
                };
                if hit {
                    return Err(Rejection::Marker {
                        kind: *kind,
                        marker: marker.clone(),
                    });
                }
                Ok(())
            }
            Self::RequireGames => {
                let games = u64::from(count(row, Field::Wins)) + u64::from(count(row, Field::Losses));
                if games == 0 {
                    return Err(Rejection::NoGames);
                }
                Ok(())
            }
        }
    }
}

/// Run `filters` in order, stopping at the first rejection.
pub fn check_row(row: &ProjectedFields, filters: &[RowFilter]) -> Result<(), Rejection> {
    filters.iter().try_for_each(|filter| filter.check(row))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn count(row: &ProjectedFields, field: Field) -> u32 {
    row.get(field).and_then(parse_count).unwrap_or(0)
}

fn text_or(row: &ProjectedFields, field: Field, default: &str) -> String {
    row.get(field).unwrap_or(default).to_string()
}

/// A canonical record built from projected fields.
pub trait Record: Sized {
    fn from_fields(row: &ProjectedFields) -> Self;
}

impl Record for ChampionRecord {
    fn from_fields(row: &ProjectedFields) -> Self {
        Self {
            name: text_or(row, Field::Name, UNKNOWN_NAME),
            image_url: row.get(Field::Image).map(String::from),
            wins: count(row, Field::Wins),
            losses: count(row, Field::Losses),
            listed_win_rate: row.get(Field::WinRate).and_then(parse_percentage),
        }
    }
}

impl Record for MasteryRecord {
    fn from_fields(row: &ProjectedFields) -> Self {
        Self {
            name: text_or(row, Field::Name, UNKNOWN_NAME),
            image_url: row.get(Field::Image).map(String::from),
            score: text_or(row, Field::Score, PLACEHOLDER),
            level: text_or(row, Field::Level, PLACEHOLDER),
            badge_url: row.get(Field::Badge).map(String::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Filter rows, keep at most `top_n` in document order, and build records.
///
/// Rows are consumed lazily, so nothing past the `top_n`-th accepted row is read.
pub fn assemble<R, I>(rows: I, filters: &[RowFilter], top_n: usize) -> Vec<R>
where
    R: Record,
    I: IntoIterator<Item = ProjectedFields>,
{
    rows.into_iter()
        .enumerate()
        .filter(|(index, row)| match check_row(row, filters) {
            Ok(()) => true,
            Err(reason) => {
                trace!(index, ?reason, text = %row.text, "row rejected");
                false
            }
        })
        .take(top_n)
        .map(|(_, row)| R::from_fields(&row))
        .collect()
}
