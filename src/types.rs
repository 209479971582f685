//! Shared types for PROPEDGE.
//!
//! These types form the data model used across all modules.
//! Feed parsing produces `Offer`s, the strategy pipeline turns them into
//! `PricedOffer`s and `Parlay`s, and the report/storage layers consume
//! the resulting `Analysis`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Offer
// ---------------------------------------------------------------------------

/// One row of the feed: a single book's price on a single proposition.
///
/// Optional fields may be missing in the feed without invalidating the row.
/// `player`, `market`, `selection`, `price` and `book` are guaranteed
/// present (rows missing them are dropped at parse time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub game_id: Option<String>,
    pub week: Option<String>,
    pub player: String,
    pub team: Option<String>,
    pub market: String,
    /// Side of the proposition, e.g. "Over" / "Under".
    pub selection: String,
    pub line: Line,
    /// Raw price text as quoted in the feed (American odds convention).
    pub price: String,
    /// Book name, normalised to trimmed upper case.
    pub book: String,
    pub kickoff_utc: Option<String>,
}

impl Offer {
    /// Key identifying "the same bet" across books.
    pub fn prop_key(&self) -> PropKey {
        PropKey {
            player: self.player.clone(),
            team: self.team.clone(),
            market: self.market.clone(),
            selection: self.selection.clone(),
            line: self.line.clone(),
            kickoff_utc: self.kickoff_utc.clone(),
        }
    }

    /// Game grouping key used by the no-same-game parlay rule.
    /// Every offer without a game id shares the `None` key.
    pub fn game_key(&self) -> Option<&str> {
        self.game_id.as_deref()
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} @ {} ({})",
            self.player, self.market, self.selection, self.line, self.price, self.book,
        )
    }
}

/// Numeric line of a proposition (e.g. 24.5 receiving yards).
///
/// Numeric lines are stored normalised so `24.5` and `24.50` compare and
/// hash equal. Non-numeric text is kept verbatim, and a missing line is a
/// value of its own for grouping purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Line {
    Number(Decimal),
    Text(String),
    Missing,
}

impl Line {
    /// Parse a feed cell into a line.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Line::Missing,
            Some(s) => match s.parse::<Decimal>() {
                Ok(d) => Line::Number(d.normalize()),
                Err(_) => Line::Text(s.to_string()),
            },
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Number(d) => write!(f, "{d}"),
            Line::Text(s) => write!(f, "{s}"),
            Line::Missing => write!(f, "-"),
        }
    }
}

/// Proposition key: (player, team, market, selection, line, kickoff).
///
/// Missing team/kickoff values are kept as `None` and form their own group
/// rather than being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropKey {
    pub player: String,
    pub team: Option<String>,
    pub market: String,
    pub selection: String,
    pub line: Line,
    pub kickoff_utc: Option<String>,
}

// ---------------------------------------------------------------------------
// Priced offer
// ---------------------------------------------------------------------------

/// An offer annotated with the derived probability and edge fields.
///
/// `None` means undefined (unparsable price, or no computable consensus).
/// Undefined values never rank above a defined one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedOffer {
    pub offer: Offer,
    /// Implied probability of the book's own price.
    pub book_prob: Option<f64>,
    /// Cross-book consensus probability for the offer's proposition.
    pub fair_prob: Option<f64>,
    /// (fair_prob − book_prob) × 100, in percentage points.
    pub ev_pct: Option<f64>,
    /// Whether the price sits within the singles band.
    pub in_band: bool,
}

impl fmt::Display for PricedOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |v: Option<f64>| match v {
            Some(p) => format!("{:.1}%", p * 100.0),
            None => "-".to_string(),
        };
        let ev = match self.ev_pct {
            Some(e) => format!("{e:+.1}"),
            None => "-".to_string(),
        };
        write!(
            f,
            "{} | book={} fair={} ev={ev}",
            self.offer,
            pct(self.book_prob),
            pct(self.fair_prob),
        )
    }
}

// ---------------------------------------------------------------------------
// Parlay
// ---------------------------------------------------------------------------

/// A multi-leg combination drawn greedily from the candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parlay {
    /// Requested number of legs.
    pub target_legs: usize,
    /// Number of pool entries skipped before scanning.
    pub skip: usize,
    pub legs: Vec<PricedOffer>,
    /// Product of the legs' book probabilities.
    pub win_prob: Option<f64>,
    /// Equivalent single American price for `win_prob`.
    pub american_odds: Option<i64>,
}

impl Parlay {
    /// Whether the pool ran out before the target leg count was reached.
    pub fn is_short(&self) -> bool {
        self.legs.len() < self.target_legs
    }
}

impl fmt::Display for Parlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prob = self
            .win_prob
            .map(|p| format!("{:.1}%", p * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        let odds = self
            .american_odds
            .map(|o| if o >= 0 { format!("+{o}") } else { o.to_string() })
            .unwrap_or_else(|| "n/a".to_string());
        write!(
            f,
            "{}/{} legs | win={prob} | price={odds}",
            self.legs.len(),
            self.target_legs,
        )
    }
}

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

/// Facts about the loaded dataset, shown in the report header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSummary {
    /// Where the feed was read from (URL or path).
    pub locator: String,
    /// Data rows kept after the row limit.
    pub rows_loaded: usize,
    /// Rows that passed the required-field filter.
    pub rows_used: usize,
    /// Configured row limit (0 or negative = uncapped).
    pub row_limit: i64,
    /// Short SHA-256 of the loaded rows.
    pub fingerprint: String,
}

/// Output of the strategy pipeline for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Distinct propositions in the input.
    pub propositions: usize,
    /// Candidate pool size after threshold and cap.
    pub pool_size: usize,
    pub singles: Vec<PricedOffer>,
    /// Non-empty parlays in build order.
    pub parlays: Vec<Parlay>,
}

/// Complete result of a run: what was loaded and what was selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: FeedSummary,
    pub selection: Selection,
    pub generated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Fatal run errors. Each kind maps to its own process exit status.
#[derive(Debug, thiserror::Error)]
pub enum PropEdgeError {
    #[error("{0}")]
    Config(String),

    #[error("Could not read CSV from {locator}\n{message}")]
    Retrieval { locator: String, message: String },

    #[error(
        "Missing required columns: {}\nHeader seen: {}",
        .missing.join(", "),
        .present.join(", ")
    )]
    Schema {
        missing: Vec<String>,
        present: Vec<String>,
    },
}

impl PropEdgeError {
    /// Process exit status for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            PropEdgeError::Config(_) => 2,
            PropEdgeError::Retrieval { .. } => 3,
            PropEdgeError::Schema { .. } => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
