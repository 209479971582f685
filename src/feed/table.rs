//! CSV table parsing.
//!
//! Parses the feed text into header + rows of optional cells, enforces the
//! row limit and the required schema, fingerprints the loaded rows, and
//! extracts valid `Offer`s.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::types::{Line, Offer, PropEdgeError};

/// Columns every feed must carry.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "game_id",
    "week",
    "player",
    "team",
    "market",
    "selection",
    "line",
    "price",
    "book",
    "kickoff_utc",
];

/// Cell spellings read as missing values.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Hex characters kept from the SHA-256 digest.
const FINGERPRINT_LEN: usize = 16;

/// A parsed CSV table. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Column positions of the required fields.
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndex {
    game_id: usize,
    week: usize,
    player: usize,
    team: usize,
    market: usize,
    selection: usize,
    line: usize,
    price: usize,
    book: usize,
    kickoff_utc: usize,
}

fn cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl FeedTable {
    /// Parse CSV text with a header row. Rows shorter than the header are
    /// padded with missing cells; longer rows are an error.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err("No columns to parse from file".to_string());
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| e.to_string())?;
            if record.len() > headers.len() {
                return Err(format!(
                    "Error tokenizing data: expected {} fields in line {}, saw {}",
                    headers.len(),
                    i + 2,
                    record.len()
                ));
            }
            let mut row: Vec<Option<String>> = record.iter().map(cell).collect();
            row.resize(headers.len(), None);
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only the first `cap` rows (no-op when `None`).
    pub fn truncate(&mut self, cap: Option<usize>) {
        if let Some(n) = cap {
            self.rows.truncate(n);
        }
    }

    /// Locate every required column, or report which are missing along with
    /// the header actually seen.
    pub fn check_schema(&self) -> Result<ColumnIndex, PropEdgeError> {
        let position: HashMap<&str, usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .rev()
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !position.contains_key(*c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PropEdgeError::Schema {
                missing,
                present: self.headers.clone(),
            });
        }

        let at = |name: &str| position[name];
        Ok(ColumnIndex {
            game_id: at("game_id"),
            week: at("week"),
            player: at("player"),
            team: at("team"),
            market: at("market"),
            selection: at("selection"),
            line: at("line"),
            price: at("price"),
            book: at("book"),
            kickoff_utc: at("kickoff_utc"),
        })
    }

    /// Short SHA-256 fingerprint of the header and loaded rows.
    ///
    /// Cells are joined with the ASCII unit separator and rows with the
    /// record separator; missing cells hash as empty.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.headers.join("\u{1f}").as_bytes());
        for row in &self.rows {
            hasher.update(b"\x1e");
            let joined: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
            hasher.update(joined.join("\u{1f}").as_bytes());
        }
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(FINGERPRINT_LEN);
        digest
    }

    /// Extract valid offers. Rows missing player, market, selection, price
    /// or book are dropped.
    pub fn offers(&self, idx: &ColumnIndex) -> Vec<Offer> {
        let mut dropped = 0usize;
        let mut offers = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            let get = |i: usize| row[i].clone();
            let (Some(player), Some(market), Some(selection), Some(price), Some(book)) = (
                get(idx.player),
                get(idx.market),
                get(idx.selection),
                get(idx.price),
                get(idx.book),
            ) else {
                dropped += 1;
                continue;
            };

            offers.push(Offer {
                game_id: get(idx.game_id),
                week: get(idx.week),
                player,
                team: get(idx.team),
                market,
                selection,
                line: Line::parse(row[idx.line].as_deref()),
                price,
                book: book.to_uppercase(),
                kickoff_utc: get(idx.kickoff_utc),
            });
        }

        if dropped > 0 {
            debug!(dropped, kept = offers.len(), "Rows missing required fields dropped");
        }
        offers
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
