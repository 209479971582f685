//! Edge ranking.
//!
//! Turns raw offers into priced offers, computes each offer's edge versus
//! the cross-book consensus, keeps the best offer per proposition, and
//! filters the survivors into standalone singles and a parlay candidate
//! pool.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, warn};

use super::odds;
use crate::config::SelectionConfig;
use crate::types::{Offer, PricedOffer, PropKey};

// ---------------------------------------------------------------------------
// Configuration (defaults, overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

/// Thresholds and caps for singles and the parlay candidate pool.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeConfig {
    /// Minimum edge (percentage points) for a standalone single.
    pub singles_min_edge: f64,
    /// Lowest acceptable single price (most negative favourite).
    pub band_min: f64,
    /// Highest acceptable single price (longest underdog).
    pub band_max: f64,
    /// Maximum number of singles reported.
    pub singles_limit: usize,
    /// Minimum edge for a best offer to enter the parlay pool.
    pub pool_min_edge: f64,
    /// Maximum parlay pool size.
    pub pool_limit: usize,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self::from(&SelectionConfig::default())
    }
}

impl From<&SelectionConfig> for EdgeConfig {
    fn from(cfg: &SelectionConfig) -> Self {
        Self {
            singles_min_edge: cfg.singles_min_edge,
            band_min: cfg.band_min,
            band_max: cfg.band_max,
            singles_limit: cfg.singles_limit,
            pool_min_edge: cfg.pool_min_edge,
            pool_limit: cfg.pool_limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering helpers
// ---------------------------------------------------------------------------

/// Descending order on an optional edge: larger first, undefined last.
pub fn cmp_edge_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by edge, best first. Ties keep their current order.
pub fn sort_by_edge_desc(offers: &mut [PricedOffer]) {
    offers.sort_by(|a, b| cmp_edge_desc(a.ev_pct, b.ev_pct));
}

// ---------------------------------------------------------------------------
// Edge computation
// ---------------------------------------------------------------------------

/// Edge in percentage points. Undefined if either side is undefined.
pub fn edge_pct(fair_prob: Option<f64>, book_prob: Option<f64>) -> Option<f64> {
    Some((fair_prob? - book_prob?) * 100.0)
}

/// Fill `ev_pct` for offers that already carry `fair_prob`.
pub fn attach_edges(offers: &mut [PricedOffer]) {
    for o in offers.iter_mut() {
        o.ev_pct = edge_pct(o.fair_prob, o.book_prob);
    }
}

/// Keep exactly one offer per proposition: the one with the largest edge.
///
/// Ties go to the earliest offer in input order, and an undefined edge only
/// wins when every offer in the group is undefined. Output follows the order
/// in which each proposition first appears.
pub fn best_offers(offers: &[PricedOffer]) -> Vec<PricedOffer> {
    let mut slot: HashMap<PropKey, usize> = HashMap::new();
    let mut best: Vec<PricedOffer> = Vec::new();

    for o in offers {
        let key = o.offer.prop_key();
        match slot.get(&key) {
            None => {
                slot.insert(key, best.len());
                best.push(o.clone());
            }
            Some(&i) => {
                if cmp_edge_desc(o.ev_pct, best[i].ev_pct) == Ordering::Less {
                    best[i] = o.clone();
                }
            }
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Ranker
// ---------------------------------------------------------------------------

/// Prices offers and applies the singles / pool filters.
pub struct EdgeRanker {
    config: EdgeConfig,
}

impl EdgeRanker {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    /// Access the edge configuration.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Attach implied probability and band membership to raw offers.
    pub fn price(&self, offers: Vec<Offer>) -> Vec<PricedOffer> {
        let mut unparsable = 0usize;
        let priced: Vec<PricedOffer> = offers
            .into_iter()
            .map(|offer| {
                let book_prob = odds::implied_probability(&offer.price);
                if book_prob.is_none() {
                    unparsable += 1;
                    debug!(player = %offer.player, book = %offer.book, price = %offer.price, "Unparsable price");
                }
                let in_band = odds::in_band(&offer.price, self.config.band_min, self.config.band_max);
                PricedOffer {
                    offer,
                    book_prob,
                    fair_prob: None,
                    ev_pct: None,
                    in_band,
                }
            })
            .collect();

        if unparsable > 0 {
            warn!(count = unparsable, "Offers with unparsable prices treated as undefined");
        }
        priced
    }

    /// Best offers that clear the singles edge threshold and price band,
    /// best first, capped at `singles_limit`.
    pub fn singles(&self, best: &[PricedOffer]) -> Vec<PricedOffer> {
        let mut singles: Vec<PricedOffer> = best
            .iter()
            .filter(|o| o.in_band && o.ev_pct.is_some_and(|e| e >= self.config.singles_min_edge))
            .cloned()
            .collect();
        sort_by_edge_desc(&mut singles);
        singles.truncate(self.config.singles_limit);
        singles
    }

    /// Best offers that clear the pool edge threshold, best first, capped
    /// at `pool_limit`. No price band applies here.
    pub fn candidate_pool(&self, best: &[PricedOffer]) -> Vec<PricedOffer> {
        let mut pool: Vec<PricedOffer> = best
            .iter()
            .filter(|o| o.ev_pct.is_some_and(|e| e >= self.config.pool_min_edge))
            .cloned()
            .collect();
        sort_by_edge_desc(&mut pool);
        pool.truncate(self.config.pool_limit);
        pool
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
