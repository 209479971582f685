//! Parlay construction.
//!
//! Greedy first-fit over the edge-sorted candidate pool: take each offer in
//! order unless its game already has a leg, stop at the target leg count.
//! This keeps legs from different games but is deliberately not an optimal
//! subset search; the same pool always produces the same parlay.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info};

use super::odds;
use crate::types::{Parlay, PricedOffer};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// One parlay to build: `legs` legs scanned from the pool after skipping
/// its first `skip` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ParlayPlan {
    pub legs: usize,
    #[serde(default)]
    pub skip: usize,
}

/// Default plans: a 3-leg parlay from the whole pool, then a 4-leg
/// parlay from the pool past its top three entries.
pub fn default_plans() -> Vec<ParlayPlan> {
    vec![
        ParlayPlan { legs: 3, skip: 0 },
        ParlayPlan { legs: 4, skip: 3 },
    ]
}

// ---------------------------------------------------------------------------
// Leg selection and pricing
// ---------------------------------------------------------------------------

/// Scan `pool` in order and keep offers whose game is not yet used, up to
/// `legs` offers.
pub fn select_legs(pool: &[PricedOffer], legs: usize) -> Vec<PricedOffer> {
    let mut chosen: Vec<PricedOffer> = Vec::with_capacity(legs);
    let mut seen: HashSet<Option<&str>> = HashSet::new();

    for candidate in pool {
        if chosen.len() >= legs {
            break;
        }
        let game = candidate.offer.game_key();
        if !seen.insert(game) {
            debug!(
                player = %candidate.offer.player,
                game = game.unwrap_or("-"),
                "Skipping leg from a game already in the parlay"
            );
            continue;
        }
        chosen.push(candidate.clone());
    }

    chosen
}

/// Combined win probability: product of the legs' own book probabilities.
/// Undefined for an empty leg set or when any leg is unpriced.
pub fn combined_probability(legs: &[PricedOffer]) -> Option<f64> {
    if legs.is_empty() {
        return None;
    }
    legs.iter().map(|l| l.book_prob).product()
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds every configured parlay from a candidate pool.
pub struct ParlayBuilder {
    plans: Vec<ParlayPlan>,
}

impl ParlayBuilder {
    pub fn new(plans: Vec<ParlayPlan>) -> Self {
        Self { plans }
    }

    /// Build a single parlay for one plan. Returns the parlay even when it
    /// is short or empty.
    pub fn build(pool: &[PricedOffer], plan: ParlayPlan) -> Parlay {
        let scanned = pool.get(plan.skip..).unwrap_or(&[]);
        let legs = select_legs(scanned, plan.legs);
        let win_prob = combined_probability(&legs);
        let american_odds = win_prob.and_then(odds::prob_to_american);

        Parlay {
            target_legs: plan.legs,
            skip: plan.skip,
            legs,
            win_prob,
            american_odds,
        }
    }

    /// Build all plans, dropping those that came out empty.
    pub fn build_all(&self, pool: &[PricedOffer]) -> Vec<Parlay> {
        let mut parlays = Vec::new();
        for &plan in &self.plans {
            let parlay = Self::build(pool, plan);
            if parlay.legs.is_empty() {
                debug!(legs = plan.legs, skip = plan.skip, "Parlay empty, not reported");
                continue;
            }
            info!(
                legs = parlay.legs.len(),
                target = plan.legs,
                win_prob = ?parlay.win_prob.map(|p| format!("{:.1}%", p * 100.0)),
                price = ?parlay.american_odds.map(odds::format_signed),
                "Parlay built"
            );
            parlays.push(parlay);
        }
        parlays
    }
}

impl Default for ParlayBuilder {
    fn default() -> Self {
        Self::new(default_plans())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Line, Offer};

    fn make_leg(player: &str, game: Option<&str>, ev: f64, book_prob: f64) -> PricedOffer {
        PricedOffer {
            offer: Offer {
                game_id: game.map(str::to_string),
                week: Some("9".into()),
                player: player.into(),
                team: None,
                market: "anytime_td".into(),
                selection: "Yes".into(),
                line: Line::Missing,
                price: "+150".into(),
                book: "BOOKA".into(),
                kickoff_utc: None,
            },
            book_prob: Some(book_prob),
            fair_prob: Some(book_prob + ev / 100.0),
            ev_pct: Some(ev),
            in_band: true,
        }
    }

    fn players(legs: &[PricedOffer]) -> Vec<&str> {
        legs.iter().map(|l| l.offer.player.as_str()).collect()
    }

    #[test]
    fn test_select_legs_skips_same_game() {
        let pool = vec![
            make_leg("A", Some("g1"), 9.0, 0.5),
            make_leg("B", Some("g1"), 8.0, 0.5),
            make_leg("C", Some("g2"), 7.0, 0.5),
            make_leg("D", Some("g3"), 6.0, 0.5),
            make_leg("E", Some("g4"), 5.0, 0.5),
        ];
        let legs = select_legs(&pool, 3);
        assert_eq!(players(&legs), vec!["A", "C", "D"]);
    }

    #[test]
    fn test_select_legs_never_repeats_a_game() {
        let pool: Vec<_> = (0..12)
            .map(|i| make_leg(&format!("P{i}"), Some(["g1", "g2", "g3"][i % 3]), 10.0 - i as f64, 0.5))
            .collect();
        let legs = select_legs(&pool, 5);
        assert_eq!(legs.len(), 3);
        let games: HashSet<_> = legs.iter().map(|l| l.offer.game_key()).collect();
        assert_eq!(games.len(), legs.len());
    }

    #[test]
    fn test_missing_game_ids_share_one_key() {
        let pool = vec![
            make_leg("A", None, 9.0, 0.5),
            make_leg("B", None, 8.0, 0.5),
            make_leg("C", Some("g2"), 7.0, 0.5),
        ];
        assert_eq!(players(&select_legs(&pool, 3)), vec!["A", "C"]);
    }

    #[test]
    fn test_first_fit_keeps_scan_order() {
        // B is skipped because A already holds g1; C fills the second slot.
        let pool = vec![
            make_leg("A", Some("g1"), 5.0, 0.5),
            make_leg("B", Some("g1"), 4.9, 0.5),
            make_leg("C", Some("g2"), 0.1, 0.5),
        ];
        assert_eq!(players(&select_legs(&pool, 2)), vec!["A", "C"]);
    }

    #[test]
    fn test_combined_probability_is_product_of_book_probs() {
        let legs = vec![
            make_leg("A", Some("g1"), 3.0, 0.5),
            make_leg("B", Some("g2"), 3.0, 0.4),
            make_leg("C", Some("g3"), 3.0, 0.6),
        ];
        let p = combined_probability(&legs).unwrap();
        assert!((p - 0.12).abs() < 1e-12);
    }

    #[test]
    fn test_combined_probability_empty_is_undefined() {
        assert!(combined_probability(&[]).is_none());
    }

    #[test]
    fn test_build_prices_parlay() {
        let pool = vec![
            make_leg("A", Some("g1"), 9.0, 0.5),
            make_leg("B", Some("g2"), 8.0, 0.5),
            make_leg("C", Some("g3"), 7.0, 0.5),
        ];
        let parlay = ParlayBuilder::build(&pool, ParlayPlan { legs: 3, skip: 0 });
        assert_eq!(parlay.legs.len(), 3);
        assert!((parlay.win_prob.unwrap() - 0.125).abs() < 1e-12);
        assert_eq!(parlay.american_odds, Some(700));
        assert!(!parlay.is_short());

        // Round trip: price back to probability
        let back = odds::american_to_prob(parlay.american_odds.unwrap() as f64);
        assert!((back - parlay.win_prob.unwrap()).abs() < 1e-3);
    }

    #[test]
    fn test_build_with_skip_past_pool_is_empty() {
        let pool = vec![make_leg("A", Some("g1"), 9.0, 0.5)];
        let parlay = ParlayBuilder::build(&pool, ParlayPlan { legs: 4, skip: 3 });
        assert!(parlay.legs.is_empty());
        assert!(parlay.win_prob.is_none());
        assert!(parlay.american_odds.is_none());
    }

    #[test]
    fn test_build_all_default_plans() {
        let pool: Vec<_> = (0..10)
            .map(|i| make_leg(&format!("P{i}"), Some(format!("g{i}").as_str()), 10.0 - i as f64, 0.55))
            .collect();
        let parlays = ParlayBuilder::default().build_all(&pool);
        assert_eq!(parlays.len(), 2);
        assert_eq!(players(&parlays[0].legs), vec!["P0", "P1", "P2"]);
        assert_eq!(players(&parlays[1].legs), vec!["P3", "P4", "P5", "P6"]);
    }

    #[test]
    fn test_build_all_keeps_short_drops_empty() {
        let pool = vec![
            make_leg("A", Some("g1"), 9.0, 0.5),
            make_leg("B", Some("g2"), 8.0, 0.5),
        ];
        let parlays = ParlayBuilder::default().build_all(&pool);
        assert_eq!(parlays.len(), 1);
        assert!(parlays[0].is_short());
        assert_eq!(parlays[0].legs.len(), 2);
    }

    #[test]
    fn test_build_all_empty_pool() {
        assert!(ParlayBuilder::default().build_all(&[]).is_empty());
    }
}
