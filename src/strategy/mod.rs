//! Strategy engine: odds conversion, consensus, edge ranking and parlays.

pub mod consensus;
pub mod edge;
pub mod odds;
pub mod parlay;

use tracing::{debug, info};

use crate::types::{Offer, Selection};
use edge::EdgeRanker;
use parlay::ParlayBuilder;

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Pipelines pricing → consensus → edge → best offer → singles / parlays.
///
/// Stateless between runs: every call recomputes everything from the
/// offers it is given.
pub struct EdgePipeline {
    ranker: EdgeRanker,
    parlays: ParlayBuilder,
}

impl EdgePipeline {
    pub fn new(ranker: EdgeRanker, parlays: ParlayBuilder) -> Self {
        Self { ranker, parlays }
    }

    /// Access the edge ranker (and through it the thresholds in use).
    pub fn ranker(&self) -> &EdgeRanker {
        &self.ranker
    }

    /// Run the full pipeline over one snapshot of valid offers.
    ///
    /// Steps:
    /// 1. Implied probability and band membership per offer.
    /// 2. Median consensus per proposition, joined back onto every offer.
    /// 3. Edge = fair − book, in percentage points.
    /// 4. Best offer per proposition.
    /// 5. Singles (band + edge threshold) and the parlay candidate pool.
    /// 6. Greedy no-same-game parlays from the pool.
    pub fn run(&self, offers: Vec<Offer>) -> Selection {
        let offers_in = offers.len();

        let mut priced = self.ranker.price(offers);
        let with_consensus = consensus::attach_fair(&mut priced);
        edge::attach_edges(&mut priced);
        debug!(
            offers = offers_in,
            propositions_with_consensus = with_consensus,
            "Consensus and edges attached"
        );

        let best = edge::best_offers(&priced);
        let positive = best
            .iter()
            .filter(|o| o.ev_pct.is_some_and(|e| e > 0.0))
            .count();
        info!(
            offers_in,
            propositions = best.len(),
            positive_edge = positive,
            "Edge ranking complete"
        );

        let singles = self.ranker.singles(&best);
        let pool = self.ranker.candidate_pool(&best);
        let parlays = self.parlays.build_all(&pool);

        info!(
            singles = singles.len(),
            pool = pool.len(),
            parlays = parlays.len(),
            "Selection complete"
        );

        Selection {
            propositions: best.len(),
            pool_size: pool.len(),
            singles,
            parlays,
        }
    }
}

impl Default for EdgePipeline {
    fn default() -> Self {
        Self::new(EdgeRanker::new(edge::EdgeConfig::default()), ParlayBuilder::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Line;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    // ---- helpers -----------------------------------------------------------

    fn make_offer(game: &str, player: &str, book: &str, price: &str) -> Offer {
        Offer {
            game_id: Some(game.into()),
            week: Some("8".into()),
            player: player.into(),
            team: Some("PHI".into()),
            market: "rec_yds".into(),
            selection: "Over".into(),
            line: Line::Number(dec!(55.5)),
            price: price.into(),
            book: book.into(),
            kickoff_utc: Some("2025-10-26T17:00:00Z".into()),
        }
    }

    /// Three books on one proposition: the +105 side carries ≈2.44pp edge.
    fn three_books(game: &str, player: &str) -> Vec<Offer> {
        vec![
            make_offer(game, player, "BOOKA", "-120"),
            make_offer(game, player, "BOOKB", "-105"),
            make_offer(game, player, "BOOKC", "+105"),
        ]
    }

    // ---- tests -------------------------------------------------------------

    #[test]
    fn test_empty_input_yields_nothing() {
        let selection = EdgePipeline::default().run(Vec::new());
        assert_eq!(selection.propositions, 0);
        assert!(selection.singles.is_empty());
        assert!(selection.parlays.is_empty());
        assert_eq!(selection.pool_size, 0);
    }

    #[test]
    fn test_single_book_props_are_inert() {
        let offers = vec![
            make_offer("g1", "A", "BOOKA", "+150"),
            make_offer("g2", "B", "BOOKA", "-110"),
        ];
        let selection = EdgePipeline::default().run(offers);
        assert_eq!(selection.propositions, 2);
        assert!(selection.singles.is_empty());
        assert!(selection.parlays.is_empty());
    }

    #[test]
    fn test_three_books_become_single() {
        let selection = EdgePipeline::default().run(three_books("g1", "D. Smith"));
        assert_eq!(selection.singles.len(), 1);
        let single = &selection.singles[0];
        assert_eq!(single.offer.book, "BOOKC");
        assert!((single.ev_pct.unwrap() - 2.439).abs() < 1e-3);
        // One pooled offer is enough for a short 3-leg parlay
        assert_eq!(selection.parlays.len(), 1);
        assert_eq!(selection.parlays[0].legs.len(), 1);
    }

    #[test]
    fn test_parlays_use_distinct_games() {
        let mut offers = Vec::new();
        for (game, player) in [("g1", "A"), ("g1", "B"), ("g2", "C"), ("g3", "D"), ("g4", "E"), ("g5", "F")] {
            offers.extend(three_books(game, player));
        }
        let selection = EdgePipeline::default().run(offers);
        assert_eq!(selection.propositions, 6);
        assert_eq!(selection.pool_size, 6);
        for parlay in &selection.parlays {
            assert!(parlay.legs.len() <= parlay.target_legs);
            let games: HashSet<_> = parlay.legs.iter().map(|l| l.offer.game_key()).collect();
            assert_eq!(games.len(), parlay.legs.len());
            let product: f64 = parlay.legs.iter().map(|l| l.book_prob.unwrap()).product();
            assert!((parlay.win_prob.unwrap() - product).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unparsable_prices_do_not_abort() {
        let mut offers = three_books("g1", "A");
        offers.push(make_offer("g1", "A", "BOOKD", "suspended"));
        let selection = EdgePipeline::default().run(offers);
        assert_eq!(selection.propositions, 1);
        assert_eq!(selection.singles[0].offer.book, "BOOKC");
    }
}
