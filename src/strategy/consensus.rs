//! Cross-book consensus ("fair") probabilities.
//!
//! Offers are grouped by proposition key and the median of their implied
//! probabilities becomes the fair estimate for that proposition. The median
//! shrugs off a single stale or outlying book, which is why it is used
//! instead of the mean.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{PricedOffer, PropKey};

/// Median of the defined values; `None` when nothing is defined.
pub fn median(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let mut defined: Vec<f64> = values.into_iter().flatten().collect();
    if defined.is_empty() {
        return None;
    }
    defined.sort_by(f64::total_cmp);
    let mid = defined.len() / 2;
    if defined.len() % 2 == 0 {
        Some((defined[mid - 1] + defined[mid]) / 2.0)
    } else {
        Some(defined[mid])
    }
}

/// Fair probability per proposition key.
///
/// Keys whose offers all have undefined implied probabilities are absent
/// from the map.
pub fn fair_probabilities(offers: &[PricedOffer]) -> HashMap<PropKey, f64> {
    let mut groups: HashMap<PropKey, Vec<Option<f64>>> = HashMap::new();
    for o in offers {
        groups.entry(o.offer.prop_key()).or_default().push(o.book_prob);
    }

    let mut fair = HashMap::with_capacity(groups.len());
    for (key, probs) in groups {
        match median(probs) {
            Some(p) => {
                fair.insert(key, p);
            }
            None => {
                debug!(
                    player = %key.player,
                    market = %key.market,
                    line = %key.line,
                    "No computable consensus for proposition"
                );
            }
        }
    }
    fair
}

/// Annotate every offer with its proposition's fair probability
/// (left join: offers without a consensus keep `fair_prob = None`).
pub fn attach_fair(offers: &mut [PricedOffer]) -> usize {
    let fair = fair_probabilities(offers);
    for o in offers.iter_mut() {
        o.fair_prob = fair.get(&o.offer.prop_key()).copied();
    }
    fair.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
