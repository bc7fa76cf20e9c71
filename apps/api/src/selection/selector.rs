//! Selector — orders the scored children of one scope and applies its budget.
//!
//! Algorithm:
//! 1. Sort descending by `final_score`
//! 2. Tie-break: `is_featured` (true first) → impact score (descending) →
//!    `display_order` (ascending) → fragment `id` (ascending)
//! 3. Assign 1-based ranks
//! 4. The first `max_items` entries are included; `max_items <= 0` includes none
//! 5. Record the dominant contributing dimension(s) as the reason

use std::cmp::Ordering;

use crate::models::fragment::ContentFragment;
use crate::models::selection::{ExclusionReason, ScoreVector, SelectionEntry};
use crate::scoring::composite::{CompositeRanker, CompositeScore};

/// A fragment with its score vector and composite, ready to be ranked.
#[derive(Debug, Clone)]
pub struct ScoredFragment<'a> {
    pub fragment: &'a ContentFragment,
    pub scores: ScoreVector,
    pub composite: CompositeScore,
}

/// Strict total order used for ranking. Equal only for the same fragment id.
pub fn compare_ranked(a: &ScoredFragment, b: &ScoredFragment) -> Ordering {
    b.composite
        .final_score
        .total_cmp(&a.composite.final_score)
        .then_with(|| b.fragment.is_featured.cmp(&a.fragment.is_featured))
        .then_with(|| b.scores.impact.total_cmp(&a.scores.impact))
        .then_with(|| a.fragment.display_order.cmp(&b.fragment.display_order))
        .then_with(|| a.fragment.id.cmp(&b.fragment.id))
}

/// Ranks one scope's candidates and marks the ones within budget as included.
pub fn select_scope(
    mut scored: Vec<ScoredFragment>,
    max_items: i64,
    ranker: &CompositeRanker,
) -> Vec<SelectionEntry> {
    scored.sort_by(compare_ranked);

    let budget = usize::try_from(max_items).unwrap_or(0);

    scored
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let included = i < budget;
            SelectionEntry {
                fragment_id: s.fragment.id,
                scope: s.fragment.scope,
                rank: i + 1,
                final_score: s.composite.final_score,
                raw_score: s.composite.raw_score,
                included,
                reason: ranker.explain(&s.scores, s.fragment),
                exclusion: (!included).then_some(ExclusionReason::BudgetExhausted { max_items }),
                scores: s.scores,
            }
        })
        .collect()
}
