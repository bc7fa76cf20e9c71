//! Composite Ranker — folds a score vector and a fragment's intrinsic
//! importance into one bounded ranking number.

use serde::{Deserialize, Serialize};

use crate::models::fragment::ContentFragment;
use crate::models::selection::{Dimension, ScoreVector};
use crate::scoring::weights::{DimensionWeights, ScoringProfile};

/// A dimension is reported alongside the top contributor when its weighted
/// contribution reaches this share of the top one.
const CO_DOMINANT_RATIO: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub weighted_relevance: f64,
    pub fragment_weight: f64,
    /// `weighted_relevance * fragment_weight`, uncapped.
    pub raw_score: f64,
    pub final_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CompositeRanker {
    profile: ScoringProfile,
}

impl CompositeRanker {
    pub fn new(profile: ScoringProfile) -> Self {
        Self { profile }
    }

    pub fn rank(&self, scores: &ScoreVector, fragment: &ContentFragment) -> CompositeScore {
        compute_composite(
            scores,
            fragment,
            self.profile.weights_for(fragment.scope),
        )
    }

    pub fn explain(&self, scores: &ScoreVector, fragment: &ContentFragment) -> String {
        dominant_reason(scores, self.profile.weights_for(fragment.scope))
    }
}

/// final_score = min(1, Σ(wᵢ·sᵢ) · base · recency · uniqueness · magnitude)
///
/// The importance product is not clamped; only the final value is capped.
pub fn compute_composite(
    scores: &ScoreVector,
    fragment: &ContentFragment,
    weights: &DimensionWeights,
) -> CompositeScore {
    let weighted_relevance = weights.apply(scores);
    let fragment_weight = fragment.importance_factors.product();
    let raw_score = weighted_relevance * fragment_weight;

    CompositeScore {
        weighted_relevance,
        fragment_weight,
        raw_score,
        final_score: raw_score.clamp(0.0, 1.0),
    }
}

/// Names the dimension(s) contributing most to the weighted relevance,
/// e.g. "keyword+skill match".
pub fn dominant_reason(scores: &ScoreVector, weights: &DimensionWeights) -> String {
    let mut contributions: Vec<(Dimension, f64)> = Dimension::ALL
        .iter()
        .map(|d| (*d, weights.get(*d) * scores.get(*d)))
        .collect();
    // Stable sort keeps declaration order among equal contributions.
    contributions.sort_by(|a, b| b.1.total_cmp(&a.1));

    let top = contributions[0].1;
    if top <= 0.0 {
        return "no matching signals".to_string();
    }

    let labels: Vec<&str> = contributions
        .iter()
        .take_while(|(_, c)| *c >= top * CO_DOMINANT_RATIO)
        .take(2)
        .map(|(d, _)| d.label())
        .collect();

    format!("{} match", labels.join("+"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fragment::fixtures::fragment;
    use crate::models::fragment::{FragmentScope, ImportanceFactors, IMPORTANCE_MAX, IMPORTANCE_MIN};
    use proptest::prelude::*;

    fn vector(keyword: f64, skill: f64, impact: f64) -> ScoreVector {
        ScoreVector {
            keyword,
            skill,
            industry: 0.0,
            role: 0.0,
            complexity: 0.0,
            impact,
        }
    }

    #[test]
    fn test_unit_importance_keeps_weighted_relevance() {
        let f = fragment(FragmentScope::EmploymentBullet, &["rust"]);
        let c = compute_composite(&vector(1.0, 1.0, 0.0), &f, &DimensionWeights::default());
        assert!((c.weighted_relevance - 0.55).abs() < 1e-9);
        assert!((c.final_score - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_importance_above_one_amplifies() {
        let mut f = fragment(FragmentScope::EmploymentBullet, &["rust"]);
        f.importance_factors.base_weight = 1.5;
        let c = compute_composite(&vector(1.0, 0.0, 0.0), &f, &DimensionWeights::default());
        assert!((c.final_score - 0.45).abs() < 1e-9, "got {}", c.final_score);
    }

    #[test]
    fn test_no_intermediate_clamp_on_fragment_weight() {
        let mut f = fragment(FragmentScope::EmploymentBullet, &["rust"]);
        f.importance_factors.base_weight = 2.0;
        f.importance_factors.magnitude = 2.0;
        let c = compute_composite(&vector(0.5, 0.0, 0.0), &f, &DimensionWeights::default());
        assert!((c.fragment_weight - 4.0).abs() < 1e-9);
        assert!((c.raw_score - 0.6).abs() < 1e-9);
        assert!((c.final_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_final_score_capped_at_one() {
        let mut f = fragment(FragmentScope::EmploymentBullet, &["rust"]);
        f.importance_factors.base_weight = 2.0;
        f.importance_factors.recency_weight = 2.0;
        let c = compute_composite(&ScoreVector::neutral(), &f, &DimensionWeights::default());
        assert!((c.raw_score - 2.0).abs() < 1e-9);
        assert_eq!(c.final_score, 1.0);
    }

    #[test]
    fn test_reason_names_top_two_dimensions() {
        let reason = dominant_reason(&vector(1.0, 1.0, 0.0), &DimensionWeights::default());
        assert_eq!(reason, "keyword+skill match");
    }

    #[test]
    fn test_reason_single_dominant_dimension() {
        let reason = dominant_reason(&vector(1.0, 0.1, 0.0), &DimensionWeights::default());
        assert_eq!(reason, "keyword match");
    }

    #[test]
    fn test_reason_with_no_signal() {
        let reason = dominant_reason(&vector(0.0, 0.0, 0.0), &DimensionWeights::default());
        assert_eq!(reason, "no matching signals");
    }

    fn arb_factor() -> impl Strategy<Value = f64> {
        IMPORTANCE_MIN..=IMPORTANCE_MAX
    }

    fn arb_vector() -> impl Strategy<Value = ScoreVector> {
        (
            0.0..=1.0f64,
            0.0..=1.0f64,
            0.0..=1.0f64,
            0.0..=1.0f64,
            0.0..=1.0f64,
            0.0..=1.0f64,
        )
            .prop_map(|(keyword, skill, industry, role, complexity, impact)| ScoreVector {
                keyword,
                skill,
                industry,
                role,
                complexity,
                impact,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_final_score_is_capped_raw_score(
            scores in arb_vector(),
            base in arb_factor(),
            recency in arb_factor(),
            uniqueness in arb_factor(),
            magnitude in arb_factor(),
        ) {
            let mut f = fragment(FragmentScope::EmploymentBullet, &["rust"]);
            f.importance_factors = ImportanceFactors {
                base_weight: base,
                recency_weight: recency,
                uniqueness_score: uniqueness,
                magnitude,
            };
            let c = compute_composite(&scores, &f, &DimensionWeights::default());
            prop_assert!((0.0..=1.0).contains(&c.final_score), "got {}", c.final_score);
            prop_assert_eq!(c.final_score.to_bits(), c.raw_score.min(1.0).to_bits());
        }
    }
}
