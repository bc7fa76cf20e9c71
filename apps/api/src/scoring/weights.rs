use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::fragment::FragmentScope;
use crate::models::selection::{Dimension, ScoreVector};

/// Allowed drift of a weight vector's sum from 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-dimension weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub keyword: f64,
    pub skill: f64,
    pub industry: f64,
    pub role: f64,
    pub complexity: f64,
    pub impact: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            keyword: 0.30,
            skill: 0.25,
            industry: 0.15,
            role: 0.15,
            complexity: 0.10,
            impact: 0.05,
        }
    }
}

impl DimensionWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Keyword => self.keyword,
            Dimension::Skill => self.skill,
            Dimension::Industry => self.industry,
            Dimension::Role => self.role,
            Dimension::Complexity => self.complexity,
            Dimension::Impact => self.impact,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    /// Dot product with a score vector.
    pub fn apply(&self, scores: &ScoreVector) -> f64 {
        Dimension::ALL
            .iter()
            .map(|d| self.get(*d) * scores.get(*d))
            .sum()
    }

    /// Rejects negative, non-finite, or >1 components and sums away from 1.0.
    pub fn validate(&self, label: &str) -> Result<(), EngineError> {
        for dim in Dimension::ALL {
            let w = self.get(dim);
            if !w.is_finite() || !(0.0..=1.0).contains(&w) {
                return Err(EngineError::InvalidWeights {
                    scope: label.to_string(),
                    detail: format!("{} weight {w} outside [0, 1]", dim.label()),
                });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::InvalidWeights {
                scope: label.to_string(),
                detail: format!("weights sum to {sum}, expected 1.0"),
            });
        }
        Ok(())
    }
}

/// Default weights plus per-scope overrides.
///
/// Only constructible through `ScoringProfile::new`, which validates every
/// vector, so a profile in hand is always well-formed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringProfile {
    default: DimensionWeights,
    overrides: BTreeMap<FragmentScope, DimensionWeights>,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            default: DimensionWeights::default(),
            overrides: BTreeMap::new(),
        }
    }
}

impl ScoringProfile {
    pub fn new(
        default: DimensionWeights,
        overrides: BTreeMap<FragmentScope, DimensionWeights>,
    ) -> Result<Self, EngineError> {
        default.validate("default")?;
        for (scope, weights) in &overrides {
            weights.validate(scope.as_str())?;
        }
        Ok(Self { default, overrides })
    }

    pub fn weights_for(&self, scope: FragmentScope) -> &DimensionWeights {
        self.overrides.get(&scope).unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!(DimensionWeights::default().validate("default").is_ok());
    }

    #[test]
    fn test_weights_off_by_a_tenth_are_rejected() {
        let w = DimensionWeights {
            keyword: 0.40,
            ..Default::default()
        };
        let err = w.validate("default").unwrap_err();
        assert!(err.to_string().contains("sum"), "{err}");
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let w = DimensionWeights {
            keyword: 0.40,
            impact: -0.05,
            ..Default::default()
        };
        assert!(w.validate("default").is_err());
    }

    #[test]
    fn test_nan_weight_is_rejected() {
        let w = DimensionWeights {
            impact: f64::NAN,
            ..Default::default()
        };
        assert!(w.validate("default").is_err());
    }

    #[test]
    fn test_profile_rejects_bad_override() {
        let overrides = BTreeMap::from([(
            FragmentScope::Skill,
            DimensionWeights {
                skill: 0.9,
                ..Default::default()
            },
        )]);
        let err = ScoringProfile::new(DimensionWeights::default(), overrides).unwrap_err();
        assert!(err.to_string().contains("skill"), "{err}");
    }

    #[test]
    fn test_profile_falls_back_to_default() {
        let skill_weights = DimensionWeights {
            keyword: 0.2,
            skill: 0.6,
            industry: 0.0,
            role: 0.0,
            complexity: 0.1,
            impact: 0.1,
        };
        let profile = ScoringProfile::new(
            DimensionWeights::default(),
            BTreeMap::from([(FragmentScope::Skill, skill_weights)]),
        )
        .unwrap();
        assert_eq!(profile.weights_for(FragmentScope::Skill), &skill_weights);
        assert_eq!(
            profile.weights_for(FragmentScope::EmploymentBullet),
            &DimensionWeights::default()
        );
    }

    #[test]
    fn test_apply_is_dot_product() {
        let scores = ScoreVector {
            keyword: 1.0,
            skill: 0.0,
            industry: 0.0,
            role: 0.0,
            complexity: 0.0,
            impact: 1.0,
        };
        let w = DimensionWeights::default();
        assert!((w.apply(&scores) - 0.35).abs() < 1e-9);
    }
}
