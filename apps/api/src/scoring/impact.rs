//! Impact evidence classification — decides which impact band a fragment falls in.

use serde::{Deserialize, Serialize};

use crate::models::fragment::ContentFragment;

/// Coarse classification of a fragment's impact evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactBand {
    /// At least one numeric metric. Carries the metric count.
    Quantified(usize),
    /// Impact described in prose only.
    Narrative,
    None,
}

const HIGH_BAND_FLOOR: f64 = 0.85;
const HIGH_BAND_STEP: f64 = 0.05;
const MID_BAND: f64 = 0.55;
const LOW_BAND: f64 = 0.2;

impl ImpactBand {
    /// Monotonic in evidence strength: none < narrative < 1 metric < 2 metrics ...
    pub fn score(self) -> f64 {
        match self {
            ImpactBand::Quantified(n) => {
                let extra = n.saturating_sub(1).min(3) as f64;
                (HIGH_BAND_FLOOR + HIGH_BAND_STEP * extra).min(1.0)
            }
            ImpactBand::Narrative => MID_BAND,
            ImpactBand::None => LOW_BAND,
        }
    }
}

/// Classifies a fragment. Structured metrics win; otherwise a quantified
/// outcome in the text counts as one metric.
pub fn classify(fragment: &ContentFragment) -> ImpactBand {
    let metrics = fragment
        .impact
        .as_ref()
        .map(|i| i.metrics.iter().filter(|m| m.value.is_finite()).count())
        .unwrap_or(0);
    if metrics > 0 {
        return ImpactBand::Quantified(metrics);
    }

    if is_quantified(&fragment.text) {
        return ImpactBand::Quantified(1);
    }

    let has_narrative = fragment
        .impact
        .as_ref()
        .and_then(|i| i.narrative.as_deref())
        .map(|n| !n.trim().is_empty())
        .unwrap_or(false);
    if has_narrative {
        ImpactBand::Narrative
    } else {
        ImpactBand::None
    }
}

/// Detects a quantified outcome in free text.
///
/// Counts as quantified:
/// - any digit (counts, years, sizes)
/// - `%`, `$`, `€`, `£`
/// - `~N` estimates and `Nx` multipliers (both already contain a digit)
pub fn is_quantified(text: &str) -> bool {
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let has_percent = text.contains('%');
    let has_currency = text.contains('$') || text.contains('€') || text.contains('£');

    has_digit || has_percent || has_currency
}
