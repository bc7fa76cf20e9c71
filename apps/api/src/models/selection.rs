use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::fragment::{ContentFragment, FragmentScope, SectionKind, SkipReason};
use crate::selection::coverage::CoverageReport;

// ────────────────────────────────────────────────────────────────────────────
// Score vector
// ────────────────────────────────────────────────────────────────────────────

/// One of the six independent relevance dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Keyword,
    Skill,
    Industry,
    Role,
    Complexity,
    Impact,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Keyword,
        Dimension::Skill,
        Dimension::Industry,
        Dimension::Role,
        Dimension::Complexity,
        Dimension::Impact,
    ];

    /// Short label used in explainability reasons.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Keyword => "keyword",
            Dimension::Skill => "skill",
            Dimension::Industry => "industry",
            Dimension::Role => "role",
            Dimension::Complexity => "seniority",
            Dimension::Impact => "impact",
        }
    }
}

/// Neutral score for a dimension with no input data.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Per-fragment, per-job result of the scorer. Every dimension lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub keyword: f64,
    pub skill: f64,
    pub industry: f64,
    pub role: f64,
    pub complexity: f64,
    pub impact: f64,
}

impl ScoreVector {
    pub fn neutral() -> Self {
        Self {
            keyword: NEUTRAL_SCORE,
            skill: NEUTRAL_SCORE,
            industry: NEUTRAL_SCORE,
            role: NEUTRAL_SCORE,
            complexity: NEUTRAL_SCORE,
            impact: NEUTRAL_SCORE,
        }
    }

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
}

// ────────────────────────────────────────────────────────────────────────────
// Scope identity and inclusion
// ────────────────────────────────────────────────────────────────────────────

/// Identifies a selection scope: a section-level group of parentless
/// fragments, or a specific parent entity (a role, a highlight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScopeKey {
    Section { section: SectionKind },
    Entity { id: Uuid },
}

/// Which rule decided a scope's inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionSource {
    SectionDefault,
    SectionOverride,
    EntityDefault,
    EntityOverride,
    ParentFragment,
    FragmentDefault,
    FragmentOverride,
}

/// Why a scored fragment was left out despite its scope being included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    BudgetExhausted { max_items: i64 },
}

// ────────────────────────────────────────────────────────────────────────────
// Output records
// ────────────────────────────────────────────────────────────────────────────

/// One ranked fragment within a scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub fragment_id: Uuid,
    pub scope: FragmentScope,
    /// 1-based, strictly increasing within the scope.
    pub rank: usize,
    pub final_score: f64,
    /// `weighted_relevance * fragment_weight` before the final cap.
    pub raw_score: f64,
    pub included: bool,
    /// Dominant contributing dimensions, e.g. "keyword+skill match".
    pub reason: String,
    pub exclusion: Option<ExclusionReason>,
    pub scores: ScoreVector,
}

/// Synthetic fragment proposed to close keyword gaps. Never included by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub fragment: ContentFragment,
    pub final_score: f64,
    pub included: bool,
    pub introduced_keywords: Vec<String>,
}

/// Ranked output for one included scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSelection {
    pub scope: ScopeKey,
    pub section: SectionKind,
    pub max_items: i64,
    pub inclusion: InclusionSource,
    pub entries: Vec<SelectionEntry>,
    pub suggestions: Vec<Suggestion>,
    /// Set when the scope is shown structurally but contributes nothing.
    pub note: Option<String>,
}

impl ScopeSelection {
    pub fn included(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter().filter(|e| e.included)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFragment {
    pub fragment_id: Uuid,
    pub reason: SkipReason,
}

/// A fragment withheld because its section or parent entity is excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatedFragment {
    pub fragment_id: Uuid,
    pub scope: ScopeKey,
    pub source: InclusionSource,
}

/// Output of the selection engine for one (profile, job) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub scopes: Vec<ScopeSelection>,
    pub skipped: Vec<SkippedFragment>,
    pub gated: Vec<GatedFragment>,
    /// True when the job context carried no usable data.
    pub low_confidence: bool,
    pub coverage: CoverageReport,
}

impl SelectionResult {
    #[cfg(test)]
    pub fn entries(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.scopes.iter().flat_map(|s| s.entries.iter())
    }

    pub fn included_ids(&self) -> Vec<Uuid> {
        self.scopes
            .iter()
            .flat_map(ScopeSelection::included)
            .map(|e| e.fragment_id)
            .collect()
    }

    #[cfg(test)]
    pub fn scope(&self, key: &ScopeKey) -> Option<&ScopeSelection> {
        self.scopes.iter().find(|s| &s.scope == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_vector_is_half_everywhere() {
        let v = ScoreVector::neutral();
        for dim in Dimension::ALL {
            assert_eq!(v.get(dim), NEUTRAL_SCORE);
        }
    }

    #[test]
    fn test_scope_key_serializes_tagged() {
        let key = ScopeKey::Section {
            section: SectionKind::Skills,
        };
        let json = serde_json::to_value(key).unwrap();
        assert_eq!(json["kind"], "section");
        assert_eq!(json["section"], "skills");
    }
}
