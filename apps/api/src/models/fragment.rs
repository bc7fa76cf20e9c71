use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lower and upper bounds for every importance factor.
pub const IMPORTANCE_MIN: f64 = 0.1;
pub const IMPORTANCE_MAX: f64 = 2.0;

/// The kind of content a fragment represents. Determines its resume section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentScope {
    Skill,
    EmploymentBullet,
    Highlight,
    HighlightComponent,
    EarlyCareerBullet,
    AdditionalExperienceBullet,
    CommunityAchievement,
    ExecutiveSummary,
}

impl FragmentScope {
    pub fn section(self) -> SectionKind {
        match self {
            FragmentScope::Skill => SectionKind::Skills,
            FragmentScope::EmploymentBullet => SectionKind::ProfessionalExperience,
            FragmentScope::Highlight | FragmentScope::HighlightComponent => {
                SectionKind::Highlights
            }
            FragmentScope::EarlyCareerBullet => SectionKind::EarlyCareer,
            FragmentScope::AdditionalExperienceBullet => SectionKind::AdditionalExperience,
            FragmentScope::CommunityAchievement => SectionKind::CommunityLeadership,
            FragmentScope::ExecutiveSummary => SectionKind::ExecutiveSummary,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FragmentScope::Skill => "skill",
            FragmentScope::EmploymentBullet => "employment_bullet",
            FragmentScope::Highlight => "highlight",
            FragmentScope::HighlightComponent => "highlight_component",
            FragmentScope::EarlyCareerBullet => "early_career_bullet",
            FragmentScope::AdditionalExperienceBullet => "additional_experience_bullet",
            FragmentScope::CommunityAchievement => "community_achievement",
            FragmentScope::ExecutiveSummary => "executive_summary",
        }
    }
}

/// Top-level resume section. The outermost inclusion scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    ExecutiveSummary,
    Skills,
    Highlights,
    ProfessionalExperience,
    EarlyCareer,
    AdditionalExperience,
    CommunityLeadership,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::ExecutiveSummary,
        SectionKind::Skills,
        SectionKind::Highlights,
        SectionKind::ProfessionalExperience,
        SectionKind::EarlyCareer,
        SectionKind::AdditionalExperience,
        SectionKind::CommunityLeadership,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::ExecutiveSummary => "executive_summary",
            SectionKind::Skills => "skills",
            SectionKind::Highlights => "highlights",
            SectionKind::ProfessionalExperience => "professional_experience",
            SectionKind::EarlyCareer => "early_career",
            SectionKind::AdditionalExperience => "additional_experience",
            SectionKind::CommunityLeadership => "community_leadership",
        }
    }

    /// Early-career and additional-experience sections are opt-in.
    pub fn default_include(self) -> bool {
        !matches!(
            self,
            SectionKind::EarlyCareer | SectionKind::AdditionalExperience
        )
    }

    /// Default `max_items` for one parent-entity scope in this section.
    pub fn default_budget(self) -> i64 {
        match self {
            SectionKind::ExecutiveSummary => 1,
            SectionKind::Skills => 10,
            SectionKind::Highlights => 3,
            SectionKind::ProfessionalExperience => 5,
            SectionKind::EarlyCareer => 2,
            SectionKind::AdditionalExperience => 3,
            SectionKind::CommunityLeadership => 3,
        }
    }

    /// Default number of suggestions generated per scope in this section.
    pub fn default_suggestions(self) -> usize {
        3
    }

    /// The fragment scope a synthetic suggestion takes in this section.
    pub fn suggestion_scope(self, has_parent: bool) -> FragmentScope {
        match self {
            SectionKind::ExecutiveSummary => FragmentScope::ExecutiveSummary,
            SectionKind::Skills => FragmentScope::Skill,
            SectionKind::Highlights if has_parent => FragmentScope::HighlightComponent,
            SectionKind::Highlights => FragmentScope::Highlight,
            SectionKind::ProfessionalExperience => FragmentScope::EmploymentBullet,
            SectionKind::EarlyCareer => FragmentScope::EarlyCareerBullet,
            SectionKind::AdditionalExperience => FragmentScope::AdditionalExperienceBullet,
            SectionKind::CommunityLeadership => FragmentScope::CommunityAchievement,
        }
    }
}

/// Seniority ladder shared by fragments and job contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl Seniority {
    pub fn level(self) -> u8 {
        match self {
            Seniority::Entry => 0,
            Seniority::Mid => 1,
            Seniority::Senior => 2,
            Seniority::Lead => 3,
            Seniority::Executive => 4,
        }
    }

    pub fn distance(self, other: Seniority) -> u8 {
        self.level().abs_diff(other.level())
    }
}

/// Intrinsic importance multipliers. Each factor lies in `[0.1, 2.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportanceFactors {
    pub base_weight: f64,
    pub recency_weight: f64,
    pub uniqueness_score: f64,
    pub magnitude: f64,
}

impl Default for ImportanceFactors {
    fn default() -> Self {
        Self {
            base_weight: 1.0,
            recency_weight: 1.0,
            uniqueness_score: 1.0,
            magnitude: 1.0,
        }
    }
}

impl ImportanceFactors {
    /// Product of all four factors. Deliberately unclamped.
    pub fn product(&self) -> f64 {
        self.base_weight * self.recency_weight * self.uniqueness_score * self.magnitude
    }

    /// Returns the first factor outside `[IMPORTANCE_MIN, IMPORTANCE_MAX]`, if any.
    pub fn out_of_range(&self) -> Option<(&'static str, f64)> {
        [
            ("base_weight", self.base_weight),
            ("recency_weight", self.recency_weight),
            ("uniqueness_score", self.uniqueness_score),
            ("magnitude", self.magnitude),
        ]
        .into_iter()
        .find(|(_, v)| !(IMPORTANCE_MIN..=IMPORTANCE_MAX).contains(v))
    }
}

/// A single quantified outcome, e.g. `{value: 40, unit: "%", label: "p99 latency reduction"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetric {
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactEvidence {
    #[serde(default)]
    pub metrics: Vec<ImpactMetric>,
    #[serde(default)]
    pub narrative: Option<String>,
}

/// A unit of candidate content eligible for inclusion in a resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentFragment {
    pub id: Uuid,
    pub scope: FragmentScope,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub text: String,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default)]
    pub skills_demonstrated: BTreeSet<String>,
    #[serde(default)]
    pub industries: BTreeSet<String>,
    #[serde(default)]
    pub role_types: BTreeSet<String>,
    #[serde(default)]
    pub seniority: Option<Seniority>,
    #[serde(default)]
    pub impact: Option<ImpactEvidence>,
    #[serde(default)]
    pub importance_factors: ImportanceFactors,
    #[serde(default = "default_true")]
    pub default_include: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub display_order: i32,
}

fn default_true() -> bool {
    true
}

/// Why a fragment was withheld from scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    MissingKeywords,
    MissingSkills,
    ImportanceOutOfRange { factor: String, value: f64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingKeywords => write!(f, "fragment has no keywords"),
            SkipReason::MissingSkills => write!(f, "fragment has no demonstrated skills"),
            SkipReason::ImportanceOutOfRange { factor, value } => write!(
                f,
                "importance factor {factor}={value} outside [{IMPORTANCE_MIN}, {IMPORTANCE_MAX}]"
            ),
        }
    }
}

impl ContentFragment {
    pub fn section(&self) -> SectionKind {
        self.scope.section()
    }

    /// Checks the metadata a fragment needs before it can be scored.
    /// Blank entries do not count towards non-emptiness.
    pub fn check_scoreable(&self) -> Result<(), SkipReason> {
        if !self.keywords.iter().any(|k| !k.trim().is_empty()) {
            return Err(SkipReason::MissingKeywords);
        }
        if !self.skills_demonstrated.iter().any(|s| !s.trim().is_empty()) {
            return Err(SkipReason::MissingSkills);
        }
        if let Some((factor, value)) = self.importance_factors.out_of_range() {
            return Err(SkipReason::ImportanceOutOfRange {
                factor: factor.to_string(),
                value,
            });
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::fragment;
    use super::*;

    #[test]
    fn test_scope_maps_to_section() {
        assert_eq!(
            FragmentScope::HighlightComponent.section(),
            SectionKind::Highlights
        );
        assert_eq!(
            FragmentScope::EmploymentBullet.section(),
            SectionKind::ProfessionalExperience
        );
        assert_eq!(
            FragmentScope::EarlyCareerBullet.section(),
            SectionKind::EarlyCareer
        );
    }

    #[test]
    fn test_early_career_is_opt_in() {
        assert!(!SectionKind::EarlyCareer.default_include());
        assert!(SectionKind::ProfessionalExperience.default_include());
    }

    #[test]
    fn test_fragment_without_keywords_is_not_scoreable() {
        let mut f = fragment(FragmentScope::EmploymentBullet, &["rust"]);
        f.keywords.clear();
        assert_eq!(f.check_scoreable(), Err(SkipReason::MissingKeywords));
    }

    #[test]
    fn test_blank_keywords_do_not_count() {
        let mut f = fragment(FragmentScope::EmploymentBullet, &["rust"]);
        f.keywords = BTreeSet::from(["  ".to_string()]);
        assert_eq!(f.check_scoreable(), Err(SkipReason::MissingKeywords));
    }

    #[test]
    fn test_fragment_without_skills_is_not_scoreable() {
        let mut f = fragment(FragmentScope::Skill, &["rust"]);
        f.skills_demonstrated.clear();
        assert_eq!(f.check_scoreable(), Err(SkipReason::MissingSkills));
    }

    #[test]
    fn test_importance_out_of_range_is_not_scoreable() {
        let mut f = fragment(FragmentScope::Skill, &["rust"]);
        f.importance_factors.magnitude = 2.5;
        match f.check_scoreable() {
            Err(SkipReason::ImportanceOutOfRange { factor, value }) => {
                assert_eq!(factor, "magnitude");
                assert_eq!(value, 2.5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_importance_product_is_unclamped() {
        let factors = ImportanceFactors {
            base_weight: 2.0,
            recency_weight: 1.5,
            uniqueness_score: 1.0,
            magnitude: 1.0,
        };
        assert!((factors.product() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_seniority_distance_is_symmetric() {
        assert_eq!(Seniority::Entry.distance(Seniority::Lead), 3);
        assert_eq!(Seniority::Lead.distance(Seniority::Entry), 3);
        assert_eq!(Seniority::Senior.distance(Seniority::Senior), 0);
    }

    #[test]
    fn test_fragment_deserializes_with_defaults() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "scope": "employment_bullet",
            "text": "Cut p99 latency by 40%",
            "keywords": ["latency"],
            "skills_demonstrated": ["performance"]
        });
        let f: ContentFragment = serde_json::from_value(json).unwrap();
        assert!(f.default_include);
        assert!(!f.is_featured);
        assert_eq!(f.importance_factors, ImportanceFactors::default());
        assert!(f.check_scoreable().is_ok());
    }
}
