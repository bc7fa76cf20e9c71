//! Relevance Scorer — pluggable, trait-based per-dimension scoring of a fragment
//! against a job context.
//!
//! Default: `OverlapScorer` (pure-Rust, deterministic set overlap, fully testable).
//! Semantic backends (embeddings, rerankers) plug in behind the same trait.
//!
//! `SelectionEngine` holds an `Arc<dyn RelevanceScorer>`.

use std::collections::BTreeSet;

use crate::models::fragment::{ContentFragment, Seniority};
use crate::models::job::{normalize_set, normalize_term, JobContext};
use crate::models::selection::{ScoreVector, NEUTRAL_SCORE};
use crate::scoring::impact;
use crate::scoring::taxonomy::{industries_related, roles_adjacent};

/// Weight of a required-keyword match relative to a preferred-keyword match.
const REQUIRED_KEYWORD_WEIGHT: f64 = 2.0;
const PREFERRED_KEYWORD_WEIGHT: f64 = 1.0;

const RELATED_INDUSTRY_SCORE: f64 = 0.2;
const ADJACENT_ROLE_SCORE: f64 = 0.6;

const SENIORITY_EXACT: f64 = 1.0;
const SENIORITY_ONE_OFF: f64 = 0.6;
const SENIORITY_FAR: f64 = 0.2;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The scorer trait. Implementations must be pure: the same inputs always
/// produce the same six numbers, each in `[0, 1]`.
pub trait RelevanceScorer: Send + Sync {
    fn score(&self, fragment: &ContentFragment, job: &JobContext) -> ScoreVector;

    /// Label reported alongside results, e.g. "overlap".
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// OverlapScorer — default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Set-overlap scorer.
///
/// Algorithm:
/// 1. keyword = (2·|K∩R| + |K∩P|) / (2·|R| + |P|)
/// 2. skill = |S∩Req| / |Req|
/// 3. industry = exact 1.0, related 0.2, unrelated 0.0
/// 4. role = exact 1.0, adjacent category 0.6, none 0.0
/// 5. complexity = seniority distance 0 → 1.0, 1 → 0.6, 2+ → 0.2
/// 6. impact = band of the fragment's quantified evidence
///
/// Any dimension whose input is missing on either side scores 0.5.
pub struct OverlapScorer;

impl RelevanceScorer for OverlapScorer {
    fn score(&self, fragment: &ContentFragment, job: &JobContext) -> ScoreVector {
        let job = job.normalized();
        if job.is_empty() {
            return ScoreVector::neutral();
        }

        ScoreVector {
            keyword: keyword_score(&normalize_set(&fragment.keywords), &job),
            skill: skill_score(&normalize_set(&fragment.skills_demonstrated), &job),
            industry: industry_score(&normalize_set(&fragment.industries), &job),
            role: role_score(&normalize_roles(&fragment.role_types), &job),
            complexity: complexity_score(fragment.seniority, job.seniority),
            impact: impact::classify(fragment).score(),
        }
    }

    fn backend(&self) -> &'static str {
        "overlap"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dimension formulas (inputs already normalised)
// ────────────────────────────────────────────────────────────────────────────

pub fn keyword_score(keywords: &BTreeSet<String>, job: &JobContext) -> f64 {
    let total = REQUIRED_KEYWORD_WEIGHT * job.required_keywords.len() as f64
        + PREFERRED_KEYWORD_WEIGHT * job.preferred_keywords.len() as f64;
    if total == 0.0 {
        return NEUTRAL_SCORE;
    }

    let matched = REQUIRED_KEYWORD_WEIGHT
        * keywords.intersection(&job.required_keywords).count() as f64
        + PREFERRED_KEYWORD_WEIGHT * keywords.intersection(&job.preferred_keywords).count() as f64;

    (matched / total).clamp(0.0, 1.0)
}

pub fn skill_score(skills: &BTreeSet<String>, job: &JobContext) -> f64 {
    if job.required_skills.is_empty() {
        return NEUTRAL_SCORE;
    }
    let matched = skills.intersection(&job.required_skills).count() as f64;
    (matched / job.required_skills.len() as f64).clamp(0.0, 1.0)
}

pub fn industry_score(industries: &BTreeSet<String>, job: &JobContext) -> f64 {
    let Some(target) = job.industry.as_deref() else {
        return NEUTRAL_SCORE;
    };
    if industries.is_empty() {
        return NEUTRAL_SCORE;
    }
    if industries.contains(target) {
        1.0
    } else if industries.iter().any(|i| industries_related(i, target)) {
        RELATED_INDUSTRY_SCORE
    } else {
        0.0
    }
}

pub fn role_score(roles: &BTreeSet<String>, job: &JobContext) -> f64 {
    let Some(target) = job.role_type.as_deref().map(normalize_role) else {
        return NEUTRAL_SCORE;
    };
    if roles.is_empty() {
        return NEUTRAL_SCORE;
    }
    if roles.contains(&target) {
        1.0
    } else if roles.iter().any(|r| roles_adjacent(r, &target)) {
        ADJACENT_ROLE_SCORE
    } else {
        0.0
    }
}

pub fn complexity_score(fragment: Option<Seniority>, job: Option<Seniority>) -> f64 {
    match (fragment, job) {
        (Some(f), Some(j)) => match f.distance(j) {
            0 => SENIORITY_EXACT,
            1 => SENIORITY_ONE_OFF,
            _ => SENIORITY_FAR,
        },
        _ => NEUTRAL_SCORE,
    }
}

/// Role types compare as snake_case: "Backend Engineer" == "backend-engineer".
fn normalize_role(role: &str) -> String {
    normalize_term(role)
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn normalize_roles(roles: &BTreeSet<String>) -> BTreeSet<String> {
    roles
        .iter()
        .map(|r| normalize_role(r))
        .filter(|r| !r.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
