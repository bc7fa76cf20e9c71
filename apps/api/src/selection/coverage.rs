//! Keyword Coverage — which job keywords the selected fragments already carry.
//!
//! Algorithm:
//! 1. For each job keyword (required first), collect the included fragments
//!    that list it as a keyword or mention it as whole terms in their text
//! 2. overall = Σ(weight of covered keywords) / Σ(weight of all keywords),
//!    required keywords weigh 2, preferred 1
//! 3. Uncovered keywords become gaps; the recommendation lists the first few

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::fragment::ContentFragment;
use crate::models::job::{mentions_term, normalize_set, JobContext};

const REQUIRED_WEIGHT: f64 = 2.0;
const PREFERRED_WEIGHT: f64 = 1.0;

const STRONG_COVERAGE: f64 = 0.8;
const MODERATE_COVERAGE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCoverage {
    pub keyword: String,
    pub required: bool,
    pub fragment_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGap {
    pub keyword: String,
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Weighted share of job keywords covered, in `[0, 1]`.
    pub overall: f64,
    pub covered: Vec<KeywordCoverage>,
    pub gaps: Vec<KeywordGap>,
    pub recommendation: String,
}

/// Returns true if the fragment lists the (normalised) keyword or mentions it
/// as whole terms in its text.
pub fn fragment_covers(fragment: &ContentFragment, keyword: &str) -> bool {
    normalize_set(&fragment.keywords).contains(keyword) || mentions_term(&fragment.text, keyword)
}

pub fn compute_coverage(included: &[&ContentFragment], job: &JobContext) -> CoverageReport {
    let job = job.normalized();
    let keywords = job.all_keywords();

    if keywords.is_empty() {
        return CoverageReport {
            overall: 0.0,
            covered: vec![],
            gaps: vec![],
            recommendation: "No job keywords supplied — cannot measure coverage.".to_string(),
        };
    }

    let mut covered = Vec::new();
    let mut gaps = Vec::new();
    let mut total_weight = 0.0;
    let mut covered_weight = 0.0;

    for keyword in keywords {
        let required = job.required_keywords.contains(&keyword);
        let weight = if required {
            REQUIRED_WEIGHT
        } else {
            PREFERRED_WEIGHT
        };
        total_weight += weight;

        let fragment_ids: Vec<Uuid> = included
            .iter()
            .filter(|f| fragment_covers(f, &keyword))
            .map(|f| f.id)
            .collect();

        if fragment_ids.is_empty() {
            gaps.push(KeywordGap { keyword, required });
        } else {
            covered_weight += weight;
            covered.push(KeywordCoverage {
                keyword,
                required,
                fragment_ids,
            });
        }
    }

    let overall = covered_weight / total_weight;
    let recommendation = build_recommendation(overall, &gaps);

    CoverageReport {
        overall,
        covered,
        gaps,
        recommendation,
    }
}

fn build_recommendation(overall: f64, gaps: &[KeywordGap]) -> String {
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(|g| g.keyword.as_str()).collect();
    let pct = (overall * 100.0).round() as u32;

    if gaps.is_empty() {
        "Full coverage. Every job keyword appears in the selected content.".to_string()
    } else if overall >= STRONG_COVERAGE {
        format!("Strong coverage ({pct}%). Remaining gaps: {}.", top_gaps.join(", "))
    } else if overall >= MODERATE_COVERAGE {
        format!(
            "Moderate coverage ({pct}%). Consider content for: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low coverage ({pct}%). Significant gaps: {}. Review the suggested fragments.",
            top_gaps.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fragment::fixtures::fragment;
    use crate::models::fragment::FragmentScope;
    use std::collections::BTreeSet;

    fn job(required: &[&str], preferred: &[&str]) -> JobContext {
        JobContext {
            required_keywords: required.iter().map(|s| s.to_string()).collect(),
            preferred_keywords: preferred.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_coverage() {
        let f = fragment(FragmentScope::EmploymentBullet, &["rust", "kafka"]);
        let report = compute_coverage(&[&f], &job(&["rust"], &["kafka"]));
        assert_eq!(report.overall, 1.0);
        assert!(report.gaps.is_empty());
        assert_eq!(report.covered[0].fragment_ids, vec![f.id]);
        assert!(report.recommendation.contains("Full coverage"));
    }

    #[test]
    fn test_required_keywords_weigh_double() {
        let f = fragment(FragmentScope::EmploymentBullet, &["rust"]);
        let report = compute_coverage(&[&f], &job(&["rust"], &["kafka"]));
        assert!((report.overall - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            report.gaps,
            vec![KeywordGap {
                keyword: "kafka".to_string(),
                required: false
            }]
        );
    }

    #[test]
    fn test_text_mention_counts_as_covered() {
        let mut f = fragment(FragmentScope::EmploymentBullet, &["backend"]);
        f.text = "Migrated billing to Kubernetes".to_string();
        let report = compute_coverage(&[&f], &job(&["kubernetes"], &[]));
        assert_eq!(report.overall, 1.0);
    }

    #[test]
    fn test_substring_mentions_are_gaps() {
        let mut f = fragment(FragmentScope::EmploymentBullet, &["python"]);
        f.text = "Mentored a good team writing javascript services".to_string();
        let report = compute_coverage(&[&f], &job(&["python", "go", "java"], &[]));
        let gaps: Vec<&str> = report.gaps.iter().map(|g| g.keyword.as_str()).collect();
        assert_eq!(gaps, vec!["go", "java"]);
        assert!((report.overall - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_keywords_are_normalised() {
        let mut f = fragment(FragmentScope::Skill, &["x"]);
        f.keywords = BTreeSet::from([" Rust ".to_string()]);
        let report = compute_coverage(&[&f], &job(&["RUST"], &[]));
        assert_eq!(report.covered.len(), 1);
        assert_eq!(report.covered[0].keyword, "rust");
    }

    #[test]
    fn test_no_keywords_reports_zero() {
        let f = fragment(FragmentScope::Skill, &["rust"]);
        let report = compute_coverage(&[&f], &JobContext::default());
        assert_eq!(report.overall, 0.0);
        assert!(report.covered.is_empty());
        assert!(report.gaps.is_empty());
    }

    #[test]
    fn test_low_coverage_lists_gaps() {
        let report = compute_coverage(&[], &job(&["rust", "kafka", "grpc"], &[]));
        assert_eq!(report.overall, 0.0);
        assert!(report.recommendation.starts_with("Low coverage"));
        assert!(report.recommendation.contains("grpc"));
    }
}
