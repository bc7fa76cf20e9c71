//! Suggestion Generator — synthetic fragments that close a scope's keyword gaps.
//!
//! Algorithm:
//! 1. missing = job keywords (required first) not carried by any included
//!    fragment of the scope
//! 2. Fewer than 2 missing keywords, K = 0 or an empty budget → no suggestions
//! 3. Bundle size = clamp(ceil(|missing| / K), 2, 6), never more than |missing|;
//!    suggestion i takes `size` consecutive keywords starting at i·size, wrapping
//! 4. final_score = 0.79 + 0.16 · (bundle weight / max bundle weight),
//!    required keywords weigh 2, preferred 1
//! 5. Text comes from the configured writer; output missing a keyword is
//!    replaced by the template writer's
//!
//! Suggestions are always emitted with `included = false`.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::models::fragment::{ContentFragment, ImportanceFactors, SectionKind};
use crate::models::job::JobContext;
use crate::models::selection::{ScopeKey, Suggestion};
use crate::selection::coverage::fragment_covers;
use crate::suggestions::phrasing::{
    contains_all_keywords, PhrasingRequest, SuggestionWriter, TemplateWriter,
};

pub const MIN_KEYWORDS: usize = 2;
pub const MAX_KEYWORDS: usize = 6;

pub const SCORE_FLOOR: f64 = 0.79;
pub const SCORE_CEILING: f64 = 0.95;

const REQUIRED_WEIGHT: f64 = 2.0;
const PREFERRED_WEIGHT: f64 = 1.0;

/// Namespace for suggestion ids. Equal inputs always map to the same id.
const SUGGESTION_NAMESPACE: Uuid = Uuid::from_u128(0x5b1e_7d1c_4f0a_4e3b_9a47_2c8e_61d0_f3a9);

/// One scope's context for suggestion generation.
#[derive(Debug, Clone)]
pub struct SuggestionInput<'a> {
    pub scope: ScopeKey,
    pub section: SectionKind,
    /// Parent entity id for entity scopes; `None` for section-level groups.
    pub parent_id: Option<Uuid>,
    /// Fragments currently included in the scope.
    pub included: &'a [&'a ContentFragment],
    pub job: &'a JobContext,
    pub count: usize,
    pub max_items: i64,
}

#[derive(Clone)]
pub struct SuggestionGenerator {
    writer: Arc<dyn SuggestionWriter>,
}

impl Default for SuggestionGenerator {
    fn default() -> Self {
        Self::new(Arc::new(TemplateWriter))
    }
}

impl SuggestionGenerator {
    pub fn new(writer: Arc<dyn SuggestionWriter>) -> Self {
        Self { writer }
    }

    pub fn generate(&self, input: &SuggestionInput<'_>) -> Vec<Suggestion> {
        let job = input.job.normalized();
        let missing = missing_keywords(input.included, &job);

        if missing.len() < MIN_KEYWORDS || input.count == 0 || input.max_items <= 0 {
            return Vec::new();
        }

        let size = bundle_size(missing.len(), input.count);

        (0..input.count)
            .map(|index| {
                let bundle: Vec<String> = (0..size)
                    .map(|j| missing[(index * size + j) % missing.len()].clone())
                    .collect();
                self.build(input, &job, index, bundle)
            })
            .collect()
    }

    fn build(
        &self,
        input: &SuggestionInput<'_>,
        job: &JobContext,
        index: usize,
        bundle: Vec<String>,
    ) -> Suggestion {
        let digest = seed_digest(&input.scope, job, index);
        let seed = u64::from_le_bytes(digest[..8].try_into().unwrap_or_default());

        let request = PhrasingRequest {
            section: input.section,
            keywords: &bundle,
            seniority: job.seniority,
            seed,
        };
        let mut text = self.writer.write(&request);
        if !contains_all_keywords(&text, &bundle) {
            warn!(
                "Writer '{}' dropped keywords for scope {:?}; using template",
                self.writer.name(),
                input.scope
            );
            text = TemplateWriter.write(&request);
        }

        let keywords: BTreeSet<String> = bundle.iter().cloned().collect();
        let fragment = ContentFragment {
            id: Uuid::new_v5(&SUGGESTION_NAMESPACE, &digest),
            scope: input.section.suggestion_scope(input.parent_id.is_some()),
            parent_id: input.parent_id,
            text,
            skills_demonstrated: keywords.clone(),
            keywords,
            industries: job.industry.iter().cloned().collect(),
            role_types: job.role_type.iter().cloned().collect(),
            seniority: job.seniority,
            impact: None,
            importance_factors: ImportanceFactors::default(),
            default_include: false,
            is_featured: false,
            display_order: i32::try_from(index).unwrap_or(i32::MAX),
        };

        Suggestion {
            final_score: bundle_score(&bundle, job),
            fragment,
            included: false,
            introduced_keywords: bundle,
        }
    }
}

/// Normalised job keywords, required first, that no included fragment carries.
pub fn missing_keywords(included: &[&ContentFragment], job: &JobContext) -> Vec<String> {
    job.normalized()
        .all_keywords()
        .into_iter()
        .filter(|k| !included.iter().any(|f| fragment_covers(f, k)))
        .collect()
}

fn bundle_size(missing: usize, count: usize) -> usize {
    missing
        .div_ceil(count)
        .clamp(MIN_KEYWORDS, MAX_KEYWORDS)
        .min(missing)
}

fn bundle_score(bundle: &[String], job: &JobContext) -> f64 {
    let weight: f64 = bundle
        .iter()
        .map(|k| {
            if job.required_keywords.contains(k) {
                REQUIRED_WEIGHT
            } else {
                PREFERRED_WEIGHT
            }
        })
        .sum();
    let max = REQUIRED_WEIGHT * bundle.len() as f64;
    SCORE_FLOOR + (SCORE_CEILING - SCORE_FLOOR) * (weight / max)
}

fn seed_digest(scope: &ScopeKey, job: &JobContext, index: usize) -> [u8; 16] {
    let payload = serde_json::json!({
        "kind": "suggestion",
        "scope": scope,
        "job": job,
        "index": index,
    });
    let raw = serde_json::to_vec(&payload).unwrap_or_default();
    let hash = blake3::hash(&raw);
    let mut digest = [0u8; 16];
    digest.copy_from_slice(&hash.as_bytes()[..16]);
    digest
}
