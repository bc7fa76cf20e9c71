//! Selection Engine — runs one (profile, job) request end to end.
//!
//! Algorithm:
//! 1. Build the scope tree and resolve inclusion top-down
//! 2. Order scopes so a fragment-backed entity follows the scope holding its
//!    backing fragment; unresolvable dependencies are gated
//! 3. Per included scope: skip malformed fragments, score the rest, rank,
//!    truncate to budget, generate gap suggestions
//! 4. Build the keyword coverage report over every included fragment
//!
//! Stateless across requests. The optional score cache is the only shared
//! structure and holds deterministic results.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::models::fragment::{ContentFragment, FragmentScope};
use crate::models::job::JobContext;
use crate::models::profile::ProfileSnapshot;
use crate::models::selection::{
    GatedFragment, InclusionSource, ScopeKey, ScopeSelection, ScoreVector, SelectionResult,
    SkippedFragment,
};
use crate::scoring::cache::{score_cache_key, ScoreCache};
use crate::scoring::composite::{CompositeRanker, CompositeScore};
use crate::scoring::dimensions::RelevanceScorer;
use crate::selection::coverage::compute_coverage;
use crate::selection::scope::{InclusionOverrides, ScopeDecision, ScopeTree};
use crate::selection::selector::{select_scope, ScoredFragment};
use crate::suggestions::generator::{SuggestionGenerator, SuggestionInput};

const EMPTY_SCOPE_NOTE: &str = "No scoreable fragments; scope shown without content.";

// ────────────────────────────────────────────────────────────────────────────
// Request / output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub snapshot: ProfileSnapshot,
    #[serde(default)]
    pub job: JobContext,
    #[serde(default)]
    pub overrides: InclusionOverrides,
}

/// Scores of one fragment, without selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentScore {
    pub fragment_id: Uuid,
    pub scope: FragmentScope,
    pub scores: ScoreVector,
    #[serde(flatten)]
    pub composite: CompositeScore,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBatch {
    pub scores: Vec<FragmentScore>,
    pub skipped: Vec<SkippedFragment>,
    pub low_confidence: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SelectionEngine {
    scorer: Arc<dyn RelevanceScorer>,
    ranker: CompositeRanker,
    config: EngineConfig,
    suggestions: SuggestionGenerator,
    cache: Option<Arc<ScoreCache>>,
}

impl SelectionEngine {
    /// Validates the configuration. Bad weights never reach a request.
    pub fn new(config: EngineConfig, scorer: Arc<dyn RelevanceScorer>) -> Result<Self, EngineError> {
        config.validate()?;
        let ranker = CompositeRanker::new(config.scoring_profile()?);

        Ok(Self {
            scorer,
            ranker,
            config,
            suggestions: SuggestionGenerator::default(),
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: Arc<ScoreCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Number of cached score vectors, or `None` without a cache.
    pub fn cached_scores(&self) -> Option<usize> {
        self.cache.as_ref().map(|c| c.len())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scorer_backend(&self) -> &'static str {
        self.scorer.backend()
    }

    /// Scores one fragment, consulting the cache when one is attached.
    pub fn score_fragment(&self, fragment: &ContentFragment, job: &JobContext) -> ScoreVector {
        let Some(cache) = &self.cache else {
            return self.scorer.score(fragment, job);
        };

        let key = match score_cache_key(fragment, job, self.scorer.backend()) {
            Ok(key) => key,
            Err(e) => {
                warn!("Failed to build score cache key for {}: {e}", fragment.id);
                return self.scorer.score(fragment, job);
            }
        };

        if let Some(scores) = cache.get(&key) {
            debug!("Score cache hit for fragment {}", fragment.id);
            return scores;
        }

        let scores = self.scorer.score(fragment, job);
        cache.insert(key, scores);
        scores
    }

    /// Scores every scoreable fragment independently, without scopes or budgets.
    pub fn score_all(&self, fragments: &[ContentFragment], job: &JobContext) -> ScoreBatch {
        let mut scores = Vec::new();
        let mut skipped = Vec::new();

        for fragment in fragments {
            if let Err(reason) = fragment.check_scoreable() {
                warn!("Skipping fragment {}: {reason}", fragment.id);
                skipped.push(SkippedFragment {
                    fragment_id: fragment.id,
                    reason,
                });
                continue;
            }
            let vector = self.score_fragment(fragment, job);
            scores.push(FragmentScore {
                fragment_id: fragment.id,
                scope: fragment.scope,
                composite: self.ranker.rank(&vector, fragment),
                reason: self.ranker.explain(&vector, fragment),
                scores: vector,
            });
        }

        ScoreBatch {
            scores,
            skipped,
            low_confidence: job.is_empty(),
        }
    }

    pub fn select(&self, request: &SelectionRequest) -> SelectionResult {
        let job = &request.job;
        let low_confidence = job.is_empty();
        if low_confidence {
            warn!("Job context is empty; scoring every dimension as neutral");
        }

        let tree = ScopeTree::build(&request.snapshot, &self.config);
        let decisions = tree.resolve_inclusion(&request.overrides);
        let order = dependency_order(&decisions);

        let mut run = Run::default();
        let mut outputs: Vec<Option<ScopeSelection>> = vec![None; decisions.len()];

        for step in order {
            match step {
                Step::Resolve(idx) => {
                    outputs[idx] = self.process(&decisions[idx], job, &mut run);
                }
                Step::Unresolved(idx) => {
                    let decision = &decisions[idx];
                    warn!(
                        "Scope {:?} depends on a fragment that cannot be resolved first; gating it",
                        decision.key
                    );
                    run.gate_all(decision, InclusionSource::ParentFragment);
                }
            }
        }

        let scopes: Vec<ScopeSelection> = outputs.into_iter().flatten().collect();
        let coverage = compute_coverage(&run.included, job);

        info!(
            "Selection complete: {} scopes, {} included, {} skipped, {} gated, coverage {:.2}",
            scopes.len(),
            run.included.len(),
            run.skipped.len(),
            run.gated.len(),
            coverage.overall
        );

        SelectionResult {
            scopes,
            skipped: run.skipped,
            gated: run.gated,
            low_confidence,
            coverage,
        }
    }

    fn process<'a>(
        &self,
        decision: &ScopeDecision<'a>,
        job: &JobContext,
        run: &mut Run<'a>,
    ) -> Option<ScopeSelection> {
        let mut inclusion = decision.source;
        if decision.included {
            if let Some(backing) = decision.backed_by {
                if decision.source != InclusionSource::EntityOverride
                    && !run.selected.contains(&backing)
                {
                    inclusion = InclusionSource::ParentFragment;
                }
            }
        }

        if !decision.included || inclusion == InclusionSource::ParentFragment {
            debug!("Scope {:?} excluded ({:?})", decision.key, inclusion);
            run.gate_all(decision, inclusion);
            return None;
        }

        for (fragment, source) in &decision.gated {
            run.gated.push(GatedFragment {
                fragment_id: fragment.id,
                scope: decision.key,
                source: *source,
            });
        }

        let mut scored = Vec::with_capacity(decision.candidates.len());
        for &fragment in &decision.candidates {
            if let Err(reason) = fragment.check_scoreable() {
                warn!("Skipping fragment {}: {reason}", fragment.id);
                run.skipped.push(SkippedFragment {
                    fragment_id: fragment.id,
                    reason,
                });
                continue;
            }
            let scores = self.score_fragment(fragment, job);
            scored.push(ScoredFragment {
                fragment,
                composite: self.ranker.rank(&scores, fragment),
                scores,
            });
        }

        let entries = select_scope(scored, decision.max_items, &self.ranker);

        let included: Vec<&'a ContentFragment> = entries
            .iter()
            .filter(|e| e.included)
            .filter_map(|e| {
                decision
                    .candidates
                    .iter()
                    .copied()
                    .find(|f| f.id == e.fragment_id)
            })
            .collect();

        let parent_id = match decision.key {
            ScopeKey::Entity { id } => Some(id),
            ScopeKey::Section { .. } => None,
        };
        let suggestions = self.suggestions.generate(&SuggestionInput {
            scope: decision.key,
            section: decision.section,
            parent_id,
            included: &included,
            job,
            count: self.config.suggestions_for(decision.section),
            max_items: decision.max_items,
        });

        for fragment in &included {
            run.selected.insert(fragment.id);
        }
        run.included.extend(included);

        let note = entries.is_empty().then(|| EMPTY_SCOPE_NOTE.to_string());

        Some(ScopeSelection {
            scope: decision.key,
            section: decision.section,
            max_items: decision.max_items,
            inclusion,
            entries,
            suggestions,
            note,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-request bookkeeping
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Run<'a> {
    selected: HashSet<Uuid>,
    included: Vec<&'a ContentFragment>,
    skipped: Vec<SkippedFragment>,
    gated: Vec<GatedFragment>,
}

impl<'a> Run<'a> {
    fn gate_all(&mut self, decision: &ScopeDecision<'a>, source: InclusionSource) {
        let fragments = decision
            .candidates
            .iter()
            .copied()
            .chain(decision.gated.iter().map(|(f, _)| *f));
        for fragment in fragments {
            self.gated.push(GatedFragment {
                fragment_id: fragment.id,
                scope: decision.key,
                source,
            });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Resolve(usize),
    Unresolved(usize),
}

/// Orders decisions so that every fragment-backed scope comes after the
/// scope containing its backing fragment. Scopes left over (cycles) are
/// reported as unresolved.
fn dependency_order(decisions: &[ScopeDecision<'_>]) -> Vec<Step> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut done = vec![false; decisions.len()];
    let mut order = Vec::with_capacity(decisions.len());

    loop {
        let mut progressed = false;
        for (idx, decision) in decisions.iter().enumerate() {
            if done[idx] {
                continue;
            }
            let ready = decision.backed_by.map_or(true, |id| seen.contains(&id));
            if !ready {
                continue;
            }
            seen.extend(decision.candidates.iter().map(|f| f.id));
            seen.extend(decision.gated.iter().map(|(f, _)| f.id));
            done[idx] = true;
            order.push(Step::Resolve(idx));
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    order.extend(
        done.iter()
            .enumerate()
            .filter(|(_, d)| !**d)
            .map(|(idx, _)| Step::Unresolved(idx)),
    );
    order
}
