use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::models::fragment::ContentFragment;
use crate::models::job::JobContext;
use crate::models::selection::ScoreVector;

const SCORE_CACHE_SCHEMA_VERSION: i32 = 1;

/// Builds the cache key for one (fragment snapshot, job context) pair.
/// The scorer backend is part of the key so swapped scorers never share entries.
pub fn score_cache_key(
    fragment: &ContentFragment,
    job: &JobContext,
    backend: &str,
) -> Result<String, serde_json::Error> {
    let payload = serde_json::json!({
        "kind": "score",
        "schema_version": SCORE_CACHE_SCHEMA_VERSION,
        "backend": backend,
        "fragment": fragment,
        "job": job.normalized(),
    });
    let raw = serde_json::to_vec(&payload)?;

    Ok(blake3::hash(&raw).to_hex().to_string())
}

/// Bounded in-process cache of score vectors, shared across requests.
///
/// Scoring is deterministic, so entries never go stale for a given key. When
/// the cache fills up it is cleared wholesale.
pub struct ScoreCache {
    capacity: usize,
    entries: RwLock<HashMap<String, ScoreVector>>,
}

impl ScoreCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<ScoreVector> {
        let entries = self.entries.read().ok()?;
        entries.get(key).copied()
    }

    pub fn insert(&self, key: String, scores: ScoreVector) {
        if self.capacity == 0 {
            return;
        }
        // Poisoned lock: skip caching.
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            debug!("Score cache full ({} entries), clearing", entries.len());
            entries.clear();
        }
        entries.insert(key, scores);
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}
