use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::fragment::{ContentFragment, SectionKind};

/// Section-level inclusion settings supplied by the content repository.
/// Unset fields fall back to the engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub section: SectionKind,
    #[serde(default)]
    pub default_include: Option<bool>,
    /// Budget for the section's parentless fragments.
    #[serde(default)]
    pub max_items: Option<i64>,
}

/// An owning entity such as an employment role or a highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentEntity {
    pub id: Uuid,
    pub section: SectionKind,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub default_include: bool,
    #[serde(default)]
    pub max_items: Option<i64>,
}

fn default_true() -> bool {
    true
}

/// Read-only snapshot of one candidate profile, already materialised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub fragments: Vec<ContentFragment>,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub entities: Vec<ParentEntity>,
}

impl ProfileSnapshot {
    /// Ids repeated among fragments or among entities, in first-seen order.
    /// An entity may share its id with a fragment (a highlight owning components).
    pub fn duplicate_ids(&self) -> Vec<Uuid> {
        let mut dupes = repeated(self.fragments.iter().map(|f| f.id));
        for id in repeated(self.entities.iter().map(|e| e.id)) {
            if !dupes.contains(&id) {
                dupes.push(id);
            }
        }
        dupes
    }
}

fn repeated(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut dupes = Vec::new();
    for id in ids {
        if !seen.insert(id) && !dupes.contains(&id) {
            dupes.push(id);
        }
    }
    dupes
}
