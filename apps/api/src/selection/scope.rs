//! Scope tree — section → parent entity → fragment.
//!
//! Inclusion is decided top-down with early exit: an excluded section gates
//! every entity and fragment beneath it before any scoring happens. Explicit
//! caller overrides short-circuit the default at the level they name.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::models::fragment::{ContentFragment, SectionKind};
use crate::models::profile::ProfileSnapshot;
use crate::models::selection::{InclusionSource, ScopeKey};

/// Caller-supplied forced include/exclude flags.
///
/// Section and entity overrides replace the inherited decision for that scope.
/// Fragment overrides only act inside an included scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InclusionOverrides {
    #[serde(default)]
    pub sections: BTreeMap<SectionKind, bool>,
    #[serde(default)]
    pub entities: BTreeMap<Uuid, bool>,
    #[serde(default)]
    pub fragments: BTreeMap<Uuid, bool>,
}

/// A selection scope: the parentless fragments of a section, or one entity.
#[derive(Debug, Clone)]
pub struct ScopeNode<'a> {
    pub key: ScopeKey,
    pub section: SectionKind,
    pub default_include: bool,
    pub max_items: i64,
    pub fragments: Vec<&'a ContentFragment>,
    /// Set when the entity id is itself a fragment (a highlight owning components).
    pub backed_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct SectionNode<'a> {
    pub section: SectionKind,
    pub default_include: bool,
    pub loose: ScopeNode<'a>,
    pub entities: Vec<ScopeNode<'a>>,
}

#[derive(Debug, Clone)]
pub struct ScopeTree<'a> {
    pub sections: Vec<SectionNode<'a>>,
}

/// Resolved inclusion for one scope.
#[derive(Debug, Clone)]
pub struct ScopeDecision<'a> {
    pub key: ScopeKey,
    pub section: SectionKind,
    pub included: bool,
    pub source: InclusionSource,
    pub max_items: i64,
    pub backed_by: Option<Uuid>,
    /// Fragments that passed every gate. Empty when the scope is excluded.
    pub candidates: Vec<&'a ContentFragment>,
    /// Fragments withheld, with the rule that withheld them.
    pub gated: Vec<(&'a ContentFragment, InclusionSource)>,
}

impl<'a> ScopeTree<'a> {
    pub fn build(snapshot: &'a ProfileSnapshot, config: &EngineConfig) -> Self {
        let section_settings: HashMap<SectionKind, _> = snapshot
            .sections
            .iter()
            .map(|s| (s.section, s))
            .collect();
        let fragment_ids: HashSet<Uuid> = snapshot.fragments.iter().map(|f| f.id).collect();

        let mut sections: Vec<SectionNode<'a>> = SectionKind::ALL
            .iter()
            .map(|&section| {
                let settings = section_settings.get(&section);
                let default_include = settings
                    .and_then(|s| s.default_include)
                    .unwrap_or_else(|| config.include_by_default(section));
                let max_items = settings
                    .and_then(|s| s.max_items)
                    .unwrap_or_else(|| config.budget_for(section));
                SectionNode {
                    section,
                    default_include,
                    loose: ScopeNode {
                        key: ScopeKey::Section { section },
                        section,
                        default_include,
                        max_items,
                        fragments: Vec::new(),
                        backed_by: None,
                    },
                    entities: Vec::new(),
                }
            })
            .collect();

        // Entities in declaration order, implicit ones appended in first-seen order.
        let mut entities: Vec<ScopeNode<'a>> = Vec::new();
        let mut entity_index: HashMap<Uuid, usize> = HashMap::new();
        for declared in &snapshot.entities {
            if entity_index.contains_key(&declared.id) {
                continue;
            }
            entity_index.insert(declared.id, entities.len());
            entities.push(ScopeNode {
                key: ScopeKey::Entity { id: declared.id },
                section: declared.section,
                default_include: declared.default_include,
                max_items: declared
                    .max_items
                    .unwrap_or_else(|| config.budget_for(declared.section)),
                fragments: Vec::new(),
                backed_by: fragment_ids.contains(&declared.id).then_some(declared.id),
            });
        }

        for fragment in &snapshot.fragments {
            let Some(parent_id) = fragment.parent_id else {
                section_mut(&mut sections, fragment.section())
                    .loose
                    .fragments
                    .push(fragment);
                continue;
            };

            let idx = *entity_index.entry(parent_id).or_insert_with(|| {
                debug!(
                    "Fragment {} references undeclared parent {parent_id}; using defaults",
                    fragment.id
                );
                let section = fragment.section();
                entities.push(ScopeNode {
                    key: ScopeKey::Entity { id: parent_id },
                    section,
                    default_include: true,
                    max_items: config.budget_for(section),
                    fragments: Vec::new(),
                    backed_by: fragment_ids.contains(&parent_id).then_some(parent_id),
                });
                entities.len() - 1
            });

            let entity = &mut entities[idx];
            if entity.section != fragment.section() {
                warn!(
                    "Fragment {} ({}) sits under entity {parent_id} in section {}",
                    fragment.id,
                    fragment.scope.as_str(),
                    entity.section.as_str()
                );
            }
            if entity.backed_by == Some(fragment.id) {
                // A fragment cannot gate itself.
                entity.backed_by = None;
            }
            entity.fragments.push(fragment);
        }

        for entity in entities {
            let section = entity.section;
            section_mut(&mut sections, section).entities.push(entity);
        }

        ScopeTree { sections }
    }

    /// Walks the tree top-down and decides inclusion for every scope.
    ///
    /// Order: sections in `SectionKind::ALL` order; within a section the
    /// parentless group first, then entities. Empty parentless groups are omitted.
    pub fn resolve_inclusion(&self, overrides: &InclusionOverrides) -> Vec<ScopeDecision<'a>> {
        let mut decisions = Vec::new();

        for node in &self.sections {
            let (section_included, section_source) = match overrides.sections.get(&node.section) {
                Some(forced) => (*forced, InclusionSource::SectionOverride),
                None => (node.default_include, InclusionSource::SectionDefault),
            };
            if !section_included {
                debug!("Section {} excluded ({:?})", node.section.as_str(), section_source);
            }

            if !node.loose.fragments.is_empty() {
                decisions.push(decide(
                    &node.loose,
                    section_included,
                    section_source,
                    overrides,
                ));
            }

            for entity in &node.entities {
                let id = match entity.key {
                    ScopeKey::Entity { id } => id,
                    ScopeKey::Section { .. } => continue,
                };
                let (included, source) = match overrides.entities.get(&id) {
                    Some(forced) => (*forced, InclusionSource::EntityOverride),
                    None if !section_included => (false, section_source),
                    None => (entity.default_include, InclusionSource::EntityDefault),
                };
                decisions.push(decide(entity, included, source, overrides));
            }
        }

        decisions
    }
}

fn section_mut<'t, 'a>(sections: &'t mut [SectionNode<'a>], kind: SectionKind) -> &'t mut SectionNode<'a> {
    let idx = SectionKind::ALL
        .iter()
        .position(|s| *s == kind)
        .unwrap_or_default();
    &mut sections[idx]
}

fn decide<'a>(
    node: &ScopeNode<'a>,
    included: bool,
    source: InclusionSource,
    overrides: &InclusionOverrides,
) -> ScopeDecision<'a> {
    let mut candidates = Vec::new();
    let mut gated = Vec::new();

    for &fragment in &node.fragments {
        if !included {
            gated.push((fragment, source));
            continue;
        }
        match overrides.fragments.get(&fragment.id) {
            Some(true) => candidates.push(fragment),
            Some(false) => gated.push((fragment, InclusionSource::FragmentOverride)),
            None if fragment.default_include => candidates.push(fragment),
            None => gated.push((fragment, InclusionSource::FragmentDefault)),
        }
    }

    ScopeDecision {
        key: node.key,
        section: node.section,
        included,
        source,
        max_items: node.max_items,
        backed_by: node.backed_by,
        candidates,
        gated,
    }
}
