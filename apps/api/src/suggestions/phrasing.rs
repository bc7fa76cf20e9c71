//! Suggestion phrasing — turns a keyword bundle into fragment text.
//!
//! The generator treats every writer's output as an opaque string; it only
//! checks that each requested keyword appears in it. `TemplateWriter` is the
//! deterministic default and the fallback when another writer misses a keyword.

use crate::models::fragment::{SectionKind, Seniority};
use crate::models::job::mentions_term;

/// Everything a writer may use. The seed is derived from the scope, the job
/// context and the suggestion index, so equal inputs always get equal seeds.
#[derive(Debug, Clone)]
pub struct PhrasingRequest<'a> {
    pub section: SectionKind,
    pub keywords: &'a [String],
    pub seniority: Option<Seniority>,
    pub seed: u64,
}

pub trait SuggestionWriter: Send + Sync {
    fn write(&self, request: &PhrasingRequest<'_>) -> String;

    fn name(&self) -> &'static str;
}

/// Verb sets calibrated to seniority. Junior levels avoid ownership language.
fn verbs_for(seniority: Option<Seniority>) -> &'static [&'static str] {
    match seniority {
        Some(Seniority::Entry) => &["Contributed to", "Implemented", "Supported", "Helped deliver"],
        Some(Seniority::Mid) | None => &["Built", "Delivered", "Improved", "Implemented"],
        Some(Seniority::Senior) => &["Designed", "Led", "Scaled", "Drove"],
        Some(Seniority::Lead) => &["Led", "Architected", "Owned", "Spearheaded"],
        Some(Seniority::Executive) => &["Directed", "Championed", "Established", "Grew"],
    }
}

fn title_for(seniority: Option<Seniority>) -> &'static str {
    match seniority {
        Some(Seniority::Entry) => "Early-career engineer",
        Some(Seniority::Mid) | None => "Engineer",
        Some(Seniority::Senior) => "Senior engineer",
        Some(Seniority::Lead) => "Technical lead",
        Some(Seniority::Executive) => "Engineering executive",
    }
}

/// "a", "a and b", "a, b and c".
fn join_natural(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// Deterministic, template-based writer. Never drops a keyword.
pub struct TemplateWriter;

impl SuggestionWriter for TemplateWriter {
    fn write(&self, request: &PhrasingRequest<'_>) -> String {
        let list = join_natural(request.keywords);
        let verbs = verbs_for(request.seniority);
        let verb = verbs[(request.seed % verbs.len() as u64) as usize];

        match request.section {
            SectionKind::Skills => request.keywords.join(", "),
            SectionKind::ExecutiveSummary => format!(
                "{} with hands-on depth in {list}.",
                title_for(request.seniority)
            ),
            SectionKind::CommunityLeadership => {
                format!("{verb} community initiatives around {list}.")
            }
            SectionKind::Highlights => format!("{verb} a flagship effort combining {list}."),
            SectionKind::ProfessionalExperience
            | SectionKind::EarlyCareer
            | SectionKind::AdditionalExperience => {
                format!("{verb} production work spanning {list}.")
            }
        }
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

/// True when every keyword appears in the text as whole terms, case-insensitively.
pub fn contains_all_keywords(text: &str, keywords: &[String]) -> bool {
    keywords.iter().all(|k| mentions_term(text, k))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn request<'a>(section: SectionKind, keywords: &'a [String], seed: u64) -> PhrasingRequest<'a> {
        PhrasingRequest {
            section,
            keywords,
            seniority: Some(Seniority::Senior),
            seed,
        }
    }

    #[test]
    fn test_join_natural() {
        assert_eq!(join_natural(&kws(&["a"])), "a");
        assert_eq!(join_natural(&kws(&["a", "b"])), "a and b");
        assert_eq!(join_natural(&kws(&["a", "b", "c"])), "a, b and c");
    }

    #[test]
    fn test_template_includes_every_keyword_in_every_section() {
        let keywords = kws(&["kafka", "grpc", "terraform"]);
        for section in SectionKind::ALL {
            for seed in 0..8 {
                let text = TemplateWriter.write(&request(section, &keywords, seed));
                assert!(contains_all_keywords(&text, &keywords), "{section:?}: {text}");
            }
        }
    }

    #[test]
    fn test_template_is_deterministic() {
        let keywords = kws(&["kafka", "grpc"]);
        let req = request(SectionKind::ProfessionalExperience, &keywords, 42);
        assert_eq!(TemplateWriter.write(&req), TemplateWriter.write(&req));
    }

    #[test]
    fn test_entry_level_avoids_ownership_verbs() {
        let keywords = kws(&["kafka", "grpc"]);
        for seed in 0..8 {
            let text = TemplateWriter.write(&PhrasingRequest {
                seniority: Some(Seniority::Entry),
                ..request(SectionKind::ProfessionalExperience, &keywords, seed)
            });
            for verb in ["Architected", "Spearheaded", "Owned", "Led"] {
                assert!(!text.starts_with(verb), "{text}");
            }
        }
    }

    #[test]
    fn test_contains_all_keywords_is_case_insensitive() {
        assert!(contains_all_keywords("Shipped Kafka", &kws(&["kafka"])));
        assert!(!contains_all_keywords("Shipped Kafka", &kws(&["kafka", "grpc"])));
        assert!(!contains_all_keywords("Shipped JavaScript", &kws(&["java"])));
    }
}
