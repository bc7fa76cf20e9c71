use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::fragment::Seniority;

/// Normalised job requirements for one scoring run, produced by the upstream
/// job-posting normaliser. Every field is optional; absent data scores neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    #[serde(default)]
    pub required_keywords: BTreeSet<String>,
    #[serde(default)]
    pub preferred_keywords: BTreeSet<String>,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub role_type: Option<String>,
    #[serde(default)]
    pub seniority: Option<Seniority>,
}

/// Lowercases and trims a term. All set comparisons go through this.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Normalises every term and drops blanks.
pub fn normalize_set<'a, I>(terms: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    terms
        .into_iter()
        .map(|t| normalize_term(t))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Splits text into lowercased terms. `+`, `#` and `.` stay inside a term so
/// "c++", "c#" and "node.js" survive; trailing dots are sentence punctuation.
pub fn term_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_end_matches('.'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the keyword appears in the text as whole terms. A multi-word
/// keyword must match a contiguous run of terms.
pub fn mentions_term(text: &str, keyword: &str) -> bool {
    let needle = term_tokens(keyword);
    if needle.is_empty() {
        return false;
    }
    term_tokens(text)
        .windows(needle.len())
        .any(|window| window == needle.as_slice())
}

fn normalize_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(normalize_term)
        .filter(|v| !v.is_empty())
}

impl JobContext {
    /// Returns a copy with normalised terms. A keyword listed as both required
    /// and preferred is kept only as required.
    pub fn normalized(&self) -> JobContext {
        let required_keywords = normalize_set(&self.required_keywords);
        let preferred_keywords = normalize_set(&self.preferred_keywords)
            .into_iter()
            .filter(|k| !required_keywords.contains(k))
            .collect();

        JobContext {
            required_keywords,
            preferred_keywords,
            required_skills: normalize_set(&self.required_skills),
            industry: normalize_opt(&self.industry),
            role_type: normalize_opt(&self.role_type),
            seniority: self.seniority,
        }
    }

    /// True when the context carries no usable signal at all.
    pub fn is_empty(&self) -> bool {
        let n = self.normalized();
        n.required_keywords.is_empty()
            && n.preferred_keywords.is_empty()
            && n.required_skills.is_empty()
            && n.industry.is_none()
            && n.role_type.is_none()
            && n.seniority.is_none()
    }

    /// Union of required and preferred keywords, required first.
    pub fn all_keywords(&self) -> Vec<String> {
        self.required_keywords
            .iter()
            .chain(
                self.preferred_keywords
                    .iter()
                    .filter(|k| !self.required_keywords.contains(*k)),
            )
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalized_lowercases_and_trims() {
        let job = JobContext {
            required_keywords: set(&[" Python ", "FastAPI"]),
            industry: Some("  FinTech".to_string()),
            ..Default::default()
        };
        let n = job.normalized();
        assert_eq!(n.required_keywords, set(&["fastapi", "python"]));
        assert_eq!(n.industry.as_deref(), Some("fintech"));
    }

    #[test]
    fn test_preferred_overlapping_required_is_dropped() {
        let job = JobContext {
            required_keywords: set(&["rust"]),
            preferred_keywords: set(&["Rust", "kafka"]),
            ..Default::default()
        };
        let n = job.normalized();
        assert_eq!(n.preferred_keywords, set(&["kafka"]));
    }

    #[test]
    fn test_blank_context_is_empty() {
        let job = JobContext {
            required_keywords: set(&["  "]),
            role_type: Some(String::new()),
            ..Default::default()
        };
        assert!(job.is_empty());
        assert!(JobContext::default().is_empty());
    }

    #[test]
    fn test_seniority_alone_is_not_empty() {
        let job = JobContext {
            seniority: Some(Seniority::Senior),
            ..Default::default()
        };
        assert!(!job.is_empty());
    }

    #[test]
    fn test_all_keywords_lists_required_first() {
        let job = JobContext {
            required_keywords: set(&["python"]),
            preferred_keywords: set(&["aws"]),
            ..Default::default()
        };
        assert_eq!(job.all_keywords(), vec!["python", "aws"]);
    }

    #[test]
    fn test_mentions_term_matches_whole_terms_only() {
        let text = "Mentored a good team writing JavaScript services";
        assert!(mentions_term(text, "javascript"));
        assert!(!mentions_term(text, "go"));
        assert!(!mentions_term(text, "java"));
    }

    #[test]
    fn test_mentions_term_keeps_symbol_terms() {
        assert!(mentions_term("Rewrote the engine in C++.", "c++"));
        assert!(mentions_term("Moved APIs to Node.js and C#", "node.js"));
        assert!(mentions_term("Moved APIs to Node.js and C#", "c#"));
        assert!(!mentions_term("Wrote C code", "c++"));
    }

    #[test]
    fn test_mentions_term_multi_word_needs_contiguous_run() {
        assert!(mentions_term("Applied machine learning to fraud", "machine learning"));
        assert!(!mentions_term("Machine tuning and learning paths", "machine learning"));
        assert!(mentions_term("Owned the CI/CD pipeline", "ci/cd"));
        assert!(!mentions_term("Anything", "  "));
    }
}
