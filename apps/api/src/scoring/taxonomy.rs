//! Static taxonomies backing the industry and role dimensions.
//!
//! Terms are compared after `normalize_term`. Unknown terms belong to no
//! family and therefore never earn partial credit.

/// Industries that are close enough to earn related-industry credit.
const INDUSTRY_FAMILIES: &[&[&str]] = &[
    &["fintech", "banking", "finance", "financial services", "insurance", "payments"],
    &["healthcare", "healthtech", "biotech", "pharma", "medical devices"],
    &["saas", "software", "cloud", "developer tools", "enterprise software"],
    &["ecommerce", "retail", "marketplace", "consumer goods"],
    &["media", "entertainment", "gaming", "publishing"],
    &["education", "edtech", "higher education"],
    &["government", "public sector", "defense", "nonprofit"],
    &["telecom", "networking", "hardware", "semiconductors"],
    &["energy", "utilities", "climate", "cleantech"],
    &["logistics", "transportation", "automotive", "manufacturing"],
];

/// Role types grouped into adjacent categories.
const ROLE_FAMILIES: &[&[&str]] = &[
    &[
        "software_engineer",
        "backend_engineer",
        "frontend_engineer",
        "fullstack_engineer",
        "mobile_engineer",
        "platform_engineer",
        "devops_engineer",
        "site_reliability_engineer",
    ],
    &[
        "data_scientist",
        "data_engineer",
        "ml_engineer",
        "data_analyst",
        "research_scientist",
    ],
    &[
        "engineering_manager",
        "director_of_engineering",
        "vp_engineering",
        "cto",
        "technical_lead",
    ],
    &["product_manager", "program_manager", "project_manager", "product_owner"],
    &["designer", "ux_designer", "ui_designer", "product_designer", "ux_researcher"],
    &["sales", "account_executive", "customer_success", "solutions_engineer"],
    &["marketing", "growth", "content_strategist", "communications"],
    &["operations", "business_operations", "finance", "people_operations"],
];

fn family_of<'a>(families: &'a [&'a [&'a str]], term: &str) -> Option<&'a [&'a str]> {
    families
        .iter()
        .copied()
        .find(|family| family.iter().any(|t| *t == term))
}

fn same_family(families: &[&[&str]], a: &str, b: &str) -> bool {
    match (family_of(families, a), family_of(families, b)) {
        (Some(fa), Some(fb)) => std::ptr::eq(fa, fb),
        _ => false,
    }
}

/// True when two distinct industries share a family.
pub fn industries_related(a: &str, b: &str) -> bool {
    a != b && same_family(INDUSTRY_FAMILIES, a, b)
}

/// True when two distinct role types share a category.
pub fn roles_adjacent(a: &str, b: &str) -> bool {
    a != b && same_family(ROLE_FAMILIES, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_industries() {
        assert!(industries_related("fintech", "banking"));
        assert!(!industries_related("fintech", "gaming"));
    }

    #[test]
    fn test_identical_industry_is_not_related() {
        assert!(!industries_related("fintech", "fintech"));
    }

    #[test]
    fn test_unknown_industry_has_no_family() {
        assert!(!industries_related("underwater basket weaving", "fintech"));
    }

    #[test]
    fn test_adjacent_roles() {
        assert!(roles_adjacent("backend_engineer", "platform_engineer"));
        assert!(roles_adjacent("engineering_manager", "cto"));
        assert!(!roles_adjacent("backend_engineer", "product_manager"));
    }
}
