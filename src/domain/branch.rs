/// Placeholder replaced by the created issue key in a branch template.
pub const ISSUE_KEY_PLACEHOLDER: &str = "@";

/// Substitute the first `@` in `template` with the lowercased issue key.
pub fn normalize_branch_name(template: &str, issue_key: &str) -> String {
    template.replacen(ISSUE_KEY_PLACEHOLDER, &issue_key.to_lowercase(), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_without_placeholder_is_unchanged() {
        assert_eq!(normalize_branch_name("feature/test", "issue-1"), "feature/test");
    }

    #[test]
    fn test_placeholder_in_the_middle() {
        assert_eq!(
            normalize_branch_name("feature/@/test", "issue-1"),
            "feature/issue-1/test"
        );
    }

    #[test]
    fn test_only_first_placeholder_is_replaced() {
        assert_eq!(
            normalize_branch_name("@/feature/test/@/@", "issue-1"),
            "issue-1/feature/test/@/@"
        );
    }

    #[test]
    fn test_issue_key_is_lowercased() {
        assert_eq!(normalize_branch_name("@", "PROJ-12"), "proj-12");
    }
}
