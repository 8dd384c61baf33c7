//! Route matching logic.
//!
//! # Responsibilities
//! - Normalize configured path patterns ("/users/**" → "/users")
//! - Match path prefixes on segment boundaries
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - "/users" matches "/users" and "/users/42" but not "/usersettings"
//! - No regex to guarantee O(n) matching

/// Turn a configured pattern into a bare prefix.
///
/// Trailing `/**`, `/*` and `/` are removed; the root pattern stays "/".
pub fn normalize_pattern(pattern: &str) -> String {
    let trimmed = pattern
        .trim()
        .trim_end_matches("**")
        .trim_end_matches('*')
        .trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Matches the request path against a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a matcher from a configured pattern.
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            prefix: normalize_pattern(pattern.as_ref()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns true if `path` is the prefix itself or lies beneath it.
    pub fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_pattern("/users/**"), "/users");
        assert_eq!(normalize_pattern("/users/*"), "/users");
        assert_eq!(normalize_pattern("/users/"), "/users");
        assert_eq!(normalize_pattern("/users"), "/users");
        assert_eq!(normalize_pattern("/**"), "/");
        assert_eq!(normalize_pattern("/"), "/");
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/users/**");

        assert!(matcher.matches("/users"));
        assert!(matcher.matches("/users/"));
        assert!(matcher.matches("/users/42"));
        assert!(matcher.matches("/users/42/history"));
        assert!(!matcher.matches("/usersettings"));
        assert!(!matcher.matches("/videos/7"));
        assert!(!matcher.matches("/Users/42")); // Case sensitive
    }

    #[test]
    fn test_root_matcher() {
        let matcher = PathPrefixMatcher::new("/**");
        assert!(matcher.matches("/"));
        assert!(matcher.matches("/anything/at/all"));
    }
}
