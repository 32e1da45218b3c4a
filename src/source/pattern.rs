//! Glob pattern set shared by file sources

use std::collections::HashSet;
use std::path::Path;

use wax::{CandidatePath, Glob, Pattern};

use crate::source::error::SourceError;

/// Characters that start a wildcard, class, alternative or repetition in wax syntax
const GLOB_META: &[char] = &['*', '?', '[', '{', '<', '!', '\\'];

/// One or more glob patterns, validated at construction.
///
/// Patterns are relative to the tracked root and always match against
/// forward-slash separated relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<String>,
}

/// A directory to walk for candidates and how deep matches can lie below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkRoot {
    /// Literal leading directories of one or more patterns, relative to the root
    pub prefix: String,
    /// `None` when some pattern under this prefix can match at any depth
    pub max_depth: Option<usize>,
}

impl PatternSet {
    /// Build a pattern set, rejecting empty sets, patterns that leave the
    /// root and patterns wax cannot compile
    pub fn new<I, S>(patterns: I) -> Result<Self, SourceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        if patterns.is_empty() {
            return Err(SourceError::InvalidPattern {
                pattern: String::new(),
                message: "at least one pattern is required".to_string(),
            });
        }

        for pattern in &patterns {
            let normalized = normalize_pattern(pattern);
            if normalized.starts_with('/') || Path::new(normalized).is_absolute() {
                return Err(SourceError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: "patterns must be relative to the root".to_string(),
                });
            }
            if normalized.split('/').any(|segment| segment == "..") {
                return Err(SourceError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: "`..` segments are not supported, set the root instead".to_string(),
                });
            }
            Glob::new(normalized).map_err(|e| SourceError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(Self { patterns })
    }

    /// The patterns as given
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Directories (relative to the root) that can contain matches.
    ///
    /// Each prefix is the literal leading part of a pattern, so a walk never
    /// has to descend into unrelated parts of the tree. Patterns without a
    /// recursive wildcard also bound the walk depth below their prefix.
    pub fn walk_roots(&self) -> Vec<WalkRoot> {
        let mut roots: Vec<WalkRoot> = Vec::new();
        for pattern in &self.patterns {
            let pattern = normalize_pattern(pattern);
            let prefix = literal_prefix(pattern);
            let max_depth = match_depth(pattern, prefix);

            match roots.iter_mut().find(|root| root.prefix == prefix) {
                Some(root) => {
                    root.max_depth = root.max_depth.zip(max_depth).map(|(a, b)| a.max(b));
                }
                None => roots.push(WalkRoot {
                    prefix: prefix.to_string(),
                    max_depth,
                }),
            }
        }
        roots
    }

    /// Select the candidates matched by the set, in resolution order.
    ///
    /// Matches of each pattern are sorted lexicographically and the patterns
    /// are concatenated in order. A candidate matched by several patterns
    /// keeps its first position.
    pub fn select<'a, I>(&self, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut candidates: Vec<&str> = candidates.into_iter().collect();
        candidates.sort_unstable();
        candidates.dedup();

        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for pattern in &self.patterns {
            // Validated in `new`
            let Ok(glob) = Glob::new(normalize_pattern(pattern)) else {
                continue;
            };
            for candidate in &candidates {
                if glob.matched(&CandidatePath::from(*candidate)).is_some()
                    && seen.insert(*candidate)
                {
                    selected.push((*candidate).to_string());
                }
            }
        }

        selected
    }
}

/// Convert a path to a forward-slash separated string for matching
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn normalize_pattern(pattern: &str) -> &str {
    pattern.trim_start_matches("./")
}

/// Leading directory components of a pattern that contain no glob syntax
fn literal_prefix(pattern: &str) -> &str {
    let literal_end = pattern.find(GLOB_META).unwrap_or(pattern.len());
    match pattern[..literal_end].rfind('/') {
        Some(slash) => &pattern[..slash],
        None => "",
    }
}

/// Number of path components a match has below `prefix`, if bounded
fn match_depth(pattern: &str, prefix: &str) -> Option<usize> {
    let rest = pattern[prefix.len()..].trim_start_matches('/');
    if rest.contains("**") {
        return None;
    }

    // Alternatives and repetitions may span separators
    let mut nesting = 0usize;
    for c in rest.chars() {
        match c {
            '{' | '<' => nesting += 1,
            '}' | '>' => nesting = nesting.saturating_sub(1),
            '/' if nesting > 0 => return None,
            _ => {}
        }
    }

    Some(rest.split('/').count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("packages/*/config.toml", "packages")]
    #[case("packages/core/config.toml", "packages/core")]
    #[case("docs/packages/**/package.json", "docs/packages")]
    #[case("*/config.toml", "")]
    #[case("config.toml", "")]
    #[case("packages/{a,b}/config.toml", "packages")]
    fn literal_prefix_returns_expected(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(literal_prefix(pattern), expected);
    }

    #[test]
    fn new_rejects_empty_set() {
        let result = PatternSet::new(Vec::<String>::new());
        assert!(matches!(result, Err(SourceError::InvalidPattern { .. })));
    }

    #[test]
    fn new_rejects_unbalanced_class() {
        let result = PatternSet::new(["packages/[a/config.toml"]);
        assert!(matches!(result, Err(SourceError::InvalidPattern { .. })));
    }

    #[rstest]
    #[case("/repo/packages/*/config.toml")]
    #[case("packages/../*/config.toml")]
    #[case("../shared/*/config.toml")]
    fn new_rejects_patterns_leaving_the_root(#[case] pattern: &str) {
        let result = PatternSet::new([pattern]);
        match result {
            Err(SourceError::InvalidPattern { pattern: rejected, .. }) => {
                assert_eq!(rejected, pattern)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    #[case("packages/*/config.toml", Some(2))]
    #[case("packages/core/config.toml", Some(1))]
    #[case("config.toml", Some(1))]
    #[case("*/*/config.toml", Some(3))]
    #[case("packages/{a,b}/config.toml", Some(2))]
    #[case("packages/{a,b/c}/config.toml", None)]
    #[case("docs/**/package.json", None)]
    fn match_depth_is_bounded_without_recursive_wildcard(
        #[case] pattern: &str,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(match_depth(pattern, literal_prefix(pattern)), expected);
    }

    #[test]
    fn walk_roots_merges_patterns_sharing_a_prefix() {
        let set = PatternSet::new([
            "packages/*/config.toml",
            "packages/*/*/package.json",
            "tools/**/config.toml",
            "tools/*.toml",
        ])
        .unwrap();

        assert_eq!(
            set.walk_roots(),
            vec![
                WalkRoot {
                    prefix: "packages".to_string(),
                    max_depth: Some(3),
                },
                WalkRoot {
                    prefix: "tools".to_string(),
                    max_depth: None,
                },
            ]
        );
    }

    #[test]
    fn select_matches_single_directory_wildcard() {
        let set = PatternSet::new(["packages/*/config.toml"]).unwrap();

        let selected = set.select([
            "packages/b/config.toml",
            "packages/a/config.toml",
            "packages/a/nested/config.toml",
            "packages/a/other.toml",
            "config.toml",
        ]);

        assert_eq!(
            selected,
            vec!["packages/a/config.toml", "packages/b/config.toml"]
        );
    }

    #[test]
    fn select_orders_by_pattern_then_path_and_deduplicates() {
        let set = PatternSet::new(["tools/*/config.toml", "*/*/config.toml"]).unwrap();

        let selected = set.select([
            "packages/a/config.toml",
            "tools/z/config.toml",
            "tools/b/config.toml",
        ]);

        assert_eq!(
            selected,
            vec![
                "tools/b/config.toml",
                "tools/z/config.toml",
                "packages/a/config.toml",
            ]
        );
    }

    #[test]
    fn select_accepts_leading_dot_slash() {
        let set = PatternSet::new(["./packages/*/config.toml"]).unwrap();

        assert_eq!(
            set.select(["packages/a/config.toml"]),
            vec!["packages/a/config.toml"]
        );
        assert_eq!(
            set.walk_roots(),
            vec![WalkRoot {
                prefix: "packages".to_string(),
                max_depth: Some(2),
            }]
        );
    }

    #[test]
    fn to_forward_slashes_normalizes_separators() {
        assert_eq!(
            to_forward_slashes(Path::new("packages\\a\\config.toml")),
            "packages/a/config.toml"
        );
    }
}
