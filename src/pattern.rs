use regex::{Regex, RegexBuilder};
use std::path::{Component, Path};

/// Number of trailing path segments compared alongside the base name.
const FRAGMENT_SEGMENTS: usize = 3;

#[derive(Debug, thiserror::Error)]
#[error("invalid file pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A single user-supplied file pattern.
///
/// Patterns containing `*` are globs: each `*` becomes `.*` and the result is
/// compiled as a case-insensitive regex anchored to the whole key
/// (`^(?:...)$`). Anchoring is deliberate and stricter than an unanchored
/// search: `test*` matches `test_utils.rs` but not `mytest.rs`, and `*.mdc`
/// does not match `rules.mdc.bak`. No other character is escaped, so `.` in
/// `*.rs` still matches any character. Anything else is a case-insensitive
/// substring test.
#[derive(Debug, Clone)]
pub enum FilePattern {
    Glob { source: String, regex: Regex },
    Literal { source: String, lowered: String },
}

impl FilePattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.contains('*') {
            let regex_pattern = format!("^(?:{})$", pattern.replace('*', ".*"));
            let regex = RegexBuilder::new(&regex_pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| PatternError {
                    pattern: pattern.to_string(),
                    source,
                })?;
            Ok(FilePattern::Glob {
                source: pattern.to_string(),
                regex,
            })
        } else {
            Ok(FilePattern::Literal {
                source: pattern.to_string(),
                lowered: pattern.to_lowercase(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilePattern::Glob { source, .. } | FilePattern::Literal { source, .. } => source,
        }
    }

    fn matches_keys(&self, keys: &MatchKeys) -> bool {
        match self {
            FilePattern::Glob { regex, .. } => {
                regex.is_match(&keys.base_name) || regex.is_match(&keys.fragment)
            }
            FilePattern::Literal { lowered, .. } => {
                keys.base_name.to_lowercase().contains(lowered.as_str())
                    || keys.fragment.to_lowercase().contains(lowered.as_str())
            }
        }
    }
}

struct MatchKeys {
    base_name: String,
    fragment: String,
}

impl MatchKeys {
    fn from_path(path: &Path) -> Self {
        let segments: Vec<String> = path
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let base_name = segments.last().cloned().unwrap_or_default();
        let start = segments.len().saturating_sub(FRAGMENT_SEGMENTS);
        let fragment = segments[start..].join("/");

        Self { base_name, fragment }
    }
}

/// The compiled set of patterns requested for one run.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<FilePattern>,
}

impl PatternSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| FilePattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.patterns.iter().map(FilePattern::as_str).collect()
    }

    /// True when any pattern matches the file's base name or its last three
    /// path segments. An empty set matches nothing.
    pub fn matches(&self, file_path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let keys = MatchKeys::from_path(file_path);
        self.patterns.iter().any(|p| p.matches_keys(&keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn set(patterns: &[&str]) -> PatternSet {
        PatternSet::new(patterns).unwrap()
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let patterns = set(&[]);
        assert!(!patterns.matches(Path::new("/tmp/repo/README.md")));
        assert!(!patterns.matches(Path::new("/")));
    }

    #[test]
    fn test_literal_base_name_is_case_insensitive() {
        let patterns = set(&["Makefile"]);
        assert!(patterns.matches(Path::new("/work/owner-repo/makefile")));
        assert!(patterns.matches(Path::new("/work/owner-repo/build/MAKEFILE")));
    }

    #[test]
    fn test_literal_substring() {
        let patterns = set(&["cursor"]);
        assert!(patterns.matches(Path::new("/w/r/.cursorrules")));
        assert!(!patterns.matches(Path::new("/w/r/src/main.rs")));
    }

    #[test]
    fn test_literal_matches_relative_fragment() {
        let patterns = set(&["rules/core"]);
        assert!(patterns.matches(Path::new("/w/repo/.cursor/rules/core.mdc")));
        // Only the final three segments take part in the comparison.
        let patterns = set(&["repo/.cursor"]);
        assert!(!patterns.matches(Path::new("/w/repo/.cursor/rules/core.mdc")));
    }

    #[test]
    fn test_glob_extension() {
        let patterns = set(&["*.mdc"]);
        assert!(patterns.matches(Path::new("/w/r/.cursor/rules/rules.mdc")));
        assert!(patterns.matches(Path::new("/w/r/RULES.MDC")));
        assert!(!patterns.matches(Path::new("/w/r/rules.md")));
    }

    #[test]
    fn test_glob_against_fragment() {
        let patterns = set(&[".github/workflows/*"]);
        assert!(patterns.matches(Path::new("/w/r/.github/workflows/ci.yml")));
        assert!(!patterns.matches(Path::new("/w/r/.github/ci.yml")));
    }

    #[test]
    fn test_glob_dot_is_not_escaped() {
        // `.` keeps its regex meaning, so it matches any character.
        let patterns = set(&["*.zsh"]);
        assert!(patterns.matches(Path::new("/w/r/configzsh")));
    }

    #[test]
    fn test_glob_is_anchored_to_whole_key() {
        let patterns = set(&["test*"]);
        assert!(patterns.matches(Path::new("/w/r/src/test_utils.rs")));
        assert!(!patterns.matches(Path::new("/w/r/src/mytest.rs")));

        let patterns = set(&["*.mdc"]);
        assert!(!patterns.matches(Path::new("/w/r/rules.mdc.bak")));
    }

    #[test]
    fn test_any_pattern_matches() {
        let patterns = set(&["*.zsh", "*.bash"]);
        assert!(patterns.matches(Path::new("/home/x/aliases.bash")));
        assert!(patterns.matches(Path::new("/home/x/prompt.zsh")));
        assert!(!patterns.matches(Path::new("/home/x/init.vim")));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let err = PatternSet::new(&["[*"]).unwrap_err();
        assert_eq!(err.pattern, "[*");
    }

    #[test]
    fn test_sources_preserve_input() {
        let patterns = set(&["*.rs", "README"]);
        assert_eq!(patterns.sources(), vec!["*.rs", "README"]);
        assert_eq!(patterns.len(), 2);
    }

    #[test]
    fn test_short_paths() {
        let patterns = set(&["a.txt"]);
        assert!(patterns.matches(&PathBuf::from("a.txt")));
        assert!(patterns.matches(&PathBuf::from("/a.txt")));
    }
}
