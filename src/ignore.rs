use glob::{MatchOptions, Pattern};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

pub const IGNORE_FILE_NAME: &str = ".gitignore";

// `*` and `?` never cross a `/`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Which directories' rules are evaluated during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleScope {
    /// Every directory's rules apply to its own subtree.
    #[default]
    Nested,
    /// Nested ignore files are still loaded, but only the root's rules are
    /// evaluated.
    RootOnly,
}

/// A single ignore rule.
///
/// A trailing `/` is dropped, so `build/` matches a file named `build` as
/// well as a directory. A leading `/` anchors the rule to the directory that
/// owns it. Rules containing a `/` are matched against the whole relative
/// path, bare names against each path segment.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    raw: String,
    glob: Pattern,
    anchored: bool,
    contains_slash: bool,
}

impl IgnorePattern {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.strip_suffix('/').unwrap_or(raw);
        let (body, anchored) = match trimmed.strip_prefix('/') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };

        match Pattern::new(&restrict_glob_syntax(body)) {
            Ok(glob) => Some(IgnorePattern {
                raw: raw.to_string(),
                glob,
                anchored,
                contains_slash: body.contains('/'),
            }),
            Err(e) => {
                warn!("Invalid ignore pattern '{}': {}", raw, e);
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn contains_slash(&self) -> bool {
        self.contains_slash
    }

    /// `relative_path` is `/`-separated and relative to the directory that
    /// owns this rule.
    pub fn matches(&self, relative_path: &str) -> bool {
        if self.anchored || self.contains_slash {
            return self.glob.matches_with(relative_path, MATCH_OPTIONS);
        }
        relative_path
            .split('/')
            .any(|segment| self.glob.matches_with(segment, MATCH_OPTIONS))
    }
}

/// Reduces a pattern to the supported subset: `[` and `]` become literals
/// and runs of `*` collapse into one.
fn restrict_glob_syntax(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut previous_star = false;
    for c in body.chars() {
        match c {
            '*' if previous_star => continue,
            '[' => out.push_str("[[]"),
            ']' => out.push_str("[]]"),
            _ => out.push(c),
        }
        previous_star = c == '*';
    }
    out
}

/// Parses ignore-file contents: one pattern per line, surrounding whitespace
/// trimmed, blank lines and `#` comments skipped.
pub fn parse_patterns(contents: &str) -> Vec<IgnorePattern> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(IgnorePattern::new)
        .collect()
}

/// Rules loaded during one walk, keyed by the directory that owns them.
///
/// A directory without an ignore file, with an unreadable one, or with one
/// holding only comments has no entry.
#[derive(Debug, Default)]
pub struct IgnoreRuleSet {
    rules: HashMap<PathBuf, Vec<IgnorePattern>>,
}

impl IgnoreRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `dir/.gitignore` unless `dir` already has rules. Returns whether
    /// `dir` owns any rules afterwards.
    pub fn load_dir(&mut self, dir: &Path) -> bool {
        if self.rules.contains_key(dir) {
            return true;
        }

        let ignore_path = dir.join(IGNORE_FILE_NAME);
        let bytes = match fs::read(&ignore_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                trace!("No ignore rules at {}: {}", ignore_path.display(), e);
                return false;
            }
        };

        let patterns = parse_patterns(&String::from_utf8_lossy(&bytes));
        debug!(
            "Loaded {} ignore patterns from {}",
            patterns.len(),
            ignore_path.display()
        );
        self.extend(dir, patterns)
    }

    /// Appends patterns to `dir`'s rules, as if they came from its ignore file.
    pub fn extend(&mut self, dir: &Path, patterns: Vec<IgnorePattern>) -> bool {
        if !patterns.is_empty() {
            self.rules
                .entry(dir.to_path_buf())
                .or_default()
                .extend(patterns);
        }
        self.rules.contains_key(dir)
    }

    pub fn rules_for(&self, dir: &Path) -> Option<&[IgnorePattern]> {
        self.rules.get(dir).map(Vec::as_slice)
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.rules.contains_key(dir)
    }

    /// Checks `relative_path` (relative to `owner`) against `owner`'s rules.
    pub fn is_ignored(&self, owner: &Path, relative_path: &str) -> bool {
        self.rules_for(owner)
            .map(|patterns| patterns.iter().any(|p| p.matches(relative_path)))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
