use crate::ignore::RuleScope;
use std::path::PathBuf;

/// Everything a single pack run needs. Built from the command line by the
/// binary; library callers can start from `PackConfig::default()`.
#[derive(Debug, Clone)]
pub struct PackConfig {
    pub root: PathBuf,
    /// Treated like extra lines of the root `.gitignore`.
    pub extra_patterns: Vec<String>,
    pub scope: RuleScope,
    pub copy: bool,
    pub output: Option<PathBuf>,
    pub estimate: bool,
    pub verbose: bool,
    /// Model whose BPE encoding is reported next to the heuristic estimate.
    pub model: Option<String>,
}

impl Default for PackConfig {
    fn default() -> Self {
        PackConfig {
            root: PathBuf::from("."),
            extra_patterns: Vec::new(),
            scope: RuleScope::Nested,
            copy: false,
            output: None,
            estimate: false,
            verbose: false,
            model: None,
        }
    }
}
