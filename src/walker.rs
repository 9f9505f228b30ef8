use crate::ignore::{parse_patterns, IgnoreRuleSet, RuleScope};
use crate::sniff::{classify_file, FileClass};
use crate::utils::relative_slash_path;
use crate::PackError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

pub const GIT_DIR: &str = ".git";

/// A text file that passed every filter, with its full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedFile {
    relative_path: String,
    content: Vec<u8>,
}

impl IncludedFile {
    pub fn new(relative_path: impl Into<String>, content: Vec<u8>) -> Self {
        IncludedFile {
            relative_path: relative_path.into(),
            content,
        }
    }

    /// Path relative to the walk root, `/`-separated.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Depth-first walk of a directory tree that honours `.gitignore` files and
/// skips binary files.
pub struct Walker {
    root: PathBuf,
    extra_patterns: Vec<String>,
    scope: RuleScope,
}

impl Walker {
    /// Resolves `root` to an absolute path. `extra_patterns` are treated as if
    /// they were lines of the root's `.gitignore`.
    ///
    /// `..` components are kept, not cleaned lexically, so `missing/..` fails
    /// at walk time when `missing` does not exist.
    pub fn new<P: AsRef<Path>>(root: P, extra_patterns: &[String]) -> Result<Self, PackError> {
        let root = root.as_ref();
        let root = if root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            root
        };
        let absolute = std::path::absolute(root).map_err(|source| PackError::RootResolution {
            path: root.to_path_buf(),
            source,
        })?;
        debug!("Resolved root {} to {}", root.display(), absolute.display());

        Ok(Walker {
            root: absolute,
            extra_patterns: extra_patterns.to_vec(),
            scope: RuleScope::default(),
        })
    }

    pub fn with_scope(mut self, scope: RuleScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scope(&self) -> RuleScope {
        self.scope
    }

    /// Collects every included file in pre-order, siblings sorted by name.
    ///
    /// Any error while listing directories or reading an included file aborts
    /// the walk; no partial result is returned. Entries that vanish between
    /// listing and stat are skipped.
    pub fn walk(&self) -> Result<Vec<IncludedFile>, PackError> {
        let mut rules = IgnoreRuleSet::new();
        rules.load_dir(&self.root);
        rules.extend(&self.root, parse_patterns(&self.extra_patterns.join("\n")));

        // Directories whose rules are in effect, with their walk depth.
        let mut active: Vec<(usize, PathBuf)> = Vec::new();
        let mut files = Vec::new();

        let mut entries = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if is_vanished_entry(err.depth(), err.io_error()) => {
                    debug!("Skipping vanished entry: {}", err);
                    continue;
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    return Err(PackError::Traversal { path, source: err });
                }
            };

            let depth = entry.depth();
            while active.last().is_some_and(|(owner_depth, _)| *owner_depth >= depth) {
                active.pop();
            }

            if depth == 0 {
                if rules.contains(&self.root) {
                    active.push((0, self.root.clone()));
                }
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type();

            if file_type.is_dir() && entry.file_name() == GIT_DIR {
                trace!("Skipping git directory {}", path.display());
                entries.skip_current_dir();
                continue;
            }

            let Some(relative_path) = relative_slash_path(path, &self.root) else {
                continue;
            };

            if is_ignored(&rules, &active, path) {
                debug!("Ignoring {}", relative_path);
                if file_type.is_dir() {
                    entries.skip_current_dir();
                }
                continue;
            }

            if file_type.is_dir() {
                // Rules are stored in both modes; only nested scope applies them.
                if rules.load_dir(path) && self.scope == RuleScope::Nested {
                    active.push((depth, path.to_path_buf()));
                }
                continue;
            }

            if !file_type.is_file() {
                trace!("Skipping non-regular entry {}", relative_path);
                continue;
            }

            if classify_file(path) == FileClass::Binary {
                debug!("Skipping binary file {}", relative_path);
                continue;
            }

            let content = fs::read(path).map_err(|source| PackError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
            trace!("Including {} ({} bytes)", relative_path, content.len());
            files.push(IncludedFile::new(relative_path, content));
        }

        debug!(
            "Walk of {} included {} files, {} directories had ignore rules",
            self.root.display(),
            files.len(),
            rules.len()
        );
        Ok(files)
    }
}

fn is_ignored(rules: &IgnoreRuleSet, active: &[(usize, PathBuf)], path: &Path) -> bool {
    active.iter().any(|(_, owner)| {
        relative_slash_path(path, owner)
            .map(|relative| rules.is_ignored(owner, &relative))
            .unwrap_or(false)
    })
}

/// Whether a walk error means an entry disappeared after its directory was
/// listed. Only entries below the root qualify; a missing root is an error.
pub fn is_vanished_entry(depth: usize, io_error: Option<&io::Error>) -> bool {
    depth > 0 && io_error.is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}
