use crate::PackError;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_OUTPUT_FILE: &str = "context.txt";

/// Joins the normal components of `path` with `/`, whatever the host
/// separator is.
pub fn normalize_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `path` relative to `base`, `/`-separated. `None` when `path` is not under
/// `base`; the empty string when they are equal.
pub fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    path.strip_prefix(base).ok().map(normalize_path)
}

pub fn format_with_commas(num: usize) -> String {
    let digits = num.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Picks the file the packed context is written to.
///
/// An existing directory gets [`DEFAULT_OUTPUT_FILE`] appended. A path that
/// does not exist yet has its parent directories created. An existing file is
/// returned unchanged and will be overwritten.
pub fn resolve_output_path(output: &Path) -> Result<PathBuf, PackError> {
    match fs::metadata(output) {
        Ok(metadata) if metadata.is_dir() => Ok(output.join(DEFAULT_OUTPUT_FILE)),
        Ok(_) => Ok(output.to_path_buf()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| PackError::OutputWriteError {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            Ok(output.to_path_buf())
        }
        Err(source) => Err(PackError::OutputWriteError {
            path: output.to_path_buf(),
            source,
        }),
    }
}
