use crate::walker::IncludedFile;

pub const HEADER_PREFIX: &str = "File: ";
pub const FILE_SEPARATOR: &str = "\n\n";

// "File: " plus the newline closing the header.
const HEADER_OVERHEAD: usize = HEADER_PREFIX.len() + 1;

/// Renders included files as `File: <path>\n<content>` blocks separated by a
/// blank line.
pub struct Formatter {
    files: Vec<IncludedFile>,
}

impl Formatter {
    pub fn new(files: Vec<IncludedFile>) -> Self {
        Formatter { files }
    }

    pub fn files(&self) -> &[IncludedFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<IncludedFile> {
        self.files
    }

    /// Content bytes are copied verbatim; there is no separator after the
    /// last file.
    pub fn render(&self) -> Vec<u8> {
        let capacity = self
            .files
            .iter()
            .map(|f| HEADER_OVERHEAD + f.relative_path().len() + f.content().len())
            .sum::<usize>()
            + FILE_SEPARATOR.len() * self.files.len().saturating_sub(1);

        let mut out = Vec::with_capacity(capacity);
        for (i, file) in self.files.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(FILE_SEPARATOR.as_bytes());
            }
            out.extend_from_slice(HEADER_PREFIX.as_bytes());
            out.extend_from_slice(file.relative_path().as_bytes());
            out.push(b'\n');
            out.extend_from_slice(file.content());
        }
        out
    }

    /// Rough token count: rendered bytes (headers plus content, separators
    /// excluded) divided by four. This is a heuristic and does not reflect
    /// any real tokenizer.
    pub fn estimate_tokens(&self) -> usize {
        self.files
            .iter()
            .map(estimate_file_chars)
            .sum::<usize>()
            / 4
    }
}

/// Header plus content length of a single file, in bytes.
pub fn estimate_file_chars(file: &IncludedFile) -> usize {
    file.relative_path().len() + HEADER_OVERHEAD + file.content().len()
}
