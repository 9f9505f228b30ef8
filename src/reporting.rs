use crate::formatter::estimate_file_chars;
use crate::trie::{Trie, TrieNode};
use crate::utils::format_with_commas;
use crate::walker::IncludedFile;
use crate::PackError;
use tiktoken_rs::get_bpe_from_model;
use tracing::{debug, info};

const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Logs the number of packed files and a tree of their estimated tokens.
pub fn print_stats(files: &[IncludedFile]) {
    info!("Found {} files", files.len());
    for line in stats_tree(files) {
        info!("{}", line);
    }
}

/// Tree of the packed files with per-file and per-directory token estimates.
pub fn stats_tree(files: &[IncludedFile]) -> Vec<String> {
    let mut trie = Trie::new();
    for file in files {
        trie.insert(file.relative_path(), estimate_file_chars(file) / 4);
    }

    let root = trie.get_root();
    let mut lines = vec![format!("Overall ({} tokens)", root.calculate_total_tokens())];
    push_tree(root, "", &mut lines);
    lines
}

fn push_tree(node: &TrieNode, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "┗━━" } else { "┣━━" };

        if child.is_file() {
            lines.push(format!(
                "{}{} {} ({} tokens)",
                prefix,
                connector,
                name,
                child.calculate_total_tokens()
            ));
        } else {
            lines.push(format!(
                "{}{} {}/ ({} tokens)",
                prefix,
                connector,
                name,
                child.calculate_total_tokens()
            ));
            let child_prefix = format!("{}{}   ", prefix, if is_last { " " } else { "┃" });
            push_tree(child, &child_prefix, lines);
        }
    }
}

/// Exact token count of `text` under the BPE encoding of `model`.
pub fn count_model_tokens(model: &str, text: &str) -> Result<usize, PackError> {
    let bpe = get_bpe_from_model(model).map_err(|e| PackError::TokenizerError(e.to_string()))?;
    let count = bpe.encode_ordinary(text).len();
    debug!("{} encodes the packed context as {} tokens", model, count);
    Ok(count)
}

/// The boxed token estimate printed with `--estimate`. When a model count is
/// given it is shown next to the heuristic.
pub fn format_token_estimate(estimate: usize, model_count: Option<(&str, usize)>) -> String {
    let mut message = format!("TOKEN ESTIMATE: ~{} tokens", format_with_commas(estimate));
    if let Some((model, count)) = model_count {
        message.push_str(&format!(" ({}: {})", model, format_with_commas(count)));
    }

    let border = "─".repeat(message.chars().count() + 2);
    format!(
        "{CYAN}{BOLD}┌{border}┐{RESET}\n{CYAN}{BOLD}│ {message} │{RESET}\n{CYAN}{BOLD}└{border}┘{RESET}"
    )
}
