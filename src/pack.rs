use crate::config::PackConfig;
use crate::copy::{ClipboardCopier, SystemClipboardCopier};
use crate::formatter::Formatter;
use crate::reporting::{count_model_tokens, format_token_estimate, print_stats};
use crate::utils::resolve_output_path;
use crate::walker::{IncludedFile, Walker};
use crate::PackError;
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use tracing::{debug, warn};

/// The three outputs of a pack: the files, their rendering and the token
/// estimate.
#[derive(Debug)]
pub struct PackedContext {
    pub files: Vec<IncludedFile>,
    pub rendered: Vec<u8>,
    pub token_estimate: usize,
}

impl PackedContext {
    /// The rendering as a string, replacing invalid UTF-8. Used for sinks
    /// that only take text.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.rendered)
    }
}

/// Walks `config.root` and renders the result. Prints nothing.
pub fn pack_directory(config: &PackConfig) -> Result<PackedContext, PackError> {
    let walker = Walker::new(&config.root, &config.extra_patterns)?.with_scope(config.scope);
    debug!(
        "Packing {} with {:?} rule scope",
        walker.root().display(),
        walker.scope()
    );

    let formatter = Formatter::new(walker.walk()?);
    let rendered = formatter.render();
    let token_estimate = formatter.estimate_tokens();

    Ok(PackedContext {
        files: formatter.into_files(),
        rendered,
        token_estimate,
    })
}

pub fn run(config: &PackConfig) -> Result<(), PackError> {
    let stdout = io::stdout();
    run_with(config, &SystemClipboardCopier, &mut stdout.lock())
}

/// Packs and delivers the result: to `config.output` if set, else to the
/// clipboard with `config.copy`, else to `stdout`. `--estimate` on its own
/// suppresses stdout.
pub fn run_with<C: ClipboardCopier, W: Write>(
    config: &PackConfig,
    copier: &C,
    stdout: &mut W,
) -> Result<(), PackError> {
    let packed = pack_directory(config)?;

    if config.verbose {
        print_stats(&packed.files);
    }

    if config.estimate {
        let model_count = match config.model.as_deref() {
            Some(model) => {
                Some((model, count_model_tokens(model, &packed.text())?))
            }
            None => None,
        };
        eprintln!("{}", format_token_estimate(packed.token_estimate, model_count));
    }

    if let Some(output) = &config.output {
        let path = resolve_output_path(output)?;
        fs::write(&path, &packed.rendered).map_err(|source| PackError::OutputWriteError {
            path: path.clone(),
            source,
        })?;
        eprintln!("Done! Context written to {}", path.display());
    } else if config.copy {
        match copier.copy_to_clipboard(packed.text().into_owned()) {
            Ok(()) => eprintln!("Done! Context packed to clipboard."),
            Err(e) => {
                warn!("Failed to copy to clipboard ({}). Printing to terminal instead.", e);
                stdout
                    .write_all(&packed.rendered)
                    .map_err(PackError::StdoutWriteError)?;
            }
        }
    } else if !config.estimate || config.verbose {
        stdout
            .write_all(&packed.rendered)
            .map_err(PackError::StdoutWriteError)?;
    }

    stdout.flush().map_err(PackError::StdoutWriteError)
}
