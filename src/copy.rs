use crate::PackError;
use arboard::Clipboard;
use tracing::{debug, info};

pub trait ClipboardCopier {
    fn copy_to_clipboard(&self, text: String) -> Result<(), PackError>;
}

/// Copies through the system clipboard.
pub struct SystemClipboardCopier;

impl ClipboardCopier for SystemClipboardCopier {
    fn copy_to_clipboard(&self, text: String) -> Result<(), PackError> {
        debug!("Initializing clipboard");
        let mut clipboard =
            Clipboard::new().map_err(|e| PackError::ClipboardInitError(e.to_string()))?;

        let length = text.len();
        clipboard
            .set_text(text)
            .map_err(|e| PackError::ClipboardWriteError(e.to_string()))?;

        info!("Copied {} bytes to clipboard", length);
        Ok(())
    }
}
