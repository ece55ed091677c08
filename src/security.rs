//! Clipboard access.

use crate::error::{Result, VaultError};
use copypasta::{ClipboardContext, ClipboardProvider};
use tracing::warn;

/// Destination for secrets copied by the `copy` command.
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// The operating system clipboard.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        let mut ctx = ClipboardContext::new().map_err(|e| {
            warn!(error = %e, "clipboard unavailable");
            VaultError::ClipboardFailed
        })?;

        ctx.set_contents(text.to_string())
            .map_err(|_| VaultError::ClipboardFailed)?;

        Ok(())
    }
}
