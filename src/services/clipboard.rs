//! Clipboard operations.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::models::Tab;

/// Host capability for writing text to the clipboard on behalf of a page.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, tab: &Tab, text: &str) -> Result<()>;
}

/// The desktop clipboard. It has no notion of tabs, so the scope is ignored.
#[derive(Debug, Default)]
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, _tab: &Tab, text: &str) -> Result<()> {
        copy_to_clipboard(text)
    }
}

/// Copy text to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to access system clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to copy text to clipboard")?;
    Ok(())
}
