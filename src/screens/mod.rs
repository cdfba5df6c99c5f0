//! TUI screens.

pub mod options;
pub mod popup;

pub use options::OptionsScreen;
pub use popup::PopupScreen;

use async_trait::async_trait;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;

/// Action returned by screen key handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenAction {
    /// No action needed.
    None,
    /// Display a status message.
    StatusMessage(String),
    /// Leave the application.
    Quit,
}

/// Trait for screen implementations.
#[async_trait]
pub trait Screen: Send {
    /// Title shown in the header block.
    fn title(&self) -> &str;

    /// Key hints for the status bar, as (key, action) pairs.
    fn hints(&self) -> &'static [(&'static str, &'static str)];

    /// Draw the screen.
    fn draw(&mut self, f: &mut Frame, area: Rect);

    /// Re-read whatever backing state the screen displays.
    async fn refresh(&mut self) {}

    /// Handle a key event.
    async fn handle_key(&mut self, key: KeyEvent) -> ScreenAction;
}
