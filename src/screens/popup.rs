//! Popup screen - editable page link with a copy button.

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use ratatui_garnish::{shadow::HalfShadow, GarnishableWidget, Padding};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::error;

use crate::models::Tab;
use crate::services::Clipboard;

use super::{Screen, ScreenAction};

/// How long the button reads "Copied!" before it can copy again.
const COPIED_FEEDBACK: Duration = Duration::from_millis(1000);

/// Popup pre-filled with the page's Markdown link.
pub struct PopupScreen {
    tab: Tab,
    clipboard: Arc<dyn Clipboard>,
    text: String,
    copied_at: Option<Instant>,
}

impl PopupScreen {
    pub fn new(tab: Tab, text: String, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            tab,
            clipboard,
            text,
            copied_at: None,
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    fn showing_copied(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPIED_FEEDBACK)
    }

    async fn copy(&mut self) -> ScreenAction {
        if self.showing_copied() {
            return ScreenAction::None;
        }

        match self.clipboard.write_text(&self.tab, &self.text).await {
            Ok(()) => {
                self.copied_at = Some(Instant::now());
                ScreenAction::StatusMessage("Copied!".to_string())
            }
            Err(e) => {
                error!(error = %e, "clipboard write failed");
                ScreenAction::StatusMessage(format!("Copy failed: {}", e))
            }
        }
    }
}

#[async_trait]
impl Screen for PopupScreen {
    fn title(&self) -> &str {
        "Copy Markdown Link"
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("Enter", "Copy"), ("Esc", "Quit")]
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Link input
                Constraint::Length(1), // Spacer
                Constraint::Length(3), // Button
                Constraint::Min(0),
            ])
            .split(area);

        let input = Paragraph::new(format!("{}▏", self.text))
            .block(Block::default().borders(Borders::ALL).title("Markdown"))
            .style(Style::default().fg(Color::White));
        f.render_widget(input, chunks[0]);

        let (label, style) = if self.showing_copied() {
            (
                "Copied!",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("Copy", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        };

        let button_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(16), Constraint::Min(0)])
            .split(chunks[2])[0];
        let button = Paragraph::new(label)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
            .style(style);
        let garnished = button
            .garnish(Padding::horizontal(1))
            .garnish(HalfShadow::default());
        f.render_widget(garnished, button_area);
    }

    async fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Enter => self.copy().await,
            KeyCode::Esc => ScreenAction::Quit,
            KeyCode::Backspace => {
                self.text.pop();
                ScreenAction::None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.push(c);
                ScreenAction::None
            }
            _ => ScreenAction::None,
        }
    }
}
