//! Terminal application shell and event loop.

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::models::Tab;
use crate::screens::{OptionsScreen, PopupScreen, Screen, ScreenAction};
use crate::services::{Clipboard, OptionStore};

/// Application state.
pub struct App {
    screen: Box<dyn Screen>,
    should_quit: bool,

    // Status bar info
    status_message: String,
}

impl App {
    /// Application showing the popup for `tab`.
    pub fn popup(tab: Tab, text: String, clipboard: Arc<dyn Clipboard>) -> Self {
        Self::with_screen(Box::new(PopupScreen::new(tab, text, clipboard)))
    }

    /// Application showing the options form.
    pub fn options(store: OptionStore) -> Self {
        Self::with_screen(Box::new(OptionsScreen::new(store)))
    }

    fn with_screen(screen: Box<dyn Screen>) -> Self {
        Self {
            screen,
            should_quit: false,
            status_message: String::new(),
        }
    }

    /// Run the application.
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.screen.refresh().await;

        // Main event loop
        let result = self.event_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    /// Main event loop.
    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            // Draw UI
            terminal.draw(|f| self.draw(f))?;

            // Poll for events with timeout
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match (key.modifiers, key.code) {
                        (KeyModifiers::CONTROL, KeyCode::Char('c'))
                        | (KeyModifiers::CONTROL, KeyCode::Char('q')) => {
                            self.should_quit = true;
                        }
                        _ => match self.screen.handle_key(key).await {
                            ScreenAction::None => {}
                            ScreenAction::StatusMessage(msg) => self.status_message = msg,
                            ScreenAction::Quit => self.should_quit = true,
                        },
                    }
                    // Re-read after every handled key so the UI never shows stale options
                    self.screen.refresh().await;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Draw the UI.
    fn draw(&mut self, f: &mut ratatui::Frame) {
        use ratatui::layout::{Constraint, Direction, Layout};
        use ratatui::style::{Color, Style};
        use ratatui::text::{Line, Span};
        use ratatui::widgets::{Block, Borders, Paragraph};

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.screen.title().to_string());
        let inner = block.inner(chunks[0]);
        f.render_widget(block, chunks[0]);
        self.screen.draw(f, inner);

        // Status bar
        let mut spans = vec![
            Span::raw(" "),
            Span::styled(self.status_message.clone(), Style::default().fg(Color::Gray)),
        ];
        for (key, action) in self.screen.hints() {
            spans.push(Span::raw(" │ "));
            spans.push(Span::styled(*key, Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(format!(" {}", action), Style::default().fg(Color::Gray)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
    }
}
