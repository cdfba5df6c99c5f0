//! Options screen - toggle and cycle every stored option.

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use ratatui_garnish::{shadow::HalfShadow, GarnishableStatefulWidget};

use crate::models::{OptionKey, Options};
use crate::services::OptionStore;

use super::{Screen, ScreenAction};

/// What the screen currently knows about the stored options.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Loading,
    Loaded(Options),
    Failed(String),
}

/// Settings form over the option store.
pub struct OptionsScreen {
    store: OptionStore,
    list_state: ListState,
    load: LoadState,
}

impl OptionsScreen {
    pub fn new(store: OptionStore) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            store,
            list_state,
            load: LoadState::Loading,
        }
    }

    fn selected_key(&self) -> OptionKey {
        let index = self.list_state.selected().unwrap_or(0);
        OptionKey::ALL[index.min(OptionKey::ALL.len() - 1)]
    }

    fn move_up(&mut self) {
        let selected = self.list_state.selected().unwrap_or(0);
        let new_index = if selected == 0 {
            OptionKey::ALL.len() - 1
        } else {
            selected - 1
        };
        self.list_state.select(Some(new_index));
    }

    fn move_down(&mut self) {
        let selected = self.list_state.selected().unwrap_or(0);
        let new_index = if selected >= OptionKey::ALL.len() - 1 {
            0
        } else {
            selected + 1
        };
        self.list_state.select(Some(new_index));
    }

    /// Write the next value of the selected option.
    async fn cycle_selected(&mut self) -> ScreenAction {
        let LoadState::Loaded(options) = &self.load else {
            return ScreenAction::None;
        };
        let key = self.selected_key();
        let setting = options.setting(key).cycled();

        match self.store.set(setting).await {
            Ok(()) => ScreenAction::StatusMessage(format!("{} = {}", key, setting)),
            Err(e) => ScreenAction::StatusMessage(format!("Failed to save {}: {}", key, e)),
        }
    }

    fn option_items(&self, options: &Options) -> Vec<ListItem<'static>> {
        OptionKey::ALL
            .iter()
            .map(|key| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<26}", key.as_str()),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        options.setting(*key).to_string(),
                        Style::default().fg(Color::Cyan),
                    ),
                ]))
            })
            .collect()
    }
}

#[async_trait]
impl Screen for OptionsScreen {
    fn title(&self) -> &str {
        "Copy Markdown Link Options"
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        &[("j/k", "Nav"), ("Space", "Change"), ("q", "Quit")]
    }

    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let options = match &self.load {
            LoadState::Loaded(options) => *options,
            LoadState::Loading => {
                f.render_widget(Paragraph::new("Loading..."), area);
                return;
            }
            LoadState::Failed(message) => {
                let error = Paragraph::new(format!("Error: {}", message))
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true });
                f.render_widget(error, area);
                return;
            }
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(OptionKey::ALL.len() as u16 + 2), // Options list
                Constraint::Length(4),                             // Description
            ])
            .split(area);

        let list = List::new(self.option_items(&options))
            .block(Block::default().borders(Borders::ALL).title("Options"))
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("► ");
        let garnished = GarnishableStatefulWidget::garnish(list, HalfShadow::default());
        f.render_stateful_widget(garnished, chunks[0], &mut self.list_state);

        let key = self.selected_key();
        let description = Paragraph::new(vec![
            Line::from(key.label()),
            Line::from(Span::styled(
                format!("one of: {}", key.domain().join(", ")),
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title("Description"))
        .wrap(Wrap { trim: true });
        f.render_widget(description, chunks[1]);
    }

    async fn refresh(&mut self) {
        self.load = match self.store.get_all().await {
            Ok(options) => LoadState::Loaded(options),
            Err(e) => LoadState::Failed(e.to_string()),
        };
    }

    async fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_up();
                ScreenAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_down();
                ScreenAction::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.cycle_selected().await,
            KeyCode::Esc | KeyCode::Char('q') => ScreenAction::Quit,
            _ => ScreenAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageLinkTarget, OptionSetting, DEFAULT_OPTIONS};
    use crate::services::storage::{KeyValueStore, MemoryStore};
    use anyhow::anyhow;
    use crossterm::event::KeyModifiers;
    use serde_json::{Map, Value};
    use std::sync::Arc;

    struct OfflineStore;

    #[async_trait]
    impl KeyValueStore for OfflineStore {
        async fn get(&self, _keys: &[&str]) -> anyhow::Result<Map<String, Value>> {
            Err(anyhow!("storage disconnected"))
        }

        async fn set(&self, _entries: Map<String, Value>) -> anyhow::Result<()> {
            Err(anyhow!("storage disconnected"))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_starts_loading_then_reads_store() {
        let store = OptionStore::new(Arc::new(MemoryStore::new()));
        let mut screen = OptionsScreen::new(store);
        assert_eq!(screen.load, LoadState::Loading);

        screen.refresh().await;
        assert_eq!(screen.load, LoadState::Loaded(DEFAULT_OPTIONS));
    }

    #[tokio::test]
    async fn test_space_cycles_selected_option() {
        let store = OptionStore::new(Arc::new(MemoryStore::new()));
        let mut screen = OptionsScreen::new(store.clone());
        screen.refresh().await;

        // image-link-target is the fourth entry
        for _ in 0..3 {
            screen.handle_key(key(KeyCode::Down)).await;
        }
        let action = screen.handle_key(key(KeyCode::Char(' '))).await;

        assert_eq!(
            action,
            ScreenAction::StatusMessage("image-link-target = link-to-image".into())
        );
        assert_eq!(
            store.get(OptionKey::ImageLinkTarget).await.unwrap(),
            OptionSetting::ImageLinkTarget(ImageLinkTarget::LinkToImage)
        );
    }

    #[tokio::test]
    async fn test_navigation_wraps() {
        let mut screen = OptionsScreen::new(OptionStore::new(Arc::new(MemoryStore::new())));
        screen.handle_key(key(KeyCode::Up)).await;
        assert_eq!(screen.selected_key(), OptionKey::ActionButton);
        screen.handle_key(key(KeyCode::Down)).await;
        assert_eq!(screen.selected_key(), OptionKey::EnableLink);
    }

    #[tokio::test]
    async fn test_cycle_before_load_does_nothing() {
        let store = OptionStore::new(Arc::new(MemoryStore::new()));
        let mut screen = OptionsScreen::new(store.clone());

        let action = screen.handle_key(key(KeyCode::Enter)).await;
        assert_eq!(action, ScreenAction::None);
        assert_eq!(store.get_all().await.unwrap(), DEFAULT_OPTIONS);
    }

    #[tokio::test]
    async fn test_unreachable_store_shows_error_state() {
        let mut screen = OptionsScreen::new(OptionStore::new(Arc::new(OfflineStore)));
        screen.refresh().await;

        match &screen.load {
            LoadState::Failed(message) => assert!(message.contains("storage disconnected")),
            other => panic!("expected an error state, got {:?}", other),
        }
        assert_ne!(screen.load, LoadState::Loading);

        let action = screen.handle_key(key(KeyCode::Char(' '))).await;
        assert_eq!(action, ScreenAction::None);
    }
}
