//! Trigger dispatch: turn a menu click or action click into clipboard text.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::models::{ActionButton, ClickInfo, Options, SelectionContext, Tab, TriggerKind};

use super::clipboard::Clipboard;
use super::formatter::{format_image, format_link, format_page};
use super::option_store::{OptionStore, StoreError};
use super::privacy::remove_tracking;

/// A discrete user action delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A context-menu entry was clicked.
    MenuClick { info: ClickInfo, tab: Option<Tab> },
    /// The toolbar action button was clicked.
    ActionClick { tab: Option<Tab> },
}

/// Why a trigger ended without touching the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    UnknownMenuItem(String),
    MissingTab,
    MissingPageUrl,
    Disabled(TriggerKind),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMenuItem(id) => write!(f, "unknown menu item '{}'", id),
            Self::MissingTab => f.write_str("tab is not found"),
            Self::MissingPageUrl => f.write_str("tab has no URL"),
            Self::Disabled(kind) => write!(f, "{:?} copying is disabled", kind),
        }
    }
}

/// Result of handling one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The text was written to the clipboard.
    Copied(String),
    /// The action button is set to open the popup, pre-filled with this text.
    ShowPopup(String),
    Aborted(AbortReason),
    /// Formatting succeeded but the clipboard write failed. Not retried.
    ClipboardFailed(String),
}

/// Routes triggers through the option store, formatter and clipboard.
pub struct Dispatcher {
    store: OptionStore,
    clipboard: Arc<dyn Clipboard>,
    tracking_params: Vec<String>,
}

impl Dispatcher {
    pub fn new(store: OptionStore, clipboard: Arc<dyn Clipboard>, tracking_params: Vec<String>) -> Self {
        Self {
            store,
            clipboard,
            tracking_params,
        }
    }

    /// Handle one trigger to completion.
    ///
    /// Missing context and clipboard failures are logged and reported in the
    /// outcome. Only storage failures are returned as errors.
    pub async fn dispatch(&self, trigger: Trigger) -> Result<DispatchOutcome, StoreError> {
        debug!(?trigger, "dispatching trigger");
        match trigger {
            Trigger::MenuClick { info, tab } => self.on_menu_click(info, tab).await,
            Trigger::ActionClick { tab } => self.on_action_click(tab).await,
        }
    }

    async fn on_menu_click(&self, info: ClickInfo, tab: Option<Tab>) -> Result<DispatchOutcome, StoreError> {
        let Some(kind) = TriggerKind::from_menu_item_id(&info.menu_item_id) else {
            return Ok(abort(AbortReason::UnknownMenuItem(info.menu_item_id)));
        };
        let Some(tab) = tab else {
            return Ok(abort(AbortReason::MissingTab));
        };
        let Some(selection) = SelectionContext::from_click(kind, &info, &tab) else {
            return Ok(abort(AbortReason::MissingPageUrl));
        };

        let options = self.store.get_all().await?;
        if !kind.is_enabled(&options) {
            return Ok(abort(AbortReason::Disabled(kind)));
        }

        let text = self.render(selection, &options);
        Ok(self.copy(&tab, text).await)
    }

    async fn on_action_click(&self, tab: Option<Tab>) -> Result<DispatchOutcome, StoreError> {
        let Some(tab) = tab else {
            return Ok(abort(AbortReason::MissingTab));
        };
        let Some(page) = tab.page() else {
            return Ok(abort(AbortReason::MissingPageUrl));
        };

        let options = self.store.get_all().await?;
        let text = self.render(SelectionContext::Page(page), &options);

        match options.action_button {
            ActionButton::Popup => Ok(DispatchOutcome::ShowPopup(text)),
            ActionButton::Copy => Ok(self.copy(&tab, text).await),
        }
    }

    /// Format a selection with the given options applied.
    pub fn render(&self, selection: SelectionContext, options: &Options) -> String {
        let clean = |url: &str| {
            if options.privacy_remove_tracking {
                remove_tracking(url, &self.tracking_params)
            } else {
                url.to_string()
            }
        };

        match selection {
            SelectionContext::Link(link) => format_link(&link.text, &clean(&link.url)),
            SelectionContext::Page(page) => format_page(page.title.as_deref(), &clean(&page.url)),
            SelectionContext::Image { mut image, mut page } => {
                image.src_url = clean(&image.src_url);
                page.url = clean(&page.url);
                format_image(
                    &image,
                    options.image_alt_target,
                    options.image_link_target,
                    &page,
                )
            }
        }
    }

    async fn copy(&self, tab: &Tab, text: String) -> DispatchOutcome {
        match self.clipboard.write_text(tab, &text).await {
            Ok(()) => {
                info!(tab = tab.id, "copied {}", text);
                DispatchOutcome::Copied(text)
            }
            Err(e) => {
                error!(tab = tab.id, error = %e, "clipboard write failed");
                DispatchOutcome::ClipboardFailed(e.to_string())
            }
        }
    }
}

fn abort(reason: AbortReason) -> DispatchOutcome {
    match reason {
        AbortReason::Disabled(_) => warn!("trigger ignored: {}", reason),
        _ => error!("trigger aborted: {}", reason),
    }
    DispatchOutcome::Aborted(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageLinkTarget, OptionSetting};
    use crate::services::privacy::DEFAULT_TRACKING_PARAMS;
    use crate::services::storage::{KeyValueStore, MemoryStore};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClipboard {
        written: Mutex<Vec<(i64, String)>>,
    }

    #[async_trait]
    impl Clipboard for RecordingClipboard {
        async fn write_text(&self, tab: &Tab, text: &str) -> anyhow::Result<()> {
            self.written.lock().unwrap().push((tab.id, text.to_string()));
            Ok(())
        }
    }

    struct BrokenClipboard;

    #[async_trait]
    impl Clipboard for BrokenClipboard {
        async fn write_text(&self, _tab: &Tab, _text: &str) -> anyhow::Result<()> {
            Err(anyhow!("document is not focused"))
        }
    }

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

    fn dispatcher(store: OptionStore) -> (Dispatcher, Arc<RecordingClipboard>) {
        let clipboard = Arc::new(RecordingClipboard::default());
        let params = DEFAULT_TRACKING_PARAMS.iter().map(|s| s.to_string()).collect();
        (Dispatcher::new(store, clipboard.clone(), params), clipboard)
    }

    fn memory_store() -> OptionStore {
        OptionStore::new(Arc::new(MemoryStore::new()))
    }

    fn tab() -> Tab {
        Tab {
            id: 7,
            title: Some("Example Page".into()),
            url: Some("https://ex/page".into()),
        }
    }

    fn click(menu_item_id: &str) -> ClickInfo {
        ClickInfo {
            menu_item_id: menu_item_id.to_string(),
            ..ClickInfo::default()
        }
    }

    #[tokio::test]
    async fn test_image_click_with_default_options() {
        let (dispatcher, clipboard) = dispatcher(memory_store());
        let info = ClickInfo {
            media_type: Some("png".into()),
            src_url: Some("https://ex/im.png".into()),
            ..click("copy-as-markdown-image")
        };

        let outcome = dispatcher
            .dispatch(Trigger::MenuClick { info, tab: Some(tab()) })
            .await
            .unwrap();

        let expected = "[![png](https://ex/im.png)](https://ex/page)".to_string();
        assert_eq!(outcome, DispatchOutcome::Copied(expected.clone()));
        assert_eq!(*clipboard.written.lock().unwrap(), vec![(7, expected)]);
    }

    #[tokio::test]
    async fn test_image_click_without_link() {
        let store = memory_store();
        store
            .set(OptionSetting::ImageLinkTarget(ImageLinkTarget::NoLink))
            .await
            .unwrap();
        let (dispatcher, _) = dispatcher(store);
        let info = ClickInfo {
            media_type: Some("png".into()),
            src_url: Some("https://ex/im.png".into()),
            ..click("copy-as-markdown-image")
        };

        let outcome = dispatcher
            .dispatch(Trigger::MenuClick { info, tab: Some(tab()) })
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Copied("![png](https://ex/im.png)".into()));
    }

    #[tokio::test]
    async fn test_link_click_strips_tracking() {
        let (dispatcher, _) = dispatcher(memory_store());
        let info = ClickInfo {
            link_text: Some("Docs".into()),
            link_url: Some("https://ex/docs?utm_source=feed&page=2".into()),
            ..click("copy-as-markdown-link")
        };

        let outcome = dispatcher
            .dispatch(Trigger::MenuClick { info, tab: Some(tab()) })
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Copied("[Docs](https://ex/docs?page=2)".into()));
    }

    #[tokio::test]
    async fn test_link_click_keeps_tracking_when_disabled() {
        let store = memory_store();
        store
            .set(OptionSetting::PrivacyRemoveTracking(false))
            .await
            .unwrap();
        let (dispatcher, _) = dispatcher(store);
        let info = ClickInfo {
            link_url: Some("https://ex/?utm_source=feed".into()),
            ..click("copy-as-markdown-link")
        };

        let outcome = dispatcher
            .dispatch(Trigger::MenuClick { info, tab: Some(tab()) })
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Copied("[](https://ex/?utm_source=feed)".into()));
    }

    #[tokio::test]
    async fn test_page_click_without_tab_is_aborted() {
        let (dispatcher, clipboard) = dispatcher(memory_store());

        let outcome = dispatcher
            .dispatch(Trigger::MenuClick {
                info: click("copy-as-markdown-page"),
                tab: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Aborted(AbortReason::MissingTab));
        assert!(clipboard.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_page_click_without_title() {
        let (dispatcher, _) = dispatcher(memory_store());
        let tab = Tab {
            id: 1,
            title: None,
            url: Some("https://x/".into()),
        };

        let outcome = dispatcher
            .dispatch(Trigger::MenuClick {
                info: click("copy-as-markdown-page"),
                tab: Some(tab),
            })
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Copied("[](https://x/)".into()));
    }

    #[tokio::test]
    async fn test_unknown_and_disabled_items_are_aborted() {
        let store = memory_store();
        store.set(OptionSetting::EnableLink(false)).await.unwrap();
        let (dispatcher, clipboard) = dispatcher(store);

        let unknown = dispatcher
            .dispatch(Trigger::MenuClick {
                info: click("copy-as-html"),
                tab: Some(tab()),
            })
            .await
            .unwrap();
        assert_eq!(
            unknown,
            DispatchOutcome::Aborted(AbortReason::UnknownMenuItem("copy-as-html".into()))
        );

        let disabled = dispatcher
            .dispatch(Trigger::MenuClick {
                info: click("copy-as-markdown-link"),
                tab: Some(tab()),
            })
            .await
            .unwrap();
        assert_eq!(
            disabled,
            DispatchOutcome::Aborted(AbortReason::Disabled(TriggerKind::Link))
        );
        assert!(clipboard.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_action_click_opens_popup_by_default() {
        let (dispatcher, clipboard) = dispatcher(memory_store());

        let outcome = dispatcher
            .dispatch(Trigger::ActionClick { tab: Some(tab()) })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::ShowPopup("[Example Page](https://ex/page)".into())
        );
        assert!(clipboard.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_action_click_copies_when_configured() {
        let store = memory_store();
        store
            .set(OptionSetting::ActionButton(ActionButton::Copy))
            .await
            .unwrap();
        let (dispatcher, clipboard) = dispatcher(store);

        let outcome = dispatcher
            .dispatch(Trigger::ActionClick { tab: Some(tab()) })
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Copied("[Example Page](https://ex/page)".into()));
        assert_eq!(clipboard.written.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_action_click_without_url_is_aborted() {
        let (dispatcher, _) = dispatcher(memory_store());
        let tab = Tab {
            id: 3,
            title: Some("New Tab".into()),
            url: None,
        };

        let outcome = dispatcher
            .dispatch(Trigger::ActionClick { tab: Some(tab) })
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Aborted(AbortReason::MissingPageUrl));
    }

    #[tokio::test]
    async fn test_clipboard_failure_is_reported_not_raised() {
        let dispatcher = Dispatcher::new(memory_store(), Arc::new(BrokenClipboard), Vec::new());

        let outcome = dispatcher
            .dispatch(Trigger::MenuClick {
                info: click("copy-as-markdown-page"),
                tab: Some(tab()),
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::ClipboardFailed("document is not focused".into())
        );
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (dispatcher, clipboard) = dispatcher(OptionStore::new(Arc::new(OfflineStore)));

        let result = dispatcher
            .dispatch(Trigger::MenuClick {
                info: click("copy-as-markdown-page"),
                tab: Some(tab()),
            })
            .await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(clipboard.written.lock().unwrap().is_empty());
    }
}
