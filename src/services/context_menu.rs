//! Context-menu registration.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use tracing::debug;

use crate::models::TriggerKind;

use super::option_store::OptionStore;

/// A context-menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub title: &'static str,
    /// Selection the entry acts on.
    pub context: TriggerKind,
}

impl MenuItem {
    pub fn for_kind(kind: TriggerKind) -> Self {
        let title = match kind {
            TriggerKind::Image => "Copy as Markdown Image",
            TriggerKind::Link => "Copy as Markdown Link",
            TriggerKind::Page => "Copy Page URL as Markdown Link",
        };
        Self {
            id: kind.menu_item_id(),
            title,
            context: kind,
        }
    }
}

/// Host capability for managing context-menu entries.
#[async_trait]
pub trait ContextMenuHost: Send + Sync {
    async fn remove_all(&self) -> Result<()>;
    async fn create(&self, item: MenuItem) -> Result<()>;
}

/// Register the context-menu entries enabled in the current options.
///
/// Safe to call repeatedly: prior entries are removed first.
pub async fn register_menus(host: &dyn ContextMenuHost, store: &OptionStore) -> Result<Vec<MenuItem>> {
    let options = store.get_all().await?;
    host.remove_all().await?;

    let mut registered = Vec::new();
    for kind in TriggerKind::ALL {
        if !kind.is_enabled(&options) {
            debug!(option = %kind.enable_key(), "menu entry disabled by options");
            continue;
        }
        let item = MenuItem::for_kind(kind);
        host.create(item).await?;
        registered.push(item);
    }

    Ok(registered)
}

/// In-process menu host that records what is registered.
#[derive(Debug, Default)]
pub struct MenuRegistry {
    items: Mutex<Vec<MenuItem>>,
}

impl MenuRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> Vec<MenuItem> {
        self.items.lock().map(|items| items.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ContextMenuHost for MenuRegistry {
    async fn remove_all(&self) -> Result<()> {
        self.items
            .lock()
            .map_err(|_| anyhow!("menu registry lock poisoned"))?
            .clear();
        Ok(())
    }

    async fn create(&self, item: MenuItem) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("menu registry lock poisoned"))?;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(anyhow!("duplicate menu item id '{}'", item.id));
        }
        items.push(item);
        Ok(())
    }
}
