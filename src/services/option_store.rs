//! Option store - schema-validated reads and writes over host storage.

use std::sync::Arc;
use thiserror::Error;

use crate::models::options::{validate, validate_complete};
use crate::models::{OptionKey, OptionSetting, Options, PartialOptions};

use super::storage::KeyValueStore;

/// Errors surfaced by the option store.
///
/// Schema violations never appear here: they degrade to defaults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("option storage unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Unavailable(err.into())
    }
}

/// Typed access to the option record.
#[derive(Clone)]
pub struct OptionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl OptionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read one field, falling back to its default when absent or invalid.
    pub async fn get(&self, key: OptionKey) -> Result<OptionSetting, StoreError> {
        let raw = self.backend.get(&[key.as_str()]).await?;
        Ok(validate(&raw)
            .get(key)
            .unwrap_or_else(|| OptionSetting::default_for(key)))
    }

    /// Read the whole record. Every field is present and domain-valid.
    pub async fn get_all(&self) -> Result<Options, StoreError> {
        let keys: Vec<&str> = OptionKey::ALL.iter().map(|k| k.as_str()).collect();
        let raw = self.backend.get(&keys).await?;
        Ok(validate_complete(&raw))
    }

    pub async fn set(&self, setting: OptionSetting) -> Result<(), StoreError> {
        self.set_many(setting.into()).await
    }

    /// Persist every field in `options` in a single host write.
    pub async fn set_many(&self, options: PartialOptions) -> Result<(), StoreError> {
        if options.is_empty() {
            return Ok(());
        }
        self.backend.set(options.to_entries()).await?;
        Ok(())
    }
}
