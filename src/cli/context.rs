use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use handoff_store::{DraftStore, HandoffStore, JsonFileStore};
use tokio::sync::OnceCell;

use super::output::OutputFormat;
use crate::config::RelayConfig;

pub struct CliContext {
    config: Arc<RelayConfig>,
    config_path: PathBuf,
    output: OutputFormat,
    store: OnceCell<Arc<JsonFileStore>>,
}

impl CliContext {
    pub fn new(config: RelayConfig, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
            store: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> &OutputFormat {
        &self.output
    }

    /// The handoff store file, opened on first use.
    pub async fn store(&self) -> Result<Arc<JsonFileStore>> {
        self.store
            .get_or_try_init(|| async {
                let path = self.config.store_path();
                JsonFileStore::open(path.clone())
                    .map(Arc::new)
                    .with_context(|| format!("opening handoff store {}", path.display()))
            })
            .await
            .map(Arc::clone)
    }

    pub async fn drafts(&self) -> Result<DraftStore> {
        let store: Arc<dyn HandoffStore> = self.store().await?;
        Ok(DraftStore::new(store))
    }
}
