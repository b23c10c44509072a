//! Relay configuration
//!
//! Loaded from YAML (see `cli::runtime::load_config` for the lookup order),
//! then individual fields may be overridden with `RELAY_*` environment
//! variables.

use std::path::PathBuf;
use std::time::Duration;

use action_primitives::WaitSpec;
use image_pipeline::{UploadSettings, DEFAULT_CANVAS, MIN_ASSET_BYTES};
use serde::{Deserialize, Serialize};
use tool_click::{ClickPolicyView, ClickTimeouts};
use tool_type_text::{TypeDelays, TypePolicyView, TypeTimeouts};
use tracing::warn;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            interval_ms: 300,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Budget shared by every strategy of one click
    pub click_budget_ms: u64,
    /// Budget shared by both input modes of one text entry
    pub type_budget_ms: u64,
    /// Window for observing a strategy's effect
    pub verify_ms: u64,
    /// How long an optional dialog is given to appear
    pub dialog_wait_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            click_budget_ms: 15_000,
            type_budget_ms: 60_000,
            verify_ms: 2_000,
            dialog_wait_ms: 5_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 30,
            max_delay_ms: 120,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Edge of the square canvas images are composed onto
    pub canvas: u32,
    pub watermark: Option<PathBuf>,
    /// Smallest fetched source image accepted
    pub min_asset_bytes: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            canvas: DEFAULT_CANVAS,
            watermark: None,
            min_asset_bytes: MIN_ASSET_BYTES,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Handoff store file; defaults to the user data directory
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub resolver: ResolverConfig,
    pub executor: ExecutorConfig,
    pub typing: TypingConfig,
    pub images: ImageConfig,
    pub upload: UploadSettings,
    pub store: StoreConfig,
    pub bus_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            executor: ExecutorConfig::default(),
            typing: TypingConfig::default(),
            images: ImageConfig::default(),
            upload: UploadSettings::default(),
            store: StoreConfig::default(),
            bus_capacity: 64,
        }
    }
}

impl RelayConfig {
    pub fn resolver_wait(&self) -> WaitSpec {
        WaitSpec::new(
            Duration::from_millis(self.resolver.interval_ms),
            Duration::from_millis(self.resolver.timeout_ms),
        )
    }

    pub fn dialog_wait(&self) -> WaitSpec {
        self.resolver_wait()
            .with_timeout(Duration::from_millis(self.executor.dialog_wait_ms))
    }

    pub fn click_policy(&self) -> ClickPolicyView {
        ClickPolicyView {
            timeouts: ClickTimeouts {
                resolve_ms: self.resolver.timeout_ms,
                budget_ms: self.executor.click_budget_ms,
                verify_ms: self.executor.verify_ms,
                poll_ms: self.resolver.interval_ms,
            },
            ..ClickPolicyView::default()
        }
    }

    pub fn type_policy(&self) -> TypePolicyView {
        TypePolicyView {
            timeouts: TypeTimeouts {
                resolve_ms: self.resolver.timeout_ms,
                budget_ms: self.executor.type_budget_ms,
                verify_ms: self.executor.verify_ms,
                poll_ms: self.resolver.interval_ms,
            },
            delays: TypeDelays {
                min_ms: self.typing.min_delay_ms,
                max_ms: self.typing.max_delay_ms.max(self.typing.min_delay_ms),
            },
            ..TypePolicyView::default()
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.store.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("listing-relay")
                .join("store.json")
        })
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `RELAY_*` overrides read through `lookup`. Unparsable values
    /// are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
            let raw = raw?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(key, value = %raw, "ignoring unparsable override");
                    None
                }
            }
        }

        let ms = |key: &str, slot: &mut u64| {
            if let Some(value) = parsed(key, lookup(key)) {
                *slot = value;
            }
        };
        ms("RELAY_RESOLVER_INTERVAL_MS", &mut self.resolver.interval_ms);
        ms("RELAY_RESOLVER_TIMEOUT_MS", &mut self.resolver.timeout_ms);
        ms("RELAY_CLICK_BUDGET_MS", &mut self.executor.click_budget_ms);
        ms("RELAY_VERIFY_MS", &mut self.executor.verify_ms);
        ms("RELAY_UPLOAD_VERIFY_MS", &mut self.upload.verify_ms);
        ms("RELAY_UPLOAD_SETTLE_MS", &mut self.upload.settle_ms);

        if let Some(value) = parsed("RELAY_MIN_PAYLOAD_LEN", lookup("RELAY_MIN_PAYLOAD_LEN")) {
            self.upload.min_payload_len = value;
        }
        if let Some(value) = parsed("RELAY_CANVAS", lookup("RELAY_CANVAS")) {
            self.images.canvas = value;
        }
        if let Some(path) = lookup("RELAY_WATERMARK").filter(|v| !v.trim().is_empty()) {
            self.images.watermark = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("RELAY_STORE_PATH").filter(|v| !v.trim().is_empty()) {
            self.store.path = Some(PathBuf::from(path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: RelayConfig = serde_yaml::from_str(
            "resolver:\n  timeout_ms: 2500\nupload:\n  verify_ms: 1000\n",
        )
        .unwrap();
        assert_eq!(config.resolver.timeout_ms, 2500);
        assert_eq!(config.resolver.interval_ms, 300);
        assert_eq!(config.upload.verify_ms, 1000);
        assert_eq!(config.upload.settle_ms, 1500);
        assert_eq!(config.bus_capacity, 64);
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let vars: HashMap<&str, &str> = [
            ("RELAY_RESOLVER_INTERVAL_MS", "150"),
            ("RELAY_UPLOAD_VERIFY_MS", "soon"),
            ("RELAY_STORE_PATH", "/tmp/relay/store.json"),
        ]
        .into_iter()
        .collect();
        let mut config = RelayConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.resolver.interval_ms, 150);
        assert_eq!(config.upload.verify_ms, 30_000);
        assert_eq!(
            config.store_path(),
            PathBuf::from("/tmp/relay/store.json")
        );
    }

    #[test]
    fn policies_follow_config() {
        let mut config = RelayConfig::default();
        config.executor.click_budget_ms = 4_000;
        config.typing.max_delay_ms = 0;
        assert_eq!(config.click_policy().timeouts.budget_ms, 4_000);
        let typing = config.type_policy();
        assert!(typing.delays.max_ms >= typing.delays.min_ms);
    }
}
