use std::sync::Arc;

use relay_core_types::ConditionCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::errors::StoreError;
use crate::keys;
use crate::store::{HandoffStore, StorageArea};

/// Why a draft cannot be dispatched yet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("calculate price first")]
    MissingPrice,
    #[error("price '{0}' is not a decimal amount")]
    InvalidPrice(String),
    #[error("a SKU is required before listing")]
    MissingSku,
}

/// Listing data handed from the source page to the destination pages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub price: String,
    pub sku: String,
    pub condition: ConditionCode,
    /// `data:<mime>;base64,...` payloads in upload order
    pub images: Vec<String>,
    pub description: Option<String>,
}

impl ListingDraft {
    /// SKU and price must both be present, and the price must parse.
    pub fn validate_dispatchable(&self) -> Result<(), DraftError> {
        let price = self.price.trim();
        if price.is_empty() {
            return Err(DraftError::MissingPrice);
        }
        match price.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => {}
            _ => return Err(DraftError::InvalidPrice(price.to_string())),
        }
        if self.sku.trim().is_empty() {
            return Err(DraftError::MissingSku);
        }
        Ok(())
    }
}

/// Typed accessors over the raw store.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn HandoffStore>,
}

fn as_text(value: Option<Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl DraftStore {
    pub fn new(store: Arc<dyn HandoffStore>) -> Self {
        Self { store }
    }

    pub fn raw(&self) -> &Arc<dyn HandoffStore> {
        &self.store
    }

    async fn text(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(as_text(self.store.get(StorageArea::Local, key).await?))
    }

    async fn put_text(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.store
            .set(StorageArea::Local, key, Value::String(value.to_string()))
            .await
    }

    pub async fn title(&self) -> Result<Option<String>, StoreError> {
        self.text(keys::EBAY_TITLE).await
    }

    pub async fn set_title(&self, title: &str) -> Result<(), StoreError> {
        self.put_text(keys::EBAY_TITLE, title).await
    }

    /// Stored condition code; absent or unparsable reads as `None`.
    pub async fn condition(&self) -> Result<Option<u32>, StoreError> {
        Ok(self
            .text(keys::EBAY_CONDITION)
            .await?
            .and_then(|raw| raw.parse::<u32>().ok()))
    }

    pub async fn set_condition(&self, code: ConditionCode) -> Result<(), StoreError> {
        self.put_text(keys::EBAY_CONDITION, &code.code().to_string())
            .await
    }

    pub async fn price(&self) -> Result<Option<String>, StoreError> {
        self.text(keys::EBAY_PRICE).await
    }

    pub async fn set_price(&self, price: &str) -> Result<(), StoreError> {
        self.put_text(keys::EBAY_PRICE, price).await
    }

    pub async fn sku(&self) -> Result<Option<String>, StoreError> {
        self.text(keys::EBAY_SKU).await
    }

    pub async fn set_sku(&self, sku: &str) -> Result<(), StoreError> {
        self.put_text(keys::EBAY_SKU, sku).await
    }

    pub async fn description(&self) -> Result<Option<String>, StoreError> {
        self.text(keys::DESCRIPTION).await
    }

    pub async fn set_description(&self, description: &str) -> Result<(), StoreError> {
        self.put_text(keys::DESCRIPTION, description).await
    }

    /// Stored image payloads; non-string entries are ignored.
    pub async fn images(&self) -> Result<Vec<String>, StoreError> {
        let images = match self
            .store
            .get(StorageArea::Local, keys::WATERMARKED_IMAGES)
            .await?
        {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Some(other) => {
                debug!(kind = ?other, "image list has unexpected shape");
                Vec::new()
            }
            None => Vec::new(),
        };
        Ok(images)
    }

    pub async fn set_images(&self, images: &[String]) -> Result<(), StoreError> {
        let list = images.iter().cloned().map(Value::String).collect();
        self.store
            .set(StorageArea::Local, keys::WATERMARKED_IMAGES, Value::Array(list))
            .await
    }

    pub async fn append_image(&self, data_uri: String) -> Result<usize, StoreError> {
        let mut images = self.images().await?;
        images.push(data_uri);
        self.set_images(&images).await?;
        Ok(images.len())
    }

    pub async fn clear_images(&self) -> Result<(), StoreError> {
        self.store
            .remove(StorageArea::Local, keys::WATERMARKED_IMAGES)
            .await
    }

    pub async fn record_source(&self, url: &str, title: &str) -> Result<(), StoreError> {
        self.put_text(keys::TEMP_AMAZON_URL, url).await?;
        self.put_text(keys::TEMP_AMAZON_TITLE, title).await
    }

    pub async fn source(&self) -> Result<(Option<String>, Option<String>), StoreError> {
        Ok((
            self.text(keys::TEMP_AMAZON_URL).await?,
            self.text(keys::TEMP_AMAZON_TITLE).await?,
        ))
    }

    pub async fn selected_sku(&self) -> Result<Option<String>, StoreError> {
        Ok(as_text(
            self.store.get(StorageArea::Sync, keys::SELECTED_SKU).await?,
        ))
    }

    pub async fn auto_sku_enabled(&self) -> Result<bool, StoreError> {
        Ok(matches!(
            self.store
                .get(StorageArea::Sync, keys::AUTO_SKU_ENABLED)
                .await?,
            Some(Value::Bool(true))
        ))
    }

    /// Draft SKU, else the selected SKU when automatic SKUs are enabled.
    pub async fn resolve_sku(&self) -> Result<Option<String>, StoreError> {
        if let Some(sku) = self.sku().await? {
            return Ok(Some(sku));
        }
        if self.auto_sku_enabled().await? {
            return self.selected_sku().await;
        }
        Ok(None)
    }

    /// Draft exactly as stored; the SKU settings are not consulted, so the
    /// result can be edited and saved back.
    pub async fn load(&self) -> Result<ListingDraft, StoreError> {
        let sku = self.sku().await?;
        self.assemble(sku).await
    }

    /// Draft as the listing form will see it, with the SKU resolved.
    pub async fn load_for_dispatch(&self) -> Result<ListingDraft, StoreError> {
        let sku = self.resolve_sku().await?;
        self.assemble(sku).await
    }

    async fn assemble(&self, sku: Option<String>) -> Result<ListingDraft, StoreError> {
        Ok(ListingDraft {
            title: self.title().await?.unwrap_or_default(),
            price: self.price().await?.unwrap_or_default(),
            sku: sku.unwrap_or_default(),
            condition: self
                .condition()
                .await?
                .and_then(ConditionCode::from_code)
                .unwrap_or_default(),
            images: self.images().await?,
            description: self.description().await?,
        })
    }

    pub async fn save(&self, draft: &ListingDraft) -> Result<(), StoreError> {
        self.set_title(&draft.title).await?;
        self.set_price(&draft.price).await?;
        if draft.sku.trim().is_empty() {
            self.store.remove(StorageArea::Local, keys::EBAY_SKU).await?;
        } else {
            self.set_sku(&draft.sku).await?;
        }
        self.set_condition(draft.condition).await?;
        self.set_images(&draft.images).await?;
        match &draft.description {
            Some(text) => self.set_description(text).await,
            None => self.store.remove(StorageArea::Local, keys::DESCRIPTION).await,
        }
    }

    /// Removes every draft key from the local area.
    pub async fn clear(&self) -> Result<(), StoreError> {
        for key in keys::DRAFT_KEYS {
            self.store.remove(StorageArea::Local, key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn drafts() -> DraftStore {
        DraftStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn dispatch_requires_price_and_sku() {
        let mut draft = ListingDraft::default();
        assert_eq!(draft.validate_dispatchable(), Err(DraftError::MissingPrice));
        draft.price = "abc".into();
        assert!(matches!(
            draft.validate_dispatchable(),
            Err(DraftError::InvalidPrice(_))
        ));
        draft.price = "24.50".into();
        assert_eq!(draft.validate_dispatchable(), Err(DraftError::MissingSku));
        draft.sku = "WID-1".into();
        assert!(draft.validate_dispatchable().is_ok());
    }

    #[tokio::test]
    async fn absent_keys_read_as_empty() {
        let drafts = drafts();
        assert!(drafts.title().await.unwrap().is_none());
        assert!(drafts.images().await.unwrap().is_empty());
        assert!(!drafts.auto_sku_enabled().await.unwrap());
        let draft = drafts.load().await.unwrap();
        assert_eq!(draft.condition, ConditionCode::New);
    }

    #[tokio::test]
    async fn saving_an_edit_keeps_the_settings_sku_out_of_the_draft() {
        let drafts = drafts();
        drafts
            .raw()
            .set(StorageArea::Sync, keys::SELECTED_SKU, json!("AUTO-7"))
            .await
            .unwrap();
        drafts
            .raw()
            .set(StorageArea::Sync, keys::AUTO_SKU_ENABLED, json!(true))
            .await
            .unwrap();

        let mut draft = drafts.load().await.unwrap();
        assert_eq!(draft.sku, "");
        draft.title = "Widget Pro".into();
        drafts.save(&draft).await.unwrap();

        assert_eq!(drafts.sku().await.unwrap(), None);
        assert_eq!(drafts.load_for_dispatch().await.unwrap().sku, "AUTO-7");

        drafts
            .raw()
            .set(StorageArea::Sync, keys::AUTO_SKU_ENABLED, json!(false))
            .await
            .unwrap();
        assert_eq!(drafts.resolve_sku().await.unwrap(), None);
    }

    #[tokio::test]
    async fn condition_accepts_string_or_number() {
        let drafts = drafts();
        drafts
            .raw()
            .set(StorageArea::Local, keys::EBAY_CONDITION, json!("3000"))
            .await
            .unwrap();
        assert_eq!(drafts.condition().await.unwrap(), Some(3000));
        drafts
            .raw()
            .set(StorageArea::Local, keys::EBAY_CONDITION, json!(1500))
            .await
            .unwrap();
        assert_eq!(drafts.condition().await.unwrap(), Some(1500));
    }

    #[tokio::test]
    async fn sku_falls_back_to_settings() {
        let drafts = drafts();
        let raw = drafts.raw().clone();
        raw.set(StorageArea::Sync, keys::SELECTED_SKU, json!("AUTO-7"))
            .await
            .unwrap();
        assert_eq!(drafts.resolve_sku().await.unwrap(), None);
        raw.set(StorageArea::Sync, keys::AUTO_SKU_ENABLED, json!(true))
            .await
            .unwrap();
        assert_eq!(drafts.resolve_sku().await.unwrap().as_deref(), Some("AUTO-7"));
        drafts.set_sku("MINE").await.unwrap();
        assert_eq!(drafts.resolve_sku().await.unwrap().as_deref(), Some("MINE"));
    }

    #[tokio::test]
    async fn clear_leaves_settings() {
        let drafts = drafts();
        drafts.set_title("Widget").await.unwrap();
        drafts.append_image("data:image/png;base64,AAAA".into()).await.unwrap();
        drafts
            .raw()
            .set(StorageArea::Sync, keys::AUTO_SKU_ENABLED, json!(true))
            .await
            .unwrap();
        drafts.clear().await.unwrap();
        assert!(drafts.title().await.unwrap().is_none());
        assert!(drafts.images().await.unwrap().is_empty());
        assert!(drafts.auto_sku_enabled().await.unwrap());
    }
}
