use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::errors::{AdapterError, AdapterErrorKind};
use crate::model::{DomEvent, DragPhase, ElementHandle, ElementSnapshot, FileBlob};
use crate::port::DomPort;
use crate::scripts;

/// A live Chromium tab.
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, AdapterError> {
        let result = self.page.evaluate(script).await?;
        result.into_value::<T>().map_err(|err| {
            AdapterError::new(AdapterErrorKind::Script).with_hint(err.to_string())
        })
    }

    async fn eval_on(&self, target: &ElementHandle, script: String) -> Result<(), AdapterError> {
        let found: bool = self.eval(script).await?;
        if found {
            Ok(())
        } else {
            Err(AdapterError::target_not_found(target))
        }
    }
}

/// Attaches to a running browser and returns the first tab whose URL contains
/// `url_filter` (or the first tab when no filter is given).
pub async fn connect_tab(
    endpoint: &str,
    url_filter: Option<&str>,
) -> Result<(Browser, CdpPage), AdapterError> {
    let (browser, mut handler) = Browser::connect(endpoint).await?;
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(err) = event {
                debug!("cdp handler event error: {}", err);
            }
        }
    });

    let pages = browser.pages().await?;
    for page in pages {
        let url = page.url().await?.unwrap_or_default();
        let matched = url_filter.map(|f| url.contains(f)).unwrap_or(true);
        if matched {
            info!(endpoint, url = %url, "attached to tab");
            return Ok((browser, CdpPage::new(page)));
        }
        debug!(url = %url, "skipping tab");
    }

    warn!(endpoint, filter = ?url_filter, "no matching tab");
    Err(AdapterError::new(AdapterErrorKind::TargetNotFound)
        .with_hint("no browser tab matches the requested filter"))
}

#[async_trait]
impl DomPort for CdpPage {
    async fn current_url(&self) -> Result<String, AdapterError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>, AdapterError> {
        self.eval(scripts::query_all(selector)).await
    }

    async fn query_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementSnapshot>, AdapterError> {
        let found: Option<Vec<ElementSnapshot>> =
            self.eval(scripts::query_within(scope, selector)).await?;
        found.ok_or_else(|| AdapterError::target_not_found(scope))
    }

    async fn snapshot(
        &self,
        target: &ElementHandle,
    ) -> Result<Option<ElementSnapshot>, AdapterError> {
        self.eval(scripts::snapshot(target)).await
    }

    async fn click(&self, target: &ElementHandle) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::click(target)).await
    }

    async fn focus(&self, target: &ElementHandle) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::focus(target)).await
    }

    async fn dispatch(&self, target: &ElementHandle, event: DomEvent) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::dispatch(target, event)).await
    }

    async fn set_value(&self, target: &ElementHandle, value: &str) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::set_value(target, value)).await
    }

    async fn type_char(&self, target: &ElementHandle, ch: char) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::type_char(target, ch)).await
    }

    async fn submit_form(&self, target: &ElementHandle) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::submit_form(target)).await
    }

    async fn assign_files(
        &self,
        target: &ElementHandle,
        files: &[FileBlob],
    ) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::assign_files(target, files))
            .await
    }

    async fn dispatch_drag(
        &self,
        target: &ElementHandle,
        phase: DragPhase,
        files: &[FileBlob],
    ) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::dispatch_drag(target, phase, files))
            .await
    }

    async fn set_attribute(
        &self,
        target: &ElementHandle,
        name: &str,
        value: &str,
    ) -> Result<(), AdapterError> {
        self.eval_on(target, scripts::set_attribute(target, name, value))
            .await
    }
}
