//! Amazon product page capture.

use action_locator::ElementResolver;
use image_pipeline::derive_hires_url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::selectors;
use super::PageContext;
use crate::errors::AutomationError;

/// Product data read off a source page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCapture {
    pub url: String,
    pub title: String,
    /// High-resolution gallery URLs, first occurrence order
    pub image_urls: Vec<String>,
}

/// Gallery thumbnails point at scaled renditions; keep http(s) sources only,
/// upgraded and deduplicated.
pub fn gallery_urls<'a>(sources: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for src in sources {
        let src = src.trim();
        if !(src.starts_with("https://") || src.starts_with("http://")) {
            continue;
        }
        let hires = derive_hires_url(src);
        if !urls.contains(&hires) {
            urls.push(hires);
        }
    }
    urls
}

/// Reads the product title and gallery, and records the page as the draft's
/// source.
pub async fn capture(ctx: &PageContext) -> Result<SourceCapture, AutomationError> {
    let url = ctx.port.current_url().await?;
    let anchor = selectors::product_title();
    let Some(found) = ctx
        .resolver
        .wait_for(&anchor, ctx.config.resolver_wait())
        .await
    else {
        return Err(AutomationError::NotFound(anchor.label));
    };
    let title = found.element.text.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        return Err(AutomationError::NotFound(anchor.label));
    }

    let images = ctx.resolver.resolve_all(&selectors::gallery_images()).await?;
    let image_urls = gallery_urls(images.iter().filter_map(|img| img.src.as_deref()));
    debug!(found = images.len(), kept = image_urls.len(), "gallery read");

    ctx.drafts.record_source(&url, &title).await?;
    info!(%title, images = image_urls.len(), "source page captured");
    Ok(SourceCapture {
        url,
        title,
        image_urls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_urls_are_upgraded_and_deduplicated() {
        let urls = gallery_urls([
            "https://m.media-amazon.com/images/I/71abc._AC_US40_.jpg",
            "https://m.media-amazon.com/images/I/71abc._AC_SR38,50_.jpg",
            "data:image/gif;base64,R0lGOD",
            "https://m.media-amazon.com/images/I/81xyz.jpg",
        ]);
        assert_eq!(
            urls,
            vec![
                "https://m.media-amazon.com/images/I/71abc.jpg".to_string(),
                "https://m.media-amazon.com/images/I/81xyz.jpg".to_string(),
            ]
        );
    }
}
