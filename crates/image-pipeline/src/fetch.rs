use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use crate::asset::ImageAsset;
use crate::compose::{compose_square, ComposeOptions};
use crate::data_uri;
use crate::errors::PipelineError;

/// Downloads the high-resolution variant of `url` and validates it.
/// Returns the asset metadata with the raw bytes.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_asset(
    client: &reqwest::Client,
    url: &str,
    min_bytes: usize,
) -> Result<(ImageAsset, Vec<u8>), PipelineError> {
    let mut asset = ImageAsset::new(url);
    let response = client
        .get(&asset.hires_url)
        .send()
        .await?
        .error_for_status()?;
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = response.bytes().await?.to_vec();
    debug!(hires = %asset.hires_url, size = bytes.len(), %content_type, "fetched image");

    if !asset.validate(&content_type, bytes.len(), min_bytes) {
        return Err(PipelineError::Rejected(format!(
            "{} ({}, {} bytes)",
            asset.hires_url, content_type, asset.size
        )));
    }
    Ok((asset, bytes))
}

/// Fetches `url`, composes it onto the square canvas and returns the data
/// URI ready to be stored in the draft.
pub async fn prepare_image(
    client: &reqwest::Client,
    url: &str,
    min_bytes: usize,
    opts: &ComposeOptions,
) -> Result<(ImageAsset, String), PipelineError> {
    let (asset, bytes) = fetch_asset(client, url, min_bytes).await?;
    let jpeg = compose_square(&bytes, opts)?;
    Ok((asset, data_uri::encode("image/jpeg", &jpeg)))
}
