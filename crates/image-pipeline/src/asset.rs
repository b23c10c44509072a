//! Scraped image candidates.

use serde::{Deserialize, Serialize};

/// Smallest source image worth listing.
pub const MIN_ASSET_BYTES: usize = 5 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub source_url: String,
    pub hires_url: String,
    pub size: usize,
    pub content_type: String,
    pub validated: bool,
}

impl ImageAsset {
    pub fn new(source_url: impl Into<String>) -> Self {
        let source_url = source_url.into();
        let hires_url = derive_hires_url(&source_url);
        Self {
            source_url,
            hires_url,
            size: 0,
            content_type: String::new(),
            validated: false,
        }
    }

    /// Records the fetched payload's metadata and checks its quality.
    pub fn validate(&mut self, content_type: &str, size: usize, min_bytes: usize) -> bool {
        self.content_type = content_type.to_ascii_lowercase();
        self.size = size;
        self.validated = self.content_type.starts_with("image/") && size >= min_bytes;
        self.validated
    }
}

/// Strips the size modifier from a product image URL
/// (`71abc._AC_SX679_.jpg` becomes `71abc.jpg`). Other URLs pass through.
pub fn derive_hires_url(url: &str) -> String {
    let (base, file) = match url.rfind('/') {
        Some(idx) => url.split_at(idx + 1),
        None => ("", url),
    };
    let Some(start) = file.find("._") else {
        return url.to_string();
    };
    let Some(end) = file.rfind("_.") else {
        return url.to_string();
    };
    if end <= start {
        return url.to_string();
    }
    format!("{}{}{}", base, &file[..start], &file[end + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_size_modifiers() {
        assert_eq!(
            derive_hires_url("https://m.media-amazon.com/images/I/71abcXYZ._AC_SX679_.jpg"),
            "https://m.media-amazon.com/images/I/71abcXYZ.jpg"
        );
        assert_eq!(
            derive_hires_url("https://m.media-amazon.com/images/I/61q._SS40_.png"),
            "https://m.media-amazon.com/images/I/61q.png"
        );
    }

    #[test]
    fn plain_urls_pass_through() {
        let url = "https://m.media-amazon.com/images/I/71abcXYZ.jpg";
        assert_eq!(derive_hires_url(url), url);
    }

    #[test]
    fn validation_requires_image_type_and_size() {
        let mut asset = ImageAsset::new("https://example.test/a._SX50_.jpg");
        assert!(!asset.validate("text/html", 50_000, MIN_ASSET_BYTES));
        assert!(!asset.validate("image/jpeg", 100, MIN_ASSET_BYTES));
        assert!(asset.validate("image/jpeg", 50_000, MIN_ASSET_BYTES));
        assert_eq!(asset.hires_url, "https://example.test/a.jpg");
    }
}
