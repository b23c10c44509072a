//! Collect and convert stage of the upload pipeline.

use page_adapter::FileBlob;
use tracing::{debug, warn};

use crate::data_uri::{self, IMAGE_PREFIX};

/// Entries shorter than this are treated as truncated or placeholder data.
pub const DEFAULT_MIN_PAYLOAD_LEN: usize = 100;

/// Keeps only `data:image/` entries of at least `min_len` characters, in order.
pub fn collect(raw: &[String], min_len: usize) -> Vec<String> {
    raw.iter()
        .enumerate()
        .filter(|(idx, entry)| {
            let keep = entry.starts_with(IMAGE_PREFIX) && entry.len() >= min_len;
            if !keep {
                debug!(index = idx, len = entry.len(), "dropping stored image entry");
            }
            keep
        })
        .map(|(_, entry)| entry.clone())
        .collect()
}

/// Decodes each entry into a file named `image_<n>.<ext>`; entries that fail
/// to decode are logged and skipped.
pub fn convert(images: &[String]) -> Vec<FileBlob> {
    let mut files = Vec::with_capacity(images.len());
    for (idx, uri) in images.iter().enumerate() {
        match data_uri::decode(uri) {
            Ok((mime, bytes)) => {
                let name = format!(
                    "image_{}.{}",
                    files.len() + 1,
                    data_uri::extension_for(&mime)
                );
                files.push(FileBlob::new(name, mime, bytes));
            }
            Err(err) => warn!(index = idx, "skipping image that failed to decode: {}", err),
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(len: usize) -> String {
        data_uri::encode("image/png", &vec![7u8; len])
    }

    #[test]
    fn collect_drops_short_and_foreign_entries() {
        let raw = vec![
            payload(200),
            "data:image/png;base64,AAAA".to_string(),
            format!("https://example.test/{}", "x".repeat(200)),
            format!("data:text/plain;base64,{}", "A".repeat(200)),
            payload(300),
        ];
        let kept = collect(&raw, DEFAULT_MIN_PAYLOAD_LEN);
        assert_eq!(kept, vec![raw[0].clone(), raw[4].clone()]);
    }

    #[test]
    fn convert_names_files_in_order_and_skips_bad_entries() {
        let images = vec![
            data_uri::encode("image/jpeg", &[1, 2, 3]),
            format!("data:image/png;base64,{}", "!".repeat(120)),
            data_uri::encode("image/webp", &[4, 5]),
        ];
        let files = convert(&images);
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["image_1.jpg", "image_2.webp"]);
        assert_eq!(files[0].bytes, vec![1, 2, 3]);
        assert_eq!(files[1].mime, "image/webp");
    }
}
