//! Image preparation and upload.
//!
//! Preparation turns scraped product images into square JPEG data URIs kept
//! in the handoff store. Upload runs on the destination page:
//! collect, convert, try file-input assignment then drag-and-drop, verify
//! against the page's photo counter, and only then clear the stored list.

pub mod asset;
pub mod collect;
pub mod compose;
pub mod data_uri;
pub mod errors;
pub mod fetch;
pub mod upload;

pub use asset::{derive_hires_url, ImageAsset, MIN_ASSET_BYTES};
pub use collect::{collect, convert, DEFAULT_MIN_PAYLOAD_LEN};
pub use compose::{compose_square, load_watermark, ComposeOptions, DEFAULT_CANVAS};
pub use errors::PipelineError;
pub use fetch::{fetch_asset, prepare_image};
pub use upload::{UploadAnchors, UploadOutcome, UploadPipeline, UploadSettings, UploadStrategy};
