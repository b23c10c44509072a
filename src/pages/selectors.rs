//! Every selector the relay uses, in one place.
//!
//! Third-party markup changes without notice; anchors list fallbacks in the
//! order they are tried.

use action_primitives::Anchor;
use image_pipeline::UploadAnchors;

// Amazon product page
pub const PRODUCT_TITLE: &str = "#productTitle";
pub const PRODUCT_TITLE_ALT: &str = "h1#title";
pub const GALLERY_IMAGES: &str = "#altImages img";
pub const LANDING_IMAGE: &str = "#landingImage";

// eBay prelist
pub const TITLE_INPUT: &str = "input.prelist-radix__search-input";
pub const TITLE_INPUT_ALT: &str = "input[name='keywords']";
pub const SEARCH_BUTTON: &str = "button.prelist-radix__search-button";
pub const SEARCH_BUTTON_ALT: &str = "form.prelist-radix__search button[type='submit']";
pub const MATCH_SKIP_BUTTON: &str = "button.prelist-radix__next-action";
pub const CONDITION_OPTION: &str = ".condition-picker-radix__option";
pub const CONDITION_OPTION_ALT: &str = "[role='radiogroup'] [role='radio']";
pub const CONTINUE_BUTTON: &str = "button.condition-dialog-radix__continue-btn";

// eBay listing form
pub const LISTING_TITLE: &str = "input[name='title']";
pub const PRICE_INPUT: &str = "input[name='price']";
pub const SKU_INPUT: &str = "input[name='customLabel']";
pub const DESCRIPTION_INPUT: &str = "textarea[name='description']";
pub const FILE_INPUT: &str = "input[type='file']";
pub const DROP_ZONE: &str = ".uploader-ui__drop-area";
pub const DROP_ZONE_ALT: &str = ".uploader-ui";
pub const THUMBNAILS: &str = ".uploader-thumbnails__image img";
pub const PHOTO_COUNTER: &str = ".uploader-ui__photo-count";

// item specifics
pub const SPECIFICS_GROUP: &str = ".summary__attributes--field";
pub const SPECIFICS_CAPTION: &str = ".summary__attributes--suggestions-label";
pub const SPECIFICS_VALUE_BUTTON: &str = "button.listbox-button__control";
pub const SPECIFICS_VALUE_INPUT: &str = "input[type='text']";
pub const SPECIFICS_SUGGESTION: &str = ".summary__attributes--suggestions button";

/// Caption phrases that mark a field group offering quick-fill values.
pub const SUGGESTION_PHRASES: &[&str] = &["frequently selected", "suggested", "popular", "recommended"];

/// Attribute set on a suggestion control once it has been clicked.
pub const PROCESSED_MARKER: &str = "data-relay-processed";

pub fn product_title() -> Anchor {
    Anchor::new("product title")
        .css(PRODUCT_TITLE)
        .css(PRODUCT_TITLE_ALT)
}

pub fn gallery_images() -> Anchor {
    Anchor::new("gallery images")
        .css(GALLERY_IMAGES)
        .css(LANDING_IMAGE)
        .unfiltered()
}

pub fn title_input() -> Anchor {
    Anchor::new("title search input")
        .css(TITLE_INPUT)
        .css(TITLE_INPUT_ALT)
        .attribute("input", "placeholder", "what you're selling")
}

pub fn search_button() -> Anchor {
    Anchor::new("title search button")
        .css(SEARCH_BUTTON)
        .css(SEARCH_BUTTON_ALT)
        .text("button", "search")
}

pub fn match_skip_button() -> Anchor {
    Anchor::new("continue without match")
        .text("button", "continue without match")
        .css(MATCH_SKIP_BUTTON)
}

pub fn condition_options() -> Anchor {
    Anchor::new("condition options")
        .css(CONDITION_OPTION)
        .css(CONDITION_OPTION_ALT)
}

pub fn continue_button() -> Anchor {
    Anchor::new("continue to listing")
        .css(CONTINUE_BUTTON)
        .text("button", "continue to listing")
}

pub fn listing_title() -> Anchor {
    Anchor::new("listing title").css(LISTING_TITLE)
}

pub fn price_input() -> Anchor {
    Anchor::new("price").css(PRICE_INPUT)
}

pub fn sku_input() -> Anchor {
    Anchor::new("custom label").css(SKU_INPUT)
}

pub fn description_input() -> Anchor {
    Anchor::new("description").css(DESCRIPTION_INPUT)
}

pub fn upload_anchors() -> UploadAnchors {
    UploadAnchors {
        file_input: Anchor::new("photo file input").css(FILE_INPUT).unfiltered(),
        drop_zone: Anchor::new("photo drop zone").css(DROP_ZONE).css(DROP_ZONE_ALT),
        thumbnails: Anchor::new("photo thumbnails").css(THUMBNAILS),
        photo_counter: Anchor::new("photo counter").css(PHOTO_COUNTER),
    }
}

pub fn specifics_groups() -> Anchor {
    Anchor::new("item specifics groups").css(SPECIFICS_GROUP)
}

pub fn specifics_caption() -> Anchor {
    Anchor::new("suggestion caption").css(SPECIFICS_CAPTION)
}

pub fn specifics_value_button() -> Anchor {
    Anchor::new("specifics dropdown").css(SPECIFICS_VALUE_BUTTON)
}

pub fn specifics_value_input() -> Anchor {
    Anchor::new("specifics input").css(SPECIFICS_VALUE_INPUT)
}

pub fn specifics_suggestions() -> Anchor {
    Anchor::new("suggested values").css(SPECIFICS_SUGGESTION)
}
