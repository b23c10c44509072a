//! Storage key names shared with the browser extension.

pub const EBAY_TITLE: &str = "ebayTitle";
pub const EBAY_CONDITION: &str = "ebayCondition";
pub const EBAY_SKU: &str = "ebaySku";
pub const EBAY_PRICE: &str = "ebayPrice";
pub const WATERMARKED_IMAGES: &str = "watermarkedImages";
pub const DESCRIPTION: &str = "description";
pub const TEMP_AMAZON_URL: &str = "tempAmazonURL";
pub const TEMP_AMAZON_TITLE: &str = "tempAmazonTitle";

// sync area
pub const SELECTED_SKU: &str = "selectedSKU";
pub const AUTO_SKU_ENABLED: &str = "autoSkuEnabled";

/// Keys owned by the listing draft in the local area.
pub const DRAFT_KEYS: &[&str] = &[
    EBAY_TITLE,
    EBAY_CONDITION,
    EBAY_SKU,
    EBAY_PRICE,
    WATERMARKED_IMAGES,
    DESCRIPTION,
];
