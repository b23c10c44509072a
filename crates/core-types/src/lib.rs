use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Shared message error passed across crate boundaries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("{message}")]
    Message { message: String },
}

impl RelayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one automation run, i.e. one page load.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Item condition codes understood by the destination listing flow.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ConditionCode {
    New,
    OpenBox,
    Used,
    ForParts,
    Refurbished,
    SellerRefurbished,
}

impl ConditionCode {
    pub const ALL: [ConditionCode; 6] = [
        ConditionCode::New,
        ConditionCode::OpenBox,
        ConditionCode::Used,
        ConditionCode::ForParts,
        ConditionCode::Refurbished,
        ConditionCode::SellerRefurbished,
    ];

    pub fn code(self) -> u32 {
        match self {
            ConditionCode::New => 1000,
            ConditionCode::OpenBox => 1500,
            ConditionCode::Used => 3000,
            ConditionCode::ForParts => 4000,
            ConditionCode::Refurbished => 5000,
            ConditionCode::SellerRefurbished => 6000,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Parses a stored code; anything unrecognised falls back to `New`.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim()
            .parse::<u32>()
            .ok()
            .and_then(Self::from_code)
            .unwrap_or(ConditionCode::New)
    }

    /// Visible labels the condition control may carry, most specific first.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            ConditionCode::New => &["New", "Brand New", "New with tags", "New with box"],
            ConditionCode::OpenBox => &["Open box", "New other (see details)", "New other"],
            ConditionCode::Used => &["Used", "Pre-owned"],
            ConditionCode::ForParts => &["For parts or not working", "For parts"],
            ConditionCode::Refurbished => &[
                "Certified - Refurbished",
                "Certified refurbished",
                "Manufacturer refurbished",
            ],
            ConditionCode::SellerRefurbished => &["Seller refurbished"],
        }
    }

    /// Label set for a raw numeric code; unknown codes map to `New`.
    pub fn labels_for_code(code: u32) -> &'static [&'static str] {
        Self::from_code(code).unwrap_or(ConditionCode::New).labels()
    }
}

impl Default for ConditionCode {
    fn default() -> Self {
        ConditionCode::New
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
