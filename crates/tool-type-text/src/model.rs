use action_primitives::Anchor;
use page_adapter::ElementSnapshot;
use serde::{Deserialize, Serialize};

/// Controls how text is injected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Value assignment through the native setter, then input and change
    Paste,
    /// One keystroke per character with a randomized delay
    Natural,
}

impl InputMode {
    pub fn chain() -> [InputMode; 2] {
        [InputMode::Paste, InputMode::Natural]
    }

    pub fn name(&self) -> &'static str {
        match self {
            InputMode::Paste => "paste",
            InputMode::Natural => "natural",
        }
    }
}

#[derive(Clone, Debug)]
pub enum TextTarget {
    Anchor(Anchor),
    Element(ElementSnapshot),
}

impl TextTarget {
    pub fn label(&self) -> String {
        match self {
            TextTarget::Anchor(anchor) => anchor.label.clone(),
            TextTarget::Element(el) => format!("{}#{}", el.tag, el.handle),
        }
    }
}

/// Parameters describing the intended text entry.
#[derive(Clone, Debug)]
pub struct TextParams {
    pub target: TextTarget,
    pub text: String,
}

impl TextParams {
    pub fn new(target: TextTarget, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
        }
    }

    pub fn anchor(anchor: Anchor, text: impl Into<String>) -> Self {
        Self::new(TextTarget::Anchor(anchor), text)
    }
}
