use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to an element inside the current page load.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Point-in-time view of one element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub handle: ElementHandle,
    pub tag: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub in_form: bool,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ElementSnapshot {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c.eq_ignore_ascii_case(class))
    }

    /// Submit buttons and submit inputs; `<button>` defaults to submit.
    pub fn is_submit_control(&self) -> bool {
        let kind = self.input_type.as_deref().map(str::to_ascii_lowercase);
        match self.tag.as_str() {
            "button" => matches!(kind.as_deref(), None | Some("submit")),
            "input" => matches!(kind.as_deref(), Some("submit") | Some("image")),
            _ => false,
        }
    }
}

/// Synthetic events the relay may dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DomEvent {
    Focus,
    Input,
    Change,
    MouseDown,
    MouseUp,
    Click,
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Focus => "focus",
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::MouseDown => "mousedown",
            DomEvent::MouseUp => "mouseup",
            DomEvent::Click => "click",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum DragPhase {
    Enter,
    Over,
    Drop,
}

impl DragPhase {
    pub fn event_name(&self) -> &'static str {
        match self {
            DragPhase::Enter => "dragenter",
            DragPhase::Over => "dragover",
            DragPhase::Drop => "drop",
        }
    }

    pub fn sequence() -> [DragPhase; 3] {
        [DragPhase::Enter, DragPhase::Over, DragPhase::Drop]
    }
}

/// Binary file handed to an upload widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
