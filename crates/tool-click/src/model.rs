use std::fmt;

use action_primitives::{Anchor, Expectation};
use page_adapter::ElementSnapshot;
use serde::{Deserialize, Serialize};

/// One way of activating a control.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickStrategy {
    /// Native `.click()`
    Direct,
    FocusThenClick,
    /// Synthesized mousedown, mouseup, click
    MouseSequence,
    /// Submits the owning form; only for submit controls inside a form
    FormSubmit,
}

impl ClickStrategy {
    pub fn chain() -> [ClickStrategy; 4] {
        [
            ClickStrategy::Direct,
            ClickStrategy::FocusThenClick,
            ClickStrategy::MouseSequence,
            ClickStrategy::FormSubmit,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClickStrategy::Direct => "direct",
            ClickStrategy::FocusThenClick => "focus_then_click",
            ClickStrategy::MouseSequence => "mouse_sequence",
            ClickStrategy::FormSubmit => "form_submit",
        }
    }

    pub fn applies_to(&self, element: &ElementSnapshot) -> bool {
        match self {
            ClickStrategy::FormSubmit => element.in_form && element.is_submit_control(),
            _ => true,
        }
    }
}

impl fmt::Display for ClickStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
pub enum ClickTarget {
    /// Resolved (and waited for) before the first strategy runs
    Anchor(Anchor),
    /// Element the caller already resolved
    Element(ElementSnapshot),
}

impl ClickTarget {
    pub fn label(&self) -> String {
        match self {
            ClickTarget::Anchor(anchor) => anchor.label.clone(),
            ClickTarget::Element(el) => format!("{}#{}", el.tag, el.handle),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClickParams {
    pub target: ClickTarget,
    pub expect: Expectation,
}

impl ClickParams {
    pub fn new(target: ClickTarget, expect: Expectation) -> Self {
        Self { target, expect }
    }

    pub fn anchor(anchor: Anchor, expect: Expectation) -> Self {
        Self::new(ClickTarget::Anchor(anchor), expect)
    }

    pub fn element(element: ElementSnapshot, expect: Expectation) -> Self {
        Self::new(ClickTarget::Element(element), expect)
    }
}
