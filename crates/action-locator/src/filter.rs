//! Interactability filter.

use page_adapter::ElementSnapshot;

/// Class names that mark a control as inactive or hidden.
pub const INACTIVE_CLASSES: &[&str] = &[
    "disabled",
    "is-disabled",
    "inactive",
    "hidden",
    "is-hidden",
    "invisible",
];

/// An element counts as interactable unless it has a zero-size box, is
/// disabled (property or `aria-disabled`), or carries an inactive class.
pub fn is_interactable(element: &ElementSnapshot) -> bool {
    if element.rect.is_empty() || element.disabled {
        return false;
    }
    if element
        .attribute("aria-disabled")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
    {
        return false;
    }
    !INACTIVE_CLASSES.iter().any(|c| element.has_class(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_adapter::{ElementHandle, Rect};
    use std::collections::BTreeMap;

    fn element() -> ElementSnapshot {
        ElementSnapshot {
            handle: ElementHandle("h1".into()),
            tag: "button".into(),
            text: "Continue".into(),
            value: None,
            input_type: None,
            disabled: false,
            classes: vec!["btn".into()],
            rect: Rect::new(0.0, 0.0, 80.0, 24.0),
            in_form: false,
            src: None,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn visible_enabled_element_passes() {
        assert!(is_interactable(&element()));
    }

    #[test]
    fn zero_size_disabled_and_inactive_are_filtered() {
        let mut hidden = element();
        hidden.rect = Rect::default();
        assert!(!is_interactable(&hidden));

        let mut disabled = element();
        disabled.disabled = true;
        assert!(!is_interactable(&disabled));

        let mut aria = element();
        aria.attributes.insert("aria-disabled".into(), "true".into());
        assert!(!is_interactable(&aria));

        let mut inactive = element();
        inactive.classes.push("Is-Disabled".into());
        assert!(!is_interactable(&inactive));
    }
}
