//! DOM scripts evaluated by the DevTools backend.
//!
//! Elements are addressed through a `data-relay-handle` attribute assigned on
//! first sight, so handles stay valid for the lifetime of the element.

use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use serde_json::json;

use crate::model::{DomEvent, DragPhase, ElementHandle, FileBlob};

const PRELUDE: &str = r#"
const R = window.__relay || (window.__relay = {
  seq: 0,
  handle(el) {
    if (!el.getAttribute('data-relay-handle')) {
      this.seq += 1;
      el.setAttribute('data-relay-handle', 'h' + this.seq);
    }
    return el.getAttribute('data-relay-handle');
  },
  find(h) {
    return document.querySelector('[data-relay-handle="' + h + '"]');
  },
  snap(el) {
    const r = el.getBoundingClientRect();
    const attributes = {};
    for (const a of Array.from(el.attributes)) { attributes[a.name] = a.value; }
    const hasValue = 'value' in el && typeof el.value === 'string';
    return {
      handle: this.handle(el),
      tag: el.tagName.toLowerCase(),
      text: (el.innerText || el.textContent || '').trim(),
      value: hasValue ? el.value : null,
      input_type: el.getAttribute('type'),
      disabled: !!el.disabled || el.hasAttribute('disabled'),
      classes: Array.from(el.classList),
      rect: { x: r.x, y: r.y, width: r.width, height: r.height },
      in_form: !!(el.form || el.closest('form')),
      src: el.getAttribute('src') || el.currentSrc || null,
      attributes,
    };
  },
  setValue(el, v) {
    const proto = el instanceof HTMLTextAreaElement
      ? HTMLTextAreaElement.prototype
      : HTMLInputElement.prototype;
    const desc = Object.getOwnPropertyDescriptor(proto, 'value');
    if (desc && desc.set) { desc.set.call(el, v); } else { el.value = v; }
  },
  files(list) {
    const dt = new DataTransfer();
    for (const f of list) {
      const bin = atob(f.data);
      const bytes = new Uint8Array(bin.length);
      for (let i = 0; i < bin.length; i++) { bytes[i] = bin.charCodeAt(i); }
      dt.items.add(new File([bytes], f.name, { type: f.mime }));
    }
    return dt;
  },
});
"#;

fn quoted(handle: &ElementHandle) -> String {
    json!(handle.0).to_string()
}

fn with_target(handle: &ElementHandle, body: &str) -> String {
    format!(
        "(() => {{ {PRELUDE} const el = R.find({h}); if (!el) {{ return false; }} {body} return true; }})()",
        h = quoted(handle),
    )
}

fn files_json(files: &[FileBlob]) -> String {
    let list: Vec<_> = files
        .iter()
        .map(|f| json!({ "name": f.name, "mime": f.mime, "data": Base64.encode(&f.bytes) }))
        .collect();
    serde_json::Value::Array(list).to_string()
}

pub fn query_all(selector: &str) -> String {
    format!(
        "(() => {{ {PRELUDE} return Array.from(document.querySelectorAll({sel})).map((el) => R.snap(el)); }})()",
        sel = json!(selector),
    )
}

pub fn query_within(scope: &ElementHandle, selector: &str) -> String {
    format!(
        "(() => {{ {PRELUDE} const root = R.find({h}); if (!root) {{ return null; }} return Array.from(root.querySelectorAll({sel})).map((el) => R.snap(el)); }})()",
        h = quoted(scope),
        sel = json!(selector),
    )
}

pub fn snapshot(handle: &ElementHandle) -> String {
    format!(
        "(() => {{ {PRELUDE} const el = R.find({h}); return el ? R.snap(el) : null; }})()",
        h = quoted(handle),
    )
}

pub fn click(handle: &ElementHandle) -> String {
    with_target(handle, "el.click();")
}

pub fn focus(handle: &ElementHandle) -> String {
    with_target(handle, "el.focus();")
}

pub fn dispatch(handle: &ElementHandle, event: DomEvent) -> String {
    let ctor = match event {
        DomEvent::MouseDown | DomEvent::MouseUp | DomEvent::Click => {
            "new MouseEvent(name, { bubbles: true, cancelable: true, view: window })"
        }
        DomEvent::Focus => "new FocusEvent(name)",
        DomEvent::Input | DomEvent::Change => "new Event(name, { bubbles: true })",
    };
    let body = format!(
        "const name = {name}; el.dispatchEvent({ctor});",
        name = json!(event.name()),
    );
    with_target(handle, &body)
}

pub fn set_value(handle: &ElementHandle, value: &str) -> String {
    with_target(handle, &format!("R.setValue(el, {});", json!(value)))
}

pub fn type_char(handle: &ElementHandle, ch: char) -> String {
    let body = format!(
        "const key = {key}; \
         el.dispatchEvent(new KeyboardEvent('keydown', {{ key, bubbles: true }})); \
         R.setValue(el, (el.value || '') + key); \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new KeyboardEvent('keyup', {{ key, bubbles: true }}));",
        key = json!(ch.to_string()),
    );
    with_target(handle, &body)
}

pub fn submit_form(handle: &ElementHandle) -> String {
    with_target(
        handle,
        "const form = el.form || el.closest('form'); if (!form) { return false; } \
         if (typeof form.requestSubmit === 'function') { form.requestSubmit(); } else { form.submit(); }",
    )
}

pub fn assign_files(handle: &ElementHandle, files: &[FileBlob]) -> String {
    with_target(
        handle,
        &format!("el.files = R.files({}).files;", files_json(files)),
    )
}

pub fn dispatch_drag(handle: &ElementHandle, phase: DragPhase, files: &[FileBlob]) -> String {
    with_target(
        handle,
        &format!(
            "const dt = R.files({files}); \
             el.dispatchEvent(new DragEvent({name}, {{ bubbles: true, cancelable: true, dataTransfer: dt }}));",
            files = files_json(files),
            name = json!(phase.event_name()),
        ),
    )
}

pub fn set_attribute(handle: &ElementHandle, name: &str, value: &str) -> String {
    with_target(
        handle,
        &format!("el.setAttribute({}, {});", json!(name), json!(value)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_are_json_escaped() {
        let script = query_all(r#"input[name="title"]"#);
        assert!(script.contains(r#""input[name=\"title\"]""#));
    }

    #[test]
    fn file_payload_is_base64() {
        let files = [FileBlob::new("image_1.png", "image/png", vec![1, 2, 3])];
        let script = assign_files(&ElementHandle("h1".into()), &files);
        assert!(script.contains("\"AQID\""));
        assert!(script.contains("image_1.png"));
    }
}
