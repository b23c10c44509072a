//! In-memory DOM backend.
//!
//! Nodes declare the selector strings they match instead of running a CSS
//! engine; `query_all(sel)` returns every attached node that lists `sel`, in
//! insertion order. Reactions to interactions are expressed with [`Reacts`]
//! flags plus hooks that mutate the tree, which is enough to model the pages
//! the relay automates.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bitflags::bitflags;
use parking_lot::Mutex;

use crate::errors::AdapterError;
use crate::model::{DomEvent, DragPhase, ElementHandle, ElementSnapshot, FileBlob, Rect};
use crate::port::DomPort;

bitflags! {
    /// Which interactions a node responds to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Reacts: u16 {
        const NATIVE_CLICK = 0b0000_0001;
        /// Native clicks only register while the node holds focus.
        const REQUIRES_FOCUS = 0b0000_0010;
        /// Responds to a dispatched mousedown, mouseup, click sequence.
        const SYNTHETIC_CLICK = 0b0000_0100;
        const FORM_SUBMIT = 0b0000_1000;
        const ACCEPTS_VALUE = 0b0001_0000;
        const KEYSTROKES = 0b0010_0000;
        const FILE_INPUT = 0b0100_0000;
        const DROP_TARGET = 0b1000_0000;
    }
}

impl Default for Reacts {
    fn default() -> Self {
        Reacts::empty()
    }
}

/// What caused a hook to fire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    Click,
    Submit,
    Value(String),
    Files(usize),
}

pub type Hook = Arc<dyn Fn(&mut DomTree, &ElementHandle, &Trigger) + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionKind {
    Click,
    Focus,
    Event(DomEvent),
    SetValue(String),
    TypeChar(char),
    Submit,
    AssignFiles(usize),
    Drag(DragPhase, usize),
    SetAttribute(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interaction {
    pub handle: ElementHandle,
    pub kind: InteractionKind,
}

/// Declarative description of a node to insert.
#[derive(Clone, Debug)]
pub struct NodeSpec {
    tag: String,
    selectors: Vec<String>,
    text: String,
    value: Option<String>,
    input_type: Option<String>,
    disabled: bool,
    classes: Vec<String>,
    rect: Rect,
    in_form: bool,
    src: Option<String>,
    attributes: BTreeMap<String, String>,
    reacts: Reacts,
}

impl NodeSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            selectors: Vec::new(),
            text: String::new(),
            value: None,
            input_type: None,
            disabled: false,
            classes: Vec::new(),
            rect: Rect::new(0.0, 0.0, 120.0, 32.0),
            in_form: false,
            src: None,
            attributes: BTreeMap::new(),
            reacts: Reacts::empty(),
        }
    }

    /// Text input that accepts both value assignment and keystrokes.
    pub fn text_input() -> Self {
        Self::new("input")
            .input_type("text")
            .value("")
            .reacts(Reacts::ACCEPTS_VALUE | Reacts::KEYSTROKES)
    }

    /// Button that responds to a native click.
    pub fn button(text: impl Into<String>) -> Self {
        Self::new("button")
            .input_type("button")
            .text(text)
            .reacts(Reacts::NATIVE_CLICK)
    }

    pub fn matches(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn input_type(mut self, kind: impl Into<String>) -> Self {
        self.input_type = Some(kind.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.rect = Rect::default();
        self
    }

    pub fn in_form(mut self) -> Self {
        self.in_form = true;
        self
    }

    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn reacts(mut self, reacts: Reacts) -> Self {
        self.reacts = reacts;
        self
    }
}

struct Node {
    handle: ElementHandle,
    parent: Option<ElementHandle>,
    spec: NodeSpec,
    focused: bool,
    pending_files: usize,
    hooks: Vec<Hook>,
}

impl Node {
    fn snapshot(&self) -> ElementSnapshot {
        ElementSnapshot {
            handle: self.handle.clone(),
            tag: self.spec.tag.clone(),
            text: self.spec.text.clone(),
            value: self.spec.value.clone(),
            input_type: self.spec.input_type.clone(),
            disabled: self.spec.disabled,
            classes: self.spec.classes.clone(),
            rect: self.spec.rect,
            in_form: self.spec.in_form,
            src: self.spec.src.clone(),
            attributes: self.spec.attributes.clone(),
        }
    }
}

/// Mutable document state; hooks receive it to rewrite the page.
pub struct DomTree {
    url: String,
    nodes: Vec<Node>,
    next_id: u64,
    log: Vec<Interaction>,
    queries: usize,
}

impl DomTree {
    fn new(url: String) -> Self {
        Self {
            url,
            nodes: Vec::new(),
            next_id: 0,
            log: Vec::new(),
            queries: 0,
        }
    }

    pub fn insert(&mut self, spec: NodeSpec) -> ElementHandle {
        self.insert_node(None, spec)
    }

    pub fn insert_child(&mut self, parent: &ElementHandle, spec: NodeSpec) -> ElementHandle {
        self.insert_node(Some(parent.clone()), spec)
    }

    fn insert_node(&mut self, parent: Option<ElementHandle>, spec: NodeSpec) -> ElementHandle {
        self.next_id += 1;
        let handle = ElementHandle(format!("m{}", self.next_id));
        self.nodes.push(Node {
            handle: handle.clone(),
            parent,
            spec,
            focused: false,
            pending_files: 0,
            hooks: Vec::new(),
        });
        handle
    }

    /// Removes the node and its whole subtree.
    pub fn remove(&mut self, handle: &ElementHandle) {
        let mut doomed = vec![handle.clone()];
        let mut idx = 0;
        while idx < doomed.len() {
            let current = doomed[idx].clone();
            doomed.extend(
                self.nodes
                    .iter()
                    .filter(|n| n.parent.as_ref() == Some(&current))
                    .map(|n| n.handle.clone()),
            );
            idx += 1;
        }
        self.nodes.retain(|n| !doomed.contains(&n.handle));
    }

    /// Removes every node matching `selector`.
    pub fn remove_matching(&mut self, selector: &str) {
        let handles: Vec<_> = self
            .nodes
            .iter()
            .filter(|n| n.spec.selectors.iter().any(|s| s == selector))
            .map(|n| n.handle.clone())
            .collect();
        for handle in handles {
            self.remove(&handle);
        }
    }

    pub fn set_text(&mut self, handle: &ElementHandle, text: impl Into<String>) {
        if let Some(node) = self.node_mut(handle) {
            node.spec.text = text.into();
        }
    }

    pub fn set_attribute(
        &mut self,
        handle: &ElementHandle,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        if let Some(node) = self.node_mut(handle) {
            node.spec.attributes.insert(name.into(), value.into());
        }
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn value_of(&self, handle: &ElementHandle) -> Option<String> {
        self.node(handle).and_then(|n| n.spec.value.clone())
    }

    pub fn exists(&self, handle: &ElementHandle) -> bool {
        self.node(handle).is_some()
    }

    pub fn count_matching(&self, selector: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.spec.selectors.iter().any(|s| s == selector))
            .count()
    }

    fn node(&self, handle: &ElementHandle) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.handle == handle)
    }

    fn node_mut(&mut self, handle: &ElementHandle) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.handle == handle)
    }

    fn is_descendant(&self, node: &Node, ancestor: &ElementHandle) -> bool {
        let mut parent = node.parent.clone();
        while let Some(current) = parent {
            if &current == ancestor {
                return true;
            }
            parent = self.node(&current).and_then(|n| n.parent.clone());
        }
        false
    }

    fn record(&mut self, handle: &ElementHandle, kind: InteractionKind) {
        self.log.push(Interaction {
            handle: handle.clone(),
            kind,
        });
    }

    fn fire(&mut self, handle: &ElementHandle, trigger: Trigger) {
        let hooks = match self.node(handle) {
            Some(node) => node.hooks.clone(),
            None => return,
        };
        for hook in hooks {
            hook(self, handle, &trigger);
        }
    }

    /// True when the last three events on `handle` form a full synthetic click.
    fn completes_synthetic_click(&self, handle: &ElementHandle) -> bool {
        let events: Vec<DomEvent> = self
            .log
            .iter()
            .rev()
            .filter(|i| &i.handle == handle)
            .filter_map(|i| match i.kind {
                InteractionKind::Event(ev) => Some(ev),
                _ => None,
            })
            .take(3)
            .collect();
        events == [DomEvent::Click, DomEvent::MouseUp, DomEvent::MouseDown]
    }
}

/// In-memory page implementing [`DomPort`].
pub struct MemoryPage {
    tree: Mutex<DomTree>,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            tree: Mutex::new(DomTree::new(url.into())),
        })
    }

    pub fn insert(&self, spec: NodeSpec) -> ElementHandle {
        self.tree.lock().insert(spec)
    }

    pub fn insert_child(&self, parent: &ElementHandle, spec: NodeSpec) -> ElementHandle {
        self.tree.lock().insert_child(parent, spec)
    }

    pub fn remove(&self, handle: &ElementHandle) {
        self.tree.lock().remove(handle)
    }

    /// Registers a reaction for `handle`.
    pub fn on<F>(&self, handle: &ElementHandle, hook: F)
    where
        F: Fn(&mut DomTree, &ElementHandle, &Trigger) + Send + Sync + 'static,
    {
        if let Some(node) = self.tree.lock().node_mut(handle) {
            node.hooks.push(Arc::new(hook));
        }
    }

    /// Runs `f` against the tree, e.g. to mutate the page from a test.
    pub fn with_tree<R>(&self, f: impl FnOnce(&mut DomTree) -> R) -> R {
        f(&mut self.tree.lock())
    }

    pub fn value_of(&self, handle: &ElementHandle) -> Option<String> {
        self.tree.lock().value_of(handle)
    }

    pub fn exists(&self, handle: &ElementHandle) -> bool {
        self.tree.lock().exists(handle)
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.tree.lock().log.clone()
    }

    pub fn interactions_with(&self, handle: &ElementHandle) -> Vec<InteractionKind> {
        self.tree
            .lock()
            .log
            .iter()
            .filter(|i| &i.handle == handle)
            .map(|i| i.kind.clone())
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.tree.lock().queries
    }

    fn with_node<R>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut DomTree) -> R,
    ) -> Result<R, AdapterError> {
        let mut tree = self.tree.lock();
        if !tree.exists(handle) {
            return Err(AdapterError::target_not_found(handle));
        }
        Ok(f(&mut tree))
    }
}

#[async_trait]
impl DomPort for MemoryPage {
    async fn current_url(&self) -> Result<String, AdapterError> {
        Ok(self.tree.lock().url.clone())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>, AdapterError> {
        let mut tree = self.tree.lock();
        tree.queries += 1;
        Ok(tree
            .nodes
            .iter()
            .filter(|n| n.spec.selectors.iter().any(|s| s == selector))
            .map(Node::snapshot)
            .collect())
    }

    async fn query_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementSnapshot>, AdapterError> {
        let mut tree = self.tree.lock();
        tree.queries += 1;
        if !tree.exists(scope) {
            return Err(AdapterError::target_not_found(scope));
        }
        Ok(tree
            .nodes
            .iter()
            .filter(|n| n.spec.selectors.iter().any(|s| s == selector))
            .filter(|n| tree.is_descendant(n, scope))
            .map(Node::snapshot)
            .collect())
    }

    async fn snapshot(
        &self,
        target: &ElementHandle,
    ) -> Result<Option<ElementSnapshot>, AdapterError> {
        let mut tree = self.tree.lock();
        tree.queries += 1;
        Ok(tree.node(target).map(Node::snapshot))
    }

    async fn click(&self, target: &ElementHandle) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::Click);
            let Some(node) = tree.node(target) else {
                return;
            };
            let reacts = node.spec.reacts;
            let blocked = node.spec.disabled
                || (reacts.contains(Reacts::REQUIRES_FOCUS) && !node.focused);
            if reacts.contains(Reacts::NATIVE_CLICK) && !blocked {
                tree.fire(target, Trigger::Click);
            }
        })
    }

    async fn focus(&self, target: &ElementHandle) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::Focus);
            for node in tree.nodes.iter_mut() {
                node.focused = &node.handle == target;
            }
        })
    }

    async fn dispatch(&self, target: &ElementHandle, event: DomEvent) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::Event(event));
            let Some(node) = tree.node(target) else {
                return;
            };
            let reacts = node.spec.reacts;
            let pending = node.pending_files;
            let value = node.spec.value.clone();
            match event {
                DomEvent::Click
                    if reacts.contains(Reacts::SYNTHETIC_CLICK)
                        && tree.completes_synthetic_click(target) =>
                {
                    tree.fire(target, Trigger::Click);
                }
                DomEvent::Change if reacts.contains(Reacts::FILE_INPUT) && pending > 0 => {
                    if let Some(node) = tree.node_mut(target) {
                        node.pending_files = 0;
                    }
                    tree.fire(target, Trigger::Files(pending));
                }
                DomEvent::Change | DomEvent::Input if reacts.contains(Reacts::ACCEPTS_VALUE) => {
                    tree.fire(target, Trigger::Value(value.unwrap_or_default()));
                }
                _ => {}
            }
        })
    }

    async fn set_value(&self, target: &ElementHandle, value: &str) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::SetValue(value.to_string()));
            if let Some(node) = tree.node_mut(target) {
                if node.spec.reacts.contains(Reacts::ACCEPTS_VALUE) {
                    node.spec.value = Some(value.to_string());
                }
            }
        })
    }

    async fn type_char(&self, target: &ElementHandle, ch: char) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::TypeChar(ch));
            if let Some(node) = tree.node_mut(target) {
                if node.spec.reacts.contains(Reacts::KEYSTROKES) {
                    let mut current = node.spec.value.clone().unwrap_or_default();
                    current.push(ch);
                    node.spec.value = Some(current);
                }
            }
        })
    }

    async fn submit_form(&self, target: &ElementHandle) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::Submit);
            let Some(node) = tree.node(target) else {
                return;
            };
            if node.spec.in_form && node.spec.reacts.contains(Reacts::FORM_SUBMIT) {
                tree.fire(target, Trigger::Submit);
            }
        })
    }

    async fn assign_files(
        &self,
        target: &ElementHandle,
        files: &[FileBlob],
    ) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::AssignFiles(files.len()));
            if let Some(node) = tree.node_mut(target) {
                node.pending_files = files.len();
            }
        })
    }

    async fn dispatch_drag(
        &self,
        target: &ElementHandle,
        phase: DragPhase,
        files: &[FileBlob],
    ) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::Drag(phase, files.len()));
            let accepts = tree
                .node(target)
                .map(|n| n.spec.reacts.contains(Reacts::DROP_TARGET))
                .unwrap_or(false);
            if phase == DragPhase::Drop && accepts {
                tree.fire(target, Trigger::Files(files.len()));
            }
        })
    }

    async fn set_attribute(
        &self,
        target: &ElementHandle,
        name: &str,
        value: &str,
    ) -> Result<(), AdapterError> {
        self.with_node(target, |tree| {
            tree.record(target, InteractionKind::SetAttribute(name.to_string()));
            if let Some(node) = tree.node_mut(target) {
                node.spec
                    .attributes
                    .insert(name.to_string(), value.to_string());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn query_returns_document_order_and_scoping() {
        let page = MemoryPage::new("https://example.test/");
        let group = page.insert(NodeSpec::new("div").matches(".group"));
        let first = page.insert_child(&group, NodeSpec::button("A").matches("button"));
        let _outside = page.insert(NodeSpec::button("B").matches("button"));

        let all = page.query_all("button").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "A");

        let scoped = page.query_within(&group, "button").await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].handle, first);
    }

    #[tokio::test]
    async fn focus_gated_click_needs_focus() {
        let page = MemoryPage::new("https://example.test/");
        let button = page.insert(
            NodeSpec::button("Go").reacts(Reacts::NATIVE_CLICK | Reacts::REQUIRES_FOCUS),
        );
        let marker = page.insert(NodeSpec::new("span").matches("#clicked").hidden());
        page.on(&button, move |tree, _, trigger| {
            if *trigger == Trigger::Click {
                tree.remove(&marker);
            }
        });

        page.click(&button).await.unwrap();
        assert_eq!(page.query_all("#clicked").await.unwrap().len(), 1);

        page.focus(&button).await.unwrap();
        page.click(&button).await.unwrap();
        assert!(page.query_all("#clicked").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_input_fires_on_change_after_assignment() {
        let page = MemoryPage::new("https://example.test/");
        let input = page.insert(NodeSpec::new("input").input_type("file").reacts(Reacts::FILE_INPUT));
        let seen = Arc::new(Mutex::new(0usize));
        let sink = seen.clone();
        page.on(&input, move |_, _, trigger| {
            if let Trigger::Files(n) = trigger {
                *sink.lock() = *n;
            }
        });

        let files = vec![FileBlob::new("a.png", "image/png", vec![1])];
        page.assign_files(&input, &files).await.unwrap();
        assert_eq!(*seen.lock(), 0);
        page.dispatch(&input, DomEvent::Change).await.unwrap();
        assert_eq!(*seen.lock(), 1);
    }

    #[tokio::test]
    async fn detached_targets_report_not_found() {
        let page = MemoryPage::new("https://example.test/");
        let button = page.insert(NodeSpec::button("Gone"));
        page.remove(&button);
        let err = page.click(&button).await.unwrap_err();
        assert!(err.is_detached());
        assert!(page.snapshot(&button).await.unwrap().is_none());
    }
}
