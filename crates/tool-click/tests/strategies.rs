use std::sync::Arc;

use action_primitives::{Anchor, Expectation};
use page_adapter::{MemoryPage, NodeSpec, Reacts, Trigger};
use tool_click::{ClickError, ClickParams, ClickToolBuilder};

/// Button that inserts a `#done` marker when activated.
fn page_with_button(spec: NodeSpec) -> Arc<MemoryPage> {
    let page = MemoryPage::new("https://www.ebay.com/sl/prelist");
    let button = page.insert(spec.matches("#go"));
    page.on(&button, |tree, _, trigger| {
        if matches!(trigger, Trigger::Click | Trigger::Submit) {
            tree.insert(NodeSpec::new("div").matches("#done"));
        }
    });
    page
}

fn params() -> ClickParams {
    ClickParams::anchor(
        Anchor::new("go").css("#go"),
        Expectation::Appears(Anchor::new("done").css("#done")),
    )
}

#[tokio::test(start_paused = true)]
async fn direct_click_stops_the_chain() {
    let page = page_with_button(NodeSpec::button("Go"));
    let tool = ClickToolBuilder::new(page.clone()).build();

    let report = tool.click(params()).await.unwrap();
    assert!(report.ok);
    assert_eq!(report.attempts.tried(), vec!["direct"]);
}

#[tokio::test(start_paused = true)]
async fn focus_gated_control_needs_second_strategy() {
    let page = page_with_button(
        NodeSpec::button("Go").reacts(Reacts::NATIVE_CLICK | Reacts::REQUIRES_FOCUS),
    );
    let tool = ClickToolBuilder::new(page.clone()).build();

    let report = tool.click(params()).await.unwrap();
    assert_eq!(report.attempts.tried(), vec!["direct", "focus_then_click"]);
    assert_eq!(report.attempts.succeeded_with(), Some("focus_then_click"));
}

#[tokio::test(start_paused = true)]
async fn synthetic_listener_needs_mouse_sequence() {
    let page = page_with_button(NodeSpec::button("Go").reacts(Reacts::SYNTHETIC_CLICK));
    let tool = ClickToolBuilder::new(page.clone()).build();

    let report = tool.click(params()).await.unwrap();
    assert_eq!(report.attempts.succeeded_with(), Some("mouse_sequence"));
    assert_eq!(report.attempts.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn submit_control_falls_back_to_form_submission() {
    let page = page_with_button(
        NodeSpec::new("button")
            .text("Continue")
            .in_form()
            .reacts(Reacts::FORM_SUBMIT),
    );
    let tool = ClickToolBuilder::new(page.clone()).build();

    let report = tool.click(params()).await.unwrap();
    assert_eq!(report.attempts.succeeded_with(), Some("form_submit"));
}

#[tokio::test(start_paused = true)]
async fn non_submit_control_never_tries_form_submission() {
    let page = page_with_button(NodeSpec::button("Dead").reacts(Reacts::empty()).in_form());
    let tool = ClickToolBuilder::new(page.clone()).build();

    let err = tool.click(params()).await.unwrap_err();
    let attempts = err.attempts().expect("strategies ran");
    assert_eq!(
        attempts.tried(),
        vec!["direct", "focus_then_click", "mouse_sequence"]
    );
    assert!(attempts.attempts().iter().all(|a| !a.ok));
}

#[tokio::test(start_paused = true)]
async fn missing_target_is_not_found() {
    let page = MemoryPage::new("https://www.ebay.com/sl/prelist");
    let tool = ClickToolBuilder::new(page.clone()).build();
    let err = tool.click(params()).await.unwrap_err();
    assert!(matches!(err, ClickError::NotFound(_)));
    assert!(page.interactions().is_empty());
}
