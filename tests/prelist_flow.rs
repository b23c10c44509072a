use std::sync::Arc;

use action_flow::RunStatus;
use handoff_store::{DraftStore, HandoffStore, MemoryStore, StorageArea};
use listing_relay::pages::{intermediate, selectors, PageContext};
use listing_relay::{AutomationError, RelayConfig};
use page_adapter::{InteractionKind, MemoryPage, NodeSpec, Trigger};
use serde_json::json;

const PRELIST: &str = "https://www.ebay.com/sl/prelist/suggest";

async fn store_with(title: Option<&str>, condition: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    if let Some(title) = title {
        store
            .set(StorageArea::Local, "ebayTitle", json!(title))
            .await
            .unwrap();
    }
    store
        .set(StorageArea::Local, "ebayCondition", json!(condition))
        .await
        .unwrap();
    store
}

fn context(page: &Arc<MemoryPage>, store: Arc<MemoryStore>) -> PageContext {
    PageContext::new(page.clone(), store, RelayConfig::default())
}

#[tokio::test(start_paused = true)]
async fn stored_title_and_condition_are_applied() {
    let page = MemoryPage::new(PRELIST);
    let title = page.insert(NodeSpec::text_input().matches(selectors::TITLE_INPUT));
    let search = page.insert(NodeSpec::button("Search").matches(selectors::SEARCH_BUTTON));
    let new = page.insert(NodeSpec::button("New").matches(selectors::CONDITION_OPTION));
    let used = page.insert(NodeSpec::button("Used").matches(selectors::CONDITION_OPTION));
    let proceed = page.insert(
        NodeSpec::button("Continue to listing").matches(selectors::CONTINUE_BUTTON),
    );

    let input = title.clone();
    page.on(&search, move |tree, _, trigger| {
        if *trigger == Trigger::Click {
            tree.remove(&input);
        }
    });
    page.on(&used, |tree, handle, _| {
        tree.set_attribute(handle, "aria-checked", "true")
    });
    page.on(&proceed, |tree, handle, _| tree.remove(handle));

    let store = store_with(Some("Widget Pro"), "3000").await;
    let report = intermediate::run(&context(&page, store)).await.unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert!(page
        .interactions_with(&title)
        .contains(&InteractionKind::SetValue("Widget Pro".into())));
    assert!(!page
        .interactions_with(&title)
        .iter()
        .any(|kind| matches!(kind, InteractionKind::TypeChar(_))));
    assert_eq!(page.interactions_with(&used), vec![InteractionKind::Click]);
    assert!(page.interactions_with(&new).is_empty());
    assert!(!page.exists(&proceed));
    assert!(report.soft_failures().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_title_touches_nothing() {
    let page = MemoryPage::new(PRELIST);
    page.insert(NodeSpec::text_input().matches(selectors::TITLE_INPUT));
    page.insert(NodeSpec::button("Search").matches(selectors::SEARCH_BUTTON));

    let store = store_with(None, "3000").await;
    let err = intermediate::run(&context(&page, store)).await.unwrap_err();

    assert_eq!(err, AutomationError::StorageMiss("ebayTitle".into()));
    assert_eq!(page.query_count(), 0);
    assert!(page.interactions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn absent_search_button_aborts_the_run() {
    let page = MemoryPage::new(PRELIST);
    page.insert(NodeSpec::text_input().matches(selectors::TITLE_INPUT));
    let option = page.insert(NodeSpec::button("New").matches(selectors::CONDITION_OPTION));

    let store = store_with(Some("Widget Pro"), "1000").await;
    let started = tokio::time::Instant::now();
    let report = intermediate::run(&context(&page, store)).await.unwrap();

    assert_eq!(
        report.status,
        RunStatus::Aborted {
            step_id: "title_fill".into()
        }
    );
    assert_eq!(report.steps.len(), 1);
    let error = report.steps[0].error.clone().unwrap_or_default();
    assert!(error.contains("title search button"), "{}", error);
    assert!(started.elapsed() >= std::time::Duration::from_secs(10));
    assert!(page.interactions_with(&option).is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_condition_code_selects_new() {
    let page = MemoryPage::new(PRELIST);
    let new = page.insert(NodeSpec::button("New").matches(selectors::CONDITION_OPTION));
    let used = page.insert(NodeSpec::button("Used").matches(selectors::CONDITION_OPTION));
    page.on(&new, |tree, handle, _| {
        tree.set_attribute(handle, "aria-checked", "true")
    });

    let store = store_with(Some("Widget Pro"), "9999").await;
    let drafts = DraftStore::new(store.clone());
    assert_eq!(drafts.condition().await.unwrap(), Some(9999));

    let report = intermediate::run(&context(&page, store)).await.unwrap();

    // Title search already done: no input, options showing.
    assert!(report.step("title_fill").unwrap().action_skipped);
    assert_eq!(page.interactions_with(&new), vec![InteractionKind::Click]);
    assert!(page.interactions_with(&used).is_empty());
    // No continue button on this page.
    assert_eq!(report.soft_failures().len(), 1);
    assert_eq!(report.status, RunStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn completed_steps_are_not_repeated() {
    let page = MemoryPage::new(PRELIST);
    let title = page.insert(NodeSpec::text_input().matches(selectors::TITLE_INPUT));
    page.insert(NodeSpec::button("Search").matches(selectors::SEARCH_BUTTON));

    let store = store_with(Some("Widget Pro"), "1000").await;
    let ctx = context(&page, store);
    let mut machine = intermediate::machine(&ctx);
    machine.mark_completed("title_fill");
    let report = intermediate::run_with(&ctx, &mut machine).await.unwrap();

    assert!(report.step("title_fill").unwrap().action_skipped);
    assert!(page.interactions_with(&title).is_empty());
}
