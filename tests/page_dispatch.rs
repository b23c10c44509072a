use std::sync::Arc;

use handoff_store::{DraftStore, MemoryStore};
use listing_relay::pages::{dispatch, selectors, PageContext, PageKind, PageOutcome};
use listing_relay::{AutomationError, RelayConfig};
use page_adapter::{MemoryPage, NodeSpec, Trigger};
use relay_event_bus::{EventBus, InMemoryBus, RelayMessage};

fn context(page: &Arc<MemoryPage>, store: &Arc<MemoryStore>) -> PageContext {
    PageContext::new(page.clone(), store.clone(), RelayConfig::default())
}

#[tokio::test(start_paused = true)]
async fn source_page_is_captured_into_the_store() {
    let url = "https://www.amazon.com/Widget-Pro/dp/B0ABCDEF12";
    let page = MemoryPage::new(url);
    page.insert(
        NodeSpec::new("span")
            .matches(selectors::PRODUCT_TITLE)
            .text("\n  Widget   Pro  \n"),
    );
    for src in [
        "https://m.media-amazon.com/images/I/71abc._AC_US40_.jpg",
        "https://m.media-amazon.com/images/I/81def._AC_US40_.jpg",
        "https://m.media-amazon.com/images/I/71abc._AC_SR38,50_.jpg",
    ] {
        page.insert(
            NodeSpec::new("img")
                .matches(selectors::GALLERY_IMAGES)
                .src(src)
                .hidden(),
        );
    }
    let store = Arc::new(MemoryStore::new());

    let outcome = dispatch(&context(&page, &store)).await;

    let PageOutcome::Captured(capture) = outcome else {
        panic!("expected a capture, got {:?}", outcome);
    };
    assert_eq!(capture.title, "Widget Pro");
    assert_eq!(
        capture.image_urls,
        vec![
            "https://m.media-amazon.com/images/I/71abc.jpg",
            "https://m.media-amazon.com/images/I/81def.jpg",
        ]
    );
    let (source_url, source_title) = DraftStore::new(store).source().await.unwrap();
    assert_eq!(source_url.as_deref(), Some(url));
    assert_eq!(source_title.as_deref(), Some("Widget Pro"));
}

#[tokio::test]
async fn unknown_pages_are_reported_not_touched() {
    let page = MemoryPage::new("https://www.ebay.com/itm/1234");
    page.insert(NodeSpec::button("Buy It Now").matches("button"));
    let store = Arc::new(MemoryStore::new());

    let bus = InMemoryBus::<RelayMessage>::new(8);
    let mut messages = bus.subscribe();
    let outcome = dispatch(&context(&page, &store).with_bus(bus)).await;

    assert!(matches!(outcome, PageOutcome::Unrecognised { .. }));
    assert!(!outcome.is_success());
    assert_eq!(page.query_count(), 0);
    assert_eq!(
        messages.try_recv().unwrap(),
        RelayMessage::PageClassified {
            url: "https://www.ebay.com/itm/1234".into(),
            kind: "unknown".into(),
        }
    );
}

#[tokio::test]
async fn handler_errors_become_outcomes() {
    let page = MemoryPage::new("https://www.ebay.com/sl/prelist/suggest");
    let store = Arc::new(MemoryStore::new());

    let outcome = dispatch(&context(&page, &store)).await;

    match outcome {
        PageOutcome::Failed { kind, error } => {
            assert_eq!(kind, PageKind::Intermediate);
            assert_eq!(error, AutomationError::StorageMiss("ebayTitle".into()));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn handler_panics_are_contained() {
    let page = MemoryPage::new("https://www.ebay.com/sl/prelist/suggest");
    page.insert(NodeSpec::text_input().matches(selectors::TITLE_INPUT));
    let search = page.insert(NodeSpec::button("Search").matches(selectors::SEARCH_BUTTON));
    page.on(&search, |_, _, trigger| {
        if *trigger == Trigger::Click {
            panic!("page script blew up");
        }
    });
    let store = Arc::new(MemoryStore::new());
    DraftStore::new(store.clone())
        .set_title("Widget Pro")
        .await
        .unwrap();

    let outcome = dispatch(&context(&page, &store)).await;

    assert!(matches!(
        outcome,
        PageOutcome::Panicked {
            kind: PageKind::Intermediate
        }
    ));
    assert_eq!(outcome.summary(), "intermediate handler crashed");
}
