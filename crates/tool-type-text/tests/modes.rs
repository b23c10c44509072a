use std::sync::Arc;

use action_primitives::Anchor;
use page_adapter::{InteractionKind, MemoryPage, NodeSpec, Reacts};
use tool_type_text::{NullTempo, TextParams, TypeTextError, TypeTextToolBuilder};

fn title_anchor() -> Anchor {
    Anchor::new("title").css("#title")
}

#[tokio::test(start_paused = true)]
async fn paste_is_tried_first() {
    let page = MemoryPage::new("https://www.ebay.com/sl/prelist");
    let field = page.insert(NodeSpec::text_input().matches("#title"));
    let tool = TypeTextToolBuilder::new(page.clone()).build();

    let report = tool
        .type_text(TextParams::anchor(title_anchor(), "Widget Pro"))
        .await
        .unwrap();
    assert_eq!(report.attempts.tried(), vec!["paste"]);
    assert_eq!(page.value_of(&field).as_deref(), Some("Widget Pro"));
}

#[tokio::test(start_paused = true)]
async fn controlled_input_falls_back_to_typing() {
    let page = MemoryPage::new("https://www.ebay.com/sl/prelist");
    let field = page.insert(
        NodeSpec::new("input")
            .input_type("text")
            .value("")
            .matches("#title")
            .reacts(Reacts::KEYSTROKES),
    );
    let tool = TypeTextToolBuilder::new(page.clone())
        .with_tempo(Arc::new(NullTempo))
        .build();

    let report = tool
        .type_text(TextParams::anchor(title_anchor(), "Widget"))
        .await
        .unwrap();
    assert_eq!(report.attempts.tried(), vec!["paste", "natural"]);
    assert_eq!(page.value_of(&field).as_deref(), Some("Widget"));
    let typed = page
        .interactions_with(&field)
        .into_iter()
        .filter(|k| matches!(k, InteractionKind::TypeChar(_)))
        .count();
    assert_eq!(typed, 6);
}

#[tokio::test(start_paused = true)]
async fn read_only_field_exhausts_modes() {
    let page = MemoryPage::new("https://www.ebay.com/sl/prelist");
    page.insert(NodeSpec::new("input").value("").matches("#title"));
    let tool = TypeTextToolBuilder::new(page.clone())
        .with_tempo(Arc::new(NullTempo))
        .build();

    let err = tool
        .type_text(TextParams::anchor(title_anchor(), "Widget"))
        .await
        .unwrap_err();
    assert!(matches!(err, TypeTextError::Exhausted { .. }));
    assert_eq!(err.attempts().map(|a| a.len()), Some(2));
}
