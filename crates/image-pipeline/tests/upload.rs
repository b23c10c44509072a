use std::sync::Arc;

use action_locator::PollingResolver;
use action_primitives::Anchor;
use handoff_store::{DraftStore, MemoryStore};
use image_pipeline::data_uri;
use image_pipeline::{PipelineError, UploadAnchors, UploadPipeline, UploadStrategy};
use page_adapter::{DomTree, ElementHandle, InteractionKind, MemoryPage, NodeSpec, Reacts, Trigger};

fn anchors() -> UploadAnchors {
    UploadAnchors {
        file_input: Anchor::new("photo file input")
            .css("input[type=file]")
            .unfiltered(),
        drop_zone: Anchor::new("photo drop zone").css(".uploader-dropzone"),
        thumbnails: Anchor::new("photo thumbnails").css(".uploader-thumbnails img"),
        photo_counter: Anchor::new("photo counter").css(".uploader-count"),
    }
}

fn valid_image(seed: u8) -> String {
    data_uri::encode("image/jpeg", &vec![seed; 256])
}

async fn seeded_drafts() -> DraftStore {
    let drafts = DraftStore::new(Arc::new(MemoryStore::new()));
    let mut images: Vec<String> = (1..=5).map(valid_image).collect();
    images.insert(2, "data:image/png;base64,AAAA".into());
    images.push("data:image/jpeg;base64,".into());
    drafts.set_images(&images).await.unwrap();
    drafts
}

/// Renders `rendered` thumbnails and sets the counter to `counted` per upload.
fn reaction(
    counter: ElementHandle,
    rendered: usize,
    counted: usize,
) -> impl Fn(&mut DomTree, &ElementHandle, &Trigger) + Send + Sync + 'static {
    move |tree, _, trigger| {
        if let Trigger::Files(n) = trigger {
            for i in 0..rendered.min(*n) {
                tree.insert(
                    NodeSpec::new("img")
                        .matches(".uploader-thumbnails img")
                        .src(format!("blob:https://www.ebay.com/{}", i)),
                );
            }
            tree.set_text(&counter, format!("{} photos", counted.min(*n)));
        }
    }
}

fn page_with_counter() -> (Arc<MemoryPage>, ElementHandle) {
    let page = MemoryPage::new("https://www.ebay.com/lstng?draftId=1");
    let counter = page.insert(NodeSpec::new("span").matches(".uploader-count").text("0 photos"));
    page.insert(
        NodeSpec::new("img")
            .matches(".uploader-thumbnails img")
            .src("https://i.ebayimg.com/placeholder.png"),
    );
    (page, counter)
}

fn file_input(page: &MemoryPage) -> ElementHandle {
    page.insert(
        NodeSpec::new("input")
            .input_type("file")
            .matches("input[type=file]")
            .hidden()
            .reacts(Reacts::FILE_INPUT),
    )
}

#[tokio::test(start_paused = true)]
async fn verified_upload_clears_stored_images() {
    let (page, counter) = page_with_counter();
    let input = file_input(&page);
    page.on(&input, reaction(counter, 5, 5));
    let drafts = seeded_drafts().await;

    let pipeline = UploadPipeline::new(
        Arc::new(PollingResolver::new(page.clone())),
        drafts.clone(),
        anchors(),
    );
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.expected, 5);
    assert_eq!(outcome.observed, 5);
    assert_eq!(
        outcome.files,
        vec!["image_1.jpg", "image_2.jpg", "image_3.jpg", "image_4.jpg", "image_5.jpg"]
    );
    assert_eq!(outcome.strategy, Some(UploadStrategy::FileInput));
    assert_eq!(
        page.interactions_with(&input)[0],
        InteractionKind::AssignFiles(5)
    );
    assert!(drafts.images().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stalled_counter_fails_and_keeps_images() {
    let (page, counter) = page_with_counter();
    let input = file_input(&page);
    page.on(&input, reaction(counter, 3, 3));
    let drafts = seeded_drafts().await;

    let pipeline = UploadPipeline::new(
        Arc::new(PollingResolver::new(page.clone())),
        drafts.clone(),
        anchors(),
    );
    let started = tokio::time::Instant::now();
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::VerificationFailed {
            expected: 5,
            observed: Some(3)
        }
    ));
    assert!(started.elapsed() >= std::time::Duration::from_secs(30));
    assert_eq!(drafts.images().await.unwrap().len(), 7);
}

#[tokio::test(start_paused = true)]
async fn falls_back_to_drag_and_drop() {
    let (page, counter) = page_with_counter();
    let zone = page.insert(
        NodeSpec::new("div")
            .matches(".uploader-dropzone")
            .reacts(Reacts::DROP_TARGET),
    );
    page.on(&zone, reaction(counter, 5, 5));
    let drafts = seeded_drafts().await;

    let pipeline = UploadPipeline::new(
        Arc::new(PollingResolver::new(page.clone())),
        drafts.clone(),
        anchors(),
    );
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(outcome.strategy, Some(UploadStrategy::DragDrop));
    assert_eq!(outcome.attempts.tried(), vec!["file_input", "drag_drop"]);
    assert!(!outcome.attempts.attempts()[0].ok);
    assert_eq!(page.interactions_with(&zone).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn empty_store_has_nothing_to_upload() {
    let (page, _) = page_with_counter();
    let drafts = DraftStore::new(Arc::new(MemoryStore::new()));
    let pipeline = UploadPipeline::new(
        Arc::new(PollingResolver::new(page.clone())),
        drafts,
        anchors(),
    );
    assert!(matches!(
        pipeline.run().await,
        Err(PipelineError::NothingToUpload)
    ));
}
