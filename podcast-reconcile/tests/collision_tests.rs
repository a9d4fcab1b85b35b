//! Conflicting and malformed store contents
//!
//! Every one of these is reported per item and counted as an error; no file
//! is overwritten and the rest of the batch still runs.

mod helpers;

use helpers::{TestStore, EPISODE_MEDIA, LEGACY_PREFIX};
use podcast_reconcile::reconcile::{
    AttachMetadata, CopyTranscripts, ExcerptSummaries, RefreshEnclosures, RenameTranscripts,
    RewriteHosts,
};
use podcast_reconcile::Operation;

const ATTACHED_TRANSCRIPT: &str = "---\n\
    title: The Show\n\
    episode: 43\n\
    slug: show/transcript\n\
    type: transcript\n\
    ---\n\
    **SPEAKER_0** [00:00:00]\n\nHello.\n\n";

#[tokio::test]
async fn test_two_posts_cannot_share_a_working_transcript() {
    let store = TestStore::new();
    for (file, media) in [("a.md", "001-a.mp3"), ("b.md", "002-b.mp3")] {
        store.write_post(
            &format!("2020-03-03/{file}"),
            &format!(
                "title: {file}\ndate: 2020-03-03\nenclosure:\n  url: https://media.example.com/{media}\n"
            ),
            "",
        );
        let staged = store.stage_transcript(media);
        std::fs::write(staged, format!("Welcome to the show about {media}.\n")).unwrap();
    }

    let planned = store.run(&CopyTranscripts, true).await;
    let actual = store.run(&CopyTranscripts, false).await;

    for summary in [&planned, &actual] {
        assert_eq!(summary.acted, 1, "{}", summary);
        assert_eq!(summary.errored, 1, "{}", summary);
    }
    let copied = std::fs::read_to_string(store.path("2020-03-03/transcript.md")).unwrap();
    assert!(copied.contains("Welcome to the show"));

    // The copy only serves the post it came from; the other keeps colliding
    let rerun = store.run(&CopyTranscripts, false).await;
    assert_eq!((rerun.acted, rerun.skipped, rerun.errored), (0, 1, 1), "{}", rerun);
    assert_eq!(
        std::fs::read_to_string(store.path("2020-03-03/transcript.md")).unwrap(),
        copied
    );
}

#[tokio::test]
async fn test_rename_refuses_to_overwrite() {
    let store = TestStore::new();
    store.write_episode_post();
    store.write("2019-05-02/old-name.md", ATTACHED_TRANSCRIPT);
    store.write("2019-05-02/transcript.md", ATTACHED_TRANSCRIPT);

    let planned = store.run(&RenameTranscripts, true).await;
    assert_eq!((planned.acted, planned.errored), (1, 1));

    let before = store.snapshot();
    let actual = store.run(&RenameTranscripts, false).await;
    assert_eq!((actual.acted, actual.errored), (1, 1));

    // One file moved, nothing was lost
    let after = store.snapshot();
    assert_eq!(after.len(), before.len());
    assert!(store.exists(&format!("2019-05-02/{}", EPISODE_MEDIA.replace(".mp3", ".md"))));
    assert!(store.exists("2019-05-02/transcript.md"));
}

#[tokio::test]
async fn test_rename_needs_a_unique_owner() {
    let store = TestStore::new();
    store.write("2019-05-02/transcript.md", ATTACHED_TRANSCRIPT);

    let orphaned = store.run(&RenameTranscripts, false).await;
    assert_eq!(orphaned.errored, 1);

    // Same (episode, slug) published twice elsewhere
    for dir in ["2019-05-03", "2019-05-04"] {
        store.write_post(
            &format!("{dir}/43-show.md"),
            &format!(
                "title: The Show\ndate: 2019-05-02\nslug: show\nepisode: 43\n\
                 enclosure:\n  url: {LEGACY_PREFIX}{EPISODE_MEDIA}\n"
            ),
            "",
        );
    }
    let ambiguous = store.run(&RenameTranscripts, false).await;
    assert_eq!(ambiguous.errored, 1);
    assert!(store.exists("2019-05-02/transcript.md"));
}

#[tokio::test]
async fn test_rename_prefers_owner_in_the_same_folder() {
    let store = TestStore::new();
    store.write_episode_post();
    store.write_post(
        "2019-06-01/43-show.md",
        "title: Repost\ndate: 2019-06-01\nslug: show\nepisode: 43\n\
         enclosure:\n  url: https://media.example.com/other.mp3\n",
        "",
    );
    store.write("2019-05-02/transcript.md", ATTACHED_TRANSCRIPT);

    let summary = store.run(&RenameTranscripts, false).await;
    assert_eq!(summary.acted, 1, "{}", summary);
    assert!(store.exists("2019-05-02/043-show-20190502.md"));
}

#[tokio::test]
async fn test_attach_needs_exactly_one_sibling_post() {
    let store = TestStore::new();
    store.write("2019-05-02/transcript.md", "Hello.\n");

    let lonely = store.run(&AttachMetadata, false).await;
    assert_eq!(lonely.errored, 1);

    store.write_episode_post();
    store.write_post("2019-05-02/extra.md", "title: Extra\ndate: 2019-05-02\n", "");
    let crowded = store.run(&AttachMetadata, false).await;
    assert_eq!(crowded.errored, 1);

    assert_eq!(
        std::fs::read_to_string(store.path("2019-05-02/transcript.md")).unwrap(),
        "Hello.\n"
    );
}

#[tokio::test]
async fn test_unreadable_documents_count_as_errors() {
    let store = TestStore::new();
    store.write_episode_post();
    store.write_media(EPISODE_MEDIA);
    store.write("2020-01-01/broken.md", "---\ntitle: [unclosed\n---\nbody\n");
    store.write_post("2020-01-02/untitled.md", "date: 2020-01-02\n", "Dear Listener,\n\nText.\n");
    store.write("2020-01-03/transcript.md", "---\nslug: [unclosed\n---\n");

    for operation in [
        &RewriteHosts as &dyn Operation,
        &RefreshEnclosures,
        &ExcerptSummaries,
    ] {
        let summary = store.run(operation, true).await;
        assert_eq!(summary.scanned, 3, "{}", operation.name());
        assert_eq!(summary.errored, 2, "{}", summary);
        assert_eq!(summary.accounted(), summary.scanned);
    }

    let attach = store.run(&AttachMetadata, true).await;
    assert_eq!(attach.scanned, 1);
    assert_eq!(attach.errored, 1);
}

#[tokio::test]
async fn test_refresh_reports_missing_media() {
    let store = TestStore::new();
    store.write_episode_post();

    let summary = store.run(&RefreshEnclosures, false).await;
    assert_eq!(summary.errored, 1);
    assert!(!summary.is_success());
}
