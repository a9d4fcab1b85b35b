//! Commands that call the transcription and text generation services,
//! exercised against in-process stand-ins

mod helpers;

use helpers::{CannedSummarizer, ScriptedTranscriber, TestStore};
use podcast_reconcile::adapters::AdapterError;
use podcast_reconcile::episode::{create_episode, EpisodeResult, NewEpisode};
use podcast_reconcile::reconcile::{BackfillSummaries, TranscribeStaged};
use podcast_reconcile::ReconcileError;
use std::sync::Arc;

const EXPECTED_TRANSCRIPT: &str = "**SPEAKER_0** [00:00:00]\n\nWelcome to the show.\n\n\
                                   **SPEAKER_1** [00:01:05]\n\nGlad to be here.\n\n";

fn media_store() -> TestStore {
    let store = TestStore::new();
    for name in ["003-a.mp3", "004-b.mp3", "005-c.mp3", "006-d.mp3", "notes-7.txt"] {
        store.write_media(name);
    }
    store
}

#[tokio::test]
async fn test_transcribe_staged_from_episode() {
    let store = media_store();
    store.stage_transcript("005-c.mp3");
    let transcriber = Arc::new(ScriptedTranscriber::default());

    let operation = TranscribeStaged::new(transcriber.clone(), 4);
    let summary = store.run(&operation, false).await;

    assert_eq!(summary.scanned, 3);
    assert_eq!((summary.acted, summary.skipped), (2, 1));
    assert_eq!(transcriber.call_count(), 2);
    assert!(!store.staging.join("003-a.md").exists());
    assert_eq!(
        std::fs::read_to_string(store.staging.join("004-b.md")).unwrap(),
        EXPECTED_TRANSCRIPT
    );
}

#[tokio::test]
async fn test_transcribe_staged_dry_run_calls_nothing() {
    let store = media_store();
    let transcriber = Arc::new(ScriptedTranscriber::default());

    let operation = TranscribeStaged::new(transcriber.clone(), 4);
    let summary = store.run(&operation, true).await;

    assert_eq!(summary.acted, 3);
    assert_eq!(transcriber.call_count(), 0);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_quota_exhaustion_stops_the_batch() {
    let store = media_store();
    let transcriber = Arc::new(ScriptedTranscriber::with_quota(1));

    let operation = TranscribeStaged::new(transcriber.clone(), 4);
    let summary = store.run(&operation, false).await;

    assert_eq!(summary.acted, 1);
    assert_eq!(summary.errored, 1);
    assert_eq!(summary.not_processed, 1);
    assert!(summary.aborted.is_some());
    assert_eq!(summary.accounted(), summary.scanned);
    assert_eq!(transcriber.call_count(), 2);
    assert!(store.staging.join("004-b.md").exists());
    assert!(!store.staging.join("005-c.md").exists());
    assert!(!store.staging.join("006-d.md").exists());
}

#[tokio::test]
async fn test_backfill_summarizes_attached_transcripts_only() {
    let store = TestStore::new();
    store.write(
        "2019-05-02/043-show.md",
        "---\ntitle: The Show\nepisode: 43\nslug: show/transcript\ntype: transcript\n---\nWelcome.\n",
    );
    store.write(
        "2019-06-02/044-done.md",
        "---\ntitle: Done\ntype: transcript\nsummary: Already here.\nkeywords:\n  - done\n---\nText.\n",
    );
    store.write("2019-07-02/transcript.md", "Not attached yet.\n");
    let summarizer = Arc::new(CannedSummarizer::new());

    let operation = BackfillSummaries::new(summarizer.clone());
    let planned = store.run(&operation, true).await;
    assert_eq!((planned.acted, planned.skipped), (1, 2));
    assert_eq!(summarizer.call_count(), 0);

    let summary = store.run(&operation, false).await;
    assert_eq!((summary.acted, summary.skipped), (1, 2));
    assert_eq!(summarizer.call_count(), 1);

    let transcript = store.read_document("2019-05-02/043-show.md");
    assert_eq!(
        transcript.get_str("summary"),
        Some("Stan and Jon talk about citrus.")
    );
    assert_eq!(transcript.get_string_list("keywords").len(), 6);
    assert_eq!(transcript.body, "Welcome.\n");

    let again = store.run(&operation, false).await;
    assert_eq!(again.acted, 0);
}

#[tokio::test]
async fn test_backfill_counts_unparseable_replies() {
    let store = TestStore::new();
    store.write(
        "2019-05-02/043-show.md",
        "---\ntitle: The Show\ntype: transcript\n---\nWelcome.\n",
    );
    let summarizer = Arc::new(CannedSummarizer {
        reply: "I could not summarize this.".to_string(),
        ..CannedSummarizer::new()
    });

    let summary = store.run(&BackfillSummaries::new(summarizer), false).await;
    assert_eq!(summary.errored, 1);
    assert!(summary.aborted.is_none());
    assert_eq!(store.read_document("2019-05-02/043-show.md").get("summary"), None);
}

fn new_episode(store: &TestStore) -> NewEpisode {
    NewEpisode {
        audio: store.write_media("173-lwatol-20240601.mp3"),
        episode: 173,
        title: "Lemons & Limes".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1),
        category: None,
    }
}

#[tokio::test]
async fn test_new_episode_writes_post_and_transcript() {
    let store = TestStore::new();
    let settings = store.settings();
    let request = new_episode(&store);
    let transcriber = ScriptedTranscriber::default();
    let summarizer = CannedSummarizer::new();

    let result = create_episode(&settings, &request, &transcriber, &summarizer, false)
        .await
        .unwrap();
    let EpisodeResult::Created { tags, duration_label, .. } = result else {
        panic!("expected a created episode");
    };
    assert_eq!(duration_label, "01:02:05");
    assert_eq!(tags, vec!["lemons", "limes", "podcasting", "citrus", "archives"]);

    let post = store.read_document("2024-06-01/173-lemons-limes.md");
    assert_eq!(post.get_str("title"), Some("Lemons & Limes"));
    assert_eq!(post.get_str("slug"), Some("lemons-limes"));
    assert_eq!(post.get_i64("episode"), Some(173));
    assert_eq!(post.get_str("date"), Some("2024-06-01T06:00:00.000Z"));
    assert_eq!(post.get_string_list("categories"), vec!["Technology"]);
    assert_eq!(post.get_string_list("tags").len(), 5);
    let enclosure = post.get_mapping("enclosure").unwrap();
    assert_eq!(
        enclosure.get("url").and_then(|v| v.as_str()),
        Some("https://media.twistoflemonpod.com/173-lwatol-20240601.mp3")
    );
    assert_eq!(enclosure.get("duration").and_then(|v| v.as_str()), Some("01:02:05"));
    assert!(post.body.starts_with("Dear Listener,\n\nStan and Jon talk about citrus."));
    assert!(post.body.contains("Stan Lemon & Jon Kohlmeier"));

    let transcript = store.read_document("2024-06-01/173-lwatol-20240601.md");
    assert!(transcript.is_transcript());
    assert_eq!(transcript.get_str("title"), Some("Lemons & Limes - Transcript"));
    assert_eq!(transcript.get_str("slug"), Some("lemons-limes/transcript"));
    assert_eq!(transcript.get_string_list("keywords").len(), 6);
    assert_eq!(transcript.body, EXPECTED_TRANSCRIPT);
}

#[tokio::test]
async fn test_new_episode_dry_run_and_overwrite_guard() {
    let store = TestStore::new();
    let settings = store.settings();
    let request = new_episode(&store);
    let transcriber = ScriptedTranscriber::default();
    let summarizer = CannedSummarizer::new();

    let planned = create_episode(&settings, &request, &transcriber, &summarizer, true)
        .await
        .unwrap();
    assert!(matches!(planned, EpisodeResult::Planned(_)));
    assert_eq!(transcriber.call_count(), 0);
    assert!(store.snapshot().is_empty());

    store.write("2024-06-01/173-lemons-limes.md", "hand written\n");
    let result = create_episode(&settings, &request, &transcriber, &summarizer, false).await;
    assert!(matches!(result, Err(ReconcileError::AlreadyExists(_))));
    assert_eq!(
        std::fs::read_to_string(store.path("2024-06-01/173-lemons-limes.md")).unwrap(),
        "hand written\n"
    );
}

#[tokio::test]
async fn test_new_episode_requires_reachable_summarizer() {
    let store = TestStore::new();
    let settings = store.settings();
    let request = new_episode(&store);
    let transcriber = ScriptedTranscriber::default();

    let summarizer = CannedSummarizer::unhealthy();
    let result = create_episode(&settings, &request, &transcriber, &summarizer, false).await;
    assert!(matches!(
        result,
        Err(ReconcileError::Adapter(AdapterError::Network(_)))
    ));
    assert_eq!(transcriber.call_count(), 0);
}
