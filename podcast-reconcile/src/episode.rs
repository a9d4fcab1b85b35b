//! New episode creation
//!
//! Turns a finished audio file into a post and its transcript in one pass:
//! transcribe, summarize, then write both documents into the publish-date
//! folder. The transcript is written already attached and under its
//! canonical key, so the reconciliation operations find nothing to do.

use crate::adapters::{analyze_transcript, format_transcript, AdapterError, Summarizer, Transcriber};
use crate::config::Settings;
use crate::error::{ReconcileError, ReconcileResult};
use crate::media::detect_mime_type;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use podcast_common::media_key::canonical_transcript_key;
use podcast_common::records::{transcript_slug, TRANSCRIPT_TYPE};
use podcast_common::slug::normalize;
use podcast_common::time::{episode_publish_time, format_date_for_dir, format_timestamp};
use podcast_common::Document;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// Keywords carried over to the post as tags
const MAX_TAGS: usize = 5;
const DEFAULT_MIME_TYPE: &str = "audio/mpeg";

/// Operator input for a new episode
#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub audio: PathBuf,
    pub episode: i64,
    pub title: String,
    /// Publish date; today when absent
    pub date: Option<NaiveDate>,
    /// Category; the configured default when absent
    pub category: Option<String>,
}

/// Where everything will go
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodePlan {
    pub directory: PathBuf,
    pub post_path: PathBuf,
    pub transcript_path: PathBuf,
    pub slug: String,
    pub media_filename: String,
    pub media_url: String,
    pub publish_date: DateTime<Utc>,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeResult {
    /// Dry run: nothing transcribed or written
    Planned(EpisodePlan),
    Created {
        plan: EpisodePlan,
        tags: Vec<String>,
        duration_label: String,
    },
}

/// Validate input and compute destinations without touching anything
pub fn plan_episode(
    settings: &Settings,
    request: &NewEpisode,
    today: NaiveDate,
) -> ReconcileResult<EpisodePlan> {
    if request.episode <= 0 {
        return Err(ReconcileError::InvalidInput(format!(
            "episode number must be positive, got {}",
            request.episode
        )));
    }

    let title = request.title.trim();
    let slug = normalize(title);
    if slug.is_empty() {
        return Err(ReconcileError::InvalidInput(format!(
            "title {:?} does not produce a slug",
            request.title
        )));
    }

    if !request.audio.is_file() {
        return Err(ReconcileError::MediaNotFound(request.audio.clone()));
    }
    let media_filename = request
        .audio
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ReconcileError::InvalidInput("audio path has no file name".to_string()))?;

    let publish_date = episode_publish_time(request.date.unwrap_or(today));
    let directory = settings.content_dir.join(format_date_for_dir(&publish_date));

    Ok(EpisodePlan {
        post_path: directory.join(format!("{}-{}.md", request.episode, slug)),
        transcript_path: directory.join(canonical_transcript_key(&media_filename)),
        directory,
        slug,
        media_url: settings.media_url(&media_filename),
        media_filename,
        publish_date,
        category: request
            .category
            .clone()
            .unwrap_or_else(|| settings.show.default_category.clone()),
    })
}

/// Create the post and transcript for a new episode
///
/// Refuses to overwrite either file. A dry run stops after planning.
pub async fn create_episode(
    settings: &Settings,
    request: &NewEpisode,
    transcriber: &dyn Transcriber,
    summarizer: &dyn Summarizer,
    dry_run: bool,
) -> ReconcileResult<EpisodeResult> {
    let plan = plan_episode(settings, request, Utc::now().date_naive())?;

    for path in [&plan.post_path, &plan.transcript_path] {
        if path.exists() {
            return Err(ReconcileError::AlreadyExists(path.clone()));
        }
    }

    if dry_run {
        return Ok(EpisodeResult::Planned(plan));
    }

    if !summarizer.health_check().await {
        let reason = "text generation service is not reachable".to_string();
        return Err(AdapterError::Network(reason).into());
    }

    let audio = tokio::fs::read(&request.audio).await?;
    let length_bytes = audio.len() as u64;
    let mime_type = detect_mime_type(&request.audio).unwrap_or(DEFAULT_MIME_TYPE);

    info!(file = %plan.media_filename, bytes = length_bytes, "Transcribing episode audio");
    let transcription = transcriber.transcribe(audio, mime_type).await?;
    let transcript_text = format_transcript(&transcription.utterances);
    let duration_label = format_timestamp(transcription.duration_seconds);

    info!(episode = request.episode, "Generating summary and keywords");
    let title = request.title.trim();
    let analysis = analyze_transcript(summarizer, &settings.show, title, &transcript_text).await?;
    let tags: Vec<String> = analysis.keywords.iter().take(MAX_TAGS).cloned().collect();
    let date = plan.publish_date.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut enclosure = Mapping::new();
    enclosure.insert("url".into(), plan.media_url.as_str().into());
    enclosure.insert("length".into(), length_bytes.into());
    enclosure.insert("type".into(), DEFAULT_MIME_TYPE.into());
    enclosure.insert("duration".into(), duration_label.as_str().into());

    let mut post = Document::new(Mapping::new(), post_body(settings, &analysis.summary));
    post.set("title", title);
    post.set("slug", plan.slug.as_str());
    post.set("episode", request.episode);
    post.set("date", date.as_str());
    post.set("categories", string_list(std::slice::from_ref(&plan.category)));
    post.set("tags", string_list(&tags));
    post.set("enclosure", Value::Mapping(enclosure));
    post.set("summary", analysis.summary.as_str());

    let mut transcript = Document::new(Mapping::new(), transcript_text);
    transcript.set("title", format!("{title} - Transcript"));
    transcript.set("episode", request.episode);
    transcript.set("date", date.as_str());
    transcript.set("slug", transcript_slug(&plan.slug));
    transcript.set("type", TRANSCRIPT_TYPE);
    transcript.set("summary", analysis.summary.as_str());
    transcript.set("keywords", string_list(&analysis.keywords));

    tokio::fs::create_dir_all(&plan.directory).await?;
    write_new(&post, &plan.post_path)?;
    write_new(&transcript, &plan.transcript_path)?;

    info!(
        post = %plan.post_path.display(),
        transcript = %plan.transcript_path.display(),
        duration = %duration_label,
        "Episode created"
    );

    Ok(EpisodeResult::Created {
        plan,
        tags,
        duration_label,
    })
}

fn post_body(settings: &Settings, summary: &str) -> String {
    format!(
        "Dear Listener,\n\n{}\n\nThanks for listening and we'll talk to you soon,\n\n{}\n",
        summary, settings.show.sign_off
    )
}

fn string_list(values: &[String]) -> Value {
    Value::Sequence(values.iter().map(|v| Value::from(v.as_str())).collect())
}

/// Write a document that must not exist yet
fn write_new(document: &Document, path: &Path) -> ReconcileResult<()> {
    if path.exists() {
        return Err(ReconcileError::AlreadyExists(path.to_path_buf()));
    }
    document.write(path)?;
    Ok(())
}
