//! podcast-reconcile - command-line entry point
//!
//! Each subcommand runs one reconciliation batch (or one workflow) against
//! the content store and prints its summary to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use podcast_common::config::{load_toml_config, LoggingConfig};
use podcast_reconcile::adapters::{DeepgramClient, Summarizer, Transcriber};
use podcast_reconcile::config::{CliOverrides, Settings};
use podcast_reconcile::episode::{create_episode, EpisodeResult, NewEpisode};
use podcast_reconcile::reconcile::{
    AttachMetadata, BackfillSummaries, CopyTranscripts, ExcerptSummaries, RefreshEnclosures,
    RenameTranscripts, RewriteHosts, TranscribeStaged,
};
use podcast_reconcile::report::{render_archive, render_collections, render_tally};
use podcast_reconcile::upload::{prepare_upload, upload_media};
use podcast_reconcile::{run_batch, Operation, RunContext, RunSummary, StoreIndex};

/// Command-line arguments for podcast-reconcile
#[derive(Parser, Debug)]
#[command(name = "podcast-reconcile")]
#[command(about = "Keep podcast posts, transcripts and media consistent")]
#[command(version)]
struct Args {
    /// Config file (default: ~/.config/podcast/config.toml)
    #[arg(long, global = true, env = "PODCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Root of the content store
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    /// Folder holding staged transcripts named after their media
    #[arg(long, global = true)]
    staging_dir: Option<PathBuf>,

    /// Local mirror of the published media files
    #[arg(long, global = true)]
    media_dir: Option<PathBuf>,

    /// Include future-dated posts in collections
    #[arg(long, global = true)]
    include_future: bool,

    /// Print run summaries as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct DryRunArgs {
    /// Report what would change without modifying anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy post metadata into bare transcripts
    AttachMetadata(DryRunArgs),

    /// Rename attached transcripts to their media file name
    RenameTranscripts(DryRunArgs),

    /// Copy staged transcripts next to their posts
    CopyTranscripts(DryRunArgs),

    /// Refresh enclosure length and type from the media mirror
    RefreshEnclosures(DryRunArgs),

    /// Move enclosure URLs off retired media hosts
    RewriteHosts(DryRunArgs),

    /// Generate missing transcript summaries and keywords
    BackfillSummaries(DryRunArgs),

    /// Derive missing post summaries from post bodies
    ExcerptSummaries(DryRunArgs),

    /// Transcribe numbered media files into the staging folder
    TranscribeStaged {
        /// First episode number to transcribe
        #[arg(long, default_value_t = 4)]
        from_episode: i64,

        #[command(flatten)]
        opts: DryRunArgs,
    },

    /// Create the post and transcript for a new episode
    NewEpisode {
        /// Episode audio file
        #[arg(long)]
        audio: PathBuf,

        /// Episode number
        #[arg(long)]
        episode: i64,

        /// Episode title
        #[arg(long)]
        title: String,

        /// Publish date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Category (default from config)
        #[arg(long)]
        category: Option<String>,

        #[command(flatten)]
        opts: DryRunArgs,
    },

    /// Upload an episode file to object storage
    Upload {
        /// File to upload (.mp3)
        file: PathBuf,

        /// Object key (default: episodes/<file name>)
        #[arg(long)]
        key: Option<String>,

        #[command(flatten)]
        opts: DryRunArgs,
    },

    /// List posts, transcripts, categories and tags
    ListTaxonomy {
        /// Raw per-spelling counts instead of normalized collections
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let toml_config = match load_toml_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&toml_config.logging);

    let cli = CliOverrides {
        content_dir: args.content_dir.clone(),
        staging_dir: args.staging_dir.clone(),
        media_dir: args.media_dir.clone(),
        include_future: args.include_future,
    };
    let settings = Settings::resolve(&cli, &toml_config);

    match run(args, settings).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing; `RUST_LOG` wins over the config file level
fn init_tracing(logging: &LoggingConfig) {
    let default_filter = format!(
        "podcast_reconcile={level},podcast_common={level}",
        level = logging.level
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the selected command; `Ok(false)` means it finished with failures
async fn run(args: Args, settings: Settings) -> Result<bool> {
    let json = args.json;

    match args.command {
        Command::AttachMetadata(opts) => {
            run_store_batch(&settings, &AttachMetadata, opts, json).await
        }
        Command::RenameTranscripts(opts) => {
            run_store_batch(&settings, &RenameTranscripts, opts, json).await
        }
        Command::CopyTranscripts(opts) => {
            run_store_batch(&settings, &CopyTranscripts, opts, json).await
        }
        Command::RefreshEnclosures(opts) => {
            run_store_batch(&settings, &RefreshEnclosures, opts, json).await
        }
        Command::RewriteHosts(opts) => {
            run_store_batch(&settings, &RewriteHosts, opts, json).await
        }
        Command::ExcerptSummaries(opts) => {
            run_store_batch(&settings, &ExcerptSummaries, opts, json).await
        }

        Command::BackfillSummaries(opts) => {
            let summarizer = Arc::new(
                settings
                    .ollama_client()
                    .context("Failed to create Ollama client")?,
            );
            if !opts.dry_run && !summarizer.health_check().await {
                anyhow::bail!("Ollama is not reachable; start it before backfilling summaries");
            }
            let operation = BackfillSummaries::new(summarizer);
            run_store_batch(&settings, &operation, opts, json).await
        }

        Command::TranscribeStaged { from_episode, opts } => {
            let transcriber = transcriber_for(&settings, opts.dry_run)?;
            let operation = TranscribeStaged::new(transcriber, from_episode);
            // Works from the media folder alone; the content store is not indexed
            let index = StoreIndex::default();
            let ctx = RunContext::new(&settings, &index, opts.dry_run);
            let summary = run_batch(&operation, &ctx)
                .await
                .context("Failed to scan the media folder")?;
            print_summary(&summary, json)?;
            Ok(summary.is_success())
        }

        Command::NewEpisode {
            audio,
            episode,
            title,
            date,
            category,
            opts,
        } => {
            let request = NewEpisode {
                audio,
                episode,
                title,
                date,
                category,
            };
            let transcriber = transcriber_for(&settings, opts.dry_run)?;
            let summarizer = settings
                .ollama_client()
                .context("Failed to create Ollama client")?;

            let result = create_episode(
                &settings,
                &request,
                transcriber.as_ref(),
                &summarizer,
                opts.dry_run,
            )
            .await
            .context("Failed to create episode")?;
            print_episode(&result);
            Ok(true)
        }

        Command::Upload { file, key, opts } => {
            if opts.dry_run {
                let key = prepare_upload(&file, key.as_deref())?;
                println!("Would upload {} as {}", file.display(), key);
                return Ok(true);
            }
            let uploader = settings.uploader().context("Upload is not configured")?;
            let url = upload_media(&uploader, &file, key.as_deref())
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            println!("Uploaded {} to {}", file.display(), url);
            Ok(true)
        }

        Command::ListTaxonomy { raw } => {
            let index = StoreIndex::build(&settings.content_dir)
                .with_context(|| format!("Failed to index {}", settings.content_dir.display()))?;
            let records = index.content_records();
            let report = if raw {
                render_tally(&records)
            } else {
                let now = podcast_common::time::now();
                let transcripts = index.transcript_artifacts();
                render_archive(&records, &transcripts, settings.visibility, now)
                    + &render_collections(&records, settings.visibility, now)
            };
            print!("{report}");
            Ok(true)
        }
    }
}

/// Index the content store once and run one operation over it
async fn run_store_batch(
    settings: &Settings,
    operation: &dyn Operation,
    opts: DryRunArgs,
    json: bool,
) -> Result<bool> {
    let index = StoreIndex::build(&settings.content_dir)
        .with_context(|| format!("Failed to index {}", settings.content_dir.display()))?;
    let ctx = RunContext::new(settings, &index, opts.dry_run);

    let summary = run_batch(operation, &ctx)
        .await
        .with_context(|| format!("{} could not start", operation.name()))?;
    print_summary(&summary, json)?;
    Ok(summary.is_success())
}

/// Transcription client; a dry run makes no calls and needs no key
fn transcriber_for(settings: &Settings, dry_run: bool) -> Result<Arc<dyn Transcriber>> {
    match settings.deepgram_client() {
        Ok(client) => Ok(Arc::new(client)),
        Err(e) if dry_run => {
            warn!("{}; continuing because this is a dry run", e);
            Ok(Arc::new(DeepgramClient::new(String::new(), None)?))
        }
        Err(e) => Err(e).context("Transcription is not configured"),
    }
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn print_episode(result: &EpisodeResult) {
    match result {
        EpisodeResult::Planned(plan) => {
            println!("Dry run, nothing transcribed or written:");
            println!("  Post:       {}", plan.post_path.display());
            println!("  Transcript: {}", plan.transcript_path.display());
            println!("  Media URL:  {}", plan.media_url);
            println!("  Publish:    {}", plan.publish_date.to_rfc3339());
        }
        EpisodeResult::Created {
            plan,
            tags,
            duration_label,
        } => {
            info!(slug = %plan.slug, "Episode ready for review");
            println!("Created episode:");
            println!("  Post:       {}", plan.post_path.display());
            println!("  Transcript: {}", plan.transcript_path.display());
            println!("  Duration:   {}", duration_label);
            println!("  Tags:       {}", tags.join(", "));
            println!();
            println!("Next steps:");
            println!("  1. Review and edit the generated summary and tags");
            println!("  2. podcast-reconcile upload {}", plan.media_filename);
            println!("  3. Commit and publish");
        }
    }
}
