//! Transcript summary and keyword generation
//!
//! The model is asked for a fixed two-line answer (`SUMMARY:` then
//! `KEYWORDS:`); anything without both labels is rejected rather than
//! stored.

use super::{AdapterError, Summarizer};
use podcast_common::config::ShowConfig;

/// Word budget for the transcript portion of the prompt
pub const MAX_TRANSCRIPT_WORDS: usize = 8000;

pub const TRUNCATION_MARKER: &str = "\n\n[Transcript truncated for analysis...]";

const SUMMARY_LABEL: &str = "SUMMARY:";
const KEYWORDS_LABEL: &str = "KEYWORDS:";

/// Summary and keywords extracted from a model response
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptAnalysis {
    pub summary: String,
    pub keywords: Vec<String>,
}

/// Generate a summary and keywords for one transcript
pub async fn analyze_transcript(
    summarizer: &dyn Summarizer,
    show: &ShowConfig,
    title: &str,
    transcript: &str,
) -> Result<TranscriptAnalysis, AdapterError> {
    let prompt = build_prompt(show, title, transcript);
    let response = summarizer.generate(&prompt).await?;
    parse_analysis(&response)
}

/// Limit a transcript to the word budget, marking the cut
pub fn truncate_transcript(transcript: &str) -> String {
    let words: Vec<&str> = transcript.split_whitespace().collect();
    if words.len() <= MAX_TRANSCRIPT_WORDS {
        return transcript.to_string();
    }
    format!("{}{}", words[..MAX_TRANSCRIPT_WORDS].join(" "), TRUNCATION_MARKER)
}

pub fn build_prompt(show: &ShowConfig, title: &str, transcript: &str) -> String {
    format!(
        "Analyze this podcast transcript and provide a concise summary and relevant keywords.\n\
         \n\
         Podcast: \"{name}\"\n\
         Hosts: {hosts}\n\
         Episode: \"{title}\"\n\
         Topics: {topics}\n\
         \n\
         Transcript:\n\
         {transcript}\n\
         \n\
         Please provide your response in EXACTLY this format:\n\
         SUMMARY: [Write a 2-3 sentence summary that captures the main topics and discussion points]\n\
         KEYWORDS: keyword1, keyword2, keyword3, keyword4, keyword5, keyword6, keyword7\n\
         \n\
         Keep the summary engaging and informative. Keywords should be specific topics discussed (not generic terms).",
        name = show.name,
        hosts = show.hosts.join(" & "),
        title = title,
        topics = show.topics.join(", "),
        transcript = truncate_transcript(transcript),
    )
}

/// Extract the labelled summary and keyword list from a response
pub fn parse_analysis(response: &str) -> Result<TranscriptAnalysis, AdapterError> {
    let missing =
        || AdapterError::Parse("response lacks SUMMARY: and KEYWORDS: labels".to_string());

    let summary_start = response.find(SUMMARY_LABEL).ok_or_else(missing)? + SUMMARY_LABEL.len();
    let after_summary = &response[summary_start..];
    let keywords_at = after_summary.find(KEYWORDS_LABEL).ok_or_else(missing)?;

    let summary = clean_value(&after_summary[..keywords_at]);
    let keywords: Vec<String> = clean_value(&after_summary[keywords_at + KEYWORDS_LABEL.len()..])
        .split(',')
        .map(clean_value)
        .filter(|k| !k.is_empty())
        .collect();

    if summary.is_empty() {
        return Err(AdapterError::Parse("empty summary".to_string()));
    }
    if keywords.is_empty() {
        return Err(AdapterError::Parse("empty keyword list".to_string()));
    }

    Ok(TranscriptAnalysis { summary, keywords })
}

/// Trim whitespace and the emphasis markers models like to wrap labels in
fn clean_value(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '*').to_string()
}
