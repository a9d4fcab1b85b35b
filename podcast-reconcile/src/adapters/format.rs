//! Transcript markdown rendering

use super::Utterance;
use podcast_common::time::format_timestamp;

/// Body written when the provider returned no utterances
pub const EMPTY_TRANSCRIPT: &str = "No transcript available.";

/// Render utterances as speaker-labelled, timestamped markdown
pub fn format_transcript(utterances: &[Utterance]) -> String {
    if utterances.is_empty() {
        return EMPTY_TRANSCRIPT.to_string();
    }

    let mut markdown = String::new();
    for utterance in utterances {
        markdown.push_str(&format!(
            "**SPEAKER_{}** [{}]\n\n{}\n\n",
            utterance.speaker,
            format_timestamp(utterance.start_seconds),
            utterance.text
        ));
    }
    markdown
}
