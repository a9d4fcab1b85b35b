//! Derive missing post summaries from the post body
//!
//! Episode posts open with a salutation and close with the hosts' sign-off;
//! the first real paragraph in between makes a serviceable description.

use super::{entry_for, Operation, Outcome, RunContext};
use crate::error::{ReconcileError, ReconcileResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

const SALUTATION: &str = "dear listener";
const SIGN_OFF: &str = "Thanks for listening";
/// A first paragraph shorter than this borrows the second one
const MIN_EXCERPT_CHARS: usize = 80;
const MAX_EXCERPT_CHARS: usize = 155;
const TRUNCATED_CHARS: usize = 152;

/// `# Title` style heading line
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#+[ \t]+\S.*$").expect("heading pattern is valid"));

/// Inline markdown link
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]\([^)]+\)").expect("link pattern is valid"));

pub struct ExcerptSummaries;

#[async_trait]
impl Operation for ExcerptSummaries {
    fn name(&self) -> &'static str {
        "excerpt-summaries"
    }

    fn scan(&self, ctx: &RunContext<'_>) -> ReconcileResult<Vec<PathBuf>> {
        Ok(ctx.index.records().map(|e| e.path.clone()).collect())
    }

    async fn apply(&self, item: &Path, ctx: &RunContext<'_>) -> ReconcileResult<Outcome> {
        let entry = entry_for(ctx, item)?;
        let (document, post) = entry.require_record()?;

        if post.summary.is_some() {
            return Ok(Outcome::Skipped("already has a summary".to_string()));
        }

        let excerpt = extract_excerpt(&post.body, &ctx.settings.show.hosts)
            .ok_or_else(|| ReconcileError::NoExcerpt(item.to_path_buf()))?;

        let mut updated = document.clone();
        updated.set("summary", excerpt.as_str());
        ctx.write_document(&updated, item)?;

        Ok(Outcome::Acted(format!("Added summary: {}", excerpt)))
    }
}

/// Short plain-text description taken from the opening of a body
pub fn extract_excerpt(body: &str, hosts: &[String]) -> Option<String> {
    let normalized = body.replace("\r\n", "\n");
    let without_headings = HEADING.replace_all(&normalized, "");
    let text: String = strip_links(&without_headings)
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect();

    let paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| is_content_paragraph(p, hosts))
        .collect();

    let mut excerpt = strip_salutation(paragraphs.first()?).to_string();
    if excerpt.chars().count() < MIN_EXCERPT_CHARS {
        if let Some(second) = paragraphs.get(1) {
            excerpt = format!("{} {}", excerpt, strip_salutation(second));
        }
    }

    let excerpt = excerpt.split_whitespace().collect::<Vec<_>>().join(" ");
    if excerpt.is_empty() {
        return None;
    }

    if excerpt.chars().count() > MAX_EXCERPT_CHARS {
        let cut: String = excerpt.chars().take(TRUNCATED_CHARS).collect();
        return Some(format!("{cut}..."));
    }
    Some(excerpt)
}

/// Replace `[text](target)` with `text`; the label may not contain brackets
fn strip_links(text: &str) -> String {
    LINK.replace_all(text, "$1").into_owned()
}

fn is_content_paragraph(paragraph: &str, hosts: &[String]) -> bool {
    if paragraph.is_empty() || is_salutation_only(paragraph) {
        return false;
    }
    if paragraph.starts_with(SIGN_OFF)
        || paragraph.starts_with("##")
        || paragraph.starts_with('[')
    {
        return false;
    }
    !hosts.iter().any(|host| paragraph.starts_with(host.as_str()))
}

fn is_salutation_only(paragraph: &str) -> bool {
    let lowered = paragraph.to_lowercase();
    let Some(rest) = lowered.strip_prefix(SALUTATION) else {
        return false;
    };
    rest.strip_prefix(',').unwrap_or(rest).trim().is_empty()
}

/// Drop a leading "Dear Listener," from a paragraph
fn strip_salutation(paragraph: &str) -> &str {
    let trimmed = paragraph.trim();
    if trimmed.len() < SALUTATION.len()
        || !trimmed.is_char_boundary(SALUTATION.len())
        || !trimmed[..SALUTATION.len()].eq_ignore_ascii_case(SALUTATION)
    {
        return trimmed;
    }
    let rest = &trimmed[SALUTATION.len()..];
    rest.strip_prefix(',').unwrap_or(rest).trim_start()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["Jon Kohlmeier".to_string(), "Stan Lemon".to_string()]
    }

    #[test]
    fn test_skips_salutation_and_sign_off() {
        let body = "Dear Listener,\n\nThis week we dig into the history of the **mechanical keyboard** and why Stan owns far too many of them.\n\nThanks for listening and we'll talk to you soon,\n\nStan Lemon & Jon Kohlmeier\n";
        assert_eq!(
            extract_excerpt(body, &hosts()).unwrap(),
            "This week we dig into the history of the mechanical keyboard and why Stan owns far too many of them."
        );
    }

    #[test]
    fn test_short_first_paragraph_borrows_second() {
        let body = "Short opener.\n\nAnd a [second](https://example.com) paragraph.";
        assert_eq!(
            extract_excerpt(body, &hosts()).unwrap(),
            "Short opener. And a second paragraph."
        );
    }

    #[test]
    fn test_long_excerpt_truncated() {
        let body = "word ".repeat(60);
        let excerpt = extract_excerpt(&body, &hosts()).unwrap();
        assert_eq!(excerpt.chars().count(), TRUNCATED_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_headings_and_bracketed_notes_dropped() {
        let body = "# Show Notes\n\n[Sponsor] Support the show\n\nThe actual content of the episode is right here, and it is long enough to stand on its own.";
        assert_eq!(
            extract_excerpt(body, &hosts()).unwrap(),
            "The actual content of the episode is right here, and it is long enough to stand on its own."
        );
    }

    #[test]
    fn test_salutation_prefix_removed_inline() {
        let body = "Dear Listener, this episode is about lemons and the twists they take in life, which is more than enough for a description.";
        assert!(extract_excerpt(body, &hosts()).unwrap().starts_with("this episode"));
    }

    #[test]
    fn test_nothing_usable() {
        assert_eq!(extract_excerpt("Dear Listener,\n\nStan Lemon\n", &hosts()), None);
        assert_eq!(extract_excerpt("", &hosts()), None);
    }

    #[test]
    fn test_strip_links_leaves_plain_brackets() {
        assert_eq!(strip_links("a [b] c"), "a [b] c");
        assert_eq!(strip_links("[x](y) and [z](w)"), "x and z");
        assert_eq!(strip_links("[a [b](c)"), "[a b");
    }

    #[test]
    fn test_heading_lines_removed_but_hashes_in_text_kept() {
        let text = "## Notes\nEpisode #43 is here\n#hashtag";
        assert_eq!(HEADING.replace_all(text, ""), "\nEpisode #43 is here\n#hashtag");
    }
}
