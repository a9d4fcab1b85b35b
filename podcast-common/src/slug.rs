//! Slug normalization
//!
//! Maps a display string (a category, a tag, a title) to the canonical key
//! used for identity. Two strings that differ only by case, surrounding
//! whitespace or separator run length normalize to the same key.

/// Normalize a display string into its canonical key
///
/// Lower-cases, trims, drops everything that is not an ASCII word character,
/// whitespace or `-`, collapses each run of whitespace/`_`/`-` into a single
/// `-`, then strips leading and trailing hyphens. Never fails; the result may
/// be empty.
pub fn normalize(display: &str) -> String {
    let lowered = display.to_lowercase();
    let mut key = String::with_capacity(lowered.len());
    let mut in_separator = false;

    for c in lowered.trim().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            in_separator = true;
            continue;
        }
        if !c.is_ascii_alphanumeric() {
            // Stripped characters do not break a separator run
            continue;
        }
        if in_separator && !key.is_empty() {
            key.push('-');
        }
        in_separator = false;
        key.push(c);
    }

    key
}
