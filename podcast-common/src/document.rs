//! Front matter documents
//!
//! A document is a text file with an optional YAML attribute block delimited
//! by `---` lines, followed by a free-text body. Attributes keep their
//! insertion order, so rewriting a document only moves what was changed.
//!
//! Writes go through a sibling temp file and a rename, so an interrupted run
//! never leaves a half-written document behind.

use crate::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

const DELIMITER: &str = "---";

/// Parsed document: attributes plus body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Front matter attributes in file order
    pub attributes: Mapping,
    /// Everything after the closing delimiter line, verbatim
    pub body: String,
    /// Whether the source carried a front matter block at all
    pub has_front_matter: bool,
}

impl Document {
    /// Create a document from attributes and body
    pub fn new(attributes: Mapping, body: impl Into<String>) -> Self {
        Self {
            attributes,
            body: body.into(),
            has_front_matter: true,
        }
    }

    /// Parse document text; `path` is only used for error context
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.split_inclusive('\n');

        let first = match lines.next() {
            Some(line) => line,
            None => return Ok(Self::body_only(text)),
        };
        if first.trim_end() != DELIMITER {
            return Ok(Self::body_only(text));
        }

        let mut offset = first.len();
        let yaml_start = offset;
        let mut yaml_end = None;
        for line in lines {
            let line_start = offset;
            offset += line.len();
            let trimmed = line.trim_end();
            if trimmed == DELIMITER || trimmed == "..." {
                yaml_end = Some((line_start, offset));
                break;
            }
        }

        // An opening delimiter without a closing one is plain text
        let Some((yaml_end, body_start)) = yaml_end else {
            return Ok(Self::body_only(text));
        };

        let yaml = &text[yaml_start..yaml_end];
        let attributes = match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Null) => Mapping::new(),
            Ok(Value::Mapping(mapping)) => mapping,
            Ok(other) => {
                return Err(Error::front_matter(
                    path,
                    format!("expected a mapping, found {}", describe(&other)),
                ))
            }
            Err(e) => return Err(Error::front_matter(path, e)),
        };

        Ok(Self {
            attributes,
            body: text[body_start..].to_string(),
            has_front_matter: true,
        })
    }

    /// Read and parse a document from disk
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Render the document back to text
    pub fn render(&self) -> Result<String> {
        if self.attributes.is_empty() && !self.has_front_matter {
            return Ok(self.body.clone());
        }

        let yaml = if self.attributes.is_empty() {
            String::new()
        } else {
            serde_yaml::to_string(&self.attributes)
                .map_err(|e| Error::front_matter(PathBuf::new(), e))?
        };

        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{}", self.body))
    }

    /// Render and atomically replace the file at `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        let rendered = self.render()?;
        write_atomic(path, rendered.as_bytes())
    }

    fn body_only(text: &str) -> Self {
        Self {
            attributes: Mapping::new(),
            body: text.to_string(),
            has_front_matter: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// String attribute; numbers and booleans are not coerced
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Non-blank string attribute, trimmed
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get_str(key)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Integer attribute; numeric strings such as `"43"` are accepted
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Ordered list of scalar values rendered as strings
    ///
    /// A single scalar counts as a one-element list; a missing key or a null
    /// is an empty list.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(value) => scalar_to_string(value).into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub fn get_mapping(&self, key: &str) -> Option<&Mapping> {
        self.get(key).and_then(Value::as_mapping)
    }

    pub fn get_mapping_mut(&mut self, key: &str) -> Option<&mut Mapping> {
        self.attributes.get_mut(key).and_then(Value::as_mapping_mut)
    }

    /// Insert or replace an attribute, keeping its position when present
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(Value::from(key), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    /// True when the document carries the `type: transcript` marker
    pub fn is_transcript(&self) -> bool {
        self.get_str("type") == Some(crate::records::TRANSCRIPT_TYPE)
    }
}

/// Render a scalar value as the string an author would have typed
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Write `contents` to a temp file next to `path`, then rename over it
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("Not a file path: {}", path.display())))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    std::fs::write(&temp_path, contents)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}
