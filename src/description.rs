// Description returned by the analysis endpoint, plus a best-effort parser
// that pulls short features and named sections out of the text.

use serde::ser::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::io;

/// Result of an analysis request.
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    /// The `"text"` field of the response.
    Text(String),
    /// The whole response object, kept when it has no usable `"text"`.
    Raw(Map<String, Value>),
}

impl Description {
    /// A non-empty string `"text"` wins; anything else keeps the full object.
    pub fn from_response(body: Map<String, Value>) -> Self {
        match body.get("text") {
            Some(Value::String(text)) if !text.is_empty() => Description::Text(text.clone()),
            _ => Description::Raw(body),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Description::Text(text) => Some(text),
            Description::Raw(_) => None,
        }
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Description::Text(text) => f.write_str(text),
            Description::Raw(body) => f.write_str(&render_spaced(body).map_err(|_| fmt::Error)?),
        }
    }
}

/// JSON with `", "` and `": "` separators, e.g. `{"result": "ok"}`.
fn render_spaced(body: &Map<String, Value>) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, SpacedFormatter);
    body.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Features and sections found in a free-text description. Every field may
/// be empty; the model is not obliged to follow any layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlights {
    pub features: Vec<String>,
    pub hair: Option<String>,
    pub skin: Option<String>,
    pub recommendations: Vec<String>,
}

impl Highlights {
    pub fn extract(text: &str) -> Self {
        let features = comma_features(text).unwrap_or_else(|| bullet_features(text));
        Highlights {
            features,
            hair: section(text, "hair analysis:", &["skin analysis:", "guidelines:"]),
            skin: section(text, "skin analysis:", &["guidelines:"]),
            recommendations: recommendations(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
            && self.hair.is_none()
            && self.skin.is_none()
            && self.recommendations.is_empty()
    }
}

const FEATURES_PREFIX: &str = "key features:";

fn strip_features_prefix(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.get(..FEATURES_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(FEATURES_PREFIX) => &trimmed[FEATURES_PREFIX.len()..],
        _ => trimmed,
    }
}

fn is_feature_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ' ' || c == '\t' || c == '"' || c == '\'' || c == '-' || c == ','
}

fn clean_item(item: &str) -> &str {
    item.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == '-')
}

fn comma_features(text: &str) -> Option<Vec<String>> {
    text.lines().find_map(|line| {
        let line = strip_features_prefix(line);
        let end = line
            .char_indices()
            .find(|(_, c)| !is_feature_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        let run = &line[..end];
        if !run.contains(',') {
            return None;
        }
        let items: Vec<String> = run
            .split(',')
            .map(clean_item)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        (items.len() >= 2).then_some(items)
    })
}

fn bullet_features(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| strip_features_prefix(line).trim())
        .skip_while(|line| !line.starts_with('-'))
        .take_while(|line| line.starts_with('-'))
        .map(clean_item)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Text after `start` up to the earliest of `ends` (or the end). Matching is
/// ASCII case-insensitive, which keeps byte offsets aligned with `text`.
fn section(text: &str, start: &str, ends: &[&str]) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let from = lower.find(start)? + start.len();
    let to = ends
        .iter()
        .filter_map(|end| lower[from..].find(end).map(|i| from + i))
        .min()
        .unwrap_or(text.len());
    let body = text[from..to].trim();
    (!body.is_empty()).then(|| body.to_string())
}

fn recommendations(text: &str) -> Vec<String> {
    const HEADING: &str = "recommendation";
    let lower = text.to_ascii_lowercase();
    // first occurrence that is a heading, i.e. followed by ":" or "s:"
    let from = lower.match_indices(HEADING).find_map(|(pos, _)| {
        let after = pos + HEADING.len();
        let rest = &lower[after..];
        if rest.starts_with("s:") {
            Some(after + 2)
        } else if rest.starts_with(':') {
            Some(after + 1)
        } else {
            None
        }
    });
    let Some(from) = from else {
        return Vec::new();
    };
    text[from..]
        .split(['\n', '.'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
