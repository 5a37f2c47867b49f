//! Splitting a source document into its metadata block and Markdown body.
//!
//! Two parsers share the [`FrontmatterParser`] interface: the structured YAML
//! parser used by the main build and a forgiving line scanner used when the
//! YAML is broken. [`WithFallback`] composes them so callers never need to
//! know which one produced the fields.
use std::collections::BTreeMap;

use serde_yaml::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::FieldValue;

pub type Fields = BTreeMap<String, FieldValue>;

const DELIMITER: &str = "---";

/// Metadata fields plus the body text that follows the block.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument<'a> {
    pub fields: Fields,
    pub body: &'a str,
}

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("malformed frontmatter: {0}")]
    Syntax(String),
    #[error("invalid frontmatter: {}", join_problems(.0))]
    Invalid(Vec<FieldProblem>),
}

/// One offending frontmatter field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldProblem {
    #[error("missing required field `{0}`")]
    Missing(&'static str),
    #[error("invalid date `{0}` (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid status `{0}` (expected draft, published or archived)")]
    InvalidStatus(String),
    #[error("categories must be a non-empty list")]
    InvalidCategories,
}

fn join_problems(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub trait FrontmatterParser {
    fn parse<'a>(&self, source: &'a str) -> Result<RawDocument<'a>, FrontmatterError>;
}

/// Outcome of looking for a `---` delimited block at the top of a document.
#[derive(Debug, PartialEq, Eq)]
pub enum Blocks<'a> {
    /// No opening delimiter: the whole document is body.
    Bare(&'a str),
    /// Opening delimiter without a closing one.
    Unterminated(&'a str),
    Split { meta: &'a str, body: &'a str },
}

pub fn split_blocks(source: &str) -> Blocks<'_> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lines = source.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Blocks::Bare(source);
    };
    if first.trim_end() != DELIMITER {
        return Blocks::Bare(source);
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Blocks::Split {
                meta: &source[start..offset],
                body: &source[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    Blocks::Unterminated(&source[start..])
}

/// Strict YAML frontmatter.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFrontmatter;

impl FrontmatterParser for YamlFrontmatter {
    fn parse<'a>(&self, source: &'a str) -> Result<RawDocument<'a>, FrontmatterError> {
        let (meta, body) = match split_blocks(source) {
            Blocks::Bare(body) => {
                return Ok(RawDocument {
                    fields: Fields::new(),
                    body,
                });
            }
            Blocks::Unterminated(_) => {
                return Err(FrontmatterError::Syntax(
                    "frontmatter block is never closed".to_string(),
                ));
            }
            Blocks::Split { meta, body } => (meta, body),
        };

        if meta.trim().is_empty() {
            return Ok(RawDocument {
                fields: Fields::new(),
                body,
            });
        }

        let value: Value =
            serde_yaml::from_str(meta).map_err(|e| FrontmatterError::Syntax(e.to_string()))?;
        let Value::Mapping(mapping) = value else {
            return Err(FrontmatterError::Syntax(
                "frontmatter must be a mapping of keys to values".to_string(),
            ));
        };

        let mut fields = Fields::new();
        for (key, value) in mapping {
            let Some(key) = scalar_text(&key) else {
                debug!("ignoring non-scalar frontmatter key {key:?}");
                continue;
            };
            if let Some(lowered) = lower(value) {
                fields.insert(key, lowered);
            } else {
                debug!("ignoring frontmatter key `{key}` with an empty or nested value");
            }
        }

        Ok(RawDocument { fields, body })
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn lower(value: Value) -> Option<FieldValue> {
    match value {
        Value::Null | Value::Mapping(_) => None,
        Value::Bool(b) => Some(FieldValue::Bool(b)),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::String(s) => Some(FieldValue::Text(s)),
        Value::Sequence(items) => Some(FieldValue::List(
            items.iter().filter_map(scalar_text).collect(),
        )),
        Value::Tagged(tagged) => lower(tagged.value),
    }
}

/// Degraded `key: value` scanner, tolerant of YAML it cannot understand.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFrontmatter;

impl FrontmatterParser for LineFrontmatter {
    fn parse<'a>(&self, source: &'a str) -> Result<RawDocument<'a>, FrontmatterError> {
        let (meta, body) = match split_blocks(source) {
            Blocks::Bare(body) => ("", body),
            Blocks::Unterminated(meta) => (meta, ""),
            Blocks::Split { meta, body } => (meta, body),
        };

        let fields = meta
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once(':'))
            .filter(|(key, _)| !key.trim().is_empty())
            .map(|(key, value)| (key.trim().to_string(), scan_value(value.trim())))
            .collect();

        Ok(RawDocument { fields, body })
    }
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

fn scan_value(raw: &str) -> FieldValue {
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(unquote)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        return FieldValue::List(items);
    }

    match raw {
        "true" => FieldValue::Bool(true),
        "false" => FieldValue::Bool(false),
        _ => FieldValue::Text(unquote(raw).to_string()),
    }
}

/// Try `primary`; when it reports a syntax error, use `fallback` instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: FrontmatterParser, F: FrontmatterParser> FrontmatterParser for WithFallback<P, F> {
    fn parse<'a>(&self, source: &'a str) -> Result<RawDocument<'a>, FrontmatterError> {
        match self.primary.parse(source) {
            Err(FrontmatterError::Syntax(reason)) => {
                warn!("falling back to the line scanner: {reason}");
                self.fallback.parse(source)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests;
