//! Shared data types for the portfolio generator.
//! Implemented as newtypes and enums to enforce invariants.

use std::fmt;

use serde::{Serialize, Serializer};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::utils::slugify;

const ISO_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const LONG_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none] [month repr:long] [year]");

/// Calendar date written as "YYYY-MM-DD".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IsoDate(Date);

impl IsoDate {
    pub fn parse(s: &str) -> Option<Self> {
        Date::parse(s.trim(), ISO_FORMAT).ok().map(Self)
    }

    pub fn today(now: OffsetDateTime) -> Self {
        Self(now.date())
    }

    pub fn as_str(&self) -> String {
        self.0.format(ISO_FORMAT).unwrap_or_default()
    }

    /// Human-readable form, e.g. "5 March 2024".
    pub fn long(&self) -> String {
        self.0.format(LONG_FORMAT).unwrap_or_default()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl Serialize for IsoDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

/// Publication state of a project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    #[default]
    Published,
    Archived,
}

impl Status {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn is_draft(self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// schema.org type used for a project's structured data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SchemaType {
    SoftwareApplication,
    Dataset,
    WebSite,
    CreativeWork,
    Other(String),
}

const SOFTWARE_KEYWORDS: &[&str] = &[
    "automation",
    "automatisation",
    "python",
    "n8n",
    "ai",
    "ia",
    "no-code",
];
const DATASET_KEYWORDS: &[&str] = &["power-bi", "sql", "data", "analysis", "analyse"];
const WEBSITE_KEYWORDS: &[&str] = &["vibe-coding", "portfolio"];

impl SchemaType {
    /// Classify from categories; first matching rule wins.
    pub fn infer<S: AsRef<str>>(categories: &[S]) -> Self {
        let cats: Vec<String> = categories
            .iter()
            .map(|c| c.as_ref().trim().to_lowercase())
            .collect();
        let any_of = |keywords: &[&str]| cats.iter().any(|c| keywords.contains(&c.as_str()));

        if any_of(SOFTWARE_KEYWORDS) {
            Self::SoftwareApplication
        } else if any_of(DATASET_KEYWORDS) {
            Self::Dataset
        } else if any_of(WEBSITE_KEYWORDS) {
            Self::WebSite
        } else {
            Self::CreativeWork
        }
    }

    pub fn from_name(raw: &str) -> Self {
        match raw.trim() {
            "SoftwareApplication" => Self::SoftwareApplication,
            "Dataset" => Self::Dataset,
            "WebSite" => Self::WebSite,
            "CreativeWork" => Self::CreativeWork,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::SoftwareApplication => "SoftwareApplication",
            Self::Dataset => "Dataset",
            Self::WebSite => "WebSite",
            Self::CreativeWork => "CreativeWork",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchemaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// URL-safe project identifier: lowercase ASCII letters, digits and hyphens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn derive(title: &str) -> Self {
        Self(slugify(title))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A frontmatter value after lowering from YAML (or the line scanner).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Bool(bool),
    Number(f64),
}

impl FieldValue {
    /// Scalar rendered as text; lists have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(format_number(*n)),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Truthiness in the sense of "a value was given".
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(s) => !s.trim().is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => matches!(s.trim(), "true" | "yes"),
            Self::Number(n) => *n != 0.0,
            Self::List(items) => !items.is_empty(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
