//! Markdown body rendering and the statistics derived from it.
use std::fmt;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::{Serialize, Serializer};

use crate::{
    config::{COMPLEXITY_CAP, WORDS_PER_MINUTE},
    transformer::{
        WithTransformer,
        anchor::{HeadingAnchorTransformer, OutlineEntry, outline},
    },
    utils::is_absolute_url,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRef {
    pub text: String,
    pub url: String,
    pub is_external: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub alt: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

/// HTML plus everything extracted while rendering a project body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderedContent {
    pub html: String,
    pub outline: Vec<OutlineEntry>,
    pub links: Vec<LinkRef>,
    pub images: Vec<ImageRef>,
    pub code_blocks: Vec<CodeBlock>,
    pub word_count: usize,
    pub char_count: usize,
}

impl RenderedContent {
    pub fn external_links(&self) -> usize {
        self.links.iter().filter(|l| l.is_external).count()
    }

    pub fn reading_time(&self) -> ReadingTime {
        ReadingTime::from_words(self.word_count)
    }
}

/// Whole minutes needed to read a text, rounded up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReadingTime(u32);

impl ReadingTime {
    pub fn from_words(words: usize) -> Self {
        let minutes = words.div_ceil(WORDS_PER_MINUTE);
        Self(u32::try_from(minutes).unwrap_or(u32::MAX))
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("under 1 minute"),
            n => write!(f, "{n} min"),
        }
    }
}

impl Serialize for ReadingTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_GFM);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Render a Markdown body to HTML and collect its outline, links, images and
/// code blocks.
pub fn render(body: &str, options: Options) -> RenderedContent {
    let events: Vec<Event<'_>> = Parser::new_ext(body, options)
        .with_transformer::<HeadingAnchorTransformer<'_>>()
        .collect();

    let (links, images, code_blocks) = collect_references(&events);
    let outline = outline(&events);

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());

    RenderedContent {
        html,
        outline,
        links,
        images,
        code_blocks,
        word_count: body.split_whitespace().count(),
        char_count: body.chars().count(),
    }
}

fn collect_references(events: &[Event<'_>]) -> (Vec<LinkRef>, Vec<ImageRef>, Vec<CodeBlock>) {
    let mut links = Vec::new();
    let mut images = Vec::new();
    let mut code_blocks = Vec::new();

    let mut link: Option<(String, String)> = None;
    let mut image: Option<(String, String)> = None;
    let mut code: Option<(String, String)> = None;

    for ev in events {
        match ev {
            Event::Start(Tag::Link { dest_url, .. }) => {
                link = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Link) => {
                if let Some((url, text)) = link.take() {
                    links.push(LinkRef {
                        is_external: is_absolute_url(&url),
                        text: text.trim().to_string(),
                        url,
                    });
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                image = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((src, alt)) = image.take() {
                    images.push(ImageRef {
                        alt: alt.trim().to_string(),
                        src,
                    });
                }
            }
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let language = info
                    .split_whitespace()
                    .next()
                    .unwrap_or("text")
                    .to_string();
                code = Some((language, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, code)) = code.take() {
                    code_blocks.push(CodeBlock { language, code });
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, buf)) = code.as_mut() {
                    buf.push_str(t);
                } else if let Some((_, alt)) = image.as_mut() {
                    alt.push_str(t);
                } else if let Some((_, text)) = link.as_mut() {
                    text.push_str(t);
                }
            }
            _ => {}
        }
    }

    (links, images, code_blocks)
}

/// Effort estimate from 1 to 10.
///
/// Base 1, +0.2 per category, +0.3 per tech-stack entry, +2 above 2000 words
/// (+1 above 1000), +0.5 per code block and +0.1 per external link, rounded
/// up. Computed in tenths to keep the rounding exact.
pub fn complexity(categories: usize, tech_stack: usize, content: &RenderedContent) -> u8 {
    let length_bonus = match content.word_count {
        n if n > 2000 => 20,
        n if n > 1000 => 10,
        _ => 0,
    };
    let tenths = 10
        + 2 * categories
        + 3 * tech_stack
        + length_bonus
        + 5 * content.code_blocks.len()
        + content.external_links();

    let score = tenths.div_ceil(10).min(usize::from(COMPLEXITY_CAP));
    u8::try_from(score).unwrap_or(COMPLEXITY_CAP).max(1)
}
