use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};
use serde::Serialize;

use crate::{
    transformer::Transformer,
    utils::{anchor_slug, escape_attr},
};

/// Give every heading a unique id and append a permalink anchor to it.
pub struct HeadingAnchorTransformer<'a> {
    inner: std::vec::IntoIter<Event<'a>>,
}

impl<'a> Iterator for HeadingAnchorTransformer<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<'a, I> Transformer<'a, I> for HeadingAnchorTransformer<'a>
where
    I: Iterator<Item = Event<'a>>,
{
    fn transform(inner: I) -> Self {
        let events: Vec<Event<'a>> = inner.collect();
        Self {
            inner: anchor_headings(events).into_iter(),
        }
    }
}

/// One heading of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub level: u8,
    pub text: String,
    pub slug: String,
}

/// Assign ids to headings (explicit `{#id}` attributes win) and append a
/// `header-anchor` link inside each heading.
///
/// Explicit ids are kept verbatim and reserved up front; derived ids never
/// reuse an id already in the document.
pub fn anchor_headings<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    let mut out: Vec<Event<'a>> = Vec::with_capacity(events.len());
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|ev| match ev {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();

    let mut in_heading: Option<(usize, String, Option<String>)> = None;

    for ev in events {
        match (&mut in_heading, ev) {
            (
                None,
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }),
            ) => {
                let start_index = out.len();
                let existing_id = id.as_ref().map(|c| c.to_string());

                out.push(Event::Start(Tag::Heading {
                    level,
                    id: None,
                    classes,
                    attrs,
                }));

                in_heading = Some((start_index, String::new(), existing_id));
            }

            (Some((_, title_buf, _)), Event::Text(t)) => {
                title_buf.push_str(t.as_ref());
                out.push(Event::Text(t));
            }

            (Some((_, title_buf, _)), Event::Code(t)) => {
                title_buf.push_str(t.as_ref());
                out.push(Event::Code(t));
            }

            (Some((start_index, title_buf, existing_id)), Event::End(TagEnd::Heading(level))) => {
                let unique = match existing_id.take() {
                    Some(id) => id,
                    None => unused_slug(anchor_slug(title_buf.trim()), &mut used),
                };

                if let Event::Start(Tag::Heading { id, .. }) = &mut out[*start_index] {
                    *id = Some(CowStr::from(unique.clone()));
                }

                out.push(Event::Html(CowStr::from(format!(
                    r##"<a class="header-anchor" href="#{}" aria-hidden="true">#</a>"##,
                    escape_attr(&unique)
                ))));
                out.push(Event::End(TagEnd::Heading(level)));
                in_heading = None;
            }

            (_, other) => out.push(other),
        }
    }

    out
}

/// Read the heading outline back out of an anchored event stream.
pub fn outline(events: &[Event<'_>]) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut current: Option<(u8, String, String)> = None;

    for ev in events {
        match (&mut current, ev) {
            (None, Event::Start(Tag::Heading { level, id, .. })) => {
                let slug = id.as_ref().map(|c| c.to_string()).unwrap_or_default();
                current = Some((*level as u8, String::new(), slug));
            }
            (Some((_, text, _)), Event::Text(t) | Event::Code(t)) => text.push_str(t),
            (Some(_), Event::End(TagEnd::Heading(_))) => {
                if let Some((level, text, slug)) = current.take() {
                    entries.push(OutlineEntry {
                        level,
                        text: text.trim().to_string(),
                        slug,
                    });
                }
            }
            _ => {}
        }
    }

    entries
}

/// `base`, or the first of `base-2`, `base-3`, ... not yet taken.
fn unused_slug(base: String, used: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 1;
    while used.contains(&candidate) {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    used.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests;
