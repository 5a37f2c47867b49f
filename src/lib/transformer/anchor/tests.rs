use std::collections::HashSet;

use proptest::{
    prelude::*,
    test_runner::{Config, TestRunner},
};
use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::{
    transformer::{
        WithTransformer,
        anchor::{HeadingAnchorTransformer, anchor_headings, outline},
    },
    utils::anchor_slug,
};

#[test]
fn anchors_assign_unique_ids() {
    let mut runner = TestRunner::new(Config {
        cases: 16,
        failure_persistence: None,
        ..Config::default()
    });

    runner
        .run(
            &proptest::collection::vec("[A-Za-z0-9 ]{1,16}", 1..6),
            |headings| {
                let mut events = Vec::new();
                for title in &headings {
                    events.push(Event::Start(Tag::Heading { level: HeadingLevel::H2, id: None, classes: vec![], attrs: vec![] }));
                    events.push(Event::Text(CowStr::from(title.clone())));
                    events.push(Event::End(TagEnd::Heading(HeadingLevel::H2)));
                }

                let out = anchor_headings(events);

                let mut ids = Vec::new();
                for ev in &out {
                    if let Event::Start(Tag::Heading { id: Some(id), .. }) = ev {
                        ids.push(id.to_string());
                    }
                }

                prop_assert_eq!(ids.len(), headings.len());
                let mut seen_ids = HashSet::new();
                for (title, id) in headings.iter().zip(ids.iter()) {
                    prop_assert!(seen_ids.insert(id.clone()), "duplicate id {}", id);

                    let slug = anchor_slug(title.trim());
                    prop_assert!(
                        *id == slug || id.strip_prefix(&format!("{slug}-")).is_some_and(|n| n.parse::<usize>().is_ok()),
                        "id {} does not extend {}",
                        id,
                        slug
                    );
                }

                let anchors = out.iter().filter(|e| matches!(e, Event::Html(_))).count();
                prop_assert_eq!(anchors, headings.len());
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn explicit_ids_win_and_outline_matches() {
    let md = "# Intro\n\n## Setup {#install}\n\n## Intro\n\n### `cargo` usage\n";
    let events: Vec<Event<'_>> = Parser::new_ext(md, Options::ENABLE_HEADING_ATTRIBUTES)
        .with_transformer::<HeadingAnchorTransformer<'_>>()
        .collect();

    let entries = outline(&events);
    let summary: Vec<(u8, &str, &str)> = entries
        .iter()
        .map(|e| (e.level, e.text.as_str(), e.slug.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Intro", "intro"),
            (2, "Setup", "install"),
            (2, "Intro", "intro-2"),
            (3, "cargo usage", "cargo-usage"),
        ]
    );

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    assert!(html.contains(r#"<h2 id="install">"#));
    assert!(html.contains(r##"<a class="header-anchor" href="#install" aria-hidden="true">#</a></h2>"##));
}

fn outline_slugs(md: &str) -> Vec<String> {
    let events: Vec<Event<'_>> = Parser::new_ext(md, Options::ENABLE_HEADING_ATTRIBUTES)
        .with_transformer::<HeadingAnchorTransformer<'_>>()
        .collect();
    outline(&events).into_iter().map(|e| e.slug).collect()
}

#[test]
fn suffixed_ids_never_collide_with_later_headings() {
    let slugs = outline_slugs("# Intro\n\n# Intro\n\n# Intro 2\n\n## Setup {#notes}\n\n## Notes\n");
    assert_eq!(slugs, vec!["intro", "intro-2", "intro-2-2", "notes", "notes-2"]);

    let unique: HashSet<&String> = slugs.iter().collect();
    assert_eq!(unique.len(), slugs.len());
}

#[test]
fn explicit_id_is_kept_when_an_earlier_heading_derives_it() {
    assert_eq!(
        outline_slugs("## Notes\n\n## Appendix {#notes}\n"),
        vec!["notes-2", "notes"]
    );
}
