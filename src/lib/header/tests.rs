use proptest::{
    prelude::*,
    test_runner::{Config, TestRunner},
};

use super::{Header, check_fields, excerpt_from};
use crate::{
    config::SiteConfig,
    front_matter::{FieldProblem, Fields, FrontmatterError, FrontmatterParser, YamlFrontmatter},
    types::{FieldValue, IsoDate, SchemaType, Status},
};

fn fields(src: &str) -> Fields {
    YamlFrontmatter.parse(src).expect("yaml").fields
}

fn today() -> IsoDate {
    IsoDate::parse("2025-06-01").unwrap()
}

#[test]
fn minimal_source_gets_defaults() {
    let site = SiteConfig::default();
    let header = Header::from_fields(
        &fields("---\ntitle: \"A\"\ndescription: \"B\"\ndate: \"2024-01-01\"\n---\n"),
        &site,
        today(),
    )
    .unwrap();

    assert_eq!(header.slug.as_str(), "a");
    assert_eq!(header.categories, vec!["General".to_string()]);
    assert_eq!(header.status, Status::Published);
    assert!(!header.featured);
    assert_eq!(header.excerpt, "B");
    assert_eq!(header.seo_title, "A");
    assert_eq!(header.canonical_url, site.canonical_url("a"));
    assert_eq!(header.og_type, "article");
    assert_eq!(header.twitter_card, "summary_large_image");
    assert_eq!(header.schema_type, SchemaType::CreativeWork);
    assert_eq!(header.last_updated, today());
    assert!(header.hero_alt.is_none());
    assert!(header.extra.is_empty());
}

#[test]
fn every_problem_is_reported_in_field_order() {
    let problems = check_fields(&fields(
        "---\ndate: 2024-13-40\nstatus: live\ncategories: []\n---\n",
    ));
    assert_eq!(
        problems,
        vec![
            FieldProblem::Missing("title"),
            FieldProblem::Missing("description"),
            FieldProblem::InvalidDate("2024-13-40".into()),
            FieldProblem::InvalidStatus("live".into()),
            FieldProblem::InvalidCategories,
        ]
    );
}

#[test]
fn scalar_categories_are_rejected() {
    let problems = check_fields(&fields(
        "---\ntitle: A\ndescription: B\ndate: 2024-01-01\ncategories: Python\n---\n",
    ));
    assert_eq!(problems, vec![FieldProblem::InvalidCategories]);
}

#[test]
fn invalid_header_lists_problems() {
    let err = Header::from_fields(
        &fields("---\ndescription: B\ndate: 2024-01-01\n---\n"),
        &SiteConfig::default(),
        today(),
    )
    .unwrap_err();
    match err {
        FrontmatterError::Invalid(problems) => {
            assert_eq!(problems, vec![FieldProblem::Missing("title")]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn explicit_fields_win_and_extras_survive() {
    let src = "---\ntitle: Sales Dashboard\ndescription: Power BI report\ndate: 2024-02-03\nslug: Custom Slug\nstatus: draft\nfeatured: true\ncategories: [Power-BI, SQL]\nhero_image: images/hero.png\nschema_type: Dataset\nclient: ACME\n---\n";
    let header = Header::from_fields(&fields(src), &SiteConfig::default(), today()).unwrap();

    assert_eq!(header.slug.as_str(), "custom-slug");
    assert_eq!(header.status, Status::Draft);
    assert!(header.featured);
    assert_eq!(header.schema_type, SchemaType::Dataset);
    assert_eq!(
        header.hero_alt.as_deref(),
        Some("Preview of project: Sales Dashboard")
    );
    assert_eq!(
        header.hero_path().as_deref(),
        Some("images/projects/custom-slug/hero.png")
    );
    assert_eq!(header.og_image.as_deref(), Some("images/hero.png"));
    assert_eq!(header.extra.get("client"), Some(&FieldValue::Text("ACME".into())));
}

#[test]
fn social_meta_uses_absolute_images() {
    let site = SiteConfig::default();
    let header = Header::from_fields(
        &fields("---\ntitle: A & B\ndescription: d\ndate: 2024-01-01\nhero_image: hero.png\n---\n"),
        &site,
        today(),
    )
    .unwrap();
    let meta = header.social_meta(&site);
    assert!(meta.contains(r#"<meta property="og:title" content="A &amp; B">"#));
    let expected = format!(
        r#"<meta property="og:image" content="{}/images/projects/a-b/hero.png">"#,
        site.base()
    );
    assert!(meta.contains(&expected));
    assert!(meta.contains(r#"<link rel="canonical""#));
}

#[test]
fn derived_text_respects_caps() {
    let mut runner = TestRunner::new(Config {
        cases: 64,
        failure_persistence: None,
        ..Config::default()
    });
    runner
        .run(&("[A-Za-z ]{1,120}", "[A-Za-z#*` ]{1,400}"), |(title, description)| {
            prop_assume!(!title.trim().is_empty() && !description.trim().is_empty());
            prop_assume!(!description.trim().chars().all(|c| matches!(c, '#' | '*' | '`')));
            let mut raw = Fields::new();
            raw.insert("title".into(), FieldValue::Text(title));
            raw.insert("description".into(), FieldValue::Text(description.clone()));
            raw.insert("date".into(), FieldValue::Text("2024-01-01".into()));

            let header = Header::from_fields(&raw, &SiteConfig::default(), today()).unwrap();
            prop_assert!(header.seo_title.chars().count() <= 60);
            prop_assert!(header.seo_description.chars().count() <= 160);
            prop_assert!(header.excerpt.chars().count() <= 120);
            prop_assert!(!header.excerpt.contains(['#', '*', '`']));
            prop_assert_eq!(header.excerpt, excerpt_from(&description));
            Ok(())
        })
        .unwrap();
}
