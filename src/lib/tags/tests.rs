use proptest::{
    prelude::*,
    test_runner::{Config, TestRunner},
};

use super::{FilterKind, TagMetadata, tag_color};
use crate::{
    config::SiteConfig,
    front_matter::{FrontmatterParser, YamlFrontmatter},
    header::Header,
    project::ProjectRecord,
    types::IsoDate,
};

fn record(categories: &str, tech: &str, tags: &str) -> ProjectRecord {
    let src = format!(
        "---\ntitle: T\ndescription: D\ndate: 2024-01-01\ncategories: [{categories}]\ntech_stack: [{tech}]\ntags: [{tags}]\n---\n"
    );
    let fields = YamlFrontmatter.parse(&src).unwrap().fields;
    let header = Header::from_fields(
        &fields,
        &SiteConfig::default(),
        IsoDate::parse("2024-01-01").unwrap(),
    )
    .unwrap();
    let content = crate::content::render("", crate::content::markdown_options());
    crate::project::Project {
        source: "projects/t/index.md".into(),
        header,
        content,
        complexity: 1,
    }
    .record()
}

#[test]
fn palette_and_hash_colours() {
    assert_eq!(tag_color("Python"), "#3776ab");
    assert_eq!(tag_color("Power BI"), "#f2c811");
    let generated = tag_color("Excel");
    assert!(generated.starts_with("hsl("));
}

#[test]
fn colours_are_deterministic() {
    let mut runner = TestRunner::new(Config {
        failure_persistence: None,
        ..Config::default()
    });
    runner
        .run(&".{0,24}", |name| {
            let color = tag_color(&name);
            prop_assert_eq!(&color, &tag_color(&name));
            prop_assert!(color.starts_with('#') || color.starts_with("hsl("));
            Ok(())
        })
        .unwrap();
}

#[test]
fn filters_rank_by_usage() {
    let records = vec![
        record("SQL, Data", "pandas, docker", "bi"),
        record("SQL", "pandas", ""),
        record("Python", "docker, fastapi", "api"),
    ];
    let meta = TagMetadata::build(&records, "now");

    assert_eq!(meta.summary.total_categories, 3);
    assert_eq!(meta.summary.total_tags, 2);
    assert_eq!(meta.summary.total_tech_stack, 3);

    let filters: Vec<(&str, FilterKind, usize)> = meta
        .filters
        .iter()
        .map(|f| (f.name.as_str(), f.kind, f.count))
        .collect();
    assert_eq!(
        filters,
        vec![
            ("SQL", FilterKind::Category, 2),
            ("docker", FilterKind::Technology, 2),
            ("pandas", FilterKind::Technology, 2),
            ("Data", FilterKind::Category, 1),
            ("Python", FilterKind::Category, 1),
        ]
    );

    let sql = meta.categories.iter().find(|c| c.name == "SQL").unwrap();
    assert_eq!(sql.slug, "sql");
    assert_eq!(sql.color.as_deref(), Some("#336791"));
    assert!(meta.tags.iter().all(|t| t.color.is_none()));

    let json = serde_json::to_value(&meta).unwrap();
    assert_eq!(json["filters"][1]["type"], "technology");
}
