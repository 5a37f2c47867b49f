use std::path::PathBuf;

use tempfile::TempDir;
use time::macros::datetime;

use super::{
    Priority, RecommendationKind, recommendations, robots_txt, seo_report, sitemap_xml,
    social_data, structured_data, write_seo_package,
};
use crate::{
    config::SiteConfig,
    content::markdown_options,
    front_matter::YamlFrontmatter,
    project::Project,
    types::IsoDate,
};

fn project(title: &str, extra: &str) -> Project {
    Project::parse(
        &YamlFrontmatter,
        PathBuf::from(format!("projects/{title}/index.md")),
        &format!("---\ntitle: \"{title}\"\ndescription: \"About {title}\"\ndate: 2024-01-01\nlast_updated: 2024-02-02\n{extra}---\nbody\n"),
        &SiteConfig::default(),
        IsoDate::parse("2025-01-01").unwrap(),
        markdown_options(),
    )
    .unwrap()
}

fn today() -> IsoDate {
    IsoDate::parse("2025-06-01").unwrap()
}

#[test]
fn sitemap_lists_sections_then_published_projects() {
    let site = SiteConfig::default();
    let projects = vec![
        project("Alpha", "featured: true\n"),
        project("Beta", "status: draft\n"),
        project("Gamma", "status: archived\n"),
        project("Delta", ""),
    ];
    let xml = sitemap_xml(&projects, &site, today());

    assert_eq!(xml.matches("<url>").count(), 4 + 2);
    assert!(xml.contains(&format!("<loc>{}</loc>", site.base())));
    assert!(xml.contains(&format!("<loc>{}/#contact</loc>", site.base())));
    assert!(xml.contains(&format!("<loc>{}</loc>", site.canonical_url("alpha"))));
    assert!(!xml.contains("/projects/beta<"));
    assert!(!xml.contains("/projects/gamma<"));
    assert_eq!(xml.matches("<priority>0.8</priority>").count(), 1);
    assert!(xml.contains("<lastmod>2024-02-02</lastmod>"));
    assert!(xml.contains("<lastmod>2025-06-01</lastmod>"));
    assert!(!xml.contains("xmlns:image"));
}

#[test]
fn sitemap_adds_image_namespace_for_hero_images() {
    let site = SiteConfig::default();
    let xml = sitemap_xml(&[project("Alpha", "hero_image: images/hero.png\n")], &site, today());

    assert!(xml.contains("xmlns:image="));
    assert!(xml.contains(&format!(
        "<image:loc>{}/images/projects/alpha/hero.png</image:loc>",
        site.base()
    )));
}

#[test]
fn robots_points_at_sitemap() {
    let site = SiteConfig::default();
    let robots = robots_txt(&site, "2025-06-01 10:00:00");
    assert!(robots.starts_with("User-agent: *\nAllow: /\n"));
    assert!(robots.contains(&format!("Sitemap: {}/sitemap.xml", site.base())));
    assert!(robots.contains("Disallow: /backup/"));
    assert!(robots.contains("# Generated on 2025-06-01 10:00:00"));
}

#[test]
fn structured_data_lists_top_projects() {
    let site = SiteConfig::default();
    let projects: Vec<Project> = (0..12).map(|i| project(&format!("P{i}"), "")).collect();
    let data = structured_data(&projects, &site, "2025-06-01T00:00:00Z");

    assert_eq!(data["person"]["@type"], "Person");
    assert_eq!(data["website"]["potentialAction"]["@type"], "SearchAction");
    assert_eq!(data["portfolio"]["numberOfItems"], 12);
    let items = data["portfolio"]["itemListElement"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["position"], 1);
    assert_eq!(data["generated"], "2025-06-01T00:00:00Z");
}

#[test]
fn social_data_resolves_absolute_images() {
    let site = SiteConfig::default();
    let data = social_data(
        &[project("Alpha", "categories: [Python]\ntags: [etl]\nog_image: /images/card.png\n")],
        &site,
    );

    assert_eq!(data.main_site.og.kind, "website");
    let entry = &data.projects[0];
    assert_eq!(entry.og.image, format!("{}/images/card.png", site.base()));
    assert_eq!(entry.twitter.image, absolute_default(&site));
    let article = entry.og.article.as_ref().unwrap();
    assert_eq!(article.section.as_deref(), Some("Python"));
    assert_eq!(article.tags, vec!["Python".to_string(), "etl".to_string()]);
}

fn absolute_default(site: &SiteConfig) -> String {
    format!("{}/{}", site.base(), site.twitter_image)
}

#[test]
fn recommendations_follow_priority_order() {
    let projects = [
        project("Alpha", "github_url: https://github.com/a/b\nhero_image: hero.png\n"),
        project("Beta", ""),
    ];
    let refs: Vec<&Project> = projects.iter().collect();
    let recs = recommendations(&refs);

    let kinds: Vec<(RecommendationKind, Priority, usize)> =
        recs.iter().map(|r| (r.kind, r.priority, r.count)).collect();
    assert_eq!(
        kinds,
        vec![
            (RecommendationKind::MetaDescription, Priority::High, 2),
            (RecommendationKind::Images, Priority::Medium, 1),
            (RecommendationKind::GithubLinks, Priority::Low, 1),
        ]
    );
    assert_eq!(recs[1].message, "1 projects are missing hero images");
}

#[test]
fn report_counts_published_only() {
    let projects = vec![
        project("Alpha", "featured: true\ncategories: [SQL]\n"),
        project("Beta", "status: draft\ncategories: [SQL]\n"),
    ];
    let report = seo_report(&projects, today(), "now");

    assert_eq!(report.summary.total_projects, 2);
    assert_eq!(report.summary.published_projects, 1);
    assert_eq!(report.summary.featured_projects, 1);
    assert_eq!(report.content_analysis.categories_distribution["SQL"], 1);
    assert_eq!(report.seo["sitemap"]["urls"], 5);
}

#[test]
fn package_writes_every_artifact() {
    let tmp = TempDir::new().unwrap();
    let summary = write_seo_package(
        &[project("Alpha", "")],
        &SiteConfig::default(),
        datetime!(2025-06-01 12:30:00 UTC),
        tmp.path(),
    )
    .unwrap();

    assert_eq!(summary.sitemap_urls, 5);
    for file in [
        "sitemap.xml",
        "robots.txt",
        "structured-data.json",
        "social-media-data.json",
        "seo-report.json",
    ] {
        assert!(tmp.path().join(file).is_file(), "{file} missing");
    }
    let robots = std::fs::read_to_string(tmp.path().join("robots.txt")).unwrap();
    assert!(robots.contains("# Generated on 2025-06-01 12:30:00"));
}
