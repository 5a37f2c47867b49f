use std::fs;

use tempfile::TempDir;

use super::{IssueKind, validate_projects};
use crate::{content::markdown_options, front_matter::YamlFrontmatter};

fn site_with(projects: &[(&str, Option<&str>)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (folder, source) in projects {
        let dir = tmp.path().join("projects").join(folder);
        fs::create_dir_all(&dir).unwrap();
        if let Some(source) = source {
            fs::write(dir.join("index.md"), source).unwrap();
        }
    }
    tmp
}

fn long_body() -> String {
    "word ".repeat(120)
}

#[test]
fn clean_project_passes() {
    let description = "A".repeat(130);
    let source = format!(
        "---\ntitle: Good\ndescription: \"{description}\"\ndate: 2024-01-01\nslug: good\ncategories: [Python]\nhero_image: https://cdn.example.com/hero.png\nseo_title: Good\nog_title: Good\n---\n{}",
        long_body()
    );
    let tmp = site_with(&[("good", Some(&source))]);

    let report = validate_projects(
        &YamlFrontmatter,
        &tmp.path().join("projects"),
        markdown_options(),
        "now",
    )
    .unwrap();

    assert!(report.passed());
    assert!(report.issues.warnings.is_empty(), "{:?}", report.issues.warnings);
    assert_eq!(report.summary.total_projects, 1);
    assert_eq!(report.projects[0].status, "unknown");
    assert_eq!(report.projects[0].word_count, 120);
}

#[test]
fn one_broken_project_does_not_hide_others() {
    let tmp = site_with(&[
        ("a-missing-title", Some("---\ndescription: d\ndate: 2024-01-01\n---\nbody\n")),
        ("b-no-source", None),
        ("c-bad-yaml", Some("---\ntitle: [oops\n---\n")),
        ("d-fine", Some("---\ntitle: T\ndescription: d\ndate: 2024-01-01\n---\nbody\n")),
    ]);

    let report = validate_projects(
        &YamlFrontmatter,
        &tmp.path().join("projects"),
        markdown_options(),
        "now",
    )
    .unwrap();

    let errors: Vec<(&str, IssueKind)> = report
        .issues
        .errors
        .iter()
        .map(|i| (i.project.as_str(), i.kind))
        .collect();
    assert_eq!(
        errors,
        vec![
            ("a-missing-title", IssueKind::MissingRequired),
            ("b-no-source", IssueKind::MissingFile),
            ("c-bad-yaml", IssueKind::ParseError),
        ]
    );
    assert_eq!(report.issues.errors[0].field.as_deref(), Some("title"));
    assert_eq!(report.summary.total_projects, 2);
    assert!(!report.passed());
}

#[test]
fn warnings_and_suggestions_are_collected() {
    let source = "---\ntitle: T\ndescription: short\ndate: 2024-01-01\ncategories: [a, b, c, d, e, f]\n---\n![](pic.png) [local](./notes.md)\n";
    let tmp = site_with(&[("p", Some(source))]);
    fs::create_dir_all(tmp.path().join("projects/p/images")).unwrap();

    let report = validate_projects(
        &YamlFrontmatter,
        &tmp.path().join("projects"),
        markdown_options(),
        "now",
    )
    .unwrap();

    let warnings: Vec<IssueKind> = report.issues.warnings.iter().map(|i| i.kind).collect();
    assert!(warnings.contains(&IssueKind::SeoWarning));
    assert!(warnings.contains(&IssueKind::ContentWarning));
    assert!(warnings.contains(&IssueKind::AccessibilityWarning));
    assert!(warnings.contains(&IssueKind::CategorizationWarning));
    assert!(warnings.contains(&IssueKind::EmptyImages));

    let suggestions: Vec<IssueKind> = report.issues.suggestions.iter().map(|i| i.kind).collect();
    assert_eq!(
        suggestions,
        vec![
            IssueKind::Suggestion,
            IssueKind::SeoSuggestion,
            IssueKind::SocialSuggestion,
        ]
    );
    assert!(report.passed());
}

#[test]
fn missing_hero_file_is_an_error() {
    let tmp = site_with(&[
        ("a", Some("---\ntitle: T\ndescription: d\ndate: 2024-01-01\nhero_image: images/hero.png\n---\n")),
        ("b", Some("---\ntitle: U\ndescription: d\ndate: 2024-01-01\nhero_image: ../images/projects/b/hero.png\n---\n")),
    ]);
    fs::create_dir_all(tmp.path().join("images/projects/b")).unwrap();
    fs::write(tmp.path().join("images/projects/b/hero.png"), b"png").unwrap();

    let report = validate_projects(
        &YamlFrontmatter,
        &tmp.path().join("projects"),
        markdown_options(),
        "now",
    )
    .unwrap();

    let errors: Vec<(&str, IssueKind)> = report
        .issues
        .errors
        .iter()
        .map(|i| (i.project.as_str(), i.kind))
        .collect();
    assert_eq!(errors, vec![("a", IssueKind::MissingImage)]);
}

#[test]
fn report_lands_under_projects() {
    let tmp = site_with(&[]);
    let report = validate_projects(
        &YamlFrontmatter,
        &tmp.path().join("projects"),
        markdown_options(),
        "now",
    )
    .unwrap();
    assert!(report.passed());

    let path = report.write(&tmp.path().join("public")).unwrap();
    assert!(path.ends_with("projects/validation-report.json"));
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["summary"]["errors"], 0);
}
