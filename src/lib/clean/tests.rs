use std::{fs, path::Path};

use tempfile::TempDir;

use super::{CleanOptions, CleanTarget, UnknownTarget, clean};

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"x").unwrap();
}

fn built_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("public");
    for file in [
        "projects/a/index.html",
        "projects/b/index.html",
        "projects/index.json",
        "projects/index-simple.json",
        "projects/tags-metadata.json",
        "projects/validation-report.json",
        "images/projects/a/hero.png",
        "sitemap.xml",
        "robots.txt",
        "structured-data.json",
        "social-media-data.json",
        "seo-report.json",
    ] {
        touch(&out.join(file));
    }
    tmp
}

#[test]
fn targets_parse_from_names() {
    assert_eq!("html".parse::<CleanTarget>(), Ok(CleanTarget::Html));
    assert_eq!("reports".parse::<CleanTarget>(), Ok(CleanTarget::Reports));
    assert_eq!(
        "css".parse::<CleanTarget>(),
        Err(UnknownTarget("css".to_string()))
    );
}

#[test]
fn dry_run_removes_nothing() {
    let tmp = built_site();
    let out = tmp.path().join("public");
    let report = clean(
        &out,
        &[],
        CleanOptions {
            dry_run: true,
            verbose: false,
        },
    );

    assert_eq!(report.stats.files_removed, 0);
    assert_eq!(report.planned.len(), 12);
    assert!(out.join("projects/a/index.html").is_file());
    assert!(out.join("sitemap.xml").is_file());
}

#[test]
fn targeted_clean_keeps_other_groups() {
    let tmp = built_site();
    let out = tmp.path().join("public");
    let report = clean(&out, &[CleanTarget::Seo, CleanTarget::Seo], CleanOptions::default());

    assert_eq!(report.stats.files_removed, 4);
    assert!(!out.join("sitemap.xml").exists());
    assert!(out.join("seo-report.json").is_file());
    assert!(out.join("projects/index.json").is_file());
}

#[test]
fn html_clean_drops_pages_and_their_folders() {
    let tmp = built_site();
    let out = tmp.path().join("public");
    let report = clean(&out, &[CleanTarget::Html], CleanOptions::default());

    assert_eq!(report.stats.files_removed, 2);
    assert!(!out.join("projects/a").exists());
    assert!(!out.join("images/projects").exists());
    assert!(out.join("projects/index.json").is_file());
}

#[test]
fn full_clean_removes_empty_output() {
    let tmp = built_site();
    let out = tmp.path().join("public");
    let report = clean(&out, &[], CleanOptions::default());

    assert_eq!(report.stats.errors, 0);
    assert_eq!(report.stats.files_removed, 11);
    assert!(!out.exists());

    let again = clean(&out, &[], CleanOptions::default());
    assert_eq!(again.stats.skipped, 4);
}
