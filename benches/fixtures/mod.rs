use std::{fs, path::Path, time::Duration};

use tempfile::TempDir;

use libfolio::{
    config::{INPUT_DIR, PROJECT_TEMPLATE, TEMPLATES_DIR},
    page::DEFAULT_TEMPLATE,
};

/// Options to synthesize a portfolio for benchmarking.
#[derive(Clone, Debug)]
pub struct SiteOptions {
    pub projects: usize,
    pub body_bytes: usize,
    pub with_code: bool,
    pub with_links: bool,
    pub with_images: bool,
    pub draft_every: Option<usize>,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            projects: 10,
            body_bytes: 2_000,
            with_code: true,
            with_links: true,
            with_images: false,
            draft_every: None,
        }
    }
}

const CATEGORIES: [&str; 4] = ["Python", "SQL", "Power BI", "Automation"];

/// Markdown body of roughly `opts.body_bytes` bytes.
pub fn project_body(opts: &SiteOptions) -> String {
    let chunk = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";
    let mut body = String::from("## Context\n\n");
    body.push_str(&chunk.repeat((opts.body_bytes / chunk.len()).max(1)));

    if opts.with_code {
        body.push_str("\n\n## Code\n\n```python\nimport pandas as pd\ndf = pd.read_csv(\"x.csv\")\n```\n");
    }
    if opts.with_links {
        body.push_str("\nSee [the repo](https://github.com/example/repo) and [notes](../notes/).\n");
    }
    if opts.with_images {
        body.push_str("\n![Dashboard](images/dashboard.png)\n");
    }
    body
}

/// Generate a temporary site tree under a fresh TempDir.
/// The returned TempDir keeps the files alive for the caller's lifetime.
pub fn make_site(opts: &SiteOptions) -> TempDir {
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path();

    let templates = root.join(TEMPLATES_DIR);
    fs::create_dir_all(&templates).expect("templates dir");
    fs::write(templates.join(PROJECT_TEMPLATE), DEFAULT_TEMPLATE).expect("write template");

    let body = project_body(opts);
    for i in 0..opts.projects {
        let dir = root.join(INPUT_DIR).join(format!("project-{i}"));
        fs::create_dir_all(&dir).expect("project dir");

        if opts.with_images {
            write_tiny_png(dir.join("images/dashboard.png"));
        }

        let status = match opts.draft_every {
            Some(n) if n > 0 && i % n == 0 => "draft",
            _ => "published",
        };
        let category = CATEGORIES[i % CATEGORIES.len()];
        let date = format!("2024-{:02}-{:02}", (i % 12) + 1, (i % 28) + 1);
        let markdown = format!(
            r#"---
title: "Project {i:04}"
description: "Synthetic project number {i} used to measure a full portfolio build."
date: "{date}"
status: {status}
featured: {featured}
categories: ["{category}", "Data"]
tech_stack: [Python, Pandas]
tags: [bench]
hero_image: images/dashboard.png
---

{body}
"#,
            featured = i % 5 == 0,
        );
        fs::write(dir.join("index.md"), markdown).expect("write markdown");
    }

    tmp
}

/// A tiny 1x1 transparent PNG.
fn write_tiny_png(path: impl AsRef<Path>) {
    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
    if let Some(parent) = path.as_ref().parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _ = fs::write(path, PNG_BYTES);
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}
