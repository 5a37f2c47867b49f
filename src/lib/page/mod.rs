//! Project pages rendered through a minijinja template.
use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{Section, eyre::eyre};
use itertools::Itertools;
use minijinja::{Environment, Value, context};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    config::{
        BuildMode, IMAGES_DIR, PROJECT_TEMPLATE, PROJECTS_DIR, SiteConfig,
    },
    content::ReadingTime,
    project::Project,
    types::IsoDate,
    utils::{copy_dir, prefix_to_root},
};

/// Template written by the legacy pipeline when none exists yet.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{ language }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ seo_title }} - {{ site_name }}</title>{{ meta_tags }}
    <link rel="stylesheet" href="{{ root }}css/style.css">
</head>
<body>
    <header>
        <nav>
            <a class="logo" href="{{ root }}index.html">{{ site_name }}</a>
            <ul class="nav-links">
                <li><a href="{{ root }}index.html">Home</a></li>
                <li><a href="{{ root }}index.html#projects">Projects</a></li>
                <li><a href="{{ root }}index.html#about">About</a></li>
                <li><a href="{{ root }}index.html#contact">Contact</a></li>
            </ul>
        </nav>
    </header>

    <main class="project-detail">
        <div class="project-header">
            <h1>{{ title }}</h1>
            <div class="project-meta">
                <time class="project-date" datetime="{{ date }}">{{ date | format_date }}</time>
                <span class="project-reading-time">{{ reading_time | reading_time }}</span>
                <div class="project-categories">{{ categories | join(", ") }}</div>
            </div>
            {% if hero_image %}<img class="project-hero" src="{{ hero_image }}" alt="{{ hero_alt }}">{% endif %}
        </div>
        <div class="project-content">
            {{ content }}
        </div>
    </main>

    <footer>
        <p>&copy; {{ date | format_date }} {{ author }}</p>
    </footer>

    <script src="{{ root }}js/main.js"></script>
</body>
</html>
"#;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to render template: {0}")]
    Template(#[from] minijinja::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPage {
    pub slug: String,
    pub title: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPage {
    pub slug: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub slug: String,
    pub error: String,
}

/// Per-project outcome of a page generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedPage>,
    pub skipped: Vec<SkippedPage>,
    pub errors: Vec<PageFailure>,
}

impl GenerationReport {
    pub fn log_summary(&self) {
        info!(
            "pages: {} generated, {} skipped, {} errors",
            self.generated.len(),
            self.skipped.len(),
            self.errors.len()
        );
        for page in &self.skipped {
            info!("skipped {} ({})", page.slug, page.reason);
        }
        for failure in &self.errors {
            error!("{}: {}", failure.slug, failure.error);
        }
    }
}

fn format_date(value: String) -> String {
    IsoDate::parse(&value)
        .map(|d| d.long())
        .unwrap_or(value)
}

fn reading_time(minutes: u32) -> String {
    ReadingTime::from_minutes(minutes).to_string()
}

/// Renders and writes one HTML page per non-draft project.
pub struct PageGenerator {
    env: Environment<'static>,
    site: SiteConfig,
    mode: BuildMode,
}

impl PageGenerator {
    /// Load `project.html` from the templates directory. A missing or broken
    /// template is fatal.
    pub fn load(templates_dir: &Path, site: SiteConfig, mode: BuildMode) -> color_eyre::Result<Self> {
        let path = templates_dir.join(PROJECT_TEMPLATE);
        if !path.is_file() {
            return Err(eyre!("Template not found: {}", path.display()))
                .with_note(|| format!("Create {PROJECT_TEMPLATE} in {}", templates_dir.display()));
        }
        let source = fs::read_to_string(&path)
            .with_note(|| format!("While reading {}", path.display()))?;
        Self::from_source(source, site, mode)
            .with_note(|| format!("While compiling {}", path.display()))
    }

    pub fn from_source(
        source: String,
        site: SiteConfig,
        mode: BuildMode,
    ) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_filter("format_date", format_date);
        env.add_filter("reading_time", reading_time);
        env.add_template_owned(PROJECT_TEMPLATE, source)?;
        Ok(Self { env, site, mode })
    }

    /// Explicit keywords, then categories and tech stack (lowercased), then
    /// the site keywords, without duplicates.
    pub fn keywords(&self, project: &Project) -> Vec<String> {
        let header = &project.header;
        header
            .keywords
            .iter()
            .cloned()
            .chain(header.categories.iter().map(|c| c.to_lowercase()))
            .chain(header.tech_stack.iter().map(|t| t.to_lowercase()))
            .chain(self.site.keywords.iter().cloned())
            .unique()
            .collect()
    }

    pub fn render(&self, project: &Project) -> Result<String, PageError> {
        let header = &project.header;
        let slug = header.slug.as_str();
        let rel_out = Path::new(PROJECTS_DIR).join(slug).join("index.html");

        let ctx = context! {
            content => Value::from_safe_string(project.content.html.clone()),
            meta_tags => Value::from_safe_string(header.social_meta(&self.site)),
            outline => &project.content.outline,
            links => &project.content.links,
            images => &project.content.images,
            code_blocks => &project.content.code_blocks,
            word_count => project.content.word_count,
            char_count => project.content.char_count,
            reading_time => project.reading_time().minutes(),
            complexity => project.complexity,
            keywords => self.keywords(project),
            hero_image => project.image(),
            og_image => header.og_image_url(&self.site),
            twitter_image => header.twitter_image_url(&self.site),
            base_url => self.site.base(),
            site_name => &self.site.name,
            author => &self.site.author,
            project_slug => slug,
            mode => self.mode.as_str(),
            root => Value::from_safe_string(prefix_to_root(&rel_out)),
            ..Value::from_serialize(header)
        };

        let template = self.env.get_template(PROJECT_TEMPLATE)?;
        Ok(template.render(ctx)?)
    }

    fn write_page(&self, project: &Project, output_dir: &Path) -> Result<PathBuf, PageError> {
        let html = self.render(project)?;
        let dir = output_dir.join(PROJECTS_DIR).join(project.slug().as_str());
        let path = dir.join("index.html");

        fs::create_dir_all(&dir)
            .and_then(|()| fs::write(&path, html))
            .map_err(|source| PageError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }

    /// Render every project; drafts are skipped and one failure never stops
    /// the others.
    pub fn generate_all(&self, projects: &[Project], output_dir: &Path) -> GenerationReport {
        let mut report = GenerationReport::default();

        for project in projects {
            let slug = project.slug().to_string();
            if project.is_draft() {
                report.skipped.push(SkippedPage {
                    slug,
                    reason: "draft project".to_string(),
                });
                continue;
            }

            match self.write_page(project, output_dir) {
                Ok(path) => {
                    debug!("generated {}", path.display());
                    report.generated.push(GeneratedPage {
                        slug,
                        title: project.header.title.clone(),
                        path,
                    });
                }
                Err(e) => report.errors.push(PageFailure {
                    slug,
                    error: e.to_string(),
                }),
            }
        }

        report.log_summary();
        report
    }
}

/// Copy each project's `images/` folder to `images/projects/<slug>/`.
pub fn copy_project_images(projects: &[Project], output_dir: &Path) -> color_eyre::Result<usize> {
    let mut copied = 0;
    for project in projects.iter().filter(|p| !p.is_draft()) {
        let Some(images) = project.source.parent().map(|dir| dir.join(IMAGES_DIR)) else {
            continue;
        };
        if !images.is_dir() {
            continue;
        }

        let target = output_dir
            .join(IMAGES_DIR)
            .join(PROJECTS_DIR)
            .join(project.slug().as_str());
        copied += copy_dir(&images, &target)
            .with_note(|| format!("While copying images of {}", project.slug()))?;
    }
    debug!("copied {copied} project images");
    Ok(copied)
}
