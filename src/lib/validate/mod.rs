//! Source checks behind `folio validate`.
//!
//! Unlike the build, which skips broken projects, the validator reports every
//! problem it can find in every project folder and writes them to
//! `validation-report.json`.
use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::eyre::eyre;
use itertools::{Either, Itertools};
use pulldown_cmark::Options;
use serde::Serialize;
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{
    config::{
        IMAGES_DIR, PROJECT_SOURCE, PROJECTS_DIR, SEO_DESCRIPTION_LIMIT, SEO_TITLE_LIMIT,
        VALIDATION_REPORT_FILE,
    },
    content::render,
    front_matter::{FieldProblem, Fields, FrontmatterParser},
    header::check_fields,
    types::FieldValue,
    utils::{is_absolute_url, write_json},
};

const RECOMMENDED_FIELDS: [&str; 3] = ["categories", "hero_image", "slug"];
const SEO_FIELDS: [&str; 3] = ["seo_title", "seo_description", "canonical_url"];
const SOCIAL_FIELDS: [&str; 3] = ["og_title", "og_description", "twitter_card"];
const MIN_DESCRIPTION: usize = 50;
const MIN_WORDS: usize = 100;
const MAX_CATEGORIES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Critical,
    MissingFile,
    ParseError,
    MissingRequired,
    InvalidFormat,
    InvalidValue,
    MissingImage,
    MissingRecommended,
    SeoWarning,
    ContentWarning,
    AccessibilityWarning,
    CategorizationWarning,
    EmptyImages,
    Suggestion,
    SeoSuggestion,
    SocialSuggestion,
    ImageSuggestion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub project: String,
    #[serde(rename = "type")]
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Issues {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub suggestions: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub status: String,
    pub word_count: usize,
    pub has_hero_image: bool,
    pub category_count: usize,
    pub description_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_projects: usize,
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub generated: String,
    pub summary: ReportSummary,
    pub projects: Vec<ProjectSummary>,
    pub issues: Issues,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.issues.errors.is_empty()
    }

    pub fn write(&self, output_dir: &Path) -> color_eyre::Result<PathBuf> {
        let path = output_dir.join(PROJECTS_DIR).join(VALIDATION_REPORT_FILE);
        write_json(&path, self)?;
        Ok(path)
    }

    pub fn log_summary(&self) {
        info!("validated {} projects", self.summary.total_projects);
        for issue in &self.issues.errors {
            error!("{}: {}", issue.project, issue.message);
        }
        for issue in &self.issues.warnings {
            warn!("{}: {}", issue.project, issue.message);
        }
        info!(
            "{} errors, {} warnings, {} suggestions",
            self.summary.errors, self.summary.warnings, self.summary.suggestions
        );
    }
}

/// Collects issues for one project at a time.
struct Checker<'a> {
    project: &'a str,
    issues: &'a mut Issues,
}

impl Checker<'_> {
    fn issue(&self, kind: IssueKind, field: Option<&str>, message: String) -> Issue {
        Issue {
            project: self.project.to_string(),
            kind,
            field: field.map(str::to_string),
            message,
        }
    }

    fn error(&mut self, kind: IssueKind, field: Option<&str>, message: String) {
        let issue = self.issue(kind, field, message);
        self.issues.errors.push(issue);
    }

    fn warn(&mut self, kind: IssueKind, field: Option<&str>, message: String) {
        let issue = self.issue(kind, field, message);
        self.issues.warnings.push(issue);
    }

    fn suggest(&mut self, kind: IssueKind, message: String) {
        let issue = self.issue(kind, None, message);
        self.issues.suggestions.push(issue);
    }

    fn frontmatter(&mut self, fields: &Fields) {
        for problem in check_fields(fields) {
            let (kind, field) = match &problem {
                FieldProblem::Missing(field) => (IssueKind::MissingRequired, *field),
                FieldProblem::InvalidDate(_) => (IssueKind::InvalidFormat, "date"),
                FieldProblem::InvalidStatus(_) => (IssueKind::InvalidValue, "status"),
                FieldProblem::InvalidCategories => (IssueKind::InvalidValue, "categories"),
            };
            self.error(kind, Some(field), problem.to_string());
        }

        for field in RECOMMENDED_FIELDS {
            if !fields.get(field).is_some_and(FieldValue::is_present) {
                self.warn(
                    IssueKind::MissingRecommended,
                    Some(field),
                    format!("Missing recommended field: {field}"),
                );
            }
        }

        if let Some(description) = fields.get("description").and_then(FieldValue::as_text) {
            let len = description.chars().count();
            if len < MIN_DESCRIPTION {
                self.warn(
                    IssueKind::SeoWarning,
                    Some("description"),
                    format!("Description too short ({len} chars). Recommended: 120-160 chars"),
                );
            } else if len > SEO_DESCRIPTION_LIMIT {
                self.warn(
                    IssueKind::SeoWarning,
                    Some("description"),
                    format!("Description too long ({len} chars). Recommended: 120-160 chars"),
                );
            }
        }

        if let Some(title) = fields.get("title").and_then(FieldValue::as_text) {
            let len = title.chars().count();
            if len > SEO_TITLE_LIMIT {
                self.warn(
                    IssueKind::SeoWarning,
                    Some("title"),
                    format!("Title too long ({len} chars). Recommended: < 60 chars"),
                );
            }
        }
    }

    fn content(&mut self, body: &str, options: Options) -> usize {
        let rendered = render(body, options);

        if rendered.word_count < MIN_WORDS {
            self.warn(
                IssueKind::ContentWarning,
                None,
                format!(
                    "Very short content ({} words). Consider adding more detail",
                    rendered.word_count
                ),
            );
        }
        for link in &rendered.links {
            if link.url.starts_with("./") || link.url.starts_with("../") {
                self.suggest(
                    IssueKind::Suggestion,
                    format!("Consider verifying local link: {}", link.url),
                );
            }
        }
        for image in &rendered.images {
            if image.alt.trim().is_empty() {
                self.warn(
                    IssueKind::AccessibilityWarning,
                    None,
                    format!("Image missing alt text: {}", image.src),
                );
            }
        }

        rendered.word_count
    }

    fn seo(&mut self, fields: &Fields) {
        let absent = |keys: &[&str]| {
            keys.iter()
                .all(|k| !fields.get(*k).is_some_and(FieldValue::is_present))
        };
        if absent(&SEO_FIELDS) {
            self.suggest(
                IssueKind::SeoSuggestion,
                "Consider adding custom SEO fields for better search optimization".to_string(),
            );
        }
        if absent(&SOCIAL_FIELDS) {
            self.suggest(
                IssueKind::SocialSuggestion,
                "Consider adding Open Graph/Twitter fields for better social sharing".to_string(),
            );
        }

        let count = category_count(fields);
        if count == 0 {
            self.warn(
                IssueKind::CategorizationWarning,
                None,
                "Project has no categories - will be hard to discover".to_string(),
            );
        } else if count > MAX_CATEGORIES {
            self.warn(
                IssueKind::CategorizationWarning,
                None,
                format!("Too many categories ({count}). Recommended: 1-5"),
            );
        }
    }

    fn images(&mut self, folder: &Path, site_root: &Path, fields: &Fields) {
        let hero = fields.get("hero_image").and_then(FieldValue::as_text);

        if let Some(hero) = hero.as_deref()
            && let Some(path) = hero_file(hero, folder, site_root)
            && !path.exists()
        {
            self.error(
                IssueKind::MissingImage,
                Some("hero_image"),
                format!("Hero image not found: {hero}"),
            );
        }

        let images = folder.join(IMAGES_DIR);
        if images.is_dir() {
            let empty = fs::read_dir(&images)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if empty {
                self.warn(
                    IssueKind::EmptyImages,
                    None,
                    "Images directory exists but is empty".to_string(),
                );
            }
        } else if hero.is_none() {
            self.suggest(
                IssueKind::ImageSuggestion,
                "Consider adding a hero image for better visual appeal".to_string(),
            );
        }
    }
}

fn category_count(fields: &Fields) -> usize {
    match fields.get("categories") {
        Some(FieldValue::List(items)) => items.len(),
        Some(value) if value.is_present() => 1,
        _ => 0,
    }
}

/// Local file a hero image reference points at; `None` for remote images.
fn hero_file(hero: &str, folder: &Path, site_root: &Path) -> Option<PathBuf> {
    if is_absolute_url(hero) {
        return None;
    }
    if let Some(rooted) = hero.strip_prefix('/') {
        return Some(site_root.join(rooted));
    }
    if hero.starts_with("../") {
        let mut rest = hero;
        while let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
        }
        return Some(site_root.join(rest));
    }
    Some(folder.join(hero.trim_start_matches("./")))
}

fn validate_folder<P: FrontmatterParser>(
    parser: &P,
    folder: &Path,
    site_root: &Path,
    options: Options,
    issues: &mut Issues,
) -> Option<ProjectSummary> {
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut check = Checker {
        project: &name,
        issues,
    };

    let source = folder.join(PROJECT_SOURCE);
    if !source.is_file() {
        check.error(
            IssueKind::MissingFile,
            None,
            format!("Missing {PROJECT_SOURCE} file"),
        );
        return None;
    }

    let raw = match fs::read_to_string(&source) {
        Ok(raw) => raw,
        Err(e) => {
            check.error(IssueKind::Critical, None, format!("Failed to validate: {e}"));
            return None;
        }
    };

    let doc = match parser.parse(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            check.error(
                IssueKind::ParseError,
                None,
                format!("Failed to parse frontmatter: {e}"),
            );
            return None;
        }
    };

    check.frontmatter(&doc.fields);
    let word_count = check.content(doc.body, options);
    check.seo(&doc.fields);
    check.images(folder, site_root, &doc.fields);

    let text = |key: &str| doc.fields.get(key).and_then(FieldValue::as_text);
    Some(ProjectSummary {
        status: text("status").unwrap_or_else(|| "unknown".to_string()),
        word_count,
        has_hero_image: text("hero_image").is_some(),
        category_count: category_count(&doc.fields),
        description_length: text("description").map_or(0, |d| d.chars().count()),
        name,
    })
}

/// Validate every project folder under `input_dir`.
pub fn validate_projects<P: FrontmatterParser>(
    parser: &P,
    input_dir: &Path,
    options: Options,
    generated_at: &str,
) -> color_eyre::Result<ValidationReport> {
    let site_root = input_dir.parent().unwrap_or(input_dir);
    let mut issues = Issues::default();
    let mut projects = Vec::new();

    if input_dir.is_dir() {
        let (folders, errors): (Vec<DirEntry>, Vec<walkdir::Error>) = WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .partition_map(|r| match r {
                Ok(v) => Either::Left(v),
                Err(e) => Either::Right(e),
            });
        if !errors.is_empty() {
            return Err(eyre!("Failed to open some directory entries: {errors:?}"));
        }

        for folder in folders.iter().filter(|e| e.file_type().is_dir()) {
            if let Some(summary) =
                validate_folder(parser, folder.path(), site_root, options, &mut issues)
            {
                projects.push(summary);
            }
        }
    } else {
        warn!("no projects directory at {}", input_dir.display());
    }

    Ok(ValidationReport {
        generated: generated_at.to_string(),
        summary: ReportSummary {
            total_projects: projects.len(),
            errors: issues.errors.len(),
            warnings: issues.warnings.len(),
            suggestions: issues.suggestions.len(),
        },
        projects,
        issues,
    })
}

#[cfg(test)]
mod tests;
