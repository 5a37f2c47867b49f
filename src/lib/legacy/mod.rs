//! `folio build --legacy`: pages from flat `projects/<name>.md` files.
//!
//! No strict validation happens here. Broken YAML falls back to the line
//! scanner and missing fields get placeholder values so every file still
//! yields a page.
use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Section;
use pulldown_cmark::Options;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::{
        BuildMode, INDEX_FILE, OUTPUT_DIR, PROJECT_TEMPLATE, PROJECTS_DIR, SiteConfig,
        TEMPLATES_DIR,
    },
    front_matter::{FieldProblem, Fields, FrontmatterParser, LineFrontmatter, WithFallback, YamlFrontmatter},
    header::check_fields,
    migrate::find_flat_sources,
    page::{DEFAULT_TEMPLATE, GenerationReport, PageGenerator},
    project::Project,
    types::{FieldValue, IsoDate, Slug},
    utils::{resolve_image, site_path, write_json},
};

pub const PLACEHOLDER_TITLE: &str = "Project";

/// Reduced index entry written by the legacy build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyIndexEntry {
    pub title: String,
    pub description: String,
    pub image: String,
    pub categories: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyReport {
    pub template_created: bool,
    pub pages: GenerationReport,
    pub index_entries: usize,
}

/// Load `templates/project.html`, writing the built-in template first when
/// it does not exist yet. Returns the source and whether it was created.
pub fn bootstrap_template(templates_dir: &Path) -> color_eyre::Result<(String, bool)> {
    let path = templates_dir.join(PROJECT_TEMPLATE);
    if path.is_file() {
        let source = fs::read_to_string(&path)
            .with_note(|| format!("While reading {}", path.display()))?;
        return Ok((source, false));
    }

    info!("writing default template to {}", path.display());
    fs::create_dir_all(templates_dir)
        .with_note(|| format!("While creating {}", templates_dir.display()))?;
    fs::write(&path, DEFAULT_TEMPLATE).with_note(|| format!("While writing {}", path.display()))?;
    Ok((DEFAULT_TEMPLATE.to_string(), true))
}

fn text(fields: &Fields, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(FieldValue::as_text)
        .filter(|s| !s.trim().is_empty())
}

/// Replace every missing or invalid required field with a placeholder so the
/// header always validates, and key the slug on the file stem `name`.
pub fn lenient_fields(mut fields: Fields, name: &str, today: IsoDate) -> Fields {
    let title = text(&fields, "title").unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());

    for problem in check_fields(&fields) {
        match problem {
            FieldProblem::Missing("title") => {
                fields.insert("title".into(), FieldValue::Text(title.clone()));
            }
            FieldProblem::Missing("description") => {
                fields.insert("description".into(), FieldValue::Text(title.clone()));
            }
            FieldProblem::Missing(_) | FieldProblem::InvalidDate(_) => {
                fields.insert("date".into(), FieldValue::Text(today.as_str()));
            }
            FieldProblem::InvalidStatus(_) => {
                fields.remove("status");
            }
            FieldProblem::InvalidCategories => {
                fields.remove("categories");
            }
        }
    }

    // Legacy output is keyed on the file name, whatever the frontmatter says.
    fields.insert("slug".into(), FieldValue::Text(name.to_string()));
    fields
}

fn index_entry(fields: &Fields, slug: &Slug) -> Option<LegacyIndexEntry> {
    let title = text(fields, "title")?;
    let image = text(fields, "hero_image")
        .or_else(|| text(fields, "image"))
        .map(|p| site_path(&resolve_image(&p, slug.as_str())))
        .unwrap_or_default();

    Some(LegacyIndexEntry {
        title,
        description: text(fields, "description").unwrap_or_default(),
        image,
        categories: fields
            .get("categories")
            .and_then(FieldValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default(),
        url: format!("{PROJECTS_DIR}/{slug}/"),
    })
}

/// Build pages and a reduced index from the flat project files under `root`.
pub fn build_legacy_at(
    root: &Path,
    site: &SiteConfig,
    today: IsoDate,
    options: Options,
) -> color_eyre::Result<LegacyReport> {
    let input_dir = root.join(PROJECTS_DIR);
    let output_dir = root.join(OUTPUT_DIR);
    if !input_dir.is_dir() {
        warn!("creating missing projects directory {}", input_dir.display());
        fs::create_dir_all(&input_dir)?;
    }

    let (template, template_created) = bootstrap_template(&root.join(TEMPLATES_DIR))?;
    let generator = PageGenerator::from_source(template, site.clone(), BuildMode::Development)
        .with_note(|| "While compiling the project template")?;

    let parser = WithFallback::new(YamlFrontmatter, LineFrontmatter);
    let mut projects: Vec<Project> = Vec::new();
    let mut index: Vec<LegacyIndexEntry> = Vec::new();

    for source in find_flat_sources(&input_dir)? {
        let name = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let raw = match fs::read_to_string(&source) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping unreadable source {}: {e}", source.display());
                continue;
            }
        };
        let doc = match parser.parse(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("skipping {}: {e}", source.display());
                continue;
            }
        };

        let fields = lenient_fields(doc.fields.clone(), &name, today);
        match Project::from_document(source.clone(), &fields, doc.body, site, today, options) {
            Ok(project) => {
                index.extend(index_entry(&doc.fields, project.slug()));
                projects.push(project);
            }
            Err(e) => warn!("skipping {}: {e}", source.display()),
        }
    }

    let report = generator.generate_all(&projects, &output_dir);
    let index_path: PathBuf = output_dir.join(PROJECTS_DIR).join(INDEX_FILE);
    write_json(&index_path, &index)?;
    info!("legacy index: {} entries", index.len());

    Ok(LegacyReport {
        template_created,
        pages: report,
        index_entries: index.len(),
    })
}
