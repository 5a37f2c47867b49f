//! One-time conversion of flat `projects/<name>.md` files into per-project
//! folders with complete frontmatter.
use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{Section, eyre::eyre};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{info, warn};

use crate::{
    config::{BACKUP_DIR, DEFAULT_CATEGORY, IMAGES_DIR, INDEX_FILE, PROJECT_SOURCE, PROJECTS_DIR, SiteConfig},
    front_matter::{
        Fields, FrontmatterParser, LineFrontmatter, WithFallback, YamlFrontmatter,
    },
    header::excerpt_from,
    types::{FieldValue, IsoDate, SchemaType},
    utils::{copy_dir, slugify},
};

/// Flat files that are not projects.
const EXCLUDED_STEMS: [&str; 3] = ["template", "README", "index"];

// Frontmatter keys the migration rewrites instead of preserving as-is.
const REWRITTEN_KEYS: [&str; 5] = ["title", "description", "image", "date", "categories"];

/// Entry of an index written by the flat-file site.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LegacyEntry {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub categories: Vec<String>,
    pub url: String,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyIndex {
    List(Vec<LegacyEntry>),
    Object {
        #[serde(default)]
        projects: Vec<LegacyEntry>,
    },
}

/// Read `projects/index.json` if present, in either its array or object form.
pub fn load_legacy_index(input_dir: &Path) -> color_eyre::Result<Vec<LegacyEntry>> {
    let path = input_dir.join(INDEX_FILE);
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let raw = fs::read_to_string(&path).with_note(|| format!("While reading {}", path.display()))?;
    let index: LegacyIndex =
        serde_json::from_str(&raw).with_note(|| format!("While parsing {}", path.display()))?;
    let entries = match index {
        LegacyIndex::List(entries) | LegacyIndex::Object { projects: entries } => entries,
    };

    info!("loaded {} entries from the existing index", entries.len());
    Ok(entries)
}

/// Flat Markdown files directly under `input_dir`, sorted by name.
pub fn find_flat_sources(input_dir: &Path) -> color_eyre::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)
        .with_note(|| format!("While reading {}", input_dir.display()))?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .filter(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| !EXCLUDED_STEMS.contains(&stem))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn matching_entry<'a>(entries: &'a [LegacyEntry], name: &str, slug: &str) -> Option<&'a LegacyEntry> {
    let name_lower = name.to_lowercase();
    entries.iter().find(|e| {
        let url = e.url.trim_end_matches('/');
        url == format!("{PROJECTS_DIR}/{name}")
            || url == format!("{PROJECTS_DIR}/{slug}")
            || e.title.to_lowercase().contains(&name_lower)
    })
}

fn yaml(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
            Value::Number((*n as i64).into())
        }
        FieldValue::Number(n) => Value::Number((*n).into()),
        FieldValue::List(items) => {
            Value::Sequence(items.iter().cloned().map(Value::String).collect())
        }
    }
}

fn strings(items: &[String]) -> Value {
    Value::Sequence(items.iter().cloned().map(Value::String).collect())
}

/// Complete frontmatter for a migrated project, in a stable key order.
pub fn enhance_frontmatter(
    existing: &Fields,
    entry: Option<&LegacyEntry>,
    slug: &str,
    site: &SiteConfig,
    today: IsoDate,
) -> Mapping {
    let text = |key: &str| {
        existing
            .get(key)
            .and_then(FieldValue::as_text)
            .filter(|s| !s.trim().is_empty())
    };
    let from_entry = |pick: fn(&LegacyEntry) -> Option<String>| entry.and_then(pick);

    let title = text("title")
        .or_else(|| from_entry(|e| Some(e.title.clone()).filter(|t| !t.is_empty())))
        .unwrap_or_else(|| "Untitled Project".to_string());
    let description = text("description")
        .or_else(|| from_entry(|e| Some(e.description.clone()).filter(|d| !d.is_empty())))
        .unwrap_or_default();
    let excerpt = text("excerpt").unwrap_or_else(|| excerpt_from(&description));
    let hero_image = text("hero_image")
        .or_else(|| text("image"))
        .or_else(|| from_entry(|e| e.image.clone()));
    let date = text("date")
        .or_else(|| from_entry(|e| e.date.clone()))
        .unwrap_or_else(|| today.as_str());

    let categories: Vec<String> = match existing.get("categories").and_then(FieldValue::as_list) {
        Some(items) if !items.is_empty() => items.to_vec(),
        _ => entry
            .map(|e| e.categories.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_CATEGORY.to_string()]),
    };
    let list = |key: &str| {
        existing
            .get(key)
            .map(yaml)
            .unwrap_or_else(|| Value::Sequence(Vec::new()))
    };

    let mut out = Mapping::new();
    let mut put = |key: &str, value: Value| {
        out.insert(Value::String(key.to_string()), value);
    };

    put("title", Value::String(title));
    put("slug", Value::String(slug.to_string()));
    put("description", Value::String(description));
    put("excerpt", Value::String(excerpt));
    if let Some(hero) = hero_image {
        put("hero_image", Value::String(hero));
    }
    put("date", Value::String(date));
    put(
        "status",
        Value::String(text("status").unwrap_or_else(|| "published".to_string())),
    );
    put(
        "featured",
        Value::Bool(existing.get("featured").is_some_and(FieldValue::as_bool)),
    );
    put("categories", strings(&categories));
    put("tags", list("tags"));
    put("tech_stack", list("tech_stack"));
    put("canonical_url", Value::String(site.canonical_url(slug)));
    put("schema_type", Value::String(SchemaType::infer(&categories).to_string()));
    put(
        "team_size",
        existing.get("team_size").map(yaml).unwrap_or(Value::Number(1_i64.into())),
    );
    put(
        "client",
        Value::String(text("client").unwrap_or_else(|| "Personal".to_string())),
    );

    for (key, value) in existing {
        let key_value = Value::String(key.clone());
        if REWRITTEN_KEYS.contains(&key.as_str()) || out.contains_key(&key_value) {
            continue;
        }
        out.insert(key_value, yaml(value));
    }

    out
}

/// A flat file converted into a project folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migrated {
    pub original: PathBuf,
    pub migrated: PathBuf,
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub backup: PathBuf,
    pub migrated: Vec<Migrated>,
    pub skipped: Vec<(PathBuf, String)>,
}

impl MigrationReport {
    pub fn log_summary(&self) {
        info!(
            "migrated {} projects, skipped {}, backup at {}",
            self.migrated.len(),
            self.skipped.len(),
            self.backup.display()
        );
        for m in &self.migrated {
            info!("{} -> {}/", m.title, m.slug);
        }
    }
}

/// Copy the projects directory to `backup/migration-<timestamp>/`.
pub fn create_backup(root: &Path, now: OffsetDateTime) -> color_eyre::Result<PathBuf> {
    let stamp = now.format(&Rfc3339)?.replace([':', '.'], "-");
    let backup = root.join(BACKUP_DIR).join(format!("migration-{stamp}"));
    let input_dir = root.join(PROJECTS_DIR);

    fs::create_dir_all(&backup).with_note(|| format!("While creating {}", backup.display()))?;
    let copied = copy_dir(&input_dir, &backup)
        .with_note(|| format!("While backing up {}", input_dir.display()))?;
    info!("backed up {copied} files to {}", backup.display());
    Ok(backup)
}

fn migrate_file<P: FrontmatterParser>(
    parser: &P,
    root: &Path,
    source: &Path,
    entries: &[LegacyEntry],
    site: &SiteConfig,
    today: IsoDate,
) -> color_eyre::Result<Migrated> {
    let name = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let slug = slugify(&name);
    let folder = root.join(PROJECTS_DIR).join(&slug);
    let target = folder.join(PROJECT_SOURCE);

    if target.exists() {
        return Err(eyre!("{} already exists", target.display()));
    }

    let raw = fs::read_to_string(source)?;
    let doc = parser.parse(&raw)?;
    let entry = matching_entry(entries, &name, &slug);
    let frontmatter = enhance_frontmatter(&doc.fields, entry, &slug, site, today);
    let title = frontmatter
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let yaml = serde_yaml::to_string(&frontmatter)?;
    fs::create_dir_all(&folder)?;
    fs::write(&target, format!("---\n{yaml}---\n{}", doc.body))?;

    let images = root.join(IMAGES_DIR).join(PROJECTS_DIR).join(&slug);
    if images.is_dir() {
        let copied = copy_dir(&images, &folder.join(IMAGES_DIR))?;
        info!("copied {copied} images for {slug}");
    }

    Ok(Migrated {
        original: source.to_path_buf(),
        migrated: target,
        slug,
        title,
    })
}

/// Every migrated file must parse and carry a title.
fn verify(migrated: &[Migrated]) -> color_eyre::Result<()> {
    let broken: Vec<String> = migrated
        .iter()
        .filter(|m| {
            fs::read_to_string(&m.migrated)
                .ok()
                .and_then(|raw| {
                    YamlFrontmatter
                        .parse(&raw)
                        .ok()
                        .map(|doc| doc.fields.get("title").is_some_and(FieldValue::is_present))
                })
                .is_none_or(|has_title| !has_title)
        })
        .map(|m| m.migrated.display().to_string())
        .collect();

    if broken.is_empty() {
        Ok(())
    } else {
        Err(eyre!("Migration validation failed for {}", broken.join(", ")))
            .with_note(|| "The original files are preserved in the backup folder")
    }
}

/// Back up, convert every flat project file and verify the result.
pub fn migrate_at(root: &Path, site: &SiteConfig, now: OffsetDateTime) -> color_eyre::Result<MigrationReport> {
    let input_dir = root.join(PROJECTS_DIR);
    if !input_dir.is_dir() {
        return Err(eyre!("Projects directory {} not found", input_dir.display()));
    }

    let backup = create_backup(root, now)?;
    let entries = load_legacy_index(&input_dir)?;
    let sources = find_flat_sources(&input_dir)?;
    info!("found {} flat project files", sources.len());

    let parser = WithFallback::new(YamlFrontmatter, LineFrontmatter);
    let today = IsoDate::today(now);
    let mut report = MigrationReport {
        backup,
        ..MigrationReport::default()
    };

    for source in sources {
        match migrate_file(&parser, root, &source, &entries, site, today) {
            Ok(m) => report.migrated.push(m),
            Err(e) => {
                warn!("skipping {}: {e}", source.display());
                report.skipped.push((source, e.to_string()));
            }
        }
    }

    verify(&report.migrated)?;
    report.log_summary();
    Ok(report)
}
