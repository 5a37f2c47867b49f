//! Discovery of project sources and aggregation into the JSON indexes.
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{Section, eyre::eyre};
use itertools::{Either, Itertools};
use pulldown_cmark::Options;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{
    config::{BuildMode, INDEX_FILE, PROJECT_SOURCE, PROJECTS_DIR, SIMPLE_INDEX_FILE, SiteConfig},
    front_matter::FrontmatterParser,
    project::{Project, ProjectRecord, SimpleEntry},
    types::{IsoDate, Status},
    utils::write_json,
};

pub type Source = (PathBuf, String);

/// Make sure the projects directory exists.
///
/// Production builds treat a missing directory as fatal; development builds
/// create it and carry on with an empty site.
pub fn prepare_input(input_dir: &Path, mode: BuildMode) -> color_eyre::Result<()> {
    if input_dir.is_dir() {
        return Ok(());
    }
    if mode.is_production() {
        return Err(eyre!("Projects directory {} not found", input_dir.display()))
            .with_note(|| "Production builds require at least an empty projects directory");
    }

    warn!("creating missing projects directory {}", input_dir.display());
    fs::create_dir_all(input_dir)
        .with_note(|| format!("While creating {}", input_dir.display()))?;
    Ok(())
}

/// Read every `<input>/<folder>/index.md`, sorted by path.
///
/// Unreadable sources are logged and left out.
pub fn discover_sources(input_dir: &Path) -> color_eyre::Result<Vec<Source>> {
    let (entries, errors): (Vec<DirEntry>, Vec<walkdir::Error>) = WalkDir::new(input_dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .partition_map(|r| match r {
            Ok(v) => Either::Left(v),
            Err(e) => Either::Right(e),
        });

    if !errors.is_empty() {
        return Err(eyre!("Failed to open some directory entries: {errors:?}"));
    }

    let (sources, errors): (Vec<Source>, Vec<(PathBuf, std::io::Error)>) = entries
        .into_iter()
        .filter(|e| e.file_type().is_file() && e.file_name() == PROJECT_SOURCE)
        .partition_map(|e| match fs::read_to_string(e.path()) {
            Ok(content) => Either::Left((e.into_path(), content)),
            Err(err) => Either::Right((e.into_path(), err)),
        });

    for (path, err) in &errors {
        warn!("skipping unreadable source {}: {err}", path.display());
    }

    debug!("discovered {} project sources", sources.len());
    Ok(sources)
}

/// A source left out of the index, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub source: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct Aggregate {
    pub projects: Vec<Project>,
    pub skipped: Vec<Skipped>,
}

/// Parse every source, skipping invalid ones and duplicate slugs, and sort
/// the survivors newest first.
pub fn aggregate<P: FrontmatterParser>(
    sources: Vec<Source>,
    parser: &P,
    site: &SiteConfig,
    today: IsoDate,
    options: Options,
    mode: BuildMode,
) -> Aggregate {
    let mut out = Aggregate::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (path, raw) in sources.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
        let project = match Project::parse(parser, path.clone(), &raw, site, today, options) {
            Ok(project) => project,
            Err(e) => {
                warn!("skipping {}: {e}", path.display());
                out.skipped.push(Skipped {
                    source: path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if mode.is_production() && project.is_draft() {
            debug!("leaving draft {} out of the production index", path.display());
            continue;
        }

        if !seen.insert(project.slug().to_string()) {
            let reason = format!("duplicate slug `{}`", project.slug());
            warn!("skipping {}: {reason}", path.display());
            out.skipped.push(Skipped {
                source: path,
                reason,
            });
            continue;
        }

        out.projects.push(project);
    }

    sort_projects(&mut out.projects);
    out
}

/// Newest first; equal dates fall back to title order.
pub fn sort_projects(projects: &mut [Project]) {
    projects.sort_by(|a, b| {
        b.header
            .date
            .cmp(&a.header.date)
            .then_with(|| a.header.title.cmp(&b.header.title))
    });
}

/// Aggregate sets and counters, folded over the index records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTotals {
    pub total: usize,
    pub published: usize,
    pub drafts: usize,
    pub featured: usize,
    pub categories: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub tech_stack: BTreeSet<String>,
    pub reading_minutes: u64,
    pub complexity: BTreeMap<u8, usize>,
}

impl IndexTotals {
    pub fn from_records(records: &[ProjectRecord]) -> Self {
        records.iter().fold(Self::default(), Self::add)
    }

    fn add(mut self, record: &ProjectRecord) -> Self {
        self.total += 1;
        match record.status {
            Status::Published => self.published += 1,
            Status::Draft => self.drafts += 1,
            Status::Archived => {}
        }
        if record.featured {
            self.featured += 1;
        }
        self.categories.extend(record.categories.iter().cloned());
        self.tags.extend(record.tags.iter().cloned());
        self.tech_stack.extend(record.tech_stack.iter().cloned());
        self.reading_minutes += u64::from(record.reading_time.minutes());
        *self.complexity.entry(record.complexity).or_default() += 1;
        self
    }

    /// Mean reading time in whole minutes, rounded half up.
    pub fn average_reading_time(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let total = self.total as u64;
        (self.reading_minutes * 2 + total) / (total * 2)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexMetadata {
    pub generated_at: String,
    pub total_projects: usize,
    pub published_projects: usize,
    pub draft_projects: usize,
    pub featured_projects: usize,
    pub build_version: &'static str,
    pub available_categories: Vec<String>,
    pub available_tags: Vec<String>,
    pub available_tech_stack: Vec<String>,
    pub average_reading_time: u64,
    pub complexity_distribution: BTreeMap<u8, usize>,
}

/// The full index: `{ "projects": [...], "metadata": {...} }`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectIndex {
    pub projects: Vec<ProjectRecord>,
    pub metadata: IndexMetadata,
}

impl ProjectIndex {
    pub fn build(projects: &[Project], generated_at: &str) -> Self {
        let records: Vec<ProjectRecord> = projects.iter().map(Project::record).collect();
        let totals = IndexTotals::from_records(&records);

        let metadata = IndexMetadata {
            generated_at: generated_at.to_string(),
            total_projects: totals.total,
            published_projects: totals.published,
            draft_projects: totals.drafts,
            featured_projects: totals.featured,
            build_version: env!("CARGO_PKG_VERSION"),
            average_reading_time: totals.average_reading_time(),
            available_categories: totals.categories.into_iter().collect(),
            available_tags: totals.tags.into_iter().collect(),
            available_tech_stack: totals.tech_stack.into_iter().collect(),
            complexity_distribution: totals.complexity,
        };

        Self {
            projects: records,
            metadata,
        }
    }

    pub fn simple(&self) -> Vec<SimpleEntry> {
        self.projects.iter().map(SimpleEntry::from).collect()
    }

    /// Write the full and reduced indexes under `<output>/projects/`.
    pub fn write(&self, output_dir: &Path) -> color_eyre::Result<()> {
        let dir = output_dir.join(PROJECTS_DIR);
        write_json(&dir.join(INDEX_FILE), self)?;
        write_json(&dir.join(SIMPLE_INDEX_FILE), &self.simple())?;
        info!(
            "wrote index with {} projects to {}",
            self.projects.len(),
            dir.display()
        );
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index file {0} was not created")]
    Missing(PathBuf),
    #[error("could not read index file: {0}")]
    Io(#[from] std::io::Error),
    #[error("index file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("index must be an object with a `projects` array")]
    Structure,
    #[error("project #{position} lacks a title, description or categories")]
    InvalidProject { position: usize },
}

fn non_empty(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        _ => false,
    }
}

/// Re-read an emitted index and check its shape. Returns the project count.
pub fn validate_index_file(path: &Path) -> Result<usize, IndexError> {
    if !path.is_file() {
        return Err(IndexError::Missing(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;

    let projects = value
        .get("projects")
        .and_then(Value::as_array)
        .ok_or(IndexError::Structure)?;

    for (position, project) in projects.iter().enumerate() {
        let valid = non_empty(project.get("title"))
            && non_empty(project.get("description"))
            && non_empty(project.get("categories"));
        if !valid {
            return Err(IndexError::InvalidProject { position });
        }
    }

    Ok(projects.len())
}
