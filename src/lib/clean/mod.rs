//! Removal of generated artifacts behind `folio clean`.
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::config::{
    IMAGES_DIR, INDEX_FILE, PROJECTS_DIR, ROBOTS_FILE, SEO_REPORT_FILE, SIMPLE_INDEX_FILE,
    SITEMAP_FILE, SOCIAL_DATA_FILE, STRUCTURED_DATA_FILE, TAGS_METADATA_FILE,
    VALIDATION_REPORT_FILE,
};

/// A group of generated artifacts that can be cleaned on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanTarget {
    Html,
    Json,
    Seo,
    Reports,
}

impl CleanTarget {
    pub const ALL: [Self; 4] = [Self::Html, Self::Json, Self::Seo, Self::Reports];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Seo => "seo",
            Self::Reports => "reports",
        }
    }

    /// Paths of this group that currently exist under `output_dir`.
    fn paths(self, output_dir: &Path) -> Vec<PathBuf> {
        let projects = output_dir.join(PROJECTS_DIR);
        let listed: Vec<PathBuf> = match self {
            Self::Html => {
                let mut pages: Vec<PathBuf> = WalkDir::new(&projects)
                    .min_depth(2)
                    .max_depth(2)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.file_type().is_file() && e.file_name() == "index.html")
                    .map(walkdir::DirEntry::into_path)
                    .collect();
                pages.push(output_dir.join(IMAGES_DIR).join(PROJECTS_DIR));
                pages
            }
            Self::Json => [INDEX_FILE, SIMPLE_INDEX_FILE, TAGS_METADATA_FILE]
                .iter()
                .map(|f| projects.join(f))
                .collect(),
            Self::Seo => [SITEMAP_FILE, ROBOTS_FILE, STRUCTURED_DATA_FILE, SOCIAL_DATA_FILE]
                .iter()
                .map(|f| output_dir.join(f))
                .collect(),
            Self::Reports => vec![
                projects.join(VALIDATION_REPORT_FILE),
                output_dir.join(SEO_REPORT_FILE),
            ],
        };
        listed.into_iter().filter(|p| p.exists()).collect()
    }
}

impl fmt::Display for CleanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown clean target `{0}` (expected html, json, seo or reports)")]
pub struct UnknownTarget(String);

impl FromStr for CleanTarget {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTarget(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    pub dry_run: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub files_removed: usize,
    pub directories_removed: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub stats: CleanStats,
    /// Paths a dry run would have removed.
    pub planned: Vec<PathBuf>,
}

impl CleanReport {
    pub fn log_summary(&self) {
        let s = &self.stats;
        info!(
            "cleanup: {} files removed, {} directories removed, {} skipped, {} errors",
            s.files_removed, s.directories_removed, s.skipped, s.errors
        );
    }

    fn remove(&mut self, path: &Path, options: CleanOptions) {
        if options.dry_run {
            info!("[dry run] would remove {}", path.display());
            self.planned.push(path.to_path_buf());
            return;
        }

        let is_dir = path.is_dir();
        let result = if is_dir {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match result {
            Ok(()) => {
                if is_dir {
                    self.stats.directories_removed += 1;
                } else {
                    self.stats.files_removed += 1;
                }
                if options.verbose {
                    info!("removed {}", path.display());
                } else {
                    debug!("removed {}", path.display());
                }
            }
            Err(e) => {
                error!("failed to remove {}: {e}", path.display());
                self.stats.errors += 1;
            }
        }
    }
}

/// Remove directories under `root` (and `root` itself) that are left empty.
fn prune_empty_dirs(root: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(root).contents_first(true) {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_dir() && fs::read_dir(entry.path())?.next().is_none() {
            fs::remove_dir(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Remove the generated artifacts of `targets`, or of every group when
/// `targets` is empty. A failed removal is counted and never stops the rest.
pub fn clean(output_dir: &Path, targets: &[CleanTarget], options: CleanOptions) -> CleanReport {
    let mut report = CleanReport::default();
    let everything = targets.is_empty();
    let targets: Vec<CleanTarget> = if everything {
        CleanTarget::ALL.to_vec()
    } else {
        targets.iter().copied().unique().collect()
    };

    for target in targets {
        let paths = target.paths(output_dir);
        if paths.is_empty() {
            info!("nothing to clean for {target}");
            report.stats.skipped += 1;
            continue;
        }
        for path in &paths {
            report.remove(path, options);
        }
    }

    if !options.dry_run && output_dir.is_dir() {
        // A full clean may drop the output directory itself, a targeted one only emptied page folders.
        let prune_root = if everything {
            output_dir.to_path_buf()
        } else {
            output_dir.join(PROJECTS_DIR)
        };
        if prune_root.is_dir() {
            match prune_empty_dirs(&prune_root) {
                Ok(n) => report.stats.directories_removed += n,
                Err(e) => {
                    error!("failed to prune {}: {e}", prune_root.display());
                    report.stats.errors += 1;
                }
            }
        }
    }

    report.log_summary();
    report
}

#[cfg(test)]
mod tests;
