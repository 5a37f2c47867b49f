//! Filter and tag metadata derived from the index, with display colours.
use std::{cmp::Reverse, collections::BTreeMap, path::Path};

use serde::Serialize;
use tracing::info;

use crate::{
    config::{PROJECTS_DIR, TAGS_METADATA_FILE},
    project::ProjectRecord,
    utils::{slugify, write_json},
};

const METADATA_VERSION: &str = "1.0.0";

// Tech-stack entries used by at least this many projects become filters.
const TECH_FILTER_THRESHOLD: usize = 2;

const PALETTE: &[(&str, &str)] = &[
    ("automation", "#4a6cf7"),
    ("automatisation", "#4a6cf7"),
    ("python", "#3776ab"),
    ("n8n", "#8a2be2"),
    ("power-bi", "#f2c811"),
    ("ai", "#ff6b6b"),
    ("ia", "#ff6b6b"),
    ("no-code", "#51cf66"),
    ("sql", "#336791"),
    ("vibe-coding", "#ff8787"),
    ("javascript", "#f7df1e"),
    ("css", "#1572b6"),
    ("html", "#e34f26"),
    ("nodejs", "#339933"),
    ("react", "#61dafb"),
    ("docker", "#2496ed"),
    ("git", "#f05032"),
];

/// Display colour for a category or technology.
///
/// Well-known names use a fixed palette; anything else gets a stable HSL
/// colour derived from a hash of the name.
pub fn tag_color(name: &str) -> String {
    let slug = slugify(name);
    if let Some((_, color)) = PALETTE.iter().find(|(key, _)| *key == slug) {
        return (*color).to_string();
    }

    let hash = name.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    let h = hash.unsigned_abs();
    format!("hsl({}, {}%, {}%)", h % 360, 60 + h % 30, 45 + h % 20)
}

fn usage<'a>(names: impl Iterator<Item = &'a String>) -> BTreeMap<String, usize> {
    names.fold(BTreeMap::new(), |mut counts, name| {
        *counts.entry(name.clone()).or_default() += 1;
        counts
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub total_categories: usize,
    pub total_tags: usize,
    pub total_tech_stack: usize,
    pub total_filters: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagEntry {
    pub name: String,
    pub slug: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Category,
    Technology,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterEntry {
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    pub count: usize,
}

/// Contents of `tags-metadata.json`.
#[derive(Debug, Clone, Serialize)]
pub struct TagMetadata {
    pub generated_at: String,
    pub version: &'static str,
    pub summary: TagSummary,
    pub categories: Vec<TagEntry>,
    pub tags: Vec<TagEntry>,
    pub tech_stack: Vec<TagEntry>,
    pub filters: Vec<FilterEntry>,
}

fn entries(counts: &BTreeMap<String, usize>, colored: bool) -> Vec<TagEntry> {
    counts
        .iter()
        .map(|(name, count)| TagEntry {
            name: name.clone(),
            slug: slugify(name),
            count: *count,
            color: colored.then(|| tag_color(name)),
        })
        .collect()
}

impl TagMetadata {
    pub fn build(records: &[ProjectRecord], generated_at: &str) -> Self {
        let categories = usage(records.iter().flat_map(|r| r.categories.iter()));
        let tags = usage(records.iter().flat_map(|r| r.tags.iter()));
        let tech = usage(records.iter().flat_map(|r| r.tech_stack.iter()));

        let count_of = |name: &str| {
            categories.get(name).copied().unwrap_or(0) + tech.get(name).copied().unwrap_or(0)
        };

        let mut filters: Vec<FilterEntry> = categories
            .keys()
            .map(|name| (name, FilterKind::Category))
            .chain(
                tech.iter()
                    .filter(|(name, count)| {
                        **count >= TECH_FILTER_THRESHOLD && !categories.contains_key(*name)
                    })
                    .map(|(name, _)| (name, FilterKind::Technology)),
            )
            .map(|(name, kind)| FilterEntry {
                name: name.clone(),
                slug: slugify(name),
                kind,
                count: count_of(name),
            })
            .collect();
        filters.sort_by(|a, b| {
            Reverse(a.count)
                .cmp(&Reverse(b.count))
                .then_with(|| a.name.cmp(&b.name))
        });

        Self {
            generated_at: generated_at.to_string(),
            version: METADATA_VERSION,
            summary: TagSummary {
                total_categories: categories.len(),
                total_tags: tags.len(),
                total_tech_stack: tech.len(),
                total_filters: filters.len(),
            },
            categories: entries(&categories, true),
            tags: entries(&tags, false),
            tech_stack: entries(&tech, true),
            filters,
        }
    }

    pub fn write(&self, output_dir: &Path) -> color_eyre::Result<()> {
        write_json(
            &output_dir.join(PROJECTS_DIR).join(TAGS_METADATA_FILE),
            self,
        )?;
        info!(
            "wrote tag metadata: {} categories, {} tags, {} technologies, {} filters",
            self.summary.total_categories,
            self.summary.total_tags,
            self.summary.total_tech_stack,
            self.summary.total_filters
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests;
