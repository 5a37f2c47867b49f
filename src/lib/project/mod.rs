//! A parsed project and its projections into the JSON indexes.
use std::path::PathBuf;

use pulldown_cmark::Options;
use serde::Serialize;

use crate::{
    config::{PROJECTS_DIR, SiteConfig},
    content::{ReadingTime, RenderedContent, complexity, render},
    front_matter::{Fields, FrontmatterError, FrontmatterParser},
    header::Header,
    types::{IsoDate, SchemaType, Slug, Status},
    utils::site_path,
};

/// One project source after validation, enhancement and rendering.
#[derive(Debug, Clone)]
pub struct Project {
    pub source: PathBuf,
    pub header: Header,
    pub content: RenderedContent,
    pub complexity: u8,
}

impl Project {
    pub fn parse<P: FrontmatterParser>(
        parser: &P,
        source: PathBuf,
        raw: &str,
        site: &SiteConfig,
        today: IsoDate,
        options: Options,
    ) -> Result<Self, FrontmatterError> {
        let doc = parser.parse(raw)?;
        Self::from_document(source, &doc.fields, doc.body, site, today, options)
    }

    /// Build from fields that were already split off the body.
    pub fn from_document(
        source: PathBuf,
        fields: &Fields,
        body: &str,
        site: &SiteConfig,
        today: IsoDate,
        options: Options,
    ) -> Result<Self, FrontmatterError> {
        let header = Header::from_fields(fields, site, today)?;
        let content = render(body, options);
        let complexity = complexity(header.categories.len(), header.tech_stack.len(), &content);

        Ok(Self {
            source,
            header,
            content,
            complexity,
        })
    }

    pub fn slug(&self) -> &Slug {
        &self.header.slug
    }

    pub fn is_draft(&self) -> bool {
        self.header.status.is_draft()
    }

    pub fn reading_time(&self) -> ReadingTime {
        self.content.reading_time()
    }

    /// Index link, relative to the site root.
    pub fn url(&self) -> String {
        format!("{PROJECTS_DIR}/{}/", self.header.slug)
    }

    /// Hero image as a site-root path or absolute URL.
    pub fn image(&self) -> Option<String> {
        self.header.hero_path().map(|p| site_path(&p))
    }

    pub fn record(&self) -> ProjectRecord {
        let h = &self.header;
        ProjectRecord {
            title: h.title.clone(),
            description: h.description.clone(),
            image: self.image(),
            categories: h.categories.clone(),
            url: self.url(),
            slug: h.slug.clone(),
            excerpt: h.excerpt.clone(),
            date: h.date,
            last_updated: h.last_updated,
            status: h.status,
            featured: h.featured,
            tags: h.tags.clone(),
            tech_stack: h.tech_stack.clone(),
            seo_title: h.seo_title.clone(),
            seo_description: h.seo_description.clone(),
            github_url: h.github_url.clone(),
            reading_time: self.reading_time(),
            word_count: self.content.word_count,
            complexity: self.complexity,
            schema_type: h.schema_type.clone(),
        }
    }
}

/// Entry of the full JSON index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub categories: Vec<String>,
    pub url: String,
    pub slug: Slug,
    pub excerpt: String,
    pub date: IsoDate,
    pub last_updated: IsoDate,
    pub status: Status,
    pub featured: bool,
    pub tags: Vec<String>,
    pub tech_stack: Vec<String>,
    pub seo_title: String,
    pub seo_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    pub reading_time: ReadingTime,
    pub word_count: usize,
    pub complexity: u8,
    pub schema_type: SchemaType,
}

/// Entry of the reduced index kept for older consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleEntry {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub categories: Vec<String>,
    pub url: String,
}

impl From<&ProjectRecord> for SimpleEntry {
    fn from(record: &ProjectRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            image: record.image.clone(),
            categories: record.categories.clone(),
            url: record.url.clone(),
        }
    }
}
