use std::{fs, path::Path};

use color_eyre::{Section, eyre::eyre};
use serde::Deserialize;

pub const INPUT_DIR: &str = "projects";
pub const OUTPUT_DIR: &str = "public";
pub const TEMPLATES_DIR: &str = "templates";
pub const BACKUP_DIR: &str = "backup";
pub const IMAGES_DIR: &str = "images";
pub const PROJECT_SOURCE: &str = "index.md";
pub const PROJECT_TEMPLATE: &str = "project.html";
pub const SITE_CONFIG_FILE: &str = "site.toml";

// Output names, relative to the output directory.
pub const PROJECTS_DIR: &str = "projects";
pub const INDEX_FILE: &str = "index.json";
pub const SIMPLE_INDEX_FILE: &str = "index-simple.json";
pub const TAGS_METADATA_FILE: &str = "tags-metadata.json";
pub const VALIDATION_REPORT_FILE: &str = "validation-report.json";
pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";
pub const STRUCTURED_DATA_FILE: &str = "structured-data.json";
pub const SOCIAL_DATA_FILE: &str = "social-media-data.json";
pub const SEO_REPORT_FILE: &str = "seo-report.json";

// Site-wide defaults, overridable through `site.toml`.
pub const SITE_BASE_URL: &str = "https://portfolio.example.com/";
pub const SITE_NAME: &str = "Portfolio";
pub const SITE_DESCRIPTION: &str = "Data, automation and no-code projects";
pub const SITE_AUTHOR: &str = "Portfolio Author";
pub const SITE_LANGUAGE: &str = "en";

pub const DEFAULT_CATEGORY: &str = "General";
pub const WORDS_PER_MINUTE: usize = 200;
pub const EXCERPT_LIMIT: usize = 120;
pub const SEO_TITLE_LIMIT: usize = 60;
pub const SEO_DESCRIPTION_LIMIT: usize = 160;
pub const COMPLEXITY_CAP: u8 = 10;
// Number of projects listed in the structured-data item list.
pub const ITEM_LIST_LIMIT: usize = 10;

/// Whether drafts are part of the build and how strict infrastructure checks are.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Site metadata used for canonical links, structured data and social cards.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub base_url: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub job_title: String,
    pub language: String,
    pub keywords: Vec<String>,
    pub knows_about: Vec<String>,
    pub same_as: Vec<String>,
    pub twitter_site: Option<String>,
    pub og_image: String,
    pub twitter_image: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: SITE_BASE_URL.to_string(),
            name: SITE_NAME.to_string(),
            description: SITE_DESCRIPTION.to_string(),
            author: SITE_AUTHOR.to_string(),
            job_title: "Data & automation developer".to_string(),
            language: SITE_LANGUAGE.to_string(),
            keywords: vec!["portfolio".to_string(), "developer".to_string()],
            knows_about: ["Automation", "Data analysis", "Python", "SQL"]
                .map(String::from)
                .to_vec(),
            same_as: Vec::new(),
            twitter_site: None,
            og_image: "images/og-default.png".to_string(),
            twitter_image: "images/twitter-default.png".to_string(),
        }
    }
}

impl SiteConfig {
    /// Read `site.toml` under `root` if present, otherwise use the defaults.
    pub fn load_at(root: &Path) -> color_eyre::Result<Self> {
        let path = root.join(SITE_CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_note(|| format!("While reading {}", path.display()))?;
        Self::from_toml(&raw).with_note(|| format!("While parsing {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> color_eyre::Result<Self> {
        let mut config: Self = toml::from_str(raw).map_err(|e| eyre!(e.to_string()))?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn canonical_url(&self, slug: &str) -> String {
        format!("{}/{PROJECTS_DIR}/{slug}", self.base())
    }

    pub fn locale(&self) -> &'static str {
        match self.language.as_str() {
            "fr" => "fr_FR",
            "de" => "de_DE",
            "es" => "es_ES",
            _ => "en_US",
        }
    }
}
