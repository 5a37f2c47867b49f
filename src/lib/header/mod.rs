use serde::Serialize;

use crate::{
    config::{DEFAULT_CATEGORY, EXCERPT_LIMIT, SEO_DESCRIPTION_LIMIT, SEO_TITLE_LIMIT, SiteConfig},
    front_matter::{FieldProblem, Fields, FrontmatterError},
    types::{FieldValue, IsoDate, SchemaType, Slug, Status},
    utils::{absolute_url, escape_attr, resolve_image, truncate_chars, truncate_words},
};

/// Keys promoted into typed [`Header`] fields. Everything else lands in `extra`.
const KNOWN_FIELDS: &[&str] = &[
    "title",
    "description",
    "date",
    "slug",
    "excerpt",
    "status",
    "featured",
    "categories",
    "tags",
    "tech_stack",
    "keywords",
    "hero_image",
    "hero_alt",
    "github_url",
    "last_updated",
    "language",
    "seo_title",
    "seo_description",
    "canonical_url",
    "og_title",
    "og_description",
    "og_type",
    "og_image",
    "twitter_card",
    "twitter_title",
    "twitter_description",
    "twitter_image",
    "schema_type",
];

/// Validated and auto-completed project frontmatter.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub title: String,
    pub description: String,
    pub date: IsoDate,
    pub slug: Slug,
    pub excerpt: String,
    pub status: Status,
    pub featured: bool,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub tech_stack: Vec<String>,
    pub keywords: Vec<String>,
    pub hero_image: Option<String>,
    pub hero_alt: Option<String>,
    pub github_url: Option<String>,
    pub last_updated: IsoDate,
    pub language: String,
    pub seo_title: String,
    pub seo_description: String,
    pub canonical_url: String,
    pub og_title: String,
    pub og_description: String,
    pub og_type: String,
    pub og_image: Option<String>,
    pub twitter_card: String,
    pub twitter_title: String,
    pub twitter_description: String,
    pub twitter_image: Option<String>,
    pub schema_type: SchemaType,
    #[serde(flatten)]
    pub extra: Fields,
}

fn text(fields: &Fields, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(FieldValue::as_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn list(fields: &Fields, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(FieldValue::List(items)) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(FieldValue::Text(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Check required fields and value formats, reporting every offending field
/// in field order.
pub fn check_fields(fields: &Fields) -> Vec<FieldProblem> {
    let mut problems = Vec::new();

    for key in ["title", "description"] {
        if text(fields, key).is_none() {
            problems.push(FieldProblem::Missing(key));
        }
    }

    match text(fields, "date") {
        None => problems.push(FieldProblem::Missing("date")),
        Some(raw) if IsoDate::parse(&raw).is_none() => {
            problems.push(FieldProblem::InvalidDate(raw));
        }
        Some(_) => {}
    }

    if let Some(raw) = text(fields, "status")
        && Status::parse(&raw).is_none()
    {
        problems.push(FieldProblem::InvalidStatus(raw));
    }

    match fields.get("categories") {
        Some(FieldValue::List(_)) if list(fields, "categories").is_empty() => {
            problems.push(FieldProblem::InvalidCategories);
        }
        Some(FieldValue::List(_)) | None => {}
        Some(other) if other.is_present() => problems.push(FieldProblem::InvalidCategories),
        Some(_) => {}
    }

    problems
}

/// Description-derived summary with Markdown markers removed.
pub fn excerpt_from(description: &str) -> String {
    let cleaned: String = description
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`'))
        .collect();
    truncate_words(&cleaned, EXCERPT_LIMIT)
}

impl Header {
    /// Validate raw fields and fill in every derived default.
    pub fn from_fields(
        fields: &Fields,
        site: &SiteConfig,
        today: IsoDate,
    ) -> Result<Self, FrontmatterError> {
        let problems = check_fields(fields);
        let (Some(title), Some(description), Some(date)) = (
            text(fields, "title"),
            text(fields, "description"),
            text(fields, "date").as_deref().and_then(IsoDate::parse),
        ) else {
            return Err(FrontmatterError::Invalid(problems));
        };
        if !problems.is_empty() {
            return Err(FrontmatterError::Invalid(problems));
        }

        let slug = Slug::derive(&text(fields, "slug").unwrap_or_else(|| title.clone()));
        let excerpt = text(fields, "excerpt")
            .map(|e| truncate_words(&e, EXCERPT_LIMIT))
            .unwrap_or_else(|| excerpt_from(&description));
        let status = text(fields, "status")
            .as_deref()
            .and_then(Status::parse)
            .unwrap_or_default();
        let featured = fields.get("featured").is_some_and(FieldValue::as_bool);

        let mut categories = list(fields, "categories");
        if categories.is_empty() {
            categories.push(DEFAULT_CATEGORY.to_string());
        }

        let hero_image = text(fields, "hero_image");
        let hero_alt = text(fields, "hero_alt").or_else(|| {
            hero_image
                .as_ref()
                .map(|_| format!("Preview of project: {title}"))
        });

        let seo_title = truncate_chars(
            &text(fields, "seo_title").unwrap_or_else(|| title.clone()),
            SEO_TITLE_LIMIT,
        );
        let seo_description = truncate_chars(
            &text(fields, "seo_description").unwrap_or_else(|| description.clone()),
            SEO_DESCRIPTION_LIMIT,
        );
        let canonical_url =
            text(fields, "canonical_url").unwrap_or_else(|| site.canonical_url(slug.as_str()));

        let schema_type = text(fields, "schema_type")
            .map(|name| SchemaType::from_name(&name))
            .unwrap_or_else(|| SchemaType::infer(&categories));

        let extra = fields
            .iter()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            og_title: text(fields, "og_title").unwrap_or_else(|| title.clone()),
            og_description: text(fields, "og_description").unwrap_or_else(|| description.clone()),
            og_type: text(fields, "og_type").unwrap_or_else(|| "article".to_string()),
            og_image: text(fields, "og_image").or_else(|| hero_image.clone()),
            twitter_card: text(fields, "twitter_card")
                .unwrap_or_else(|| "summary_large_image".to_string()),
            twitter_title: text(fields, "twitter_title").unwrap_or_else(|| title.clone()),
            twitter_description: text(fields, "twitter_description")
                .unwrap_or_else(|| description.clone()),
            twitter_image: text(fields, "twitter_image").or_else(|| hero_image.clone()),
            last_updated: text(fields, "last_updated")
                .as_deref()
                .and_then(IsoDate::parse)
                .unwrap_or(today),
            language: text(fields, "language").unwrap_or_else(|| site.language.clone()),
            tags: list(fields, "tags"),
            tech_stack: list(fields, "tech_stack"),
            keywords: list(fields, "keywords"),
            github_url: text(fields, "github_url"),
            title,
            description,
            date,
            slug,
            excerpt,
            status,
            featured,
            categories,
            hero_image,
            hero_alt,
            seo_title,
            seo_description,
            canonical_url,
            schema_type,
            extra,
        })
    }

    /// Hero image under the canonical image policy.
    pub fn hero_path(&self) -> Option<String> {
        self.hero_image
            .as_deref()
            .map(|p| resolve_image(p, self.slug.as_str()))
    }

    /// Absolute Open Graph image, falling back to the site default.
    pub fn og_image_url(&self, site: &SiteConfig) -> String {
        let image = self
            .og_image
            .as_deref()
            .map(|p| resolve_image(p, self.slug.as_str()))
            .unwrap_or_else(|| site.og_image.clone());
        absolute_url(site.base(), &image)
    }

    /// Absolute Twitter card image, falling back to the site default.
    pub fn twitter_image_url(&self, site: &SiteConfig) -> String {
        let image = self
            .twitter_image
            .as_deref()
            .map(|p| resolve_image(p, self.slug.as_str()))
            .unwrap_or_else(|| site.twitter_image.clone());
        absolute_url(site.base(), &image)
    }

    /// Render OpenGraph + Twitter meta tags for the project page head.
    pub fn social_meta(&self, site: &SiteConfig) -> String {
        let og_image = self.og_image_url(site);
        let twitter_image = self.twitter_image_url(site);

        let mut tags: Vec<(&str, &str, &str)> = vec![
            ("name", "description", self.seo_description.as_str()),
            ("property", "og:title", self.og_title.as_str()),
            ("property", "og:description", self.og_description.as_str()),
            ("property", "og:type", self.og_type.as_str()),
            ("property", "og:url", self.canonical_url.as_str()),
            ("property", "og:image", og_image.as_str()),
            ("property", "og:site_name", site.name.as_str()),
            ("property", "og:locale", site.locale()),
            ("name", "twitter:card", self.twitter_card.as_str()),
            ("name", "twitter:title", self.twitter_title.as_str()),
            ("name", "twitter:description", self.twitter_description.as_str()),
            ("name", "twitter:image", twitter_image.as_str()),
        ];
        if let Some(handle) = site.twitter_site.as_deref() {
            tags.push(("name", "twitter:site", handle));
        }

        let mut out = String::new();
        for (attr, key, content) in tags {
            out.push_str(&format!(
                r#"
<meta {attr}="{key}" content="{}">"#,
                escape_attr(content)
            ));
        }
        out.push_str(&format!(
            r#"
<link rel="canonical" href="{}">"#,
            escape_attr(&self.canonical_url)
        ));
        out
    }
}

#[cfg(test)]
mod tests;
