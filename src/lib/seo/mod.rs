//! Search-engine and social artifacts derived from the published projects.
//!
//! Everything here is a pure function of the project list, the site
//! configuration and the frozen build time; [`write_seo_package`] only adds
//! the file writes.
use std::{collections::BTreeMap, fs, path::Path};

use color_eyre::Section;
use serde::Serialize;
use serde_json::{Value, json};
use time::{
    OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use tracing::info;

use crate::{
    config::{
        ITEM_LIST_LIMIT, ROBOTS_FILE, SEO_REPORT_FILE, SEO_TITLE_LIMIT, SITEMAP_FILE,
        SOCIAL_DATA_FILE, STRUCTURED_DATA_FILE, SiteConfig,
    },
    project::Project,
    types::{IsoDate, Status},
    utils::{absolute_url, escape_xml, write_json},
};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const IMAGE_NS: &str = "http://www.google.com/schemas/sitemap-image/1.1";
const CLOCK_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Site sections listed ahead of the projects: anchor, change frequency, priority.
const FIXED_SECTIONS: [(&str, &str, &str); 4] = [
    ("", "weekly", "1.0"),
    ("#projects", "weekly", "0.9"),
    ("#about", "monthly", "0.7"),
    ("#contact", "monthly", "0.6"),
];

// A description shorter than this is reported as missing.
const MIN_DESCRIPTION: usize = 50;
// Meta descriptions should be at least this long.
const GOOD_DESCRIPTION: usize = 120;

fn published(projects: &[Project]) -> impl Iterator<Item = &Project> {
    projects
        .iter()
        .filter(|p| p.header.status == Status::Published)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UrlEntry {
    loc: String,
    lastmod: String,
    changefreq: &'static str,
    priority: &'static str,
    image: Option<String>,
}

/// Sitemap with the fixed sections followed by one entry per published project.
pub fn sitemap_xml(projects: &[Project], site: &SiteConfig, today: IsoDate) -> String {
    let base = site.base();
    let mut urls: Vec<UrlEntry> = FIXED_SECTIONS
        .iter()
        .map(|&(anchor, changefreq, priority)| UrlEntry {
            loc: if anchor.is_empty() {
                base.to_string()
            } else {
                format!("{base}/{anchor}")
            },
            lastmod: today.as_str(),
            changefreq,
            priority,
            image: None,
        })
        .collect();

    urls.extend(published(projects).map(|p| {
        let featured = p.header.featured;
        UrlEntry {
            loc: site.canonical_url(p.slug().as_str()),
            lastmod: p.header.last_updated.as_str(),
            changefreq: if featured { "monthly" } else { "yearly" },
            priority: if featured { "0.8" } else { "0.6" },
            image: p.header.hero_path().map(|path| absolute_url(base, &path)),
        }
    }));

    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}""#));
    if urls.iter().any(|u| u.image.is_some()) {
        xml.push_str(&format!(r#" xmlns:image="{IMAGE_NS}""#));
    }
    xml.push_str(">\n");

    for entry in urls {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", entry.lastmod));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        if let Some(image) = entry.image {
            xml.push_str("    <image:image>\n");
            xml.push_str(&format!("      <image:loc>{}</image:loc>\n", escape_xml(&image)));
            xml.push_str("    </image:image>\n");
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

pub fn robots_txt(site: &SiteConfig, stamp: &str) -> String {
    [
        "User-agent: *".to_string(),
        "Allow: /".to_string(),
        String::new(),
        "# Sitemaps".to_string(),
        format!("Sitemap: {}/{SITEMAP_FILE}", site.base()),
        String::new(),
        "# Build and backup directories".to_string(),
        "Disallow: /build-system/".to_string(),
        "Disallow: /backup/".to_string(),
        String::new(),
        "# Static assets".to_string(),
        "Allow: /css/".to_string(),
        "Allow: /js/".to_string(),
        "Allow: /images/".to_string(),
        String::new(),
        format!("# Generated on {stamp}"),
    ]
    .join("\n")
        + "\n"
}

/// schema.org documents for the author, the site and the project list.
pub fn structured_data(projects: &[Project], site: &SiteConfig, generated_at: &str) -> Value {
    let base = site.base();
    let listed: Vec<&Project> = published(projects).collect();
    let author = json!({ "@type": "Person", "name": site.author });

    let items: Vec<Value> = listed
        .iter()
        .take(ITEM_LIST_LIMIT)
        .enumerate()
        .map(|(i, p)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "url": site.canonical_url(p.slug().as_str()),
                "name": p.header.title,
                "description": p.header.description,
            })
        })
        .collect();

    json!({
        "person": {
            "@context": "https://schema.org",
            "@type": "Person",
            "name": site.author,
            "url": base,
            "sameAs": site.same_as,
            "jobTitle": site.job_title,
            "knowsAbout": site.knows_about,
            "mainEntityOfPage": { "@type": "WebSite", "@id": base },
        },
        "website": {
            "@context": "https://schema.org",
            "@type": "WebSite",
            "@id": base,
            "url": base,
            "name": site.name,
            "description": site.description,
            "author": author.clone(),
            "inLanguage": site.language,
            "potentialAction": {
                "@type": "SearchAction",
                "target": {
                    "@type": "EntryPoint",
                    "urlTemplate": format!("{base}/#projects?q={{search_term_string}}"),
                },
                "query-input": "required name=search_term_string",
            },
        },
        "portfolio": {
            "@context": "https://schema.org",
            "@type": "ItemList",
            "name": format!("Portfolio Projects - {}", site.author),
            "description": format!("Collection of projects by {}", site.author),
            "url": format!("{base}/#projects"),
            "author": author,
            "numberOfItems": listed.len(),
            "itemListElement": items,
        },
        "generated": generated_at,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenGraph {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleMeta>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleMeta {
    pub published_time: IsoDate,
    pub modified_time: IsoDate,
    pub author: String,
    pub section: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TwitterCard {
    pub card: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    pub title: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub og: OpenGraph,
    pub twitter: TwitterCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct SocialData {
    pub main_site: SocialEntry,
    pub projects: Vec<SocialEntry>,
}

pub fn social_data(projects: &[Project], site: &SiteConfig) -> SocialData {
    let main_site = SocialEntry {
        slug: None,
        og: OpenGraph {
            title: site.name.clone(),
            description: site.description.clone(),
            kind: "website".to_string(),
            url: site.base().to_string(),
            image: absolute_url(site.base(), &site.og_image),
            locale: Some(site.locale().to_string()),
            article: None,
        },
        twitter: TwitterCard {
            card: "summary_large_image".to_string(),
            site: site.twitter_site.clone(),
            title: site.name.clone(),
            description: site.description.clone(),
            image: absolute_url(site.base(), &site.twitter_image),
        },
    };

    let projects = published(projects)
        .map(|p| {
            let h = &p.header;
            SocialEntry {
                slug: Some(h.slug.to_string()),
                og: OpenGraph {
                    title: h.og_title.clone(),
                    description: h.og_description.clone(),
                    kind: h.og_type.clone(),
                    url: h.canonical_url.clone(),
                    image: h.og_image_url(site),
                    locale: None,
                    article: Some(ArticleMeta {
                        published_time: h.date,
                        modified_time: h.last_updated,
                        author: site.author.clone(),
                        section: h.categories.first().cloned(),
                        tags: h.categories.iter().chain(&h.tags).cloned().collect(),
                    }),
                },
                twitter: TwitterCard {
                    card: h.twitter_card.clone(),
                    site: site.twitter_site.clone(),
                    title: h.twitter_title.clone(),
                    description: h.twitter_description.clone(),
                    image: h.twitter_image_url(site),
                },
            }
        })
        .collect();

    SocialData {
        main_site,
        projects,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    MetaDescription,
    Images,
    TitleLength,
    GithubLinks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_projects: usize,
    pub published_projects: usize,
    pub featured_projects: usize,
    pub average_reading_time: u64,
    pub average_complexity: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentAnalysis {
    pub missing_descriptions: usize,
    pub missing_images: usize,
    pub long_titles: usize,
    pub short_descriptions: usize,
    pub categories_distribution: BTreeMap<String, usize>,
    pub tags_usage: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeoReport {
    pub generated: String,
    pub summary: ReportSummary,
    pub seo: Value,
    pub content_analysis: ContentAnalysis,
    pub recommendations: Vec<Recommendation>,
}

/// Rounded mean of the non-zero values.
fn average(values: impl Iterator<Item = u64>) -> u64 {
    let (sum, n) = values
        .filter(|v| *v > 0)
        .fold((0u64, 0u64), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0 } else { (sum * 2 + n) / (2 * n) }
}

fn distribution<'a>(values: impl Iterator<Item = &'a String>) -> BTreeMap<String, usize> {
    values.fold(BTreeMap::new(), |mut acc, v| {
        *acc.entry(v.clone()).or_insert(0) += 1;
        acc
    })
}

fn chars(s: &str) -> usize {
    s.chars().count()
}

pub fn recommendations(projects: &[&Project]) -> Vec<Recommendation> {
    let count = |pred: &dyn Fn(&Project) -> bool| projects.iter().filter(|&&p| pred(p)).count();

    let checks = [
        (
            RecommendationKind::MetaDescription,
            Priority::High,
            count(&|p: &Project| chars(&p.header.seo_description) < GOOD_DESCRIPTION),
            "projects need better meta descriptions (120-160 characters)",
        ),
        (
            RecommendationKind::Images,
            Priority::Medium,
            count(&|p: &Project| p.header.hero_image.is_none()),
            "projects are missing hero images",
        ),
        (
            RecommendationKind::TitleLength,
            Priority::Medium,
            count(&|p: &Project| chars(&p.header.title) > SEO_TITLE_LIMIT),
            "projects have titles longer than 60 characters",
        ),
        (
            RecommendationKind::GithubLinks,
            Priority::Low,
            count(&|p: &Project| p.header.github_url.is_none()),
            "projects could benefit from GitHub links",
        ),
    ];

    checks
        .into_iter()
        .filter(|(_, _, n, _)| *n > 0)
        .map(|(kind, priority, n, message)| Recommendation {
            kind,
            priority,
            count: n,
            message: format!("{n} {message}"),
        })
        .collect()
}

pub fn seo_report(projects: &[Project], today: IsoDate, generated_at: &str) -> SeoReport {
    let listed: Vec<&Project> = published(projects).collect();

    let summary = ReportSummary {
        total_projects: projects.len(),
        published_projects: listed.len(),
        featured_projects: listed.iter().filter(|p| p.header.featured).count(),
        average_reading_time: average(listed.iter().map(|p| u64::from(p.reading_time().minutes()))),
        average_complexity: average(listed.iter().map(|p| u64::from(p.complexity))),
    };

    let content_analysis = ContentAnalysis {
        missing_descriptions: listed
            .iter()
            .filter(|p| chars(&p.header.description) < MIN_DESCRIPTION)
            .count(),
        missing_images: listed.iter().filter(|p| p.header.hero_image.is_none()).count(),
        long_titles: listed
            .iter()
            .filter(|p| chars(&p.header.title) > SEO_TITLE_LIMIT)
            .count(),
        short_descriptions: listed
            .iter()
            .filter(|p| chars(&p.header.description) < GOOD_DESCRIPTION)
            .count(),
        categories_distribution: distribution(listed.iter().flat_map(|p| &p.header.categories)),
        tags_usage: distribution(listed.iter().flat_map(|p| &p.header.tags)),
    };

    let seo = json!({
        "sitemap": {
            "generated": true,
            "urls": listed.len() + FIXED_SECTIONS.len(),
            "last_updated": today,
        },
        "structured_data": {
            "implemented": true,
            "schemas": ["Person", "WebSite", "ItemList", "CreativeWork/SoftwareApplication"],
        },
        "social_media": {
            "open_graph": true,
            "twitter_cards": true,
        },
    });

    SeoReport {
        generated: generated_at.to_string(),
        summary,
        seo,
        content_analysis,
        recommendations: recommendations(&listed),
    }
}

/// What the SEO stage produced, for the build summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoSummary {
    pub sitemap_urls: usize,
    pub recommendations: Vec<Recommendation>,
}

pub fn write_seo_package(
    projects: &[Project],
    site: &SiteConfig,
    now: OffsetDateTime,
    output_dir: &Path,
) -> color_eyre::Result<SeoSummary> {
    let today = IsoDate::today(now);
    let generated_at = now.format(&Rfc3339)?;
    let stamp = now.format(CLOCK_FORMAT)?;

    fs::create_dir_all(output_dir)
        .with_note(|| format!("While creating {}", output_dir.display()))?;

    let sitemap_path = output_dir.join(SITEMAP_FILE);
    fs::write(&sitemap_path, sitemap_xml(projects, site, today))
        .with_note(|| format!("While writing {}", sitemap_path.display()))?;

    let robots_path = output_dir.join(ROBOTS_FILE);
    fs::write(&robots_path, robots_txt(site, &stamp))
        .with_note(|| format!("While writing {}", robots_path.display()))?;

    write_json(
        &output_dir.join(STRUCTURED_DATA_FILE),
        &structured_data(projects, site, &generated_at),
    )?;
    write_json(&output_dir.join(SOCIAL_DATA_FILE), &social_data(projects, site))?;

    let report = seo_report(projects, today, &generated_at);
    write_json(&output_dir.join(SEO_REPORT_FILE), &report)?;

    let sitemap_urls = report.summary.published_projects + FIXED_SECTIONS.len();
    info!("sitemap: {sitemap_urls} urls");
    for rec in &report.recommendations {
        info!("seo [{:?}] {}", rec.priority, rec.message);
    }

    Ok(SeoSummary {
        sitemap_urls,
        recommendations: report.recommendations,
    })
}

#[cfg(test)]
mod tests;
