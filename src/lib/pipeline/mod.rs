use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{Section, eyre::eyre};
use pulldown_cmark::Options;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::info;

use crate::{
    config::{BuildMode, INDEX_FILE, INPUT_DIR, OUTPUT_DIR, PROJECTS_DIR, SiteConfig, TEMPLATES_DIR},
    content::markdown_options,
    front_matter::YamlFrontmatter,
    index::{
        ProjectIndex, Skipped, Source, aggregate, discover_sources, prepare_input,
        validate_index_file,
    },
    page::{GenerationReport, PageGenerator, copy_project_images},
    project::Project,
    seo::write_seo_package,
    tags::TagMetadata,
    types::IsoDate,
};

/// What a build produced, for the caller to summarise.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub indexed: usize,
    pub skipped: Vec<Skipped>,
    pub pages: GenerationReport,
    pub images_copied: usize,
    pub sitemap_urls: usize,
}

impl BuildSummary {
    pub fn log_summary(&self) {
        info!(
            "build finished: {} indexed, {} skipped, {} pages, {} page errors, {} images, {} sitemap urls",
            self.indexed,
            self.skipped.len(),
            self.pages.generated.len(),
            self.pages.errors.len(),
            self.images_copied,
            self.sitemap_urls
        );
    }
}

pub fn build_at(root: &Path, mode: BuildMode) -> color_eyre::Result<BuildSummary> {
    build_at_with_now(root, mode, OffsetDateTime::now_utc())
}

/// Build with a fixed clock. Every timestamp in the output derives from `now`.
pub fn build_at_with_now(
    root: &Path,
    mode: BuildMode,
    now: OffsetDateTime,
) -> color_eyre::Result<BuildSummary> {
    let ctx = BuildCtx::load_at(root, mode, now)?;
    fs::create_dir_all(&ctx.output_dir)
        .with_note(|| format!("While creating {}", ctx.output_dir.display()))?;

    Pipeline::new(ctx)
        .discover()?
        .parse()?
        .transform()?
        .render()?
        .emit()
}

struct BuildCtx {
    input_dir: PathBuf,
    output_dir: PathBuf,
    templates_dir: PathBuf,
    site: SiteConfig,
    mode: BuildMode,
    now: OffsetDateTime,
    generated_at: String,
    today: IsoDate,
    parser_options: Options,
}

impl BuildCtx {
    fn load_at(root: &Path, mode: BuildMode, now: OffsetDateTime) -> color_eyre::Result<Self> {
        let site = SiteConfig::load_at(root)?;
        let generated_at = now
            .format(&Rfc3339)
            .with_note(|| "While formatting the build timestamp")?;

        Ok(Self {
            input_dir: root.join(INPUT_DIR),
            output_dir: root.join(OUTPUT_DIR),
            templates_dir: root.join(TEMPLATES_DIR),
            site,
            mode,
            now,
            generated_at,
            today: IsoDate::today(now),
            parser_options: markdown_options(),
        })
    }
}

fn discover_projects(ctx: &BuildCtx) -> color_eyre::Result<Vec<Source>> {
    info!("building in {} mode", ctx.mode.as_str());
    prepare_input(&ctx.input_dir, ctx.mode)?;
    discover_sources(&ctx.input_dir)
}

fn parse_projects(ctx: &BuildCtx, sources: Vec<Source>) -> (Vec<Project>, Vec<Skipped>) {
    let aggregate = aggregate(
        sources,
        &YamlFrontmatter,
        &ctx.site,
        ctx.today,
        ctx.parser_options,
        ctx.mode,
    );
    (aggregate.projects, aggregate.skipped)
}

fn emit_projects(ctx: &BuildCtx, state: Rendered) -> color_eyre::Result<BuildSummary> {
    let Rendered {
        projects,
        skipped,
        index,
        tags,
        pages,
    } = state;

    index.write(&ctx.output_dir)?;
    tags.write(&ctx.output_dir)?;
    let images_copied = copy_project_images(&projects, &ctx.output_dir)?;
    let seo = write_seo_package(&projects, &ctx.site, ctx.now, &ctx.output_dir)?;

    let index_path = ctx.output_dir.join(PROJECTS_DIR).join(INDEX_FILE);
    let indexed = validate_index_file(&index_path)
        .map_err(|e| eyre!("Emitted index failed validation: {e}"))
        .with_note(|| format!("While checking {}", index_path.display()))?;

    Ok(BuildSummary {
        indexed,
        skipped,
        pages,
        images_copied,
        sitemap_urls: seo.sitemap_urls,
    })
}

trait PipelineStage {}
/// Pipeline typestate driver
struct Pipeline<S: PipelineStage> {
    ctx: BuildCtx,
    state: S,
}

// initial state
impl Pipeline<()> {
    fn new(ctx: BuildCtx) -> Self {
        Self { ctx, state: () }
    }

    fn discover(self) -> color_eyre::Result<Pipeline<Discovered>> {
        let sources = discover_projects(&self.ctx)?;
        Ok(Pipeline {
            ctx: self.ctx,
            state: Discovered(sources),
        })
    }
}

struct Discovered(Vec<Source>);
impl PipelineStage for Discovered {}
struct Parsed {
    projects: Vec<Project>,
    skipped: Vec<Skipped>,
}
impl PipelineStage for Parsed {}
struct Transformed {
    projects: Vec<Project>,
    skipped: Vec<Skipped>,
    index: ProjectIndex,
    tags: TagMetadata,
}
impl PipelineStage for Transformed {}
struct Rendered {
    projects: Vec<Project>,
    skipped: Vec<Skipped>,
    index: ProjectIndex,
    tags: TagMetadata,
    pages: GenerationReport,
}
impl PipelineStage for Rendered {}
impl PipelineStage for () {}

impl Pipeline<Discovered> {
    fn parse(self) -> color_eyre::Result<Pipeline<Parsed>> {
        let (projects, skipped) = parse_projects(&self.ctx, self.state.0);
        Ok(Pipeline {
            ctx: self.ctx,
            state: Parsed { projects, skipped },
        })
    }
}

impl Pipeline<Parsed> {
    fn transform(self) -> color_eyre::Result<Pipeline<Transformed>> {
        let Parsed { projects, skipped } = self.state;
        let index = ProjectIndex::build(&projects, &self.ctx.generated_at);
        let tags = TagMetadata::build(&index.projects, &self.ctx.generated_at);
        Ok(Pipeline {
            ctx: self.ctx,
            state: Transformed {
                projects,
                skipped,
                index,
                tags,
            },
        })
    }
}

impl Pipeline<Transformed> {
    fn render(self) -> color_eyre::Result<Pipeline<Rendered>> {
        let Transformed {
            projects,
            skipped,
            index,
            tags,
        } = self.state;

        // A missing template aborts before any artifact is written.
        let generator =
            PageGenerator::load(&self.ctx.templates_dir, self.ctx.site.clone(), self.ctx.mode)?;
        let pages = generator.generate_all(&projects, &self.ctx.output_dir);

        Ok(Pipeline {
            ctx: self.ctx,
            state: Rendered {
                projects,
                skipped,
                index,
                tags,
                pages,
            },
        })
    }
}

impl Pipeline<Rendered> {
    fn emit(self) -> color_eyre::Result<BuildSummary> {
        let summary = emit_projects(&self.ctx, self.state)?;
        summary.log_summary();
        Ok(summary)
    }
}
