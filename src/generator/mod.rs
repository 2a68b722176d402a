//! Generator module - turns loaded page data into HTML using the built-in
//! Tera templates, for both request-time rendering and static export

use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tera::Context;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{BlockRenderer, PostSummary, RelatedPost};
use crate::helpers::meta::{article_json_ld, meta_tags, ArticleData, PageMeta};
use crate::helpers::{
    canonical_post_url, category_anchor, date_xml, format_date, full_url_for, html_escape,
    initial, post_path, truncate, DateStyle,
};
use crate::i18n::I18n;
use crate::image::{Fit, ImageRef, ImageResolver};
use crate::loader::{self, Listing, LoadError, PostPage};
use crate::share::script::SHARE_SCRIPT_PATH;
use crate::share::ShareLinks;
use crate::store::ContentStore;
use crate::templates::{
    CardData, CategoryData, ErrorData, GalleryImage, ListingData, PageData, PostData, RelatedData,
    ShareView, SiteData, TemplateRenderer,
};
use crate::theme::Theme;

const FEATURED_IMAGE_WIDTH: u32 = 1200;
const CARD_IMAGE_WIDTH: u32 = 800;
const HERO_IMAGE_WIDTH: u32 = 1600;
const GALLERY_IMAGE_WIDTH: u32 = 600;
const THUMBNAIL_SIZE: u32 = 160;
const AVATAR_SIZE: u32 = 100;
/// Characters of body text used when a post has no excerpt
const DESCRIPTION_LENGTH: usize = 160;

/// Page generator shared by the server and the static export
pub struct Generator {
    config: Arc<SiteConfig>,
    renderer: TemplateRenderer,
    i18n: I18n,
    /// `i18n` as the nested `t` object templates read
    translations: serde_json::Value,
    images: ImageResolver,
}

/// Result of a static export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Pages written, the listing included
    pub pages: usize,
    /// Posts that failed to load or had an unusable slug
    pub skipped: usize,
    /// Static files copied
    pub assets: usize,
}

impl Generator {
    /// Create a new generator
    pub fn new(config: Arc<SiteConfig>) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let i18n = I18n::embedded(&config.language)?;
        let images = ImageResolver::new(&config.store);
        let translations = i18n.to_value();

        Ok(Self {
            config,
            renderer,
            i18n,
            translations,
            images,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn i18n(&self) -> &I18n {
        &self.i18n
    }

    /// Render the home page
    pub fn render_listing(&self, listing: &Listing, theme: Theme) -> Result<String> {
        let config = &self.config;
        let mut cards = listing.posts.iter().map(|post| self.card(post));
        let featured = cards.next();
        let posts: Vec<CardData> = cards.collect();

        let categories: Vec<CategoryData> = listing
            .categories
            .iter()
            .enumerate()
            .map(|(i, label)| CategoryData {
                label: label.clone(),
                anchor: if i == 0 {
                    "#".to_string()
                } else {
                    category_anchor(label)
                },
                active: i == 0,
            })
            .collect();

        let view = ListingData {
            featured: featured.map(|card| CardData {
                image: listing.posts[0]
                    .main_image
                    .as_ref()
                    .and_then(|img| self.image_url(img, FEATURED_IMAGE_WIDTH)),
                ..card
            }),
            posts,
            count_label: self.i18n.get_plural("listing.count", listing.posts.len()),
            categories: categories.clone(),
        };

        let page = PageData {
            title: config.page_title(""),
            canonical: format!("{}/", config.origin()),
            meta: meta_tags(
                config,
                &PageMeta {
                    title: config.title.clone(),
                    description: config.description.clone(),
                    url: format!("{}/", config.origin()),
                    image: Some(full_url_for(config, &config.og_image)),
                    kind: "website",
                    published: None,
                },
            ),
            json_ld: None,
            theme: theme.name(),
            theme_query: self.theme_query(theme),
        };

        // The header links at most five categories
        let nav: Vec<CategoryData> = categories.into_iter().skip(1).take(5).collect();

        let mut context = self.base_context(theme, &page);
        context.insert("nav_categories", &nav);
        context.insert("listing", &view);
        self.renderer.render("listing.html", &context)
    }

    /// Render a single post page
    pub fn render_post(&self, page: &PostPage, theme: Theme) -> Result<String> {
        let config = &self.config;
        let post = &page.post;
        let slug = page.slug();
        let canonical = canonical_post_url(config.origin(), slug);

        let author = self.author_label(post.author_name.as_deref());
        let excerpt = post.excerpt.clone().unwrap_or_default();
        let hero = post
            .main_image
            .as_ref()
            .and_then(|img| self.image_url(img, HERO_IMAGE_WIDTH));
        let category = post.category.clone().filter(|c| !c.is_empty());

        let gallery_alt = self.i18n.get("post.gallery_alt");
        let gallery = post
            .gallery
            .iter()
            .enumerate()
            .filter_map(|(i, img)| {
                let src = self.image_url(img, GALLERY_IMAGE_WIDTH)?;
                let alt = img
                    .alt
                    .clone()
                    .unwrap_or_else(|| format!("{} {} - {}", gallery_alt, i + 1, post.title));
                Some(GalleryImage { src, alt })
            })
            .collect();

        let view = PostData {
            title: post.title.clone(),
            excerpt: excerpt.clone(),
            image: hero.clone(),
            body: BlockRenderer::new(theme).render(&post.body),
            date: post.published_at.map(|d| self.date(&d, DateStyle::Long)),
            date_xml: post.published_at.map(|d| date_xml(&d)),
            author_initial: initial(post.author_name.as_deref().unwrap_or_default(), 'A'),
            author_image: post.author_image.as_ref().and_then(|img| {
                self.images
                    .resolve(img)
                    .width(AVATAR_SIZE)
                    .height(AVATAR_SIZE)
                    .fit(Fit::Crop)
                    .url()
                    .map_err(|e| tracing::warn!("Skipping author image: {}", e))
                    .ok()
            }),
            author: author.clone(),
            category_anchor: post
                .category_slug
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| format!("#{}", s))
                .or_else(|| category.as_deref().map(category_anchor))
                .unwrap_or_default(),
            category,
            gallery,
            related: page.related.iter().map(|r| self.related(r)).collect(),
            share: ShareView {
                url: canonical.clone(),
                links: ShareLinks::new(&canonical, &post.title),
            },
        };

        let published = post.published_at.map(|d| date_xml(&d));
        let meta = meta_tags(
            config,
            &PageMeta {
                title: config.page_title(&post.title),
                description: self.post_description(post, &excerpt),
                url: canonical.clone(),
                image: hero
                    .clone()
                    .or_else(|| Some(full_url_for(config, &config.og_image))),
                kind: "article",
                published: published.clone(),
            },
        );
        let json_ld = article_json_ld(
            config,
            &ArticleData {
                headline: &post.title,
                description: post.excerpt.as_deref().filter(|e| !e.is_empty()),
                image: hero.as_deref(),
                author: Some(author.as_str()),
                url: &canonical,
                published,
                modified: post.updated_at.map(|d| date_xml(&d)),
            },
        );

        let page = PageData {
            title: config.page_title(&post.title),
            canonical,
            meta,
            json_ld: Some(json_ld),
            theme: theme.name(),
            theme_query: self.theme_query(theme),
        };

        let mut context = self.base_context(theme, &page);
        context.insert("nav_categories", &Vec::<CategoryData>::new());
        context.insert("post", &view);
        self.renderer.render("post.html", &context)
    }

    /// Render the terminal page for a loader error
    pub fn render_error(&self, error: &LoadError, theme: Theme) -> Result<String> {
        let t = &self.i18n;
        let view = match error {
            LoadError::MissingParameter => ErrorData {
                icon: "❌",
                heading: t.get("error.title"),
                message: t.get("error.missing_parameter"),
                link_label: t.get("error.back_home"),
            },
            LoadError::NotFound { slug } => ErrorData {
                icon: "📄",
                heading: t.get("error.not_found"),
                message: t.get("error.not_found_detail").replace("%s", &html_escape(slug)),
                link_label: t.get("error.explore"),
            },
            LoadError::Upstream(_) => ErrorData {
                icon: "⚠️",
                heading: t.get("error.title"),
                message: t.get("error.upstream"),
                link_label: t.get("error.back_home"),
            },
        };

        let config = &self.config;
        let page = PageData {
            title: config.page_title(&view.heading),
            canonical: format!("{}/", config.origin()),
            meta: r#"<meta name="robots" content="noindex">"#.to_string(),
            json_ld: None,
            theme: theme.name(),
            theme_query: self.theme_query(theme),
        };

        let mut context = self.base_context(theme, &page);
        context.insert("nav_categories", &Vec::<CategoryData>::new());
        context.insert("error", &view);
        self.renderer.render("error.html", &context)
    }

    /// Write the listing and every post page into `public_dir`
    ///
    /// Posts that fail to load are logged and skipped; a listing failure
    /// aborts the export.
    pub async fn export(
        &self,
        store: &dyn ContentStore,
        public_dir: &Path,
        static_dir: &Path,
    ) -> Result<ExportSummary> {
        let theme = self.config.theme;
        let mut summary = ExportSummary::default();
        fs::create_dir_all(public_dir)?;

        summary.assets = copy_static_assets(static_dir, public_dir)?;

        let listing = loader::load_listing(store, &self.i18n.get("listing.all"))
            .await
            .context("Failed to load the post listing")?;
        write_page(&public_dir.join("index.html"), &self.render_listing(&listing, theme)?)?;
        summary.pages += 1;

        for slug in loader::load_slugs(store).await? {
            if !is_safe_segment(&slug) {
                tracing::warn!("Skipping post with unusable slug {:?}", slug);
                summary.skipped += 1;
                continue;
            }

            let page = match loader::load_post(store, Some(&slug)).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Skipping post {:?}: {}", slug, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let output_path = public_dir.join("post").join(&slug).join("index.html");
            write_page(&output_path, &self.render_post(&page, theme)?)?;
            summary.pages += 1;
        }

        Ok(summary)
    }

    /// Create a base context with common variables
    fn base_context(&self, theme: Theme, page: &PageData) -> Context {
        let config = &self.config;
        let site = SiteData {
            title: config.title.clone(),
            brand: config.publisher.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.origin().to_string(),
            year: chrono::Datelike::year(&chrono::Utc::now()),
            share_script: SHARE_SCRIPT_PATH,
        };

        let mut context = Context::new();
        context.insert("site", &site);
        context.insert("page", page);
        context.insert("c", &theme.classes());
        context.insert("t", &self.translations);
        context
    }

    fn card(&self, post: &PostSummary) -> CardData {
        CardData {
            title: post.title.clone(),
            path: post_path(post.slug().unwrap_or_default()),
            image: post
                .main_image
                .as_ref()
                .and_then(|img| self.image_url(img, CARD_IMAGE_WIDTH)),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            date: post.published_at.map(|d| self.date(&d, DateStyle::Long)),
            date_xml: post.published_at.map(|d| date_xml(&d)),
            author: self.author_label(post.author_name.as_deref()),
            category: post
                .category
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| self.i18n.get("listing.default_category")),
        }
    }

    fn related(&self, post: &RelatedPost) -> RelatedData {
        RelatedData {
            title: post.title.clone(),
            path: post_path(post.slug().unwrap_or_default()),
            image: post.main_image.as_ref().and_then(|img| {
                self.images
                    .resolve(img)
                    .width(THUMBNAIL_SIZE)
                    .height(THUMBNAIL_SIZE)
                    .fit(Fit::Crop)
                    .url()
                    .map_err(|e| tracing::warn!("Skipping related image: {}", e))
                    .ok()
            }),
            date: post
                .published_at
                .map(|d| self.date(&d, DateStyle::Numeric)),
        }
    }

    /// Resolve an image at a fixed width, omitting it if the reference is bad
    fn image_url(&self, image: &ImageRef, width: u32) -> Option<String> {
        match self.images.resolve(image).width(width).url() {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Skipping image: {}", e);
                None
            }
        }
    }

    /// Excerpt, else the start of the body text, else the site description
    fn post_description(&self, post: &crate::content::Post, excerpt: &str) -> String {
        if !excerpt.is_empty() {
            return excerpt.to_string();
        }
        let text = post
            .body
            .plain_text()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            self.config.description.clone()
        } else {
            truncate(&text, DESCRIPTION_LENGTH, None)
        }
    }

    fn author_label(&self, name: Option<&str>) -> String {
        name.filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.i18n.get("post.unknown_author"))
    }

    fn date(&self, date: &chrono::DateTime<chrono::Utc>, style: DateStyle) -> String {
        format_date(date, &self.config.language, style)
    }

    fn theme_query(&self, theme: Theme) -> String {
        if theme == self.config.theme {
            String::new()
        } else {
            format!("?theme={}", theme.name())
        }
    }
}

/// A slug that can be used as a single directory name
fn is_safe_segment(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.chars().any(char::is_control)
}

fn write_page(output_path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}

/// Copy static assets (og image, favicon, etc.) to the public directory
fn copy_static_assets(static_dir: &Path, public_dir: &Path) -> Result<usize> {
    if !static_dir.exists() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(static_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = path.strip_prefix(static_dir)?;
        let dest = public_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &dest)?;
        copied += 1;
    }

    Ok(copied)
}
