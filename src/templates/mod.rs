//! Built-in blog templates using the Tera template engine
//!
//! Templates are embedded directly in the binary. Autoescaping is off;
//! templates escape text explicitly with the `html` filter and insert
//! pre-rendered fragments (article body, meta tags, JSON-LD) as-is.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::{html_escape, truncate};
use crate::share::ShareLinks;

/// Template renderer with the embedded blog templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Escaping is explicit, see the module docs
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("listing.html", include_str!("blog/listing.html")),
            ("post.html", include_str!("blog/post.html")),
            ("error.html", include_str!("blog/error.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("blog/partials/footer.html"),
            ),
            ("partials/card.html", include_str!("blog/partials/card.html")),
            (
                "partials/share.html",
                include_str!("blog/partials/share.html"),
            ),
        ])?;

        tera.register_filter("html", html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: escape HTML special characters
fn html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let escaped = match value {
        tera::Value::String(s) => html_escape(s),
        tera::Value::Null => String::new(),
        other => html_escape(&other.to_string()),
    };
    Ok(tera::Value::String(escaped))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}

/// Data structures for template context

/// Site-wide values shared by every page
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub brand: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub year: i32,
    pub share_script: &'static str,
}

/// Per-page head values
#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    /// Full `<title>` text
    pub title: String,
    pub canonical: String,
    /// Pre-rendered Open Graph / Twitter tags
    pub meta: String,
    /// Pre-rendered JSON-LD script
    pub json_ld: Option<String>,
    pub theme: &'static str,
    /// `?theme=<name>` when a non-default theme is active, else empty
    pub theme_query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryData {
    pub label: String,
    pub anchor: String,
    pub active: bool,
}

/// One post on the listing page
#[derive(Debug, Clone, Serialize)]
pub struct CardData {
    pub title: String,
    pub path: String,
    pub image: Option<String>,
    pub excerpt: String,
    pub date: Option<String>,
    pub date_xml: Option<String>,
    pub author: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub featured: Option<CardData>,
    pub posts: Vec<CardData>,
    pub categories: Vec<CategoryData>,
    pub count_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryImage {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedData {
    pub title: String,
    pub path: String,
    pub image: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareView {
    pub url: String,
    pub links: ShareLinks,
}

/// Everything the single-post template shows
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub excerpt: String,
    pub image: Option<String>,
    /// Rendered article body
    pub body: String,
    pub date: Option<String>,
    pub date_xml: Option<String>,
    pub author: String,
    pub author_initial: String,
    pub author_image: Option<String>,
    pub category: Option<String>,
    pub category_anchor: String,
    pub gallery: Vec<GalleryImage>,
    pub related: Vec<RelatedData>,
    pub share: ShareView,
}

/// Terminal error page
#[derive(Debug, Clone, Serialize)]
pub struct ErrorData {
    pub icon: &'static str,
    pub heading: String,
    /// Trusted HTML, any user input already escaped
    pub message: String,
    pub link_label: String,
}
