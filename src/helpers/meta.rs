//! Page metadata: Open Graph / Twitter tags and JSON-LD

use serde::Serialize;
use serde_json::json;

use super::html::{html_escape, script_safe_json};
use crate::config::SiteConfig;

/// Metadata describing one rendered page
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: Option<String>,
    /// `website` or `article`
    pub kind: &'static str,
    pub published: Option<String>,
}

/// Generate Open Graph and Twitter card meta tags
pub fn meta_tags(config: &SiteConfig, meta: &PageMeta) -> String {
    let mut tags = vec![
        format!(r#"<meta property="og:type" content="{}">"#, meta.kind),
        format!(
            r#"<meta property="og:title" content="{}">"#,
            html_escape(&meta.title)
        ),
        format!(
            r#"<meta property="og:url" content="{}">"#,
            html_escape(&meta.url)
        ),
        format!(
            r#"<meta property="og:site_name" content="{}">"#,
            html_escape(&config.title)
        ),
        format!(
            r#"<meta property="og:locale" content="{}">"#,
            html_escape(&config.locale)
        ),
        r#"<meta name="twitter:card" content="summary_large_image">"#.to_string(),
        format!(
            r#"<meta name="twitter:title" content="{}">"#,
            html_escape(&meta.title)
        ),
    ];

    if !meta.description.is_empty() {
        tags.push(format!(
            r#"<meta name="description" content="{}">"#,
            html_escape(&meta.description)
        ));
        tags.push(format!(
            r#"<meta property="og:description" content="{}">"#,
            html_escape(&meta.description)
        ));
        tags.push(format!(
            r#"<meta name="twitter:description" content="{}">"#,
            html_escape(&meta.description)
        ));
    }

    if let Some(img) = &meta.image {
        tags.push(format!(
            r#"<meta property="og:image" content="{}">"#,
            html_escape(img)
        ));
        tags.push(format!(
            r#"<meta name="twitter:image" content="{}">"#,
            html_escape(img)
        ));
    }

    if !config.twitter_handle.is_empty() {
        tags.push(format!(
            r#"<meta name="twitter:creator" content="{}">"#,
            html_escape(&config.twitter_handle)
        ));
    }

    if !config.creator.is_empty() {
        tags.push(format!(
            r#"<meta name="creator" content="{}">"#,
            html_escape(&config.creator)
        ));
    }

    if let Some(published) = &meta.published {
        tags.push(format!(
            r#"<meta property="article:published_time" content="{}">"#,
            html_escape(published)
        ));
    }

    if !config.keywords.is_empty() {
        tags.push(format!(
            r#"<meta name="keywords" content="{}">"#,
            html_escape(&config.keywords.join(", "))
        ));
    }

    tags.join("\n")
}

/// Fields of the JSON-LD `Article` object
#[derive(Debug, Clone)]
pub struct ArticleData<'a> {
    pub headline: &'a str,
    pub description: Option<&'a str>,
    pub image: Option<&'a str>,
    pub author: Option<&'a str>,
    pub url: &'a str,
    pub published: Option<String>,
    pub modified: Option<String>,
}

/// Build the JSON-LD `<script>` element for an article
pub fn article_json_ld(config: &SiteConfig, article: &ArticleData<'_>) -> String {
    let mut data = json!({
        "@context": "https://schema.org",
        "@type": "Article",
        "headline": article.headline,
        "mainEntityOfPage": { "@type": "WebPage", "@id": article.url },
        "author": {
            "@type": "Person",
            "name": article.author.unwrap_or(&config.author),
        },
        "publisher": {
            "@type": "Organization",
            "name": config.publisher,
            "logo": {
                "@type": "ImageObject",
                "url": super::url::full_url_for(config, &config.og_image),
            },
        },
    });

    if let Some(description) = article.description {
        data["description"] = json!(description);
    }
    if let Some(image) = article.image {
        data["image"] = json!([image]);
    }
    if let Some(published) = &article.published {
        data["datePublished"] = json!(published);
    }
    if let Some(modified) = article.modified.as_ref().or(article.published.as_ref()) {
        data["dateModified"] = json!(modified);
    }

    format!(
        r#"<script type="application/ld+json">{}</script>"#,
        script_safe_json(&data.to_string())
    )
}
