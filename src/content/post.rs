//! Post projections returned by the content store
//!
//! Author and category data are resolved by the queries themselves, so the
//! structs here only carry denormalized names and slugs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::blocks::Document;
use crate::image::ImageRef;

/// Slug object as stored (`{ "current": "..." }`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slug {
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: String,
}

/// A post as projected for listing cards
#[derive(Debug, Clone, Deserialize)]
pub struct PostSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default)]
    pub slug: Option<Slug>,

    #[serde(rename = "mainImage", default, deserialize_with = "lenient_image")]
    pub main_image: Option<ImageRef>,

    #[serde(rename = "publishedAt", default, deserialize_with = "lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub excerpt: Option<String>,

    #[serde(rename = "authorName", default)]
    pub author_name: Option<String>,

    /// Category title
    #[serde(default)]
    pub category: Option<String>,
}

impl PostSummary {
    /// Routing slug, if the post has one
    pub fn slug(&self) -> Option<&str> {
        defined_slug(&self.slug)
    }
}

/// A full post as projected for the single-post page
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default)]
    pub slug: Option<Slug>,

    #[serde(rename = "mainImage", default, deserialize_with = "lenient_image")]
    pub main_image: Option<ImageRef>,

    /// Ordered image gallery
    #[serde(default, deserialize_with = "lenient_gallery")]
    pub gallery: Vec<ImageRef>,

    #[serde(default)]
    pub body: Document,

    #[serde(rename = "publishedAt", default, deserialize_with = "lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(rename = "_updatedAt", default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub excerpt: Option<String>,

    #[serde(rename = "authorName", default)]
    pub author_name: Option<String>,

    #[serde(rename = "authorImage", default, deserialize_with = "lenient_image")]
    pub author_image: Option<ImageRef>,

    /// Category title
    #[serde(default)]
    pub category: Option<String>,

    #[serde(rename = "categorySlug", default)]
    pub category_slug: Option<String>,
}

impl Post {
    /// Routing slug, if the post has one
    pub fn slug(&self) -> Option<&str> {
        defined_slug(&self.slug)
    }
}

/// A post shown in the related-posts sidebar
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedPost {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default)]
    pub slug: Option<Slug>,

    #[serde(rename = "mainImage", default, deserialize_with = "lenient_image")]
    pub main_image: Option<ImageRef>,

    #[serde(rename = "publishedAt", default, deserialize_with = "lenient_datetime")]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(rename = "authorName", default)]
    pub author_name: Option<String>,
}

impl RelatedPost {
    /// Routing slug, if the post has one
    pub fn slug(&self) -> Option<&str> {
        defined_slug(&self.slug)
    }
}

/// Row of the all-slugs query
#[derive(Debug, Clone, Deserialize)]
pub struct SlugRow {
    #[serde(default)]
    pub slug: Option<String>,
}

fn defined_slug(slug: &Option<Slug>) -> Option<&str> {
    slug.as_ref()
        .map(|s| s.current.as_str())
        .filter(|s| !s.is_empty())
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Image fields without a usable asset become `None`
fn lenient_image<'de, D>(deserializer: D) -> Result<Option<ImageRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(image_from_value))
}

/// Gallery entries without a usable asset are skipped
fn lenient_gallery<'de, D>(deserializer: D) -> Result<Vec<ImageRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(image_from_value)
        .collect())
}

fn image_from_value(value: serde_json::Value) -> Option<ImageRef> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(image) => Some(image),
        Err(e) => {
            tracing::debug!("Ignoring unusable image field: {}", e);
            None
        }
    }
}

/// Parse RFC 3339 timestamps, or bare dates, and ignore anything else
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

/// Parse a store timestamp
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
