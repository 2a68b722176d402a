//! Page data loaders
//!
//! One loader per route shape. Each issues its queries against a
//! [`ContentStore`], applies the visibility and bounding rules, and hands a
//! view-ready result to the generator. Every error is terminal for the
//! request.

use indexmap::IndexSet;
use thiserror::Error;

use crate::content::{Post, PostSummary, RelatedPost, SlugRow};
use crate::store::{fetch, queries, ContentStore, QueryParams, StoreError};

/// Reasons a page cannot be loaded
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Missing required parameter: slug")]
    MissingParameter,

    #[error("No post with slug {slug:?}")]
    NotFound { slug: String },

    #[error(transparent)]
    Upstream(#[from] StoreError),
}

/// Data behind the home page
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Routable posts, newest first
    pub posts: Vec<PostSummary>,
    /// Category filter labels, the "all" label first
    pub categories: Vec<String>,
}

/// Data behind a single post page
#[derive(Debug, Clone)]
pub struct PostPage {
    pub post: Post,
    /// At most [`queries::RELATED_LIMIT`] posts, never the post itself
    pub related: Vec<RelatedPost>,
}

impl PostPage {
    /// Slug the post was loaded under
    pub fn slug(&self) -> &str {
        self.post.slug().unwrap_or_default()
    }
}

/// Load every post for the listing page
pub async fn load_listing(
    store: &dyn ContentStore,
    all_label: &str,
) -> Result<Listing, LoadError> {
    let rows: Option<Vec<PostSummary>> =
        fetch(store, queries::LISTING, &QueryParams::new()).await?;

    let total = rows.as_ref().map_or(0, Vec::len);
    let posts: Vec<PostSummary> = rows
        .unwrap_or_default()
        .into_iter()
        .filter(|post| post.slug().is_some())
        .collect();

    if posts.len() < total {
        tracing::debug!("Skipped {} posts without a slug", total - posts.len());
    }

    let categories = derive_categories(&posts, all_label);
    tracing::debug!(
        "Loaded listing: {} posts, {} categories",
        posts.len(),
        categories.len() - 1
    );

    Ok(Listing { posts, categories })
}

/// Distinct category titles in first-occurrence order, prefixed with `all_label`
pub fn derive_categories(posts: &[PostSummary], all_label: &str) -> Vec<String> {
    let mut categories = IndexSet::new();
    categories.insert(all_label.to_string());

    for title in posts.iter().filter_map(|post| post.category.as_deref()) {
        if !title.is_empty() {
            categories.insert(title.to_string());
        }
    }

    categories.into_iter().collect()
}

/// Load one post by exact slug, plus its related posts
pub async fn load_post(
    store: &dyn ContentStore,
    slug: Option<&str>,
) -> Result<PostPage, LoadError> {
    let slug = match slug {
        Some(slug) if !slug.is_empty() => slug,
        _ => return Err(LoadError::MissingParameter),
    };

    let params = QueryParams::new().with("slug", slug);
    let post: Option<Post> = fetch(store, queries::POST_BY_SLUG, &params).await?;

    let post = match post {
        Some(post) if post.slug() == Some(slug) => post,
        Some(post) => {
            tracing::warn!(
                "Store returned slug {:?} for {:?}, treating as not found",
                post.slug(),
                slug
            );
            return Err(LoadError::NotFound {
                slug: slug.to_string(),
            });
        }
        None => {
            return Err(LoadError::NotFound {
                slug: slug.to_string(),
            })
        }
    };

    let related = match post.category.as_deref().filter(|c| !c.is_empty()) {
        Some(category) => load_related(store, slug, category).await?,
        None => Vec::new(),
    };

    tracing::debug!("Loaded post {:?} with {} related", slug, related.len());
    Ok(PostPage { post, related })
}

async fn load_related(
    store: &dyn ContentStore,
    slug: &str,
    category: &str,
) -> Result<Vec<RelatedPost>, LoadError> {
    let params = QueryParams::new()
        .with("slug", slug)
        .with("category", category);
    let rows: Option<Vec<RelatedPost>> = fetch(store, queries::RELATED_POSTS, &params).await?;

    let mut related: Vec<RelatedPost> = rows
        .unwrap_or_default()
        .into_iter()
        .filter(|r| matches!(r.slug(), Some(s) if s != slug))
        .collect();
    related.truncate(queries::RELATED_LIMIT);
    Ok(related)
}

/// Load the slug of every routable post
pub async fn load_slugs(store: &dyn ContentStore) -> Result<Vec<String>, LoadError> {
    let rows: Option<Vec<SlugRow>> = fetch(store, queries::ALL_SLUGS, &QueryParams::new()).await?;

    let mut seen = IndexSet::new();
    for slug in rows.unwrap_or_default().into_iter().filter_map(|r| r.slug) {
        if !slug.is_empty() {
            seen.insert(slug);
        }
    }
    Ok(seen.into_iter().collect())
}
