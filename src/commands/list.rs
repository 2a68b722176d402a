//! List site content

use anyhow::Result;
use indexmap::IndexMap;

use crate::i18n::I18n;
use crate::loader;
use crate::store::ContentStore;
use crate::Blog;

/// List site content by type
pub async fn run(blog: &Blog, content_type: &str) -> Result<()> {
    for line in lines(blog, blog.store().as_ref(), content_type).await? {
        println!("{}", line);
    }
    Ok(())
}

/// Output lines for a content type
pub async fn lines(
    blog: &Blog,
    store: &dyn ContentStore,
    content_type: &str,
) -> Result<Vec<String>> {
    let all_label = I18n::embedded(&blog.config.language)?.get("listing.all");
    let mut out = Vec::new();

    match content_type {
        "post" | "posts" => {
            let listing = loader::load_listing(store, &all_label).await?;
            out.push(format!("Posts ({}):", listing.posts.len()));
            for post in &listing.posts {
                let date = post
                    .published_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                out.push(format!(
                    "  {} - {} [{}]",
                    date,
                    post.title,
                    post.slug().unwrap_or_default()
                ));
            }
        }
        "category" | "categories" => {
            let listing = loader::load_listing(store, &all_label).await?;
            let mut categories: IndexMap<&str, usize> = IndexMap::new();
            for title in listing.categories.iter().skip(1) {
                categories.insert(title, 0);
            }
            for post in &listing.posts {
                if let Some(count) = post
                    .category
                    .as_deref()
                    .and_then(|c| categories.get_mut(c))
                {
                    *count += 1;
                }
            }

            out.push(format!("Categories ({}):", categories.len()));
            for (title, count) in categories {
                out.push(format!("  {} ({})", title, count));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category",
                content_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{summary, FakeStore};
    use serde_json::json;

    fn store() -> FakeStore {
        FakeStore {
            listing: json!([
                summary("a", Some("Sport")),
                summary("b", Some("Kulturë")),
                summary("c", Some("Sport"))
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_posts() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let lines = lines(&blog, &store(), "posts").await.unwrap();
        assert_eq!(lines[0], "Posts (3):");
        assert_eq!(lines[1], "  2025-03-04 - Title a [a]");
    }

    #[tokio::test]
    async fn test_list_categories() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let lines = lines(&blog, &store(), "category").await.unwrap();
        assert_eq!(lines, vec!["Categories (2):", "  Sport (2)", "  Kulturë (1)"]);
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(lines(&blog, &store(), "tags").await.is_err());
    }
}
