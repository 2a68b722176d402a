//! GROQ queries issued by the page loaders

/// Every post, newest first, projected for listing cards
pub const LISTING: &str = r#"*[_type == "post"] | order(publishedAt desc) {
  _id, title, slug, mainImage, publishedAt, excerpt,
  "authorName": author->name,
  "category": category->title
}"#;

/// A single post by exact slug match (`$slug`)
pub const POST_BY_SLUG: &str = r#"*[_type == "post" && slug.current == $slug][0]{
  _id,
  title,
  slug,
  mainImage,
  gallery,
  body,
  publishedAt,
  _updatedAt,
  excerpt,
  "authorName": author->name,
  "authorImage": author->image,
  "category": category->title,
  "categorySlug": category->slug.current
}"#;

/// Up to three other posts in the same category (`$slug`, `$category`)
pub const RELATED_POSTS: &str = r#"*[_type == "post" && slug.current != $slug && category->title == $category][0..2]{
  title,
  slug,
  mainImage,
  publishedAt,
  "category": category->title,
  "authorName": author->name
}"#;

/// Slugs of every routable post
pub const ALL_SLUGS: &str = r#"*[_type == "post" && defined(slug.current)]{ "slug": slug.current }"#;

/// Maximum number of related posts shown next to an article
pub const RELATED_LIMIT: usize = 3;
