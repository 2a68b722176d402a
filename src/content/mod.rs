//! Content module - post projections and rich-text bodies

pub mod blocks;
mod post;
mod renderer;

pub use blocks::{Block, Document, Inline, List, ListItem, ListKind};
pub use post::{parse_timestamp, Post, PostSummary, RelatedPost, Slug, SlugRow};
pub use renderer::BlockRenderer;
