//! Generate static files

use anyhow::Result;
use std::sync::Arc;

use crate::generator::{ExportSummary, Generator};
use crate::store::ContentStore;
use crate::Blog;

/// Export every page from the configured content store
pub async fn run(blog: &Blog) -> Result<ExportSummary> {
    run_with_store(blog, blog.store().as_ref()).await
}

/// Export every page from the given store
pub async fn run_with_store(blog: &Blog, store: &dyn ContentStore) -> Result<ExportSummary> {
    let start = std::time::Instant::now();

    let generator = Generator::new(Arc::new(blog.config.clone()))?;
    let summary = generator
        .export(store, &blog.public_dir, &blog.static_dir)
        .await?;

    tracing::info!(
        "Generated {} pages ({} skipped, {} assets) in {:.2?}",
        summary.pages,
        summary.skipped,
        summary.assets,
        start.elapsed()
    );

    Ok(summary)
}
