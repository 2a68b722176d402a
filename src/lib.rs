//! presje: a server-rendered blog front end for a hosted content store
//!
//! Posts live in a Sanity dataset and are fetched with GROQ queries at
//! request time. Pages are rendered with Tera templates embedded in the
//! binary, and can also be exported as a static site.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod image;
pub mod loader;
pub mod server;
pub mod share;
pub mod store;
pub mod templates;
pub mod theme;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use store::{ContentStore, SanityClient};

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Public (export) directory
    pub public_dir: std::path::PathBuf,
    /// Static assets served and exported as-is
    pub static_dir: std::path::PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    ///
    /// `_config.yml` is optional; `PRESJE_*` environment variables
    /// override whatever it sets.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();
        config.validate()?;

        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
            static_dir,
        })
    }

    /// Client for the configured content store
    pub fn store(&self) -> Arc<dyn ContentStore> {
        Arc::new(SanityClient::new(&self.config.store))
    }

    /// Export the site as static files
    pub async fn generate(&self) -> Result<generator::ExportSummary> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
