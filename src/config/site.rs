//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::theme::Theme;

/// Main site configuration
///
/// Built once at startup and shared read-only with every loader and handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub author: String,
    pub creator: String,
    pub publisher: String,
    pub language: String,
    pub locale: String,

    // URL
    pub url: String,
    pub og_image: String,
    pub twitter_handle: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Content store
    #[serde(default)]
    pub store: StoreConfig,

    // Rendering
    pub theme: Theme,
    pub revalidate_secs: u64,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Pikëmbipresje Blog".to_string(),
            description: "Pikëmbipresje është një blog modern shqiptar që sjell lajme, opinione, analiza dhe ide të reja.".to_string(),
            keywords: vec![
                "Pikëmbipresje".to_string(),
                "blog".to_string(),
                "lajme".to_string(),
                "opinione".to_string(),
            ],
            author: "Pikëmbipresje Team".to_string(),
            creator: String::new(),
            publisher: "Pikëmbipresje".to_string(),
            language: "sq".to_string(),
            locale: "sq_AL".to_string(),

            url: "https://blog.pikembipresje.com".to_string(),
            og_image: "/og-image.jpg".to_string(),
            twitter_handle: "@pikembipresje".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            store: StoreConfig::default(),

            theme: Theme::default(),
            revalidate_secs: 60,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PRESJE_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using the given lookup function
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup("PRESJE_PROJECT_ID") {
            self.store.project_id = project_id;
        }
        if let Some(dataset) = lookup("PRESJE_DATASET") {
            self.store.dataset = dataset;
        }
        if let Some(token) = lookup("PRESJE_API_TOKEN").filter(|t| !t.is_empty()) {
            self.store.token = Some(token);
        }
        if let Some(url) = lookup("PRESJE_SITE_URL") {
            self.url = url;
        }
    }

    /// Check the fields the content store client cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.store.project_id.trim().is_empty() {
            anyhow::bail!("store.project_id must not be empty");
        }
        if self.store.dataset.trim().is_empty() {
            anyhow::bail!("store.dataset must not be empty");
        }
        let version = self.store.api_version.trim_start_matches('v');
        if version != "1" && chrono::NaiveDate::parse_from_str(version, "%Y-%m-%d").is_err() {
            anyhow::bail!(
                "store.api_version must be \"1\" or a YYYY-MM-DD date, got {:?}",
                self.store.api_version
            );
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            anyhow::bail!("url must be an absolute http(s) origin, got {:?}", self.url);
        }
        Ok(())
    }

    /// Site origin without a trailing slash
    pub fn origin(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Format a page title using the site title template
    pub fn page_title(&self, title: &str) -> String {
        if title.is_empty() {
            self.title.clone()
        } else {
            format!("{} | {}", title, self.title)
        }
    }
}

/// Content store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    /// Serve queries from the edge cache instead of the live API
    pub use_cdn: bool,
    /// Optional read token for private datasets
    pub token: Option<String>,
    /// Override for the API host, e.g. a proxy or a local mock
    pub api_host: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: "yw6b68x6".to_string(),
            dataset: "production".to_string(),
            api_version: "2025-01-01".to_string(),
            use_cdn: false,
            token: None,
            api_host: None,
        }
    }
}
