//! Outbound share links

use serde::Serialize;

use crate::helpers::encode_component;

/// Share URLs for the supported networks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub facebook: String,
    pub twitter: String,
    pub linkedin: String,
}

impl ShareLinks {
    /// Build share links for a page URL and title
    pub fn new(url: &str, title: &str) -> Self {
        let url = encode_component(url);
        Self {
            facebook: format!("https://www.facebook.com/sharer/sharer.php?u={}", url),
            twitter: format!(
                "https://twitter.com/intent/tweet?text={}&url={}",
                encode_component(title),
                url
            ),
            linkedin: format!("https://www.linkedin.com/sharing/share-offsite/?url={}", url),
        }
    }
}
