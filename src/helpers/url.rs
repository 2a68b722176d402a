//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters `encodeURIComponent` leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Path-segment encoding; keeps the characters slugs are made of
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encode a query-string component
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Site-relative path of a post page
///
/// # Examples
/// ```ignore
/// post_path("hello-world") // -> "/post/hello-world"
/// ```
pub fn post_path(slug: &str) -> String {
    format!("/post/{}", utf8_percent_encode(slug, SEGMENT))
}

/// Canonical absolute URL of a post: `<origin>/post/<slug>`
pub fn canonical_post_url(origin: &str, slug: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), post_path(slug))
}

/// Generate a full URL including the site origin
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/og-image.jpg") // -> "https://blog.example.com/og-image.jpg"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", config.origin(), path.trim_start_matches('/'))
}

/// In-page anchor for a category filter
pub fn category_anchor(title: &str) -> String {
    format!("#{}", slug::slugify(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_post_url() {
        assert_eq!(
            canonical_post_url("https://blog.example.com/", "s1"),
            "https://blog.example.com/post/s1"
        );
        assert_eq!(post_path("a b/c"), "/post/a%20b%2Fc");
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(
            encode_component("https://x.com/post/a?b=1"),
            "https%3A%2F%2Fx.com%2Fpost%2Fa%3Fb%3D1"
        );
        assert_eq!(encode_component("Lajme & më shumë"), "Lajme%20%26%20m%C3%AB%20shum%C3%AB");
    }

    #[test]
    fn test_full_url_for() {
        let config = SiteConfig::default();
        assert_eq!(
            full_url_for(&config, "/og-image.jpg"),
            "https://blog.pikembipresje.com/og-image.jpg"
        );
        assert_eq!(full_url_for(&config, "https://cdn/x.png"), "https://cdn/x.png");
    }

    #[test]
    fn test_category_anchor() {
        assert_eq!(category_anchor("Politikë Ditore"), "#politike-ditore");
    }
}
