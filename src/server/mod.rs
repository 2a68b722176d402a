//! HTTP server rendering pages on request

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::RevalidationCache;
use crate::config::SiteConfig;
use crate::generator::Generator;
use crate::helpers::post_path;
use crate::loader::{self, Listing, LoadError, PostPage};
use crate::share::script::{SHARE_SCRIPT, SHARE_SCRIPT_PATH};
use crate::store::ContentStore;
use crate::theme::Theme;
use crate::Blog;

/// Shared, read-only request state plus the revalidation caches
pub struct AppState {
    config: Arc<SiteConfig>,
    store: Arc<dyn ContentStore>,
    generator: Generator,
    static_dir: PathBuf,
    listings: RevalidationCache<Listing>,
    posts: RevalidationCache<PostPage>,
}

impl AppState {
    pub fn new(
        config: Arc<SiteConfig>,
        store: Arc<dyn ContentStore>,
        static_dir: PathBuf,
    ) -> Result<Self> {
        let generator = Generator::new(Arc::clone(&config))?;
        Ok(Self {
            listings: RevalidationCache::from_secs(config.revalidate_secs),
            posts: RevalidationCache::from_secs(config.revalidate_secs),
            config,
            store,
            generator,
            static_dir,
        })
    }

    /// Theme requested by `?theme=`, falling back to the configured one
    ///
    /// A query string that does not deserialize (e.g. a repeated `theme`)
    /// is treated like no query at all.
    fn theme(&self, query: Option<&ThemeQuery>) -> Theme {
        match query
            .and_then(|q| q.theme.as_deref())
            .map(str::parse::<Theme>)
        {
            Some(Ok(theme)) => theme,
            Some(Err(e)) => {
                tracing::debug!("{}", e);
                self.config.theme
            }
            None => self.config.theme,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ThemeQuery {
    theme: Option<String>,
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(listing_handler))
        .route("/post", get(missing_slug_handler))
        .route("/post/", get(missing_slug_handler))
        .route("/post/:slug", get(post_handler))
        .route(SHARE_SCRIPT_PATH, get(share_script_handler))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let state = Arc::new(AppState::new(
        Arc::new(blog.config.clone()),
        blog.store(),
        blog.static_dir.clone(),
    )?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if blog.config.revalidate_secs > 0 {
        println!(
            "Pages are revalidated every {}s.",
            blog.config.revalidate_secs
        );
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn listing_handler(
    State(state): State<Arc<AppState>>,
    query: Option<Query<ThemeQuery>>,
) -> Response {
    let theme = state.theme(query.as_deref());
    let all_label = state.generator.i18n().get("listing.all");

    let loaded = state
        .listings
        .get_or_try_load("/", || loader::load_listing(state.store.as_ref(), &all_label))
        .await;

    match loaded {
        Ok(listing) => page_response(StatusCode::OK, state.generator.render_listing(&listing, theme)),
        Err(e) => error_response(&state, &e, theme),
    }
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    query: Option<Query<ThemeQuery>>,
) -> Response {
    let theme = state.theme(query.as_deref());

    let loaded = state
        .posts
        .get_or_try_load(&post_path(&slug), || {
            loader::load_post(state.store.as_ref(), Some(&slug))
        })
        .await;

    match loaded {
        Ok(page) => page_response(StatusCode::OK, state.generator.render_post(&page, theme)),
        Err(e) => error_response(&state, &e, theme),
    }
}

async fn missing_slug_handler(
    State(state): State<Arc<AppState>>,
    query: Option<Query<ThemeQuery>>,
) -> Response {
    let theme = state.theme(query.as_deref());
    match loader::load_post(state.store.as_ref(), None).await {
        Ok(page) => page_response(StatusCode::OK, state.generator.render_post(&page, theme)),
        Err(e) => error_response(&state, &e, theme),
    }
}

async fn share_script_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SHARE_SCRIPT,
    )
}

/// Serve files from the static directory
async fn static_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.static_dir);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// HTTP status for a loader error
pub fn status_for(error: &LoadError) -> StatusCode {
    match error {
        LoadError::MissingParameter => StatusCode::BAD_REQUEST,
        LoadError::NotFound { .. } => StatusCode::NOT_FOUND,
        LoadError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(state: &AppState, error: &LoadError, theme: Theme) -> Response {
    let status = status_for(error);
    match error {
        LoadError::Upstream(e) => tracing::error!("Content store failure: {}", e),
        other => tracing::debug!("{}", other),
    }
    page_response(status, state.generator.render_error(error, theme))
}

fn page_response(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{full_post, summary, FakeStore};
    use crate::store::queries;
    use axum::body::to_bytes;
    use serde_json::json;
    use tower::ServiceExt;

    fn app_with(store: Arc<FakeStore>, revalidate_secs: u64) -> Router {
        let config = SiteConfig {
            revalidate_secs,
            ..SiteConfig::default()
        };
        let state = AppState::new(
            Arc::new(config),
            store,
            PathBuf::from("/nonexistent-static-dir"),
        )
        .unwrap();
        router(Arc::new(state))
    }

    fn store() -> Arc<FakeStore> {
        Arc::new(FakeStore {
            listing: json!([summary("s1", Some("Sport")), summary("s2", Some("Sport"))]),
            post: full_post("s1", Some("Sport")),
            related: json!([summary("s2", Some("Sport"))]),
            ..Default::default()
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_listing_route() {
        let (status, body) = get(app_with(store(), 60), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Title s1"));
        assert!(body.contains("Të Gjitha"));
    }

    #[tokio::test]
    async fn test_post_route() {
        let store = store();
        let (status, body) = get(app_with(store.clone(), 60), "/post/s1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Body text"));
        assert!(body.contains(r#"href="/post/s2""#));
        assert_eq!(
            store.calls_to(queries::POST_BY_SLUG)[0].get_str("slug"),
            Some("s1")
        );
    }

    #[tokio::test]
    async fn test_missing_slug_is_400() {
        for uri in ["/post", "/post/"] {
            let (status, body) = get(app_with(store(), 60), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body.contains("Mungon parametri"));
        }
    }

    #[tokio::test]
    async fn test_unknown_slug_is_404() {
        let (status, body) = get(app_with(Arc::new(FakeStore::default()), 60), "/post/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<b>nope</b>"));
    }

    #[tokio::test]
    async fn test_store_failure_is_502() {
        let store = Arc::new(FakeStore {
            fail: true,
            ..Default::default()
        });
        let (status, _) = get(app_with(store.clone(), 60), "/").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let (status, _) = get(app_with(store, 60), "/post/s1").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_theme_query() {
        let (_, body) = get(app_with(store(), 60), "/?theme=paper").await;
        assert!(body.contains(r#"data-theme="paper""#));

        let (status, body) = get(app_with(store(), 60), "/?theme=neon").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"data-theme="aurora""#));
    }

    #[tokio::test]
    async fn test_repeated_theme_query_falls_back() {
        for uri in ["/?theme=paper&theme=aurora", "/post/s1?theme=paper&theme=paper"] {
            let (status, body) = get(app_with(store(), 60), uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert!(body.contains(r#"data-theme="aurora""#), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_malformed_date_does_not_break_listing() {
        let mut bad = summary("bad", Some("Sport"));
        bad["publishedAt"] = json!(1700000000);
        let store = Arc::new(FakeStore {
            listing: json!([summary("s1", Some("Sport")), bad]),
            ..Default::default()
        });

        let (status, body) = get(app_with(store, 60), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Title bad"));
    }

    #[tokio::test]
    async fn test_share_script_route() {
        let response = app_with(store(), 60)
            .oneshot(
                Request::builder()
                    .uri("/assets/share.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (status, _) = get(app_with(store(), 60), "/nothing/here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_revalidation_cache() {
        let store = store();
        let app = app_with(store.clone(), 60);
        get(app.clone(), "/").await;
        get(app, "/").await;
        assert_eq!(store.calls_to(queries::LISTING).len(), 1);

        let store = self::store();
        let app = app_with(store.clone(), 0);
        get(app.clone(), "/").await;
        get(app, "/").await;
        assert_eq!(store.calls_to(queries::LISTING).len(), 2);
    }
}
