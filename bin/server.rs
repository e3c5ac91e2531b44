// Portfolio Filter - Web Server
// REST API with Axum; each request is one "category chosen" event

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use portfolio_filter::{init_tracing, Category, CategoryButton, SharedFilter, SourceArgs};
use serde::Serialize;
use std::path::PathBuf;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "portfolio-server", version, about = "Serve the portfolio filter over HTTP")]
struct ServerArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Address to listen on
    #[arg(long, env = "PORTFOLIO_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// Directory served under /static
    #[arg(long, env = "PORTFOLIO_WEB_DIR", default_value = "web")]
    web_dir: PathBuf,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    filter: SharedFilter,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    generated_at: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
            generated_at: Utc::now(),
        }
    }
}

/// Buttons plus the tags actually present on cards
#[derive(Serialize)]
struct CategoriesResponse {
    buttons: Vec<CategoryButton>,
    tags: Vec<Category>,
}

/// Path segment → category; "all" is accepted as a URL-friendly wildcard
///
/// `Path` has already percent-decoded the segment; it is used as given.
fn category_from_path(segment: &str) -> Category {
    if segment.eq_ignore_ascii_case("all") {
        Category::Wildcard
    } else {
        Category::parse(segment)
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/portfolio - Current filter state
async fn get_portfolio(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::ok(state.filter.snapshot())))
}

/// GET /api/categories - Buttons and card tags
async fn get_categories(State(state): State<AppState>) -> impl IntoResponse {
    let response = state.filter.with(|c| CategoriesResponse {
        buttons: c.buttons().to_vec(),
        tags: c.categories(),
    });
    (StatusCode::OK, Json(ApiResponse::ok(response)))
}

/// GET /api/filters/:category - Select a category
async fn select_filter(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    let category = category_from_path(&category);
    let snapshot = state.filter.select(category);
    (StatusCode::OK, Json(ApiResponse::ok(snapshot)))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn router(state: AppState, web_dir: PathBuf) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/portfolio", get(get_portfolio))
        .route("/categories", get(get_categories))
        .route("/filters/:category", get(select_filter))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(web_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    init_tracing("info,tower_http=debug");
    let args = ServerArgs::parse();

    info!("🌐 Portfolio Filter - Web Server");

    // Initialization may sleep between retries; keep it off the runtime threads
    let source = args.source.clone();
    let controller = match tokio::task::spawn_blocking(move || source.load_controller()).await {
        Ok(Ok(controller)) => controller,
        Ok(Err(e)) => {
            error!("❌ Could not load portfolio {:?}: {:#}", args.source.portfolio, e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("❌ Portfolio loader panicked: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        cards = controller.cards().len(),
        buttons = controller.buttons().len(),
        "✓ Portfolio loaded: {:?}",
        args.source.portfolio
    );

    let state = AppState {
        filter: SharedFilter::new(controller),
    };
    let app = router(state, args.web_dir);

    let listener = match tokio::net::TcpListener::bind(&args.bind).await {
        Ok(l) => l,
        Err(e) => {
            error!("❌ Failed to bind to {}: {}", args.bind, e);
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://{}", args.bind);
    info!("   API: http://{}/api/portfolio", args.bind);

    if let Err(e) = axum::serve(listener, app).await {
        error!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use portfolio_filter::{Card, FilterController};
    use tower::ServiceExt;

    fn state() -> AppState {
        let buttons = vec![
            CategoryButton::wildcard("All"),
            CategoryButton::new("Web", Category::tag("web")),
            CategoryButton::new("App", Category::tag("app")),
        ];
        let cards = vec![
            Card::new("1", "Web Shop", ["web"]),
            Card::new("2", "Mobile App", ["app"]),
            Card::new("3", "Web + App", ["web", "app"]),
        ];
        AppState {
            filter: SharedFilter::new(FilterController::new(buttons, cards)),
        }
    }

    async fn get_json(app: Router, uri: &str) -> serde_json::Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_category_from_path() {
        assert_eq!(category_from_path("all"), Category::Wildcard);
        assert_eq!(category_from_path("ALL"), Category::Wildcard);
        assert_eq!(category_from_path("*"), Category::Wildcard);
        assert_eq!(category_from_path(".web"), Category::tag("web"));
        assert_eq!(category_from_path("case study"), Category::tag("case study"));
        // Already decoded: a literal '%' stays
        assert_eq!(category_from_path(".100%41"), Category::tag("100%41"));
    }

    #[tokio::test]
    async fn test_percent_tag_round_trips_from_encoded_url() {
        let buttons = vec![
            CategoryButton::wildcard("All"),
            CategoryButton::new("Odd", Category::tag("100%41")),
        ];
        let cards = vec![
            Card::new("1", "Odd One", ["100%41"]),
            Card::new("2", "Plain", ["web"]),
        ];
        let state = AppState {
            filter: SharedFilter::new(FilterController::new(buttons, cards)),
        };
        let app = router(state, PathBuf::from("web"));

        // What the page sends for encodeURIComponent(".100%41")
        let body = get_json(app, "/api/filters/.100%2541").await;
        assert_eq!(body["data"]["active"], ".100%41");
        assert_eq!(body["data"]["visible_count"], 1);
        assert_eq!(body["data"]["buttons"][1]["selected"], true);
    }

    #[tokio::test]
    async fn test_encoded_wildcard_selects_all() {
        let app = router(state(), PathBuf::from("web"));
        let body = get_json(app, "/api/filters/%2A").await;
        assert_eq!(body["data"]["active"], "*");
        assert_eq!(body["data"]["visible_count"], 3);
    }

    #[tokio::test]
    async fn test_select_filter_endpoint() {
        let state = state();
        let app = router(state.clone(), PathBuf::from("web"));

        let body = get_json(app, "/api/filters/web").await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["active"], ".web");
        assert_eq!(body["data"]["visible_count"], 2);
        assert!(body["generated_at"].is_string());

        // The selection persists in shared state
        let app = router(state, PathBuf::from("web"));
        let body = get_json(app, "/api/portfolio").await;
        assert_eq!(body["data"]["buttons"][1]["selected"], true);
        assert_eq!(body["data"]["cards"][1]["visible"], false);
    }

    #[tokio::test]
    async fn test_categories_endpoint() {
        let app = router(state(), PathBuf::from("web"));
        let body = get_json(app, "/api/categories").await;

        assert_eq!(body["data"]["buttons"][0]["filter"], "*");
        assert_eq!(body["data"]["tags"], serde_json::json!([".web", ".app"]));
    }
}
