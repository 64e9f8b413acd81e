//! HTTP dashboard server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::dashboard: Dashboard page, chart partial, ledger JSON
//! - routes::settings: Configuration display

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use kakeibo_config::Config;
use kakeibo_core::Dashboard;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<RwLock<Dashboard>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(RwLock::new(dashboard)),
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::dashboard::{
        api_chart, api_ledger, api_reload, api_series, htmx_chart, page_dashboard,
    };
    use routes::settings::{api_settings, page_settings};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/series", get(api_series))
        .route("/api/chart", get(api_chart))
        .route("/api/ledger", get(api_ledger))
        .route("/api/settings", get(api_settings))
        .route("/api/reload", post(api_reload))
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/settings", get(page_settings))
        // HTMX partial routes
        .route("/chart", get(htmx_chart))
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// JSON 404 for unknown paths
async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound {
        resource: uri.path().to_string(),
    }
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Kakeibo</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.plot.ly/plotly-2.27.0.min.js"></script>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css">
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        kakeibo_utils::sanitize_html(title),
        content
    )
}

/// Top navigation bar
pub fn nav_bar(current_path: &str) -> String {
    let links = [("/", "ダッシュボード"), ("/settings", "設定")];

    let mut nav = String::from(
        "<nav class='bg-white border-b'><div class='px-[10%] flex items-center gap-6 h-14'><span class='text-xl font-bold text-indigo-600'>Kakeibo</span>",
    );
    for (path, label) in &links {
        let active_class = if *path == current_path {
            "text-indigo-600 font-medium"
        } else {
            "text-gray-600 hover:text-gray-900"
        };
        nav.push_str(&format!(
            r#"<a href='{}' class='{}'>{}</a>"#,
            path, active_class, label
        ));
    }
    nav.push_str("</div></nav>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(
    headers: &axum::http::HeaderMap,
    title: &str,
    current_path: &str,
    inner_content: &str,
) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(
            title,
            &format!(
                r#"{}
<main class='mx-[10%] py-6'>{}</main>"#,
                nav_bar(current_path),
                inner_content
            ),
        )
    }
}

/// Start the HTTP server
///
/// Binds to `server.host:server.port` and serves until the process is
/// interrupted.
pub async fn start_server(config: Config, dashboard: Dashboard) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let year_month = dashboard.year_month();
    let router = create_router(AppState::new(config, dashboard));

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Kakeibo dashboard for {} on http://{}", year_month, addr);
    log::info!("Available routes: / (dashboard), /settings, /api/*");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ==================== Tests ====================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::NaiveDate;
    use kakeibo_store::{
        CashRecordStore, LedgerRow, RawTransactionRecord, StoreError, StoreResult, YearMonth,
    };
    use kakeibo_utils::RecordingEventLogger;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// In-memory ledger file
    pub struct FixedStore {
        pub rows: Mutex<Vec<LedgerRow>>,
        pub fail_reads: Mutex<bool>,
    }

    impl CashRecordStore for FixedStore {
        fn find_and_read(
            &self,
            _directory: &Path,
            _year_month: YearMonth,
        ) -> StoreResult<Vec<RawTransactionRecord>> {
            Ok(Vec::new())
        }

        fn write(
            &self,
            directory: &Path,
            _year_month: YearMonth,
            _rows: &[LedgerRow],
        ) -> StoreResult<PathBuf> {
            Ok(directory.to_path_buf())
        }

        fn read(&self, directory: &Path, _year_month: YearMonth) -> StoreResult<Vec<LedgerRow>> {
            if *self.fail_reads.lock().unwrap() {
                return Err(StoreError::SourceNotFound {
                    dir: directory.display().to_string(),
                });
            }
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    pub fn row(day: u32, income: Decimal, expense: Decimal, balance: Decimal) -> LedgerRow {
        LedgerRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            income,
            expense,
            trade_type: None,
            counterpart: None,
            balance,
            net: income - expense,
        }
    }

    pub fn config() -> Config {
        Config::from_yaml("cashtrade:\n  file_path: raw\ntmp:\n  file_path: tmp\n").unwrap()
    }

    pub fn state() -> (AppState, Arc<FixedStore>) {
        let store = Arc::new(FixedStore {
            rows: Mutex::new(vec![
                row(1, dec!(0), dec!(0), dec!(100000)),
                row(2, dec!(50000), dec!(20000), dec!(130000)),
            ]),
            fail_reads: Mutex::new(false),
        });
        let logger = Arc::new(RecordingEventLogger::new());
        let config = config();
        let dashboard =
            Dashboard::load(&config, store.clone(), logger, "202401".parse().unwrap()).unwrap();
        (AppState::new(config, dashboard), store)
    }

    pub async fn get(router: Router, uri: &str) -> (axum::http::StatusCode, String) {
        request(router, "GET", uri).await
    }

    pub async fn request(
        router: Router,
        method: &str,
        uri: &str,
    ) -> (axum::http::StatusCode, String) {
        use tower::ServiceExt;

        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{get, state};
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_check() {
        let (state, _) = state();
        let (status, body) = get(create_router(state), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (state, _) = state();
        let (status, body) = get(create_router(state), "/accounts").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Not found: /accounts");
    }

    #[test]
    fn test_page_response_full_and_partial() {
        let mut headers = axum::http::HeaderMap::new();
        let full = page_response(&headers, "ダッシュボード", "/", "<p>x</p>");
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.contains("plotly"));
        assert!(full.contains("htmx.org"));

        headers.insert("hx-request", "true".parse().unwrap());
        assert_eq!(page_response(&headers, "ダッシュボード", "/", "<p>x</p>"), "<p>x</p>");
    }
}
