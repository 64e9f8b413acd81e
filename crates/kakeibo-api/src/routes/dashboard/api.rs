//! Dashboard API endpoints - JSON API and HTMX partial responses

use crate::{ApiError, AppState};
use axum::extract::{RawQuery, State};
use axum::response::Html;
use axum::Json;
use kakeibo_core::{ChartSpec, DashboardRow, SeriesKind};
use serde::Serialize;

/// Selector option
#[derive(Debug, Serialize)]
pub struct SeriesOption {
    pub label: &'static str,
    pub key: &'static str,
}

/// Collect every `series` value of a query string, in order.
///
/// `series=残高&series=収入` is how both the HTMX form and API clients send
/// a multi-selection, so a plain map extractor would lose all but one.
pub fn series_params(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    raw.split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| *key == "series")
        .filter_map(|(_, value)| {
            let value = value.replace('+', " ");
            urlencoding::decode(&value).ok().map(|v| v.into_owned())
        })
        .filter(|v| !v.trim().is_empty())
        .collect()
}

fn selection(raw: Option<String>) -> Vec<SeriesKind> {
    SeriesKind::parse_selection(&series_params(raw.as_deref()))
}

pub async fn api_series() -> Json<Vec<SeriesOption>> {
    Json(
        SeriesKind::ALL
            .iter()
            .map(|kind| SeriesOption {
                label: kind.label(),
                key: kind.key(),
            })
            .collect(),
    )
}

/// Chart figure for the selection, `null` when nothing valid is selected
pub async fn api_chart(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Json<Option<ChartSpec>> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.chart(&selection(query)))
}

pub async fn api_ledger(State(state): State<AppState>) -> Json<Vec<DashboardRow>> {
    let dashboard = state.dashboard.read().await;
    Json(dashboard.table().rows.clone())
}

/// Re-read the ledger file of the served month
pub async fn api_reload(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut dashboard = state.dashboard.write().await;
    dashboard.reload()?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "台帳を再読み込みしました",
        "days": dashboard.table().len(),
    })))
}

/// HTMX partial: chart region for the selection
pub async fn htmx_chart(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Html<String> {
    let dashboard = state.dashboard.read().await;
    match dashboard.chart(&selection(query)) {
        Some(spec) => Html(super::page::render_chart(&spec)),
        None => Html(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_router;
    use crate::test_support::{get, request, row, state};
    use axum::http::StatusCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_series_params() {
        assert!(series_params(None).is_empty());
        assert_eq!(
            series_params(Some("series=%E6%AE%8B%E9%AB%98&other=1&series=income")),
            vec!["残高", "income"]
        );
        assert_eq!(series_params(Some("series=&series=a+b")), vec!["a b"]);
    }

    #[tokio::test]
    async fn test_api_series_lists_all_seven() {
        let (state, _) = state();
        let (status, body) = get(create_router(state), "/api/series").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 7);
        assert_eq!(json[0]["label"], "残高");
        assert_eq!(json[6]["key"], "cumulative_net");
    }

    #[tokio::test]
    async fn test_api_chart_empty_selection_is_null() {
        let (state, _) = state();
        let (status, body) = get(create_router(state), "/api/chart").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "null");
    }

    #[tokio::test]
    async fn test_api_chart_ignores_unknown_series() {
        let (state, _) = state();
        let (_, body) = get(create_router(state), "/api/chart?series=bogus").await;
        assert_eq!(body, "null");
    }

    #[tokio::test]
    async fn test_api_chart_in_selection_order() {
        let (state, _) = state();
        let (_, body) = get(create_router(state), "/api/chart?series=expense&series=balance").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["data"][0]["name"], "支出");
        assert_eq!(json["data"][1]["name"], "残高");
        assert_eq!(json["data"][0]["y"][1], -2.0);
        assert_eq!(json["layout"]["title"]["text"], "残高の推移");
    }

    #[tokio::test]
    async fn test_api_ledger_rows() {
        let (state, _) = state();
        let (_, body) = get(create_router(state), "/api/ledger").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["date"], "2024-01-02");
        assert_eq!(rows[1]["balance"], 13.0);
        assert_eq!(rows[1]["cumulative_net"], 3.0);
    }

    #[tokio::test]
    async fn test_reload_picks_up_new_rows() {
        let (state, store) = state();
        let router = create_router(state);
        store
            .rows
            .lock()
            .unwrap()
            .push(row(3, dec!(0), dec!(10000), dec!(120000)));

        let (status, body) = request(router.clone(), "POST", "/api/reload").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"days\":3"));

        let (_, body) = get(router, "/api/ledger").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_current_table() {
        let (state, store) = state();
        let router = create_router(state);
        *store.fail_reads.lock().unwrap() = true;

        let (status, body) = request(router.clone(), "POST", "/api/reload").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("SOURCE_NOT_FOUND"));

        let (_, body) = get(router, "/api/ledger").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_htmx_chart_partial() {
        let (state, _) = state();
        let router = create_router(state);

        let (status, body) = get(router.clone(), "/chart").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let (_, body) = get(router, "/chart?series=%E5%8F%8E%E6%94%AF").await;
        assert!(body.contains("Plotly.newPlot"));
        assert!(body.contains("収支"));
    }
}
