//! Settings API endpoints - JSON API

use crate::AppState;
use axum::extract::State;
use axum::Json;
use kakeibo_config::Config;

pub async fn api_settings(State(state): State<AppState>) -> Json<Config> {
    Json(state.config.clone())
}

#[cfg(test)]
mod tests {
    use crate::create_router;
    use crate::test_support::{get, state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_api_settings_returns_config() {
        let (state, _) = state();
        let (status, body) = get(create_router(state), "/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["cashtrade"]["file_path"], "raw");
        assert_eq!(json["cashtrade"]["skip_rows"], 7);
        assert_eq!(json["server"]["port"], 8050);
        assert_eq!(json["dashboard"]["unit_divisor"], 10000);
    }
}
