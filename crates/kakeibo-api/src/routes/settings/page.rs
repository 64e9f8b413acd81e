//! Settings page rendering - Full page endpoints

use crate::AppState;
use axum::extract::State;
use kakeibo_utils::sanitize_html;

fn field(label: &str, value: &str) -> String {
    format!(
        r#"<div><p class='text-sm text-gray-500'>{}</p><p class='font-medium'>{}</p></div>"#,
        label,
        sanitize_html(value)
    )
}

pub async fn page_settings(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let config = &state.config;

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>設定</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>入出金明細</h3>
            <div class='grid grid-cols-3 gap-4'>{}{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>中間ファイル</h3>
            <div class='grid grid-cols-3 gap-4'>{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>サーバー</h3>
            <div class='grid grid-cols-3 gap-4'>{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>グラフ</h3>
            <div class='grid grid-cols-3 gap-4'>{}{}{}</div>
        </div>"#,
        field("ディレクトリ", &config.cashtrade.file_path.display().to_string()),
        field("読み飛ばす行数", &config.cashtrade.skip_rows.to_string()),
        field("文字コード", &config.cashtrade.encoding),
        field("ディレクトリ", &config.tmp.file_path.display().to_string()),
        field("文字コード", &config.tmp.encoding),
        field("ホスト", &config.server.host),
        field("ポート", &config.server.port.to_string()),
        field("タイトル", &config.dashboard.title),
        field("単位", &config.dashboard.unit_divisor.to_string()),
        field(
            "目盛り",
            &format!(
                "{}0{}",
                config.dashboard.tick_prefix, config.dashboard.tick_suffix
            )
        ),
    );

    axum::response::Html(crate::page_response(&headers, "設定", "/settings", &inner_content))
}

#[cfg(test)]
mod tests {
    use crate::create_router;
    use crate::test_support::{get, state};

    #[tokio::test]
    async fn test_settings_page_shows_paths() {
        let (state, _) = state();
        let (_, body) = get(create_router(state), "/settings").await;
        assert!(body.contains("<h2 class='text-2xl font-bold'>設定</h2>"));
        assert!(body.contains("shift_jis"));
        assert!(body.contains("¥0万"));
    }
}
