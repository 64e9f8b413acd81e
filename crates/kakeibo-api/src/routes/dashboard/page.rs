//! Dashboard page rendering - Full page endpoints

use crate::AppState;
use axum::extract::State;
use kakeibo_core::SeriesKind;
use kakeibo_utils::{format_number, sanitize_html};
use serde::Serialize;

/// Chart region markup; Plotly draws into it once HTMX swaps it in
///
/// A figure that fails to serialize leaves the region empty.
pub fn render_chart<T: Serialize>(figure: &T) -> String {
    let figure = match serde_json::to_string(figure) {
        // `</` would close the script element early
        Ok(json) => json.replace("</", "<\\/"),
        Err(e) => {
            log::error!("Failed to serialize chart figure: {}", e);
            return String::new();
        }
    };
    format!(
        r#"<div id='chart-plot' class='bg-white rounded-xl shadow-sm p-4' style='height: 520px;'></div>
<script>
    (function() {{
        const figure = {};
        Plotly.newPlot('chart-plot', figure.data, figure.layout, {{ responsive: true }});
    }})();
</script>"#,
        figure
    )
}

fn series_selector() -> String {
    let options: String = SeriesKind::ALL
        .iter()
        .map(|kind| format!(r#"<option value='{0}'>{0}</option>"#, kind.label()))
        .collect();
    format!(
        r#"<select id='series-select' name='series' multiple size='7'
        class='w-1/2 border rounded-lg p-2 bg-white'
        hx-get='/chart' hx-trigger='change' hx-target='#chart-region' hx-swap='innerHTML'>
        {}
    </select>"#,
        options
    )
}

pub async fn page_dashboard(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let dashboard = state.dashboard.read().await;
    let table = dashboard.table();
    let year_month = dashboard.year_month();

    let settings = dashboard.settings();
    let closing_balance = table
        .rows
        .last()
        .map(|r| {
            format!(
                "{}{}{}",
                settings.tick_prefix,
                format_number(r.balance.round_dp(2).normalize()),
                settings.tick_suffix
            )
        })
        .unwrap_or_else(|| "-".to_string());

    let inner_content = format!(
        r#"<div class='mb-6'>
            <h2 class='text-2xl font-bold'>口座管理ダッシュボード</h2>
            <p class='text-gray-600 mt-1'>ここでは {}年{}月 の入出金から口座管理ダッシュボードを表示します。</p>
        </div>
        <div class='grid grid-cols-2 gap-4 mb-6 w-1/2'>
            <div class='bg-white p-4 rounded-lg border'><p class='text-sm text-gray-500'>日数</p><p class='text-xl font-bold'>{}</p></div>
            <div class='bg-white p-4 rounded-lg border'><p class='text-sm text-gray-500'>月末残高</p><p class='text-xl font-bold text-indigo-600'>{}</p></div>
        </div>
        <div class='mb-4'>
            <p class='text-sm text-gray-500 mb-1'>表示する系列 (複数選択可)</p>
            {}
        </div>
        <div id='chart-region'></div>"#,
        year_month.year(),
        year_month.month(),
        table.len(),
        sanitize_html(&closing_balance),
        series_selector()
    );

    axum::response::Html(crate::page_response(
        &headers,
        "ダッシュボード",
        "/",
        &inner_content,
    ))
}
