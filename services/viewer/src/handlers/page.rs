//! HTML UI shell: the selection form and the result view.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Html,
};
use chrono::Utc;
use tracing::{info, instrument, warn};

use forecast_common::{ForecastCycle, Parameter, RunHour};

use super::common::{escape_html, status_for};
use crate::request::{PanelQuery, PanelRequest, MAX_LEAD_INDEX};
use crate::state::AppState;

pub const PAGE_TITLE: &str = "GFS Viewer Wilayah Barito Selatan";
pub const PAGE_SUBTITLE: &str = "Web Hasil Pembelajaran Pengelolaan Informasi Meteorologi";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #f5f7fa; color: #1a202c; }
header { background: linear-gradient(135deg, #1a365d 0%, #2d4a6f 100%); color: white; padding: 20px 40px; }
header h1 { margin: 0; font-size: 1.5rem; }
header .subtitle { opacity: 0.8; font-size: 0.9rem; margin-top: 4px; }
main { padding: 20px 40px; }
form { display: flex; flex-wrap: wrap; gap: 12px; align-items: end; }
label { display: flex; flex-direction: column; font-size: 0.85rem; gap: 4px; }
.status { margin: 16px 0; padding: 10px 14px; border-radius: 4px; }
.status.ok { background: #e6fffa; border: 1px solid #38b2ac; }
.status.error { background: #fff5f5; border: 1px solid #e53e3e; }
img.panel { max-width: 100%; border: 1px solid #cbd5e0; background: white; }
"#;

/// GET / - selection form
#[instrument(skip(state))]
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    state.metrics.record_page_request();
    let today = Utc::now().date_naive();
    let defaults = PanelRequest {
        cycle: ForecastCycle::new(today, RunHour::Z00),
        lead_index: 0,
        parameter: Parameter::PrecipitationRate,
    };
    Html(page(&form(&defaults), ""))
}

/// GET /view - run the render and show status, image and download link
#[instrument(skip(state))]
pub async fn view_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<PanelQuery>,
) -> (StatusCode, Html<String>) {
    state.metrics.record_page_request();

    let request = match query.parse() {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejected form input");
            let body = status_block(false, &e.user_message());
            return (status_for(&e), Html(page("", &body)));
        }
    };

    match state.render_panel(request).await {
        Ok(panel) => {
            info!(title = %panel.title, "Panel ready");
            let qs = request.query_string();
            let body = format!(
                r#"{status}
<p><img class="panel" src="/api/panel?{qs}" alt="{alt}"></p>
<p><a href="/api/panel?{qs}&amp;download=true" download="{file}">Unduh PNG ({file})</a></p>"#,
                status = status_block(true, &panel.status_message()),
                qs = escape_html(&qs),
                alt = escape_html(&panel.title),
                file = escape_html(&panel.download_filename()),
            );
            (StatusCode::OK, Html(page(&form(&request), &body)))
        }
        Err(e) => {
            warn!(error = %e, kind = e.kind(), "Render failed");
            let body = status_block(false, &e.user_message());
            (status_for(&e), Html(page(&form(&request), &body)))
        }
    }
}

fn status_block(ok: bool, message: &str) -> String {
    format!(
        r#"<div class="status {}">{}</div>"#,
        if ok { "ok" } else { "error" },
        escape_html(message)
    )
}

fn page(form: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<header><h1>{title}</h1><div class="subtitle">{subtitle}</div></header>
<main>
{form}
{body}
</main>
</body>
</html>"#,
        title = PAGE_TITLE,
        subtitle = PAGE_SUBTITLE,
        style = STYLE,
    )
}

fn form(selected: &PanelRequest) -> String {
    let hours: String = RunHour::all()
        .iter()
        .map(|h| option(&h.token(), &h.token(), *h == selected.cycle.hour))
        .collect();
    let parameters: String = Parameter::all()
        .iter()
        .map(|p| option(p.id(), p.display_name(), *p == selected.parameter))
        .collect();

    format!(
        r#"<form method="get" action="/view">
<label>Tanggal run<input type="date" name="date" value="{date}"></label>
<label>Jam run (UTC)<select name="hour">{hours}</select></label>
<label>Indeks lead<input type="number" name="lead" min="0" max="{max}" value="{lead}"></label>
<label>Parameter<select name="parameter">{parameters}</select></label>
<button type="submit">Tampilkan</button>
</form>"#,
        date = selected.cycle.date.format("%Y-%m-%d"),
        max = MAX_LEAD_INDEX,
        lead = selected.lead_index,
    )
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}
