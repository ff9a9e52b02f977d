use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use std::sync::Arc;

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");
const SUBSCRIBE_HTML: &str = include_str!("../../../assets/subscribe.html");
const CSRF_PLACEHOLDER: &str = "{{ csrf_token }}";

/// Landing page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Subscription form, with a freshly issued anti-forgery token.
pub async fn subscribe(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let token = state
        .csrf
        .as_ref()
        .map(|guard| guard.issue(Utc::now()))
        .unwrap_or_default();

    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(SUBSCRIBE_HTML.replace(CSRF_PLACEHOLDER, &token)),
    )
}
