use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use log::debug;

use crate::dataset::Registry;
use crate::resource::{Content, Resource};

impl IntoResponse for crate::Error {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            log::warn!("request failed: {self}");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, self.to_string()).into_response()
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render a directory listing as a page of relative links.
fn render_listing(entries: &[String]) -> Html<String> {
    let mut page = String::from("<!DOCTYPE html>\n<html>\n<body>\n<ul>\n");
    for entry in entries {
        let entry = escape_html(entry);
        page.push_str(&format!("<li><a href=\"{entry}\">{entry}</a></li>\n"));
    }
    page.push_str("</ul>\n</body>\n</html>\n");
    Html(page)
}

impl IntoResponse for Content {
    fn into_response(self) -> Response {
        match self {
            Content::Listing(entries) => render_listing(&entries).into_response(),
            Content::Json(bytes) => {
                ([(header::CONTENT_TYPE, "application/json")], bytes).into_response()
            }
            Content::Chunk(bytes) => {
                ([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response()
            }
        }
    }
}

async fn index(State(registry): State<Arc<Registry>>) -> Response {
    render_listing(&registry.list_root()).into_response()
}

async fn resource(
    State(registry): State<Arc<Registry>>,
    uri: Uri,
) -> Result<Content, crate::Error> {
    let resource = Resource::parse(uri.path())
        .ok_or_else(|| crate::Error::NotFound(uri.path().to_string()))?;
    if let Resource::Chunk { .. } = resource {
        // chunk reads may block on the backend
        tokio::task::spawn_blocking(move || registry.fetch(&resource))
            .await
            .map_err(crate::Error::wrap)?
    } else {
        registry.fetch(&resource)
    }
}

async fn log_timing(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    debug!(
        "{method} {path} {} {:.2}ms",
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    response
}

/// Build the router serving `registry`.
pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/*path", get(resource))
        .layer(middleware::from_fn(log_timing))
        .with_state(registry)
}
