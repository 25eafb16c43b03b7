// HTTP request handlers
use crate::application::asset_cache_router::RouterError;
use crate::application::icon_service::{DEFAULT_ICON_SIZE, Observation};
use crate::domain::cache::{AssetRequest, RequestDestination};
use crate::domain::icon::IconType;
use crate::infrastructure::http_response::{accepts_brotli, snapshot_response, svg_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct IconQuery {
    /// Local timestamp, `YYYY-MM-DDTHH:MM`
    pub time: Option<String>,
    /// Precipitation in mm for the interval
    pub rain: Option<f64>,
    pub size: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct IconTypeQuery {
    pub rain: Option<f64>,
    pub code: Option<u32>,
    pub size: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FetchQuery {
    pub url: String,
    pub destination: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Classify a WMO code (and optional time) and render the icon
pub async fn render_icon(
    Path(code): Path<u32>,
    Query(query): Query<IconQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let observation = Observation {
        code,
        time: query.time,
        precipitation: query.rain.unwrap_or(0.0),
    };
    let size = query.size.unwrap_or(DEFAULT_ICON_SIZE);
    let (icon, svg) = state.icon_service.render_observation(&observation, size);

    icon_response(icon, svg, accepts_brotli(&headers)).await
}

/// Render a named icon type directly
pub async fn render_icon_type(
    Path(name): Path<String>,
    Query(query): Query<IconTypeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let icon: IconType = match name.parse() {
        Ok(icon) => icon,
        Err(e) => return (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    };
    let svg = state.icon_service.render(
        icon,
        query.rain.unwrap_or(0.0),
        query.code,
        query.size.unwrap_or(DEFAULT_ICON_SIZE),
    );

    icon_response(icon, svg, accepts_brotli(&headers)).await
}

async fn icon_response(icon: IconType, svg: String, compress: bool) -> Response {
    match svg_response(svg, compress).await {
        Ok(mut response) => {
            response
                .headers_mut()
                .insert("x-icon-type", HeaderValue::from_static(icon.as_str()));
            response
        }
        Err(status) => status.into_response(),
    }
}

/// Cache generations and entries of the current one
pub async fn cache_summary(State(state): State<Arc<AppState>>) -> Response {
    match state.router.summary().await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            tracing::error!("Error reading cache summary: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Route an absolute URL on a manifest or live-data host, e.g. the font stylesheet
pub async fn fetch_url(
    Query(query): Query<FetchQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let uri: Uri = match query.url.parse() {
        Ok(uri) => uri,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid url").into_response(),
    };
    if uri.host().is_none() {
        return (StatusCode::BAD_REQUEST, "url must be absolute").into_response();
    }
    let destination = query
        .destination
        .as_deref()
        .map(RequestDestination::parse)
        .unwrap_or(RequestDestination::Other);

    route(&state, AssetRequest::new(uri, destination)).await
}

/// Everything else is a page or asset of the app origin
pub async fn intercept_origin(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    if method != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let target = match state.cache_settings.resolve(path) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!("Cannot resolve {}: {}", path, e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    route(&state, AssetRequest::new(target, request_destination(&headers))).await
}

/// `Sec-Fetch-Dest` when the browser sends it, else HTML navigations by `Accept`
fn request_destination(headers: &HeaderMap) -> RequestDestination {
    if let Some(dest) = headers.get("sec-fetch-dest").and_then(|v| v.to_str().ok()) {
        return RequestDestination::parse(dest);
    }
    let wants_html = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("text/html"))
        .unwrap_or(false);
    if wants_html {
        RequestDestination::Document
    } else {
        RequestDestination::Other
    }
}

async fn route(state: &AppState, request: AssetRequest) -> Response {
    match state.router.intercept(&request).await {
        Ok(snapshot) => snapshot_response(snapshot),
        Err(e @ RouterError::HostNotAllowed { .. }) => {
            (StatusCode::FORBIDDEN, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::warn!("Failed to serve {}: {}", request.uri, e);
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}
