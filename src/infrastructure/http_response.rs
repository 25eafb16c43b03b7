// HTTP response utilities for icons and cached assets
use crate::domain::cache::CachedResponse;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Response, StatusCode, header},
};
use tokio::io::AsyncReadExt;

/// Hop-by-hop or recomputed headers that must not be replayed from a snapshot
const SKIPPED_HEADERS: [&str; 4] = ["connection", "content-length", "keep-alive", "transfer-encoding"];

/// SVG document response, Brotli-compressed when the client accepts it
pub async fn svg_response(svg: String, compress: bool) -> Result<Response<Body>, StatusCode> {
    let raw = svg.into_bytes();

    let (body_bytes, content_encoding) = if compress {
        let original_len = raw.len();
        let mut encoder = BrotliEncoder::new(std::io::Cursor::new(raw));
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::debug!("Compressed SVG: {} -> {} bytes", original_len, compressed.len());
        (compressed, Some("br"))
    } else {
        (raw, None)
    };

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/svg+xml")
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .header(header::VARY, "accept-encoding")
        .header(header::CONTENT_LENGTH, body_bytes.len());

    if let Some(encoding) = content_encoding {
        response_builder = response_builder.header(header::CONTENT_ENCODING, encoding);
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Replay a cached or freshly fetched response to the client
pub fn snapshot_response(snapshot: CachedResponse) -> Response<Body> {
    let status = StatusCode::from_u16(snapshot.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::new(Body::from(snapshot.body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in &snapshot.headers {
        if SKIPPED_HEADERS.iter().any(|skip| name.eq_ignore_ascii_case(skip)) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }
    response
}

/// Whether the request's `Accept-Encoding` allows Brotli
pub fn accepts_brotli(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_svg_response_uncompressed() {
        let response = svg_response("<svg/>".to_string(), false).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, Bytes::from_static(b"<svg/>"));
    }

    #[tokio::test]
    async fn test_svg_response_brotli() {
        let svg = "<svg>".to_string() + &"<path d=\"M0 0\"/>".repeat(50) + "</svg>";
        let response = svg_response(svg.clone(), true).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "br");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.len() < svg.len());
    }

    #[tokio::test]
    async fn test_snapshot_response_replays_headers() {
        let snapshot = CachedResponse::new(
            200,
            vec![
                ("content-type".into(), "image/png".into()),
                ("transfer-encoding".into(), "chunked".into()),
            ],
            Bytes::from_static(b"png"),
        );
        let response = snapshot_response(snapshot);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert!(response.headers().get(header::TRANSFER_ENCODING).is_none());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, Bytes::from_static(b"png"));
    }

    #[test]
    fn test_accepts_brotli() {
        let mut headers = axum::http::HeaderMap::new();
        assert!(!accepts_brotli(&headers));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, br"));
        assert!(accepts_brotli(&headers));
    }
}
