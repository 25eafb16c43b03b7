// Asset cache domain model - requests, response snapshots and routing policy
use axum::http::Uri;
use bytes::Bytes;

/// Placeholder replaced by the deployed build identifier
pub const BUILD_NUMBER_PLACEHOLDER: &str = "%%BUILD_NUMBER%%";

/// Name of the cache generation for a build, e.g. `vejr-142`
pub fn generation_name(template: &str, build_number: &str) -> String {
    template.replace(BUILD_NUMBER_PLACEHOLDER, build_number)
}

/// What the page intends to do with a fetched resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
    /// Top-level HTML navigation
    Document,
    Style,
    Image,
    Font,
    Script,
    Manifest,
    Other,
}

impl RequestDestination {
    pub fn parse(value: &str) -> Self {
        match value {
            "document" => RequestDestination::Document,
            "style" => RequestDestination::Style,
            "image" => RequestDestination::Image,
            "font" => RequestDestination::Font,
            "script" => RequestDestination::Script,
            "manifest" => RequestDestination::Manifest,
            _ => RequestDestination::Other,
        }
    }
}

/// An outbound GET request seen by the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub uri: Uri,
    pub destination: RequestDestination,
}

impl AssetRequest {
    pub fn new(uri: Uri, destination: RequestDestination) -> Self {
        Self { uri, destination }
    }

    /// Cache key; one entry per absolute URL
    pub fn key(&self) -> String {
        self.uri.to_string()
    }

    pub fn hostname(&self) -> &str {
        self.uri.host().unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }
}

/// Stored copy of a network response.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePolicy {
    /// Live data: network only, cache never touched
    NetworkOnly,
    /// HTML: network, cache as offline fallback
    NetworkFirst,
    /// Static assets: cache, populated from network on miss
    CacheFirst,
}

impl RoutePolicy {
    /// Rules apply in order: live-data hosts, then HTML, then everything else
    pub fn for_request(request: &AssetRequest, live_hosts: &[String]) -> Self {
        let host = request.hostname();
        if live_hosts.iter().any(|live| host.contains(live.as_str())) {
            RoutePolicy::NetworkOnly
        } else if request.destination == RequestDestination::Document
            || request.path().ends_with(".html")
        {
            RoutePolicy::NetworkFirst
        } else {
            RoutePolicy::CacheFirst
        }
    }
}
