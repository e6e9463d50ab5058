// Breach backend HTTP client
//
// Wraps `reqwest::Client` with URL construction under `/api/`, status
// handling, and body-preview diagnostics. The backend speaks plain JSON
// without an envelope, so responses deserialize straight into the wire
// models.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{SearchParams, SearchResponse, StatisticsResponse};
use crate::transport::TransportConfig;

/// Longest slice of a response body carried into an error message.
const PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the breach-monitoring backend.
///
/// Cheap to clone: `reqwest::Client` is reference-counted internally.
#[derive(Debug, Clone)]
pub struct BreachClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BreachClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://localhost:5000`); API
    /// paths are appended beneath `/api/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client from a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /api/search` with the query, page, facets and exclusions
    /// encoded as repeated query-string pairs.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, Error> {
        let mut url = self.api_url("search")?;
        url.query_pairs_mut().extend_pairs(params.to_query_pairs());
        self.get_json(url).await
    }

    /// `GET /api/statistics`.
    pub async fn statistics(&self) -> Result<StatisticsResponse, Error> {
        let url = self.api_url("statistics")?;
        self.get_json(url).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(bytes = body.len(), "response body received");

        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body,
            }),
        }
    }
}

/// First `PREVIEW_CHARS` characters of `body`, cut on a char boundary.
fn preview(body: &str) -> &str {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
