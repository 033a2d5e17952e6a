//! Planet Data API provider.
//!
//! Wraps the three read-only operations the gateway needs: quick-search,
//! item lookup, and tile download.
//!
//! # URL Patterns
//!
//! - Search: `POST {api_url}/quick-search`
//! - Scene: `GET {api_url}/item-types/{item_type}/items/{scene_id}`
//! - Tile: `GET {tiles_url}/{item_type}/{scene_id}/{z}/{x}/{y}.png`
//!
//! Every placeholder is percent-encoded as exactly one path segment.
//!
//! # Authentication
//!
//! Every request carries the API key as the basic-auth username with an
//! empty password.
//!
//! # Error Mapping
//!
//! | Operation | 200 | 404 | other status / transport / decode |
//! |-----------|-----|-----|-----------------------------------|
//! | search    | ok  | `Upstream` | `Upstream` |
//! | get_scene | ok  | `NotFound` | `Upstream` |
//! | fetch_tile| ok  | `Upstream` | `Upstream` |

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::geometry::Point;
use crate::provider::{
    HttpClient, HttpRequest, HttpResponse, ProviderError, SceneProvider, TileStream,
    UpstreamError,
};
use crate::scene::{Scene, SceneCollection};
use crate::search::{SearchCriteria, DEFAULT_ITEM_TYPE};

/// Default base URL of the Planet Data API.
pub const DEFAULT_API_URL: &str = "https://api.planet.com/data/v1";

/// Default base URL of the Planet tile service.
pub const DEFAULT_TILES_URL: &str = "https://tiles.planet.com/data/v1";

/// Upper bound on how much of an error body is copied into logs.
const ERROR_EXCERPT_BYTES: usize = 4096;

/// Base URLs and item type used to address the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetEndpoints {
    pub api_url: String,
    pub tiles_url: String,
    pub item_type: String,
}

impl Default for PlanetEndpoints {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            tiles_url: DEFAULT_TILES_URL.to_string(),
            item_type: DEFAULT_ITEM_TYPE.to_string(),
        }
    }
}

/// Planet Data API client.
///
/// Holds the API key and a reusable HTTP client; no state changes between
/// calls.
///
/// # Example
///
/// ```no_run
/// use scenegate::geometry::Point;
/// use scenegate::provider::{PlanetClient, ReqwestClient, SceneProvider};
///
/// let http_client = ReqwestClient::new().unwrap();
/// let client = PlanetClient::new(http_client, "YOUR_API_KEY");
/// let scenes = client.search(Point::new(12.34, 45.56), 14).unwrap();
/// println!("{} scenes", scenes.len());
/// ```
pub struct PlanetClient<C: HttpClient> {
    http_client: C,
    api_key: String,
    endpoints: PlanetEndpoints,
}

impl<C: HttpClient> PlanetClient<C> {
    /// Creates a client against the public Planet endpoints.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `api_key` - Planet API key, sent on every request
    pub fn new(http_client: C, api_key: impl Into<String>) -> Self {
        Self::with_endpoints(http_client, api_key, PlanetEndpoints::default())
    }

    /// Creates a client against custom endpoints.
    pub fn with_endpoints(
        http_client: C,
        api_key: impl Into<String>,
        endpoints: PlanetEndpoints,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            endpoints,
        }
    }

    /// Endpoints this client talks to.
    pub fn endpoints(&self) -> &PlanetEndpoints {
        &self.endpoints
    }

    fn build_search_url(&self) -> Result<String, UpstreamError> {
        endpoint_url(&self.endpoints.api_url, &["quick-search"])
    }

    fn build_scene_url(&self, scene_id: &str) -> Result<String, UpstreamError> {
        endpoint_url(
            &self.endpoints.api_url,
            &["item-types", &self.endpoints.item_type, "items", scene_id],
        )
    }

    fn build_tile_url(
        &self,
        scene_id: &str,
        x: u32,
        y: u32,
        z: u32,
    ) -> Result<String, UpstreamError> {
        endpoint_url(
            &self.endpoints.tiles_url,
            &[
                &self.endpoints.item_type,
                scene_id,
                &z.to_string(),
                &x.to_string(),
                &format!("{}.png", y),
            ],
        )
    }

    /// Logs an unexpected status with the start of the body and converts it.
    fn status_error(&self, response: HttpResponse) -> ProviderError {
        let status = response.status();
        let body = response.excerpt(ERROR_EXCERPT_BYTES);
        error!(status, response = %body, "Planet returned HTTP {}", status);
        UpstreamError::Status(status).into()
    }

    /// Reads and decodes a JSON body.
    fn decode<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ProviderError> {
        let bytes = response.into_bytes()?;
        serde_json::from_slice(&bytes).map_err(|e| {
            error!(
                error = %e,
                response = %String::from_utf8_lossy(&bytes[..bytes.len().min(ERROR_EXCERPT_BYTES)]),
                "Planet returned malformed response"
            );
            UpstreamError::Malformed(e.to_string()).into()
        })
    }
}

/// Appends `segments` to `base`, percent-encoding each one as a single path
/// segment.
///
/// Caller-supplied values such as scene ids can therefore never add path
/// levels, a query or a fragment to the upstream request. Empty, `.` and `..`
/// segments are rejected since URL normalization would drop or resolve them.
fn endpoint_url(base: &str, segments: &[&str]) -> Result<String, UpstreamError> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(UpstreamError::InvalidRequest(format!(
            "'{}' is not a valid path segment",
            bad
        )));
    }

    let mut url = Url::parse(base)
        .map_err(|e| UpstreamError::InvalidRequest(format!("Invalid base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| UpstreamError::InvalidRequest(format!("Invalid base URL {}", base)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url.into())
}

impl<C: HttpClient> SceneProvider for PlanetClient<C> {
    fn search(&self, point: Point, days_ago: i32) -> Result<SceneCollection, ProviderError> {
        debug!(x = point.lon, y = point.lat, days_ago, "Searching");

        let criteria = SearchCriteria::new(&self.endpoints.item_type, point, days_ago);
        let body = serde_json::to_vec(&criteria).map_err(|e| {
            UpstreamError::Transport(format!("Failed to encode search criteria: {}", e))
        })?;

        let response = self.http_client.execute(HttpRequest::post_json(
            self.build_search_url()?,
            self.api_key.as_str(),
            body,
        ))?;

        if response.status() != 200 {
            return Err(self.status_error(response));
        }

        self.decode(response)
    }

    fn get_scene(&self, scene_id: &str) -> Result<Scene, ProviderError> {
        debug!(scene_id, "Requesting scene");

        let response = self.http_client.execute(HttpRequest::get(
            self.build_scene_url(scene_id)?,
            self.api_key.as_str(),
        ))?;

        match response.status() {
            200 => self.decode(response),
            404 => Err(ProviderError::NotFound),
            _ => Err(self.status_error(response)),
        }
    }

    fn fetch_tile(
        &self,
        scene_id: &str,
        x: u32,
        y: u32,
        z: u32,
    ) -> Result<TileStream, ProviderError> {
        debug!(scene_id, x, y, z, "Requesting tile");

        let response = self.http_client.execute(HttpRequest::get(
            self.build_tile_url(scene_id, x, y, z)?,
            self.api_key.as_str(),
        ))?;

        let status = response.status();
        if status != 200 {
            // Release the connection before reporting
            drop(response);
            debug!(scene_id, x, y, z, status, "Tile request rejected");
            return Err(UpstreamError::Status(status).into());
        }

        Ok(TileStream::new(response.into_body()))
    }

    fn name(&self) -> &str {
        "Planet"
    }
}
