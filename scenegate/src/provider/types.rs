//! Provider trait and error taxonomy.

use thiserror::Error;

use crate::geometry::Point;
use crate::scene::{Scene, SceneCollection};

use super::tile::TileStream;

/// A source of scene metadata and tiles.
///
/// Implementations perform one blocking upstream round trip per call and
/// hold no per-call state, so a single instance can serve concurrent callers.
pub trait SceneProvider: Send + Sync {
    /// Finds scenes acquired within the last `days_ago` days around `point`.
    fn search(&self, point: Point, days_ago: i32) -> Result<SceneCollection, ProviderError>;

    /// Looks up one scene by identifier.
    ///
    /// Returns [`ProviderError::NotFound`] only when the provider reports
    /// the scene as absent.
    fn get_scene(&self, scene_id: &str) -> Result<Scene, ProviderError>;

    /// Opens the tile at `z/x/y` of a scene.
    fn fetch_tile(&self, scene_id: &str, x: u32, y: u32, z: u32)
        -> Result<TileStream, ProviderError>;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}

/// Failure of a provider operation.
///
/// Callers only need to tell two situations apart: the provider affirmatively
/// reported that a resource does not exist, or anything else went wrong.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested scene does not exist upstream.
    #[error("scene not found")]
    NotFound,

    /// Transport failure, unexpected status, or malformed response.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProviderError {
    /// Status code returned by the provider, when the failure was a status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::NotFound => Some(404),
            ProviderError::Upstream(UpstreamError::Status(status)) => Some(*status),
            ProviderError::Upstream(_) => None,
        }
    }

    /// Whether this is the "resource absent" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound)
    }
}

/// Detail carried by [`ProviderError::Upstream`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamError {
    /// The provider answered with a non-200 status.
    #[error("Planet returned HTTP {0}")]
    Status(u16),

    /// The request could not be completed.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request URL could not be built from the given inputs.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be decoded.
    #[error("Planet returned malformed response: {0}")]
    Malformed(String),
}
