//! Satellite imagery provider abstraction
//!
//! This module provides the [`SceneProvider`] trait and its Planet Data API
//! implementation, along with the HTTP transport seam used to reach it.
//!
//! # Example
//!
//! ```no_run
//! use scenegate::provider::{PlanetClient, ReqwestClient, SceneProvider};
//!
//! let http_client = ReqwestClient::new()?;
//! let client = PlanetClient::new(http_client, "YOUR_API_KEY");
//! let scene = client.get_scene("LC80420342017301LGN00")?;
//! # Ok::<(), scenegate::provider::ProviderError>(())
//! ```

mod http;
mod planet;
mod tile;
mod types;

pub use http::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use planet::{PlanetClient, PlanetEndpoints, DEFAULT_API_URL, DEFAULT_TILES_URL};
pub use tile::TileStream;
pub use types::{ProviderError, SceneProvider, UpstreamError};

#[cfg(test)]
pub use http::tests::MockHttpClient;
