//! One-shot provider queries: search, scene and tile.
//!
//! Each command performs a single provider call and writes the result to
//! stdout (JSON) or to a file (tiles).

use std::path::{Path, PathBuf};

use scenegate::geometry::Point;
use scenegate::provider::{ProviderError, SceneProvider, UpstreamError};
use serde_json::Value;
use tracing::info;

use super::common::CliRunner;
use crate::error::CliError;

/// Arguments for the search command.
#[derive(Debug)]
pub struct SearchArgs {
    pub lon: f64,
    pub lat: f64,
    pub days_ago: i32,
}

/// Arguments for the tile command.
#[derive(Debug)]
pub struct TileArgs {
    pub scene_id: String,
    pub z: u32,
    pub x: u32,
    pub y: u32,
    pub output: PathBuf,
}

/// Run the search command.
pub fn run_search(config_path: Option<&Path>, args: SearchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("search");
    let client = runner.create_client()?;

    let scenes = search(&client, &args)?;
    info!(count = scenes.len(), "Search complete");
    print_json(serde_json::to_value(&scenes)?)
}

/// Run the scene command.
pub fn run_scene(config_path: Option<&Path>, scene_id: &str) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("scene");
    let client = runner.create_client()?;

    let scene = scene(&client, scene_id)?;
    print_json(serde_json::to_value(&scene)?)
}

/// Run the tile command.
pub fn run_tile(config_path: Option<&Path>, args: TileArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("tile");
    let client = runner.create_client()?;

    let size = tile(&client, &args)?;
    println!("Wrote {} bytes to {}", size, args.output.display());
    Ok(())
}

fn search<P: SceneProvider + ?Sized>(
    provider: &P,
    args: &SearchArgs,
) -> Result<scenegate::scene::SceneCollection, CliError> {
    Ok(provider.search(Point::new(args.lon, args.lat), args.days_ago)?)
}

fn scene<P: SceneProvider + ?Sized>(
    provider: &P,
    scene_id: &str,
) -> Result<scenegate::scene::Scene, CliError> {
    provider.get_scene(scene_id).map_err(|e| match e {
        ProviderError::NotFound => CliError::SceneNotFound(scene_id.to_string()),
        other => CliError::Provider(other),
    })
}

/// Fetches a tile and writes it to `args.output`, returning the byte count.
fn tile<P: SceneProvider + ?Sized>(provider: &P, args: &TileArgs) -> Result<usize, CliError> {
    let stream = provider.fetch_tile(&args.scene_id, args.x, args.y, args.z)?;
    let bytes = stream
        .into_bytes()
        .map_err(|e| UpstreamError::Transport(e.to_string()))?;

    std::fs::write(&args.output, &bytes).map_err(|source| CliError::Output {
        path: args.output.clone(),
        source,
    })?;

    Ok(bytes.len())
}

fn print_json(value: Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenegate::provider::TileStream;
    use scenegate::scene::{Scene, SceneCollection};
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Provider answering every call with a fixed outcome.
    struct FixedProvider {
        status: Option<u16>,
        tile_calls: Mutex<Vec<(String, u32, u32, u32)>>,
    }

    impl FixedProvider {
        fn ok() -> Self {
            Self {
                status: None,
                tile_calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                status: Some(status),
                tile_calls: Mutex::new(Vec::new()),
            }
        }

        fn error(&self, status: u16) -> ProviderError {
            if status == 404 {
                ProviderError::NotFound
            } else {
                UpstreamError::Status(status).into()
            }
        }
    }

    impl SceneProvider for FixedProvider {
        fn search(&self, _: Point, _: i32) -> Result<SceneCollection, ProviderError> {
            match self.status {
                None => Ok(serde_json::from_value(json!({ "features": [] })).unwrap()),
                Some(status) => Err(self.error(status)),
            }
        }

        fn get_scene(&self, scene_id: &str) -> Result<Scene, ProviderError> {
            match self.status {
                None => Ok(serde_json::from_value(json!({
                    "id": scene_id,
                    "geometry": { "type": "Point", "coordinates": [0, 0] },
                    "properties": {
                        "acquired": "2024-01-01T00:00:00Z",
                        "cloud_cover": 0.0,
                        "pixel_resolution": 30,
                        "wrs_path": 1,
                        "wrs_row": 2
                    }
                }))
                .unwrap()),
                Some(status) => Err(self.error(status)),
            }
        }

        fn fetch_tile(&self, scene_id: &str, x: u32, y: u32, z: u32) -> Result<TileStream, ProviderError> {
            self.tile_calls
                .lock()
                .unwrap()
                .push((scene_id.to_string(), x, y, z));
            match self.status {
                None => Ok(TileStream::new(Cursor::new(b"png-bytes".to_vec()))),
                Some(status) => Err(UpstreamError::Status(status).into()),
            }
        }

        fn name(&self) -> &str {
            "Fixed"
        }
    }

    #[test]
    fn test_search_returns_collection() {
        let args = SearchArgs {
            lon: 1.0,
            lat: 2.0,
            days_ago: 14,
        };
        let scenes = search(&FixedProvider::ok(), &args).unwrap();
        assert!(scenes.is_empty());
    }

    #[test]
    fn test_scene_not_found_maps_to_cli_error() {
        let result = scene(&FixedProvider::failing(404), "abc");
        assert!(matches!(result, Err(CliError::SceneNotFound(id)) if id == "abc"));
    }

    #[test]
    fn test_scene_upstream_error_is_provider_error() {
        let result = scene(&FixedProvider::failing(500), "abc");
        assert!(matches!(result, Err(CliError::Provider(_))));
    }

    #[test]
    fn test_tile_written_to_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("tile.png");
        let provider = FixedProvider::ok();
        let args = TileArgs {
            scene_id: "abc".to_string(),
            z: 3,
            x: 1,
            y: 2,
            output: output.clone(),
        };

        let size = tile(&provider, &args).unwrap();

        assert_eq!(size, 9);
        assert_eq!(std::fs::read(&output).unwrap(), b"png-bytes");
        assert_eq!(
            *provider.tile_calls.lock().unwrap(),
            vec![("abc".to_string(), 1, 2, 3)]
        );
    }

    #[test]
    fn test_tile_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("tile.png");
        let args = TileArgs {
            scene_id: "abc".to_string(),
            z: 3,
            x: 1,
            y: 2,
            output: output.clone(),
        };

        assert!(tile(&FixedProvider::failing(404), &args).is_err());
        assert!(!output.exists());
    }
}
