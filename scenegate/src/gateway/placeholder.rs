//! Magenta placeholder PNG served when a tile cannot be proxied.
//!
//! Map clients render the placeholder in place of the missing tile, which
//! makes upstream failures visible without breaking the map.

use std::io::Cursor;
use std::path::Path;
use std::sync::OnceLock;

use image::{ImageFormat, Rgba, RgbaImage};

use super::GatewayError;

/// Edge length of generated placeholder tiles, matching web map tiles.
pub const TILE_SIZE: u32 = 256;

/// PNG file signature.
pub const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

static DEFAULT_PLACEHOLDER: OnceLock<Vec<u8>> = OnceLock::new();

/// Encodes a solid magenta square of `size` pixels as PNG.
pub fn generate_magenta_png(size: u32) -> Result<Vec<u8>, GatewayError> {
    let image = RgbaImage::from_pixel(size, size, Rgba([255, 0, 255, 255]));

    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| GatewayError::Placeholder(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Returns the cached default placeholder, generating it on first use.
pub fn default_placeholder() -> Result<Vec<u8>, GatewayError> {
    if let Some(cached) = DEFAULT_PLACEHOLDER.get() {
        return Ok(cached.clone());
    }

    let generated = generate_magenta_png(TILE_SIZE)?;
    Ok(DEFAULT_PLACEHOLDER.get_or_init(|| generated).clone())
}

/// Loads the placeholder from `path`, or the generated default when unset.
///
/// The file must exist and carry a PNG signature.
pub fn load_placeholder(path: Option<&Path>) -> Result<Vec<u8>, GatewayError> {
    let Some(path) = path else {
        return default_placeholder();
    };

    let data = std::fs::read(path).map_err(|source| GatewayError::PlaceholderFile {
        path: path.to_path_buf(),
        source,
    })?;

    if !data.starts_with(PNG_SIGNATURE) {
        return Err(GatewayError::Placeholder(format!(
            "{} is not a PNG file",
            path.display()
        )));
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generated_placeholder_is_png() {
        let png = generate_magenta_png(16).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_generated_placeholder_is_magenta() {
        let png = generate_magenta_png(TILE_SIZE).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (TILE_SIZE, TILE_SIZE));
        assert!(decoded.pixels().all(|p| *p == Rgba([255, 0, 255, 255])));
    }

    #[test]
    fn test_default_placeholder_cached() {
        let first = default_placeholder().unwrap();
        let second = default_placeholder().unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_without_path_uses_default() {
        assert_eq!(
            load_placeholder(None).unwrap(),
            default_placeholder().unwrap()
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tile-error.png");
        let png = generate_magenta_png(8).unwrap();
        std::fs::write(&path, &png).unwrap();

        assert_eq!(load_placeholder(Some(&path)).unwrap(), png);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = load_placeholder(Some(&dir.path().join("missing.png")));
        assert!(matches!(result, Err(GatewayError::PlaceholderFile { .. })));
    }

    #[test]
    fn test_load_non_png_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tile-error.png");
        std::fs::write(&path, b"GIF89a").unwrap();

        assert!(matches!(
            load_placeholder(Some(&path)),
            Err(GatewayError::Placeholder(_))
        ));
    }
}
