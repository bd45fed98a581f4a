use std::path::Path;

use crate::error::EngineError;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed rows, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl ImageData {
    /// Reads and decodes an image file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let bytes = std::fs::read(path).map_err(|e| EngineError::asset(path, e.to_string()))?;
        Self::decode(&bytes, path)
    }

    /// Decodes an in-memory image; `origin` only names it in errors.
    pub fn decode(bytes: &[u8], origin: &Path) -> Result<Self, EngineError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| EngineError::asset(origin, e.to_string()))?
            .to_rgba8();

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(EngineError::asset(origin, "image has zero size"));
        }

        log::debug!("decoded {} ({width}x{height})", origin.display());

        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    /// Solid-color image, used by tests and as a placeholder face.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            rgba: rgba.iter().copied().cycle().take(pixels * 4).collect(),
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let bytes = png_bytes(3, 2, [10, 20, 30, 255]);
        let img = ImageData::decode(&bytes, Path::new("noise.png")).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.rgba.len(), 3 * 2 * 4);
        assert_eq!(&img.rgba[..4], &[10, 20, 30, 255]);
        assert_eq!(img.bytes_per_row(), 12);
    }

    #[test]
    fn undecodable_bytes_are_an_asset_error() {
        let err = ImageData::decode(b"definitely not an image", Path::new("noise.png")).unwrap_err();
        assert!(matches!(err, EngineError::Asset { .. }));
    }

    #[test]
    fn missing_file_is_an_asset_error() {
        let err = ImageData::load(Path::new("/nonexistent/tidewater/skybox1.jpg")).unwrap_err();
        assert!(err.to_string().contains("skybox1.jpg"));
    }

    #[test]
    fn solid_fills_every_pixel() {
        let img = ImageData::solid(2, 2, [1, 2, 3, 4]);
        assert_eq!(img.rgba, vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
    }
}
