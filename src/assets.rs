//! # Template and Icon Assets
//!
//! Filesystem lookup for the static layout template (`template.png`) and the
//! provider weather icons (`icon/<code>.png`) under a configured asset
//! directory. PNGs are decoded with the `image` crate, composited over
//! white, and thresholded to the 1-bit canvas the compositor draws on.
//!
//! A missing or undecodable file is an [`AssetError`], which is fatal for
//! the process: it indicates a packaging defect, not a transient condition.

use crate::canvas::Canvas;
use crate::error::AssetError;
use embedded_graphics::pixelcolor::BinaryColor;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Weather icons are pasted at this size
pub const ICON_SIZE: u32 = 130;

/// Luma values below this render as ink
const INK_THRESHOLD: u8 = 128;

/// Resolves and decodes image assets from a fixed directory.
pub struct AssetStore {
    dir: PathBuf,
    icon_dir: PathBuf,
}

impl AssetStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let icon_dir = dir.join("icon");
        AssetStore { dir, icon_dir }
    }

    /// Load the static background template at its native size.
    pub fn template(&self) -> Result<Canvas, AssetError> {
        load_bitmap(&self.dir.join("template.png"), None)
    }

    /// Load the icon for a provider code, resized to 130x130.
    pub fn icon(&self, code: &str) -> Result<Canvas, AssetError> {
        self.icon_file(&format!("{}.png", code))
    }

    /// Load an icon by filename (the normalizer already appends ".png").
    pub fn icon_file(&self, file: &str) -> Result<Canvas, AssetError> {
        load_bitmap(&self.icon_dir.join(file), Some((ICON_SIZE, ICON_SIZE)))
    }
}

/// Decode a PNG, optionally resize, composite over white, threshold to 1-bit.
fn load_bitmap(path: &Path, resize: Option<(u32, u32)>) -> Result<Canvas, AssetError> {
    let decoded = image::open(path).map_err(|source| match source {
        image::ImageError::IoError(source) => AssetError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => AssetError::Image {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut rgba = decoded.to_rgba8();
    if let Some((w, h)) = resize {
        rgba = image::imageops::resize(&rgba, w, h, FilterType::Triangle);
    }

    let mut canvas = Canvas::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        if a < INK_THRESHOLD {
            continue; // transparent reads as white
        }
        // Integer BT.601 luma
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
        if luma < INK_THRESHOLD as u32 {
            canvas.set_pixel(x, y, BinaryColor::On);
        }
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    /// Build a minimal asset directory with a template and one icon.
    pub(crate) fn synthetic_assets(template_w: u32, template_h: u32, icon_code: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("icon")).unwrap();

        let template = RgbaImage::from_pixel(template_w, template_h, Rgba([255, 255, 255, 255]));
        template.save(dir.path().join("template.png")).unwrap();

        // Solid black icon so pasted regions are easy to assert on
        let icon = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        icon.save(dir.path().join("icon").join(format!("{}.png", icon_code)))
            .unwrap();
        dir
    }

    #[test]
    fn loads_template_at_native_size() {
        let dir = synthetic_assets(64, 32, "10d");
        let store = AssetStore::new(dir.path());
        let template = store.template().unwrap();
        assert_eq!(template.width(), 64);
        assert_eq!(template.height(), 32);
        assert_eq!(template.black_pixel_count(), 0);
    }

    #[test]
    fn icons_are_resized_and_thresholded() {
        let dir = synthetic_assets(64, 32, "10d");
        let store = AssetStore::new(dir.path());
        let icon = store.icon("10d").unwrap();
        assert_eq!(icon.width(), ICON_SIZE);
        assert_eq!(icon.height(), ICON_SIZE);
        // A solid black source stays solid after resampling
        assert_eq!(icon.black_pixel_count(), ICON_SIZE * ICON_SIZE);
    }

    #[test]
    fn missing_icon_is_a_fatal_asset_error() {
        let dir = synthetic_assets(64, 32, "10d");
        let store = AssetStore::new(dir.path());
        let err = store.icon("99z").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn transparent_pixels_read_as_white() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("icon")).unwrap();
        let icon = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        icon.save(dir.path().join("icon").join("01d.png")).unwrap();

        let store = AssetStore::new(dir.path());
        let loaded = store.icon("01d").unwrap();
        assert_eq!(loaded.black_pixel_count(), 0);
    }
}
