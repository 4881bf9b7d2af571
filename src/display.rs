//! Output targets for a finished frame.
//!
//! The render pipeline produces a [`Canvas`]; a [`DisplayTarget`] takes it
//! the rest of the way, either onto the physical panel or into a PNG on
//! disk for development without hardware.

use crate::canvas::Canvas;
use crate::error::AssetError;
use image::{GrayImage, Luma};
use std::path::{Path, PathBuf};

/// Where a rendered frame goes. Implementations own the full presentation
/// transaction: a single `show` call leaves the target in a finished state.
pub trait DisplayTarget {
    fn show(&mut self, frame: &Canvas) -> Result<(), DisplayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("failed to write preview image")]
    Preview(#[from] AssetError),
    #[error("panel transfer failed: {0}")]
    Panel(String),
}

/// Development target: writes each frame as an 8-bit grayscale PNG.
pub struct DryRunDisplay {
    path: PathBuf,
}

impl DryRunDisplay {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DisplayTarget for DryRunDisplay {
    fn show(&mut self, frame: &Canvas) -> Result<(), DisplayError> {
        let mut img = GrayImage::new(frame.width(), frame.height());
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let shade = if frame.is_black(x, y) { 0u8 } else { 255u8 };
                img.put_pixel(x, y, Luma([shade]));
            }
        }
        img.save(&self.path).map_err(|source| AssetError::Image {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;
    use tempfile::TempDir;

    #[test]
    fn dry_run_writes_png_with_frame_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.png");

        let mut frame = Canvas::new(32, 16);
        frame.set_pixel(3, 4, BinaryColor::On);

        let mut display = DryRunDisplay::new(&path);
        display.show(&frame).unwrap();

        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!(img.dimensions(), (32, 16));
        assert_eq!(img.get_pixel(3, 4).0[0], 0);
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn dry_run_overwrites_previous_frame() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.png");
        let mut display = DryRunDisplay::new(&path);

        let mut first = Canvas::new(8, 8);
        first.set_pixel(0, 0, BinaryColor::On);
        display.show(&first).unwrap();

        let second = Canvas::new(8, 8);
        display.show(&second).unwrap();

        let img = image::open(&path).unwrap().to_luma8();
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
    }
}
