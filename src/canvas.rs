//! # 1-Bit Render Canvas
//!
//! Packed monochrome framebuffer shared by the compositor, the tide plotter,
//! and the e-paper driver. Rows are packed MSB-first, 8 pixels per byte,
//! with 1 = white and 0 = black to match the panel's RAM layout, so the
//! finished buffer can be handed to the display without conversion.
//!
//! The canvas implements [`embedded_graphics::draw_target::DrawTarget`] with
//! `BinaryColor::On` meaning ink (black), which lets the compositor use the
//! ordinary text and primitive drawing APIs.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

/// Fixed-size monochrome canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    buf: Vec<u8>,
}

impl Canvas {
    /// Create an all-white canvas.
    pub fn new(width: u32, height: u32) -> Self {
        let bytes_per_row = width.div_ceil(8);
        Canvas {
            width,
            height,
            buf: vec![0xFF; (bytes_per_row * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed row-major buffer, 1 = white, MSB first.
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    /// Set one pixel; writes outside the canvas are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bytes_per_row = self.width.div_ceil(8);
        let byte_index = (y * bytes_per_row + x / 8) as usize;
        let bit_mask = 0x80 >> (x % 8);
        if color.is_on() {
            // Ink: clear the bit
            self.buf[byte_index] &= !bit_mask;
        } else {
            self.buf[byte_index] |= bit_mask;
        }
    }

    /// True when the pixel is inked (black). Out of bounds reads white.
    pub fn is_black(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let bytes_per_row = self.width.div_ceil(8);
        let byte_index = (y * bytes_per_row + x / 8) as usize;
        let bit_mask = 0x80 >> (x % 8);
        self.buf[byte_index] & bit_mask == 0
    }

    /// Paste `src` with its top-left corner at (x, y), overwriting both
    /// black and white pixels. Parts falling outside the canvas are clipped.
    pub fn blit(&mut self, src: &Canvas, x: i32, y: i32) {
        for sy in 0..src.height {
            let dy = y + sy as i32;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + sx as i32;
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                let color = if src.is_black(sx, sy) {
                    BinaryColor::On
                } else {
                    BinaryColor::Off
                };
                self.set_pixel(dx as u32, dy as u32, color);
            }
        }
    }

    /// Number of inked pixels; used by tests and debug logging.
    pub fn black_pixel_count(&self) -> u32 {
        self.buf.iter().map(|&b| b.count_zeros()).sum()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }
}
