//! CPU-side RGBA images used as textures and capture sources

use std::path::Path;

use crate::error::RenderError;
use crate::surface::{Color, PixelSurface};

/// Grey levels of the two checker cells
const CHECKER_ON: u8 = 230;
const CHECKER_OFF: u8 = 40;

/// An RGBA8 image, row-major, 4 bytes per pixel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// Create a transparent black image
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap raw RGBA data, None if the length does not match
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            pixels: data,
        })
    }

    /// Snapshot of a surface's color buffer
    pub fn from_surface(surface: &PixelSurface) -> Self {
        Self {
            width: surface.width(),
            height: surface.height(),
            pixels: surface.as_bytes().to_vec(),
        }
    }

    /// Decode an image file (PNG, or anything the `image` crate has enabled) to RGBA8
    pub fn load_png(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let rgba = image::open(path.as_ref())?.into_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Grey checkerboard, `cell` clamped to at least 1
    pub fn checker(width: u32, height: u32, cell: u32) -> Self {
        let cell = cell.max(1);
        let mut img = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let on = ((x / cell) ^ (y / cell)) & 1 == 1;
                let c = if on { CHECKER_ON } else { CHECKER_OFF };
                img.set_pixel(x, y, Color::rgb(c, c, c));
            }
        }
        img
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Non-empty and backed by exactly `width * height * 4` bytes
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.len() == self.width as usize * self.height as usize * 4
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Texel at (x, y); caller guarantees bounds
    #[inline]
    pub(crate) fn texel(&self, x: u32, y: u32) -> Color {
        let i = self.index(x, y);
        let p = &self.pixels[i..i + 4];
        Color::rgba(p[0], p[1], p[2], p[3])
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.texel(x, y))
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, c: Color) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.pixels[i..i + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Nearest-texel lookup. UVs are clamped to [0, 1] (no wrapping);
    /// (0, 0) is the top-left texel.
    #[inline]
    pub fn sample_nearest(&self, u: f32, v: f32) -> Color {
        if !self.is_valid() {
            return Color::TRANSPARENT;
        }
        let pick = |t: f32, dim: u32| -> u32 {
            let i = (t.clamp(0.0, 1.0) * (dim - 1) as f32 + 0.5).floor() as i64;
            i.clamp(0, dim as i64 - 1) as u32
        };
        self.texel(pick(u, self.width), pick(v, self.height))
    }
}
