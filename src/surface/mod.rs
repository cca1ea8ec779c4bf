//! Framebuffer surface: color storage, blending, depth, clipping and dirty tracking

mod color;
mod dirty;
mod pixel_surface;

pub use color::{to_u8, BlendMode, Color};
pub use dirty::DirtyRect;
pub use pixel_surface::{ClipRect, PixelSurface, DEPTH_FAR, MAX_DIMENSION};
