//! 2D rasterization: lines, rectangles, circles and triangles drawn into a
//! [`PixelSurface`](crate::surface::PixelSurface)

mod primitives;
pub mod triangle;

pub use primitives::MAX_LINE_THICKNESS;
pub use triangle::{edge, rasterize_triangle, Fragment, ScreenVertex, Varying};
