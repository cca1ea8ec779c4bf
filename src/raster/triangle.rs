//! Edge-function triangle traversal shared by every triangle rasterizer.
//!
//! Covers pixel centres `(x + 0.5, y + 0.5)` whose three edge functions are
//! all non-negative after the triangle is normalised to positive area. Pixels
//! exactly on an edge are therefore covered by both neighbouring triangles.

use crate::math3d::{Vec2, Vec3};
use crate::surface::PixelSurface;

/// Triangles with less absolute area than this are dropped
pub const DEGENERATE_AREA: f32 = 1e-8;

/// Per-vertex data that can be blended with three weights
pub trait Varying: Copy {
    /// `v[0] * w[0] + v[1] * w[1] + v[2] * w[2]`
    fn weighted(v: &[Self; 3], w: [f32; 3]) -> Self;
}

impl Varying for () {
    #[inline]
    fn weighted(_: &[Self; 3], _: [f32; 3]) -> Self {}
}

impl Varying for f32 {
    #[inline]
    fn weighted(v: &[Self; 3], w: [f32; 3]) -> Self {
        v[0] * w[0] + v[1] * w[1] + v[2] * w[2]
    }
}

impl Varying for Vec2 {
    #[inline]
    fn weighted(v: &[Self; 3], w: [f32; 3]) -> Self {
        v[0] * w[0] + v[1] * w[1] + v[2] * w[2]
    }
}

impl Varying for Vec3 {
    #[inline]
    fn weighted(v: &[Self; 3], w: [f32; 3]) -> Self {
        v[0] * w[0] + v[1] * w[1] + v[2] * w[2]
    }
}

/// A triangle corner in surface pixel space with its attributes
#[derive(Debug, Clone, Copy)]
pub struct ScreenVertex<A> {
    pub pos: Vec2,
    pub attr: A,
}

impl<A> ScreenVertex<A> {
    #[inline]
    pub fn new(pos: Vec2, attr: A) -> Self {
        Self { pos, attr }
    }
}

/// A covered pixel handed to the shading callback
pub struct Fragment<'a, A> {
    pub x: i32,
    pub y: i32,
    /// Barycentric weights, summing to 1, in the order of `attrs`
    pub bary: [f32; 3],
    /// Vertex attributes after winding normalisation
    pub attrs: &'a [A; 3],
}

impl<A: Varying> Fragment<'_, A> {
    /// Screen-space linear interpolation of the vertex attributes
    #[inline]
    pub fn interpolate(&self) -> A {
        A::weighted(self.attrs, self.bary)
    }
}

/// Signed edge function of `p` against the directed edge `a -> b`
#[inline]
pub fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// Traverse every covered pixel of `tri` and call `shade` for it.
///
/// The callback receives the surface so it can depth-test and write.
/// Degenerate triangles are rejected; the dirty region grows by the
/// clamped bounding box of every accepted triangle. A triangle lying wholly
/// off the surface still marks the edge pixels its clamped box collapses to.
pub fn rasterize_triangle<A, F>(surface: &mut PixelSurface, tri: [ScreenVertex<A>; 3], mut shade: F)
where
    A: Copy,
    F: FnMut(&mut PixelSurface, &Fragment<'_, A>),
{
    let [a, mut b, mut c] = tri;
    let mut area = edge(a.pos, b.pos, c.pos);
    if area.abs() < DEGENERATE_AREA || area.is_nan() {
        return;
    }
    if area < 0.0 {
        std::mem::swap(&mut b, &mut c);
        area = -area;
    }

    let (min_x, min_y, max_x, max_y) = bounds(surface, a.pos, b.pos, c.pos);
    let inv_area = 1.0 / area;
    let attrs = [a.attr, b.attr, c.attr];

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b.pos, c.pos, p);
            let w1 = edge(c.pos, a.pos, p);
            let w2 = edge(a.pos, b.pos, p);
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                let frag = Fragment {
                    x,
                    y,
                    bary: [w0 * inv_area, w1 * inv_area, w2 * inv_area],
                    attrs: &attrs,
                };
                shade(surface, &frag);
            }
        }
    }

    surface.mark_dirty_rect(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1);
}

/// Pixel bounding box, floor of the minimum and ceil of the maximum,
/// clamped into the surface
fn bounds(surface: &PixelSurface, a: Vec2, b: Vec2, c: Vec2) -> (i32, i32, i32, i32) {
    let max_x = surface.width() as i32 - 1;
    let max_y = surface.height() as i32 - 1;
    let lo_x = a.x.min(b.x).min(c.x).floor() as i32;
    let lo_y = a.y.min(b.y).min(c.y).floor() as i32;
    let hi_x = a.x.max(b.x).max(c.x).ceil() as i32;
    let hi_y = a.y.max(b.y).max(c.y).ceil() as i32;
    (
        lo_x.clamp(0, max_x),
        lo_y.clamp(0, max_y),
        hi_x.clamp(0, max_x),
        hi_y.clamp(0, max_y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Color;

    fn flat(pts: [(f32, f32); 3]) -> [ScreenVertex<()>; 3] {
        pts.map(|(x, y)| ScreenVertex::new(Vec2::new(x, y), ()))
    }

    fn count_covered(surface: &mut PixelSurface, tri: [ScreenVertex<()>; 3]) -> usize {
        let mut n = 0;
        rasterize_triangle(surface, tri, |_, _| n += 1);
        n
    }

    #[test]
    fn test_degenerate_triangle_touches_nothing() {
        let mut s = PixelSurface::new(8, 8);
        assert_eq!(count_covered(&mut s, flat([(0.0, 0.0), (4.0, 4.0), (8.0, 8.0)])), 0);
        assert!(s.dirty().is_empty());
    }

    #[test]
    fn test_offscreen_triangle_marks_clamped_edge() {
        let mut s = PixelSurface::new(10, 10);
        assert_eq!(count_covered(&mut s, flat([(20.0, 2.0), (30.0, 2.0), (20.0, 8.0)])), 0);
        assert_eq!(s.dirty().as_rect(), Some((9, 2, 1, 7)));
    }

    #[test]
    fn test_winding_does_not_change_coverage() {
        let mut s = PixelSurface::new(16, 16);
        let cw = count_covered(&mut s, flat([(1.0, 1.0), (12.0, 2.0), (4.0, 13.0)]));
        let ccw = count_covered(&mut s, flat([(1.0, 1.0), (4.0, 13.0), (12.0, 2.0)]));
        assert!(cw > 0);
        assert_eq!(cw, ccw);
    }

    #[test]
    fn test_covers_pixel_centres_inside() {
        // Right triangle covering the lower-left half of a 4x4 square
        let mut s = PixelSurface::new(4, 4);
        let mut hits = Vec::new();
        rasterize_triangle(&mut s, flat([(0.0, 0.0), (0.0, 4.0), (4.0, 4.0)]), |_, f| {
            hits.push((f.x, f.y))
        });
        // centres on or below the diagonal y >= x
        assert_eq!(hits.len(), 10);
        assert!(hits.iter().all(|&(x, y)| y >= x));
    }

    #[test]
    fn test_barycentrics_sum_to_one() {
        let mut s = PixelSurface::new(10, 10);
        rasterize_triangle(&mut s, flat([(0.0, 0.0), (9.0, 1.0), (2.0, 9.0)]), |_, f| {
            let sum: f32 = f.bary.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
        });
    }

    #[test]
    fn test_swap_keeps_attributes_with_vertices() {
        let mut s = PixelSurface::new(10, 10);
        let tri = [
            ScreenVertex::new(Vec2::new(0.0, 0.0), 0.0f32),
            ScreenVertex::new(Vec2::new(10.0, 0.0), 2.0),
            ScreenVertex::new(Vec2::new(0.0, 10.0), 1.0),
        ];
        let mut near_b = None;
        rasterize_triangle(&mut s, tri, |_, f| {
            if (f.x, f.y) == (0, 8) {
                near_b = Some(f.interpolate());
            }
        });
        // (0.5, 8.5) lies close to the vertex carrying 1.0
        let v = near_b.unwrap();
        assert!(v > 0.8 && v < 1.2, "got {v}");
    }

    #[test]
    fn test_dirty_extends_by_clamped_box() {
        let mut s = PixelSurface::new(8, 8);
        rasterize_triangle(&mut s, flat([(-4.0, 2.0), (6.2, 2.0), (1.0, 20.0)]), |surf, f| {
            surf.write_pixel(f.x, f.y, Color::WHITE)
        });
        assert_eq!(s.dirty().as_rect(), Some((0, 2, 8, 6)));
    }
}
