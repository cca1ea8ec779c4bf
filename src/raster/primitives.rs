use std::ops::{Range, RangeInclusive};

use super::triangle::{rasterize_triangle, ScreenVertex};
use crate::math3d::{Vec2, Vec3};
use crate::surface::{Color, PixelSurface};
use crate::texture::Image;

// ============================================================================
// 2D primitives
// ============================================================================

/// Brush width cap for lines; each step writes a full square brush
pub const MAX_LINE_THICKNESS: i32 = 255;

/// `lo..hi` clamped to `0..len`
fn span(lo: i64, hi: i64, len: u32) -> Range<i32> {
    let len = i64::from(len);
    let lo = lo.clamp(0, len);
    let hi = hi.clamp(lo, len);
    lo as i32..hi as i32
}

/// Step `k` of `0..=range` where `off + dir * k` lies in `lo..=hi`
fn steps_within(off: i64, dir: i64, lo: i64, hi: i64, range: i64) -> RangeInclusive<i64> {
    let (a, b) = if dir > 0 { (lo - off, hi - off) } else { (off - hi, off - lo) };
    a.max(0)..=b.min(range)
}

/// Integer square root of a non-negative value
fn isqrt(n: i64) -> i64 {
    let mut r = (n as f64).sqrt() as i64;
    while r > 0 && r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    r
}

impl PixelSurface {
    /// `write_pixel` for coordinates that may lie outside `i32`
    #[inline]
    fn write_pixel_wide(&mut self, x: i64, y: i64, c: Color) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.write_pixel(x, y, c);
        }
    }

    /// Extend dirty by the corners of the inclusive box (x0, y0)..(x1, y1)
    fn mark_dirty_corners(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) {
        for (x, y) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
            if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
                self.mark_dirty_rect(x, y, 1, 1);
            }
        }
    }

    /// Bresenham line with a square brush of radius `thickness / 2`.
    ///
    /// Thickness is clamped to `1..=MAX_LINE_THICKNESS`. Only the steps whose
    /// brush can reach the surface are visited; step `k` along the major axis
    /// sits at minor offset `floor((2 * minor * k + major) / (2 * major))`,
    /// which is where the incremental error term puts it.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, c: Color, thickness: i32) {
        let rad = i64::from(thickness.clamp(1, MAX_LINE_THICKNESS) / 2);
        let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
        let (dx, dy) = ((x1 - x0).abs(), (y1 - y0).abs());
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));

        let x_major = dx >= dy;
        let (major, minor) = if x_major { (dx, dy) } else { (dy, dx) };
        let steps = if x_major {
            steps_within(x0, sx, -rad, w - 1 + rad, major)
        } else {
            steps_within(y0, sy, -rad, h - 1 + rad, major)
        };

        for k in steps {
            let m = if major == 0 {
                0
            } else {
                ((2 * i128::from(minor) * i128::from(k) + i128::from(major)) / (2 * i128::from(major))) as i64
            };
            let (x, y) = if x_major { (x0 + sx * k, y0 + sy * m) } else { (x0 + sx * m, y0 + sy * k) };
            let cols = span(x - rad, x + rad + 1, self.width());
            for py in span(y - rad, y + rad + 1, self.height()) {
                for px in cols.clone() {
                    self.write_pixel(px, py, c);
                }
            }
        }

        self.mark_dirty_corners(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1));
    }

    /// Axis-aligned rectangle. The outline is `thickness` rings drawn inward.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Color, filled: bool, thickness: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (x0, y0, rw0, rh0) = (i64::from(x), i64::from(y), i64::from(w), i64::from(h));
        let (sw, sh) = (self.width(), self.height());
        if filled {
            let cols = span(x0, x0 + rw0, sw);
            for yy in span(y0, y0 + rh0, sh) {
                for xx in cols.clone() {
                    self.write_pixel(xx, yy, c);
                }
            }
        } else {
            let (fw, fh) = (i64::from(sw), i64::from(sh));
            // rings before `first` enclose the surface, rings from `last` on miss it
            let first = (-x0).min(x0 + rw0 - fw).min(-y0).min(y0 + rh0 - fh).max(0);
            let last = i64::from(thickness.max(1))
                .min(x0 + rw0)
                .min(fw - x0)
                .min(y0 + rh0)
                .min(fh - y0);
            for t in first..last {
                let (rx, ry) = (x0 + t, y0 + t);
                let (rw, rh) = (rw0 - 2 * t, rh0 - 2 * t);
                if rw <= 0 || rh <= 0 {
                    break;
                }
                for xx in span(rx, rx + rw, sw).map(i64::from) {
                    self.write_pixel_wide(xx, ry, c);
                    self.write_pixel_wide(xx, ry + rh - 1, c);
                }
                for yy in span(ry, ry + rh, sh).map(i64::from) {
                    self.write_pixel_wide(rx, yy, c);
                    self.write_pixel_wide(rx + rw - 1, yy, c);
                }
            }
        }
        self.mark_dirty_corners(x0, y0, x0 + rw0 - 1, y0 + rh0 - 1);
    }

    /// Circle centred on (cx, cy). `thickness` only applies to outlines.
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, c: Color, filled: bool, thickness: i32) {
        if radius <= 0 {
            return;
        }
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(radius));
        if filled {
            self.fill_circle(cx, cy, r, c);
        } else {
            self.stroke_circle(cx, cy, r, c, i64::from(thickness.max(1)));
        }
        self.mark_dirty_corners(cx - r, cy - r, cx + r, cy + r);
    }

    fn fill_circle(&mut self, cx: i64, cy: i64, r: i64, c: Color) {
        let r2 = r as f64 * r as f64;
        let rows = (-r).max(-cy)..=r.min(i64::from(self.height()) - 1 - cy);
        for dy in rows {
            let half = (r2 - dy as f64 * dy as f64).sqrt().floor() as i64;
            for x in span(cx - half, cx + half + 1, self.width()) {
                self.write_pixel(x, (cy + dy) as i32, c);
            }
        }
    }

    /// Midpoint circle at radii r, r-1, ... (`thickness` of them, all above 0).
    ///
    /// Rings whose points cannot reach the surface are skipped, and so are
    /// runs of steps whose eight mirrored points all miss it.
    fn stroke_circle(&mut self, cx: i64, cy: i64, r: i64, c: Color, thickness: i64) {
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));
        let near = |v: i64, len: i64| (v.clamp(0, len - 1) - v) as f64;
        let far = |v: i64, len: i64| v.abs().max((v - (len - 1)).abs()) as f64;
        let d_min = near(cx, w).hypot(near(cy, h));
        let d_max = far(cx, w).hypot(far(cy, h));

        // every plotted point of ring rr lies between rr - 2 and rr from the centre
        let inner = (r - thickness).max(0).max(d_min as i64 - 3);
        let outer = r.min(d_max as i64 + 4);

        // step ranges where at least one mirrored point shares a row or column with the surface
        let windows = [
            (-cy, h - 1 - cy),
            (-cx, w - 1 - cx),
            (cx - (w - 1), cx),
            (cy - (h - 1), cy),
        ];

        for rr in (inner + 1..=outer).rev() {
            let rr2 = rr * rr;
            let x_at = |y: i64| {
                let s = rr2 - y * y - 2 * y;
                if s < 0 {
                    -1
                } else {
                    isqrt(s)
                }
            };
            let (mut x, mut y, mut err) = (rr, 0_i64, 0_i64);
            while x >= y {
                if windows.iter().any(|&(lo, hi)| (lo..=hi).contains(&y)) {
                    for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                        self.write_pixel_wide(cx + px, cy + py, c);
                    }
                } else {
                    let Some(target) = windows.iter().map(|&(lo, _)| lo).filter(|&lo| lo > y).min() else {
                        break;
                    };
                    // while x stays two ahead of y every step advances y by one,
                    // and x is the largest value keeping the error non-positive
                    if x >= y + 2 && x_at(y + 1) >= y + 3 {
                        let (mut lo, mut hi) = (y + 1, target);
                        while lo < hi {
                            let mid = lo + (hi - lo + 1) / 2;
                            if x_at(mid) >= mid + 2 {
                                lo = mid;
                            } else {
                                hi = mid - 1;
                            }
                        }
                        y = lo;
                        x = x_at(y);
                        err = x * x + y * y + 2 * y - rr2;
                        continue;
                    }
                }
                if err <= 0 {
                    y += 1;
                    err += 2 * y + 1;
                }
                if err > 0 {
                    x -= 1;
                    err -= 2 * x + 1;
                }
            }
        }
    }

    /// Three lines through the vertices truncated to integers
    pub fn draw_triangle_outline(&mut self, a: Vec2, b: Vec2, c: Vec2, col: Color, thickness: i32) {
        let ip = |v: Vec2| (v.x as i32, v.y as i32);
        let (a, b, c) = (ip(a), ip(b), ip(c));
        self.draw_line(a.0, a.1, b.0, b.1, col, thickness);
        self.draw_line(b.0, b.1, c.0, c.1, col, thickness);
        self.draw_line(c.0, c.1, a.0, a.1, col, thickness);
    }

    pub fn draw_triangle_filled(&mut self, a: Vec2, b: Vec2, c: Vec2, col: Color) {
        let tri = [a, b, c].map(|p| ScreenVertex::new(p, ()));
        rasterize_triangle(self, tri, |s, f| s.write_pixel(f.x, f.y, col));
    }

    /// Triangle with per-vertex colors interpolated in screen space; output is opaque
    pub fn draw_triangle_gradient(&mut self, a: Vec2, ca: Color, b: Vec2, cb: Color, c: Vec2, cc: Color) {
        let rgb = |k: Color| Vec3::new(k.r as f32, k.g as f32, k.b as f32) * (1.0 / 255.0);
        let tri = [
            ScreenVertex::new(a, rgb(ca)),
            ScreenVertex::new(b, rgb(cb)),
            ScreenVertex::new(c, rgb(cc)),
        ];
        rasterize_triangle(self, tri, |s, f| {
            let v = f.interpolate();
            s.write_pixel(f.x, f.y, Color::from_unit(v.x, v.y, v.z));
        });
    }

    /// Triangle textured with screen-space interpolated UVs, sampled nearest
    /// and multiplied by `tint`. Invalid textures draw nothing.
    pub fn draw_triangle_textured(
        &mut self,
        a: Vec2,
        ua: Vec2,
        b: Vec2,
        ub: Vec2,
        c: Vec2,
        uc: Vec2,
        tex: &Image,
        tint: Color,
    ) {
        if !tex.is_valid() {
            return;
        }
        let tri = [
            ScreenVertex::new(a, ua),
            ScreenVertex::new(b, ub),
            ScreenVertex::new(c, uc),
        ];
        rasterize_triangle(self, tri, |s, f| {
            let uv = f.interpolate();
            s.write_pixel(f.x, f.y, tex.sample_nearest(uv.x, uv.y).modulate(tint));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BlendMode;

    fn count(s: &PixelSurface, c: Color) -> usize {
        let mut n = 0;
        for y in 0..s.height() as i32 {
            for x in 0..s.width() as i32 {
                if s.pixel(x, y) == Some(c) {
                    n += 1;
                }
            }
        }
        n
    }

    /// Red channel per pixel after drawing with additive red 1, i.e. the write count
    fn additive_counts(w: u32, h: u32, draw: impl FnOnce(&mut PixelSurface, Color)) -> Vec<u8> {
        let mut s = PixelSurface::new(w, h);
        s.set_blend_mode(BlendMode::Additive);
        draw(&mut s, Color::rgba(1, 0, 0, 255));
        s.as_bytes().chunks_exact(4).map(|p| p[0]).collect()
    }

    /// Write counts from a plain loop that visits every point, on or off the surface
    fn reference_counts(w: u32, h: u32, plot: impl FnOnce(&mut dyn FnMut(i64, i64))) -> Vec<u8> {
        let (w, h) = (i64::from(w), i64::from(h));
        let mut counts = vec![0u8; (w * h) as usize];
        plot(&mut |x: i64, y: i64| {
            if (0..w).contains(&x) && (0..h).contains(&y) {
                let i = (y * w + x) as usize;
                counts[i] = counts[i].saturating_add(1);
            }
        });
        counts
    }

    fn bresenham(mut x0: i64, mut y0: i64, x1: i64, y1: i64, rad: i64, plot: &mut dyn FnMut(i64, i64)) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            for oy in -rad..=rad {
                for ox in -rad..=rad {
                    plot(x0 + ox, y0 + oy);
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn midpoint_rings(cx: i64, cy: i64, r: i64, thickness: i64, plot: &mut dyn FnMut(i64, i64)) {
        for rr in ((r - thickness).max(0) + 1..=r).rev() {
            let (mut x, mut y, mut err) = (rr, 0, 0);
            while x >= y {
                for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                    plot(cx + px, cy + py);
                }
                if err <= 0 {
                    y += 1;
                    err += 2 * y + 1;
                }
                if err > 0 {
                    x -= 1;
                    err -= 2 * x + 1;
                }
            }
        }
    }

    fn rect_rings(x: i64, y: i64, w: i64, h: i64, thickness: i64, plot: &mut dyn FnMut(i64, i64)) {
        for t in 0..thickness {
            let (rx, ry, rw, rh) = (x + t, y + t, w - 2 * t, h - 2 * t);
            if rw <= 0 || rh <= 0 {
                break;
            }
            for xx in rx..rx + rw {
                plot(xx, ry);
                plot(xx, ry + rh - 1);
            }
            for yy in ry..ry + rh {
                plot(rx, yy);
                plot(rx + rw - 1, yy);
            }
        }
    }

    #[test]
    fn test_line_matches_stepwise_bresenham() {
        let lines = [
            (1, 1, 10, 4, 1),
            (10, 8, 2, 0, 1),
            (3, -4, 6, 20, 1),
            (-20, 3, 30, 7, 1),
            (25, -9, -14, 12, 3),
            (0, 0, 0, 0, 5),
            (-3, 11, 15, -2, 4),
            (6, -100, 7, 100, 2),
        ];
        for (x0, y0, x1, y1, t) in lines {
            let got = additive_counts(12, 9, |s, c| s.draw_line(x0, y0, x1, y1, c, t));
            let want = reference_counts(12, 9, |p| {
                bresenham(x0.into(), y0.into(), x1.into(), y1.into(), i64::from(t / 2), p);
            });
            assert_eq!(got, want, "line {:?}", (x0, y0, x1, y1, t));
        }
    }

    #[test]
    fn test_line_extreme_endpoints() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_line(i32::MIN, 0, i32::MAX, 0, Color::WHITE, 1);
        assert_eq!(count(&s, Color::WHITE), 10);
        assert!((0..10).all(|x| s.pixel(x, 0) == Some(Color::WHITE)));

        let mut s = PixelSurface::new(10, 10);
        s.draw_line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, Color::WHITE, i32::MAX);
        assert_eq!(s.pixel(5, 5), Some(Color::WHITE));
        assert_eq!(s.dirty().as_rect(), Some((0, 0, 10, 10)));
    }

    #[test]
    fn test_rect_outline_matches_rings() {
        let rects = [(0, 0, 5, 5, 1), (-3, -2, 9, 20, 2), (4, 3, 30, 30, 3), (-10, -10, 40, 40, 14), (2, 2, 3, 7, 9)];
        for (x, y, w, h, t) in rects {
            let got = additive_counts(12, 9, |s, c| s.draw_rect(x, y, w, h, c, false, t));
            let want = reference_counts(12, 9, |p| rect_rings(x.into(), y.into(), w.into(), h.into(), t.into(), p));
            assert_eq!(got, want, "rect {:?}", (x, y, w, h, t));
        }
    }

    #[test]
    fn test_rect_extreme_extents() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_rect(i32::MAX - 7, 0, 100, 1, Color::WHITE, true, 1);
        s.draw_rect(i32::MAX - 7, 0, 100, 1, Color::WHITE, false, 1);
        assert_eq!(count(&s, Color::WHITE), 0);
        assert!(s.dirty().is_empty());

        s.draw_rect(-5, -5, i32::MAX, i32::MAX, Color::WHITE, false, i32::MAX);
        assert_eq!(count(&s, Color::WHITE), 100);

        let mut s = PixelSurface::new(20, 20);
        s.draw_rect(0, 0, 1_000_000_000, 1_000_000_000, Color::WHITE, true, 1);
        assert_eq!(count(&s, Color::WHITE), 400);
        assert_eq!(s.dirty().as_rect(), Some((0, 0, 20, 20)));
    }

    #[test]
    fn test_circle_outline_matches_midpoint() {
        let circles = [
            (6, 4, 3, 1),
            (6, 4, 9, 4),
            (-5, 20, 18, 2),
            (-1_000_000, 5, 1_000_005, 3),
            (4, -2_000_000, 2_000_003, 2),
            (30, 30, 5, 2),
        ];
        for (cx, cy, r, t) in circles {
            let got = additive_counts(12, 9, |s, c| s.draw_circle(cx, cy, r, c, false, t));
            let want = reference_counts(12, 9, |p| midpoint_rings(cx.into(), cy.into(), r.into(), t.into(), p));
            assert_eq!(got, want, "circle {:?}", (cx, cy, r, t));
        }
    }

    #[test]
    fn test_circle_extreme_radius() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_circle(0, 0, i32::MAX, Color::WHITE, false, 1);
        assert_eq!(count(&s, Color::WHITE), 0);
        assert!(s.dirty().is_empty());

        s.draw_circle(0, 0, i32::MAX, Color::WHITE, true, 1);
        assert_eq!(count(&s, Color::WHITE), 100);

        let mut s = PixelSurface::new(10, 10);
        s.draw_circle(i32::MIN, i32::MAX, i32::MAX, Color::WHITE, false, i32::MAX);
        s.draw_circle(i32::MIN, i32::MAX, i32::MAX, Color::WHITE, true, 1);
        assert_eq!(count(&s, Color::WHITE), 0);
    }

    #[test]
    fn test_line_horizontal_and_dirty() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_line(1, 5, 6, 5, Color::WHITE, 1);
        assert_eq!(count(&s, Color::WHITE), 6);
        assert_eq!(s.dirty().as_rect(), Some((1, 5, 6, 1)));
    }

    #[test]
    fn test_line_diagonal_endpoints() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_line(8, 8, 0, 0, Color::WHITE, 1);
        assert_eq!(s.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(s.pixel(8, 8), Some(Color::WHITE));
        assert_eq!(count(&s, Color::WHITE), 9);
    }

    #[test]
    fn test_thick_line_brush() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_line(5, 5, 5, 5, Color::WHITE, 3);
        assert_eq!(count(&s, Color::WHITE), 9);
    }

    #[test]
    fn test_rect_filled_and_empty() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_rect(2, 2, 3, 4, Color::WHITE, true, 1);
        assert_eq!(count(&s, Color::WHITE), 12);
        s.draw_rect(0, 0, 0, 5, Color::rgb(1, 1, 1), true, 1);
        assert_eq!(count(&s, Color::rgb(1, 1, 1)), 0);
    }

    #[test]
    fn test_rect_outline_rings_stop_when_degenerate() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_rect(0, 0, 5, 5, Color::WHITE, false, 1);
        assert_eq!(count(&s, Color::WHITE), 16);
        s.clear_color(Color::BLACK);
        // rings of 5x5, 3x3 and 1x1 then stop
        s.draw_rect(0, 0, 5, 5, Color::WHITE, false, 10);
        assert_eq!(count(&s, Color::WHITE), 25);
    }

    #[test]
    fn test_circle_filled_spans() {
        let mut s = PixelSurface::new(11, 11);
        s.draw_circle(5, 5, 1, Color::WHITE, true, 1);
        // plus sign: rows -1 and 1 have half width 0, row 0 has 1
        assert_eq!(count(&s, Color::WHITE), 5);
        s.draw_circle(5, 5, 0, Color::rgb(9, 9, 9), true, 1);
        assert_eq!(count(&s, Color::rgb(9, 9, 9)), 0);
    }

    #[test]
    fn test_circle_outline_symmetry() {
        let mut s = PixelSurface::new(21, 21);
        s.draw_circle(10, 10, 6, Color::WHITE, false, 1);
        for (x, y) in [(16, 10), (4, 10), (10, 16), (10, 4)] {
            assert_eq!(s.pixel(x, y), Some(Color::WHITE));
        }
        assert_eq!(s.pixel(10, 10), Some(Color::BLACK));
        assert_eq!(s.dirty().as_rect(), Some((4, 4, 13, 13)));
    }

    #[test]
    fn test_triangle_filled_covers_interior() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_triangle_filled(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
            Color::WHITE,
        );
        assert_eq!(s.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(s.pixel(9, 9), Some(Color::BLACK));
    }

    #[test]
    fn test_triangle_filled_count_matches_pixel_centres() {
        let mut s = PixelSurface::new(20, 20);
        let (a, b, c) = (Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0));
        s.draw_triangle_filled(a, b, c, Color::WHITE);

        let side = |p: Vec2, q: Vec2, x: f32, y: f32| (q.x - p.x) * (y - p.y) - (q.y - p.y) * (x - p.x);
        let mut expected = 0;
        let mut outside_box = 0;
        for y in 0..20 {
            for x in 0..20 {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let e = [side(a, b, px, py), side(b, c, px, py), side(c, a, px, py)];
                if e.iter().all(|&v| v >= 0.0) || e.iter().all(|&v| v <= 0.0) {
                    expected += 1;
                }
                if (x > 10 || y > 10) && s.pixel(x, y) == Some(Color::WHITE) {
                    outside_box += 1;
                }
            }
        }
        assert_eq!(expected, 55);
        assert_eq!(count(&s, Color::WHITE), expected);
        assert_eq!(outside_box, 0);
    }

    #[test]
    fn test_triangle_gradient_single_color() {
        let mut s = PixelSurface::new(8, 8);
        let c = Color::rgb(10, 200, 30);
        s.draw_triangle_gradient(
            Vec2::new(0.0, 0.0),
            c,
            Vec2::new(8.0, 0.0),
            c,
            Vec2::new(0.0, 8.0),
            c,
        );
        assert_eq!(s.pixel(1, 1), Some(c));
    }

    #[test]
    fn test_triangle_textured_tint_and_invalid() {
        let mut s = PixelSurface::new(8, 8);
        let tex = Image::from_rgba(1, 1, vec![200, 100, 50, 255]).unwrap();
        let tint = Color::rgb(255, 0, 255);
        let uv = Vec2::new(0.0, 0.0);
        s.draw_triangle_textured(
            Vec2::new(0.0, 0.0),
            uv,
            Vec2::new(8.0, 0.0),
            uv,
            Vec2::new(0.0, 8.0),
            uv,
            &tex,
            tint,
        );
        assert_eq!(s.pixel(1, 1), Some(Color::rgb(200, 0, 50)));

        let mut s2 = PixelSurface::new(8, 8);
        s2.draw_triangle_textured(
            Vec2::new(0.0, 0.0),
            uv,
            Vec2::new(8.0, 0.0),
            uv,
            Vec2::new(0.0, 8.0),
            uv,
            &Image::default(),
            tint,
        );
        assert!(s2.dirty().is_empty());
    }

    #[test]
    fn test_triangle_outline_draws_edges() {
        let mut s = PixelSurface::new(10, 10);
        s.draw_triangle_outline(
            Vec2::new(1.9, 1.0),
            Vec2::new(8.0, 1.0),
            Vec2::new(1.0, 8.0),
            Color::WHITE,
            1,
        );
        assert_eq!(s.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(s.pixel(8, 1), Some(Color::WHITE));
        assert_eq!(s.pixel(3, 3), Some(Color::BLACK));
    }
}
