use super::color::{BlendMode, Color};
use super::dirty::DirtyRect;
use crate::texture::Image;

/// Far-plane value the depth buffer is reset to
pub const DEPTH_FAR: f32 = 1.0;

/// Largest accepted width or height
pub const MAX_DIMENSION: u32 = 16_384;

/// Clip rectangle in surface pixels, already clamped to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ClipRect {
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }

    fn clamped(x: i32, y: i32, w: i32, h: i32, width: u32, height: u32) -> Self {
        let (fw, fh) = (width as i32, height as i32);
        let x = x.clamp(0, fw);
        let y = y.clamp(0, fh);
        Self {
            x,
            y,
            w: w.clamp(0, fw - x),
            h: h.clamp(0, fh - y),
        }
    }
}

// ============================================================================
// PixelSurface
// ============================================================================

/// RGBA8 color buffer plus optional depth buffer, clip rect, blend mode and
/// dirty-region tracking. Every draw call funnels through `write_pixel`.
///
/// Layout: tightly packed RGBA, row-major, top-left origin, stride `width * 4`.
pub struct PixelSurface {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    depth: Option<Vec<f32>>,
    clip: Option<ClipRect>,
    blend: BlendMode,
    dirty: DirtyRect,
}

impl PixelSurface {
    /// Create a surface cleared to opaque black. Dimensions below 1 are clamped to 1.
    /// A size that cannot be allocated falls back to 1x1.
    pub fn new(width: u32, height: u32) -> Self {
        let (pixels, width, height) = match opaque_black(width.max(1), height.max(1)) {
            Some(pixels) => (pixels, width.max(1), height.max(1)),
            None => {
                log::warn!("cannot allocate a {}x{} surface, using 1x1", width, height);
                (vec![0, 0, 0, 255], 1, 1)
            },
        };
        Self {
            pixels,
            width,
            height,
            depth: None,
            clip: None,
            blend: BlendMode::Overwrite,
            dirty: DirtyRect::Empty,
        }
    }

    /// Reallocate all buffers. Color is reset to opaque black, dirty is emptied,
    /// depth (if enabled) is reset to far and the clip rect is re-clamped.
    ///
    /// Returns false and leaves the surface untouched when either dimension
    /// exceeds [`MAX_DIMENSION`] or the buffers cannot be allocated.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let width = width.max(1);
        let height = height.max(1);
        let Some(pixels) = opaque_black(width, height) else {
            log::warn!(
                "cannot resize surface to {}x{}, keeping {}x{}",
                width,
                height,
                self.width,
                self.height
            );
            return false;
        };
        let depth = match self.depth {
            Some(_) => match far_depth(width, height) {
                Some(d) => Some(d),
                None => {
                    log::warn!("cannot allocate a {}x{} depth buffer", width, height);
                    return false;
                },
            },
            None => None,
        };
        self.width = width;
        self.height = height;
        self.pixels = pixels;
        self.depth = depth;
        if let Some(c) = self.clip {
            self.clip = Some(ClipRect::clamped(c.x, c.y, c.w, c.h, width, height));
        }
        self.dirty = DirtyRect::Empty;
        log::debug!("surface resized to {}x{}", width, height);
        true
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    #[inline]
    fn in_clip(&self, x: i32, y: i32) -> bool {
        self.clip.map_or(true, |c| c.contains(x, y))
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        self.depth_index(x, y) * 4
    }

    #[inline]
    fn depth_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    // ========================================================================
    // Color writes
    // ========================================================================

    /// Blend `src` into (x, y) using the active blend mode.
    /// Silently dropped when out of bounds or outside the clip rect.
    #[inline]
    pub fn write_pixel(&mut self, x: i32, y: i32, src: Color) {
        if !self.in_bounds(x, y) || !self.in_clip(x, y) {
            return;
        }
        let idx = self.pixel_index(x as u32, y as u32);
        let px = &mut self.pixels[idx..idx + 4];
        let dst = Color::rgba(px[0], px[1], px[2], px[3]);
        let out = self.blend.apply(src, dst);
        px.copy_from_slice(&[out.r, out.g, out.b, out.a]);
        self.dirty.include(x, y);
    }

    /// Read a pixel, None if out of bounds
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.pixel_index(x as u32, y as u32);
        let p = &self.pixels[idx..idx + 4];
        Some(Color::rgba(p[0], p[1], p[2], p[3]))
    }

    /// Read a pixel, opaque black if out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Color {
        self.pixel(x, y).unwrap_or_default()
    }

    /// Fill every pixel with `c`, ignoring clip and blend. Marks the whole surface dirty.
    pub fn clear_color(&mut self, c: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        self.mark_all_dirty();
    }

    /// Copy an image with its top-left at (dst_x, dst_y), alpha-blended or overwritten.
    /// The active blend mode is restored afterwards.
    pub fn blit_image(&mut self, img: &Image, dst_x: i32, dst_y: i32, alpha_blend: bool) {
        if !img.is_valid() {
            return;
        }
        let saved = self.blend;
        self.blend = if alpha_blend {
            BlendMode::Alpha
        } else {
            BlendMode::Overwrite
        };

        for sy in 0..img.height() as i32 {
            let dy = dst_y.saturating_add(sy);
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            for sx in 0..img.width() as i32 {
                let dx = dst_x.saturating_add(sx);
                if dx < 0 || dx >= self.width as i32 {
                    continue;
                }
                self.write_pixel(dx, dy, img.texel(sx as u32, sy as u32));
            }
        }

        self.blend = saved;
        self.mark_dirty_rect(dst_x, dst_y, img.width() as i32, img.height() as i32);
    }

    // ========================================================================
    // Depth Buffer
    // ========================================================================

    /// Attach (reset to far) or drop the depth buffer.
    /// Depth stays off if the buffer cannot be allocated.
    pub fn enable_depth(&mut self, enabled: bool) {
        self.depth = if enabled { far_depth(self.width, self.height) } else { None };
        if enabled && self.depth.is_none() {
            log::warn!("cannot allocate a {}x{} depth buffer", self.width, self.height);
        }
    }

    #[inline]
    pub fn depth_enabled(&self) -> bool {
        self.depth.is_some()
    }

    /// Reset every depth value to `z`. No-op if depth is disabled.
    pub fn clear_depth(&mut self, z: f32) {
        if let Some(ref mut d) = self.depth {
            d.fill(z);
        }
    }

    /// Read depth value at (x, y). None if out of bounds or depth disabled.
    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.depth
            .as_ref()
            .map(|d| d[self.depth_index(x as u32, y as u32)])
    }

    /// Depth test with write-on-pass. Smaller z is nearer.
    /// Returns false when depth is off, (x, y) is out of bounds or clipped,
    /// `z` is NaN, or the stored depth is not farther than `z`.
    #[inline]
    pub fn depth_test_write(&mut self, x: i32, y: i32, z: f32) -> bool {
        if !self.in_bounds(x, y) || !self.in_clip(x, y) || z.is_nan() {
            return false;
        }
        let pi = self.depth_index(x as u32, y as u32);
        match self.depth {
            Some(ref mut d) if z < d[pi] => {
                d[pi] = z;
                true
            },
            _ => false,
        }
    }

    // ========================================================================
    // State
    // ========================================================================

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    /// Restrict writes to (x, y, w, h), clamped to the surface
    pub fn set_clip_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.clip = Some(ClipRect::clamped(x, y, w, h, self.width, self.height));
    }

    pub fn disable_clip_rect(&mut self) {
        self.clip = None;
    }

    #[inline]
    pub fn clip_rect(&self) -> Option<ClipRect> {
        self.clip
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    #[inline]
    pub fn dirty(&self) -> DirtyRect {
        self.dirty
    }

    /// Called by the owner after a present or save
    pub fn reset_dirty(&mut self) {
        self.dirty = DirtyRect::Empty;
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = DirtyRect::full(self.width, self.height);
    }

    /// Extend the dirty box by the four corners of (x, y, w, h).
    /// Corners that fall outside the surface are ignored.
    pub fn mark_dirty_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let x1 = x.saturating_add(w).saturating_sub(1);
        let y1 = y.saturating_add(h).saturating_sub(1);
        let corners = [(x, y), (x1, y), (x, y1), (x1, y1)];
        for (cx, cy) in corners {
            if self.in_bounds(cx, cy) {
                self.dirty.include(cx, cy);
            }
        }
    }

    // ========================================================================
    // Raw access
    // ========================================================================

    /// Raw RGBA bytes, `width * height * 4` long
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to raw pixels. Marks the whole surface dirty.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.mark_all_dirty();
        &mut self.pixels
    }
}

/// Element count for a `width x height` buffer, None above the size limit
fn buffer_len(width: u32, height: u32, per_pixel: usize) -> Option<usize> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return None;
    }
    (width as usize).checked_mul(height as usize)?.checked_mul(per_pixel)
}

/// `len` copies of `value`, None if the allocation fails
fn try_filled<T: Clone>(len: usize, value: T) -> Option<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).ok()?;
    v.resize(len, value);
    Some(v)
}

fn opaque_black(width: u32, height: u32) -> Option<Vec<u8>> {
    let mut pixels = try_filled(buffer_len(width, height, 4)?, 0u8)?;
    for px in pixels.chunks_exact_mut(4) {
        px[3] = 255;
    }
    Some(pixels)
}

fn far_depth(width: u32, height: u32) -> Option<Vec<f32>> {
    try_filled(buffer_len(width, height, 1)?, DEPTH_FAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_roundtrip() {
        let mut s = PixelSurface::new(8, 8);
        let c = Color::rgba(12, 34, 56, 78);
        s.write_pixel(3, 4, c);
        assert_eq!(s.pixel(3, 4), Some(c));
    }

    #[test]
    fn test_out_of_bounds_write_is_dropped() {
        let mut s = PixelSurface::new(4, 4);
        s.write_pixel(-1, 0, Color::WHITE);
        s.write_pixel(4, 0, Color::WHITE);
        s.write_pixel(0, 4, Color::WHITE);
        assert!(s.dirty().is_empty());
        assert!(s.as_bytes().chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
        assert_eq!(s.get_pixel(100, 100), Color::BLACK);
    }

    #[test]
    fn test_clear_sets_every_pixel_and_full_dirty() {
        let mut s = PixelSurface::new(5, 3);
        let c = Color::rgba(9, 8, 7, 6);
        s.clear_color(c);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(s.pixel(x, y), Some(c));
            }
        }
        assert_eq!(s.dirty(), DirtyRect::full(5, 3));
    }

    #[test]
    fn test_resize_invariant() {
        let mut s = PixelSurface::new(2, 2);
        s.clear_color(Color::rgba(1, 2, 3, 0));
        s.resize(7, 5);
        assert_eq!(s.as_bytes().len(), 7 * 5 * 4);
        assert!(s.as_bytes().chunks_exact(4).all(|p| p[3] == 255));
        assert!(s.dirty().is_empty());
    }

    #[test]
    fn test_resize_beyond_limit_keeps_surface() {
        let mut s = PixelSurface::new(4, 3);
        s.enable_depth(true);
        s.write_pixel(1, 1, Color::WHITE);
        assert!(!s.resize(65_536, 65_536));
        assert!(!s.resize(MAX_DIMENSION + 1, 1));
        assert_eq!((s.width(), s.height()), (4, 3));
        assert_eq!(s.as_bytes().len(), 4 * 3 * 4);
        assert_eq!(s.pixel(1, 1), Some(Color::WHITE));
        assert!(s.depth_enabled());
        assert!(s.resize(5, 5));
    }

    #[test]
    fn test_new_beyond_limit_falls_back() {
        let s = PixelSurface::new(u32::MAX, 2);
        assert_eq!((s.width(), s.height()), (1, 1));
        assert_eq!(s.as_bytes(), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_mark_dirty_rect_extreme_extent() {
        let mut s = PixelSurface::new(10, 10);
        s.mark_dirty_rect(i32::MAX - 1, i32::MAX - 1, i32::MAX, i32::MAX);
        assert!(s.dirty().is_empty());
        s.mark_dirty_rect(0, 0, i32::MAX, i32::MAX);
        assert_eq!(s.dirty().as_rect(), Some((0, 0, 1, 1)));
    }

    #[test]
    fn test_zero_size_clamped() {
        let s = PixelSurface::new(0, 0);
        assert_eq!((s.width(), s.height()), (1, 1));
        assert_eq!(s.as_bytes().len(), 4);
    }

    #[test]
    fn test_clip_rect_clamps_and_filters() {
        let mut s = PixelSurface::new(10, 10);
        s.set_clip_rect(-5, 8, 100, 100);
        assert_eq!(
            s.clip_rect(),
            Some(ClipRect {
                x: 0,
                y: 8,
                w: 10,
                h: 2
            })
        );
        s.write_pixel(3, 7, Color::WHITE);
        s.write_pixel(3, 8, Color::WHITE);
        assert_eq!(s.pixel(3, 7), Some(Color::BLACK));
        assert_eq!(s.pixel(3, 8), Some(Color::WHITE));

        s.disable_clip_rect();
        s.write_pixel(3, 7, Color::WHITE);
        assert_eq!(s.pixel(3, 7), Some(Color::WHITE));
    }

    #[test]
    fn test_depth_test_write() {
        let mut s = PixelSurface::new(4, 4);
        assert!(!s.depth_test_write(1, 1, 0.5), "depth disabled");

        s.enable_depth(true);
        assert_eq!(s.depth_at(1, 1), Some(DEPTH_FAR));
        assert!(s.depth_test_write(1, 1, 0.5));
        assert!(!s.depth_test_write(1, 1, 0.5), "equal depth fails");
        assert!(!s.depth_test_write(1, 1, 0.7));
        assert!(s.depth_test_write(1, 1, 0.2));
        assert_eq!(s.depth_at(1, 1), Some(0.2));

        assert!(!s.depth_test_write(1, 1, f32::NAN));
        assert_eq!(s.depth_at(1, 1), Some(0.2));
        assert!(!s.depth_test_write(-1, 1, 0.0));

        s.set_clip_rect(0, 0, 1, 1);
        assert!(!s.depth_test_write(2, 2, 0.0));
    }

    #[test]
    fn test_clear_depth_and_disable() {
        let mut s = PixelSurface::new(2, 2);
        s.clear_depth(0.3);
        assert_eq!(s.depth_at(0, 0), None);
        s.enable_depth(true);
        s.clear_depth(0.3);
        assert_eq!(s.depth_at(1, 1), Some(0.3));
        s.enable_depth(false);
        assert!(!s.depth_enabled());
    }

    #[test]
    fn test_resize_keeps_depth_enabled() {
        let mut s = PixelSurface::new(2, 2);
        s.enable_depth(true);
        s.clear_depth(0.1);
        s.resize(3, 3);
        assert!(s.depth_enabled());
        assert_eq!(s.depth_at(2, 2), Some(DEPTH_FAR));
    }

    #[test]
    fn test_dirty_tracks_writes() {
        let mut s = PixelSurface::new(10, 10);
        s.write_pixel(2, 3, Color::WHITE);
        s.write_pixel(6, 1, Color::WHITE);
        assert_eq!(s.dirty().as_rect(), Some((2, 1, 5, 3)));
        s.reset_dirty();
        assert!(s.dirty().is_empty());
    }

    #[test]
    fn test_mark_dirty_rect_ignores_offscreen_corners() {
        let mut s = PixelSurface::new(10, 10);
        s.mark_dirty_rect(-5, -5, 8, 8);
        assert_eq!(s.dirty().as_rect(), Some((2, 2, 1, 1)));
    }

    #[test]
    fn test_blend_mode_used_by_write() {
        let mut s = PixelSurface::new(1, 1);
        s.clear_color(Color::rgb(100, 100, 100));
        s.set_blend_mode(BlendMode::Additive);
        s.write_pixel(0, 0, Color::rgba(200, 0, 50, 0));
        assert_eq!(s.pixel(0, 0), Some(Color::rgb(255, 100, 150)));
    }

    #[test]
    fn test_blit_image_restores_blend() {
        let mut s = PixelSurface::new(4, 4);
        s.set_blend_mode(BlendMode::Multiply);
        let img = Image::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 0]).unwrap();
        s.blit_image(&img, 1, 1, true);
        assert_eq!(s.blend_mode(), BlendMode::Multiply);
        assert_eq!(s.pixel(1, 1), Some(Color::rgb(255, 0, 0)));
        // fully transparent texel leaves destination color
        assert_eq!(s.pixel(2, 1), Some(Color::BLACK));
    }
}
