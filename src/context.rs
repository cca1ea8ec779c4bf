//! Render context: the explicit owner of all engine state
//!
//! Holds the surface, post-process settings and buffers, frame counter,
//! capture target and a host that resolves named assets and presents frames.

use std::path::PathBuf;

use crate::capture::{save_png, CaptureTarget};
use crate::error::RenderError;
use crate::math3d::{Mat4, Vec2};
use crate::mesh::{draw_mesh, Mesh};
use crate::post::{PostProcessSettings, PostProcessor};
use crate::surface::{Color, PixelSurface, MAX_DIMENSION};
use crate::texture::Image;

// ============================================================================
// FrameView
// ============================================================================

/// Borrowed view of a finished frame: tightly packed RGBA8, top row first
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    bytes: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameView<'a> {
    pub fn new(bytes: &'a [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(bytes.len(), width as usize * height as usize * 4);
        Self { bytes, width, height }
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
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

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ============================================================================
// HostServices
// ============================================================================

/// Services the embedding application provides: named asset storage and an
/// optional presentation target.
pub trait HostServices {
    fn texture(&self, name: &str) -> Option<&Image>;
    fn mesh(&self, name: &str) -> Option<&Mesh>;
    fn insert_texture(&mut self, name: &str, image: Image);
    fn remove_texture(&mut self, name: &str) -> bool;
    fn insert_mesh(&mut self, name: &str, mesh: Mesh);
    fn remove_mesh(&mut self, name: &str) -> bool;

    /// Whether a frame of this size can be presented
    fn supports(&self, _width: u32, _height: u32) -> bool {
        true
    }

    /// Show a finished frame. Hosts without a display accept and drop it.
    fn present(&mut self, _frame: &FrameView<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    /// Store a checkerboard texture. False if any dimension is not positive
    /// or a side exceeds `MAX_DIMENSION`.
    fn tex_make_checker(&mut self, name: &str, width: i32, height: i32, cell: i32) -> bool {
        let side = 1..=MAX_DIMENSION as i32;
        if !side.contains(&width) || !side.contains(&height) || cell <= 0 {
            return false;
        }
        let img = Image::checker(width as u32, height as u32, cell as u32);
        let ok = img.is_valid();
        self.insert_texture(name, img);
        ok
    }

    /// Decode an image file into a named texture. Failures are logged, not fatal.
    fn tex_load(&mut self, name: &str, path: &str) -> bool {
        match Image::load_png(path) {
            Ok(img) if img.is_valid() => {
                log::debug!("loaded texture {:?} from {}", name, path);
                self.insert_texture(name, img);
                true
            },
            Ok(_) => {
                log::warn!("texture {} decoded to an empty image", path);
                false
            },
            Err(e) => {
                log::warn!("failed to load texture {}: {}", path, e);
                false
            },
        }
    }

    fn tex_delete(&mut self, name: &str) -> bool {
        self.remove_texture(name)
    }

    /// Present and valid
    fn tex_exists(&self, name: &str) -> bool {
        self.texture(name).is_some_and(Image::is_valid)
    }

    /// Store the demo cube; non-positive sizes become 1
    fn mesh_make_cube(&mut self, name: &str, size: f32) -> bool {
        self.insert_mesh(name, Mesh::cube(size));
        true
    }

    fn mesh_delete(&mut self, name: &str) -> bool {
        self.remove_mesh(name)
    }

    fn mesh_exists(&self, name: &str) -> bool {
        self.mesh(name).is_some()
    }
}

// ============================================================================
// RenderContext
// ============================================================================

/// One framebuffer plus everything needed to draw into it, post-process it,
/// present it and capture it
pub struct RenderContext<H> {
    surface: PixelSurface,
    post: PostProcessor,
    settings: PostProcessSettings,
    frame_index: u64,
    capture: CaptureTarget,
    can_present: bool,
    host: H,
}

impl<H: HostServices> RenderContext<H> {
    pub fn new(width: u32, height: u32, host: H) -> Self {
        Self {
            surface: PixelSurface::new(width, height),
            post: PostProcessor::new(),
            settings: PostProcessSettings::default(),
            frame_index: 0,
            capture: CaptureTarget::default(),
            can_present: true,
            host,
        }
    }

    #[inline]
    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut PixelSurface {
        &mut self.surface
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    #[inline]
    pub fn postprocess(&self) -> &PostProcessSettings {
        &self.settings
    }

    #[inline]
    pub fn postprocess_mut(&mut self) -> &mut PostProcessSettings {
        &mut self.settings
    }

    pub fn set_postprocess(&mut self, settings: PostProcessSettings) {
        self.settings = settings;
    }

    /// Destructive resize; also drops post-process buffers and asks the host
    /// whether the new size can be presented.
    ///
    /// A size the surface cannot allocate leaves the frame as it was and
    /// disables presentation. Returns whether the surface was resized.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.surface.resize(width, height) {
            log::warn!("resize to {}x{} rejected", width, height);
            self.set_presentation_available(false);
            return false;
        }
        self.post.reset();
        let fits = self.host.supports(self.surface.width(), self.surface.height());
        self.set_presentation_available(fits);
        true
    }

    // ========================================================================
    // Presentation capability
    // ========================================================================

    /// Set by the output adapter, e.g. false when the frame exceeds the
    /// display's texture size limit
    pub fn set_presentation_available(&mut self, available: bool) {
        if self.can_present != available {
            log::info!("presentation {}", if available { "enabled" } else { "disabled" });
        }
        self.can_present = available;
    }

    #[inline]
    pub fn can_present(&self) -> bool {
        self.can_present
    }

    // ========================================================================
    // Frame output
    // ========================================================================

    /// Raw or post-processed bytes of the current frame
    pub fn frame(&mut self, apply_post: bool) -> FrameView<'_> {
        let (w, h) = (self.surface.width(), self.surface.height());
        let bytes = if apply_post && self.post.run(&mut self.surface, &self.settings) {
            self.post.output()
        } else {
            self.surface.as_bytes()
        };
        FrameView::new(bytes, w, h)
    }

    /// Hand the frame to the host. Skipped when presentation is unavailable;
    /// a host failure disables presentation instead of propagating.
    /// Returns whether a frame was presented.
    pub fn present(&mut self, apply_post: bool) -> bool {
        if !self.can_present {
            return false;
        }
        let (w, h) = (self.surface.width(), self.surface.height());
        let bytes = if apply_post && self.post.run(&mut self.surface, &self.settings) {
            self.post.output()
        } else {
            self.surface.as_bytes()
        };
        let frame = FrameView::new(bytes, w, h);

        match self.host.present(&frame) {
            Ok(()) => {
                self.surface.reset_dirty();
                true
            },
            Err(e) => {
                log::warn!("{}; continuing without presentation", e);
                self.can_present = false;
                false
            },
        }
    }

    // ========================================================================
    // Capture
    // ========================================================================

    /// Path ending in an extension is a file-name hint, anything else a directory
    pub fn set_capture_path(&mut self, path: impl Into<PathBuf>) {
        self.capture = CaptureTarget::from_path(path);
    }

    #[inline]
    pub fn capture_target(&self) -> &CaptureTarget {
        &self.capture
    }

    /// Write the current frame as PNG to the path for the current frame index
    pub fn save_frame(&mut self, apply_post: bool) -> Result<PathBuf, RenderError> {
        let path = self.capture.resolve(self.frame_index);
        let frame = self.frame(apply_post);
        save_png(&frame, &path)?;
        self.surface.reset_dirty();
        log::info!("saved {}", path.display());
        Ok(path)
    }

    pub fn set_frame_index(&mut self, index: u64) {
        self.frame_index = index;
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn next_frame(&mut self) {
        self.frame_index += 1;
    }

    // ========================================================================
    // Named-asset draws
    // ========================================================================

    /// Snapshot the raw framebuffer into a named texture
    pub fn tex_from_framebuffer(&mut self, name: &str) -> bool {
        let img = Image::from_surface(&self.surface);
        self.host.insert_texture(name, img);
        true
    }

    pub fn draw_triangle_textured_named(
        &mut self,
        a: Vec2,
        ua: Vec2,
        b: Vec2,
        ub: Vec2,
        c: Vec2,
        uc: Vec2,
        texture: &str,
        tint: Color,
    ) -> Result<(), RenderError> {
        let tex = self
            .host
            .texture(texture)
            .ok_or_else(|| RenderError::UnknownTexture(texture.to_string()))?;
        self.surface.draw_triangle_textured(a, ua, b, ub, c, uc, tex, tint);
        Ok(())
    }

    /// Draw a registered mesh. An empty texture name means untextured.
    pub fn draw_mesh_named(
        &mut self,
        mesh: &str,
        mvp: &Mat4,
        texture: Option<&str>,
        depth_test: bool,
    ) -> Result<(), RenderError> {
        let m = self
            .host
            .mesh(mesh)
            .ok_or_else(|| RenderError::UnknownMesh(mesh.to_string()))?;
        let tex = match texture.filter(|t| !t.is_empty()) {
            Some(name) => Some(
                self.host
                    .texture(name)
                    .ok_or_else(|| RenderError::UnknownTexture(name.to_string()))?,
            ),
            None => None,
        };
        draw_mesh(&mut self.surface, &m.vertices, &m.indices, mvp, tex, depth_test);
        Ok(())
    }
}
