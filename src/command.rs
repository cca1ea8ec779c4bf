//! Typed command surface over [`RenderContext`]
//!
//! Every operation a remote or scripted caller may issue is one `Command`
//! variant; `RenderContext::execute` applies it and returns a `CommandOutput`.

use serde::Serialize;

use crate::context::{HostServices, RenderContext};
use crate::error::RenderError;
use crate::math3d::{Mat4, Vec2, Vec3};
use crate::surface::{BlendMode, Color};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // --- framebuffer state ---
    FbWidth,
    FbHeight,
    ResizeFramebuffer { width: i32, height: i32 },
    EnableDepth(bool),
    DepthEnabled,
    SetBlendMode(BlendMode),
    BlendMode,
    SetClipRect { x: i32, y: i32, w: i32, h: i32 },
    DisableClipRect,
    ClearColor(Color),
    ClearDepth(f32),

    // --- presentation and capture ---
    Present { apply_post: bool },
    SetCaptureFilepath(String),
    SetFrameIndex(u64),
    FrameIndex,
    NextFrame,
    SaveFramePng { apply_post: bool },

    // --- 2D ---
    SetPixel { x: i32, y: i32, color: Color },
    GetPixel { x: i32, y: i32 },
    DrawLine { x0: i32, y0: i32, x1: i32, y1: i32, color: Color, thickness: i32 },
    DrawRect { x: i32, y: i32, w: i32, h: i32, color: Color, filled: bool, thickness: i32 },
    DrawCircle { cx: i32, cy: i32, radius: i32, color: Color, filled: bool, thickness: i32 },
    DrawTriangleOutline { a: Vec2, b: Vec2, c: Vec2, color: Color, thickness: i32 },
    DrawTriangleFilled { a: Vec2, b: Vec2, c: Vec2, color: Color },
    DrawTriangleGradient { a: Vec2, ca: Color, b: Vec2, cb: Color, c: Vec2, cc: Color },
    DrawTriangleTexturedNamed {
        a: Vec2,
        ua: Vec2,
        b: Vec2,
        ub: Vec2,
        c: Vec2,
        uc: Vec2,
        texture: String,
        tint: Color,
    },

    // --- matrices ---
    Mat4Identity,
    Mat4Mul(Mat4, Mat4),
    Mat4Translate(Vec3),
    Mat4Scale(Vec3),
    Mat4RotateX(f32),
    Mat4RotateY(f32),
    Mat4RotateZ(f32),
    Mat4Perspective { fovy: f32, aspect: f32, near: f32, far: f32 },
    Mat4LookAt { eye: Vec3, target: Vec3, up: Vec3 },

    // --- assets ---
    TexMakeChecker { name: String, width: i32, height: i32, cell: i32 },
    TexLoad { name: String, path: String },
    TexDelete(String),
    TexExists(String),
    TexFromFramebuffer(String),
    MeshMakeCube { name: String, size: f32 },
    MeshDelete(String),
    MeshExists(String),
    DrawMeshNamed { mesh: String, mvp: Mat4, texture: Option<String>, depth_test: bool },

    // --- post-process ---
    PpSetBloom { enabled: bool, threshold: f32, intensity: f32, downsample: i32, sigma: f32 },
    PpSetTone { enabled: bool, exposure: f32, gamma: f32 },
    PpReset,
}

/// Value produced by a command
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutput {
    None,
    Bool(bool),
    Int(i64),
    U64(u64),
    Color(Color),
    Mat4(Mat4),
    BlendMode(BlendMode),
}

impl<H: HostServices> RenderContext<H> {
    /// Apply one command
    pub fn execute(&mut self, cmd: Command) -> Result<CommandOutput, RenderError> {
        use CommandOutput as Out;

        let out = match cmd {
            Command::FbWidth => Out::Int(self.surface().width() as i64),
            Command::FbHeight => Out::Int(self.surface().height() as i64),
            Command::ResizeFramebuffer { width, height } => {
                Out::Bool(self.resize(width.max(1) as u32, height.max(1) as u32))
            },
            Command::EnableDepth(on) => {
                self.surface_mut().enable_depth(on);
                Out::None
            },
            Command::DepthEnabled => Out::Bool(self.surface().depth_enabled()),
            Command::SetBlendMode(mode) => {
                self.surface_mut().set_blend_mode(mode);
                Out::None
            },
            Command::BlendMode => Out::BlendMode(self.surface().blend_mode()),
            Command::SetClipRect { x, y, w, h } => {
                self.surface_mut().set_clip_rect(x, y, w, h);
                Out::None
            },
            Command::DisableClipRect => {
                self.surface_mut().disable_clip_rect();
                Out::None
            },
            Command::ClearColor(c) => {
                self.surface_mut().clear_color(c);
                Out::None
            },
            Command::ClearDepth(z) => {
                self.surface_mut().clear_depth(z);
                Out::None
            },

            Command::Present { apply_post } => Out::Bool(self.present(apply_post)),
            Command::SetCaptureFilepath(path) => {
                self.set_capture_path(path);
                Out::None
            },
            Command::SetFrameIndex(i) => {
                self.set_frame_index(i);
                Out::None
            },
            Command::FrameIndex => Out::U64(self.frame_index()),
            Command::NextFrame => {
                self.next_frame();
                Out::None
            },
            Command::SaveFramePng { apply_post } => {
                self.save_frame(apply_post)?;
                Out::None
            },

            Command::SetPixel { x, y, color } => {
                self.surface_mut().write_pixel(x, y, color);
                Out::None
            },
            Command::GetPixel { x, y } => Out::Color(self.surface().get_pixel(x, y)),
            Command::DrawLine { x0, y0, x1, y1, color, thickness } => {
                self.surface_mut().draw_line(x0, y0, x1, y1, color, thickness);
                Out::None
            },
            Command::DrawRect { x, y, w, h, color, filled, thickness } => {
                self.surface_mut().draw_rect(x, y, w, h, color, filled, thickness);
                Out::None
            },
            Command::DrawCircle { cx, cy, radius, color, filled, thickness } => {
                self.surface_mut().draw_circle(cx, cy, radius, color, filled, thickness);
                Out::None
            },
            Command::DrawTriangleOutline { a, b, c, color, thickness } => {
                self.surface_mut().draw_triangle_outline(a, b, c, color, thickness);
                Out::None
            },
            Command::DrawTriangleFilled { a, b, c, color } => {
                self.surface_mut().draw_triangle_filled(a, b, c, color);
                Out::None
            },
            Command::DrawTriangleGradient { a, ca, b, cb, c, cc } => {
                self.surface_mut().draw_triangle_gradient(a, ca, b, cb, c, cc);
                Out::None
            },
            Command::DrawTriangleTexturedNamed { a, ua, b, ub, c, uc, texture, tint } => {
                self.draw_triangle_textured_named(a, ua, b, ub, c, uc, &texture, tint)?;
                Out::None
            },

            Command::Mat4Identity => Out::Mat4(Mat4::identity()),
            Command::Mat4Mul(a, b) => Out::Mat4(a * b),
            Command::Mat4Translate(t) => Out::Mat4(Mat4::translate(t)),
            Command::Mat4Scale(s) => Out::Mat4(Mat4::scale(s)),
            Command::Mat4RotateX(r) => Out::Mat4(Mat4::rotate_x(r)),
            Command::Mat4RotateY(r) => Out::Mat4(Mat4::rotate_y(r)),
            Command::Mat4RotateZ(r) => Out::Mat4(Mat4::rotate_z(r)),
            Command::Mat4Perspective { fovy, aspect, near, far } => {
                Out::Mat4(Mat4::perspective(fovy, aspect, near, far))
            },
            Command::Mat4LookAt { eye, target, up } => Out::Mat4(Mat4::look_at(eye, target, up)),

            Command::TexMakeChecker { name, width, height, cell } => {
                Out::Bool(self.host_mut().tex_make_checker(&name, width, height, cell))
            },
            Command::TexLoad { name, path } => Out::Bool(self.host_mut().tex_load(&name, &path)),
            Command::TexDelete(name) => Out::Bool(self.host_mut().tex_delete(&name)),
            Command::TexExists(name) => Out::Bool(self.host().tex_exists(&name)),
            Command::TexFromFramebuffer(name) => Out::Bool(self.tex_from_framebuffer(&name)),
            Command::MeshMakeCube { name, size } => Out::Bool(self.host_mut().mesh_make_cube(&name, size)),
            Command::MeshDelete(name) => Out::Bool(self.host_mut().mesh_delete(&name)),
            Command::MeshExists(name) => Out::Bool(self.host().mesh_exists(&name)),
            Command::DrawMeshNamed { mesh, mvp, texture, depth_test } => {
                self.draw_mesh_named(&mesh, &mvp, texture.as_deref(), depth_test)?;
                Out::None
            },

            Command::PpSetBloom { enabled, threshold, intensity, downsample, sigma } => {
                self.postprocess_mut().set_bloom(enabled, threshold, intensity, downsample, sigma);
                Out::None
            },
            Command::PpSetTone { enabled, exposure, gamma } => {
                self.postprocess_mut().set_tone(enabled, exposure, gamma);
                Out::None
            },
            Command::PpReset => {
                self.postprocess_mut().reset();
                Out::None
            },
        };
        Ok(out)
    }
}
