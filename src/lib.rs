//! softraster: a CPU software rasterizer
//!
//! Draws 2D primitives and perspective-correct textured meshes into an RGBA
//! framebuffer with optional depth testing, blending and clipping, then runs
//! a bloom and tone-mapping pass before presentation or PNG capture.
//!
//! ```no_run
//! use softraster::{AssetRegistry, Color, RenderContext};
//!
//! let mut ctx = RenderContext::new(320, 180, AssetRegistry::new());
//! ctx.surface_mut().clear_color(Color::BLACK);
//! ctx.surface_mut().draw_circle(160, 90, 40, Color::rgb(255, 200, 40), true, 1);
//! ctx.save_frame(true).ok();
//! ```

pub mod assets;
pub mod capture;
pub mod command;
pub mod config;
pub mod context;
pub mod control;
pub mod error;
pub mod logging;
pub mod math3d;
pub mod mesh;
pub mod mqtt;
pub mod post;
pub mod raster;
pub mod script;
pub mod surface;
pub mod texture;
pub mod util;

pub use assets::AssetRegistry;
pub use capture::CaptureTarget;
pub use command::{Command, CommandOutput};
pub use config::EngineConfig;
pub use context::{FrameView, HostServices, RenderContext};
pub use error::{RenderError, ScriptError};
pub use math3d::{Mat4, Vec2, Vec3, Vec4};
pub use mesh::{draw_mesh, Mesh, Vertex3D};
pub use post::{BloomSettings, PostProcessSettings, PostProcessor, ToneSettings};
pub use surface::{BlendMode, Color, PixelSurface};
pub use texture::Image;
