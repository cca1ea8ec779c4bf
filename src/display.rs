//! SDL2 window presenter
//!
//! Uploads finished frames into a streaming texture and stretches it over the
//! window. A framebuffer larger than the renderer's texture limit cannot be
//! shown; callers check `supports` and report it through the render context.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use softraster::{FrameView, RenderError};

// RGBA byte order on little-endian hosts
const FRAME_FORMAT: PixelFormatEnum = PixelFormatEnum::ABGR8888;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    max_texture: (u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

impl Display {
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
        linear: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        sdl2::hint::set("SDL_RENDER_SCALE_QUALITY", if linear { "1" } else { "0" });

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        let info = canvas.info();
        let max_texture = (info.max_texture_width, info.max_texture_height);
        log::debug!("renderer {} max texture {}x{}", info.name, max_texture.0, max_texture.1);

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((
            Self {
                canvas,
                event_pump,
                max_texture,
            },
            texture_creator,
        ))
    }

    /// Whether a framebuffer of this size fits in one texture. Zero limits mean unbounded.
    pub fn supports(&self, width: u32, height: u32) -> bool {
        let (mw, mh) = self.max_texture;
        (mw == 0 || width <= mw) && (mh == 0 || height <= mh)
    }

    pub fn present(&mut self, target: &mut FrameTexture<'_>, frame: &FrameView<'_>) -> Result<(), RenderError> {
        target
            .texture
            .update(None, frame.bytes(), frame.stride())
            .map_err(|e| RenderError::Present(e.to_string()))?;
        self.canvas.clear();
        self.canvas
            .copy(&target.texture, None, None)
            .map_err(RenderError::Present)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.event_pump
            .poll_iter()
            .filter_map(|event| match event {
                Event::Quit { .. } => Some(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => Some(InputEvent::KeyDown(k)),
                _ => None,
            })
            .collect()
    }
}

/// Streaming texture matching the framebuffer size
pub struct FrameTexture<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

impl<'a> FrameTexture<'a> {
    pub fn with_size(creator: &'a TextureCreator<WindowContext>, width: u32, height: u32) -> Result<Self, RenderError> {
        let texture = creator
            .create_texture_streaming(FRAME_FORMAT, width, height)
            .map_err(|e| RenderError::Present(e.to_string()))?;
        Ok(Self { texture, width, height })
    }

    pub fn matches(&self, frame: &FrameView<'_>) -> bool {
        self.width == frame.width() && self.height == frame.height()
    }
}
