mod display;

use std::time::Instant;

use display::{Display, FrameTexture, InputEvent};
use sdl2::keyboard::Keycode;
use sdl2::render::TextureCreator;
use sdl2::video::WindowContext;

use softraster::config::parse_resolution;
use softraster::control::Controller;
use softraster::logging::{init_logging, LoggingConfig};
use softraster::mqtt::MqttClient;
use softraster::util::{hsv_to_rgb, FpsCounter};
use softraster::{
    AssetRegistry, Color, EngineConfig, FrameView, HostServices, Image, Mat4, Mesh, RenderContext, RenderError, Vec2,
    Vec3,
};

/// Asset storage plus an optional window
struct DemoHost<'a> {
    assets: AssetRegistry,
    window: Option<(Display, &'a TextureCreator<WindowContext>)>,
    target: Option<FrameTexture<'a>>,
}

impl HostServices for DemoHost<'_> {
    fn texture(&self, name: &str) -> Option<&Image> {
        self.assets.texture(name)
    }

    fn mesh(&self, name: &str) -> Option<&Mesh> {
        self.assets.mesh(name)
    }

    fn insert_texture(&mut self, name: &str, image: Image) {
        self.assets.insert_texture(name, image);
    }

    fn remove_texture(&mut self, name: &str) -> bool {
        self.assets.remove_texture(name)
    }

    fn insert_mesh(&mut self, name: &str, mesh: Mesh) {
        self.assets.insert_mesh(name, mesh);
    }

    fn remove_mesh(&mut self, name: &str) -> bool {
        self.assets.remove_mesh(name)
    }

    /// Headless runs never present
    fn supports(&self, width: u32, height: u32) -> bool {
        self.window.as_ref().is_some_and(|(d, _)| d.supports(width, height))
    }

    fn present(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let Some((display, creator)) = self.window.as_mut() else {
            return Ok(());
        };
        if !self.target.as_ref().is_some_and(|t| t.matches(frame)) {
            if !display.supports(frame.width(), frame.height()) {
                return Err(RenderError::Present(format!(
                    "{}x{} exceeds the renderer's texture limit",
                    frame.width(),
                    frame.height()
                )));
            }
            self.target = Some(FrameTexture::with_size(*creator, frame.width(), frame.height())?);
        }
        match self.target.as_mut() {
            Some(target) => display.present(target, frame),
            None => Ok(()),
        }
    }
}

struct Options {
    config: EngineConfig,
    frames: Option<u64>,
}

/// Parse command line arguments on top of an optional config file
fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = std::env::args().collect();

    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].clone());
    let mut config = match config_path {
        Some(path) => EngineConfig::load(&path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    let mut frames = None;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--no-vsync", _) => config.vsync = false,
            ("--headless", _) => config.headless = true,
            ("--socket", _) => config.socket = true,
            ("--mqtt", _) => config.mqtt = true,
            ("--config", Some(_)) => i += 1,
            ("--width" | "-w", Some(v)) => {
                if let Ok(w) = v.parse() {
                    config.width = w;
                }
                i += 1;
            },
            ("--height" | "-h", Some(v)) => {
                if let Ok(h) = v.parse() {
                    config.height = h;
                }
                i += 1;
            },
            ("--resolution" | "-r", Some(v)) => {
                match parse_resolution(v) {
                    Some((w, h)) => {
                        config.width = w;
                        config.height = h;
                    },
                    None => log::warn!("ignoring resolution {:?}", v),
                }
                i += 1;
            },
            ("--capture", Some(v)) => {
                config.capture_path.clone_from(v);
                i += 1;
            },
            ("--frames", Some(v)) => {
                frames = v.parse().ok();
                i += 1;
            },
            ("--help", _) => {
                print_help();
                std::process::exit(0);
            },
            (other, _) => log::warn!("ignoring argument {:?}", other),
        }
        i += 1;
    }

    Ok(Options {
        config: config.validated(),
        frames,
    })
}

fn print_help() {
    let d = EngineConfig::default();
    println!("Usage: softraster [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config PATH          Load settings from a JSON file");
    println!("  --width W, -w W        Framebuffer width (default: {})", d.width);
    println!("  --height H, -h H       Framebuffer height (default: {})", d.height);
    println!("  --resolution WxH, -r WxH  Framebuffer resolution");
    println!("  --capture PATH         Capture directory or file-name hint (default: {})", d.capture_path);
    println!("  --frames N             Stop after N frames");
    println!("  --headless             No window; every frame is saved as PNG");
    println!("  --socket               Accept JSON commands on a Unix socket");
    println!("  --mqtt                 Accept JSON commands from MQTT");
    println!("  --no-vsync             Disable VSync for uncapped framerate");
    println!("  --help                 Show this help message");
}

/// Spinning textured cube over a hue-cycling 2D backdrop
fn render_demo<H: HostServices>(ctx: &mut RenderContext<H>, t: f32) -> Result<(), RenderError> {
    let (w, h) = (ctx.surface().width() as i32, ctx.surface().height() as i32);
    let surface = ctx.surface_mut();

    surface.clear_color(Color::rgb(8, 8, 16));
    surface.clear_depth(1.0);

    let (fw, fh) = (w as f32, h as f32);
    surface.draw_triangle_gradient(
        Vec2::new(0.0, fh),
        hsv_to_rgb(t * 40.0, 0.8, 0.5),
        Vec2::new(fw, fh),
        hsv_to_rgb(t * 40.0 + 120.0, 0.8, 0.5),
        Vec2::new(fw * 0.5, fh * 0.55),
        Color::BLACK,
    );
    surface.draw_circle(w / 6, h / 4, h / 8, Color::rgb(255, 220, 120), true, 1);
    surface.draw_rect(4, 4, w - 8, h - 8, Color::rgb(60, 60, 90), false, 2);

    let aspect = fw / fh;
    let mvp = Mat4::perspective(1.0, aspect, 0.1, 100.0)
        * Mat4::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0))
        * Mat4::rotate_y(t * 0.9)
        * Mat4::rotate_x(t * 0.6);
    ctx.draw_mesh_named("cube", &mvp, Some("checker"), true)
}

fn main() -> Result<(), String> {
    init_logging(LoggingConfig::default());
    let opts = parse_args()?;
    let cfg = opts.config;

    let sdl = if cfg.headless {
        None
    } else {
        let (dw, dh) = cfg.display_size();
        Some(Display::with_options(&cfg.title, dw, dh, cfg.vsync, cfg.present_linear)?)
    };
    let (display, creator) = match sdl {
        Some((display, creator)) => (Some(display), Some(creator)),
        None => (None, None),
    };

    let host = DemoHost {
        assets: AssetRegistry::new(),
        window: display.zip(creator.as_ref()),
        target: None,
    };
    let mut ctx = RenderContext::new(cfg.width, cfg.height, host);
    ctx.surface_mut().enable_depth(cfg.depth);
    ctx.set_postprocess(cfg.postprocess);
    ctx.set_capture_path(&cfg.capture_path);

    let fits = ctx.host().supports(ctx.surface().width(), ctx.surface().height());
    ctx.set_presentation_available(fits);

    ctx.host_mut().tex_make_checker("checker", 64, 64, 8);
    ctx.host_mut().mesh_make_cube("cube", 1.0);

    let controller = if cfg.socket { Some(Controller::new()?) } else { None };
    let mqtt = if cfg.mqtt {
        match MqttClient::new(&cfg.mqtt_host, cfg.mqtt_port, &cfg.mqtt_topic) {
            Ok(client) => Some(client),
            Err(e) => {
                log::warn!("{}", e);
                None
            },
        }
    } else {
        None
    };

    log::info!(
        "framebuffer {}x{}, {}",
        cfg.width,
        cfg.height,
        if cfg.headless { "headless" } else { "windowed" }
    );

    let frames = opts.frames.or(cfg.headless.then_some(1));
    let mut fps = FpsCounter::new(60);
    let mut apply_post = true;
    let mut paused = false;
    let start = Instant::now();
    let mut anim_t = 0.0f32;

    'main: loop {
        let (dt, _) = fps.tick();

        let events = match ctx.host_mut().window.as_mut() {
            Some((display, _)) => display.poll_events(),
            None => Vec::new(),
        };
        for event in events {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::Space) => paused = !paused,
                InputEvent::KeyDown(Keycode::P) => apply_post = !apply_post,
                InputEvent::KeyDown(Keycode::B) => {
                    let bloom = &mut ctx.postprocess_mut().bloom;
                    bloom.enabled = !bloom.enabled;
                },
                InputEvent::KeyDown(Keycode::S) => {
                    if let Err(e) = ctx.save_frame(apply_post) {
                        log::warn!("capture failed: {}", e);
                    }
                },
                _ => {},
            }
        }

        if !paused {
            anim_t += dt;
        }
        if let Err(e) = render_demo(&mut ctx, anim_t) {
            log::warn!("{}", e);
        }

        if let Some(ctl) = &controller {
            for req in ctl.poll() {
                let result = ctx.execute(req.command.clone());
                req.respond(result);
            }
        }
        if let Some(client) = &mqtt {
            for cmd in client.poll() {
                if let Err(e) = ctx.execute(cmd) {
                    log::warn!("MQTT command failed: {}", e);
                }
            }
        }

        if cfg.headless {
            ctx.save_frame(apply_post).map_err(|e| e.to_string())?;
        } else {
            ctx.present(apply_post);
        }
        ctx.next_frame();

        if frames.is_some_and(|n| ctx.frame_index() >= n) {
            break;
        }
    }

    let (p1, p50, p99) = fps.percentiles_ms();
    log::info!(
        "{} frames in {:.1}s, avg {:.1} fps (p1 {:.1}ms, p50 {:.1}ms, p99 {:.1}ms)",
        ctx.frame_index(),
        start.elapsed().as_secs_f32(),
        fps.avg_fps(),
        p1,
        p50,
        p99
    );
    Ok(())
}
