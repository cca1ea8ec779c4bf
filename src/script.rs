//! JSON command shim
//!
//! Turns loosely typed command arrays such as `["draw_line", 0, 0, 10, 10,
//! [255, 0, 0]]` into [`Command`] values. Arguments are positional; index 1
//! is the first argument after the op name. Results go back out through
//! [`output_to_json`].

use serde_json::{json, Value};

use crate::command::{Command, CommandOutput};
use crate::error::ScriptError;
use crate::math3d::{Mat4, Vec2, Vec3};
use crate::surface::{BlendMode, Color};

/// Parse one JSON text holding a command array
pub fn parse_line(line: &str) -> Result<Command, ScriptError> {
    let value: Value = serde_json::from_str(line.trim())?;
    parse_command(&value)
}

/// Parse a payload that is either one command array or an array of them
pub fn parse_batch(value: &Value) -> Result<Vec<Command>, ScriptError> {
    match value {
        Value::Array(items) if items.first().is_some_and(Value::is_array) => {
            items.iter().map(parse_command).collect()
        },
        _ => parse_command(value).map(|c| vec![c]),
    }
}

/// Parse a `[op, args...]` array into a typed command
pub fn parse_command(value: &Value) -> Result<Command, ScriptError> {
    let items = value.as_array().ok_or(ScriptError::MissingOp)?;
    let op = items.first().and_then(Value::as_str).ok_or(ScriptError::MissingOp)?;
    let a = Args { op, items };

    let cmd = match op {
        "fb_width" => Command::FbWidth,
        "fb_height" => Command::FbHeight,
        "resize_framebuffer" => Command::ResizeFramebuffer {
            width: a.int(1)?,
            height: a.int(2)?,
        },
        "enable_depth" => Command::EnableDepth(a.bool(1)?),
        "depth_enabled" => Command::DepthEnabled,
        "set_blend_mode" => Command::SetBlendMode(a.blend(1)?),
        "blend_mode" => Command::BlendMode,
        "set_clip_rect" => Command::SetClipRect {
            x: a.int(1)?,
            y: a.int(2)?,
            w: a.int(3)?,
            h: a.int(4)?,
        },
        "disable_clip_rect" => Command::DisableClipRect,
        "clear_color" => Command::ClearColor(a.color(1)?),
        "clear_depth" => Command::ClearDepth(a.float_or(1, 1.0)?),

        "flush_to_screen" => Command::Present {
            apply_post: a.bool_or(1, true)?,
        },
        "set_capture_filepath" => Command::SetCaptureFilepath(a.string(1)?),
        "set_frame_index" => Command::SetFrameIndex(a.u64(1)?),
        "frame_index" => Command::FrameIndex,
        "next_frame" => Command::NextFrame,
        "save_frame_png" => Command::SaveFramePng {
            apply_post: a.bool_or(1, true)?,
        },

        "set_pixel" => Command::SetPixel {
            x: a.int(1)?,
            y: a.int(2)?,
            color: a.color(3)?,
        },
        "get_pixel" => Command::GetPixel {
            x: a.int(1)?,
            y: a.int(2)?,
        },
        "draw_line" => Command::DrawLine {
            x0: a.int(1)?,
            y0: a.int(2)?,
            x1: a.int(3)?,
            y1: a.int(4)?,
            color: a.color(5)?,
            thickness: a.int_or(6, 1)?,
        },
        "draw_rect" => Command::DrawRect {
            x: a.int(1)?,
            y: a.int(2)?,
            w: a.int(3)?,
            h: a.int(4)?,
            color: a.color(5)?,
            filled: a.bool_or(6, true)?,
            thickness: a.int_or(7, 1)?,
        },
        "draw_circle" => Command::DrawCircle {
            cx: a.int(1)?,
            cy: a.int(2)?,
            radius: a.int(3)?,
            color: a.color(4)?,
            filled: a.bool_or(5, true)?,
            thickness: a.int_or(6, 1)?,
        },
        "draw_triangle_outline" => Command::DrawTriangleOutline {
            a: a.vec2(1)?,
            b: a.vec2(2)?,
            c: a.vec2(3)?,
            color: a.color(4)?,
            thickness: a.int_or(5, 1)?,
        },
        "draw_triangle_filled" => Command::DrawTriangleFilled {
            a: a.vec2(1)?,
            b: a.vec2(2)?,
            c: a.vec2(3)?,
            color: a.color(4)?,
        },
        "draw_triangle_filled_grad" => Command::DrawTriangleGradient {
            a: a.vec2(1)?,
            ca: a.color(2)?,
            b: a.vec2(3)?,
            cb: a.color(4)?,
            c: a.vec2(5)?,
            cc: a.color(6)?,
        },
        "draw_triangle_textured_named" => Command::DrawTriangleTexturedNamed {
            a: a.vec2(1)?,
            ua: a.vec2(2)?,
            b: a.vec2(3)?,
            ub: a.vec2(4)?,
            c: a.vec2(5)?,
            uc: a.vec2(6)?,
            texture: a.string(7)?,
            tint: a.color_or(8, Color::WHITE)?,
        },

        "mat4_identity" => Command::Mat4Identity,
        "mat4_mul" => Command::Mat4Mul(a.mat4(1)?, a.mat4(2)?),
        "mat4_translate" => Command::Mat4Translate(a.vec3(1)?),
        "mat4_scale" => Command::Mat4Scale(a.vec3(1)?),
        "mat4_rotate_x" => Command::Mat4RotateX(a.float(1)?),
        "mat4_rotate_y" => Command::Mat4RotateY(a.float(1)?),
        "mat4_rotate_z" => Command::Mat4RotateZ(a.float(1)?),
        "mat4_perspective" => Command::Mat4Perspective {
            fovy: a.float(1)?,
            aspect: a.float(2)?,
            near: a.float(3)?,
            far: a.float(4)?,
        },
        "mat4_look_at" => Command::Mat4LookAt {
            eye: a.vec3(1)?,
            target: a.vec3(2)?,
            up: a.vec3(3)?,
        },

        "tex_make_checker" => Command::TexMakeChecker {
            name: a.string(1)?,
            width: a.int_or(2, 256)?,
            height: a.int_or(3, 256)?,
            cell: a.int_or(4, 16)?,
        },
        "tex_load" => Command::TexLoad {
            name: a.string(1)?,
            path: a.string(2)?,
        },
        "tex_delete" => Command::TexDelete(a.string(1)?),
        "tex_exists" => Command::TexExists(a.string(1)?),
        "tex_from_framebuffer" => Command::TexFromFramebuffer(a.string(1)?),
        "mesh_make_cube" => Command::MeshMakeCube {
            name: a.string(1)?,
            size: a.float_or(2, 1.0)?,
        },
        "mesh_delete" => Command::MeshDelete(a.string(1)?),
        "mesh_exists" => Command::MeshExists(a.string(1)?),
        "draw_mesh_named" => Command::DrawMeshNamed {
            mesh: a.string(1)?,
            mvp: a.mat4(2)?,
            texture: a.opt_string(3)?,
            depth_test: a.bool_or(4, true)?,
        },

        "pp_set_bloom" => Command::PpSetBloom {
            enabled: a.bool_or(1, true)?,
            threshold: a.float_or(2, 0.75)?,
            intensity: a.float_or(3, 1.25)?,
            downsample: a.int_or(4, 4)?,
            sigma: a.float_or(5, 6.0)?,
        },
        "pp_set_tone" => Command::PpSetTone {
            enabled: a.bool_or(1, true)?,
            exposure: a.float_or(2, 1.25)?,
            gamma: a.float_or(3, 2.2)?,
        },
        "pp_reset" => Command::PpReset,

        other => return Err(ScriptError::UnknownOp(other.to_string())),
    };
    Ok(cmd)
}

/// Render a command result as JSON; `None` becomes `null`
pub fn output_to_json(out: &CommandOutput) -> Value {
    match *out {
        CommandOutput::None => Value::Null,
        CommandOutput::Bool(b) => json!(b),
        CommandOutput::Int(i) => json!(i),
        CommandOutput::U64(u) => json!(u),
        CommandOutput::Color(c) => json!({ "r": c.r, "g": c.g, "b": c.b, "a": c.a }),
        CommandOutput::Mat4(m) => json!(m.to_cols_array()),
        CommandOutput::BlendMode(mode) => json!(mode.name()),
    }
}

// ============================================================================
// Argument access
// ============================================================================

struct Args<'a> {
    op: &'a str,
    items: &'a [Value],
}

impl Args<'_> {
    /// Present and not null
    fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index).filter(|v| !v.is_null())
    }

    fn required(&self, index: usize) -> Result<&Value, ScriptError> {
        self.get(index).ok_or_else(|| ScriptError::MissingArg {
            op: self.op.to_string(),
            index,
        })
    }

    fn bad(&self, index: usize, expected: &'static str) -> ScriptError {
        ScriptError::BadArg {
            op: self.op.to_string(),
            index,
            expected,
        }
    }

    fn with<T>(
        &self,
        index: usize,
        expected: &'static str,
        conv: impl Fn(&Value) -> Option<T>,
    ) -> Result<T, ScriptError> {
        let v = self.required(index)?;
        conv(v).ok_or_else(|| self.bad(index, expected))
    }

    fn with_or<T>(
        &self,
        index: usize,
        default: T,
        expected: &'static str,
        conv: impl Fn(&Value) -> Option<T>,
    ) -> Result<T, ScriptError> {
        match self.get(index) {
            Some(v) => conv(v).ok_or_else(|| self.bad(index, expected)),
            None => Ok(default),
        }
    }

    fn int(&self, index: usize) -> Result<i32, ScriptError> {
        self.with(index, "32-bit integer", as_int)
    }

    fn int_or(&self, index: usize, default: i32) -> Result<i32, ScriptError> {
        self.with_or(index, default, "32-bit integer", as_int)
    }

    fn u64(&self, index: usize) -> Result<u64, ScriptError> {
        self.with(index, "non-negative integer", |v| {
            v.as_u64()
                .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        })
    }

    fn float(&self, index: usize) -> Result<f32, ScriptError> {
        self.with(index, "number", as_float)
    }

    fn float_or(&self, index: usize, default: f32) -> Result<f32, ScriptError> {
        self.with_or(index, default, "number", as_float)
    }

    fn bool(&self, index: usize) -> Result<bool, ScriptError> {
        self.with(index, "boolean", as_bool)
    }

    fn bool_or(&self, index: usize, default: bool) -> Result<bool, ScriptError> {
        self.with_or(index, default, "boolean", as_bool)
    }

    fn string(&self, index: usize) -> Result<String, ScriptError> {
        self.with(index, "string", |v| v.as_str().map(str::to_string))
    }

    fn opt_string(&self, index: usize) -> Result<Option<String>, ScriptError> {
        self.with_or(index, None, "string", |v| v.as_str().map(|s| Some(s.to_string())))
    }

    fn color(&self, index: usize) -> Result<Color, ScriptError> {
        self.with(index, "color", as_color)
    }

    fn color_or(&self, index: usize, default: Color) -> Result<Color, ScriptError> {
        self.with_or(index, default, "color", as_color)
    }

    fn vec2(&self, index: usize) -> Result<Vec2, ScriptError> {
        self.with(index, "vec2", |v| {
            let c = components(v, &["x", "y"])?;
            Some(Vec2::new(c[0], c[1]))
        })
    }

    fn vec3(&self, index: usize) -> Result<Vec3, ScriptError> {
        self.with(index, "vec3", |v| {
            let c = components(v, &["x", "y", "z"])?;
            Some(Vec3::new(c[0], c[1], c[2]))
        })
    }

    fn mat4(&self, index: usize) -> Result<Mat4, ScriptError> {
        self.with(index, "16 numbers", |v| {
            let arr = v.as_array().filter(|a| a.len() == 16)?;
            let mut m = [0.0f32; 16];
            for (dst, src) in m.iter_mut().zip(arr) {
                *dst = as_float(src)?;
            }
            Some(Mat4::from_cols_array(m))
        })
    }

    fn blend(&self, index: usize) -> Result<BlendMode, ScriptError> {
        self.with(index, "blend mode", |v| match v {
            Value::String(s) => BlendMode::from_name(s),
            _ => v.as_i64().and_then(BlendMode::from_index),
        })
    }
}

/// Integers and fractional numbers inside the `i32` range; fractions truncate
fn as_int(v: &Value) -> Option<i32> {
    match v.as_i64() {
        Some(i) => i32::try_from(i).ok(),
        None => v
            .as_f64()
            .filter(|f| (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(f))
            .map(|f| f as i32),
    }
}

fn as_float(v: &Value) -> Option<f32> {
    v.as_f64().map(|f| f as f32)
}

fn as_bool(v: &Value) -> Option<bool> {
    v.as_bool().or_else(|| v.as_f64().map(|f| f != 0.0))
}

fn channel(v: &Value) -> Option<u8> {
    v.as_f64().map(|f| f.clamp(0.0, 255.0) as u8)
}

/// `{r,g,b,a?}` or `[r,g,b,a?]`, alpha defaulting to opaque
fn as_color(v: &Value) -> Option<Color> {
    let (r, g, b, a) = match v {
        Value::Array(arr) if arr.len() == 3 || arr.len() == 4 => {
            (&arr[0], &arr[1], &arr[2], arr.get(3))
        },
        Value::Object(map) => (map.get("r")?, map.get("g")?, map.get("b")?, map.get("a")),
        _ => return None,
    };
    let alpha = match a {
        Some(a) => channel(a)?,
        None => 255,
    };
    Some(Color::rgba(channel(r)?, channel(g)?, channel(b)?, alpha))
}

/// Numbers from an array of exactly `keys.len()` entries or an object with those keys
fn components(v: &Value, keys: &[&str]) -> Option<Vec<f32>> {
    match v {
        Value::Array(arr) if arr.len() == keys.len() => arr.iter().map(as_float).collect(),
        Value::Object(map) => keys.iter().map(|k| map.get(*k).and_then(as_float)).collect(),
        _ => None,
    }
}
