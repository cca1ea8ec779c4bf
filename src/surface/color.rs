use serde::{Deserialize, Serialize};

// ============================================================================
// Color
// ============================================================================

/// Straight-alpha RGBA8 color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from 0..1 float channels
    #[inline]
    pub fn from_unit(r: f32, g: f32, b: f32) -> Self {
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }

    /// Channel-wise `self * other / 255`, alpha included
    #[inline]
    pub fn modulate(self, other: Self) -> Self {
        let m = |a: u8, b: u8| ((a as u16 * b as u16) / 255) as u8;
        Self {
            r: m(self.r, other.r),
            g: m(self.g, other.g),
            b: m(self.b, other.b),
            a: m(self.a, other.a),
        }
    }
}

impl Default for Color {
    /// Opaque black
    fn default() -> Self {
        Self::BLACK
    }
}

/// Quantize a 0..1 float to 0..255, rounding to nearest
#[inline]
pub fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ============================================================================
// Blend Mode
// ============================================================================

/// How `write_pixel` combines a source color with the destination pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    /// dst = src
    #[default]
    Overwrite,
    /// Straight-alpha source-over
    Alpha,
    /// dst += src, saturating; alpha forced opaque
    Additive,
    /// dst = dst * src / 255; alpha forced opaque
    Multiply,
}

impl BlendMode {
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Overwrite,
        BlendMode::Alpha,
        BlendMode::Additive,
        BlendMode::Multiply,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Overwrite => "Overwrite",
            BlendMode::Alpha => "Alpha",
            BlendMode::Additive => "Additive",
            BlendMode::Multiply => "Multiply",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    /// Combine `src` over `dst`
    #[inline]
    pub fn apply(self, src: Color, dst: Color) -> Color {
        match self {
            BlendMode::Overwrite => src,
            BlendMode::Alpha => blend_alpha(src, dst),
            BlendMode::Additive => Color::rgba(
                dst.r.saturating_add(src.r),
                dst.g.saturating_add(src.g),
                dst.b.saturating_add(src.b),
                255,
            ),
            BlendMode::Multiply => {
                let m = |d: u8, s: u8| ((d as u16 * s as u16) / 255) as u8;
                Color::rgba(m(dst.r, src.r), m(dst.g, src.g), m(dst.b, src.b), 255)
            },
        }
    }
}

/// Straight-alpha source-over, computed in normalized floats
#[inline]
fn blend_alpha(src: Color, dst: Color) -> Color {
    let sa = src.a as f32 / 255.0;
    let da = dst.a as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);

    let channel = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        to_u8(s * sa + d * (1.0 - sa))
    };

    Color::rgba(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        to_u8(oa),
    )
}
