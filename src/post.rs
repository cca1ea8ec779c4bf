//! Bloom and tone-mapping post-process
//!
//! Reads the surface's color buffer and writes a separate RGBA output buffer.
//! Bloom runs at reduced resolution: bright-pass + box downsample, separable
//! Gaussian blur (horizontal A -> B, vertical B -> A), then a bilinear upsample
//! added back onto the full-resolution color. Tone mapping applies an
//! exponential exposure curve followed by gamma.

use serde::{Deserialize, Serialize};

use crate::surface::{to_u8, PixelSurface};

/// Largest Gaussian half-width, in low-res pixels
const MAX_KERNEL_RADIUS: usize = 32;

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    pub enabled: bool,
    /// Luminance above which a pixel contributes, 0..1
    pub threshold: f32,
    pub intensity: f32,
    /// Downsample factor; values below 2 are treated as 2
    pub downsample: i32,
    /// Gaussian sigma in low-res pixels
    pub sigma: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.75,
            intensity: 1.25,
            downsample: 4,
            sigma: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneSettings {
    pub enabled: bool,
    pub exposure: f32,
    pub gamma: f32,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            exposure: 1.25,
            gamma: 2.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessSettings {
    pub bloom: BloomSettings,
    pub tone: ToneSettings,
}

impl PostProcessSettings {
    /// True when neither stage would touch the image
    #[inline]
    pub fn is_passthrough(&self) -> bool {
        !self.bloom.enabled && !self.tone.enabled
    }

    /// Replace the bloom stage, clamping every value into its valid range
    pub fn set_bloom(&mut self, enabled: bool, threshold: f32, intensity: f32, downsample: i32, sigma: f32) {
        self.bloom = BloomSettings {
            enabled,
            threshold: threshold.clamp(0.0, 1.0),
            intensity: intensity.max(0.0),
            downsample: downsample.max(1),
            sigma: sigma.max(0.0),
        };
    }

    /// Replace the tone stage, clamping every value into its valid range
    pub fn set_tone(&mut self, enabled: bool, exposure: f32, gamma: f32) {
        self.tone = ToneSettings {
            enabled,
            exposure: exposure.max(0.0),
            gamma: gamma.max(0.01),
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Normalised 1D Gaussian, `2 * radius + 1` taps.
/// Sigma is floored at 0.1; the radius is `ceil(3 * sigma)` clamped to 1..=32.
pub fn gaussian_kernel(sigma: f32) -> (Vec<f32>, usize) {
    let sigma = sigma.max(0.1);
    let radius = ((3.0 * sigma).ceil() as usize).clamp(1, MAX_KERNEL_RADIUS);
    let inv_2s2 = 1.0 / (2.0 * sigma * sigma);

    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-d * d * inv_2s2).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    (kernel, radius)
}

#[inline]
fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

// ============================================================================
// PostProcessor
// ============================================================================

/// Low-resolution RGB float buffers reused across frames
#[derive(Default)]
struct BloomScratch {
    width: usize,
    height: usize,
    a: Vec<f32>,
    b: Vec<f32>,
}

impl BloomScratch {
    /// Reallocate only when the low-res size changes
    fn ensure(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height && !self.a.is_empty() {
            return;
        }
        self.width = width;
        self.height = height;
        self.a = vec![0.0; width * height * 3];
        self.b = vec![0.0; width * height * 3];
        log::debug!("bloom scratch reallocated at {}x{}", width, height);
    }

    /// Bilinear fetch from `a`, coordinates clamped to the buffer
    fn sample_bilinear(&self, u: f32, v: f32) -> [f32; 3] {
        let (bw, bh) = (self.width, self.height);
        let u = u.clamp(0.0, (bw - 1) as f32);
        let v = v.clamp(0.0, (bh - 1) as f32);
        let (x0, y0) = (u.floor() as usize, v.floor() as usize);
        let (x1, y1) = ((x0 + 1).min(bw - 1), (y0 + 1).min(bh - 1));
        let (tx, ty) = (u - x0 as f32, v - y0 as f32);

        let fetch = |x: usize, y: usize| {
            let i = (y * bw + x) * 3;
            [self.a[i], self.a[i + 1], self.a[i + 2]]
        };
        let (c00, c10, c01, c11) = (fetch(x0, y0), fetch(x1, y0), fetch(x0, y1), fetch(x1, y1));

        std::array::from_fn(|k| {
            let top = c00[k] * (1.0 - tx) + c10[k] * tx;
            let bottom = c01[k] * (1.0 - tx) + c11[k] * tx;
            top * (1.0 - ty) + bottom * ty
        })
    }
}

/// Owns the post-process output buffer and bloom scratch
#[derive(Default)]
pub struct PostProcessor {
    scratch: BloomScratch,
    output: Vec<u8>,
}

impl PostProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all buffers; the next run reallocates them
    pub fn reset(&mut self) {
        self.scratch = BloomScratch::default();
        self.output = Vec::new();
    }

    /// Last processed frame, empty before the first non-pass-through run
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Run the enabled stages. Returns false (and does nothing) when both are
    /// disabled; otherwise fills `output()` and marks the whole surface dirty.
    pub fn run(&mut self, surface: &mut PixelSurface, settings: &PostProcessSettings) -> bool {
        if settings.is_passthrough() {
            return false;
        }
        self.compose(surface, settings);
        surface.mark_all_dirty();
        true
    }

    /// Processed bytes, or the surface's own bytes when both stages are disabled
    pub fn process<'a>(&'a mut self, surface: &'a mut PixelSurface, settings: &PostProcessSettings) -> &'a [u8] {
        if self.run(surface, settings) {
            &self.output
        } else {
            surface.as_bytes()
        }
    }

    fn compose(&mut self, surface: &PixelSurface, settings: &PostProcessSettings) {
        let (w, h) = (surface.width() as usize, surface.height() as usize);
        let src = surface.as_bytes();
        self.output.resize(w * h * 4, 0);

        let bloom = &settings.bloom;
        let ds = bloom.downsample.max(2) as usize;
        if bloom.enabled {
            self.brightpass_downsample(src, w, h, ds, bloom.threshold);
            self.blur(bloom.sigma);
        }

        let tone = &settings.tone;
        let exposure = tone.exposure.max(1e-4);
        let inv_gamma = 1.0 / tone.gamma.max(0.1);

        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) * 4;
                let mut c = [
                    src[i] as f32 / 255.0,
                    src[i + 1] as f32 / 255.0,
                    src[i + 2] as f32 / 255.0,
                ];

                if bloom.enabled {
                    let bu = (x as f32 + 0.5) / ds as f32 - 0.5;
                    let bv = (y as f32 + 0.5) / ds as f32 - 0.5;
                    let glow = self.scratch.sample_bilinear(bu, bv);
                    for k in 0..3 {
                        c[k] += glow[k] * bloom.intensity;
                    }
                }

                if tone.enabled {
                    for ch in &mut c {
                        let mapped = 1.0 - (-*ch * exposure).exp();
                        *ch = mapped.clamp(0.0, 1.0).powf(inv_gamma);
                    }
                }

                self.output[i..i + 4].copy_from_slice(&[to_u8(c[0]), to_u8(c[1]), to_u8(c[2]), 255]);
            }
        }
    }

    /// Average each ds x ds block of bright-passed color into scratch `a`.
    /// Edge blocks average only the pixels that exist.
    fn brightpass_downsample(&mut self, src: &[u8], w: usize, h: usize, ds: usize, threshold: f32) {
        let (bw, bh) = (w.div_ceil(ds), h.div_ceil(ds));
        self.scratch.ensure(bw, bh);

        let thr = threshold.clamp(0.0, 1.0);
        let norm = (1.0 - thr).max(1e-6);

        for by in 0..bh {
            for bx in 0..bw {
                let mut acc = [0.0f32; 3];
                let mut count = 0usize;

                for y in by * ds..((by + 1) * ds).min(h) {
                    for x in bx * ds..((bx + 1) * ds).min(w) {
                        let i = (y * w + x) * 4;
                        let r = src[i] as f32 / 255.0;
                        let g = src[i + 1] as f32 / 255.0;
                        let b = src[i + 2] as f32 / 255.0;
                        let k = luminance(r, g, b) - thr;
                        if k > 0.0 {
                            let k = k / norm;
                            acc[0] += r * k;
                            acc[1] += g * k;
                            acc[2] += b * k;
                        }
                        count += 1;
                    }
                }

                if count > 0 {
                    acc.iter_mut().for_each(|c| *c /= count as f32);
                }
                let bi = (by * bw + bx) * 3;
                self.scratch.a[bi..bi + 3].copy_from_slice(&acc);
            }
        }
    }

    /// Separable Gaussian with edge clamping, result back in scratch `a`
    fn blur(&mut self, sigma: f32) {
        let (kernel, radius) = gaussian_kernel(sigma);
        let s = &mut self.scratch;
        let (bw, bh) = (s.width, s.height);
        let r = radius as isize;

        // horizontal: a -> b
        for y in 0..bh {
            for x in 0..bw {
                let mut acc = [0.0f32; 3];
                for k in -r..=r {
                    let sx = (x as isize + k).clamp(0, bw as isize - 1) as usize;
                    let si = (y * bw + sx) * 3;
                    let wgt = kernel[(k + r) as usize];
                    for c in 0..3 {
                        acc[c] += s.a[si + c] * wgt;
                    }
                }
                let di = (y * bw + x) * 3;
                s.b[di..di + 3].copy_from_slice(&acc);
            }
        }

        // vertical: b -> a
        for y in 0..bh {
            for x in 0..bw {
                let mut acc = [0.0f32; 3];
                for k in -r..=r {
                    let sy = (y as isize + k).clamp(0, bh as isize - 1) as usize;
                    let si = (sy * bw + x) * 3;
                    let wgt = kernel[(k + r) as usize];
                    for c in 0..3 {
                        acc[c] += s.b[si + c] * wgt;
                    }
                }
                let di = (y * bw + x) * 3;
                s.a[di..di + 3].copy_from_slice(&acc);
            }
        }
    }
}
