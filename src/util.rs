//! Frame timing and small color helpers for the demo loop

use std::collections::VecDeque;
use std::time::Instant;

use crate::surface::Color;

/// Hue in degrees, saturation and value in 0..1, to an opaque color
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Color::from_unit(r + m, g + m, b + m)
}

// ============================================================================
// FPS Counter
// ============================================================================

/// Rolling window of frame durations
pub struct FpsCounter {
    samples: VecDeque<f32>,
    last: Instant,
    window: usize,
}

impl FpsCounter {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            last: Instant::now(),
            window,
        }
    }

    /// Record the time since the previous call; returns (dt seconds, average fps)
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = (now - self.last).as_secs_f32();
        self.last = now;
        self.record(dt);
        (dt, self.avg_fps())
    }

    /// Push one frame duration in seconds
    pub fn record(&mut self, dt: f32) {
        self.samples.push_back(dt);
        if self.samples.len() > self.window {
            self.samples.pop_front();
        }
    }

    pub fn avg_frame_time_ms(&self) -> f32 {
        self.mean() * 1000.0
    }

    pub fn avg_fps(&self) -> f32 {
        let mean = self.mean();
        if mean > 0.0 {
            1.0 / mean
        } else {
            0.0
        }
    }

    /// (1st, 50th, 99th) percentile frame times in milliseconds
    pub fn percentiles_ms(&self) -> (f32, f32, f32) {
        if self.samples.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let mut sorted: Vec<f32> = self.samples.iter().copied().collect();
        sorted.sort_by(f32::total_cmp);

        let len = sorted.len();
        let at = |q: f32| sorted[((len as f32 * q).floor() as usize).min(len - 1)] * 1000.0;
        (at(0.01), sorted[len / 2] * 1000.0, at(0.99))
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    fn mean(&self) -> f32 {
        self.samples.iter().sum::<f32>() / self.samples.len().max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Color::rgb(0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Color::rgb(0, 0, 255));
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), Color::rgb(255, 0, 0));
        assert_eq!(hsv_to_rgb(42.0, 0.0, 0.0), Color::BLACK);
    }

    #[test]
    fn test_fps_window() {
        let mut fps = FpsCounter::new(4);
        for _ in 0..10 {
            fps.record(0.02);
        }
        assert_eq!(fps.sample_count(), 4);
        assert!((fps.avg_fps() - 50.0).abs() < 0.01);
        assert!((fps.avg_frame_time_ms() - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_percentiles() {
        let mut fps = FpsCounter::new(100);
        assert_eq!(fps.percentiles_ms(), (0.0, 0.0, 0.0));
        for i in 1..=100 {
            fps.record(i as f32 / 1000.0);
        }
        let (p1, p50, p99) = fps.percentiles_ms();
        assert!((p1 - 2.0).abs() < 1e-3);
        assert!((p50 - 51.0).abs() < 1e-3);
        assert!((p99 - 100.0).abs() < 1e-3);
    }
}
