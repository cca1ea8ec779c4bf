/// Inclusive bounding box of pixels touched since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirtyRect {
    #[default]
    Empty,
    Bounds {
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
    },
}

impl DirtyRect {
    /// Dirty box covering a whole `width` x `height` surface
    pub fn full(width: u32, height: u32) -> Self {
        DirtyRect::Bounds {
            min_x: 0,
            min_y: 0,
            max_x: width as i32 - 1,
            max_y: height as i32 - 1,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, DirtyRect::Empty)
    }

    /// Grow to include (x, y)
    #[inline]
    pub fn include(&mut self, x: i32, y: i32) {
        *self = match *self {
            DirtyRect::Empty => DirtyRect::Bounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            },
            DirtyRect::Bounds {
                min_x,
                min_y,
                max_x,
                max_y,
            } => DirtyRect::Bounds {
                min_x: min_x.min(x),
                min_y: min_y.min(y),
                max_x: max_x.max(x),
                max_y: max_y.max(y),
            },
        };
    }

    /// Returns (x, y, w, h), or None when empty
    pub fn as_rect(&self) -> Option<(i32, i32, u32, u32)> {
        match *self {
            DirtyRect::Empty => None,
            DirtyRect::Bounds {
                min_x,
                min_y,
                max_x,
                max_y,
            } => Some((
                min_x,
                min_y,
                (max_x - min_x + 1) as u32,
                (max_y - min_y + 1) as u32,
            )),
        }
    }
}
