//! Still-frame capture: output path naming and PNG encoding

use std::path::{Path, PathBuf};

use crate::context::FrameView;
use crate::error::RenderError;

/// Directory used when no capture path was configured
pub const DEFAULT_CAPTURE_DIR: &str = "captures";

/// Where numbered frames are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// `dir/frame_000042.png`
    Directory(PathBuf),
    /// `dir/stem_000042.ext` derived from a file name
    FileHint(PathBuf),
}

impl Default for CaptureTarget {
    fn default() -> Self {
        CaptureTarget::Directory(PathBuf::from(DEFAULT_CAPTURE_DIR))
    }
}

impl CaptureTarget {
    /// A path with an extension is a file-name hint, anything else a directory.
    /// An empty path selects the default directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.as_os_str().is_empty() {
            Self::default()
        } else if path.extension().is_some() {
            CaptureTarget::FileHint(path)
        } else {
            CaptureTarget::Directory(path)
        }
    }

    /// Output path for `frame_index`, zero-padded to six digits
    pub fn resolve(&self, frame_index: u64) -> PathBuf {
        match self {
            CaptureTarget::Directory(dir) => dir.join(format!("frame_{:06}.png", frame_index)),
            CaptureTarget::FileHint(hint) => {
                let stem = hint.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
                let ext = hint.extension().map(|e| e.to_string_lossy()).unwrap_or("png".into());
                let name = format!("{}_{:06}.{}", stem, frame_index, ext);
                match hint.parent() {
                    Some(dir) => dir.join(name),
                    None => PathBuf::from(name),
                }
            },
        }
    }
}

/// Encode a frame as PNG at `path`, creating parent directories
pub fn save_png(frame: &FrameView<'_>, path: &Path) -> Result<(), RenderError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    image::save_buffer_with_format(
        path,
        frame.bytes(),
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directory() {
        assert_eq!(
            CaptureTarget::default().resolve(42),
            PathBuf::from("captures/frame_000042.png")
        );
        assert_eq!(CaptureTarget::from_path(""), CaptureTarget::default());
    }

    #[test]
    fn test_directory_path() {
        let t = CaptureTarget::from_path("out/shots");
        assert_eq!(t.resolve(7), PathBuf::from("out/shots/frame_000007.png"));
    }

    #[test]
    fn test_file_hint_keeps_stem_and_extension() {
        let t = CaptureTarget::from_path("renders/cube.png");
        assert!(matches!(t, CaptureTarget::FileHint(_)));
        assert_eq!(t.resolve(3), PathBuf::from("renders/cube_000003.png"));
        let bare = CaptureTarget::from_path("shot.png");
        assert_eq!(bare.resolve(1234567), PathBuf::from("shot_1234567.png"));
    }

    #[test]
    fn test_save_png_creates_dirs() {
        let dir = std::env::temp_dir().join(format!("softraster-capture-{}", std::process::id()));
        let path = dir.join("nested").join("f.png");
        let bytes = vec![255u8; 2 * 2 * 4];
        save_png(&FrameView::new(&bytes, 2, 2), &path).unwrap();
        assert!(path.is_file());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
