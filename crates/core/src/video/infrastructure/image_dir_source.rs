use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Adapts a directory of image files to the [`FrameSource`] interface.
///
/// Files are served in lexicographic order, one per loop iteration, so a
/// numbered dump of camera frames replays as a deterministic stream.
/// Exhausting the directory is the end-of-stream condition.
pub struct ImageDirSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageDirSource {
    pub fn open(dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            })
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(format!("no image files found in {}", dir.display()).into());
        }
        Ok(Self { paths, next: 0 })
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        let img = image::open(path)?.to_rgb8();
        let index = self.next;
        self.next += 1;
        Ok(Some(Frame::new(
            img.as_raw().clone(),
            img.width(),
            img.height(),
            3,
            index,
        )))
    }

    fn close(&mut self) {
        self.next = self.paths.len();
    }
}
