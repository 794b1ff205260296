use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{
    FRONTAL_CONFIDENCE, MAX_FACE_ASPECT, MIN_FACE_ASPECT, PROFILE_CONFIDENCE,
};
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Minimum candidate box side, in pixels. Smaller blobs are noise.
const MIN_FACE_SIZE: u32 = 50;

/// Classical cascade strategy: two independent geometric scans over a
/// skin-likelihood mask, one tuned for frontal faces and one for profile
/// faces, with a combined aspect-ratio filter.
///
/// Frontal candidates carry confidence 1.0, profile candidates 0.9 —
/// there is no learned score here, so the values are fixed sentinels
/// reflecting relative trust. Boxes whose width/height ratio falls
/// outside `[0.5, 1.5]` are discarded as geometrically implausible;
/// the learned strategy does not apply this filter since it already
/// has real confidence scores to lean on.
pub struct CascadeFaceDetector {
    frontal: GeometricScan,
    profile: GeometricScan,
}

impl CascadeFaceDetector {
    pub fn new() -> Self {
        Self {
            // Frontal faces present as dense, compact skin blobs.
            frontal: GeometricScan {
                min_size: MIN_FACE_SIZE,
                min_fill: 0.50,
            },
            // Profile faces lose part of the blob to hair/background,
            // so the fill requirement is looser.
            profile: GeometricScan {
                min_size: MIN_FACE_SIZE,
                min_fill: 0.30,
            },
        }
    }
}

impl Default for CascadeFaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let mask = skin_mask(frame);
        let w = frame.width();
        let h = frame.height();

        let mut candidates: Vec<Detection> = self
            .frontal
            .scan(&mask, w, h)
            .into_iter()
            .map(|(x, y, bw, bh)| Detection::new(x, y, bw, bh, FRONTAL_CONFIDENCE))
            .collect();
        candidates.extend(
            self.profile
                .scan(&mask, w, h)
                .into_iter()
                .map(|(x, y, bw, bh)| Detection::new(x, y, bw, bh, PROFILE_CONFIDENCE)),
        );

        candidates.retain(|d| {
            let ratio = d.aspect_ratio();
            (MIN_FACE_ASPECT..=MAX_FACE_ASPECT).contains(&ratio)
        });
        Ok(candidates)
    }
}

/// One geometric detector pass: connected components over the skin mask,
/// kept when they are large and dense enough.
struct GeometricScan {
    min_size: u32,
    /// Minimum fraction of the bounding box covered by skin pixels.
    min_fill: f64,
}

impl GeometricScan {
    fn scan(&self, mask: &[bool], width: u32, height: u32) -> Vec<(i32, i32, i32, i32)> {
        let w = width as usize;
        let h = height as usize;
        let mut visited = vec![false; mask.len()];
        let mut boxes = Vec::new();
        let mut stack = Vec::new();

        for start in 0..mask.len() {
            if !mask[start] || visited[start] {
                continue;
            }
            let (mut min_x, mut min_y) = (w, h);
            let (mut max_x, mut max_y) = (0usize, 0usize);
            let mut area = 0usize;

            visited[start] = true;
            stack.push(start);
            while let Some(idx) = stack.pop() {
                let (x, y) = (idx % w, idx / w);
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                area += 1;

                for (nx, ny) in [
                    (x.wrapping_sub(1), y),
                    (x + 1, y),
                    (x, y.wrapping_sub(1)),
                    (x, y + 1),
                ] {
                    if nx < w && ny < h {
                        let nidx = ny * w + nx;
                        if mask[nidx] && !visited[nidx] {
                            visited[nidx] = true;
                            stack.push(nidx);
                        }
                    }
                }
            }

            let bw = (max_x - min_x + 1) as u32;
            let bh = (max_y - min_y + 1) as u32;
            if bw < self.min_size || bh < self.min_size {
                continue;
            }
            let fill = area as f64 / (bw as f64 * bh as f64);
            if fill < self.min_fill {
                continue;
            }
            boxes.push((min_x as i32, min_y as i32, bw as i32, bh as i32));
        }
        boxes
    }
}

/// Per-pixel skin likelihood using the classic RGB rule.
fn skin_mask(frame: &Frame) -> Vec<bool> {
    let data = frame.data();
    let channels = frame.channels() as usize;
    let pixels = frame.width() as usize * frame.height() as usize;
    let mut mask = vec![false; pixels];
    for (i, flag) in mask.iter_mut().enumerate() {
        let r = data[i * channels] as i32;
        let g = data[i * channels + 1] as i32;
        let b = data[i * channels + 2] as i32;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        *flag = r > 95 && g > 40 && b > 20 && max - min > 15 && (r - g).abs() > 15 && r > g && r > b;
    }
    mask
}
