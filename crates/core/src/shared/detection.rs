use serde::Serialize;

/// One located face candidate: bounding box in frame pixels plus a
/// confidence score in `[0, 1]`.
///
/// Geometric-only backends without a learned score report a fixed
/// sentinel confidence instead.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f64,
}

impl Detection {
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Width/height ratio; zero-height boxes yield 0.0.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// Clamps the box to `[0, frame_w] × [0, frame_h]`.
    ///
    /// Coordinates never go negative and the far edge never exceeds the
    /// frame, so the resulting box is always a valid crop rectangle.
    pub fn clamped(&self, frame_w: u32, frame_h: u32) -> Detection {
        let fw = frame_w as i32;
        let fh = frame_h as i32;
        let x = self.x.clamp(0, fw);
        let y = self.y.clamp(0, fh);
        let width = (self.x + self.width).clamp(0, fw) - x;
        let height = (self.y + self.height).clamp(0, fh) - y;
        Detection {
            x,
            y,
            width,
            height,
            confidence: self.confidence,
        }
    }

    /// Expands the box by `margin` pixels on every side, clamped to the
    /// frame. Returns `(x, y, w, h)` as an unsigned crop rectangle.
    pub fn padded_rect(&self, margin: i32, frame_w: u32, frame_h: u32) -> (u32, u32, u32, u32) {
        let fw = frame_w as i32;
        let fh = frame_h as i32;
        let x = (self.x - margin).max(0);
        let y = (self.y - margin).max(0);
        let w = (self.width + 2 * margin).min(fw - x);
        let h = (self.height + 2 * margin).min(fh - y);
        (x as u32, y as u32, w.max(0) as u32, h.max(0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_aspect_ratio() {
        let d = Detection::new(0, 0, 30, 60, 1.0);
        assert_relative_eq!(d.aspect_ratio(), 0.5);
    }

    #[test]
    fn test_aspect_ratio_zero_height() {
        let d = Detection::new(0, 0, 30, 0, 1.0);
        assert_relative_eq!(d.aspect_ratio(), 0.0);
    }

    #[rstest]
    #[case::inside(Detection::new(10, 10, 50, 50, 0.9), (10, 10, 50, 50))]
    #[case::negative_origin(Detection::new(-20, -10, 50, 50, 0.9), (0, 0, 30, 40))]
    #[case::overflow_far_edge(Detection::new(600, 450, 100, 100, 0.9), (600, 450, 40, 30))]
    #[case::fully_outside(Detection::new(700, 500, 50, 50, 0.9), (640, 480, 0, 0))]
    fn test_clamped(#[case] input: Detection, #[case] expected: (i32, i32, i32, i32)) {
        let c = input.clamped(640, 480);
        assert_eq!((c.x, c.y, c.width, c.height), expected);
    }

    #[test]
    fn test_clamped_preserves_confidence() {
        let d = Detection::new(-5, -5, 20, 20, 0.73);
        assert_relative_eq!(d.clamped(640, 480).confidence, 0.73);
    }

    #[test]
    fn test_padded_rect_interior() {
        let d = Detection::new(100, 100, 50, 50, 0.95);
        assert_eq!(d.padded_rect(20, 640, 480), (80, 80, 90, 90));
    }

    #[test]
    fn test_padded_rect_clamps_at_origin() {
        let d = Detection::new(10, 5, 50, 50, 0.95);
        // Origin stops at 0; the size only shrinks against the far edge
        assert_eq!(d.padded_rect(20, 640, 480), (0, 0, 90, 90));
    }

    #[test]
    fn test_padded_rect_clamps_at_far_edge() {
        let d = Detection::new(600, 440, 30, 30, 0.95);
        assert_eq!(d.padded_rect(20, 640, 480), (580, 420, 60, 60));
    }

    #[test]
    fn test_serializes_with_field_names() {
        let d = Detection::new(100, 100, 50, 50, 0.95);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["x"], 100);
        assert_eq!(json["width"], 50);
        assert_relative_eq!(json["confidence"].as_f64().unwrap(), 0.95);
    }
}
