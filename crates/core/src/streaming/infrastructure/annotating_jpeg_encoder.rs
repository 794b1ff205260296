use image::codecs::jpeg::JpegEncoder;
use image::{imageops, Rgb, RgbImage};

use crate::shared::constants::{MAX_STREAM_WIDTH, STREAM_JPEG_QUALITY};
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;
use crate::streaming::domain::encoded_frame::EncodedFrame;
use crate::streaming::domain::frame_encoder::FrameEncoder;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BOX_THICKNESS: i32 = 2;

/// Pixel scale applied to the 5×7 glyph grid.
const GLYPH_SCALE: u32 = 2;
const GLYPH_ADVANCE: u32 = 6 * GLYPH_SCALE;
const LABEL_HEIGHT: u32 = 7 * GLYPH_SCALE + 4;

/// Draws detection overlays on a copy of the frame and compresses it to
/// JPEG.
///
/// Each detection gets a rectangle plus an index-and-confidence label;
/// an overall face-count label goes top-left. Frames wider than the
/// transmission limit are downscaled uniformly before compression.
pub struct AnnotatingJpegEncoder {
    max_width: u32,
    jpeg_quality: u8,
}

impl AnnotatingJpegEncoder {
    pub fn new() -> Self {
        Self {
            max_width: MAX_STREAM_WIDTH,
            jpeg_quality: STREAM_JPEG_QUALITY,
        }
    }
}

impl Default for AnnotatingJpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder for AnnotatingJpegEncoder {
    fn encode(
        &self,
        frame: &Frame,
        faces: &[Detection],
        timestamp: f64,
    ) -> Result<EncodedFrame, Box<dyn std::error::Error>> {
        let mut img = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("frame data does not match its dimensions")?;

        for (i, face) in faces.iter().enumerate() {
            let clamped = face.clamped(frame.width(), frame.height());
            draw_rect(&mut img, &clamped);
            let label = format!("Face {} ({:.2})", i + 1, face.confidence);
            let label_y = (clamped.y - LABEL_HEIGHT as i32).max(0);
            draw_label(&mut img, &label, clamped.x.max(0), label_y);
        }
        draw_label(&mut img, &format!("Faces: {}", faces.len()), 10, 10);

        if img.width() > self.max_width {
            let scale = self.max_width as f64 / img.width() as f64;
            let new_w = self.max_width;
            let new_h = (img.height() as f64 * scale).round() as u32;
            img = imageops::resize(&img, new_w, new_h, imageops::FilterType::Triangle);
        }

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality);
        encoder.encode_image(&img)?;

        Ok(EncodedFrame {
            jpeg,
            faces: faces.to_vec(),
            timestamp,
        })
    }
}

/// Hollow rectangle, two pixels thick, clamped to the image.
fn draw_rect(img: &mut RgbImage, d: &Detection) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    for t in 0..BOX_THICKNESS {
        let x1 = (d.x + t).clamp(0, w - 1);
        let y1 = (d.y + t).clamp(0, h - 1);
        let x2 = (d.x + d.width - 1 - t).clamp(0, w - 1);
        let y2 = (d.y + d.height - 1 - t).clamp(0, h - 1);
        if x1 > x2 || y1 > y2 {
            continue;
        }
        for x in x1..=x2 {
            img.put_pixel(x as u32, y1 as u32, BOX_COLOR);
            img.put_pixel(x as u32, y2 as u32, BOX_COLOR);
        }
        for y in y1..=y2 {
            img.put_pixel(x1 as u32, y as u32, BOX_COLOR);
            img.put_pixel(x2 as u32, y as u32, BOX_COLOR);
        }
    }
}

/// Text on a filled background bar, so labels stay readable over any
/// frame content.
fn draw_label(img: &mut RgbImage, text: &str, x: i32, y: i32) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    let bar_w = (text.chars().count() as u32 * GLYPH_ADVANCE + 4) as i32;
    let x1 = x.clamp(0, w - 1);
    let y1 = y.clamp(0, h - 1);
    let x2 = (x + bar_w).min(w);
    let y2 = (y + LABEL_HEIGHT as i32).min(h);
    for py in y1..y2 {
        for px in x1..x2 {
            img.put_pixel(px as u32, py as u32, BOX_COLOR);
        }
    }
    draw_text(img, text, x1 + 2, y1 + 2);
}

fn draw_text(img: &mut RgbImage, text: &str, x: i32, y: i32) {
    let mut cursor = x;
    for ch in text.chars() {
        draw_glyph(img, ch, cursor, y);
        cursor += GLYPH_ADVANCE as i32;
    }
}

fn draw_glyph(img: &mut RgbImage, ch: char, x: i32, y: i32) {
    let rows = glyph_rows(ch);
    let (w, h) = (img.width() as i32, img.height() as i32);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..5 {
            if bits & (0x10 >> col) == 0 {
                continue;
            }
            for dy in 0..GLYPH_SCALE as i32 {
                for dx in 0..GLYPH_SCALE as i32 {
                    let px = x + col * GLYPH_SCALE as i32 + dx;
                    let py = y + row as i32 * GLYPH_SCALE as i32 + dy;
                    if px >= 0 && px < w && py >= 0 && py < h {
                        img.put_pixel(px as u32, py as u32, TEXT_COLOR);
                    }
                }
            }
        }
    }
}

/// 5×7 glyph grid, one byte per row, bit 4 = leftmost column. Only the
/// characters the overlay labels actually use are defined; anything
/// else renders as blank.
fn glyph_rows(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'c' => [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        's' => [0x00, 0x00, 0x0F, 0x10, 0x0E, 0x01, 0x1E],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        _ => [0x00; 7],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(w: u32, h: u32) -> Frame {
        Frame::new(vec![128u8; (w * h * 3) as usize], w, h, 3, 0)
    }

    fn face(x: i32, y: i32, w: i32, h: i32, conf: f64) -> Detection {
        Detection::new(x, y, w, h, conf)
    }

    #[test]
    fn test_output_is_jpeg() {
        let encoder = AnnotatingJpegEncoder::new();
        let encoded = encoder.encode(&gray_frame(64, 48), &[], 1.0).unwrap();
        assert_eq!(&encoded.jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_faces_field_matches_input_set_exactly() {
        let encoder = AnnotatingJpegEncoder::new();
        let faces = vec![face(5, 5, 20, 20, 0.95), face(30, 10, 15, 18, 0.80)];
        let encoded = encoder.encode(&gray_frame(64, 48), &faces, 7.5).unwrap();
        assert_eq!(encoded.faces, faces);
        assert_eq!(encoded.timestamp, 7.5);
    }

    #[test]
    fn test_wide_frame_downscaled_uniformly() {
        let encoder = AnnotatingJpegEncoder::new();
        let encoded = encoder.encode(&gray_frame(1280, 720), &[], 0.0).unwrap();
        let img = image::load_from_memory(&encoded.jpeg).unwrap();
        assert_eq!(img.width(), 640);
        assert_eq!(img.height(), 360);
    }

    #[test]
    fn test_narrow_frame_not_resized() {
        let encoder = AnnotatingJpegEncoder::new();
        let encoded = encoder.encode(&gray_frame(640, 480), &[], 0.0).unwrap();
        let img = image::load_from_memory(&encoded.jpeg).unwrap();
        assert_eq!((img.width(), img.height()), (640, 480));
    }

    #[test]
    fn test_overlay_changes_pixels() {
        let encoder = AnnotatingJpegEncoder::new();
        let plain = encoder.encode(&gray_frame(100, 100), &[], 0.0).unwrap();
        let marked = encoder
            .encode(&gray_frame(100, 100), &[face(20, 40, 40, 40, 0.9)], 0.0)
            .unwrap();
        assert_ne!(plain.jpeg, marked.jpeg);
    }

    #[test]
    fn test_box_at_frame_edge_does_not_panic() {
        let encoder = AnnotatingJpegEncoder::new();
        // Box hugging the top-left corner: label has no room above it
        let faces = vec![face(0, 0, 30, 30, 0.75)];
        encoder.encode(&gray_frame(64, 48), &faces, 0.0).unwrap();
        // Box overshooting the frame entirely
        let faces = vec![face(-10, -10, 200, 200, 0.75)];
        encoder.encode(&gray_frame(64, 48), &faces, 0.0).unwrap();
    }

    #[test]
    fn test_rect_pixels_are_drawn() {
        let mut img = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
        draw_rect(&mut img, &Detection::new(10, 10, 20, 20, 1.0));
        assert_eq!(*img.get_pixel(10, 10), BOX_COLOR);
        assert_eq!(*img.get_pixel(29, 29), BOX_COLOR);
        // Interior untouched
        assert_eq!(*img.get_pixel(20, 20), Rgb([0, 0, 0]));
    }
}
