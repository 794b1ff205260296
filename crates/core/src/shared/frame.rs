use ndarray::ArrayView3;

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// Frames are value types owned by one loop iteration; the next capture
/// supersedes the previous frame rather than mutating it.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Extracts the rectangle `[x, x+w) × [y, y+h)` as a new frame.
    ///
    /// The rectangle must already be clamped to frame bounds.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Frame {
        debug_assert!(x + w <= self.width && y + h <= self.height);
        let channels = self.channels as usize;
        let stride = self.width as usize * channels;
        let mut data = Vec::with_capacity(w as usize * h as usize * channels);
        for row in y..y + h {
            let start = row as usize * stride + x as usize * channels;
            data.extend_from_slice(&self.data[start..start + w as usize * channels]);
        }
        Frame::new(data, w, h, self.channels, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
