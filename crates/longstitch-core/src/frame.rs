use serde::{Deserialize, Serialize};

/// Pixel layout of a [`RasterFrame`] buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Errors produced when validating or combining frames.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("zero-sized frame (width={width}, height={height})")]
    ZeroSized { width: usize, height: usize },

    #[error("invalid pixel buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("frame width {got} does not match composite width {expected}")]
    WidthMismatch { expected: usize, got: usize },

    #[error("frame format {got:?} does not match composite format {expected:?}")]
    FormatMismatch {
        expected: PixelFormat,
        got: PixelFormat,
    },
}

/// An owned raster image, row-major, `width * height * channels` bytes.
///
/// Frames are immutable once captured; the stitch session combines them
/// only through [`RasterFrame::crop_rows`] and [`RasterFrame::append_rows`],
/// which keep the buffer invariant intact by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl RasterFrame {
    /// Build a frame from a raw buffer, validating dimensions and length.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroSized { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(format.channels()))
            .ok_or(FrameError::ZeroSized { width, height })?;
        if data.len() != expected {
            return Err(FrameError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width * self.format.channels()
    }

    /// One row of pixels. Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.stride();
        &self.data[y * stride..(y + 1) * stride]
    }

    /// A new frame holding rows `[top, bottom)` of this one.
    ///
    /// The range is clamped to the frame height; an empty clamped range
    /// is a caller bug and reported as `ZeroSized`.
    pub fn crop_rows(&self, top: usize, bottom: usize) -> Result<RasterFrame, FrameError> {
        let bottom = bottom.min(self.height);
        let top = top.min(bottom);
        if bottom == top {
            return Err(FrameError::ZeroSized {
                width: self.width,
                height: 0,
            });
        }
        let stride = self.stride();
        RasterFrame::new(
            self.width,
            bottom - top,
            self.format,
            self.data[top * stride..bottom * stride].to_vec(),
        )
    }

    /// Append rows `[from_row, other.height)` of `other` below this frame.
    ///
    /// `from_row >= other.height()` appends nothing and is not an error:
    /// an overlap can cover the entire incoming frame.
    pub fn append_rows(&mut self, other: &RasterFrame, from_row: usize) -> Result<(), FrameError> {
        if other.width != self.width {
            return Err(FrameError::WidthMismatch {
                expected: self.width,
                got: other.width,
            });
        }
        if other.format != self.format {
            return Err(FrameError::FormatMismatch {
                expected: self.format,
                got: other.format,
            });
        }
        if from_row >= other.height {
            return Ok(());
        }
        let stride = other.stride();
        self.data.extend_from_slice(&other.data[from_row * stride..]);
        self.height += other.height - from_row;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize) -> RasterFrame {
        let data: Vec<u8> = (0..width * height * 3).map(|i| (i % 251) as u8).collect();
        RasterFrame::new(width, height, PixelFormat::Rgb8, data).unwrap()
    }

    #[test]
    fn rejects_zero_sized() {
        assert!(matches!(
            RasterFrame::new(0, 10, PixelFormat::Rgba8, Vec::new()),
            Err(FrameError::ZeroSized { .. })
        ));
        assert!(matches!(
            RasterFrame::new(10, 0, PixelFormat::Rgba8, Vec::new()),
            Err(FrameError::ZeroSized { .. })
        ));
    }

    #[test]
    fn rejects_short_buffer() {
        let err = RasterFrame::new(4, 4, PixelFormat::Rgb8, vec![0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidBuffer {
                expected: 48,
                got: 10
            }
        ));
    }

    #[test]
    fn crop_and_append_round_trip() {
        let full = frame(8, 20);
        let top = full.crop_rows(0, 12).unwrap();
        let mut rebuilt = top.clone();
        rebuilt.append_rows(&full, 12).unwrap();
        assert_eq!(rebuilt, full);
    }

    #[test]
    fn append_past_end_is_noop() {
        let mut a = frame(8, 5);
        let b = frame(8, 3);
        a.append_rows(&b, 3).unwrap();
        assert_eq!(a.height(), 5);
    }

    #[test]
    fn append_rejects_width_mismatch() {
        let mut a = frame(8, 5);
        let b = frame(9, 5);
        assert!(matches!(
            a.append_rows(&b, 0),
            Err(FrameError::WidthMismatch {
                expected: 8,
                got: 9
            })
        ));
    }

    #[test]
    fn crop_clamps_range() {
        let full = frame(4, 10);
        let tail = full.crop_rows(7, 100).unwrap();
        assert_eq!(tail.height(), 3);
        assert_eq!(tail.row(0), full.row(7));
    }
}
