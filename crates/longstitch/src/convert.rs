//! Conversions between [`image`] buffers and [`RasterFrame`].

use longstitch_core::{FrameError, PixelFormat, RasterFrame};

/// Errors produced by the buffer conversion helpers.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("image dimensions exceed the supported range (width={width}, height={height})")]
    Dimensions { width: usize, height: usize },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Convert a decoded image into an RGB frame.
///
/// Grayscale and alpha inputs are expanded/flattened to RGB so that every
/// frame of a session shares one pixel format regardless of how the source
/// files were encoded.
pub fn frame_from_dynamic(img: &::image::DynamicImage) -> Result<RasterFrame, ConvertError> {
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    Ok(RasterFrame::new(
        width,
        height,
        PixelFormat::Rgb8,
        rgb.into_raw(),
    )?)
}

/// Wrap a frame in an [`image::DynamicImage`] for encoding.
pub fn dynamic_from_frame(frame: &RasterFrame) -> Result<::image::DynamicImage, ConvertError> {
    let dims = || ConvertError::Dimensions {
        width: frame.width(),
        height: frame.height(),
    };
    let width = u32::try_from(frame.width()).map_err(|_| dims())?;
    let height = u32::try_from(frame.height()).map_err(|_| dims())?;
    let data = frame.data().to_vec();
    let img = match frame.format() {
        PixelFormat::Gray8 => ::image::GrayImage::from_raw(width, height, data)
            .map(::image::DynamicImage::ImageLuma8),
        PixelFormat::Rgb8 => {
            ::image::RgbImage::from_raw(width, height, data).map(::image::DynamicImage::ImageRgb8)
        }
        PixelFormat::Rgba8 => ::image::RgbaImage::from_raw(width, height, data)
            .map(::image::DynamicImage::ImageRgba8),
    };
    img.ok_or_else(dims)
}
