//! Raw pixel access for candidate and ground-truth rasters.

use std::path::Path;

use burn::prelude::*;
use image::{DynamicImage, RgbImage};

use crate::error::{BinEvalError, BinEvalResult};

/// An 8-bit image with one (gray) or three (RGB) interleaved channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl RawImage {
    /// Wraps interleaved pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::InvalidImageShape`] if `channels` is not 1 or 3
    /// or the buffer length does not match the dimensions.
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> BinEvalResult<Self> {
        if channels != 1 && channels != 3 {
            return Err(BinEvalError::InvalidImageShape {
                expected: "1 or 3 channels".to_string(),
                actual: format!("{channels} channels"),
            });
        }
        let expected = width as usize * height as usize * channels;
        if data.len() != expected {
            return Err(BinEvalError::InvalidImageShape {
                expected: format!("{expected} bytes for {width}x{height}x{channels}"),
                actual: format!("{} bytes", data.len()),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single channel image from row-major gray values.
    pub fn gray(width: u32, height: u32, data: Vec<u8>) -> BinEvalResult<Self> {
        Self::new(width, height, 1, data)
    }

    /// Three channel image from row-major interleaved RGB values.
    pub fn rgb(width: u32, height: u32, data: Vec<u8>) -> BinEvalResult<Self> {
        Self::new(width, height, 3, data)
    }

    /// Loads an image file, keeping gray images single channel and
    /// converting everything else to RGB.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::ImageLoad`] if the file cannot be decoded.
    pub fn open(path: impl AsRef<Path>) -> BinEvalResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| BinEvalError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_dynamic(img))
    }

    /// Converts a decoded image.
    #[must_use]
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        if img.color().has_color() {
            Self {
                width,
                height,
                channels: 3,
                data: img.into_rgb8().into_raw(),
            }
        } else {
            Self {
                width,
                height,
                channels: 1,
                data: img.into_luma8().into_raw(),
            }
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn channels(&self) -> usize {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `(height, width)` of the image.
    #[must_use]
    pub const fn dims(&self) -> (usize, usize) {
        (self.height as usize, self.width as usize)
    }

    /// Reduces an RGB image to luma, gray images are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::InvalidImageShape`] if the buffer does not hold
    /// `width * height` RGB pixels.
    pub fn to_single_channel(&self) -> BinEvalResult<Self> {
        if self.channels == 1 {
            return Ok(self.clone());
        }
        let rgb = RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            BinEvalError::InvalidImageShape {
                expected: format!("{} RGB bytes", self.width as usize * self.height as usize * 3),
                actual: format!("{} bytes", self.data.len()),
            }
        })?;
        let luma = DynamicImage::ImageRgb8(rgb).into_luma8();
        Ok(Self {
            width: self.width,
            height: self.height,
            channels: 1,
            data: luma.into_raw(),
        })
    }

    /// Copies one channel into a new single channel image.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::InvalidImageShape`] if the channel does not exist.
    pub fn channel(&self, index: usize) -> BinEvalResult<Self> {
        if index >= self.channels {
            return Err(BinEvalError::InvalidImageShape {
                expected: format!("at least {} channels", index + 1),
                actual: format!("{} channels", self.channels),
            });
        }
        let data = self
            .data
            .iter()
            .skip(index)
            .step_by(self.channels)
            .copied()
            .collect();
        Ok(Self {
            width: self.width,
            height: self.height,
            channels: 1,
            data,
        })
    }

    /// Pixel data as an integer tensor of shape `[height, width, channels]`.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 3, Int> {
        let (height, width) = self.dims();
        let values: Vec<i32> = self.data.iter().map(|&v| i32::from(v)).collect();
        let data = TensorData::new(values, [height, width, self.channels]).convert::<B::IntElem>();
        Tensor::from_data(data, device)
    }

    /// Encodes the image to `path`; the format follows the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`BinEvalError::ImageLoad`] if encoding or writing fails.
    pub fn save(&self, path: impl AsRef<Path>) -> BinEvalResult<()> {
        let path = path.as_ref();
        let color = if self.channels == 1 {
            image::ExtendedColorType::L8
        } else {
            image::ExtendedColorType::Rgb8
        };
        image::save_buffer(path, &self.data, self.width, self.height, color).map_err(|source| {
            BinEvalError::ImageLoad {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}
