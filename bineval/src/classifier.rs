//! Pixel classification of candidate and ground-truth images.
//!
//! Turns raw pixel data into boolean foreground masks according to the
//! foreground encoding of the dataset:
//!
//! - **Regular** ground truth stores ink as dark pixels, so foreground is
//!   `(255 - gt) > 127`.
//! - **Dual-class** ground truth is color coded: one channel value per ink
//!   class, and [`IGNORE_COLOR`] for regions that are removed from the
//!   candidate before scoring.
//!
//! Candidates are foreground where the selected channel is non-zero, or
//! where its inverse is non-zero when `invert_candidate` is set.

use burn::{prelude::*, tensor::ElementConversion};

use crate::{
    config::{DualClassEncoding, ForegroundType, IGNORE_COLOR},
    error::{BinEvalError, BinEvalResult},
    raster::RawImage,
};

/// A 2D boolean mask, `true` marks foreground.
#[derive(Debug, Clone)]
pub struct PixelMask<B: Backend> {
    mask: Tensor<B, 2, Bool>,
}

impl<B: Backend> PixelMask<B> {
    pub const fn new(mask: Tensor<B, 2, Bool>) -> Self {
        Self { mask }
    }

    /// Builds a mask from row-major values.
    pub fn from_values(values: Vec<bool>, height: usize, width: usize, device: &B::Device) -> Self {
        let data = TensorData::new(values, [height, width]);
        Self::new(Tensor::from_data(data, device))
    }

    /// `[height, width]` of the mask.
    pub fn dims(&self) -> [usize; 2] {
        self.mask.dims()
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> u64 {
        count_true(self.mask.clone())
    }

    pub const fn tensor(&self) -> &Tensor<B, 2, Bool> {
        &self.mask
    }
}

/// Counts the `true` entries of a boolean tensor.
pub(crate) fn count_true<B: Backend>(mask: Tensor<B, 2, Bool>) -> u64 {
    let count = mask.int().sum().into_scalar().elem::<i64>();
    u64::try_from(count).unwrap_or(0)
}

/// Derives the candidate and ground-truth foreground masks.
///
/// Returns `(candidate, ground_truth)`.
///
/// # Errors
///
/// - [`BinEvalError::InvalidImageShape`] if the two images differ in size.
/// - [`BinEvalError::Configuration`] if a dual-class foreground type is used
///   with a ground truth that is not 3-channel.
pub fn classify<B: Backend>(
    candidate: &RawImage,
    ground_truth: &RawImage,
    fg_type: &ForegroundType,
    invert_candidate: bool,
    device: &B::Device,
) -> BinEvalResult<(PixelMask<B>, PixelMask<B>)> {
    if candidate.dims() != ground_truth.dims() {
        let (h, w) = ground_truth.dims();
        let (ch, cw) = candidate.dims();
        return Err(BinEvalError::InvalidImageShape {
            expected: format!("{w}x{h} (ground truth)"),
            actual: format!("{cw}x{ch} (candidate)"),
        });
    }

    match fg_type.dual_class_encoding() {
        None => classify_regular(candidate, ground_truth, invert_candidate, device),
        Some(encoding) => {
            classify_dual_class(candidate, ground_truth, encoding, invert_candidate, device)
        }
    }
}

fn classify_regular<B: Backend>(
    candidate: &RawImage,
    ground_truth: &RawImage,
    invert_candidate: bool,
    device: &B::Device,
) -> BinEvalResult<(PixelMask<B>, PixelMask<B>)> {
    let gt = single_channel_tensor::<B>(&ground_truth.to_single_channel()?, device);
    // (255 - gt) > 127
    let gt_mask = gt.lower_elem(128);

    let candidate = single_channel_tensor::<B>(&candidate.to_single_channel()?, device);
    let candidate_mask = threshold_candidate(candidate, invert_candidate);

    Ok((PixelMask::new(candidate_mask), PixelMask::new(gt_mask)))
}

fn classify_dual_class<B: Backend>(
    candidate: &RawImage,
    ground_truth: &RawImage,
    encoding: DualClassEncoding,
    invert_candidate: bool,
    device: &B::Device,
) -> BinEvalResult<(PixelMask<B>, PixelMask<B>)> {
    if ground_truth.channels() != 3 {
        return Err(BinEvalError::Configuration {
            reason: format!(
                "dual-class foreground types need a 3-channel ground truth, got {} channel(s)",
                ground_truth.channels()
            ),
        });
    }

    let gt = ground_truth.to_tensor::<B>(device);
    let [red, green, blue] = IGNORE_COLOR.map(i64::from);
    let ignore = channel(gt.clone(), 0)
        .equal_elem(red)
        .bool_and(channel(gt.clone(), 1).equal_elem(green))
        .bool_and(channel(gt.clone(), 2).equal_elem(blue));
    let gt_mask = channel(gt, encoding.gt_channel).equal_elem(i64::from(encoding.gt_value));

    let candidate = if candidate.channels() == 3 {
        candidate.channel(encoding.candidate_channel)?
    } else {
        candidate.clone()
    };
    let candidate = single_channel_tensor::<B>(&candidate, device);
    let candidate_mask = threshold_candidate(candidate, invert_candidate).bool_and(ignore.bool_not());

    Ok((PixelMask::new(candidate_mask), PixelMask::new(gt_mask)))
}

fn threshold_candidate<B: Backend>(
    candidate: Tensor<B, 2, Int>,
    invert_candidate: bool,
) -> Tensor<B, 2, Bool> {
    if invert_candidate {
        // (255 - p) > 0
        candidate.lower_elem(255)
    } else {
        candidate.greater_elem(0)
    }
}

fn single_channel_tensor<B: Backend>(image: &RawImage, device: &B::Device) -> Tensor<B, 2, Int> {
    channel(image.to_tensor::<B>(device), 0)
}

fn channel<B: Backend>(tensor: Tensor<B, 3, Int>, index: usize) -> Tensor<B, 2, Int> {
    tensor.slice(s![.., .., index..index + 1]).squeeze::<2>(2)
}
