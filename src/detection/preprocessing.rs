use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::{box_filter, gaussian_blur_f32};

use crate::config::{AdaptiveMethod, ThresholdMethod};

const FOREGROUND: Luma<u8> = Luma([255]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Binarize with the configured strategy. Dark pixels become foreground (255).
pub fn binarize(gray: &GrayImage, method: &ThresholdMethod) -> GrayImage {
    match *method {
        ThresholdMethod::Adaptive {
            method,
            block_size,
            bias,
        } => adaptive_threshold(gray, method, block_size, bias),
        ThresholdMethod::Otsu => otsu_threshold(gray, true),
    }
}

/// Sigma that makes a Gaussian of the given odd kernel size match the
/// usual `0.3 * ((k - 1) / 2 - 1) + 0.8` rule of thumb
fn gaussian_sigma(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Local-mean threshold, inverted: a pixel is foreground when it is at least
/// `bias` darker than its neighbourhood mean
pub fn adaptive_threshold(gray: &GrayImage, method: AdaptiveMethod, block_size: u32, bias: i32) -> GrayImage {
    let radius = block_size / 2;
    let local_mean = match method {
        AdaptiveMethod::Gaussian => gaussian_blur_f32(gray, gaussian_sigma(block_size)),
        AdaptiveMethod::Mean => box_filter(gray, radius, radius),
    };

    let (width, height) = gray.dimensions();
    let mut binary = GrayImage::new(width, height);
    for (x, y, pixel) in gray.enumerate_pixels() {
        let threshold = local_mean.get_pixel(x, y)[0] as i32 - bias;
        let value = if pixel[0] as i32 <= threshold {
            FOREGROUND
        } else {
            BACKGROUND
        };
        binary.put_pixel(x, y, value);
    }
    binary
}

/// Global Otsu threshold. With `invert`, pixels at or below the level become
/// foreground; otherwise pixels above it do.
pub fn otsu_threshold(gray: &GrayImage, invert: bool) -> GrayImage {
    let level = otsu_level(gray);
    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let above = gray.get_pixel(x, y)[0] > level;
        if above != invert { FOREGROUND } else { BACKGROUND }
    })
}
