//! Image decoding and conversion into the working color space.
//!
//! The engine measures color similarity in CIE L\*a\*b\*, stored with
//! 8 bits per channel: `L * 255 / 100`, `a + 128`, `b + 128`. This is
//! the first step before segmentation: encoded bytes or sRGB pixels in,
//! [`ColorField`] out.

use image::{Rgb, RgbImage};
use palette::{FromColor, Lab, LinSrgb, Srgb};

use crate::field::ColorField;
use crate::types::SlicError;

/// Decode raw image bytes into an 8-bit sRGB image.
///
/// Supports PNG, JPEG, BMP, and WebP (whatever the enabled `image`
/// codecs can decode). Alpha is discarded.
///
/// # Errors
///
/// Returns [`SlicError::EmptyInput`] if `bytes` is empty.
/// Returns [`SlicError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, SlicError> {
    if bytes.is_empty() {
        return Err(SlicError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Convert an sRGB image into an 8-bit L\*a\*b\* color field.
///
/// # Errors
///
/// Returns [`SlicError::ZeroDimension`] if either axis is zero.
pub fn srgb_to_lab(image: &RgbImage) -> Result<ColorField, SlicError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(SlicError::ZeroDimension { width, height });
    }

    let lab = RgbImage::from_fn(width, height, |x, y| {
        Rgb(srgb_pixel_to_lab(image.get_pixel(x, y).0))
    });
    ColorField::from_image(lab)
}

/// Convert one sRGB pixel into 8-bit L\*a\*b\* (D65 white).
#[must_use]
pub fn srgb_pixel_to_lab(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| f32::from(c) / 255.0);
    let lin: LinSrgb<f32> = Srgb::new(r, g, b).into_linear();
    let lab: Lab = Lab::from_color(lin);

    [
        to_channel(lab.l * 255.0 / 100.0),
        to_channel(lab.a + 128.0),
        to_channel(lab.b + 128.0),
    ]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn assert_near(actual: [u8; 3], expected: [u8; 3]) {
        for (c, (&a, &e)) in actual.iter().zip(&expected).enumerate() {
            let diff = i16::from(a) - i16::from(e);
            assert!(
                diff.abs() <= 1,
                "channel {c}: expected ~{e}, got {a} (full: {actual:?})",
            );
        }
    }

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode(&[]), Err(SlicError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(SlicError::ImageDecode(_))));
    }

    #[test]
    fn valid_png_decodes_with_dimensions() {
        let img = RgbImage::from_fn(17, 31, |_, _| Rgb([128, 64, 32]));
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!(decoded.dimensions(), (17, 31));
        assert_eq!(decoded.get_pixel(3, 3).0, [128, 64, 32]);
    }

    #[test]
    fn white_maps_to_full_lightness_neutral_chroma() {
        assert_near(srgb_pixel_to_lab([255, 255, 255]), [255, 128, 128]);
    }

    #[test]
    fn black_maps_to_zero_lightness_neutral_chroma() {
        assert_near(srgb_pixel_to_lab([0, 0, 0]), [0, 128, 128]);
    }

    #[test]
    fn primaries_match_reference_values() {
        // Reference: L*a*b* of sRGB primaries under D65, scaled to 8 bits.
        assert_near(srgb_pixel_to_lab([255, 0, 0]), [136, 208, 195]);
        assert_near(srgb_pixel_to_lab([0, 255, 0]), [224, 42, 211]);
        assert_near(srgb_pixel_to_lab([0, 0, 255]), [82, 207, 20]);
    }

    #[test]
    fn mid_gray_lightness() {
        // sRGB 128 is about L* 53.6.
        assert_near(srgb_pixel_to_lab([128, 128, 128]), [137, 128, 128]);
    }

    #[test]
    fn grays_stay_neutral() {
        for v in [32u8, 96, 160, 224] {
            let [_, a, b] = srgb_pixel_to_lab([v, v, v]);
            assert!((i16::from(a) - 128).abs() <= 1, "a={a} for gray {v}");
            assert!((i16::from(b) - 128).abs() <= 1, "b={b} for gray {v}");
        }
    }

    #[test]
    fn lightness_is_monotonic_in_gray_level() {
        let mut prev = 0;
        for v in (0..=255u8).step_by(15) {
            let [l, _, _] = srgb_pixel_to_lab([v, v, v]);
            assert!(l >= prev, "lightness decreased at gray {v}");
            prev = l;
        }
    }

    #[test]
    fn srgb_to_lab_preserves_dimensions() {
        let img = RgbImage::from_fn(9, 4, |x, y| Rgb([(x * 20) as u8, (y * 40) as u8, 7]));
        let field = srgb_to_lab(&img).unwrap();
        assert_eq!(field.width(), 9);
        assert_eq!(field.height(), 4);
        assert_eq!(field.color(2, 3), srgb_pixel_to_lab(img.get_pixel(2, 3).0));
    }

    #[test]
    fn srgb_to_lab_rejects_empty_image() {
        let result = srgb_to_lab(&RgbImage::new(0, 0));
        assert!(matches!(result, Err(SlicError::ZeroDimension { .. })));
    }
}
