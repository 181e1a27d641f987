//! Border rendering for a single image.

use super::BorderSettings;
use crate::error::BorderError;
use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

/// Return a copy of `image` framed by the configured border.
///
/// The result measures `(w + left + right) x (h + top + bottom)`, with the
/// source pixels starting at `(left, top)`. Images with an alpha channel keep
/// it; the border itself is opaque. Widths are not range-checked here, but a
/// canvas that does not fit in `u32` dimensions is an error.
pub fn apply_border(image: &DynamicImage, settings: &BorderSettings) -> Result<DynamicImage, BorderError> {
    let (width, height) = image.dimensions();
    let out_width = u64::from(width) + u64::from(settings.left) + u64::from(settings.right);
    let out_height = u64::from(height) + u64::from(settings.top) + u64::from(settings.bottom);
    let too_large = || BorderError::TooLarge {
        width: out_width,
        height: out_height,
    };
    let out_width = u32::try_from(out_width).map_err(|_| too_large())?;
    let out_height = u32::try_from(out_height).map_err(|_| too_large())?;
    let [r, g, b] = settings.color.to_array();
    let (x, y) = (i64::from(settings.left), i64::from(settings.top));

    if image.color().has_alpha() {
        let mut canvas = RgbaImage::from_pixel(out_width, out_height, Rgba([r, g, b, 255]));
        imageops::replace(&mut canvas, &image.to_rgba8(), x, y);
        Ok(DynamicImage::ImageRgba8(canvas))
    } else {
        let mut canvas = RgbImage::from_pixel(out_width, out_height, Rgb([r, g, b]));
        imageops::replace(&mut canvas, &image.to_rgb8(), x, y);
        Ok(DynamicImage::ImageRgb8(canvas))
    }
}

/// Decode `input`, add the border and write the result to `output`.
///
/// Settings are validated before anything is decoded. The output format
/// follows the extension of `output`. JPEG cannot carry alpha, so JPEG
/// output is always written as RGB.
pub fn border_file(
    input: &Path,
    output: &Path,
    settings: &BorderSettings,
) -> Result<(u32, u32), BorderError> {
    settings.validate()?;
    let image = image::open(input).map_err(|e| BorderError::Decode {
        path: input.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut bordered = apply_border(&image, settings)?;
    if is_jpeg(output) && bordered.color().has_alpha() {
        bordered = DynamicImage::ImageRgb8(bordered.to_rgb8());
    }

    bordered.save(output).map_err(|e| BorderError::Encode {
        path: output.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!(
        input = %input.display(),
        output = %output.display(),
        width = bordered.width(),
        height = bordered.height(),
        "border applied"
    );
    Ok(bordered.dimensions())
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::border::BorderColor;
    use crate::error::SettingsError;
    use tempfile::TempDir;

    fn settings(top: u32, bottom: u32, left: u32, right: u32) -> BorderSettings {
        BorderSettings {
            top,
            bottom,
            left,
            right,
            color: BorderColor::new(255, 0, 0),
            ..Default::default()
        }
    }

    fn gray_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([100, 100, 100])))
    }

    #[test]
    fn output_size_includes_all_sides() {
        let bordered = apply_border(&gray_image(20, 10), &settings(1, 2, 3, 4)).unwrap();
        assert_eq!(bordered.dimensions(), (27, 13));
    }

    #[test]
    fn source_is_placed_at_left_top() {
        let bordered = apply_border(&gray_image(4, 4), &settings(2, 0, 3, 0))
            .unwrap()
            .to_rgb8();

        assert_eq!(bordered.get_pixel(3, 2), &Rgb([100, 100, 100]));
        assert_eq!(bordered.get_pixel(6, 5), &Rgb([100, 100, 100]));
        assert_eq!(bordered.get_pixel(2, 2), &Rgb([255, 0, 0]));
        assert_eq!(bordered.get_pixel(3, 1), &Rgb([255, 0, 0]));
    }

    #[test]
    fn zero_border_keeps_image() {
        let image = gray_image(5, 7);
        let bordered = apply_border(&image, &BorderSettings::default()).unwrap();
        assert_eq!(bordered.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn alpha_is_kept_and_border_is_opaque() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 10])));
        let bordered = apply_border(&image, &settings(1, 1, 1, 1)).unwrap();

        assert!(bordered.color().has_alpha());
        let rgba = bordered.to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(rgba.get_pixel(1, 1), &Rgba([0, 0, 255, 10]));
    }

    #[test]
    fn jpeg_output_drops_alpha() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.png");
        let output = temp.path().join("out.jpg");
        RgbaImage::from_pixel(8, 8, Rgba([0, 200, 0, 128]))
            .save(&input)
            .unwrap();

        let dims = border_file(&input, &output, &settings(2, 2, 2, 2)).unwrap();

        assert_eq!(dims, (12, 12));
        let written = image::open(&output).unwrap();
        assert!(!written.color().has_alpha());
        assert_eq!(written.dimensions(), (12, 12));
    }

    #[test]
    fn oversized_canvas_is_an_error() {
        let result = apply_border(&gray_image(2, 2), &settings(0, 0, u32::MAX, 1));
        assert!(matches!(
            result,
            Err(BorderError::TooLarge { width, height: 2 }) if width == u64::from(u32::MAX) + 3
        ));
    }

    #[test]
    fn file_with_out_of_range_width_is_rejected_before_decoding() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.png");
        let output = temp.path().join("out.png");
        RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])).save(&input).unwrap();

        let result = border_file(&input, &output, &settings(0, 0, u32::MAX, 0));

        assert!(matches!(
            result,
            Err(BorderError::InvalidSettings(SettingsError::InvalidWidth { side: "left", .. }))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn undecodable_input_is_reported() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("broken.jpg");
        std::fs::write(&input, b"not an image").unwrap();

        let result = border_file(&input, &temp.path().join("out.jpg"), &settings(1, 1, 1, 1));
        assert!(matches!(result, Err(BorderError::Decode { .. })));
    }
}
