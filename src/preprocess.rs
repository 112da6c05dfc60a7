use image::{GrayImage, Luma, RgbImage};

/// Grayscale then fixed-threshold binarization, to give OCR crisp glyphs
pub fn preprocess_frame(frame: &RgbImage, threshold: u8) -> GrayImage {
    let gray = to_grayscale(frame);
    binarize(&gray, threshold)
}

/// BT.601 luma, the weighting video decoders and OpenCV use
pub fn to_grayscale(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        let luma = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        // Round to nearest; max is 255 * 1000
        Luma([((luma + 500) / 1000) as u8])
    })
}

/// Pixels strictly above `threshold` become white, the rest black
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] > threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_grayscale_weights() {
        let mut frame = RgbImage::new(3, 1);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame.put_pixel(1, 0, Rgb([0, 255, 0]));
        frame.put_pixel(2, 0, Rgb([0, 0, 255]));
        let gray = to_grayscale(&frame);
        assert_eq!(gray.get_pixel(0, 0).0[0], 76);
        assert_eq!(gray.get_pixel(1, 0).0[0], 150);
        assert_eq!(gray.get_pixel(2, 0).0[0], 29);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut gray = GrayImage::new(3, 1);
        gray.put_pixel(0, 0, Luma([120]));
        gray.put_pixel(1, 0, Luma([121]));
        gray.put_pixel(2, 0, Luma([0]));
        let bw = binarize(&gray, 120);
        assert_eq!(bw.get_pixel(0, 0).0[0], 0);
        assert_eq!(bw.get_pixel(1, 0).0[0], 255);
        assert_eq!(bw.get_pixel(2, 0).0[0], 0);
    }

    #[test]
    fn test_preprocess_keeps_dimensions() {
        let frame = RgbImage::from_pixel(12, 7, Rgb([200, 200, 200]));
        let bw = preprocess_frame(&frame, 120);
        assert_eq!(bw.dimensions(), (12, 7));
        assert!(bw.pixels().all(|p| p.0[0] == 255));
    }
}
