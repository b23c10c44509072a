//! Square canvas composition.

use std::io::Cursor;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageOutputFormat, Rgba, RgbaImage};

use crate::errors::PipelineError;

pub const DEFAULT_CANVAS: u32 = 1000;
const JPEG_QUALITY: u8 = 90;
const WATERMARK_MARGIN: u32 = 16;

#[derive(Clone, Debug)]
pub struct ComposeOptions {
    /// Edge length of the output square
    pub canvas: u32,
    pub watermark: Option<DynamicImage>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            canvas: DEFAULT_CANVAS,
            watermark: None,
        }
    }
}

impl ComposeOptions {
    pub fn with_canvas(mut self, canvas: u32) -> Self {
        self.canvas = canvas.max(1);
        self
    }

    pub fn with_watermark(mut self, watermark: DynamicImage) -> Self {
        self.watermark = Some(watermark);
        self
    }
}

pub fn load_watermark(path: &Path) -> Result<DynamicImage, PipelineError> {
    Ok(image::open(path)?)
}

/// Fits `source` onto a white square canvas, stamps the optional watermark
/// in the bottom-right corner and returns JPEG bytes.
pub fn compose_square(source: &[u8], opts: &ComposeOptions) -> Result<Vec<u8>, PipelineError> {
    let img = image::load_from_memory(source)?;
    let canvas = opts.canvas.max(1);
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(PipelineError::Rejected("image has no pixels".into()));
    }

    let fitted = img.resize(canvas, canvas, FilterType::Lanczos3);
    let (fw, fh) = fitted.dimensions();
    let mut base = RgbaImage::from_pixel(canvas, canvas, Rgba([255, 255, 255, 255]));
    imageops::overlay(
        &mut base,
        &fitted.to_rgba8(),
        i64::from((canvas - fw) / 2),
        i64::from((canvas - fh) / 2),
    );

    if let Some(mark) = &opts.watermark {
        let edge = (canvas / 4).max(1);
        let mark = mark.resize(edge, edge, FilterType::Triangle).to_rgba8();
        let x = canvas.saturating_sub(mark.width() + WATERMARK_MARGIN);
        let y = canvas.saturating_sub(mark.height() + WATERMARK_MARGIN);
        imageops::overlay(&mut base, &mark, i64::from(x), i64::from(y));
    }

    let rgb = DynamicImage::ImageRgba8(base).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb).write_to(&mut out, ImageOutputFormat::Jpeg(JPEG_QUALITY))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn wide_image_is_letterboxed_on_white() {
        let bytes = compose_square(
            &png(200, 100, [0, 0, 0]),
            &ComposeOptions::default().with_canvas(100),
        )
        .unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let out = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(out.dimensions(), (100, 100));
        let top = out.get_pixel(50, 2);
        let middle = out.get_pixel(50, 50);
        assert!(top.0.iter().all(|c| *c > 230));
        assert!(middle.0.iter().all(|c| *c < 30));
    }

    #[test]
    fn watermark_lands_bottom_right() {
        let mark = image::load_from_memory(&png(10, 10, [255, 0, 0])).unwrap();
        let opts = ComposeOptions::default()
            .with_canvas(200)
            .with_watermark(mark);
        let bytes = compose_square(&png(200, 200, [255, 255, 255]), &opts).unwrap();
        let out = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let stamped = out.get_pixel(200 - WATERMARK_MARGIN - 25, 200 - WATERMARK_MARGIN - 25);
        assert!(stamped.0[0] > 200 && stamped.0[1] < 60);
        let clear = out.get_pixel(20, 20);
        assert!(clear.0.iter().all(|c| *c > 230));
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(matches!(
            compose_square(b"not an image", &ComposeOptions::default()),
            Err(PipelineError::Image(_))
        ));
    }
}
