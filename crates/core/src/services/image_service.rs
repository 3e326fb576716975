use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageOutputFormat};
use tracing::debug;

use crate::config::ImageSettings;
use crate::errors::CoreError;
use crate::models::image_asset::{Dimensions, ImageAsset, NormalizedImage, OutputFormat};

/// Prepares a user-selected photo for upload.
///
/// Bounded longest side, same MIME family, extension rewritten to match.
/// Pure transform: no network, no disk.
pub struct ImageNormalizer {
    max_input_bytes: usize,
    filter: FilterType,
}

impl ImageNormalizer {
    pub fn new() -> Self {
        Self::from_settings(&ImageSettings::default())
    }

    pub fn from_settings(settings: &ImageSettings) -> Self {
        Self {
            max_input_bytes: settings.max_input_bytes,
            filter: FilterType::CatmullRom,
        }
    }

    /// Use a different resampling filter (default: CatmullRom).
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Resize (down only) and re-encode `asset`.
    ///
    /// Non-image MIME types are returned unchanged whatever the bounds.
    /// `quality` is 0.0–1.0 and only affects lossy formats.
    pub fn normalize(
        &self,
        asset: ImageAsset,
        max_side: u32,
        quality: f32,
    ) -> Result<NormalizedImage, CoreError> {
        if !asset.is_image() {
            debug!(file = %asset.file_name, mime = %asset.mime_type, "not an image, passing through");
            return Ok(NormalizedImage::passthrough(asset));
        }

        if max_side == 0 {
            return Err(CoreError::ValidationError(
                "max_side must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&quality) {
            return Err(CoreError::ValidationError(format!(
                "quality {quality} out of range (expected 0.0..=1.0)"
            )));
        }

        let decoded = self.decode(&asset)?;
        let original = Dimensions::new(decoded.width(), decoded.height());
        let target = fit_dimensions(original, max_side);

        let resized = if target == original {
            decoded
        } else {
            decoded.resize_exact(target.width, target.height, self.filter)
        };

        let format = OutputFormat::for_mime(&asset.mime_type);
        let bytes = encode(&resized, format, quality)?;

        debug!(
            file = %asset.file_name,
            from = %original,
            to = %target,
            format = format.mime_type(),
            in_bytes = asset.bytes.len(),
            out_bytes = bytes.len(),
            "image normalized"
        );

        Ok(NormalizedImage {
            file_name: rewrite_extension(&asset.file_name, format.extension()),
            mime_type: format.mime_type().to_string(),
            bytes,
            dimensions: Some(target),
        })
    }

    /// Read intrinsic dimensions from the image header without decoding pixels.
    pub fn probe(&self, asset: &ImageAsset) -> Result<Dimensions, CoreError> {
        self.check_size(asset)?;
        let (width, height) = image::io::Reader::new(Cursor::new(&asset.bytes))
            .with_guessed_format()
            .map_err(|e| CoreError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| CoreError::Decode(e.to_string()))?;
        Ok(Dimensions::new(width, height))
    }

    fn decode(&self, asset: &ImageAsset) -> Result<DynamicImage, CoreError> {
        self.check_size(asset)?;
        let img = image::load_from_memory(&asset.bytes)
            .map_err(|e| CoreError::Decode(format!("{}: {e}", asset.file_name)))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(CoreError::Decode(format!(
                "{}: image has no pixels",
                asset.file_name
            )));
        }
        Ok(img)
    }

    fn check_size(&self, asset: &ImageAsset) -> Result<(), CoreError> {
        if asset.bytes.len() > self.max_input_bytes {
            return Err(CoreError::Decode(format!(
                "{}: {} bytes exceeds the {} byte limit",
                asset.file_name,
                asset.bytes.len(),
                self.max_input_bytes
            )));
        }
        Ok(())
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale `original` down so its longer side is at most `max_side`.
///
/// The longer side becomes exactly `max_side`; the shorter one follows the
/// original aspect ratio, rounded to the nearest pixel and never below 1.
/// Images already within bounds are returned as-is.
#[must_use]
pub fn fit_dimensions(original: Dimensions, max_side: u32) -> Dimensions {
    if original.max_side() <= max_side || original.min_side() == 0 {
        return original;
    }
    let ratio = original.ratio();
    let side = f64::from(max_side);
    if original.width >= original.height {
        let height = (side / ratio).round().max(1.0) as u32;
        Dimensions::new(max_side, height)
    } else {
        let width = (side * ratio).round().max(1.0) as u32;
        Dimensions::new(width, max_side)
    }
}

/// Replace a trailing `.ext` (word characters only) with `extension`, or
/// append it when the name has none.
#[must_use]
pub fn rewrite_extension(file_name: &str, extension: &str) -> String {
    if let Some(dot) = file_name.rfind('.') {
        let suffix = &file_name[dot + 1..];
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return format!("{}{extension}", &file_name[..dot]);
        }
    }
    format!("{file_name}{extension}")
}

/// JPEG quality scale used by the encoder (1–100).
#[must_use]
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn encode(img: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality))
                .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                .map_err(|e| CoreError::Encode(e.to_string()))?;
        }
        OutputFormat::Png | OutputFormat::Gif | OutputFormat::Bmp => {
            let output = match format {
                OutputFormat::Png => ImageOutputFormat::Png,
                OutputFormat::Gif => ImageOutputFormat::Gif,
                _ => ImageOutputFormat::Bmp,
            };
            img.write_to(&mut Cursor::new(&mut buf), output)
                .map_err(|e| CoreError::Encode(e.to_string()))?;
        }
    }
    Ok(buf)
}
