use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, GenericImageView, codecs::jpeg::JpegEncoder, imageops::FilterType};
use thiserror::Error;

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("not a JPEG data URI")]
    DataUri,
}

/// Output is always JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeConfig {
    pub max_width: u32,
    /// JPEG quality, 1..=100. 80 corresponds to a 0.8 canvas quality.
    pub quality: u8,
    /// Resample narrow images up to `max_width` instead of keeping their size.
    pub allow_upscale: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            quality: 80,
            allow_upscale: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedPhoto {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

/// Target raster size for a `width` x `height` input.
pub fn target_dimensions(width: u32, height: u32, config: &ResizeConfig) -> (u32, u32) {
    if width <= config.max_width && !config.allow_upscale {
        return (width, height);
    }
    let scale = f64::from(config.max_width) / f64::from(width);
    let scaled_height = (f64::from(height) * scale).floor().max(1.0) as u32;
    (config.max_width, scaled_height)
}

/// Decode → downscale → JPEG → data URI. Blocking; run it off the async runtime.
pub fn process_photo(bytes: &[u8], config: &ResizeConfig) -> Result<ProcessedPhoto, ProcessError> {
    let decoded = image::load_from_memory(bytes).map_err(ProcessError::Decode)?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(ProcessError::Empty);
    }

    let (target_width, target_height) = target_dimensions(width, height, config);
    let resized = if (target_width, target_height) == (width, height) {
        decoded
    } else {
        decoded.resize_exact(target_width, target_height, FilterType::Triangle)
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut encoded, config.quality);
    rgb.write_with_encoder(encoder).map_err(ProcessError::Encode)?;

    Ok(ProcessedPhoto {
        data_uri: format!("{JPEG_DATA_URI_PREFIX}{}", STANDARD.encode(&encoded)),
        width: target_width,
        height: target_height,
    })
}

pub fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>, ProcessError> {
    let payload = data_uri
        .strip_prefix(JPEG_DATA_URI_PREFIX)
        .ok_or(ProcessError::DataUri)?;
    STANDARD.decode(payload).map_err(|_| ProcessError::DataUri)
}
