use crate::{
	error::{Error, Result},
	model::ImageFormat,
};

use std::ops::Deref;

use image::{
	codecs::{jpeg::JpegEncoder, png::PngEncoder},
	ColorType, ImageEncoder, RgbImage,
};
use webp::Encoder;

/// Encodes a thumbnail, `quality` being in `[0, 1]`. PNG ignores it.
#[allow(clippy::cast_possible_truncation)]
pub fn encode(image: &RgbImage, format: ImageFormat, quality: f64) -> Result<Vec<u8>> {
	let mut buf = Vec::new();
	let (width, height) = image.dimensions();

	match format {
		ImageFormat::Jpeg => JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality))
			.encode_image(image)
			.map_err(|source| Error::Encode { format, source })?,

		ImageFormat::Png => PngEncoder::new(&mut buf)
			.write_image(image.as_raw(), width, height, ColorType::Rgb8)
			.map_err(|source| Error::Encode { format, source })?,

		// WebPMemory is !Send, so copy it out right away
		ImageFormat::WebP => buf.extend_from_slice(
			Encoder::from_rgb(image.as_raw(), width, height)
				.encode_simple(false, (quality.clamp(0.0, 1.0) * 100.0) as f32)
				.map_err(|e| Error::WebPEncode(format!("{e:?}")))?
				.deref(),
		),
	}

	Ok(buf)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn jpeg_quality(quality: f64) -> u8 {
	(quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}
