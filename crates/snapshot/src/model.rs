use crate::{
	consts::{
		DEFAULT_HEIGHT, DEFAULT_QUALITY, DEFAULT_TIME_POSITION, DEFAULT_WIDTH, MAX_DIMENSION,
	},
	error::{Error, Result},
};

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Where a video comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
	Path(PathBuf),
	Url(String),
}

impl VideoSource {
	/// `http://` and `https://` locators are URLs, anything else is a filesystem path.
	pub fn parse(locator: &str) -> Self {
		if locator.starts_with("http://") || locator.starts_with("https://") {
			Self::Url(locator.to_string())
		} else {
			Self::Path(PathBuf::from(locator))
		}
	}

	/// Locator as handed to a decoding backend.
	pub fn locator(&self) -> String {
		match self {
			Self::Path(path) => path.to_string_lossy().into_owned(),
			Self::Url(url) => url.clone(),
		}
	}
}

impl fmt::Display for VideoSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Path(path) => write!(f, "{}", path.display()),
			Self::Url(url) => f.write_str(url),
		}
	}
}

/// Output encodings; anything we don't recognize is encoded as JPEG.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
	#[default]
	Jpeg,
	Png,
	#[serde(rename = "webp")]
	WebP,
}

impl ImageFormat {
	/// Case-insensitive, falling back to [`ImageFormat::Jpeg`] for unknown names.
	pub fn from_name(name: &str) -> Self {
		match name.to_ascii_lowercase().as_str() {
			"png" => Self::Png,
			"webp" => Self::WebP,
			_ => Self::Jpeg,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Jpeg => "jpeg",
			Self::Png => "png",
			Self::WebP => "webp",
		}
	}

	pub const fn mime_type(self) -> &'static str {
		match self {
			Self::Jpeg => "image/jpeg",
			Self::Png => "image/png",
			Self::WebP => "image/webp",
		}
	}
}

impl FromStr for ImageFormat {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(Self::from_name(s))
	}
}

impl fmt::Display for ImageFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How the decoded frame is fitted into the requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
	/// Exactly the requested size, distorting if needed.
	Stretch,
	/// Largest size inside the requested box with the source aspect ratio.
	Fit,
	/// Like [`ScaleMode::Fit`], centered on a black canvas of the requested size.
	Letterbox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailRequest {
	pub source: VideoSource,
	/// Seconds from the start of the video.
	pub time_position: f64,
	pub width: u32,
	pub height: u32,
	/// From 0.0 to 1.0, ignored by lossless formats.
	pub quality: f64,
	pub format: ImageFormat,
	pub maintain_aspect_ratio: bool,
	/// Pad an aspect-preserved thumbnail to the full requested size.
	pub letterbox: bool,
}

impl ThumbnailRequest {
	pub fn new(source: VideoSource) -> Self {
		Self {
			source,
			time_position: DEFAULT_TIME_POSITION,
			width: DEFAULT_WIDTH,
			height: DEFAULT_HEIGHT,
			quality: DEFAULT_QUALITY,
			format: ImageFormat::default(),
			maintain_aspect_ratio: false,
			letterbox: false,
		}
	}

	#[must_use]
	pub fn at(mut self, time_position: f64) -> Self {
		self.time_position = time_position;
		self
	}

	#[must_use]
	pub fn size(mut self, width: u32, height: u32) -> Self {
		self.width = width;
		self.height = height;
		self
	}

	#[must_use]
	pub fn quality(mut self, quality: f64) -> Self {
		self.quality = quality;
		self
	}

	#[must_use]
	pub fn format(mut self, format: ImageFormat) -> Self {
		self.format = format;
		self
	}

	#[must_use]
	pub fn maintain_aspect_ratio(mut self, maintain_aspect_ratio: bool) -> Self {
		self.maintain_aspect_ratio = maintain_aspect_ratio;
		self
	}

	#[must_use]
	pub fn letterbox(mut self, letterbox: bool) -> Self {
		self.letterbox = letterbox;
		self
	}

	pub const fn scale_mode(&self) -> ScaleMode {
		match (self.maintain_aspect_ratio, self.letterbox) {
			(false, _) => ScaleMode::Stretch,
			(true, false) => ScaleMode::Fit,
			(true, true) => ScaleMode::Letterbox,
		}
	}

	/// Quality clamped into `[0, 1]`.
	pub fn effective_quality(&self) -> f64 {
		self.quality.clamp(0.0, 1.0)
	}

	pub(crate) fn validate(&self) -> Result<()> {
		if self.width == 0 || self.height == 0 {
			return Err(Error::invalid_argument(format!(
				"Thumbnail size must be at least 1x1, got {}x{}",
				self.width, self.height
			)));
		}

		if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
			return Err(Error::invalid_argument(format!(
				"Thumbnail size must be at most {MAX_DIMENSION}x{MAX_DIMENSION}, got {}x{}",
				self.width, self.height
			)));
		}

		if !self.quality.is_finite() {
			return Err(Error::invalid_argument("Quality must be a finite number"));
		}

		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailResult {
	pub data: Vec<u8>,
	pub width: u32,
	pub height: u32,
	pub format: ImageFormat,
	/// Time of the frame that was actually decoded, in seconds.
	pub time_position: f64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn format_names_are_case_insensitive_with_jpeg_fallback() {
		assert_eq!(ImageFormat::from_name("PNG"), ImageFormat::Png);
		assert_eq!(ImageFormat::from_name("WebP"), ImageFormat::WebP);
		assert_eq!(ImageFormat::from_name("jpg"), ImageFormat::Jpeg);
		assert_eq!(ImageFormat::from_name("JPEG"), ImageFormat::Jpeg);
		assert_eq!(ImageFormat::from_name("heic"), ImageFormat::Jpeg);
		assert_eq!(ImageFormat::from_name(""), ImageFormat::Jpeg);
	}

	#[test]
	fn locators_split_into_urls_and_paths() {
		assert_eq!(
			VideoSource::parse("https://cdn.example.com/clip.mp4"),
			VideoSource::Url("https://cdn.example.com/clip.mp4".to_string())
		);
		assert_eq!(
			VideoSource::parse("/sdcard/DCIM/clip.mp4"),
			VideoSource::Path(PathBuf::from("/sdcard/DCIM/clip.mp4"))
		);
		// Only http(s) is treated as remote
		assert!(matches!(
			VideoSource::parse("ftp://example.com/clip.mp4"),
			VideoSource::Path(_)
		));
	}

	#[test]
	fn scale_mode_follows_flags() {
		let request = ThumbnailRequest::new(VideoSource::parse("clip.mp4"));
		assert_eq!(request.scale_mode(), ScaleMode::Stretch);
		assert_eq!(
			request.clone().letterbox(true).scale_mode(),
			ScaleMode::Stretch
		);

		let request = request.maintain_aspect_ratio(true);
		assert_eq!(request.scale_mode(), ScaleMode::Fit);
		assert_eq!(request.letterbox(true).scale_mode(), ScaleMode::Letterbox);
	}

	#[test]
	fn validation_rejects_empty_sizes_and_nan_quality() {
		let request = ThumbnailRequest::new(VideoSource::parse("clip.mp4"));
		assert!(request.validate().is_ok());
		assert!(request.clone().size(0, 240).validate().is_err());
		assert!(request
			.clone()
			.size(MAX_DIMENSION, MAX_DIMENSION)
			.validate()
			.is_ok());
		assert!(matches!(
			request.clone().size(60_000, 60_000).validate(),
			Err(Error::InvalidArgument(_))
		));
		assert!(request.clone().size(320, MAX_DIMENSION + 1).validate().is_err());
		assert!(request.clone().quality(f64::NAN).validate().is_err());
		assert!((request.quality(3.0).effective_quality() - 1.0).abs() < f64::EPSILON);
	}
}
