//! The frame-decoder capability: "decode one frame at time t from source S".
//!
//! Demuxing and decoding always happen in a backend. With the `ffmpeg` feature that is
//! [`FfmpegDecoder`], otherwise [`UnsupportedDecoder`] reports the platform as unavailable.

use crate::model::VideoSource;

use std::{sync::Arc, time::Duration};

use image::RgbImage;
use thiserror::Error;

#[cfg(feature = "ffmpeg")]
mod ffmpeg;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegDecoder;

#[derive(Error, Debug)]
pub enum DecodeError {
	#[error("could not open video <source='{0}'>")]
	Open(String),
	#[error("video has no video track")]
	NoVideoTrack,
	#[error("no frame could be decoded")]
	NoFrame,
	#[error("decoder backend failure: {0}")]
	Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// What the caller intends to do with a frame, so backends can skip work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeHint {
	/// Backends may downscale into this box, keeping the aspect ratio, but never upscale.
	pub max_size: Option<(u32, u32)>,
	/// A frame presented this long before the requested time is acceptable.
	pub tolerance: Duration,
}

#[derive(Debug, Clone)]
pub struct DecodedFrame {
	pub image: RgbImage,
	/// Presentation time of the frame in seconds.
	pub time: f64,
}

/// Something that can open video sources for frame extraction.
pub trait FrameDecoder: Send + Sync {
	fn name(&self) -> &'static str;

	/// Whether this backend can decode anything at all on this platform.
	fn is_available(&self) -> bool;

	/// Opens a source. Called from a blocking worker thread, so it may block.
	fn open(&self, source: &VideoSource) -> Result<Box<dyn VideoAsset>, DecodeError>;
}

/// An opened video, used only on the worker thread that opened it.
pub trait VideoAsset {
	/// `None` when the container doesn't say.
	fn duration(&self) -> Option<Duration>;

	fn decode_frame(&mut self, at: f64, hint: DecodeHint) -> Result<DecodedFrame, DecodeError>;
}

/// Stand-in used when no decoding backend was compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedDecoder;

impl FrameDecoder for UnsupportedDecoder {
	fn name(&self) -> &'static str {
		"unsupported"
	}

	fn is_available(&self) -> bool {
		false
	}

	fn open(&self, source: &VideoSource) -> Result<Box<dyn VideoAsset>, DecodeError> {
		Err(DecodeError::Open(format!(
			"{source}: no video decoder available on this platform"
		)))
	}
}

/// The best backend compiled into this build.
#[allow(clippy::let_and_return)]
pub fn default_decoder() -> Arc<dyn FrameDecoder> {
	#[cfg(feature = "ffmpeg")]
	let decoder: Arc<dyn FrameDecoder> = Arc::new(FfmpegDecoder);

	#[cfg(not(feature = "ffmpeg"))]
	let decoder: Arc<dyn FrameDecoder> = Arc::new(UnsupportedDecoder);

	decoder
}
