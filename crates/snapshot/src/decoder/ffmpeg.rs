use super::{DecodeError, DecodeHint, DecodedFrame, FrameDecoder, VideoAsset};
use crate::model::VideoSource;

use std::time::Duration;

use image::RgbImage;
use tracing::debug;
use vsg_ffmpeg::{Error as BackendError, FrameDecoder as FFmpegFrameDecoder};

/// Decodes with the libav* libraries linked into this build.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegDecoder;

impl FrameDecoder for FfmpegDecoder {
	fn name(&self) -> &'static str {
		"ffmpeg"
	}

	fn is_available(&self) -> bool {
		true
	}

	fn open(&self, source: &VideoSource) -> Result<Box<dyn VideoAsset>, DecodeError> {
		let locator = source.locator();

		FFmpegFrameDecoder::open(&locator)
			.map(|decoder| Box::new(FfmpegAsset(decoder)) as Box<dyn VideoAsset>)
			.map_err(|e| {
				debug!(?e, %source, "FFmpeg failed to open source");
				open_error(e, source)
			})
	}
}

fn open_error(e: BackendError, source: &VideoSource) -> DecodeError {
	match e {
		BackendError::NoVideoStream => DecodeError::NoVideoTrack,
		e if e.is_input_error() => DecodeError::Open(format!("{source}: {e}")),
		e => DecodeError::Backend(Box::new(e)),
	}
}

struct FfmpegAsset(FFmpegFrameDecoder);

impl VideoAsset for FfmpegAsset {
	fn duration(&self) -> Option<Duration> {
		self.0.duration()
	}

	fn decode_frame(&mut self, at: f64, hint: DecodeHint) -> Result<DecodedFrame, DecodeError> {
		let frame = self
			.0
			.frame_at(at, hint.tolerance, hint.max_size)
			.map_err(|e| match e {
				BackendError::FrameDecodeError | BackendError::SeekError(_) => DecodeError::NoFrame,
				e => DecodeError::Backend(Box::new(e)),
			})?;

		let time = frame.time_seconds;
		let image = RgbImage::from_raw(frame.width, frame.height, frame.data)
			.ok_or(DecodeError::NoFrame)?;

		Ok(DecodedFrame { image, time })
	}
}
