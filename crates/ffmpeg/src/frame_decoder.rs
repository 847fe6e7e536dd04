use crate::{
	codec_ctx::FFmpegCodecContext,
	error::{Error, FFmpegError},
	filter_graph::{FFmpegFilterGraph, Rotation},
	format_ctx::FFmpegFormatContext,
	utils::{rational_to_f64, to_locator, valid_timestamp},
	video_frame::{FFmpegFrame, FFmpegPacket, VideoFrame},
};

use std::{ptr, time::Duration};

use ffmpeg_sys_next::{AVFrame, AVRational};
use tracing::{debug, trace};

/// Decodes single frames at arbitrary times from one video input.
///
/// Holds raw FFmpeg contexts, so it must stay on the thread that created it.
pub struct FrameDecoder {
	format_ctx: FFmpegFormatContext,
	codec_ctx: FFmpegCodecContext,
	stream_index: u32,
	time_base: AVRational,
	start_time: i64,
	packet: FFmpegPacket,
	frame: FFmpegFrame,
	draining: bool,
	consumed: bool,
}

impl FrameDecoder {
	/// Opens a local path or an HTTP(S) URL and prepares a decoder for its first video stream.
	pub fn open(locator: &str) -> Result<Self, Error> {
		let mut format_ctx = FFmpegFormatContext::open_input(&to_locator(locator)?)?;
		format_ctx.find_stream_info()?;

		let stream_index = format_ctx.find_video_stream()?;
		let stream = format_ctx
			.stream(stream_index)
			.ok_or(FFmpegError::NullError)?;
		let time_base = stream.time_base;
		let start_time = valid_timestamp(stream.start_time).unwrap_or(0);
		let codec_ctx = FFmpegCodecContext::open_decoder(
			unsafe { stream.codecpar.as_ref() }.ok_or(FFmpegError::NullError)?,
		)?;

		debug!(locator, stream_index, "Opened video input");

		Ok(Self {
			format_ctx,
			codec_ctx,
			stream_index,
			time_base,
			start_time,
			packet: FFmpegPacket::new()?,
			frame: FFmpegFrame::new()?,
			draining: false,
			consumed: false,
		})
	}

	pub fn duration(&self) -> Option<Duration> {
		self.format_ctx.duration(self.stream_index)
	}

	/// Decodes the first frame presented at or after `seconds - tolerance`, or the last
	/// frame of the stream when the target lies beyond it.
	///
	/// The frame is converted to RGB24, turned upright, and downscaled to fit `max_size`
	/// when it is larger.
	pub fn frame_at(
		&mut self,
		seconds: f64,
		tolerance: Duration,
		max_size: Option<(u32, u32)>,
	) -> Result<VideoFrame, Error> {
		let target = if seconds.is_finite() {
			seconds.max(0.0)
		} else {
			0.0
		};

		if target > 0.0 || self.consumed {
			self.seek(target)?;
		}
		self.consumed = true;

		let threshold = target - tolerance.as_secs_f64();
		let mut best = FFmpegFrame::new()?;
		let mut best_time = None;

		while self.decode_next()? {
			let time = self.frame_time(self.frame.as_ref()).unwrap_or(target);
			best.take_from(&mut self.frame);
			best_time = Some(time);

			if time >= threshold {
				break;
			}
		}

		let time = best_time.ok_or(Error::FrameDecodeError)?;
		trace!(target, time, "Decoded frame");

		let rotation =
			Rotation::from_display_angle(self.format_ctx.stream_rotation_angle(self.stream_index));

		FFmpegFilterGraph::thumbnail_graph(best.as_ref(), self.time_base, rotation, max_size)?
			.run(&best, time)
	}

	fn seek(&mut self, target: f64) -> Result<(), Error> {
		let seconds_per_tick = rational_to_f64(self.time_base);
		let offset = if seconds_per_tick > 0.0 {
			(target / seconds_per_tick) as i64
		} else {
			0
		};

		self.format_ctx
			.seek_backward(self.stream_index, self.start_time.saturating_add(offset))
			.map_err(|e| {
				debug!(?e, target, "Seek failed");
				Error::SeekError(target)
			})?;

		self.codec_ctx.flush();
		self.draining = false;

		Ok(())
	}

	/// Decodes the next frame of our stream into `self.frame`, `false` once the stream ends.
	fn decode_next(&mut self) -> Result<bool, Error> {
		loop {
			match self.codec_ctx.receive_frame(self.frame.as_mut_ptr()) {
				Ok(got_frame) => return Ok(got_frame),
				Err(Error::Again) if !self.draining => {}
				Err(Error::Again) => return Ok(false),
				Err(e) => return Err(e),
			}

			self.packet.reset();
			if self.format_ctx.read_frame(self.packet.as_mut_ptr()).is_err() {
				// End of input, or a read error we can't recover from: flush what's buffered
				self.draining = true;
				match self.codec_ctx.send_packet(ptr::null()) {
					Ok(_) | Err(Error::Again) => {}
					Err(e) => return Err(e),
				}
				continue;
			}

			let packet_stream = u32::try_from(self.packet.as_ref().stream_index).ok();
			if packet_stream != Some(self.stream_index) {
				continue;
			}

			match self.codec_ctx.send_packet(self.packet.as_mut_ptr()) {
				Ok(_) | Err(Error::Again) => {}
				// A corrupt packet shouldn't cost us the whole thumbnail
				Err(e) => trace!(?e, "Skipping undecodable packet"),
			}
		}
	}

	fn frame_time(&self, frame: &AVFrame) -> Option<f64> {
		let pts = valid_timestamp(frame.best_effort_timestamp).or(valid_timestamp(frame.pts))?;

		Some(
			((pts.saturating_sub(self.start_time)) as f64 * rational_to_f64(self.time_base))
				.max(0.0),
		)
	}
}
