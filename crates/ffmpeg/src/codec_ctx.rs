use crate::{
	error::{Error, FFmpegError},
	utils::check_error,
};

use std::ptr;

use ffmpeg_sys_next::{
	avcodec_alloc_context3, avcodec_find_decoder, avcodec_flush_buffers, avcodec_free_context,
	avcodec_open2, avcodec_parameters_to_context, avcodec_receive_frame, avcodec_send_packet,
	AVCodecContext, AVCodecParameters, AVFrame, AVPacket, AVERROR, AVERROR_EOF,
};
use libc::EAGAIN;

pub(crate) struct FFmpegCodecContext {
	ptr: *mut AVCodecContext,
}

impl FFmpegCodecContext {
	/// Allocates and opens a decoder matching the given stream parameters.
	pub(crate) fn open_decoder(codec_params: &AVCodecParameters) -> Result<Self, Error> {
		let codec = unsafe { avcodec_find_decoder(codec_params.codec_id).as_ref() }
			.ok_or(FFmpegError::DecoderNotFound)?;

		let ptr = unsafe { avcodec_alloc_context3(codec) };
		if ptr.is_null() {
			Err(FFmpegError::VideoCodecAllocation)?;
		}
		let mut ctx = Self { ptr };

		check_error(
			unsafe { avcodec_parameters_to_context(ctx.ptr, codec_params) },
			"Fail to fill the codec context with codec parameters",
		)?;

		ctx.as_mut().workaround_bugs = 1;

		check_error(
			unsafe { avcodec_open2(ctx.ptr, codec, ptr::null_mut()) },
			"Failed to open video codec",
		)?;

		Ok(ctx)
	}

	pub(crate) fn as_mut(&mut self) -> &mut AVCodecContext {
		unsafe { self.ptr.as_mut() }.expect("initialized on struct creation")
	}

	pub(crate) fn flush(&mut self) {
		unsafe { avcodec_flush_buffers(self.ptr) };
	}

	/// Feeds a packet to the decoder; a null packet enters draining mode.
	pub(crate) fn send_packet(&mut self, packet: *const AVPacket) -> Result<bool, Error> {
		match unsafe { avcodec_send_packet(self.ptr, packet) } {
			AVERROR_EOF => Ok(false),
			ret if ret == AVERROR(EAGAIN) => Err(Error::Again),
			ret if ret < 0 => Err(Error::FFmpegWithReason(
				FFmpegError::from(ret),
				"Failed to send packet to decoder".to_string(),
			)),
			_ => Ok(true),
		}
	}

	/// `Ok(false)` once the decoder is fully drained.
	pub(crate) fn receive_frame(&mut self, frame: *mut AVFrame) -> Result<bool, Error> {
		match unsafe { avcodec_receive_frame(self.ptr, frame) } {
			AVERROR_EOF => Ok(false),
			ret if ret == AVERROR(EAGAIN) => Err(Error::Again),
			ret if ret < 0 => Err(Error::FFmpegWithReason(
				FFmpegError::from(ret),
				"Failed to receive frame from decoder".to_string(),
			)),
			_ => Ok(true),
		}
	}
}

impl Drop for FFmpegCodecContext {
	fn drop(&mut self) {
		if !self.ptr.is_null() {
			unsafe { avcodec_free_context(&mut self.ptr) };
			self.ptr = ptr::null_mut();
		}
	}
}
