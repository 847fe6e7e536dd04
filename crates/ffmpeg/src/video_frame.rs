use crate::error::FFmpegError;

use ffmpeg_sys_next::{
	av_frame_alloc, av_frame_free, av_frame_move_ref, av_frame_unref, av_packet_alloc,
	av_packet_free, av_packet_unref, AVFrame, AVPacket,
};

/// A decoded frame, converted to tightly packed RGB24.
#[derive(Debug, Clone)]
pub struct VideoFrame {
	pub data: Vec<u8>,
	pub width: u32,
	pub height: u32,
	/// Presentation time from the start of the stream.
	pub time_seconds: f64,
}

pub(crate) struct FFmpegFrame(*mut AVFrame);

impl FFmpegFrame {
	pub(crate) fn new() -> Result<Self, FFmpegError> {
		let ptr = unsafe { av_frame_alloc() };
		if ptr.is_null() {
			return Err(FFmpegError::FrameAllocation);
		}
		Ok(Self(ptr))
	}

	pub(crate) fn as_ref(&self) -> &AVFrame {
		unsafe { self.0.as_ref() }.expect("initialized on struct creation")
	}

	pub(crate) const fn as_ptr(&self) -> *const AVFrame {
		self.0
	}

	pub(crate) fn as_mut_ptr(&mut self) -> *mut AVFrame {
		self.0
	}

	/// Moves the content of `other` into `self`, leaving `other` blank.
	pub(crate) fn take_from(&mut self, other: &mut Self) {
		unsafe {
			av_frame_unref(self.0);
			av_frame_move_ref(self.0, other.0);
		}
	}
}

impl Drop for FFmpegFrame {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { av_frame_free(&mut self.0) };
			self.0 = std::ptr::null_mut();
		}
	}
}

pub(crate) struct FFmpegPacket(*mut AVPacket);

impl FFmpegPacket {
	pub(crate) fn new() -> Result<Self, FFmpegError> {
		let ptr = unsafe { av_packet_alloc() };
		if ptr.is_null() {
			return Err(FFmpegError::PacketAllocation);
		}
		Ok(Self(ptr))
	}

	pub(crate) fn as_ref(&self) -> &AVPacket {
		unsafe { self.0.as_ref() }.expect("initialized on struct creation")
	}

	pub(crate) fn as_mut_ptr(&mut self) -> *mut AVPacket {
		self.0
	}

	pub(crate) fn reset(&mut self) {
		unsafe { av_packet_unref(self.0) };
	}
}

impl Drop for FFmpegPacket {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { av_packet_free(&mut self.0) };
			self.0 = std::ptr::null_mut();
		}
	}
}
