use crate::{
	error::{Error, FFmpegError},
	utils::{check_error, rational_to_f64, valid_timestamp},
};

use std::{ffi::CStr, ffi::c_int, ptr, time::Duration};

use ffmpeg_sys_next::{
	av_display_rotation_get, av_packet_side_data_get, av_read_frame, av_seek_frame,
	avformat_close_input, avformat_find_stream_info, avformat_open_input, AVFormatContext,
	AVMediaType, AVPacket, AVPacketSideDataType, AVStream, AVSEEK_FLAG_BACKWARD,
	AV_DISPOSITION_ATTACHED_PIC, AV_TIME_BASE,
};

#[derive(Debug)]
pub(crate) struct FFmpegFormatContext {
	data: *mut AVFormatContext,
}

impl FFmpegFormatContext {
	pub(crate) fn open_input(locator: &CStr) -> Result<Self, Error> {
		let mut ctx = Self {
			data: ptr::null_mut(),
		};

		check_error(
			unsafe {
				avformat_open_input(
					&mut ctx.data,
					locator.as_ptr(),
					ptr::null_mut(),
					ptr::null_mut(),
				)
			},
			"Fail to open an input stream and read the header",
		)?;

		Ok(ctx)
	}

	pub(crate) fn as_ref(&self) -> &AVFormatContext {
		unsafe { self.data.as_ref() }.expect("initialized on struct creation")
	}

	pub(crate) fn find_stream_info(&mut self) -> Result<(), Error> {
		check_error(
			unsafe { avformat_find_stream_info(self.data, ptr::null_mut()) },
			"Fail to read packets of a media file to get stream information",
		)
	}

	pub(crate) fn stream(&self, index: u32) -> Option<&AVStream> {
		let ctx = self.as_ref();
		if index >= ctx.nb_streams || ctx.streams.is_null() {
			return None;
		}

		unsafe { (*ctx.streams.add(index as usize)).as_ref() }
	}

	/// Index of the first real video stream, skipping cover art and other attached pictures.
	pub(crate) fn find_video_stream(&self) -> Result<u32, Error> {
		(0..self.as_ref().nb_streams)
			.find(|&index| {
				self.stream(index).is_some_and(|stream| {
					let is_video = unsafe { stream.codecpar.as_ref() }.is_some_and(|codecpar| {
						codecpar.codec_type == AVMediaType::AVMEDIA_TYPE_VIDEO
					});

					is_video && stream.disposition & (AV_DISPOSITION_ATTACHED_PIC as c_int) == 0
				})
			})
			.ok_or(Error::NoVideoStream)
	}

	/// Container duration, falling back to the duration of the given stream.
	pub(crate) fn duration(&self, stream_index: u32) -> Option<Duration> {
		let container = valid_timestamp(self.as_ref().duration)
			.filter(|&duration| duration > 0)
			.map(|duration| duration as f64 / f64::from(AV_TIME_BASE));

		container
			.or_else(|| {
				self.stream(stream_index).and_then(|stream| {
					valid_timestamp(stream.duration)
						.filter(|&duration| duration > 0)
						.map(|duration| duration as f64 * rational_to_f64(stream.time_base))
				})
			})
			.filter(|seconds| seconds.is_finite())
			.map(Duration::from_secs_f64)
	}

	/// Rotation from the stream display matrix, in degrees, or 0 when there is none.
	#[allow(clippy::cast_ptr_alignment)]
	pub(crate) fn stream_rotation_angle(&self, stream_index: u32) -> f64 {
		let Some(codecpar) = self
			.stream(stream_index)
			.and_then(|stream| unsafe { stream.codecpar.as_ref() })
		else {
			return 0.0;
		};

		let side_data = unsafe {
			av_packet_side_data_get(
				codecpar.coded_side_data,
				codecpar.nb_coded_side_data,
				AVPacketSideDataType::AV_PKT_DATA_DISPLAYMATRIX,
			)
			.as_ref()
		};

		side_data
			.filter(|side_data| !side_data.data.is_null())
			.map(|side_data| unsafe { av_display_rotation_get(side_data.data as *const i32) })
			.filter(|angle| angle.is_finite())
			.unwrap_or(0.0)
	}

	pub(crate) fn read_frame(&mut self, packet: *mut AVPacket) -> Result<(), Error> {
		check_error(
			unsafe { av_read_frame(self.data, packet) },
			"Fail to read the next packet",
		)
	}

	/// Seeks to the closest keyframe at or before `timestamp`, in the stream time base.
	pub(crate) fn seek_backward(&mut self, stream_index: u32, timestamp: i64) -> Result<(), Error> {
		check_error(
			unsafe {
				av_seek_frame(
					self.data,
					c_int::try_from(stream_index).map_err(|_| FFmpegError::StreamNotFound)?,
					timestamp,
					AVSEEK_FLAG_BACKWARD as c_int,
				)
			},
			"Seeking video failed",
		)
	}
}

impl Drop for FFmpegFormatContext {
	fn drop(&mut self) {
		if !self.data.is_null() {
			unsafe { avformat_close_input(&mut self.data) };
			self.data = ptr::null_mut();
		}
	}
}
