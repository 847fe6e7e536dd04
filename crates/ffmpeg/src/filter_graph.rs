use crate::{
	error::{Error, FFmpegError},
	utils::check_error,
	video_frame::{FFmpegFrame, VideoFrame},
};

use std::{
	ffi::{CStr, CString},
	ptr,
};

use ffmpeg_sys_next::{
	av_buffersink_get_frame, av_buffersrc_write_frame, avfilter_get_by_name,
	avfilter_graph_alloc, avfilter_graph_config, avfilter_graph_create_filter,
	avfilter_graph_free, avfilter_link, AVFilterContext, AVFilterGraph, AVFrame, AVRational,
	AV_FRAME_FLAG_INTERLACED,
};

/// Which way the display matrix asks us to turn the picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rotation {
	None,
	Clockwise,
	CounterClockwise,
	UpsideDown,
}

impl Rotation {
	/// `angle` is the counterclockwise rotation reported by `av_display_rotation_get`.
	pub(crate) fn from_display_angle(angle: f64) -> Self {
		if !(-135.0..=135.0).contains(&angle) {
			Self::UpsideDown
		} else if angle > 45.0 {
			Self::CounterClockwise
		} else if angle < -45.0 {
			Self::Clockwise
		} else {
			Self::None
		}
	}

	pub(crate) const fn swaps_dimensions(self) -> bool {
		matches!(self, Self::Clockwise | Self::CounterClockwise)
	}
}

/// A `buffer -> [yadif] -> scale -> format=rgb24 -> [rotation] -> buffersink` graph
/// that turns exactly one decoded frame into a packed RGB picture.
pub(crate) struct FFmpegFilterGraph {
	graph: *mut AVFilterGraph,
	source: *mut AVFilterContext,
	sink: *mut AVFilterContext,
}

impl FFmpegFilterGraph {
	pub(crate) fn thumbnail_graph(
		frame: &AVFrame,
		time_base: AVRational,
		rotation: Rotation,
		max_size: Option<(u32, u32)>,
	) -> Result<Self, Error> {
		let graph = unsafe { avfilter_graph_alloc() };
		if graph.is_null() {
			return Err(FFmpegError::FilterGraphAllocation.into());
		}

		let mut filter_graph = Self {
			graph,
			source: ptr::null_mut(),
			sink: ptr::null_mut(),
		};

		let buffer_args = format!(
			"video_size={}x{}:pix_fmt={}:time_base={}/{}:pixel_aspect={}/{}",
			frame.width,
			frame.height,
			frame.format,
			time_base.num,
			time_base.den,
			frame.sample_aspect_ratio.num,
			i32::max(frame.sample_aspect_ratio.den, 1)
		);

		filter_graph.source =
			filter_graph.create_filter(c"buffer", c"thumb_buffer", Some(&buffer_args))?;
		filter_graph.sink = filter_graph.create_filter(c"buffersink", c"thumb_buffersink", None)?;

		let mut chain = Vec::with_capacity(4);

		if frame.flags & AV_FRAME_FLAG_INTERLACED != 0 {
			chain.push(filter_graph.create_filter(c"yadif", c"thumb_deint", Some("deint=1"))?);
		}

		chain.push(filter_graph.create_filter(
			c"scale",
			c"thumb_scale",
			Some(&scale_args(frame, rotation, max_size)),
		)?);

		chain.push(filter_graph.create_filter(
			c"format",
			c"thumb_format",
			Some("pix_fmts=rgb24"),
		)?);

		match rotation {
			Rotation::None => {}
			Rotation::UpsideDown => {
				chain.push(filter_graph.create_filter(c"rotate", c"thumb_rotate", Some("PI"))?);
			}
			Rotation::Clockwise => {
				chain.push(filter_graph.create_filter(
					c"transpose",
					c"thumb_transpose",
					Some("clock"),
				)?);
			}
			Rotation::CounterClockwise => {
				chain.push(filter_graph.create_filter(
					c"transpose",
					c"thumb_transpose",
					Some("cclock"),
				)?);
			}
		}

		let mut previous = filter_graph.source;
		for filter in chain.into_iter().chain([filter_graph.sink]) {
			check_error(
				unsafe { avfilter_link(previous, 0, filter, 0) },
				"Failed to link filters",
			)?;
			previous = filter;
		}

		check_error(
			unsafe { avfilter_graph_config(filter_graph.graph, ptr::null_mut()) },
			"Failed to configure filter graph",
		)?;

		Ok(filter_graph)
	}

	/// Pushes `frame` through the graph, closing the input right after so filters that
	/// buffer (like yadif) flush their output.
	pub(crate) fn run(
		&mut self,
		frame: &FFmpegFrame,
		time_seconds: f64,
	) -> Result<VideoFrame, Error> {
		check_error(
			unsafe { av_buffersrc_write_frame(self.source, frame.as_ptr()) },
			"Failed to write frame to filter graph",
		)?;
		check_error(
			unsafe { av_buffersrc_write_frame(self.source, ptr::null()) },
			"Failed to close filter graph input",
		)?;

		let mut filtered = FFmpegFrame::new()?;
		check_error(
			unsafe { av_buffersink_get_frame(self.sink, filtered.as_mut_ptr()) },
			"Failed to get buffer from filter",
		)?;

		let filtered_ref = filtered.as_ref();
		let width = u32::try_from(filtered_ref.width)?;
		let height = u32::try_from(filtered_ref.height)?;
		let row_len = usize::try_from(width)? * 3;
		let line_size = isize::try_from(filtered_ref.linesize[0])?;
		let base = filtered_ref.data[0];
		if base.is_null() {
			return Err(FFmpegError::NullError.into());
		}

		let mut data = Vec::with_capacity(row_len * usize::try_from(height)?);
		for row in 0..isize::try_from(height)? {
			// Rows may be padded, or even stored bottom-up with a negative line size
			data.extend_from_slice(unsafe {
				std::slice::from_raw_parts(base.offset(row * line_size), row_len)
			});
		}

		Ok(VideoFrame {
			data,
			width,
			height,
			time_seconds,
		})
	}

	fn create_filter(
		&mut self,
		filter_name: &CStr,
		instance_name: &CStr,
		args: Option<&str>,
	) -> Result<*mut AVFilterContext, Error> {
		let args = args.map(CString::new).transpose()?;
		let mut filter_ctx = ptr::null_mut();

		check_error(
			unsafe {
				avfilter_graph_create_filter(
					&mut filter_ctx,
					avfilter_get_by_name(filter_name.as_ptr()),
					instance_name.as_ptr(),
					args.as_ref().map_or(ptr::null(), |args| args.as_ptr()),
					ptr::null_mut(),
					self.graph,
				)
			},
			&format!("Failed to create {} filter", filter_name.to_string_lossy()),
		)?;

		Ok(filter_ctx)
	}
}

impl Drop for FFmpegFilterGraph {
	fn drop(&mut self) {
		if !self.graph.is_null() {
			// Also frees every filter context owned by the graph
			unsafe { avfilter_graph_free(&mut self.graph) };
			self.graph = ptr::null_mut();
		}
	}
}

/// Downscales into `max_size` keeping the aspect ratio, never upscales.
///
/// Scaling happens before rotation, so the box is turned too for quarter rotations.
fn scale_args(frame: &AVFrame, rotation: Rotation, max_size: Option<(u32, u32)>) -> String {
	let Some((mut max_width, mut max_height)) = max_size else {
		return "w=iw:h=ih".to_string();
	};

	if rotation.swaps_dimensions() {
		std::mem::swap(&mut max_width, &mut max_height);
	}

	let fits = u32::try_from(frame.width).is_ok_and(|width| width <= max_width)
		&& u32::try_from(frame.height).is_ok_and(|height| height <= max_height);

	if fits || max_width == 0 || max_height == 0 {
		"w=iw:h=ih".to_string()
	} else {
		format!("w={max_width}:h={max_height}:force_original_aspect_ratio=decrease")
	}
}
