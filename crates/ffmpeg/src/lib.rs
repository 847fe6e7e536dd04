#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	unused_allocation,
	clippy::dbg_macro
)]
#![allow(
	clippy::missing_errors_doc,
	clippy::module_name_repetitions,
	clippy::cast_possible_truncation,
	clippy::cast_precision_loss
)]

//! Minimal FFmpeg bindings for pulling a single still frame out of a video.

mod codec_ctx;
mod error;
mod filter_graph;
mod format_ctx;
mod frame_decoder;
mod utils;
mod video_frame;

pub use error::{Error, FFmpegError, Result};
pub use frame_decoder::FrameDecoder;
pub use video_frame::VideoFrame;
