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
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future, unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Still-image thumbnails from videos: pick a frame at a time position, scale it, re-encode
//! it, and serve all of that through a small method-call interface.

pub mod batch;
pub mod channel;
pub mod config;
pub mod consts;
pub mod decoder;
pub mod encode;
pub mod error;
pub mod generator;
pub mod model;
pub mod scale;
pub mod support;
pub mod time;

pub use channel::{MethodCall, MethodResponse, ThumbnailChannel, CHANNEL_NAME};
pub use config::{ConfigError, GeneratorConfig};
pub use decoder::{
	default_decoder, DecodeError, DecodeHint, DecodedFrame, FrameDecoder, UnsupportedDecoder,
	VideoAsset,
};
pub use error::{Error, ErrorCode, Result};
pub use generator::ThumbnailGenerator;
pub use model::{ImageFormat, ScaleMode, ThumbnailRequest, ThumbnailResult, VideoSource};
pub use support::is_video_format_supported;
