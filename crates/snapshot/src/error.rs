use crate::{decoder::DecodeError, model::ImageFormat};

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::task::JoinError;

pub type Result<T> = std::result::Result<T, Error>;

/// The three failure categories reported back over the method channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// A required argument is missing or an argument is malformed.
	InvalidArgument,
	/// The source could not be opened, has no video, yielded no frame, or could not be encoded.
	GenerationFailed,
	/// Anything unexpected, including faults inside the decoding backend.
	Exception,
}

impl ErrorCode {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::InvalidArgument => "INVALID_ARGUMENT",
			Self::GenerationFailed => "GENERATION_FAILED",
			Self::Exception => "EXCEPTION",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("{0}")]
	InvalidArgument(String),
	#[error("failed to generate thumbnail: {0}")]
	Decode(#[from] DecodeError),
	#[error("failed to encode thumbnail as {format}: {source}")]
	Encode {
		format: ImageFormat,
		#[source]
		source: image::ImageError,
	},
	#[error("failed to encode thumbnail as webp: {0}")]
	WebPEncode(String),
	#[error("background task failed: {0}")]
	BackgroundTaskFailed(#[from] JoinError),
	#[error("worker for batch item {0} exited without a result")]
	MissingBatchResult(usize),
}

impl Error {
	pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
		Self::InvalidArgument(message.into())
	}

	pub const fn code(&self) -> ErrorCode {
		match self {
			Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
			Self::Decode(DecodeError::Backend(_)) => ErrorCode::Exception,
			Self::Decode(_) | Self::Encode { .. } | Self::WebPEncode(_) => ErrorCode::GenerationFailed,
			Self::BackgroundTaskFailed(_) | Self::MissingBatchResult(_) => ErrorCode::Exception,
		}
	}
}
