use std::{ffi::c_int, ffi::NulError, num::TryFromIntError};

use ffmpeg_sys_next::{
	AVERROR_BSF_NOT_FOUND, AVERROR_BUFFER_TOO_SMALL, AVERROR_BUG, AVERROR_BUG2,
	AVERROR_DECODER_NOT_FOUND, AVERROR_DEMUXER_NOT_FOUND, AVERROR_EOF, AVERROR_EXIT,
	AVERROR_EXTERNAL, AVERROR_FILTER_NOT_FOUND, AVERROR_HTTP_BAD_REQUEST, AVERROR_HTTP_FORBIDDEN,
	AVERROR_HTTP_NOT_FOUND, AVERROR_HTTP_OTHER_4XX, AVERROR_HTTP_SERVER_ERROR,
	AVERROR_HTTP_UNAUTHORIZED, AVERROR_INVALIDDATA, AVERROR_OPTION_NOT_FOUND,
	AVERROR_PATCHWELCOME, AVERROR_PROTOCOL_NOT_FOUND, AVERROR_STREAM_NOT_FOUND, AVERROR_UNKNOWN,
	AVUNERROR,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library.
#[derive(Error, Debug)]
pub enum Error {
	#[error("String handed to FFmpeg contains an interior nul byte: {0}")]
	Nul(#[from] NulError),
	#[error("FFmpeg internal error: {0}")]
	FFmpeg(#[from] FFmpegError),
	#[error("FFmpeg internal error: {0}; Reason: {1}")]
	FFmpegWithReason(FFmpegError, String),
	#[error("Input has no decodable video stream")]
	NoVideoStream,
	#[error("Failed to decode video frame")]
	FrameDecodeError,
	#[error("Failed to seek video to {0}s")]
	SeekError(f64),
	#[error("Error while casting an integer: {0}")]
	TryFromInt(#[from] TryFromIntError),
	// Decoder wants more input before it can emit a frame, never leaves this crate
	#[error("Resource temporarily unavailable")]
	Again,
}

impl Error {
	/// Whether the failure is about the input itself (missing, unreadable, not a video,
	/// or in a codec this build can't decode) rather than a fault inside FFmpeg.
	pub const fn is_input_error(&self) -> bool {
		matches!(
			self,
			Self::Nul(_)
				| Self::FFmpeg(FFmpegError::DecoderNotFound)
				| Self::FFmpegWithReason(
					FFmpegError::DecoderNotFound
						| FFmpegError::DemuxerNotFound
						| FFmpegError::ProtocolNotFound
						| FFmpegError::InvalidData
						| FFmpegError::Eof
						| FFmpegError::HttpBadRequest
						| FFmpegError::HttpUnauthorized
						| FFmpegError::HttpForbidden
						| FFmpegError::HttpNotFound
						| FFmpegError::HttpOther4xx
						| FFmpegError::HttpServerError
						| FFmpegError::OtherOSError(_),
					_
				)
		)
	}
}

/// Enum to represent possible errors from FFmpeg library
///
/// Extracted from https://ffmpeg.org/doxygen/trunk/group__lavu__error.html
#[derive(Error, Debug)]
pub enum FFmpegError {
	#[error("Bitstream filter not found")]
	BitstreamFilterNotFound,
	#[error("Internal bug, also see AVERROR_BUG2")]
	InternalBug,
	#[error("Buffer too small")]
	BufferTooSmall,
	#[error("Decoder not found")]
	DecoderNotFound,
	#[error("Demuxer not found")]
	DemuxerNotFound,
	#[error("End of file")]
	Eof,
	#[error("Immediate exit was requested; the called function should not be restarted")]
	Exit,
	#[error("Generic error in an external library")]
	External,
	#[error("Filter not found")]
	FilterNotFound,
	#[error("Invalid data found when processing input")]
	InvalidData,
	#[error("Option not found")]
	OptionNotFound,
	#[error("Not yet implemented in FFmpeg, patches welcome")]
	NotImplemented,
	#[error("Protocol not found")]
	ProtocolNotFound,
	#[error("Stream not found")]
	StreamNotFound,
	#[error("Internal bug, also see AVERROR_BUG")]
	InternalBug2,
	#[error("Unknown error, typically from an external library")]
	Unknown,
	#[error("HTTP Bad Request: 400")]
	HttpBadRequest,
	#[error("HTTP Unauthorized: 401")]
	HttpUnauthorized,
	#[error("HTTP Forbidden: 403")]
	HttpForbidden,
	#[error("HTTP Not Found: 404")]
	HttpNotFound,
	#[error("Other HTTP error: 4xx")]
	HttpOther4xx,
	#[error("HTTP Internal Server Error: 500")]
	HttpServerError,
	#[error("Other OS error, errno = {0}")]
	OtherOSError(c_int),
	#[error("Frame allocation error")]
	FrameAllocation,
	#[error("Packet allocation error")]
	PacketAllocation,
	#[error("Video Codec allocation error")]
	VideoCodecAllocation,
	#[error("Filter Graph allocation error")]
	FilterGraphAllocation,
	#[error("Unexpected null pointer")]
	NullError,
}

impl From<c_int> for FFmpegError {
	fn from(code: c_int) -> Self {
		match code {
			AVERROR_BSF_NOT_FOUND => Self::BitstreamFilterNotFound,
			AVERROR_BUG => Self::InternalBug,
			AVERROR_BUFFER_TOO_SMALL => Self::BufferTooSmall,
			AVERROR_DECODER_NOT_FOUND => Self::DecoderNotFound,
			AVERROR_DEMUXER_NOT_FOUND => Self::DemuxerNotFound,
			AVERROR_EOF => Self::Eof,
			AVERROR_EXIT => Self::Exit,
			AVERROR_EXTERNAL => Self::External,
			AVERROR_FILTER_NOT_FOUND => Self::FilterNotFound,
			AVERROR_INVALIDDATA => Self::InvalidData,
			AVERROR_OPTION_NOT_FOUND => Self::OptionNotFound,
			AVERROR_PATCHWELCOME => Self::NotImplemented,
			AVERROR_PROTOCOL_NOT_FOUND => Self::ProtocolNotFound,
			AVERROR_STREAM_NOT_FOUND => Self::StreamNotFound,
			AVERROR_BUG2 => Self::InternalBug2,
			AVERROR_UNKNOWN => Self::Unknown,
			AVERROR_HTTP_BAD_REQUEST => Self::HttpBadRequest,
			AVERROR_HTTP_UNAUTHORIZED => Self::HttpUnauthorized,
			AVERROR_HTTP_FORBIDDEN => Self::HttpForbidden,
			AVERROR_HTTP_NOT_FOUND => Self::HttpNotFound,
			AVERROR_HTTP_OTHER_4XX => Self::HttpOther4xx,
			AVERROR_HTTP_SERVER_ERROR => Self::HttpServerError,
			other => Self::OtherOSError(AVUNERROR(other)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_codec_is_an_input_error() {
		assert!(Error::FFmpeg(FFmpegError::DecoderNotFound).is_input_error());
		assert!(Error::FFmpegWithReason(
			FFmpegError::DecoderNotFound,
			"no decoder for hevc".to_string()
		)
		.is_input_error());
	}

	#[test]
	fn internal_faults_are_not_input_errors() {
		assert!(!Error::FFmpeg(FFmpegError::FrameAllocation).is_input_error());
		assert!(!Error::FFmpeg(FFmpegError::InternalBug).is_input_error());
		assert!(!Error::FrameDecodeError.is_input_error());
		assert!(Error::FFmpegWithReason(FFmpegError::InvalidData, "moov atom".to_string())
			.is_input_error());
	}
}
