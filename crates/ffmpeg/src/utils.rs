use crate::error::{Error, FFmpegError};

use std::{ffi::CString, sync::Once};

use ffmpeg_sys_next::{avformat_network_init, AVRational, AV_NOPTS_VALUE};
use tracing::warn;

static NETWORK_INIT: Once = Once::new();

pub(crate) fn check_error(return_code: i32, error_message: &str) -> Result<(), Error> {
	if return_code < 0 {
		Err(Error::FFmpegWithReason(
			FFmpegError::from(return_code),
			error_message.to_string(),
		))
	} else {
		Ok(())
	}
}

/// Turns a filesystem path or URL into something `avformat_open_input` accepts.
///
/// Network protocols need `avformat_network_init` before first use, so it's done here, once.
pub(crate) fn to_locator(locator: &str) -> Result<CString, Error> {
	if locator.starts_with("http://") || locator.starts_with("https://") {
		NETWORK_INIT.call_once(|| {
			if unsafe { avformat_network_init() } < 0 {
				warn!("Failed to initialize FFmpeg network components");
			}
		});
	}

	CString::new(locator).map_err(Into::into)
}

pub(crate) fn rational_to_f64(rational: AVRational) -> f64 {
	if rational.den == 0 {
		0.0
	} else {
		f64::from(rational.num) / f64::from(rational.den)
	}
}

pub(crate) const fn valid_timestamp(timestamp: i64) -> Option<i64> {
	if timestamp == AV_NOPTS_VALUE {
		None
	} else {
		Some(timestamp)
	}
}
