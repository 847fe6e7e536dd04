use crate::consts::{
	DEFAULT_DECODE_OVERSAMPLE, DEFAULT_END_OF_STREAM_BACKOFF_SECS,
	DEFAULT_MAX_CONCURRENT_DECODES, DEFAULT_SEEK_TOLERANCE_SECS,
};

use std::{
	io,
	path::{Path, PathBuf},
	time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

/// Tunables of the thumbnail pipeline. Every field may be omitted from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
	/// Upper bound on frames being decoded at once by a batch.
	pub max_concurrent_decodes: usize,
	/// How far before the requested time an accepted frame may lie.
	pub seek_tolerance_secs: f64,
	/// Distance from the end used for requests at or past the end of a video.
	pub end_of_stream_backoff_secs: f64,
	/// Backends may downscale to this multiple of the requested size before we resample.
	pub decode_oversample: u32,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self {
			max_concurrent_decodes: DEFAULT_MAX_CONCURRENT_DECODES,
			seek_tolerance_secs: DEFAULT_SEEK_TOLERANCE_SECS,
			end_of_stream_backoff_secs: DEFAULT_END_OF_STREAM_BACKOFF_SECS,
			decode_oversample: DEFAULT_DECODE_OVERSAMPLE,
		}
	}
}

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("failed to read config file <path='{}'>: {source}", .path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to parse config file <path='{}'>: {source}", .path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},
	#[error("invalid config value for `{field}`: {reason}")]
	Invalid {
		field: &'static str,
		reason: &'static str,
	},
}

impl GeneratorConfig {
	/// Reads a JSON config file and validates it.
	pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();

		let bytes = fs::read(path).await.map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;

		let config = serde_json::from_slice::<Self>(&bytes).map_err(|source| {
			ConfigError::Parse {
				path: path.to_path_buf(),
				source,
			}
		})?;

		config.validate()?;

		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_concurrent_decodes == 0 {
			return Err(ConfigError::Invalid {
				field: "max_concurrent_decodes",
				reason: "must be at least 1",
			});
		}

		for (field, value) in [
			("seek_tolerance_secs", self.seek_tolerance_secs),
			("end_of_stream_backoff_secs", self.end_of_stream_backoff_secs),
		] {
			if !value.is_finite() || value < 0.0 {
				return Err(ConfigError::Invalid {
					field,
					reason: "must be a finite, non-negative number of seconds",
				});
			}
		}

		if self.decode_oversample == 0 {
			return Err(ConfigError::Invalid {
				field: "decode_oversample",
				reason: "must be at least 1",
			});
		}

		Ok(())
	}

	/// Only meaningful on a validated config.
	pub fn seek_tolerance(&self) -> Duration {
		Duration::try_from_secs_f64(self.seek_tolerance_secs).unwrap_or_default()
	}

	/// Only meaningful on a validated config.
	pub fn end_of_stream_backoff(&self) -> Duration {
		Duration::try_from_secs_f64(self.end_of_stream_backoff_secs).unwrap_or_default()
	}
}
