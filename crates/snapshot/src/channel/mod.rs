//! Method-call interface in front of the generator.
//!
//! Calls carry a method name plus a JSON argument object and are answered with a success
//! value, a coded error, or "not implemented" for unknown methods.

use crate::{
	error::{Error, ErrorCode},
	generator::ThumbnailGenerator,
	model::ThumbnailResult,
	support::is_video_format_supported,
};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

mod arguments;

use arguments::{Arguments, OPTIONS_LIST, VIDEO_PATH};

/// Name the channel is registered under by hosts.
pub const CHANNEL_NAME: &str = "video_snapshot_generator";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
	pub method: String,
	#[serde(default)]
	pub arguments: Value,
}

impl MethodCall {
	pub fn new(method: impl Into<String>, arguments: Value) -> Self {
		Self {
			method: method.into(),
			arguments,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
	Success(Value),
	Error { code: ErrorCode, message: String },
	NotImplemented,
}

impl From<Error> for MethodResponse {
	fn from(e: Error) -> Self {
		Self::Error {
			code: e.code(),
			message: e.to_string(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
	IsPlatformAvailable,
	GenerateThumbnail,
	GenerateThumbnails,
	IsVideoFormatSupported,
}

impl Method {
	fn from_name(name: &str) -> Option<Self> {
		match name {
			"isPlatformAvailable" => Some(Self::IsPlatformAvailable),
			"generateThumbnail" => Some(Self::GenerateThumbnail),
			"generateThumbnails" => Some(Self::GenerateThumbnails),
			"isVideoFormatSupported" => Some(Self::IsVideoFormatSupported),
			_ => None,
		}
	}
}

/// Dispatches method calls to a [`ThumbnailGenerator`].
#[derive(Debug, Clone)]
pub struct ThumbnailChannel {
	generator: ThumbnailGenerator,
}

impl ThumbnailChannel {
	pub const fn new(generator: ThumbnailGenerator) -> Self {
		Self { generator }
	}

	pub async fn handle(&self, call: MethodCall) -> MethodResponse {
		let Some(method) = Method::from_name(&call.method) else {
			debug!(method = %call.method, "Unknown method");
			return MethodResponse::NotImplemented;
		};

		let arguments = Arguments::new(&call.arguments);

		match method {
			Method::IsPlatformAvailable => {
				MethodResponse::Success(Value::Bool(self.generator.is_available()))
			}

			Method::GenerateThumbnail => match arguments.thumbnail_request() {
				Ok(request) => match self.generator.generate(request).await {
					Ok(thumbnail) => MethodResponse::Success(thumbnail_value(&thumbnail)),
					Err(e) => {
						warn!(%e, "Failed to generate thumbnail");
						e.into()
					}
				},
				Err(e) => e.into(),
			},

			Method::GenerateThumbnails => {
				let Some(options_list) = arguments.list(OPTIONS_LIST) else {
					return Error::invalid_argument("Options list is required").into();
				};

				let items = options_list
					.iter()
					.map(|options| Arguments::new(options).thumbnail_request())
					.collect();

				let values = self
					.generator
					.generate_batch(items)
					.await
					.into_iter()
					.map(|result| match result {
						Ok(thumbnail) => thumbnail_value(&thumbnail),
						Err(e) => {
							warn!(%e, "Failed to generate thumbnail in batch");
							json!({ "error": e.to_string(), "code": e.code() })
						}
					})
					.collect();

				MethodResponse::Success(Value::Array(values))
			}

			Method::IsVideoFormatSupported => MethodResponse::Success(Value::Bool(
				arguments
					.string(VIDEO_PATH)
					.ok()
					.flatten()
					.is_some_and(is_video_format_supported),
			)),
		}
	}
}

fn thumbnail_value(thumbnail: &ThumbnailResult) -> Value {
	json!({
		"data": STANDARD.encode(&thumbnail.data),
		"width": thumbnail.width,
		"height": thumbnail.height,
		"format": thumbnail.format,
		"timePosition": thumbnail.time_position,
	})
}
