use crate::{
	error::{Error, Result},
	model::{ImageFormat, ThumbnailRequest, VideoSource},
};

use serde_json::{Map, Value};

pub(super) const VIDEO_PATH: &str = "videoPath";
pub(super) const OPTIONS_LIST: &str = "optionsList";

const TIME_POSITION: &str = "timePosition";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const QUALITY: &str = "quality";
const FORMAT: &str = "format";
const MAINTAIN_ASPECT_RATIO: &str = "maintainAspectRatio";
const LETTERBOX: &str = "letterbox";

/// Typed view over the argument object of a method call.
///
/// Absent and `null` arguments are the same thing. A present argument of the wrong type is
/// an invalid-argument error rather than silently defaulted.
pub(super) struct Arguments<'a>(Option<&'a Map<String, Value>>);

impl<'a> Arguments<'a> {
	pub(super) fn new(value: &'a Value) -> Self {
		Self(value.as_object())
	}

	fn get(&self, key: &str) -> Option<&'a Value> {
		self.0
			.and_then(|map| map.get(key))
			.filter(|value| !value.is_null())
	}

	pub(super) fn string(&self, key: &str) -> Result<Option<&'a str>> {
		self.get(key)
			.map(|value| {
				value
					.as_str()
					.ok_or_else(|| wrong_type(key, "a string", value))
			})
			.transpose()
	}

	fn number(&self, key: &str) -> Result<Option<f64>> {
		self.get(key)
			.map(|value| {
				value
					.as_f64()
					.ok_or_else(|| wrong_type(key, "a number", value))
			})
			.transpose()
	}

	fn dimension(&self, key: &str) -> Result<Option<u32>> {
		self.get(key)
			.map(|value| {
				value
					.as_u64()
					.and_then(|n| u32::try_from(n).ok())
					.ok_or_else(|| wrong_type(key, "a non-negative integer", value))
			})
			.transpose()
	}

	fn flag(&self, key: &str) -> Result<Option<bool>> {
		self.get(key)
			.map(|value| {
				value
					.as_bool()
					.ok_or_else(|| wrong_type(key, "a boolean", value))
			})
			.transpose()
	}

	pub(super) fn list(&self, key: &str) -> Option<&'a Vec<Value>> {
		self.get(key).and_then(Value::as_array)
	}

	/// Builds a thumbnail request, every argument except `videoPath` being optional.
	pub(super) fn thumbnail_request(&self) -> Result<ThumbnailRequest> {
		let video_path = self
			.string(VIDEO_PATH)
			.ok()
			.flatten()
			.filter(|path| !path.is_empty())
			.ok_or_else(|| Error::invalid_argument("Video path is required"))?;

		let mut request = ThumbnailRequest::new(VideoSource::parse(video_path));

		if let Some(time_position) = self.number(TIME_POSITION)? {
			request = request.at(time_position);
		}

		let width = self.dimension(WIDTH)?.unwrap_or(request.width);
		let height = self.dimension(HEIGHT)?.unwrap_or(request.height);
		request = request.size(width, height);

		if let Some(quality) = self.number(QUALITY)? {
			request = request.quality(quality);
		}

		if let Some(format) = self.string(FORMAT)? {
			request = request.format(ImageFormat::from_name(format));
		}

		if let Some(maintain_aspect_ratio) = self.flag(MAINTAIN_ASPECT_RATIO)? {
			request = request.maintain_aspect_ratio(maintain_aspect_ratio);
		}

		if let Some(letterbox) = self.flag(LETTERBOX)? {
			request = request.letterbox(letterbox);
		}

		Ok(request)
	}
}

fn wrong_type(key: &str, expected: &str, value: &Value) -> Error {
	Error::invalid_argument(format!("Argument `{key}` must be {expected}, got {value}"))
}
