use crate::consts::SUPPORTED_VIDEO_EXTENSIONS;

use std::path::Path;

/// Whether a path or URL names a container we can thumbnail, judged by extension only.
///
/// Query strings and fragments are ignored for URLs, matching is case-insensitive.
pub fn is_video_format_supported(locator: &str) -> bool {
	let path = if locator.starts_with("http://") || locator.starts_with("https://") {
		locator
			.split(['?', '#'])
			.next()
			.unwrap_or(locator)
	} else {
		locator
	};

	Path::new(path)
		.extension()
		.and_then(|extension| extension.to_str())
		.is_some_and(|extension| {
			SUPPORTED_VIDEO_EXTENSIONS
				.iter()
				.any(|supported| supported.eq_ignore_ascii_case(extension))
		})
}
