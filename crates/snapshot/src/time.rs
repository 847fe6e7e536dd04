use std::time::Duration;

/// Pulls a requested time position into the playable range of a video.
///
/// Negative (or NaN) requests start at the beginning. Requests at or past the end are moved
/// `backoff` before it, so there is still a frame to show. With an unknown duration only the
/// lower bound applies.
pub fn clamp_time_position(requested: f64, duration: Option<Duration>, backoff: Duration) -> f64 {
	if requested.is_nan() || requested < 0.0 {
		return 0.0;
	}

	match duration.map(|duration| duration.as_secs_f64()) {
		Some(duration) if requested >= duration => (duration - backoff.as_secs_f64()).max(0.0),
		_ => requested,
	}
}
