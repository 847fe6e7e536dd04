#![allow(dead_code, clippy::unwrap_used)]

use vsg_snapshot::{
	DecodeError, DecodeHint, DecodedFrame, FrameDecoder, GeneratorConfig, ThumbnailGenerator,
	VideoAsset, VideoSource,
};

use std::{
	path::Path,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc, Mutex,
	},
	thread,
	time::Duration,
};

use image::{Rgb, RgbImage};

/// Color of every synthetic frame.
pub const FRAME_COLOR: Rgb<u8> = Rgb([200, 40, 90]);

#[derive(Debug, Default)]
pub struct Stats {
	pub opened: AtomicUsize,
	pub in_flight: AtomicUsize,
	pub peak_in_flight: AtomicUsize,
	/// Every `(time, hint)` a frame was asked for.
	pub requests: Mutex<Vec<(f64, DecodeHint)>>,
}

impl Stats {
	pub fn requested_times(&self) -> Vec<f64> {
		self.requests
			.lock()
			.unwrap()
			.iter()
			.map(|(at, _)| *at)
			.collect()
	}
}

/// In-memory video backend with a fixed frame rate and solid-color frames.
///
/// The file stem of a source picks a failure: `missing*` can't be opened, `silent*` has
/// no video track, `empty*` yields no frame and `broken*` fails inside the backend.
#[derive(Debug, Clone)]
pub struct SyntheticDecoder {
	pub duration: Option<Duration>,
	pub frame_size: (u32, u32),
	pub fps: f64,
	pub decode_delay: Duration,
	pub stats: Arc<Stats>,
}

impl Default for SyntheticDecoder {
	fn default() -> Self {
		Self {
			duration: Some(Duration::from_secs(10)),
			frame_size: (1920, 1080),
			fps: 25.0,
			decode_delay: Duration::ZERO,
			stats: Arc::default(),
		}
	}
}

impl SyntheticDecoder {
	pub fn generator(&self) -> ThumbnailGenerator {
		self.generator_with(GeneratorConfig::default())
	}

	pub fn generator_with(&self, config: GeneratorConfig) -> ThumbnailGenerator {
		ThumbnailGenerator::new(Arc::new(self.clone()), config)
	}
}

impl FrameDecoder for SyntheticDecoder {
	fn name(&self) -> &'static str {
		"synthetic"
	}

	fn is_available(&self) -> bool {
		true
	}

	fn open(&self, source: &VideoSource) -> Result<Box<dyn VideoAsset>, DecodeError> {
		self.stats.opened.fetch_add(1, Ordering::SeqCst);

		let locator = source.locator();
		let stem = Path::new(&locator)
			.file_stem()
			.and_then(|stem| stem.to_str())
			.unwrap_or_default()
			.to_string();

		if stem.starts_with("missing") {
			return Err(DecodeError::Open(locator));
		}
		if stem.starts_with("silent") {
			return Err(DecodeError::NoVideoTrack);
		}
		if stem.starts_with("broken") {
			return Err(DecodeError::Backend("synthetic codec fault".into()));
		}

		Ok(Box::new(SyntheticAsset {
			decoder: self.clone(),
			empty: stem.starts_with("empty"),
		}))
	}
}

struct SyntheticAsset {
	decoder: SyntheticDecoder,
	empty: bool,
}

impl VideoAsset for SyntheticAsset {
	fn duration(&self) -> Option<Duration> {
		self.decoder.duration
	}

	fn decode_frame(&mut self, at: f64, hint: DecodeHint) -> Result<DecodedFrame, DecodeError> {
		let stats = &self.decoder.stats;
		stats.requests.lock().unwrap().push((at, hint));

		let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		stats.peak_in_flight.fetch_max(now, Ordering::SeqCst);
		thread::sleep(self.decoder.decode_delay);
		stats.in_flight.fetch_sub(1, Ordering::SeqCst);

		if self.empty {
			return Err(DecodeError::NoFrame);
		}

		let fps = self.decoder.fps;
		let mut index = (at * fps).floor();
		if let Some(duration) = self.decoder.duration {
			let last = ((duration.as_secs_f64() * fps).ceil() - 1.0).max(0.0);
			index = index.min(last);
		}

		let (width, height) = self.decoder.frame_size;

		Ok(DecodedFrame {
			image: RgbImage::from_pixel(width, height, FRAME_COLOR),
			time: index / fps,
		})
	}
}
