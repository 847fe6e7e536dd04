#![allow(clippy::unwrap_used)]

mod common;

use common::{SyntheticDecoder, FRAME_COLOR};

use vsg_snapshot::{
	DecodeHint, Error, ErrorCode, GeneratorConfig, ImageFormat, ThumbnailRequest, VideoSource,
};

use std::{sync::atomic::Ordering, time::Duration};

fn request(path: &str) -> ThumbnailRequest {
	ThumbnailRequest::new(VideoSource::parse(path))
}

#[tokio::test]
async fn decoded_time_lands_within_tolerance() {
	let decoder = SyntheticDecoder::default();
	let generator = decoder.generator();

	for requested in [0.0, 0.04, 1.37, 5.0, 9.95] {
		let thumbnail = generator
			.generate(request("/videos/clip.mp4").at(requested))
			.await
			.unwrap();

		assert!(
			(thumbnail.time_position - requested).abs() <= 0.5,
			"asked for {requested}s, got {}s",
			thumbnail.time_position
		);
	}
}

#[tokio::test]
async fn negative_times_decode_the_first_frame() {
	let decoder = SyntheticDecoder::default();

	let thumbnail = decoder
		.generator()
		.generate(request("/videos/clip.mp4").at(-4.0))
		.await
		.unwrap();

	assert_eq!(decoder.stats.requested_times(), vec![0.0]);
	assert!(thumbnail.time_position.abs() < f64::EPSILON);
}

#[tokio::test]
async fn times_past_the_end_back_off_from_it() {
	let decoder = SyntheticDecoder::default();
	let generator = decoder.generator();

	for requested in [10.0, 12.5, 1e9] {
		generator
			.generate(request("/videos/clip.mp4").at(requested))
			.await
			.unwrap();
	}

	for at in decoder.stats.requested_times() {
		assert!((at - 9.9).abs() < 1e-9, "decoded at {at}s");
	}
}

#[tokio::test]
async fn stretched_thumbnails_have_the_exact_size() {
	let thumbnail = SyntheticDecoder::default()
		.generator()
		.generate(request("/videos/clip.mp4").size(200, 200))
		.await
		.unwrap();

	assert_eq!((thumbnail.width, thumbnail.height), (200, 200));

	let image = image::load_from_memory(&thumbnail.data).unwrap();
	assert_eq!((image.width(), image.height()), (200, 200));
}

#[tokio::test]
async fn fitted_thumbnails_keep_the_source_aspect() {
	for (frame_size, expected) in [((1920, 1080), (320, 180)), ((1080, 1920), (135, 240))] {
		let decoder = SyntheticDecoder {
			frame_size,
			..Default::default()
		};

		let thumbnail = decoder
			.generator()
			.generate(
				request("/videos/clip.mp4")
					.size(320, 240)
					.maintain_aspect_ratio(true),
			)
			.await
			.unwrap();

		assert_eq!((thumbnail.width, thumbnail.height), expected);
		assert!(thumbnail.width <= 320 && thumbnail.height <= 240);

		let source_aspect = f64::from(frame_size.0) / f64::from(frame_size.1);
		let realized_aspect = f64::from(thumbnail.width) / f64::from(thumbnail.height);
		assert!((source_aspect - realized_aspect).abs() / source_aspect < 0.01);
	}
}

#[tokio::test]
async fn letterboxed_thumbnails_fill_the_box() {
	let thumbnail = SyntheticDecoder::default()
		.generator()
		.generate(
			request("/videos/clip.mp4")
				.size(320, 240)
				.format(ImageFormat::Png)
				.maintain_aspect_ratio(true)
				.letterbox(true),
		)
		.await
		.unwrap();

	assert_eq!((thumbnail.width, thumbnail.height), (320, 240));

	let image = image::load_from_memory(&thumbnail.data).unwrap().to_rgb8();
	assert_eq!(*image.get_pixel(160, 5), image::Rgb([0, 0, 0]));
	assert_eq!(*image.get_pixel(160, 120), FRAME_COLOR);
}

#[tokio::test]
async fn backends_get_an_oversampled_size_hint() {
	let decoder = SyntheticDecoder::default();

	decoder
		.generator_with(GeneratorConfig {
			decode_oversample: 3,
			seek_tolerance_secs: 0.25,
			..Default::default()
		})
		.generate(request("/videos/clip.mp4").size(100, 50))
		.await
		.unwrap();

	let requests = decoder.stats.requests.lock().unwrap();
	assert_eq!(
		requests[0].1,
		DecodeHint {
			max_size: Some((300, 150)),
			tolerance: Duration::from_millis(250),
		}
	);
}

#[tokio::test]
async fn the_format_used_is_reported() {
	let generator = SyntheticDecoder::default().generator();

	for (format, expected) in [
		(ImageFormat::Jpeg, image::ImageFormat::Jpeg),
		(ImageFormat::Png, image::ImageFormat::Png),
		(ImageFormat::WebP, image::ImageFormat::WebP),
	] {
		let thumbnail = generator
			.generate(request("/videos/clip.mp4").format(format))
			.await
			.unwrap();

		assert_eq!(thumbnail.format, format);
		assert_eq!(image::guess_format(&thumbnail.data).unwrap(), expected);
	}
}

#[tokio::test]
async fn failures_are_categorized() {
	let generator = SyntheticDecoder::default().generator();

	for (path, code) in [
		("/videos/missing.mp4", ErrorCode::GenerationFailed),
		("/videos/silent.mp4", ErrorCode::GenerationFailed),
		("/videos/empty.mp4", ErrorCode::GenerationFailed),
		("/videos/broken.mp4", ErrorCode::Exception),
	] {
		let e = generator.generate(request(path)).await.unwrap_err();
		assert_eq!(e.code(), code, "{path}: {e}");
	}
}

#[tokio::test]
async fn invalid_requests_never_reach_the_decoder() {
	let decoder = SyntheticDecoder::default();
	let generator = decoder.generator();

	for request in [
		request("/videos/clip.mp4").size(0, 240),
		request("/videos/clip.mp4").quality(f64::NAN),
		request("/videos/clip.mp4").size(60_000, 60_000),
		request("/videos/clip.mp4")
			.size(17_000, 1)
			.format(ImageFormat::WebP),
	] {
		let e = generator.generate(request).await.unwrap_err();
		assert!(matches!(e, Error::InvalidArgument(_)));
	}

	assert_eq!(decoder.stats.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn batches_keep_order_and_isolate_failures() {
	for limit in [1, 2, 4] {
		let decoder = SyntheticDecoder {
			decode_delay: Duration::from_millis(20),
			..Default::default()
		};

		let items = vec![
			Ok(request("/videos/a.mp4").at(1.0)),
			Err(Error::InvalidArgument("Video path is required".to_string())),
			Ok(request("/videos/c.mp4").at(2.0)),
			Ok(request("/videos/missing.mp4")),
			Ok(request("/videos/e.mp4").at(3.0)),
		];

		let results = decoder
			.generator_with(GeneratorConfig {
				max_concurrent_decodes: limit,
				..Default::default()
			})
			.generate_batch(items)
			.await;

		assert_eq!(results.len(), 5);
		assert!((results[0].as_ref().unwrap().time_position - 1.0).abs() < 0.5);
		assert!(matches!(results[1], Err(Error::InvalidArgument(_))));
		assert!((results[2].as_ref().unwrap().time_position - 2.0).abs() < 0.5);
		assert_eq!(
			results[3].as_ref().unwrap_err().code(),
			ErrorCode::GenerationFailed
		);
		assert!((results[4].as_ref().unwrap().time_position - 3.0).abs() < 0.5);

		// The rejected item never opened anything
		assert_eq!(decoder.stats.opened.load(Ordering::SeqCst), 4);
		assert!(decoder.stats.peak_in_flight.load(Ordering::SeqCst) <= limit);
	}
}
