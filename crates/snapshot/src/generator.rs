use crate::{
	batch::run_ordered,
	config::GeneratorConfig,
	decoder::{DecodeHint, FrameDecoder},
	encode::encode,
	error::{Error, Result},
	model::{ThumbnailRequest, ThumbnailResult},
	scale::scale_frame,
	time::clamp_time_position,
};

use std::{fmt, sync::Arc};

use tokio::task::spawn_blocking;
use tracing::{debug, instrument, trace};

/// Produces thumbnails with a frame decoder, one blocking worker per request.
#[derive(Clone)]
pub struct ThumbnailGenerator {
	decoder: Arc<dyn FrameDecoder>,
	config: Arc<GeneratorConfig>,
}

impl fmt::Debug for ThumbnailGenerator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ThumbnailGenerator")
			.field("decoder", &self.decoder.name())
			.field("config", &self.config)
			.finish()
	}
}

impl ThumbnailGenerator {
	pub fn new(decoder: Arc<dyn FrameDecoder>, config: GeneratorConfig) -> Self {
		Self {
			decoder,
			config: Arc::new(config),
		}
	}

	pub fn is_available(&self) -> bool {
		self.decoder.is_available()
	}

	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	/// Generates one thumbnail. Decoding and encoding happen on a blocking worker thread.
	#[instrument(
		skip_all,
		fields(
			source = %request.source,
			time_position = request.time_position,
			format = %request.format,
		),
		err
	)]
	pub async fn generate(&self, request: ThumbnailRequest) -> Result<ThumbnailResult> {
		request.validate()?;

		let decoder = Arc::clone(&self.decoder);
		let config = Arc::clone(&self.config);

		spawn_blocking(move || render(decoder.as_ref(), &config, &request)).await?
	}

	/// Generates many thumbnails, at most `max_concurrent_decodes` at a time, keeping the
	/// input order.
	///
	/// Items that already failed to parse keep their error and never take a decode slot.
	pub async fn generate_batch(
		&self,
		items: Vec<Result<ThumbnailRequest>>,
	) -> Vec<Result<ThumbnailResult>> {
		let mut rejected = Vec::with_capacity(items.len());
		let mut requests = Vec::new();

		for item in items {
			match item {
				Ok(request) => {
					requests.push(request);
					rejected.push(None);
				}
				Err(e) => rejected.push(Some(e)),
			}
		}

		debug!(
			total = rejected.len(),
			to_generate = requests.len(),
			limit = self.config.max_concurrent_decodes,
			"Generating thumbnail batch"
		);

		let generator = self.clone();
		let mut generated = run_ordered(
			requests,
			self.config.max_concurrent_decodes,
			move |request| {
				let generator = generator.clone();
				async move { generator.generate(request).await }
			},
		)
		.await
		.into_iter();

		rejected
			.into_iter()
			.enumerate()
			.map(|(index, rejected)| {
				if let Some(e) = rejected {
					return Err(e);
				}

				// Missing results are reported against their position in the whole batch
				match generated.next() {
					Some(Err(Error::MissingBatchResult(_))) | None => {
						Err(Error::MissingBatchResult(index))
					}
					Some(result) => result,
				}
			})
			.collect()
	}
}

fn render(
	decoder: &dyn FrameDecoder,
	config: &GeneratorConfig,
	request: &ThumbnailRequest,
) -> Result<ThumbnailResult> {
	let mut asset = decoder.open(&request.source)?;

	let duration = asset.duration();
	let at = clamp_time_position(
		request.time_position,
		duration,
		config.end_of_stream_backoff(),
	);
	trace!(?duration, requested = request.time_position, at, "Clamped time position");

	let frame = asset.decode_frame(
		at,
		DecodeHint {
			max_size: Some((
				request.width.saturating_mul(config.decode_oversample),
				request.height.saturating_mul(config.decode_oversample),
			)),
			tolerance: config.seek_tolerance(),
		},
	)?;

	let image = scale_frame(
		&frame.image,
		request.width,
		request.height,
		request.scale_mode(),
	);
	let data = encode(&image, request.format, request.effective_quality())?;

	debug!(
		decoded_at = frame.time,
		width = image.width(),
		height = image.height(),
		bytes = data.len(),
		"Generated thumbnail"
	);

	Ok(ThumbnailResult {
		data,
		width: image.width(),
		height: image.height(),
		format: request.format,
		time_position: frame.time,
	})
}
