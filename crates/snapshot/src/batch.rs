use crate::error::{Error, Result};

use std::{future::Future, sync::Arc};

use tokio::{
	spawn,
	sync::{mpsc, Semaphore},
};
use tracing::{trace, warn};

/// Runs every item through `f`, at most `limit` at a time, and returns the results in
/// input order.
///
/// One failing item never fails the batch. An item whose task dies before reporting, for
/// example by panicking, gets [`Error::MissingBatchResult`] in its slot.
pub async fn run_ordered<T, R, F, Fut>(items: Vec<T>, limit: usize, f: F) -> Vec<Result<R>>
where
	T: Send + 'static,
	R: Send + 'static,
	F: Fn(T) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<R>> + Send + 'static,
{
	let total = items.len();
	let semaphore = Arc::new(Semaphore::new(limit.max(1)));
	let f = Arc::new(f);
	let (tx, mut rx) = mpsc::unbounded_channel();

	for (index, item) in items.into_iter().enumerate() {
		let semaphore = Arc::clone(&semaphore);
		let f = Arc::clone(&f);
		let tx = tx.clone();

		spawn(async move {
			// The semaphore is never closed, a failed acquire only drops this slot
			let Ok(_permit) = semaphore.acquire_owned().await else {
				return;
			};

			trace!(index, "Batch item started");
			let result = f(item).await;

			if tx.send((index, result)).is_err() {
				warn!(index, "Batch collector went away before the item finished");
			}
		});
	}

	// Only the workers hold senders now, so `recv` ends once all of them are done
	drop(tx);

	let mut slots = std::iter::repeat_with(|| None)
		.take(total)
		.collect::<Vec<Option<Result<R>>>>();

	while let Some((index, result)) = rx.recv().await {
		slots[index] = Some(result);
	}

	slots
		.into_iter()
		.enumerate()
		.map(|(index, slot)| {
			slot.unwrap_or_else(|| {
				warn!(index, "Batch item exited without a result");
				Err(Error::MissingBatchResult(index))
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration,
	};

	use tokio::time::sleep;

	#[tokio::test(start_paused = true)]
	async fn results_keep_input_order() {
		// Earlier items take longer, so they finish last
		let results = run_ordered(vec![5_u64, 4, 3, 2, 1], 5, |delay| async move {
			sleep(Duration::from_millis(delay * 10)).await;
			Ok(delay)
		})
		.await;

		let values = results
			.into_iter()
			.map(Result::unwrap)
			.collect::<Vec<_>>();
		assert_eq!(values, vec![5, 4, 3, 2, 1]);
	}

	#[tokio::test(start_paused = true)]
	async fn never_exceeds_the_limit() {
		let in_flight = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));

		let results = run_ordered((0..12).collect::<Vec<usize>>(), 3, {
			let in_flight = Arc::clone(&in_flight);
			let peak = Arc::clone(&peak);
			move |i| {
				let in_flight = Arc::clone(&in_flight);
				let peak = Arc::clone(&peak);
				async move {
					let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
					peak.fetch_max(now, Ordering::SeqCst);
					sleep(Duration::from_millis(50)).await;
					in_flight.fetch_sub(1, Ordering::SeqCst);
					Ok(i)
				}
			}
		})
		.await;

		assert_eq!(results.len(), 12);
		assert!(results.iter().all(Result::is_ok));
		assert_eq!(peak.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn failures_stay_in_their_slot() {
		let results = run_ordered(vec![1, 2, 3], 2, |i| async move {
			if i == 2 {
				Err(Error::invalid_argument("Video path is required"))
			} else {
				Ok(i)
			}
		})
		.await;

		assert!(matches!(results[0], Ok(1)));
		assert!(matches!(results[1], Err(Error::InvalidArgument(_))));
		assert!(matches!(results[2], Ok(3)));
	}

	#[tokio::test]
	async fn panicking_items_report_missing_results() {
		let results = run_ordered(vec![1, 2, 3], 1, |i| async move {
			assert_ne!(i, 3, "worker blew up");
			Ok(i)
		})
		.await;

		assert!(matches!(results[0], Ok(1)));
		assert!(matches!(results[1], Ok(2)));
		assert!(matches!(results[2], Err(Error::MissingBatchResult(2))));
	}

	#[tokio::test]
	async fn empty_batches_are_fine() {
		let results = run_ordered(Vec::<u8>::new(), 2, |i| async move { Ok(i) }).await;
		assert!(results.is_empty());
	}
}
