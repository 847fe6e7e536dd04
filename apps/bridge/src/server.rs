use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{
	io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
	spawn,
	sync::mpsc,
	task::JoinSet,
};
use tracing::{debug, error, warn};
use vsg_snapshot::{ErrorCode, MethodCall, MethodResponse, ThumbnailChannel};

/// One method call per input line.
#[derive(Debug, Deserialize)]
struct Request {
	#[serde(default)]
	id: Value,
	method: String,
	#[serde(default)]
	arguments: Value,
}

/// One answer per output line, carrying the id of its request.
#[derive(Debug, Serialize)]
struct Response {
	id: Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	result: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<ResponseError>,
}

#[derive(Debug, Serialize)]
struct ResponseError {
	code: &'static str,
	message: String,
}

impl Response {
	fn error(id: Value, code: &'static str, message: String) -> Self {
		Self {
			id,
			result: None,
			error: Some(ResponseError { code, message }),
		}
	}

	fn answer(id: Value, method: &str, response: MethodResponse) -> Self {
		match response {
			MethodResponse::Success(result) => Self {
				id,
				result: Some(result),
				error: None,
			},
			MethodResponse::Error { code, message } => Self::error(id, code.as_str(), message),
			MethodResponse::NotImplemented => Self::error(
				id,
				"NOT_IMPLEMENTED",
				format!("Method `{method}` is not implemented"),
			),
		}
	}
}

/// Answers newline-delimited JSON method calls from `reader` on `writer` until the input
/// ends, then waits for the calls still running.
///
/// Calls run concurrently, so responses may come back in a different order than the
/// requests; the `id` ties them together.
pub async fn serve<R, W>(channel: ThumbnailChannel, reader: R, writer: W) -> Result<()>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin + Send + 'static,
{
	let (tx, rx) = mpsc::unbounded_channel::<Response>();
	let writer_handle = spawn(write_responses(rx, writer));

	let mut lines = BufReader::new(reader).lines();
	let mut in_flight = JoinSet::new();

	while let Some(line) = lines.next_line().await? {
		if line.trim().is_empty() {
			continue;
		}

		let request = match serde_json::from_str::<Request>(&line) {
			Ok(request) => request,
			Err(e) => {
				warn!(%e, "Received a malformed request line");
				if tx
					.send(Response::error(
						Value::Null,
						ErrorCode::InvalidArgument.as_str(),
						format!("Malformed request: {e}"),
					))
					.is_err()
				{
					break;
				}
				continue;
			}
		};

		debug!(id = %request.id, method = %request.method, "Received method call");

		let channel = channel.clone();
		let tx = tx.clone();
		in_flight.spawn(async move {
			let Request {
				id,
				method,
				arguments,
			} = request;

			let response = channel
				.handle(MethodCall::new(method.as_str(), arguments))
				.await;

			if tx.send(Response::answer(id, &method, response)).is_err() {
				warn!(%method, "Response writer is gone, dropping response");
			}
		});
	}

	while let Some(res) = in_flight.join_next().await {
		if let Err(e) = res {
			error!(?e, "Method call task failed");
		}
	}

	// Last sender gone, the writer finishes once the queue is drained
	drop(tx);

	writer_handle.await?
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<Response>, mut writer: W) -> Result<()>
where
	W: AsyncWrite + Unpin,
{
	while let Some(response) = rx.recv().await {
		let mut line = serde_json::to_vec(&response)?;
		line.push(b'\n');

		writer.write_all(&line).await?;
		writer.flush().await?;
	}

	writer.shutdown().await?;

	Ok(())
}
