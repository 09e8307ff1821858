use std::{fmt::Display, future::Future, time::Duration};

const BACKOFF_STEP_MS: u64 = 100;

/// Runs `op` up to `max_retries + 1` times with a linear backoff. Only for idempotent reads.
pub(crate) async fn with_retries<T, E, F, Fut>(
	stage: &'static str,
	max_retries: u32,
	mut op: F,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: Display,
{
	let mut attempt = 0;

	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(err) if attempt < max_retries => {
				attempt += 1;

				tracing::warn!(stage, attempt, error = %err, "Retrying provider read.");
				tokio::time::sleep(Duration::from_millis(BACKOFF_STEP_MS * attempt as u64)).await;
			},
			Err(err) => return Err(err),
		}
	}
}
