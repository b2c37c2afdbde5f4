use std::time::Duration;

/// Total attempts made by the price client, first call included.
pub const MAX_ATTEMPTS: u32 = 3;
pub const BASE_DELAY: Duration = Duration::from_millis(100);

/// Retry `f` while `should_retry` accepts the error, with exponential backoff
/// (`base_delay * 2^attempt`). Errors the predicate rejects return at once.
pub async fn retry_if<T, F, Fut, P>(
    max_attempts: u32,
    base_delay: Duration,
    should_retry: P,
    f: F,
) -> anyhow::Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
    P: Fn(&anyhow::Error) -> bool,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts || !should_retry(&e) {
                    return Err(e);
                }
                let delay = base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(attempt, ?delay, error = %e, "retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// 5xx responses, timeouts and connection failures.
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<reqwest::Error>())
        .any(|e| {
            e.status().is_some_and(|s| s.is_server_error()) || e.is_timeout() || e.is_connect()
        })
}
