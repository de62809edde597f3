use std::future::Future;

use crate::error::KiraError;

/// Runs `future` to completion on a fresh multi-thread runtime, then shuts the
/// runtime down without waiting on blocking tasks. Fetches abandoned after a
/// timeout keep their threads until they return; the caller does not.
pub fn block_on_detached<F: Future>(future: F) -> Result<F::Output, KiraError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| KiraError::Runtime(err.to_string()))?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn abandoned_blocking_work_does_not_delay_return() {
        let started = Instant::now();
        let outcome = block_on_detached(async {
            let slow = tokio::task::spawn_blocking(|| thread::sleep(Duration::from_secs(3)));
            tokio::time::timeout(Duration::from_millis(50), slow)
                .await
                .is_err()
        })
        .unwrap();

        assert!(outcome, "slow task should have timed out");
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "waited {:?} for an abandoned task",
            started.elapsed()
        );
    }

    #[test]
    fn returns_the_future_output() {
        assert_eq!(block_on_detached(async { 6 * 7 }).unwrap(), 42);
    }
}
