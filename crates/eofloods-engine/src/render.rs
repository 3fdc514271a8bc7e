//! Deadline-bounded execution for slow map rendering.
//!
//! Rendering a map evaluates one platform request per layer and can take
//! minutes. Jobs run on the blocking pool of a dedicated runtime while the
//! caller waits on a channel for at most the given deadline. A job that
//! misses its deadline is abandoned: the caller gets
//! [`FloodError::PlotTimeout`], but requests the job already sent may keep
//! running on the platform.

use eofloods_core::{FloodError, Result};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

const MAX_RENDER_THREADS: usize = 4;

pub struct RenderPool {
    runtime: Option<Runtime>,
}

impl RenderPool {
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(MAX_RENDER_THREADS)
            .thread_name("eofloods-render")
            .build()?;
        Ok(Self { runtime: Some(runtime) })
    }

    /// Run `job` and wait for it at most `timeout`
    ///
    /// The caller's thread only waits on a channel, so this works from plain
    /// threads and from inside another runtime alike.
    pub fn render<T, F>(&self, timeout: Duration, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let runtime = self.runtime.as_ref().ok_or_else(|| FloodError::platform("render", "render pool shut down"))?;

        let (sender, receiver) = mpsc::sync_channel(1);
        runtime.spawn_blocking(move || {
            // The receiver is gone once the deadline passed
            let _ = sender.send(job());
        });

        match receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("Rendering exceeded {:?}, abandoning the job", timeout);
                Err(FloodError::PlotTimeout { timeout })
            }
            Err(RecvTimeoutError::Disconnected) => Err(FloodError::platform("render", "render job panicked")),
        }
    }
}

impl Drop for RenderPool {
    fn drop(&mut self) {
        // Abandoned jobs must not block the caller on shutdown
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for RenderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPool").field("max_threads", &MAX_RENDER_THREADS).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_fast_job_returns_value() {
        let pool = RenderPool::new().unwrap();
        let value = pool.render(Duration::from_secs(5), || Ok(42)).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_job_error_propagates() {
        let pool = RenderPool::new().unwrap();
        let err = pool
            .render::<(), _>(Duration::from_secs(5), || Err(FloodError::platform("tile_url", "quota exceeded")))
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_slow_job_times_out_near_deadline() {
        let pool = RenderPool::new().unwrap();
        let started = Instant::now();
        let err = pool
            .render(Duration::from_millis(200), || {
                std::thread::sleep(Duration::from_secs(5));
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(err, FloodError::PlotTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));

        // Pool stays usable after abandoning a job
        assert_eq!(pool.render(Duration::from_secs(5), || Ok("ok")).unwrap(), "ok");

        let started = Instant::now();
        drop(pool);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_panicking_job_reported() {
        let pool = RenderPool::new().unwrap();
        let err = pool.render::<(), _>(Duration::from_secs(5), || panic!("boom")).unwrap_err();
        assert!(matches!(err, FloodError::Platform { .. }));
    }

    #[test]
    fn test_render_from_async_context() {
        let pool = RenderPool::new().unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();

        let value = runtime.block_on(async { pool.render(Duration::from_secs(5), || Ok(1)) }).unwrap();
        assert_eq!(value, 1);

        let err = runtime
            .block_on(async {
                pool.render(Duration::from_millis(100), || {
                    std::thread::sleep(Duration::from_secs(2));
                    Ok(())
                })
            })
            .unwrap_err();
        assert!(matches!(err, FloodError::PlotTimeout { .. }));
    }
}
