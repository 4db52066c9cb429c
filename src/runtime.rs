//! Dedicated async runtime for synchronous front ends
//!
//! The interactive CLI reads stdin on the main thread. Remote work is
//! submitted to a multi-threaded tokio runtime that lives on its own thread
//! for the whole process and is shut down when the handle is dropped.

use std::future::Future;
use std::thread::JoinHandle;

use tokio::sync::oneshot;
use tracing::debug;

use crate::ChanRankError;
use crate::Result;

pub struct BackgroundRuntime {
    handle: tokio::runtime::Handle,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl BackgroundRuntime {
    /// Start the runtime thread and wait until it accepts work
    ///
    /// # Errors
    /// - `Io` when the runtime or its thread cannot be created
    pub fn start() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("chanrank-worker")
            .build()?;
        let handle = runtime.handle().clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("chanrank-runtime".to_string())
            .spawn(move || {
                runtime.block_on(async {
                    let _ = shutdown_rx.await;
                });
                debug!("Background runtime stopped");
            })?;

        Ok(Self {
            handle,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// Run `future` on the background runtime and block until it completes.
    ///
    /// Must not be called from inside an async context.
    ///
    /// # Errors
    /// - `Custom` when the task panicked or the runtime is gone
    pub fn block_on<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.handle.spawn(async move {
            let _ = reply_tx.send(future.await);
        });
        reply_rx
            .blocking_recv()
            .map_err(|_| ChanRankError::Custom("background task did not complete".to_string()))
    }

    /// Handle for spawning detached work
    pub fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }
}

impl Drop for BackgroundRuntime {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
