//! FIFO serialization of single-post refresh calls.
//!
//! Outbound single-post scrape requests must never run in parallel against
//! the provider. The queue is an explicitly owned object — an unbounded
//! channel plus one consumer task — with its lifecycle tied to process
//! start and stop: dropping every handle closes the channel and the worker
//! drains and exits. Batch refresh does NOT go through this queue and may
//! interleave with it.

use std::sync::Arc;

use futures::future::BoxFuture;
use koltrack_db::PostRow;
use koltrack_scraper::ScrapeClient;
use sqlx::PgPool;
use tokio::sync::{mpsc, oneshot};

use crate::error::EngineError;
use crate::refresh::refresh_one;

/// The operation the queue worker runs for each job.
///
/// A trait seam rather than a concrete call so tests can observe execution
/// order with a recording fake.
pub trait RefreshBackend: Send + Sync + 'static {
    fn refresh(&self, post_id: i64) -> BoxFuture<'_, Result<PostRow, EngineError>>;
}

/// Production backend: a single-post refresh against the store and the
/// scrape provider.
pub struct ScrapeRefresher {
    pool: PgPool,
    client: Arc<ScrapeClient>,
}

impl ScrapeRefresher {
    #[must_use]
    pub fn new(pool: PgPool, client: Arc<ScrapeClient>) -> Self {
        Self { pool, client }
    }
}

impl RefreshBackend for ScrapeRefresher {
    fn refresh(&self, post_id: i64) -> BoxFuture<'_, Result<PostRow, EngineError>> {
        Box::pin(async move { refresh_one(&self.pool, &self.client, post_id).await })
    }
}

struct Job {
    post_id: i64,
    reply: oneshot::Sender<Result<PostRow, EngineError>>,
}

/// Handle to the process-wide refresh queue. Cheap to clone; all clones
/// feed the same worker.
#[derive(Clone)]
pub struct RefreshQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl RefreshQueue {
    /// Spawns the single consumer task and returns the enqueue handle.
    pub fn start<B: RefreshBackend>(backend: B) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            // One job at a time, strictly in arrival order.
            while let Some(job) = rx.recv().await {
                let result = backend.refresh(job.post_id).await;
                // The caller may have hung up; the result is then dropped.
                let _ = job.reply.send(result);
            }
            tracing::debug!("refresh queue worker exiting; all handles dropped");
        });

        Self { tx }
    }

    /// Enqueues a single-post refresh, returning a handle that resolves to
    /// the job's result once the worker reaches it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::QueueClosed`] if the worker has shut down.
    pub fn enqueue(
        &self,
        post_id: i64,
    ) -> Result<oneshot::Receiver<Result<PostRow, EngineError>>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job { post_id, reply })
            .map_err(|_| EngineError::QueueClosed)?;
        Ok(rx)
    }

    /// Enqueues a single-post refresh and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::QueueClosed`] if the worker shut down before
    /// answering, or whatever the refresh itself returned.
    pub async fn refresh(&self, post_id: i64) -> Result<PostRow, EngineError> {
        let rx = self.enqueue(post_id)?;
        rx.await.map_err(|_| EngineError::QueueClosed)?
    }
}
