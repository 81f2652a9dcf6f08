//! In-process generation queue.
//!
//! A bounded `mpsc` channel feeds a fixed pool of worker tasks. Jobs are
//! picked up in FIFO order per process; with several workers they may finish
//! out of order. Nothing is persisted, so jobs still queued when the process
//! dies are lost and their keys simply stay pending.
//!
//! ## Graceful Shutdown
//!
//! Workers listen on a `watch` channel. Once it flips to `true` they drain
//! the jobs already queued and exit.

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::application::generation::run_generation_job;
use crate::ports::{AnswerGenerator, GenerationJob, GenerationQueue, QueueError, ResponseCache};

/// Sending half of the queue, handed to the webhook handlers.
#[derive(Debug, Clone)]
pub struct ChannelGenerationQueue {
    tx: mpsc::Sender<GenerationJob>,
}

impl ChannelGenerationQueue {
    /// Creates a queue holding at most `capacity` pending jobs.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<GenerationJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl GenerationQueue for ChannelGenerationQueue {
    async fn enqueue(&self, job: GenerationJob) -> Result<(), QueueError> {
        let job_id = job.id;
        match self.tx.try_send(job) {
            Ok(()) => {
                tracing::debug!(%job_id, "Generation job queued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(QueueError::Full),
            Err(TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }
}

/// Worker tasks draining a [`ChannelGenerationQueue`].
pub struct GenerationWorkerPool {
    handles: Vec<JoinHandle<()>>,
}

enum Next {
    Job(GenerationJob),
    Closed,
    Shutdown,
}

impl GenerationWorkerPool {
    /// Spawns `workers` tasks sharing the receiving end of the queue.
    pub fn spawn(
        workers: usize,
        rx: mpsc::Receiver<GenerationJob>,
        generator: Arc<dyn AnswerGenerator>,
        cache: Arc<dyn ResponseCache>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let rx = Arc::new(Mutex::new(rx));
        let handles = (0..workers.max(1))
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let generator = Arc::clone(&generator);
                let cache = Arc::clone(&cache);
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    worker_loop(worker, rx, generator, cache, shutdown).await;
                })
            })
            .collect();

        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Generation worker task failed");
            }
        }
    }
}

async fn worker_loop(
    worker: usize,
    rx: Arc<Mutex<mpsc::Receiver<GenerationJob>>>,
    generator: Arc<dyn AnswerGenerator>,
    cache: Arc<dyn ResponseCache>,
    mut shutdown: watch::Receiver<bool>,
) {
    tracing::debug!(worker, "Generation worker started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let next = {
            let mut rx = rx.lock().await;
            tokio::select! {
                job = rx.recv() => job.map_or(Next::Closed, Next::Job),
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown too.
                    if changed.is_err() || *shutdown.borrow() {
                        Next::Shutdown
                    } else {
                        continue;
                    }
                }
            }
        };

        match next {
            Next::Job(job) => process(worker, &*generator, &*cache, job).await,
            Next::Closed => {
                tracing::debug!(worker, "Generation queue closed; worker exiting");
                return;
            }
            Next::Shutdown => break,
        }
    }

    // Drain what was accepted before shutdown.
    loop {
        let job = rx.lock().await.try_recv();
        match job {
            Ok(job) => process(worker, &*generator, &*cache, job).await,
            Err(_) => break,
        }
    }
    tracing::debug!(worker, "Generation worker stopped");
}

async fn process(
    worker: usize,
    generator: &dyn AnswerGenerator,
    cache: &dyn ResponseCache,
    job: GenerationJob,
) {
    let job_id = job.id;
    let run = AssertUnwindSafe(run_generation_job(generator, cache, &job)).catch_unwind();
    match run.await {
        Ok(outcome) => {
            tracing::debug!(
                worker,
                %job_id,
                cached = outcome.is_cached(),
                "Generation job finished"
            );
        }
        Err(_) => {
            tracing::error!(worker, %job_id, "Generation job panicked; worker continues");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAnswerGenerator;
    use crate::adapters::cache::InMemoryResponseCache;
    use crate::domain::dialog::CacheKey;
    use crate::ports::{AIError, JobKind};
    use std::time::Duration;

    fn key(name: &str) -> CacheKey {
        CacheKey::question_answer("session", name)
    }

    fn job(name: &str) -> GenerationJob {
        GenerationJob::new(
            JobKind::Question,
            "Apa itu pecahan?",
            key(name),
            Duration::from_secs(60),
        )
    }

    async fn wait_for(cache: &InMemoryResponseCache, name: &str) -> Option<String> {
        for _ in 0..100 {
            if let Some(v) = cache.get(&key(name)).await.unwrap() {
                return Some(v);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn full_queue_rejects_jobs() {
        let (queue, _rx) = ChannelGenerationQueue::bounded(1);
        queue.enqueue(job("a")).await.unwrap();
        assert_eq!(queue.enqueue(job("b")).await, Err(QueueError::Full));
    }

    #[tokio::test]
    async fn closed_queue_rejects_jobs() {
        let (queue, rx) = ChannelGenerationQueue::bounded(4);
        drop(rx);
        assert_eq!(queue.enqueue(job("a")).await, Err(QueueError::Closed));
    }

    #[tokio::test]
    async fn workers_cache_generated_answers() {
        let (queue, rx) = ChannelGenerationQueue::bounded(8);
        let cache = InMemoryResponseCache::new();
        let generator = MockAnswerGenerator::new().with_response("Jawaban");
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let pool = GenerationWorkerPool::spawn(
            2,
            rx,
            Arc::new(generator),
            Arc::new(cache.clone()),
            shutdown_rx,
        );
        assert_eq!(pool.size(), 2);

        queue.enqueue(job("k1")).await.unwrap();

        assert_eq!(wait_for(&cache, "k1").await.as_deref(), Some("Jawaban"));
    }

    #[tokio::test]
    async fn worker_survives_generator_errors() {
        let (queue, rx) = ChannelGenerationQueue::bounded(8);
        let cache = InMemoryResponseCache::new();
        let generator = MockAnswerGenerator::new()
            .with_error(AIError::Network("reset".into()))
            .with_response("Jawaban kedua");
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let _pool = GenerationWorkerPool::spawn(
            1,
            rx,
            Arc::new(generator),
            Arc::new(cache.clone()),
            shutdown_rx,
        );

        queue.enqueue(job("first")).await.unwrap();
        queue.enqueue(job("second")).await.unwrap();

        assert_eq!(wait_for(&cache, "second").await.as_deref(), Some("Jawaban kedua"));
        assert_eq!(cache.get(&key("first")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn shutdown_drains_queued_jobs() {
        let (queue, rx) = ChannelGenerationQueue::bounded(8);
        let cache = InMemoryResponseCache::new();
        let generator = MockAnswerGenerator::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        queue.enqueue(job("a")).await.unwrap();
        queue.enqueue(job("b")).await.unwrap();
        shutdown_tx.send(true).unwrap();

        let pool = GenerationWorkerPool::spawn(
            1,
            rx,
            Arc::new(generator),
            Arc::new(cache.clone()),
            shutdown_rx,
        );
        tokio::time::timeout(Duration::from_secs(5), pool.join())
            .await
            .expect("workers should stop after draining");

        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn shutdown_waits_for_in_flight_job() {
        let (queue, rx) = ChannelGenerationQueue::bounded(8);
        let cache = InMemoryResponseCache::new();
        let generator = MockAnswerGenerator::new()
            .with_response("Jawaban lambat")
            .with_delay(Duration::from_millis(200));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let pool = GenerationWorkerPool::spawn(
            1,
            rx,
            Arc::new(generator.clone()),
            Arc::new(cache.clone()),
            shutdown_rx,
        );

        queue.enqueue(job("slow")).await.unwrap();
        for _ in 0..100 {
            if generator.call_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(generator.call_count(), 1);
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), pool.join())
            .await
            .expect("workers should stop after the in-flight job");

        assert_eq!(
            cache.get(&key("slow")).await.unwrap().as_deref(),
            Some("Jawaban lambat")
        );
    }

    #[tokio::test]
    async fn workers_exit_when_all_senders_drop() {
        let (queue, rx) = ChannelGenerationQueue::bounded(8);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let pool = GenerationWorkerPool::spawn(
            2,
            rx,
            Arc::new(MockAnswerGenerator::new()),
            Arc::new(InMemoryResponseCache::new()),
            shutdown_rx,
        );

        drop(queue);

        tokio::time::timeout(Duration::from_secs(5), pool.join())
            .await
            .expect("workers should exit once the queue closes");
    }
}
