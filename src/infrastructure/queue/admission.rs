use async_channel::{Receiver, Sender, TryRecvError, TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::modules::upload::model::Job;

/// Fixed-capacity job buffer with a drop-when-full admission policy.
///
/// Producers never wait: [`AdmissionQueue::try_enqueue`] either places the job
/// or hands it straight back. Workers share one consumer end.
#[derive(Clone)]
pub struct AdmissionQueue {
    tx: Sender<Job>,
    rx: Receiver<Job>,
    capacity: usize,
}

impl AdmissionQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        Self {
            tx,
            rx,
            capacity: capacity.max(1),
        }
    }

    /// Admits `job` if there is room. On rejection the job is returned so the
    /// caller can release whatever it owns.
    pub fn try_enqueue(&self, job: Job) -> Result<(), Job> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => Err(job),
            Err(TrySendError::Closed(job)) => {
                warn!(video_id = %job.video_id, "Admission queue closed, rejecting job");
                Err(job)
            }
        }
    }

    /// Waits for the next job. Returns `None` once `shutdown` fires or the queue
    /// is closed and empty.
    pub async fn dequeue(&self, shutdown: &CancellationToken) -> Option<Job> {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => None,
            job = self.rx.recv() => job.ok(),
        }
    }

    /// Closes the queue and returns whatever was still waiting.
    pub fn close_and_drain(&self) -> Vec<Job> {
        self.tx.close();
        let mut leftover = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(job) => leftover.push(job),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        leftover
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::hash::Fingerprint;
    use std::path::PathBuf;
    use std::time::Duration;

    fn job(n: u8) -> Job {
        Job::new(
            format!("clip-{n}.mp4"),
            PathBuf::from(format!("/tmp/upload-{n}.tmp")),
            Fingerprint::of(&[n]),
            "producer".into(),
        )
    }

    #[test]
    fn rejects_when_full_without_changing_contents() {
        let queue = AdmissionQueue::new(2);
        assert!(queue.try_enqueue(job(1)).is_ok());
        assert!(queue.try_enqueue(job(2)).is_ok());

        let rejected = queue.try_enqueue(job(3)).unwrap_err();
        assert_eq!(rejected.file_name, "clip-3.mp4");
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.capacity(), 2);
    }

    #[tokio::test]
    async fn dequeue_preserves_fifo_and_frees_capacity() {
        let queue = AdmissionQueue::new(1);
        let token = CancellationToken::new();
        queue.try_enqueue(job(1)).unwrap();
        assert!(queue.try_enqueue(job(2)).is_err());

        let first = queue.dequeue(&token).await.unwrap();
        assert_eq!(first.file_name, "clip-1.mp4");
        assert!(queue.is_empty());
        assert!(queue.try_enqueue(job(2)).is_ok());
    }

    #[tokio::test]
    async fn dequeue_returns_none_on_shutdown() {
        let queue = AdmissionQueue::new(1);
        let token = CancellationToken::new();

        let waiter = {
            let queue = queue.clone();
            let token = token.clone();
            tokio::spawn(async move { queue.dequeue(&token).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn close_and_drain_returns_pending_jobs() {
        let queue = AdmissionQueue::new(3);
        queue.try_enqueue(job(1)).unwrap();
        queue.try_enqueue(job(2)).unwrap();

        let leftover = queue.close_and_drain();
        assert_eq!(leftover.len(), 2);
        assert!(queue.try_enqueue(job(3)).is_err());
    }
}
