//! Per-conversation serialization of update processing
//!
//! Jobs for the same conversation run strictly one after another in arrival
//! order; jobs for different conversations run concurrently. A conversation
//! has a drainer task only while it has queued work, so idle conversations
//! cost nothing.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::{oneshot, Mutex};

use crate::core::types::ConversationId;

type Job = BoxFuture<'static, ()>;

#[derive(Default)]
struct ChatQueue {
    jobs: VecDeque<Job>,
}

/// FIFO queues keyed by conversation
#[derive(Clone, Default)]
pub struct UpdateSequencer {
    queues: Arc<Mutex<HashMap<ConversationId, ChatQueue>>>,
}

impl UpdateSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `job` behind earlier work for `conversation`.
    ///
    /// The returned receiver resolves once the job has finished (or
    /// panicked). Dropping it does not cancel the job.
    pub async fn enqueue<F>(&self, conversation: ConversationId, job: F) -> oneshot::Receiver<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = async move {
            if AssertUnwindSafe(job).catch_unwind().await.is_err() {
                log::error!("Update job for chat {} panicked", conversation);
            }
            let _ = done_tx.send(());
        }
        .boxed();

        let start_drainer = {
            let mut queues = self.queues.lock().await;
            match queues.get_mut(&conversation) {
                Some(queue) => {
                    queue.jobs.push_back(job);
                    false
                }
                None => {
                    queues.insert(
                        conversation,
                        ChatQueue {
                            jobs: VecDeque::from([job]),
                        },
                    );
                    true
                }
            }
        };

        if start_drainer {
            tokio::spawn(self.clone().drain(conversation));
        }
        done_rx
    }

    /// Runs queued jobs until the conversation has none left, then drops
    /// its queue. The pop and the removal happen under the same lock, so a
    /// job enqueued concurrently either lands before removal (and is run
    /// here) or starts a fresh drainer.
    async fn drain(self, conversation: ConversationId) {
        loop {
            let next = {
                let mut queues = self.queues.lock().await;
                let Some(queue) = queues.get_mut(&conversation) else {
                    return;
                };
                match queue.jobs.pop_front() {
                    Some(job) => job,
                    None => {
                        queues.remove(&conversation);
                        return;
                    }
                }
            };
            next.await;
        }
    }

    /// Jobs waiting behind the running one for `conversation`
    pub async fn pending(&self, conversation: ConversationId) -> usize {
        self.queues
            .lock()
            .await
            .get(&conversation)
            .map_or(0, |queue| queue.jobs.len())
    }

    /// Conversations that currently have a drainer
    pub async fn active_conversations(&self) -> usize {
        self.queues.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ChatId;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_same_conversation_runs_in_order() {
        let sequencer = UpdateSequencer::new();
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut receivers = Vec::new();
        for (i, delay) in [30u64, 0, 10].into_iter().enumerate() {
            let log = log.clone();
            receivers.push(
                sequencer
                    .enqueue(ChatId(1), async move {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        log.lock().unwrap().push(i);
                    })
                    .await,
            );
        }
        for rx in receivers {
            rx.await.unwrap();
        }

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_conversations_run_concurrently() {
        let sequencer = UpdateSequencer::new();
        let notify = Arc::new(Notify::new());

        // Chat 1 blocks until chat 2 runs; serialized execution would hang.
        let waiter = notify.clone();
        let first = sequencer.enqueue(ChatId(1), async move { waiter.notified().await }).await;
        let signal = notify.clone();
        let second = sequencer.enqueue(ChatId(2), async move { signal.notify_one() }).await;

        tokio::time::timeout(Duration::from_secs(2), async {
            second.await.unwrap();
            first.await.unwrap();
        })
        .await
        .expect("conversations should not block each other");
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_stall_queue() {
        let sequencer = UpdateSequencer::new();
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let failed = sequencer
            .enqueue(ChatId(5), async {
                panic!("boom");
            })
            .await;
        let flag = ran.clone();
        let next = sequencer
            .enqueue(ChatId(5), async move {
                flag.store(true, std::sync::atomic::Ordering::SeqCst);
            })
            .await;

        failed.await.unwrap();
        next.await.unwrap();
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_idle_conversation_is_released() {
        let sequencer = UpdateSequencer::new();
        sequencer.enqueue(ChatId(9), async {}).await.await.unwrap();

        for _ in 0..100 {
            if sequencer.active_conversations().await == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(sequencer.active_conversations().await, 0);
        assert_eq!(sequencer.pending(ChatId(9)).await, 0);
    }
}
