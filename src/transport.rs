//! Seam between a messaging transport and the [`Dispatcher`].
//!
//! A transport adapter pushes [`IncomingMessage`]s into a channel and sends
//! every [`OutgoingReply`] it receives back to the named user.

use log::{debug, error, warn};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};

use crate::engine::bot::Dispatcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReply {
    pub user_id: String,
    pub text: String,
}

impl IncomingMessage {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), text: text.into() }
    }

    /// Parses a console line: `"<user>: <text>"`, or a bare command that is
    /// sent as `default_user`.
    pub fn from_console_line(line: &str, default_user: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.starts_with('/') {
            return Some(Self::new(default_user, line));
        }
        match line.split_once(':') {
            Some((user, text)) if !user.trim().is_empty() => Some(Self::new(user.trim(), text.trim())),
            _ => Some(Self::new(default_user, line)),
        }
    }
}

type Job = (IncomingMessage, Ticket);

/// Reports a job as finished when dropped, whether it ran, was discarded
/// with a dead worker's queue, or unwound through a panic.
struct Ticket {
    user_id: String,
    done: mpsc::UnboundedSender<String>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let _ = self.done.send(std::mem::take(&mut self.user_id));
    }
}

struct UserQueue {
    sender: mpsc::UnboundedSender<Job>,
    /// Jobs handed to this user's worker whose ticket has not come back.
    pending: usize,
}

/// Feeds incoming messages to the dispatcher until the channel closes.
///
/// Every user with work in flight gets one worker task that drains a FIFO
/// queue, so a user's commands run in arrival order while different users
/// proceed in parallel. A queue is dropped as soon as its last job reports
/// back, which also ends the worker.
pub async fn run_event_processor(
    dispatcher: Arc<Dispatcher>,
    mut incoming: mpsc::Receiver<IncomingMessage>,
    replies: mpsc::Sender<OutgoingReply>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<String>();
    let mut queues: HashMap<String, UserQueue> = HashMap::new();
    let mut workers = JoinSet::new();
    let mut open = true;

    while open || !queues.is_empty() {
        tokio::select! {
            message = incoming.recv(), if open => match message {
                Some(message) => {
                    debug!("Message from {}: {}", message.user_id, message.text);
                    let ticket = Ticket { user_id: message.user_id.clone(), done: done_tx.clone() };
                    let queue = queues.entry(message.user_id.clone()).or_insert_with(|| UserQueue {
                        sender: spawn_worker(&mut workers, &dispatcher, &replies),
                        pending: 0,
                    });
                    queue.pending += 1;
                    if let Err(mpsc::error::SendError(job)) = queue.sender.send((message, ticket)) {
                        warn!("Worker for {} stopped, starting a new one", job.0.user_id);
                        queue.sender = spawn_worker(&mut workers, &dispatcher, &replies);
                        if let Err(mpsc::error::SendError(job)) = queue.sender.send(job) {
                            warn!("Dropping message from {}", job.0.user_id);
                        }
                    }
                }
                None => open = false,
            },
            Some(user_id) = done_rx.recv() => {
                if let Entry::Occupied(mut entry) = queues.entry(user_id) {
                    let queue = entry.get_mut();
                    queue.pending = queue.pending.saturating_sub(1);
                    if queue.pending == 0 {
                        entry.remove();
                    }
                }
            }
        }

        while let Some(result) = workers.try_join_next() {
            log_worker_exit(result);
        }
    }

    while let Some(result) = workers.join_next().await {
        log_worker_exit(result);
    }
}

fn spawn_worker(
    workers: &mut JoinSet<()>,
    dispatcher: &Arc<Dispatcher>,
    replies: &mpsc::Sender<OutgoingReply>,
) -> mpsc::UnboundedSender<Job> {
    let (sender, mut queue) = mpsc::unbounded_channel::<Job>();
    let dispatcher = dispatcher.clone();
    let replies = replies.clone();

    workers.spawn(async move {
        while let Some((message, _ticket)) = queue.recv().await {
            if let Some(text) = dispatcher.handle_command(&message.user_id, &message.text).await {
                let reply = OutgoingReply { user_id: message.user_id, text };
                if replies.send(reply).await.is_err() {
                    warn!("Reply channel closed, dropping reply");
                }
            }
        }
    });

    sender
}

fn log_worker_exit(result: Result<(), JoinError>) {
    if let Err(e) = result {
        error!("User worker failed: {}", e);
    }
}
