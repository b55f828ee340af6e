//! Scheduler for handing requests to workers
//!
//! This module handles:
//! - Two FIFO queues: priority (priority > 0) and normal
//! - A dispatch loop that is the only code touching those queues
//! - Push/pull handles that talk to the loop through channels
//!
//! The priority head always wins over the normal head. There is no
//! starvation countermeasure: a steady stream of priority pushes keeps the
//! normal queue waiting indefinitely.
//!
//! Neither queue is capped, so an unbounded backlog is possible. The only
//! back-pressure is the bounded push channel.

use crate::crawler::ShutdownSignal;
use crate::model::Request;
use crate::SchedulerError;
use std::collections::VecDeque;
use tokio::sync::{mpsc, oneshot};

/// Pending requests in dispatch order
#[derive(Debug, Default)]
pub struct RequestQueues {
    priority: VecDeque<Request>,
    normal: VecDeque<Request>,
}

impl RequestQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, request: Request) {
        if request.is_priority() {
            self.priority.push_back(request);
        } else {
            self.normal.push_back(request);
        }
    }

    /// Pops the priority head if there is one, otherwise the normal head
    pub fn pop_next(&mut self) -> Option<Request> {
        self.priority
            .pop_front()
            .or_else(|| self.normal.pop_front())
    }

    /// Puts a request back at the head of its class
    pub fn requeue_front(&mut self, request: Request) {
        if request.is_priority() {
            self.priority.push_front(request);
        } else {
            self.normal.push_front(request);
        }
    }

    pub fn priority_len(&self) -> usize {
        self.priority.len()
    }

    pub fn normal_len(&self) -> usize {
        self.normal.len()
    }

    pub fn len(&self) -> usize {
        self.priority.len() + self.normal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priority.is_empty() && self.normal.is_empty()
    }
}

/// Handle for pushing and pulling requests
///
/// Cheap to clone; every clone talks to the same dispatch loop.
#[derive(Debug, Clone)]
pub struct Scheduler {
    push_tx: mpsc::Sender<Request>,
    pull_tx: mpsc::Sender<oneshot::Sender<Request>>,
}

impl Scheduler {
    /// Creates a scheduler handle and the dispatch loop that serves it
    ///
    /// Up to `push_buffer` pushes are accepted before the loop is running;
    /// beyond that `push` waits for the loop.
    pub fn new(push_buffer: usize) -> (Self, DispatchLoop) {
        let capacity = push_buffer.max(1);
        let (push_tx, push_rx) = mpsc::channel(capacity);
        let (pull_tx, pull_rx) = mpsc::channel(capacity);

        let scheduler = Self { push_tx, pull_tx };
        let dispatch = DispatchLoop {
            push_rx,
            pull_rx,
            queues: RequestQueues::new(),
        };
        (scheduler, dispatch)
    }

    /// Enqueues requests in order
    ///
    /// Waits while the push channel is full. Fails only once the dispatch
    /// loop has stopped; the error reports how many requests were not taken.
    pub async fn push<I>(&self, requests: I) -> Result<(), SchedulerError>
    where
        I: IntoIterator<Item = Request>,
    {
        let mut requests = requests.into_iter();
        while let Some(request) = requests.next() {
            if self.push_tx.send(request).await.is_err() {
                return Err(SchedulerError::Closed {
                    rejected: 1 + requests.count(),
                });
            }
        }
        Ok(())
    }

    /// Waits for the next request
    ///
    /// Returns `None` once the dispatch loop has stopped. Dropping the
    /// returned future after the loop handed it a request discards that
    /// request, so only cancel a pull when shutting down.
    pub async fn pull(&self) -> Option<Request> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pull_tx.send(reply_tx).await.ok()?;
        reply_rx.await.ok()
    }
}

/// The single task that owns the queues
pub struct DispatchLoop {
    push_rx: mpsc::Receiver<Request>,
    pull_rx: mpsc::Receiver<oneshot::Sender<Request>>,
    queues: RequestQueues,
}

impl DispatchLoop {
    /// Runs until shutdown, or until every scheduler handle is gone and the
    /// queues are drained
    ///
    /// Each step takes whichever is ready first: an incoming push, or a
    /// waiting puller while something is queued. When both are ready the
    /// push wins, so everything already sitting in the push channel is queued
    /// before the next handoff. The request for a puller is chosen at handoff
    /// time, so a priority request that arrived while a normal one was
    /// waiting still goes first. Pullers wait only while the push channel is
    /// non-empty, and that channel is bounded.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) {
        tracing::debug!("Dispatch loop started");
        let mut accepting = true;

        loop {
            if !accepting && self.queues.is_empty() {
                tracing::debug!("All scheduler handles dropped, dispatch loop exiting");
                break;
            }

            tokio::select! {
                biased;

                _ = shutdown.wait() => {
                    tracing::debug!(
                        "Dispatch loop stopping with {} queued request(s)",
                        self.queues.len()
                    );
                    break;
                }

                incoming = self.push_rx.recv(), if accepting => match incoming {
                    Some(request) => {
                        self.queues.enqueue(request);
                        tracing::trace!(
                            priority = self.queues.priority_len(),
                            normal = self.queues.normal_len(),
                            "Request queued"
                        );
                    }
                    None => accepting = false,
                },

                puller = self.pull_rx.recv(), if !self.queues.is_empty() => match puller {
                    Some(reply) => self.deliver(reply),
                    None => break,
                },
            }
        }
    }

    fn deliver(&mut self, reply: oneshot::Sender<Request>) {
        if let Some(request) = self.queues.pop_next() {
            if let Err(request) = reply.send(request) {
                // Puller went away before the handoff
                self.queues.requeue_front(request);
            }
        }
    }
}
