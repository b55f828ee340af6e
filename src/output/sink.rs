//! Item sinks
//!
//! A sink receives items one at a time from the result collector. There is
//! no acknowledgement; the only back-pressure is the collector itself.

use crate::model::Item;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

/// Receives every item extracted during a crawl
pub trait ItemSink: Send + Sync {
    fn accept(&self, item: Item);
}

impl<F> ItemSink for F
where
    F: Fn(Item) + Send + Sync,
{
    fn accept(&self, item: Item) {
        self(item)
    }
}

/// Logs each item at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ItemSink for LogSink {
    fn accept(&self, item: Item) {
        tracing::info!(
            task = %item.task,
            rule = %item.rule,
            url = %item.url,
            fields = ?item.fields,
            "Item captured"
        );
    }
}

/// Keeps every item in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    items: Mutex<Vec<Item>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items received so far, in arrival order
    pub fn items(&self) -> Vec<Item> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ItemSink for MemorySink {
    fn accept(&self, item: Item) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }
}

/// Forwards items to an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Item>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Item>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ItemSink for ChannelSink {
    fn accept(&self, item: Item) {
        if self.tx.send(item).is_err() {
            tracing::debug!("Item receiver dropped; discarding item");
        }
    }
}
