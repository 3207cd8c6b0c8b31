//! Typed, optionally delayed, notifications between entities.
//!
//! Immediate telegrams are delivered synchronously inside [`Postbox::send`].
//! Delayed telegrams wait in a [`MessageDispatcher`] until the simulation
//! clock reaches their delivery time and are then flushed by
//! [`Postbox::dispatch_delayed`], earliest first and in send order among ties.

use serde::{Deserialize, Serialize};

/// A message record routed through the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telegram<A, M> {
    pub sender: Option<A>,
    pub receiver: A,
    pub message: M,
    /// Simulation time (seconds) at which the telegram becomes deliverable.
    pub dispatch_at: f64,
}

#[derive(Debug, Clone)]
struct Queued<A, M> {
    seq: u64,
    telegram: Telegram<A, M>,
}

/// Queue of delayed telegrams ordered by delivery time.
#[derive(Debug, Clone)]
pub struct MessageDispatcher<A, M> {
    queue: Vec<Queued<A, M>>,
    next_seq: u64,
}

impl<A, M> MessageDispatcher<A, M> {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            next_seq: 0,
        }
    }

    /// Queue a telegram for later delivery.
    pub fn defer(&mut self, telegram: Telegram<A, M>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        // Keep the queue sorted by (time, seq); later sends go after equal times.
        let at = self
            .queue
            .partition_point(|q| q.telegram.dispatch_at <= telegram.dispatch_at);
        self.queue.insert(at, Queued { seq, telegram });
    }

    /// Remove and return every telegram due at or before `now`.
    pub fn take_due(&mut self, now: f64) -> Vec<Telegram<A, M>> {
        let due = self
            .queue
            .partition_point(|q| q.telegram.dispatch_at <= now);
        self.queue.drain(..due).map(|q| q.telegram).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Sequence numbers of queued telegrams, in delivery order.
    #[cfg(test)]
    fn order(&self) -> Vec<u64> {
        self.queue.iter().map(|q| q.seq).collect()
    }
}

impl<A, M> Default for MessageDispatcher<A, M> {
    fn default() -> Self {
        Self::new()
    }
}

/// A context that can route telegrams to its entities.
///
/// Implemented by the object owning every addressable entity, so that
/// delivery can hand the recipient mutable access to the whole world.
pub trait Postbox {
    type Address: Copy;
    type Message;

    fn dispatcher(&mut self) -> &mut MessageDispatcher<Self::Address, Self::Message>;

    /// Current simulation time in seconds.
    fn now(&self) -> f64;

    /// Hand a telegram to its receiver. Returns `false` if nothing handled it.
    fn deliver(&mut self, telegram: &Telegram<Self::Address, Self::Message>) -> bool;

    /// Send a message. A non-positive delay delivers immediately and returns
    /// whether it was handled; otherwise the telegram is queued and `false`
    /// is returned.
    fn send(
        &mut self,
        sender: Option<Self::Address>,
        receiver: Self::Address,
        message: Self::Message,
        delay: f64,
    ) -> bool {
        let now = self.now();
        let telegram = Telegram {
            sender,
            receiver,
            message,
            dispatch_at: now + delay.max(0.0),
        };
        if delay <= 0.0 {
            self.deliver(&telegram)
        } else {
            self.dispatcher().defer(telegram);
            false
        }
    }

    /// Deliver every queued telegram that is due. Returns how many were delivered.
    fn dispatch_delayed(&mut self) -> usize {
        let now = self.now();
        let due = self.dispatcher().take_due(now);
        let count = due.len();
        for telegram in &due {
            self.deliver(telegram);
        }
        count
    }
}
