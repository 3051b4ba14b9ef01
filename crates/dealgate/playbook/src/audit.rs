//! Audit side channel: every enforcement decision is recorded,
//! attempt and outcome alike.
//!
//! Publication is fire-and-forget relative to the decision. The
//! enforcer catches and logs a failed publish; it never changes or
//! delays the returned decision. The bounded queue models the side
//! channel explicitly: `try_send` semantics, an explicit drain, and
//! observable overflow.

use dealgate_types::{DealgateError, DealgateResult, TransitionEvent};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::Mutex;

/// Where enforcement decisions are recorded.
pub trait AuditSink: Send + Sync {
    fn publish(&self, event: TransitionEvent) -> DealgateResult<()>;
}

/// An in-memory append-only audit log, for tests and single-process
/// deployments.
pub struct InMemoryAuditLog {
    events: Mutex<Vec<TransitionEvent>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<TransitionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn publish(&self, event: TransitionEvent) -> DealgateResult<()> {
        self.events
            .lock()
            .map_err(|_| DealgateError::LockPoisoned)?
            .push(event);
        Ok(())
    }
}

/// A bounded, non-blocking audit queue.
///
/// `publish` never blocks: a full queue drops the event and reports
/// [`DealgateError::AuditQueueFull`]; a disconnected drain reports
/// [`DealgateError::AuditChannelClosed`]. The consuming side calls
/// [`AuditQueue::drain`] to take whatever has accumulated.
pub struct AuditQueue {
    sender: SyncSender<TransitionEvent>,
    receiver: Mutex<Receiver<TransitionEvent>>,
}

impl AuditQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = sync_channel(capacity);
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Take every event currently queued.
    pub fn drain(&self) -> Vec<TransitionEvent> {
        let receiver = match self.receiver.lock() {
            Ok(receiver) => receiver,
            Err(_) => return Vec::new(),
        };
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

impl AuditSink for AuditQueue {
    fn publish(&self, event: TransitionEvent) -> DealgateResult<()> {
        match self.sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DealgateError::AuditQueueFull),
            Err(TrySendError::Disconnected(_)) => Err(DealgateError::AuditChannelClosed),
        }
    }
}
