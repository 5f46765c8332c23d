//! Single-slot mailboxes
//!
//! Every worker owns one incoming mailbox per message type. A mailbox holds
//! at most one message; what happens when a sender finds the slot occupied
//! depends on the [`PostPolicy`]:
//!
//! - `Overwrite`: the stale message is discarded and replaced (most recent wins)
//! - `Reject`: the post fails with [`ReelError::MailboxFull`] and the caller
//!   decides whether to log or drop
//!
//! Receivers choose between a non-blocking [`Mailbox::accept`] (used inside
//! the streaming loop so audio transfer never stalls) and a bounded
//! [`Mailbox::pend`].

use crate::error::{ReelError, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::time::Duration;

/// Attempts before an overwrite gives up under sender contention
const OVERWRITE_ATTEMPTS: usize = 4;

/// What a sender does when the slot is already full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostPolicy {
    /// Replace the pending message
    Overwrite,

    /// Report a delivery failure
    Reject,
}

/// Create a single-slot mailbox
pub fn mailbox<T>(policy: PostPolicy) -> (Postbox<T>, Mailbox<T>) {
    let (tx, rx) = bounded(1);
    let postbox = Postbox {
        tx,
        drain: rx.clone(),
        policy,
    };
    (postbox, Mailbox { rx })
}

/// Sending half of a mailbox
///
/// Cheap to clone; the mailbox disconnects once every postbox is dropped.
#[derive(Debug)]
pub struct Postbox<T> {
    tx: Sender<T>,
    /// Used only to discard a stale message under `Overwrite`
    drain: Receiver<T>,
    policy: PostPolicy,
}

impl<T> Clone for Postbox<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            drain: self.drain.clone(),
            policy: self.policy,
        }
    }
}

impl<T> Postbox<T> {
    /// Post a message according to the mailbox policy
    ///
    /// # Errors
    /// - [`ReelError::MailboxFull`] if the slot is occupied under `Reject`,
    ///   or stays occupied by other senders under `Overwrite`
    pub fn post(&self, msg: T) -> Result<()> {
        let mut msg = msg;
        for _ in 0..OVERWRITE_ATTEMPTS {
            match self.tx.try_send(msg) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(returned)) => {
                    if self.policy == PostPolicy::Reject {
                        return Err(ReelError::MailboxFull);
                    }
                    // Discard whatever is pending; the receiver may already have taken it
                    let _ = self.drain.try_recv();
                    msg = returned;
                }
                // Unreachable while `drain` is alive, kept for completeness
                Err(TrySendError::Disconnected(_)) => return Err(ReelError::MailboxDisconnected),
            }
        }
        Err(ReelError::MailboxFull)
    }

    /// The policy this postbox applies
    pub fn policy(&self) -> PostPolicy {
        self.policy
    }
}

/// Receiving half of a mailbox
#[derive(Debug)]
pub struct Mailbox<T> {
    rx: Receiver<T>,
}

impl<T> Mailbox<T> {
    /// Take the pending message without blocking
    ///
    /// Returns `Ok(None)` when the slot is empty.
    ///
    /// # Errors
    /// [`ReelError::MailboxDisconnected`] once the slot is empty and every
    /// postbox has been dropped
    pub fn accept(&self) -> Result<Option<T>> {
        match self.rx.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ReelError::MailboxDisconnected),
        }
    }

    /// Wait up to `timeout` for a message
    ///
    /// # Errors
    /// [`ReelError::MailboxDisconnected`] once every postbox has been dropped
    pub fn pend(&self, timeout: Duration) -> Result<Option<T>> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Ok(Some(msg)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ReelError::MailboxDisconnected),
        }
    }

    /// Whether a message is waiting
    pub fn is_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}
