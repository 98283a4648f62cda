//! # Stale-Response Guard
//!
//! A [`ViewSlot`] holds the latest published value of one aggregate. Every
//! refresh takes a ticket before it starts; only the holder of the newest
//! ticket may publish.
//!
//! ```text
//! t=0   R1 begins  (ticket 1) ────────────────────────────┐ slow
//! t=1   R2 begins  (ticket 2) ──────┐ fast                │
//! t=3                          R2 publishes ✓ (2 = latest)│
//! t=9                                         R1 publishes ✗ (1 < 2)
//! ```
//!
//! Tickets play the same role as an election term: a monotonically
//! increasing number that lets late work recognise it has been superseded.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

/// Generation number handed out when an aggregation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// What subscribers see: the value and the ticket that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Published<T> {
    pub ticket: u64,
    pub value: Option<T>,
}

/// One supersedable view.
#[derive(Debug)]
pub struct ViewSlot<T> {
    name: &'static str,
    issued: AtomicU64,
    tx: watch::Sender<Published<T>>,
}

impl<T: Clone> ViewSlot<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(Published {
            ticket: 0,
            value: None,
        });
        ViewSlot {
            name,
            issued: AtomicU64::new(0),
            tx,
        }
    }

    /// Issues a new ticket, superseding every earlier one.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while no newer ticket has been issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Publishes `value` if `ticket` is still the newest. Returns whether
    /// the value was accepted.
    pub fn publish(&self, ticket: Ticket, value: T) -> bool {
        let accepted = self.tx.send_if_modified(|current| {
            if self.is_current(ticket) && ticket.0 > current.ticket {
                *current = Published {
                    ticket: ticket.0,
                    value: Some(value),
                };
                true
            } else {
                false
            }
        });

        if !accepted {
            debug!(slot = self.name, ticket = ticket.0, "Discarded superseded result");
        }
        accepted
    }

    /// Takes a ticket, awaits `work`, then publishes its output.
    pub async fn run<F>(&self, work: F) -> bool
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin();
        let value = work.await;
        self.publish(ticket, value)
    }

    /// The latest accepted value.
    pub fn current(&self) -> Option<T> {
        self.tx.borrow().value.clone()
    }

    /// Change feed for presentation.
    pub fn subscribe(&self) -> watch::Receiver<Published<T>> {
        self.tx.subscribe()
    }
}
