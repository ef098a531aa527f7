//! Last-request-wins ordering for user-triggered lookups.
//!
//! Every [`ResolveSession::begin`] issues a new [`Ticket`]. Completing with
//! a ticket that is no longer the latest one is a no-op, so a slow answer
//! to an old request can never overwrite the answer to a newer one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::types::Lookup;

/// Sequence number of one lookup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// The raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Observable state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveState<T> {
    /// No request issued yet.
    Idle,
    /// The latest request is in flight.
    Resolving {
        /// Ticket of the in-flight request.
        ticket: Ticket,
    },
    /// The latest request found a record.
    Found(T),
    /// The latest request reached the contract and found nothing.
    NotFound,
    /// The latest request failed.
    Failed {
        /// Display form of the error.
        message: String,
        /// Whether retrying could succeed.
        retryable: bool,
    },
}

/// Tracks the latest issued request and its outcome.
#[derive(Debug)]
pub struct ResolveSession<T> {
    latest: AtomicU64,
    state: Mutex<ResolveState<T>>,
}

impl<T> Default for ResolveSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResolveSession<T> {
    /// A session in the [`ResolveState::Idle`] state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            state: Mutex::new(ResolveState::Idle),
        }
    }

    /// Issue a new ticket, superseding any request in flight.
    pub fn begin(&self) -> Ticket {
        let mut state = self.lock();
        // Issued under the lock: the stored ticket is always the latest one.
        let ticket = Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        *state = ResolveState::Resolving { ticket };
        ticket
    }

    /// Whether `ticket` is still the latest one issued.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Record the outcome of the request holding `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when the ticket has
    /// been superseded.
    pub fn complete(&self, ticket: Ticket, outcome: &Result<Lookup<T>>) -> bool
    where
        T: Clone,
    {
        let mut state = self.lock();
        // `begin` bumps `latest` under the same lock.
        if !self.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest.load(Ordering::SeqCst),
                "discarding stale lookup result"
            );
            return false;
        }
        *state = match outcome {
            Ok(Lookup::Found(value)) => ResolveState::Found(value.clone()),
            Ok(Lookup::NotFound) => ResolveState::NotFound,
            Err(e) => ResolveState::Failed {
                message: e.to_string(),
                retryable: e.is_retryable(),
            },
        };
        true
    }

    /// A snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> ResolveState<T>
    where
        T: Clone,
    {
        self.lock().clone()
    }

    /// Begin a request, await `lookup`, and record its outcome.
    ///
    /// The outcome is returned to the caller either way; the `bool` tells
    /// whether it was still current when it arrived.
    pub async fn run<F>(&self, lookup: F) -> (Result<Lookup<T>>, bool)
    where
        F: Future<Output = Result<Lookup<T>>>,
        T: Clone,
    {
        let ticket = self.begin();
        let outcome = lookup.await;
        let applied = self.complete(ticket, &outcome);
        (outcome, applied)
    }

    fn lock(&self) -> MutexGuard<'_, ResolveState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::Error;

    #[test]
    fn tickets_increase() {
        let session = ResolveSession::<u32>::new();
        assert_eq!(session.state(), ResolveState::Idle, "starts idle");
        let a = session.begin();
        let b = session.begin();
        assert!(b > a, "monotonic");
        assert!(!session.is_current(a), "superseded");
        assert!(session.is_current(b), "latest");
        assert_eq!(session.state(), ResolveState::Resolving { ticket: b }, "in flight");
    }

    #[test]
    fn stale_result_is_discarded() {
        let session = ResolveSession::new();
        let old = session.begin();
        let new = session.begin();

        assert!(session.complete(new, &Ok(Lookup::Found("new"))), "latest applies");
        assert!(!session.complete(old, &Ok(Lookup::Found("old"))), "stale dropped");
        assert_eq!(session.state(), ResolveState::Found("new"), "newest answer kept");
    }

    #[test]
    fn outcomes_map_to_states() {
        let session = ResolveSession::<u8>::new();
        let t = session.begin();
        session.complete(t, &Ok(Lookup::NotFound));
        assert_eq!(session.state(), ResolveState::NotFound, "not found");

        let t = session.begin();
        session.complete(t, &Err(Error::NoEndpoints));
        assert!(
            matches!(session.state(), ResolveState::Failed { retryable: false, .. }),
            "validation failure"
        );
    }

    #[test]
    fn concurrent_begins_leave_latest_ticket_in_flight() {
        let session = ResolveSession::<u8>::new();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..200 {
                        session.begin();
                    }
                });
            }
        });

        let ResolveState::Resolving { ticket } = session.state() else {
            panic!("expected an in-flight request");
        };
        assert_eq!(ticket.get(), 1600, "every ticket issued");
        assert!(session.is_current(ticket), "stored ticket is the latest");
    }

    #[tokio::test]
    async fn slow_first_request_loses() {
        let session = ResolveSession::<&str>::new();

        let slow = session.run(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Lookup::Found("first"))
        });
        let fast = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            session
                .run(async { Ok(Lookup::Found("second")) })
                .await
        };

        let ((_, slow_applied), (_, fast_applied)) = tokio::join!(slow, fast);
        assert!(!slow_applied, "older request discarded");
        assert!(fast_applied, "newer request applied");
        assert_eq!(session.state(), ResolveState::Found("second"), "last request wins");
    }
}
