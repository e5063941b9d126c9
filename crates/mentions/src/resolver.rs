use std::task::{Context, Poll};

use futures::FutureExt as _;
use futures::StreamExt as _;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;

use crate::candidate::{Lookup, LookupError, MentionCandidate};

pub type Ticket = u64;

type Outcome = Result<Vec<MentionCandidate>, LookupError>;

#[derive(Debug)]
pub enum Resolution {
    Ready(Vec<MentionCandidate>),
    Pending(Ticket),
}

/// Issues a ticket for every lookup and only lets the latest one through.
///
/// Deferred lookups are polled to completion even once superseded; their
/// results are dropped instead of being cancelled. Superseded lookups that
/// never finish do not keep the resolver pending.
#[derive(Default)]
pub struct Resolver {
    latest: Ticket,
    awaiting_latest: bool,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, (Ticket, Outcome)>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Ticket {
        self.latest
    }

    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Whether the latest ticket is a deferred lookup still waiting for its answer.
    pub fn is_awaiting_latest(&self) -> bool {
        self.awaiting_latest
    }

    pub fn issue(&mut self, lookup: Lookup) -> Resolution {
        self.latest += 1;
        let ticket = self.latest;
        match lookup {
            Lookup::Ready(candidates) => {
                self.awaiting_latest = false;
                Resolution::Ready(candidates)
            }
            Lookup::Deferred(future) => {
                self.awaiting_latest = true;
                self.in_flight
                    .push(async move { (ticket, future.await) }.boxed_local());
                Resolution::Pending(ticket)
            }
        }
    }

    /// Makes every outstanding ticket stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
        self.awaiting_latest = false;
    }

    /// Yields the result of the latest ticket once it completes, skipping
    /// stale completions. `Ready(None)` means the latest ticket has nothing
    /// left to deliver, even if superseded lookups are still running.
    pub fn poll_current(&mut self, cx: &mut Context<'_>) -> Poll<Option<Outcome>> {
        loop {
            match self.in_flight.poll_next_unpin(cx) {
                Poll::Ready(Some((ticket, outcome))) => {
                    if ticket == self.latest && self.awaiting_latest {
                        self.awaiting_latest = false;
                        return Poll::Ready(Some(outcome));
                    }
                    tracing::trace!(ticket, latest = self.latest, "discarding stale lookup");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending if self.awaiting_latest => return Poll::Pending,
                Poll::Pending => return Poll::Ready(None),
            }
        }
    }
}
