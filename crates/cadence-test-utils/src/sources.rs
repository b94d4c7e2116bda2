//! Scripted work-item sources, processors and abort signals for job tests.

use cadence_core::{AbortSignal, CoreError};
use futures::future::{self, Ready};
use futures::stream::{self, Stream};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Items `1..=count`
pub fn numbered_items(count: u64) -> impl Stream<Item = Result<u64, CoreError>> {
    stream::iter((1..=count).map(Ok))
}

/// Items `1..fail_at`, then a source failure in place of item `fail_at`,
/// then the remaining items up to `count` (which a runner must never reach)
pub fn failing_source(count: u64, fail_at: u64) -> impl Stream<Item = Result<u64, CoreError>> {
    stream::iter((1..=count).map(move |i| {
        if i == fail_at {
            Err(CoreError::SourceFailed(format!("cursor lost at item {}", i)))
        } else {
            Ok(i)
        }
    }))
}

/// Processor that fails on chosen items and records every item it sees
#[derive(Debug, Default)]
pub struct ScriptedProcessor {
    fail_on: HashSet<u64>,
    seen: Mutex<Vec<u64>>,
}

impl ScriptedProcessor {
    /// Fail on every item in `fail_on`
    pub fn failing_on(fail_on: impl IntoIterator<Item = u64>) -> Self {
        Self {
            fail_on: fail_on.into_iter().collect(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Process one item
    pub fn process(&self, item: u64) -> Ready<Result<(), CoreError>> {
        self.seen.lock().push(item);
        if self.fail_on.contains(&item) {
            future::ready(Err(CoreError::ItemFailed(format!("item {} rejected", item))))
        } else {
            future::ready(Ok(()))
        }
    }

    /// Items processed so far, in order
    pub fn seen(&self) -> Vec<u64> {
        self.seen.lock().clone()
    }
}

/// Abort signal that answers `false` for the first `checks` queries and
/// `true` afterwards
#[derive(Debug)]
pub struct AbortAfterChecks {
    remaining: AtomicUsize,
    queries: AtomicUsize,
}

impl AbortAfterChecks {
    /// Abort on query number `checks + 1`
    pub fn new(checks: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(checks),
            queries: AtomicUsize::new(0),
        }
    }

    /// How many times the signal was queried
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl AbortSignal for AbortAfterChecks {
    fn abort_requested(&self) -> bool {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}
