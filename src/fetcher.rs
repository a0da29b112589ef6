//! Issues record fetches in the background and hands their results back to
//! the single consumer that owns the table.
//!
//! Every request is tagged with a sequence number. Only the outcome of the
//! most recently issued request is accepted, so a slow response can never
//! overwrite the data of a newer one. Debounced requests wait for a quiet
//! interval and are replaced, not queued, by later debounced requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::record::Record;
use crate::source::{CategoryQuery, FetchError, RecordSource};

#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub query: CategoryQuery,
    pub result: Result<Vec<Record>, FetchError>,
}

/// Monotonically increasing request counter shared with running fetches.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    issued: Arc<AtomicU64>,
}

impl RequestSequence {
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest()
    }
}

pub struct Fetcher {
    source: Arc<dyn RecordSource>,
    runtime: Handle,
    sender: UnboundedSender<FetchOutcome>,
    sequence: RequestSequence,
    quiet: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Fetcher {
    pub fn new(
        source: Arc<dyn RecordSource>,
        runtime: Handle,
        quiet: Duration,
    ) -> (Self, UnboundedReceiver<FetchOutcome>) {
        let (sender, receiver) = unbounded_channel();
        let fetcher = Fetcher {
            source,
            runtime,
            sender,
            sequence: RequestSequence::default(),
            quiet,
            pending: None,
        };
        (fetcher, receiver)
    }

    /// Starts a fetch right away. Supersedes all earlier requests.
    pub fn request(&mut self, query: CategoryQuery) -> u64 {
        self.cancel_pending();
        let seq = self.sequence.issue();
        debug!("Fetch #{seq} for {query:?}");
        let task = Self::run(
            Arc::clone(&self.source),
            seq,
            query,
            self.sender.clone(),
        );
        self.runtime.spawn(task);
        seq
    }

    /// Starts a fetch once no other debounced request arrived for the quiet
    /// interval. A still waiting request is dropped in favour of this one.
    pub fn request_debounced(&mut self, query: CategoryQuery) -> u64 {
        self.cancel_pending();
        let seq = self.sequence.issue();
        trace!("Debounced fetch #{seq} for {query:?} in {:?}", self.quiet);
        let quiet = self.quiet;
        let task = Self::run(
            Arc::clone(&self.source),
            seq,
            query,
            self.sender.clone(),
        );
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(quiet).await;
            task.await;
        }));
        seq
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.sequence.is_latest(seq)
    }

    /// Returns the outcome's query and result if it belongs to the latest
    /// request, stale outcomes are dropped.
    pub fn accept(
        &self,
        outcome: FetchOutcome,
    ) -> Option<(CategoryQuery, Result<Vec<Record>, FetchError>)> {
        if self.is_current(outcome.seq) {
            Some((outcome.query, outcome.result))
        } else {
            warn!(
                "Discarding stale response #{} for {:?}, latest request is #{}",
                outcome.seq,
                outcome.query,
                self.sequence.latest()
            );
            None
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    async fn run(
        source: Arc<dyn RecordSource>,
        seq: u64,
        query: CategoryQuery,
        sender: UnboundedSender<FetchOutcome>,
    ) {
        let start_time = Instant::now();
        let result = source.fetch(&query).await;
        match &result {
            Ok(records) => debug!(
                "Fetch #{seq} returned {} records in {}ms",
                records.len(),
                start_time.elapsed().as_millis()
            ),
            Err(e) => debug!("Fetch #{seq} failed: {e}"),
        }
        if sender.send(FetchOutcome { seq, query, result }).is_err() {
            trace!("Fetch #{seq} finished after the receiver was dropped");
        }
    }
}

impl Drop for Fetcher {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
