//! Simulated processing latency and incremental text reveal.
//!
//! Both are keyed by a [`Generation`] counter: starting new work bumps the
//! counter, and a task may only commit while its ticket is still current.
//! A slow task that was superseded therefore drops its result instead of
//! overwriting newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::aggregate::summarize;
use crate::models::{AggregateSummary, InteractionRecord};

#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    /// Start new work, superseding every outstanding ticket.
    pub fn begin(&self) -> Ticket {
        let id = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            id,
            counter: Arc::clone(&self.0),
        }
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    counter: Arc<AtomicU64>,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied(u64),
    Superseded(u64),
}

#[derive(Debug, Clone)]
pub struct ProcessedBatch {
    pub generation: u64,
    pub records: Arc<Vec<InteractionRecord>>,
    pub summary: AggregateSummary,
    pub processed_at: DateTime<Utc>,
}

/// Holds the latest processed batch for one session.
#[derive(Debug, Clone)]
pub struct ProcessingSession {
    delay: Duration,
    generation: Generation,
    latest: Arc<Mutex<Option<ProcessedBatch>>>,
}

impl ProcessingSession {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Generation::default(),
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Process `records` after the configured delay. Must be called within a
    /// tokio runtime.
    pub fn submit(&self, records: Vec<InteractionRecord>) -> JoinHandle<Commit> {
        let ticket = self.generation.begin();
        let delay = self.delay;
        let latest = Arc::clone(&self.latest);
        debug!(generation = ticket.id(), count = records.len(), "processing scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !ticket.is_current() {
                debug!(generation = ticket.id(), "discarding stale processing result");
                return Commit::Superseded(ticket.id());
            }

            let batch = ProcessedBatch {
                generation: ticket.id(),
                summary: summarize(&records),
                records: Arc::new(records),
                processed_at: Utc::now(),
            };

            let mut slot = latest.lock().unwrap_or_else(PoisonError::into_inner);
            if !ticket.is_current() {
                return Commit::Superseded(ticket.id());
            }
            info!(
                generation = ticket.id(),
                total = batch.summary.total,
                "processing complete"
            );
            *slot = Some(batch);
            Commit::Applied(ticket.id())
        })
    }

    pub fn latest(&self) -> Option<ProcessedBatch> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the current batch and cancel anything in flight.
    pub fn reset(&self) {
        self.generation.begin();
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed,
    Superseded,
}

/// Reveals text one character at a time.
#[derive(Debug, Clone, Default)]
pub struct Typewriter {
    per_char: Duration,
    generation: Generation,
}

impl Typewriter {
    pub fn new(per_char: Duration) -> Self {
        Self {
            per_char,
            generation: Generation::default(),
        }
    }

    /// Emit every prefix of `text`, from empty to complete, one per tick.
    /// Starting another reveal on the same typewriter stops this one.
    pub async fn reveal<F>(&self, text: &str, mut on_frame: F) -> RevealOutcome
    where
        F: FnMut(&str),
    {
        let ticket = self.generation.begin();
        let boundaries = text
            .char_indices()
            .map(|(index, _)| index)
            .chain(std::iter::once(text.len()));

        for end in boundaries {
            tokio::time::sleep(self.per_char).await;
            if !ticket.is_current() {
                return RevealOutcome::Superseded;
            }
            on_frame(&text[..end]);
        }
        RevealOutcome::Completed
    }
}
