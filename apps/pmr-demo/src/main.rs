//! Walks a queue of integers and a queue of records through a tracking
//! allocator, logging every step.
//!
//! Set `RUST_LOG=trace` to see each ledger event.

use std::fmt;

use anyhow::{Context, Result, ensure};
use nebula_pmr::prelude::*;
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq)]
struct Record {
    id: i32,
    value: f64,
    name: String,
}

impl Record {
    fn new(id: i32, value: f64, name: impl Into<String>) -> Self {
        Self {
            id,
            value,
            name: name.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record{{id={}, value={}, name=\"{}\"}}",
            self.id, self.value, self.name
        )
    }
}

fn integer_queue(tracker: &TrackingAllocator<'_>) -> Result<()> {
    let _span = info_span!("integers").entered();
    let mut queue = Queue::new_in(tracker);

    for i in 1..=5 {
        queue.push(i).with_context(|| format!("pushing {i}"))?;
        info!(value = i, len = queue.len(), "pushed");
    }
    info!(live_blocks = tracker.live_blocks(), "queue filled");

    while let Some(value) = queue.pop() {
        info!(value, remaining = queue.len(), "popped");
    }
    ensure!(queue.is_empty(), "queue should be drained");
    info!(live_blocks = tracker.live_blocks(), "queue drained");

    Ok(())
}

fn record_queue(tracker: &TrackingAllocator<'_>) -> Result<()> {
    let _span = info_span!("records").entered();
    let mut original = Queue::new_in(tracker);

    original
        .try_extend([
            Record::new(1, 1.5, "alpha"),
            Record::new(2, 2.5, "beta"),
            Record::new(3, 3.5, "gamma"),
        ])
        .context("filling record queue")?;

    let moved = original.take();
    info!(
        original_len = original.len(),
        moved_len = moved.len(),
        "moved record queue"
    );

    for record in &moved {
        info!(%record, "record");
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let tracker = TrackingAllocator::new();

    integer_queue(&tracker)?;
    record_queue(&tracker)?;

    let stats = tracker.stats();
    info!(
        allocations = stats.allocations,
        deallocations = stats.deallocations,
        peak_bytes = stats.peak_bytes,
        live_blocks = stats.live_blocks,
        "done"
    );

    Ok(())
}
