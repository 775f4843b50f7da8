//! IMDB liveness record.
//!
//! # Design Decisions
//! - One writer (the monitor), many readers (the status endpoint)
//! - Plain atomics; readers never block the writer

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Default)]
struct Inner {
    up: AtomicBool,
    checks: AtomicU64,
    /// Unix millis of the last probe; 0 means never.
    last_call_ms: AtomicI64,
}

/// Writable handle held by the monitor.
#[derive(Debug, Clone, Default)]
pub struct ImdbStatus {
    inner: Arc<Inner>,
}

/// Read-only view handed to request handlers.
#[derive(Debug, Clone)]
pub struct ImdbStatusReader {
    inner: Arc<Inner>,
}

/// Point-in-time copy of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub up: bool,
    pub last_call: Option<DateTime<Utc>>,
    pub checks: u64,
}

impl ImdbStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one probe outcome taken at `at`.
    pub fn record(&self, up: bool, at: DateTime<Utc>) {
        self.inner.up.store(up, Ordering::Release);
        self.inner.last_call_ms.store(at.timestamp_millis(), Ordering::Release);
        self.inner.checks.fetch_add(1, Ordering::AcqRel);
    }

    pub fn reader(&self) -> ImdbStatusReader {
        ImdbStatusReader {
            inner: self.inner.clone(),
        }
    }
}

impl ImdbStatusReader {
    pub fn snapshot(&self) -> StatusSnapshot {
        let last_call_ms = self.inner.last_call_ms.load(Ordering::Acquire);
        StatusSnapshot {
            up: self.inner.up.load(Ordering::Acquire),
            last_call: (last_call_ms != 0)
                .then(|| DateTime::from_timestamp_millis(last_call_ms))
                .flatten(),
            checks: self.inner.checks.load(Ordering::Acquire),
        }
    }
}
