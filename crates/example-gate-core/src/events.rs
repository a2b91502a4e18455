// crates/example-gate-core/src/events.rs
// ============================================================================
// Module: Run Events
// Description: Structured progress events for harness runs.
// Purpose: Emit JSON-lines run logs without a logging framework dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The harness reports progress through an [`EventSink`]. [`NoopEvents`]
//! discards everything; [`JsonLinesEvents`] writes one JSON object per event,
//! stamped with milliseconds since the Unix epoch. Events carry example
//! names, endpoints, and counts only. Credentials are never included.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::coverage::CoverageMode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Harness progress event.
///
/// # Invariants
/// - Variant tags are stable for log consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HarnessEvent {
    /// A run began.
    RunStarted {
        /// Number of examples selected for this run.
        selected: usize,
        /// Number of registered examples.
        registered: usize,
    },
    /// An example is about to execute.
    ExampleStarted {
        /// Example name.
        name: String,
        /// Endpoint key (`path:method`).
        endpoint: String,
    },
    /// An example finished, successfully or not.
    ExampleFinished {
        /// Example name.
        name: String,
        /// Records validated before completion or failure.
        records: usize,
        /// Whether every step succeeded.
        ok: bool,
        /// Failure message when `ok` is false.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// A registered example was never called.
    CoverageGap {
        /// Example name.
        name: String,
        /// Endpoint key (`path:method`).
        endpoint: String,
    },
    /// A run finished.
    RunFinished {
        /// Examples executed.
        examples: usize,
        /// Records validated.
        records: usize,
        /// Coverage mode applied.
        coverage: CoverageMode,
        /// Process exit status derived from coverage.
        exit_status: u8,
    },
}

/// Event plus timestamp, as written by [`JsonLinesEvents`].
#[derive(Serialize)]
struct StampedEvent<'a> {
    /// Milliseconds since the Unix epoch.
    timestamp_ms: u128,
    /// Event payload.
    #[serde(flatten)]
    event: &'a HarnessEvent,
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Receiver for harness progress events.
pub trait EventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &HarnessEvent);
}

/// No-op event sink.
///
/// # Invariants
/// - Events are intentionally discarded.
pub struct NoopEvents;

impl EventSink for NoopEvents {
    fn record(&self, _event: &HarnessEvent) {}
}

/// Event sink writing JSON lines to a writer.
pub struct JsonLinesEvents<W: Write + Send> {
    /// Destination writer.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesEvents<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer, consuming the sink.
    ///
    /// A poisoned lock still yields the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write + Send> EventSink for JsonLinesEvents<W> {
    fn record(&self, event: &HarnessEvent) {
        let stamped = StampedEvent {
            timestamp_ms: now_ms(),
            event,
        };
        if let Ok(payload) = serde_json::to_string(&stamped)
            && let Ok(mut writer) = self.writer.lock()
        {
            let _ = writeln!(writer, "{payload}");
            let _ = writer.flush();
        }
    }
}

/// Returns milliseconds since the Unix epoch, or zero before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
