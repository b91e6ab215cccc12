//! Batch progress counters and the elapsed-time ticker.
//!
//! The tracker holds authoritative completed/total counts and the elapsed
//! display string; consumers observe it either by [`snapshot`] or through
//! [`ProgressEvent`]s on an mpsc channel (one event per completed image, one
//! tick per second). The ticker thread mutates only the elapsed string, so
//! counters and timer never contend.
//!
//! [`snapshot`]: ProgressTracker::snapshot

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{RecvTimeoutError, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Progress notifications pushed from the core to its presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { total: usize },
    ImageCompleted {
        name: String,
        completed: usize,
        total: usize,
    },
    ImageSkipped { name: String, reason: String },
    Tick { elapsed: String },
    Finished {
        completed: usize,
        total: usize,
        elapsed: String,
    },
}

/// Format a duration as `MM:SS`, both fields zero-padded.
///
/// There is no hour field: both minutes and seconds wrap at 60, so an elapsed
/// time of one hour reads `00:00` again. Batches that long are outside the
/// tool's envelope and the compact display wins.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", (secs / 60) % 60, secs % 60)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub elapsed: String,
}

#[derive(Default)]
struct Shared {
    completed: AtomicUsize,
    total: AtomicUsize,
    elapsed: Mutex<String>,
}

struct Ticker {
    // Dropping the sender stops the thread.
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

/// Completed/total counters plus a once-per-second wall-clock ticker.
pub struct ProgressTracker {
    shared: Arc<Shared>,
    events: Option<Sender<ProgressEvent>>,
    ticker: Option<Ticker>,
    started_at: Option<Instant>,
}

impl ProgressTracker {
    pub fn new(events: Option<Sender<ProgressEvent>>) -> Self {
        let tracker = Self {
            shared: Arc::new(Shared::default()),
            events,
            ticker: None,
            started_at: None,
        };
        *tracker.shared.elapsed.lock().unwrap() = format_elapsed(Duration::ZERO);
        tracker
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Begin a batch: zero the completed count, set the total, restart the
    /// elapsed clock and spawn the ticker.
    pub fn start_batch(&mut self, total: usize) {
        self.stop_ticker();
        self.shared.completed.store(0, Ordering::SeqCst);
        self.shared.total.store(total, Ordering::SeqCst);
        *self.shared.elapsed.lock().unwrap() = format_elapsed(Duration::ZERO);

        let started = Instant::now();
        self.started_at = Some(started);
        self.emit(ProgressEvent::Started { total });

        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let (stop_tx, stop_rx) = channel::<()>();
        let thread = std::thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(Duration::from_secs(1)) {
                    Err(RecvTimeoutError::Timeout) => {
                        let elapsed = format_elapsed(started.elapsed());
                        *shared.elapsed.lock().unwrap() = elapsed.clone();
                        if let Some(tx) = &events {
                            let _ = tx.send(ProgressEvent::Tick { elapsed });
                        }
                    }
                    _ => break,
                }
            }
        });
        self.ticker = Some(Ticker {
            stop: stop_tx,
            thread,
        });
    }

    /// Record one completed image and return the new completed count.
    pub fn record_completed(&self, name: &str) -> usize {
        let completed = self.shared.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.emit(ProgressEvent::ImageCompleted {
            name: name.to_string(),
            completed,
            total: self.shared.total.load(Ordering::SeqCst),
        });
        completed
    }

    /// Record an image that was skipped rather than completed.
    pub fn record_skipped(&self, name: &str, reason: &str) {
        self.emit(ProgressEvent::ImageSkipped {
            name: name.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Stop the clock: called exactly when the batch's last result arrives.
    pub fn finish(&mut self) {
        if let Some(started) = self.started_at.take() {
            let elapsed = format_elapsed(started.elapsed());
            *self.shared.elapsed.lock().unwrap() = elapsed.clone();
            self.emit(ProgressEvent::Finished {
                completed: self.shared.completed.load(Ordering::SeqCst),
                total: self.shared.total.load(Ordering::SeqCst),
                elapsed,
            });
        }
        self.stop_ticker();
    }

    /// Zero everything back to the pre-batch state (used on retire/supersede).
    pub fn reset(&mut self) {
        self.stop_ticker();
        self.started_at = None;
        self.shared.completed.store(0, Ordering::SeqCst);
        self.shared.total.store(0, Ordering::SeqCst);
        *self.shared.elapsed.lock().unwrap() = format_elapsed(Duration::ZERO);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.shared.completed.load(Ordering::SeqCst),
            total: self.shared.total.load(Ordering::SeqCst),
            elapsed: self.shared.elapsed.lock().unwrap().clone(),
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            drop(ticker.stop);
            let _ = ticker.thread.join();
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
