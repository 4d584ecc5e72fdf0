//! Background extraction worker.
//!
//! Runs the orchestrator on its own thread so a front end can render
//! progress from the event channel and request cancellation while files
//! are being processed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use crate::model::ExtractionResult;
use crate::pipeline::{ExtractEvent, ExtractEvents, Orchestrator};

/// Requests cooperative cancellation of a running worker.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    continue_intent: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Stop after the file currently being processed.
    pub fn cancel(&self) {
        self.continue_intent.store(false, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        !self.continue_intent.load(Ordering::SeqCst)
    }
}

/// Forwards orchestrator events into a channel.
struct ChannelEvents {
    sender: Sender<ExtractEvent>,
    continue_intent: Arc<AtomicBool>,
}

impl ExtractEvents for ChannelEvents {
    fn on_event(&mut self, event: ExtractEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("event receiver gone, dropping event");
        }
    }

    fn do_continue(&self) -> bool {
        self.continue_intent.load(Ordering::SeqCst)
    }
}

/// A running extraction on a background thread.
#[derive(Debug)]
pub struct ExtractionWorker {
    handle: JoinHandle<Result<Vec<ExtractionResult>>>,
    events: Receiver<ExtractEvent>,
    continue_intent: Arc<AtomicBool>,
}

impl ExtractionWorker {
    /// Start extracting `inputs` into `output_dir`.
    pub fn spawn(inputs: Vec<PathBuf>, output_dir: PathBuf, config: ExtractConfig) -> Result<Self> {
        let (sender, events) = unbounded();
        let continue_intent = Arc::new(AtomicBool::new(true));
        let mut sink = ChannelEvents {
            sender,
            continue_intent: continue_intent.clone(),
        };

        let handle = thread::Builder::new()
            .name("extraction-worker".to_string())
            .spawn(move || Orchestrator::new(&config).run(&inputs, &output_dir, &mut sink))?;

        Ok(Self {
            handle,
            events,
            continue_intent,
        })
    }

    /// Progress events. The channel closes when the worker finishes.
    pub fn events(&self) -> &Receiver<ExtractEvent> {
        &self.events
    }

    /// Handle for cancelling from another thread or a signal handler.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            continue_intent: self.continue_intent.clone(),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel_handle().cancel();
    }

    /// Wait for the worker and return its results.
    pub fn join(self) -> Result<Vec<ExtractionResult>> {
        self.handle
            .join()
            .map_err(|_| Error::Other("extraction worker panicked".to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_reports_progress_and_results() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"junk").unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"junk").unwrap();

        let worker = ExtractionWorker::spawn(
            vec![dir.path().to_path_buf()],
            dir.path().join("out"),
            ExtractConfig::default(),
        )
        .unwrap();

        let events: Vec<ExtractEvent> = worker.events().iter().collect();
        let results = worker.join().unwrap();

        assert_eq!(results.len(), 2);
        assert!(matches!(events.first(), Some(ExtractEvent::Started { total: 2 })));
        assert!(matches!(
            events.last(),
            Some(ExtractEvent::Completed { processed: 2, total: 2 })
        ));
    }

    #[test]
    fn test_cancelled_sink_stops_before_first_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"junk").unwrap();

        let (sender, events) = unbounded();
        let continue_intent = Arc::new(AtomicBool::new(false));
        let mut sink = ChannelEvents {
            sender,
            continue_intent,
        };
        let config = ExtractConfig::default();
        let results = Orchestrator::new(&config)
            .run(&[dir.path().to_path_buf()], &dir.path().join("out"), &mut sink)
            .unwrap();
        drop(sink);

        assert!(results.is_empty());
        let events: Vec<ExtractEvent> = events.iter().collect();
        assert!(matches!(
            events.last(),
            Some(ExtractEvent::Cancelled { processed: 0, total: 1 })
        ));
    }

    #[test]
    fn test_cancel_handle() {
        let handle = CancelHandle {
            continue_intent: Arc::new(AtomicBool::new(true)),
        };
        let clone = handle.clone();
        assert!(!handle.is_cancelled());
        clone.cancel();
        assert!(handle.is_cancelled());
    }
}
