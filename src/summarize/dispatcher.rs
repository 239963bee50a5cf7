use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::{Summarizer, SummaryError, request_summary};

/// Cooperative cancellation flag shared with a worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct SummaryOutcome {
    pub request_id: u64,
    pub result: Result<String, SummaryError>,
}

struct InFlight {
    id: u64,
    token: CancelToken,
}

/// Runs summary requests on worker threads, one live request at a time
///
/// Starting a request cancels the previous one. Results of cancelled or
/// superseded requests are dropped, so [`poll`](Self::poll) only ever yields
/// the outcome of the most recent request.
pub struct SummaryDispatcher {
    summarizer: Arc<dyn Summarizer>,
    sender: Sender<SummaryOutcome>,
    receiver: Receiver<SummaryOutcome>,
    next_id: u64,
    in_flight: Option<InFlight>,
}

impl SummaryDispatcher {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { summarizer, sender, receiver, next_id: 1, in_flight: None }
    }

    /// Start summarizing `text`, cancelling any request still running
    ///
    /// Without a key nothing is spawned and `MissingCredential` is returned.
    pub fn start(&mut self, api_key: Option<String>, text: String) -> Result<u64, SummaryError> {
        let key = api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        let Some(key) = key else {
            return Err(SummaryError::MissingCredential);
        };

        self.cancel();

        let id = self.next_id;
        self.next_id += 1;
        let token = CancelToken::new();
        self.in_flight = Some(InFlight { id, token: token.clone() });

        let summarizer = Arc::clone(&self.summarizer);
        let sender = self.sender.clone();
        thread::spawn(move || {
            if token.is_cancelled() {
                return;
            }
            let result = request_summary(summarizer.as_ref(), Some(&key), &text);
            if token.is_cancelled() {
                debug!(request_id = id, "Dropping result of cancelled summary request");
                return;
            }
            let _ = sender.send(SummaryOutcome { request_id: id, result });
        });

        debug!(request_id = id, "Started summary request");
        Ok(id)
    }

    /// Cancel the running request; returns whether one was running
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(in_flight) => {
                in_flight.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn pending_id(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|f| f.id)
    }

    /// Non-blocking check for the current request's outcome
    pub fn poll(&mut self) -> Option<SummaryOutcome> {
        while let Ok(outcome) = self.receiver.try_recv() {
            if let Some(outcome) = self.accept(outcome) {
                return Some(outcome);
            }
        }
        None
    }

    /// Block up to `timeout` for the current request's outcome
    pub fn wait(&mut self, timeout: Duration) -> Option<SummaryOutcome> {
        let deadline = Instant::now() + timeout;
        while self.in_flight.is_some() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(outcome) => {
                    if let Some(outcome) = self.accept(outcome) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
        None
    }

    fn accept(&mut self, outcome: SummaryOutcome) -> Option<SummaryOutcome> {
        match &self.in_flight {
            Some(in_flight) if in_flight.id == outcome.request_id => {
                self.in_flight = None;
                Some(outcome)
            }
            _ => {
                debug!(request_id = outcome.request_id, "Discarding stale summary result");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Echoes the text back, blocking on texts that start with "slow"
    /// until released
    struct GatedSummarizer {
        gate: Mutex<Receiver<()>>,
    }

    impl Summarizer for GatedSummarizer {
        fn summarize(&self, _api_key: &str, text: &str) -> Result<String, SummaryError> {
            if text.starts_with("slow") {
                let gate = self.gate.lock().unwrap();
                let _ = gate.recv_timeout(Duration::from_secs(5));
            }
            Ok(format!("summary of {}", text))
        }
    }

    fn gated() -> (SummaryDispatcher, Sender<()>) {
        let (release, gate) = mpsc::channel();
        let summarizer = GatedSummarizer { gate: Mutex::new(gate) };
        (SummaryDispatcher::new(Arc::new(summarizer)), release)
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let shared = token.clone();
        assert!(!shared.is_cancelled());
        token.cancel();
        assert!(shared.is_cancelled());
    }

    #[test]
    fn test_missing_key_spawns_nothing() {
        let (mut dispatcher, _release) = gated();
        assert_eq!(dispatcher.start(None, "text".into()), Err(SummaryError::MissingCredential));
        assert_eq!(
            dispatcher.start(Some(" ".into()), "text".into()),
            Err(SummaryError::MissingCredential)
        );
        assert!(!dispatcher.is_pending());
    }

    #[test]
    fn test_single_request_completes() {
        let (mut dispatcher, _release) = gated();
        let id = dispatcher.start(Some("k".into()), "fast text".into()).unwrap();
        assert!(dispatcher.is_pending());

        let outcome = dispatcher.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.request_id, id);
        assert_eq!(outcome.result.unwrap(), "summary of fast text");
        assert!(!dispatcher.is_pending());
    }

    #[test]
    fn test_latest_request_wins() {
        let (mut dispatcher, release) = gated();
        let first = dispatcher.start(Some("k".into()), "slow first".into()).unwrap();
        let second = dispatcher.start(Some("k".into()), "fast second".into()).unwrap();
        assert_ne!(first, second);
        assert_eq!(dispatcher.pending_id(), Some(second));

        let outcome = dispatcher.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.request_id, second);
        assert_eq!(outcome.result.unwrap(), "summary of fast second");

        // The superseded request finishing later is never surfaced
        release.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(dispatcher.poll().is_none());
    }

    #[test]
    fn test_cancelled_request_is_dropped() {
        let (mut dispatcher, release) = gated();
        dispatcher.start(Some("k".into()), "slow text".into()).unwrap();
        assert!(dispatcher.cancel());
        assert!(!dispatcher.is_pending());
        assert!(!dispatcher.cancel());

        release.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert!(dispatcher.poll().is_none());
    }
}
