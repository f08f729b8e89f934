//! Shared test fixtures for watcher tests.

use super::netlink::HEADER_LEN;
use super::pump::{DatagramSource, Readiness};
use super::{BackendFailure, ChangeHandler, EventSink, EventSource, StartupError, WatchError};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Handler that counts what it receives.
///
/// Clones share their counters, so a test keeps one clone and hands the
/// other to the code under test.
#[derive(Clone, Default)]
pub struct Recorder {
    changes: Arc<AtomicUsize>,
    failures: Arc<Mutex<Vec<BackendFailure>>>,
    /// Sequence of received notifications: `'c'` per change, `'f'` per failure
    log: Arc<Mutex<String>>,
}

impl Recorder {
    pub fn changes(&self) -> usize {
        self.changes.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> usize {
        self.failures.lock().unwrap().len()
    }

    pub fn last_failure(&self) -> Option<BackendFailure> {
        self.failures.lock().unwrap().last().cloned()
    }

    pub fn log(&self) -> String {
        self.log.lock().unwrap().clone()
    }
}

impl ChangeHandler for Recorder {
    fn on_change(&self) {
        self.changes.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push('c');
    }

    fn on_failure(&self, failure: &BackendFailure) {
        self.failures.lock().unwrap().push(failure.clone());
        self.log.lock().unwrap().push('f');
    }
}

/// Builds one netlink message of `kind` with `payload` zero bytes,
/// padded to the 4-byte boundary.
pub fn message(kind: u16, payload: usize) -> Vec<u8> {
    let len = u32::try_from(HEADER_LEN + payload).unwrap();
    let mut buf = Vec::new();
    buf.extend_from_slice(&len.to_ne_bytes());
    buf.extend_from_slice(&kind.to_ne_bytes());
    buf.extend_from_slice(&0u16.to_ne_bytes());
    buf.extend_from_slice(&7u32.to_ne_bytes());
    buf.extend_from_slice(&0u32.to_ne_bytes());
    buf.resize(HEADER_LEN + payload, 0);
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
    buf
}

/// Concatenates messages into one datagram.
pub fn datagram(messages: &[Vec<u8>]) -> Vec<u8> {
    messages.concat()
}

/// One scripted outcome of a receive call.
pub enum Step {
    Datagram(Vec<u8>),
    Error(io::Error),
    Shutdown,
}

/// Datagram source replaying a fixed script, then requesting shutdown.
pub struct ScriptedDatagrams {
    steps: VecDeque<Step>,
    pub calls: usize,
}

impl ScriptedDatagrams {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            calls: 0,
        }
    }
}

impl DatagramSource for ScriptedDatagrams {
    fn next_datagram(&mut self, buf: &mut [u8]) -> io::Result<Readiness> {
        self.calls += 1;
        match self.steps.pop_front() {
            Some(Step::Datagram(bytes)) => {
                // Oversized datagrams are truncated like a short recv buffer.
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(Readiness::Datagram(n))
            }
            Some(Step::Error(error)) => Err(error),
            Some(Step::Shutdown) | None => Ok(Readiness::Shutdown),
        }
    }
}

#[derive(Default)]
struct MockState {
    sink: Option<EventSink>,
    subscribes: usize,
    releases: usize,
}

/// Controller for a [`MockSource`], kept by the test after the source
/// moves into a watcher.
#[derive(Clone, Default)]
pub struct MockController {
    state: Arc<Mutex<MockState>>,
}

impl MockController {
    /// Simulates `n` native notifications on the live subscription.
    pub fn inject(&self, n: usize) {
        let sink = self.state.lock().unwrap().sink.clone();
        if let Some(sink) = sink {
            for _ in 0..n {
                sink.change();
            }
        }
    }

    /// Simulates a fatal backend failure on the live subscription.
    pub fn fail(&self, failure: &BackendFailure) {
        let sink = self.state.lock().unwrap().sink.clone();
        if let Some(sink) = sink {
            sink.fail(failure);
        }
    }

    pub fn subscribes(&self) -> usize {
        self.state.lock().unwrap().subscribes
    }

    pub fn releases(&self) -> usize {
        self.state.lock().unwrap().releases
    }

    pub fn is_live(&self) -> bool {
        self.state.lock().unwrap().sink.is_some()
    }
}

/// In-process event source with no native calls.
pub struct MockSource {
    controller: MockController,
    fail_with: Mutex<Option<StartupError>>,
}

impl MockSource {
    pub fn pair() -> (Self, MockController) {
        let controller = MockController::default();
        let source = Self {
            controller: controller.clone(),
            fail_with: Mutex::new(None),
        };
        (source, controller)
    }

    /// Source whose next subscribe fails with `error`.
    pub fn failing(error: StartupError) -> (Self, MockController) {
        let (source, controller) = Self::pair();
        *source.fail_with.lock().unwrap() = Some(error);
        (source, controller)
    }
}

/// Releases the mock subscription on drop, like a closed socket.
pub struct MockSubscription {
    state: Arc<Mutex<MockState>>,
}

impl Drop for MockSubscription {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.sink = None;
        state.releases += 1;
    }
}

impl EventSource for MockSource {
    type Subscription = MockSubscription;

    fn subscribe(&self, sink: EventSink) -> Result<Self::Subscription, WatchError> {
        if let Some(error) = self.fail_with.lock().unwrap().take() {
            return Err(error.into());
        }

        let mut state = self.controller.state.lock().unwrap();
        state.sink = Some(sink);
        state.subscribes += 1;
        Ok(MockSubscription {
            state: Arc::clone(&self.controller.state),
        })
    }
}
