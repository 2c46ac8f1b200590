//! Test-only bus recording every produced (key, value) pair for assertion.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BusError, MessageBus};

/// Shared handle to a [`MockBus`]'s recorded calls, cloneable so a test can
/// hold onto it after the bus itself has been moved into a `Box<dyn
/// MessageBus>`.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<(Vec<u8>, Vec<u8>)>>>);

impl Recorder {
    pub fn records(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.0.lock().unwrap().clone()
    }
}

pub struct MockBus {
    recorder: Recorder,
    fail: bool,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            recorder: Recorder::default(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            recorder: Recorder::default(),
            fail: true,
        }
    }

    pub fn recorder(&self) -> Recorder {
        self.recorder.clone()
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus for MockBus {
    fn produce(&self, _topic: &str, key: &[u8], value: &[u8]) -> Result<(), BusError> {
        if self.fail {
            return Err(BusError::QueueFull);
        }
        self.recorder
            .0
            .lock()
            .unwrap()
            .push((key.to_vec(), value.to_vec()));
        Ok(())
    }

    fn poll(&self, _timeout: Duration) {}

    fn flush(&self, _timeout: Duration) {}
}
