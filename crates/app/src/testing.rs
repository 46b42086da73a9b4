//! In-memory port fakes shared by the service tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use pihub_domain::chat::{ChatId, Keyboard, MessageId};
use pihub_domain::cpu::CpuFrequency;
use pihub_domain::device::DeviceTarget;
use pihub_domain::error::{DeviceError, DeviceOperation, DispatchError, SensorError};
use pihub_domain::power::PowerState;

use crate::ports::{ChatTransport, CpuSensor, DeviceConnector, DeviceSession, Notifier};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Device ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlugCall {
    Connect,
    Read,
    Set(PowerState),
}

#[derive(Debug, Clone, Copy)]
pub enum ReadBehaviour {
    Normal,
    Ambiguous,
    Fail,
}

struct PlugInner {
    state: Mutex<PowerState>,
    calls: Mutex<Vec<(PlugCall, Instant)>>,
    fail_connect: bool,
    read: ReadBehaviour,
    failing_set: Option<usize>,
    hanging_set: Option<usize>,
}

/// Scriptable plug acting as both connector and session.
#[derive(Clone)]
pub struct FakePlug(Arc<PlugInner>);

impl FakePlug {
    pub fn new(initial: PowerState) -> Self {
        Self::build(initial, false, ReadBehaviour::Normal, None, None)
    }

    fn build(
        initial: PowerState,
        fail_connect: bool,
        read: ReadBehaviour,
        failing_set: Option<usize>,
        hanging_set: Option<usize>,
    ) -> Self {
        Self(Arc::new(PlugInner {
            state: Mutex::new(initial),
            calls: Mutex::new(Vec::new()),
            fail_connect,
            read,
            failing_set,
            hanging_set,
        }))
    }

    pub fn failing_connect(initial: PowerState) -> Self {
        Self::build(initial, true, ReadBehaviour::Normal, None, None)
    }

    pub fn with_read(initial: PowerState, read: ReadBehaviour) -> Self {
        Self::build(initial, false, read, None, None)
    }

    /// The `index`-th set call (0 = invert, 1 = restore) fails.
    pub fn failing_set(initial: PowerState, index: usize) -> Self {
        Self::build(initial, false, ReadBehaviour::Normal, Some(index), None)
    }

    /// The `index`-th set call never completes.
    pub fn hanging_set(initial: PowerState, index: usize) -> Self {
        Self::build(initial, false, ReadBehaviour::Normal, None, Some(index))
    }

    pub fn state(&self) -> PowerState {
        *lock(&self.0.state)
    }

    pub fn calls(&self) -> Vec<PlugCall> {
        lock(&self.0.calls).iter().map(|(c, _)| *c).collect()
    }

    pub fn timed_calls(&self) -> Vec<(PlugCall, Instant)> {
        lock(&self.0.calls).clone()
    }

    pub fn set_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PlugCall::Set(_)))
            .count()
    }

    fn record(&self, call: PlugCall) -> usize {
        let mut calls = lock(&self.0.calls);
        let index = calls
            .iter()
            .filter(|(c, _)| matches!(c, PlugCall::Set(_)))
            .count();
        calls.push((call, Instant::now()));
        index
    }
}

impl DeviceConnector for FakePlug {
    type Session = FakePlug;

    async fn connect(&self, target: &DeviceTarget) -> Result<FakePlug, DeviceError> {
        self.record(PlugCall::Connect);
        if self.0.fail_connect {
            return Err(DeviceError::Connection {
                device: target.identity.to_string(),
                message: "host unreachable".to_string(),
            });
        }
        Ok(self.clone())
    }
}

impl DeviceSession for FakePlug {
    async fn read_power_state(&self) -> Result<Option<PowerState>, DeviceError> {
        self.record(PlugCall::Read);
        match self.0.read {
            ReadBehaviour::Normal => Ok(Some(self.state())),
            ReadBehaviour::Ambiguous => Ok(None),
            ReadBehaviour::Fail => Err(DeviceError::command(
                DeviceOperation::ReadState,
                "malformed response",
            )),
        }
    }

    async fn set_power_state(&self, state: PowerState) -> Result<(), DeviceError> {
        let index = self.record(PlugCall::Set(state));
        if self.0.hanging_set == Some(index) {
            std::future::pending::<()>().await;
        }
        if self.0.failing_set == Some(index) {
            return Err(DeviceError::command(
                DeviceOperation::SetState,
                "device refused",
            ));
        }
        *lock(&self.0.state) = state;
        Ok(())
    }
}

// ── Chat ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message {
        chat: ChatId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Edit {
        chat: ChatId,
        message: MessageId,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Answer(String),
    Notify {
        chat: ChatId,
        text: String,
    },
}

/// Records every outbound chat operation.
#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<Sent>>,
    fail: bool,
}

impl RecordingChat {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        lock(&self.sent).clone()
    }

    fn push(&self, sent: Sent) -> Result<(), DispatchError> {
        lock(&self.sent).push(sent);
        if self.fail {
            return Err(DispatchError::Transport("bad gateway".to_string()));
        }
        Ok(())
    }
}

impl Notifier for RecordingChat {
    async fn notify(&self, recipient: ChatId, text: &str) -> Result<(), DispatchError> {
        self.push(Sent::Notify {
            chat: recipient,
            text: text.to_string(),
        })
    }
}

impl ChatTransport for RecordingChat {
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DispatchError> {
        self.push(Sent::Message {
            chat,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        })
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DispatchError> {
        self.push(Sent::Edit {
            chat,
            message,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        })
    }

    async fn answer_callback(&self, query_id: &str) -> Result<(), DispatchError> {
        self.push(Sent::Answer(query_id.to_string()))
    }
}

// ── Sensor ─────────────────────────────────────────────────────────

/// Sensor returning canned readings.
#[derive(Clone)]
pub struct StubSensor {
    pub temperature: Result<f64, SensorError>,
    pub frequency: Result<CpuFrequency, SensorError>,
    pub usage: Result<Vec<f32>, SensorError>,
}

impl StubSensor {
    pub fn healthy(temperature: f64) -> Self {
        Self {
            temperature: Ok(temperature),
            frequency: Ok(CpuFrequency {
                current_mhz: 1500.0,
                max_mhz: 1800.0,
            }),
            usage: Ok(vec![2.0, 4.0]),
        }
    }

    pub fn unavailable(sensor: &'static str) -> SensorError {
        SensorError::Unavailable {
            sensor,
            reason: "no such file".to_string(),
        }
    }
}

impl CpuSensor for StubSensor {
    async fn read_temperature(&self) -> Result<f64, SensorError> {
        self.temperature.clone()
    }

    async fn read_frequency(&self) -> Result<CpuFrequency, SensorError> {
        self.frequency.clone()
    }

    async fn read_usage(&self) -> Result<Vec<f32>, SensorError> {
        self.usage.clone()
    }
}
