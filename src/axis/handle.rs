use super::{AxisState, HomingState};
use crate::error::{AtomicAxisError, AxisError};
use crate::sync::CurrentMeasSignal;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

struct Shared {
    requested_state: AtomicU8,
    current_state: AtomicU8,
    homing_state: AtomicU8,
    loop_counter: AtomicU64,
    thread_valid: AtomicBool,
    error: AtomicAxisError,
}

/// The cross-thread view of an [`Axis`](super::Axis): what the
/// telemetry/property layer reads and writes (§6), and the notification
/// entry point the current-measurement ISR calls. Cheaply `Clone`, and
/// `Send + Sync` so it can be handed to whatever simulates the ISR as well
/// as to a telemetry server running on another thread.
#[derive(Clone)]
pub struct AxisHandle {
    shared: Arc<Shared>,
    signal: CurrentMeasSignal,
}

impl AxisHandle {
    pub(super) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                requested_state: AtomicU8::new(AxisState::Undefined as u8),
                current_state: AtomicU8::new(AxisState::Undefined as u8),
                homing_state: AtomicU8::new(HomingState::Inactive as u8),
                loop_counter: AtomicU64::new(0),
                thread_valid: AtomicBool::new(false),
                error: AtomicAxisError::new(),
            }),
            signal: CurrentMeasSignal::new(),
        }
    }

    /// The only command surface the Axis exposes: all requests arrive as
    /// writes to `requested_state` (§6).
    pub fn request_state(&self, state: AxisState) {
        self.shared
            .requested_state
            .store(state as u8, Ordering::Release);
    }

    pub fn requested_state(&self) -> AxisState {
        AxisState::from_u8(self.shared.requested_state.load(Ordering::Acquire))
    }

    pub fn current_state(&self) -> AxisState {
        AxisState::from_u8(self.shared.current_state.load(Ordering::Acquire))
    }

    pub fn homing_state(&self) -> HomingState {
        HomingState::from_u8(self.shared.homing_state.load(Ordering::Acquire))
    }

    pub fn loop_counter(&self) -> u64 {
        self.shared.loop_counter.load(Ordering::Acquire)
    }

    pub fn error(&self) -> AxisError {
        self.shared.error.load()
    }

    /// Acknowledges the given sticky bits. `INVALID_STATE` clears itself on
    /// the next fresh request regardless; everything else needs this.
    pub fn clear_error(&self, bits: AxisError) {
        self.shared.error.clear(bits);
    }

    pub fn thread_valid(&self) -> bool {
        self.shared.thread_valid.load(Ordering::Acquire)
    }

    /// Called from interrupt/timer context on every current sample. A
    /// no-op while no worker is running for this axis, so a stray signal
    /// after teardown can't leak a wakeup into whatever reuses the mailbox
    /// next (§3: "thread_valid gates ISR signaling").
    pub fn notify_current_meas(&self) {
        if self.thread_valid() {
            self.signal.notify();
        }
    }

    pub(super) fn take_requested_state(&self) -> AxisState {
        AxisState::from_u8(
            self.shared
                .requested_state
                .swap(AxisState::Undefined as u8, Ordering::AcqRel),
        )
    }

    pub(super) fn has_pending_request(&self) -> bool {
        self.shared.requested_state.load(Ordering::Acquire) != AxisState::Undefined as u8
    }

    pub(super) fn set_thread_valid(&self, valid: bool) {
        self.shared.thread_valid.store(valid, Ordering::Release);
    }

    pub(super) fn publish(&self, state: AxisState, homing: HomingState, loop_counter: u64) {
        self.shared.current_state.store(state as u8, Ordering::Release);
        self.shared.homing_state.store(homing as u8, Ordering::Release);
        self.shared.loop_counter.store(loop_counter, Ordering::Release);
    }

    pub(super) fn accumulate_error(&self, bits: AxisError) {
        self.shared.error.accumulate(bits);
    }

    pub(super) fn clear_invalid_state(&self) {
        self.shared.error.clear(AxisError::INVALID_STATE);
    }

    pub(super) fn signal(&self) -> &CurrentMeasSignal {
        &self.signal
    }
}
