//! Cross-thread primitives shared between the ISR-simulating signal source,
//! the axis worker thread and the telemetry layer.
//!
//! Naming follows the one-way atomic cell convention the hardware layer uses
//! for values that flow from one thread to another (`OnewayAtomicF64Write` /
//! `OnewayAtomicF64Read`): a write handle paired with cheaply cloneable read
//! handles, all backed by a single atomic so there is never a torn value.
//! `SharedF64` below generalizes that pattern to the two-way case (both the
//! worker and the step ISR mutate `pos_setpoint`), which the one-way split
//! can't express.

use atomic_float::AtomicF64;
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// A value written by exactly one side and read by one or more others, with
/// no torn reads and no lost updates.
#[derive(Debug)]
pub struct OnewayAtomicF64Write(Arc<AtomicF64>);

#[derive(Debug, Clone)]
pub struct OnewayAtomicF64Read(Arc<AtomicF64>);

impl OnewayAtomicF64Write {
    pub fn new(initial: f64) -> Self {
        Self(Arc::new(AtomicF64::new(initial)))
    }

    pub fn get_read(&self) -> OnewayAtomicF64Read {
        OnewayAtomicF64Read(self.0.clone())
    }

    pub fn write(&self, v: f64) {
        self.0.store(v, Ordering::Release);
    }
}

impl OnewayAtomicF64Read {
    pub fn read(&self) -> f64 {
        self.0.load(Ordering::Acquire)
    }
}

/// A value mutated from more than one side. Used for `controller.pos_setpoint`,
/// which is both read-modify-written by the step ISR and overwritten by the
/// worker thread when switching control modes.
#[derive(Debug, Clone)]
pub struct SharedF64(Arc<AtomicF64>);

impl SharedF64 {
    pub fn new(initial: f64) -> Self {
        Self(Arc::new(AtomicF64::new(initial)))
    }

    pub fn load(&self) -> f64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn store(&self, v: f64) {
        self.0.store(v, Ordering::Release);
    }

    /// Atomically increments the value and returns the new value. This is
    /// the operation the step-edge handler performs; it must never lose an
    /// update even if it races with a `store` from the worker thread.
    pub fn fetch_add(&self, delta: f64) -> f64 {
        // AtomicF64 has no native fetch_add on all targets, so retry a CAS
        // loop instead of assuming one. Either way, the contract ("no torn
        // value, no lost update") holds.
        let mut cur = self.0.load(Ordering::Acquire);
        loop {
            let new = cur + delta;
            match self
                .0
                .compare_exchange_weak(cur, new, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return new,
                Err(observed) => cur = observed,
            }
        }
    }
}

/// The ISR-to-worker current-measurement signal: a capacity-one, lossy
/// mailbox. If a notification arrives while the worker isn't waiting, the
/// next `wait` call returns immediately exactly once; further notifications
/// while the mailbox is already full are dropped, matching "at most one
/// pending wakeup" from the design notes.
#[derive(Debug, Clone)]
pub struct CurrentMeasSignal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl CurrentMeasSignal {
    pub fn new() -> Self {
        let (tx, rx) = channel::bounded(1);
        Self { tx, rx }
    }

    /// Called from interrupt/timer context. Never blocks.
    pub fn notify(&self) {
        let _ = self.tx.try_send(());
    }

    /// Called from the worker thread. Returns `true` if a notification was
    /// received before `timeout` elapsed, `false` on timeout.
    pub fn wait(&self, timeout: Duration) -> bool {
        self.rx.recv_timeout(timeout).is_ok()
    }
}

impl Default for CurrentMeasSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_f64_fetch_add_accumulates() {
        let v = SharedF64::new(10.0);
        assert_eq!(v.fetch_add(2.5), 12.5);
        assert_eq!(v.fetch_add(-5.0), 7.5);
        assert_eq!(v.load(), 7.5);
    }

    #[test]
    fn oneway_read_sees_writes() {
        let w = OnewayAtomicF64Write::new(1.0);
        let r = w.get_read();
        assert_eq!(r.read(), 1.0);
        w.write(42.0);
        assert_eq!(r.read(), 42.0);
    }

    #[test]
    fn signal_is_lossy_and_latches_one_pending_wakeup() {
        let sig = CurrentMeasSignal::new();
        sig.notify();
        sig.notify(); // dropped, mailbox already full
        assert!(sig.wait(Duration::from_millis(10)));
        assert!(!sig.wait(Duration::from_millis(10)));
    }
}
