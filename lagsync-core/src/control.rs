//! Control Surface (C7): process-wide status with atomic observation and
//! broadcast signaling.
//!
//! State plus two condition variables (`interval_done`, `read_continue`)
//! live behind an explicit `Arc<Control>` handle rather than ambient
//! globals, threaded through the controller and both producers. A single
//! process-wide instance is still reachable via [`global`] for the
//! host-facing `pause`/`resume`/`abort`/`status` operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock};

/// The four states a run can be in; `Idle` outside of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Running,
    Paused,
    Aborting,
}

impl ControlState {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlState::Idle => "idle",
            ControlState::Running => "running",
            ControlState::Paused => "paused",
            ControlState::Aborting => "aborting",
        }
    }
}

/// One lock guards the state plus two condition variables: `interval_done`
/// (signaled by producers, awaited by the controller) and `read_continue`
/// (signaled by `resume`/`abort`, awaited by paused producers).
pub struct Control {
    state: Mutex<ControlState>,
    interval_done: Condvar,
    read_continue: Condvar,
    debug: AtomicBool,
}

impl Control {
    pub fn new() -> Arc<Self> {
        Arc::new(Control {
            state: Mutex::new(ControlState::Idle),
            interval_done: Condvar::new(),
            read_continue: Condvar::new(),
            debug: AtomicBool::new(false),
        })
    }

    pub fn status(&self) -> ControlState {
        *self.state.lock().expect("control lock poisoned")
    }

    pub fn set_debug(&self, on: bool) {
        self.debug.store(on, Ordering::SeqCst);
    }

    pub fn get_debug(&self) -> bool {
        self.debug.load(Ordering::SeqCst)
    }

    /// Transition `Idle -> Running`; fails if a run is already active. This
    /// is the non-reentrancy enforcement for `run()`: the check and the set
    /// happen under the same lock, so it is equivalent in effect to a
    /// compare-and-swap on the state.
    pub fn try_start(&self) -> bool {
        let mut state = self.state.lock().expect("control lock poisoned");
        if *state != ControlState::Idle {
            return false;
        }
        *state = ControlState::Running;
        true
    }

    /// Reset to `Idle`. Called exactly once per run, on every exit path.
    pub fn finish(&self) {
        *self.state.lock().expect("control lock poisoned") = ControlState::Idle;
    }

    pub fn pause(&self) {
        let mut state = self.state.lock().expect("control lock poisoned");
        if *state == ControlState::Running {
            *state = ControlState::Paused;
        }
    }

    pub fn resume(&self) {
        let mut state = self.state.lock().expect("control lock poisoned");
        if *state == ControlState::Paused {
            *state = ControlState::Running;
            self.read_continue.notify_all();
        }
    }

    pub fn abort(&self) {
        let mut state = self.state.lock().expect("control lock poisoned");
        *state = ControlState::Aborting;
        self.interval_done.notify_all();
        self.read_continue.notify_all();
    }

    /// Called by a producer after crossing an interval checkpoint.
    pub fn signal_interval_done(&self) {
        let _state = self.state.lock().expect("control lock poisoned");
        self.interval_done.notify_all();
    }

    /// Block a paused producer until the state leaves `Paused`; returns the
    /// state observed on wakeup (`Running` or `Aborting`).
    pub fn wait_while_paused(&self) -> ControlState {
        let guard = self.state.lock().expect("control lock poisoned");
        let guard = self
            .read_continue
            .wait_while(guard, |s| *s == ControlState::Paused)
            .expect("control lock poisoned");
        *guard
    }

    /// Block the controller until `predicate` holds or the state becomes
    /// `Aborting`. The predicate is re-checked under the lock on every
    /// wakeup, so no spurious wakeup can leak past it.
    pub fn wait_for_intervals<F>(&self, mut predicate: F) -> ControlState
    where
        F: FnMut() -> bool,
    {
        let guard = self.state.lock().expect("control lock poisoned");
        let guard = self
            .interval_done
            .wait_while(guard, |s| *s != ControlState::Aborting && !predicate())
            .expect("control lock poisoned");
        *guard
    }
}

static GLOBAL: OnceLock<Arc<Control>> = OnceLock::new();

/// The single process-wide `Control` instance backing the host-facing
/// `pause`/`resume`/`abort`/`status` operations.
pub fn global() -> Arc<Control> {
    GLOBAL.get_or_init(Control::new).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn try_start_is_non_reentrant() {
        let control = Control::new();
        assert!(control.try_start());
        assert!(!control.try_start());
        control.finish();
        assert!(control.try_start());
    }

    #[test]
    fn abort_wakes_waiting_controller() {
        let control = Control::new();
        control.try_start();
        let waiter = control.clone();
        let handle = thread::spawn(move || waiter.wait_for_intervals(|| false));
        thread::sleep(Duration::from_millis(20));
        control.abort();
        assert_eq!(handle.join().unwrap(), ControlState::Aborting);
    }

    #[test]
    fn pause_then_resume_wakes_producer() {
        let control = Control::new();
        control.try_start();
        control.pause();
        let waiter = control.clone();
        let handle = thread::spawn(move || waiter.wait_while_paused());
        thread::sleep(Duration::from_millis(20));
        control.resume();
        assert_eq!(handle.join().unwrap(), ControlState::Running);
    }
}
