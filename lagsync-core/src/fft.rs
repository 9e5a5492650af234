//! Thread-safe FFT wrapper over a shared planning lock (C2).
//!
//! Planning is not thread-safe in `rustfft` and must be serialized; execution
//! is thread-safe and proceeds without the lock. The planning lock is
//! reacquired on drop so plan construction and destruction are both
//! serialized.

use std::sync::{Arc, Mutex, OnceLock};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::LagSyncError;

static PLANNER: OnceLock<Mutex<FftPlanner<f64>>> = OnceLock::new();

fn planner() -> &'static Mutex<FftPlanner<f64>> {
    PLANNER.get_or_init(|| Mutex::new(FftPlanner::new()))
}

/// A forward/inverse complex FFT pair of a fixed length `N`.
pub struct FftWorker {
    forward: Option<Arc<dyn Fft<f64>>>,
    inverse: Option<Arc<dyn Fft<f64>>>,
}

impl FftWorker {
    pub fn new(len: usize) -> Result<Self, LagSyncError> {
        if len == 0 {
            return Err(LagSyncError::FftFailed);
        }
        let mut planner = planner().lock().map_err(|_| LagSyncError::FftFailed)?;
        let forward = planner.plan_fft_forward(len);
        let inverse = planner.plan_fft_inverse(len);
        Ok(FftWorker {
            forward: Some(forward),
            inverse: Some(inverse),
        })
    }

    /// Forward transform, executed without holding the planning lock.
    pub fn forward(&self, buf: &mut [Complex<f64>]) {
        self.forward
            .as_ref()
            .expect("fft worker used after drop")
            .process(buf);
    }

    /// Inverse transform, executed without holding the planning lock.
    pub fn inverse(&self, buf: &mut [Complex<f64>]) {
        self.inverse
            .as_ref()
            .expect("fft worker used after drop")
            .process(buf);
    }
}

impl Drop for FftWorker {
    fn drop(&mut self) {
        let _guard = planner().lock().expect("fft planner lock poisoned");
        self.forward.take();
        self.inverse.take();
    }
}
