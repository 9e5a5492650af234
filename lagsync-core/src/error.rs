//! Error taxonomy for the lag-detection engine and its producer/consumer layer.

use thiserror::Error;

/// Every fallible public operation in this crate returns this type.
#[derive(Debug, Error)]
pub enum LagSyncError {
    #[error("a run is already active")]
    Busy,

    #[error("failed to spawn producer: {0}")]
    ProducerLaunch(String),

    #[error("producer pipe error: {0}")]
    ProducerIo(#[from] std::io::Error),

    #[error("URL resolver yielded no usable URL")]
    ResolveFailed,

    #[error("FFT planner or execution failure")]
    FftFailed,

    #[error("buffer allocation failure")]
    OutOfMemory,

    #[error("correlation window has zero variance or a NaN result")]
    Degenerate,

    #[error("all intervals exhausted with no confident match")]
    NoMatch,

    #[error("run was aborted")]
    Aborted,
}
