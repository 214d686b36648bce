//! Biometric device polling.
//!
//! The device is an explicit handle passed into a capture run. Each run opens
//! one connection, drains punch events for a bounded window and releases the
//! connection on every exit path. Retries are the caller's concern: a failed
//! run is simply scheduled again.

mod capture;

pub use capture::{
    BiometricDevice, CaptureSummary, DEFAULT_CAPTURE_WINDOW, DeviceConnection, capture_window,
    ingest_sink, spawn_capture,
};
