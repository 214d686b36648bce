use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{EngineError, EngineResult};
use crate::models::PunchEvent;
use crate::repository::{AttendanceRepository, DirectoryRepository, ScheduleRepository};
use crate::services::ShiftReconciliationEngine;

/// How long one capture run listens for punches.
pub const DEFAULT_CAPTURE_WINDOW: Duration = Duration::from_secs(30);

/// A biometric device that can be connected to.
pub trait BiometricDevice {
    /// The open connection type.
    type Connection: DeviceConnection;

    /// Opens a connection to the device.
    fn connect(&mut self) -> EngineResult<Self::Connection>;
}

/// An open device connection delivering live punch events.
pub trait DeviceConnection {
    /// Waits up to `timeout` for the next punch. `Ok(None)` means nothing
    /// arrived in time.
    fn poll_event(&mut self, timeout: Duration) -> EngineResult<Option<PunchEvent>>;

    /// Releases the connection. Called exactly once per connection.
    fn disconnect(&mut self);
}

/// Disconnects the wrapped connection when dropped.
struct ConnectionGuard<C: DeviceConnection> {
    connection: C,
}

impl<C: DeviceConnection> Deref for ConnectionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.connection
    }
}

impl<C: DeviceConnection> DerefMut for ConnectionGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.connection
    }
}

impl<C: DeviceConnection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        self.connection.disconnect();
        tracing::debug!("Biometric device disconnected");
    }
}

/// Counts of one capture run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    /// Events handed to the sink successfully.
    pub accepted: usize,
    /// Events the sink refused.
    pub rejected: usize,
}

/// Listens on `device` for `window`, handing each punch to `sink`.
///
/// A sink error skips that event. A device error ends the run. Either way the
/// connection is released before this returns.
pub fn capture_window<D, F>(device: &mut D, window: Duration, mut sink: F) -> EngineResult<CaptureSummary>
where
    D: BiometricDevice,
    F: FnMut(PunchEvent) -> EngineResult<()>,
{
    let mut connection = ConnectionGuard {
        connection: device.connect()?,
    };
    tracing::info!(window_secs = window.as_secs_f64(), "Biometric capture started");

    let deadline = Instant::now() + window;
    let mut summary = CaptureSummary::default();

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }

        let event = match connection.poll_event(remaining) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                tracing::error!(error = %e, "Biometric capture aborted");
                return Err(e);
            }
        };

        let device_user_id = event.device_user_id;
        match sink(event) {
            Ok(()) => summary.accepted += 1,
            Err(e) => {
                tracing::warn!(device_user_id, error = %e, "Punch event rejected");
                summary.rejected += 1;
            }
        }
    }

    tracing::info!(
        accepted = summary.accepted,
        rejected = summary.rejected,
        "Biometric capture finished"
    );
    Ok(summary)
}

/// Runs [`capture_window`] on a blocking tokio task.
pub async fn spawn_capture<D, F>(mut device: D, window: Duration, sink: F) -> EngineResult<CaptureSummary>
where
    D: BiometricDevice + Send + 'static,
    F: FnMut(PunchEvent) -> EngineResult<()> + Send + 'static,
{
    tokio::task::spawn_blocking(move || capture_window(&mut device, window, sink))
        .await
        .map_err(|e| EngineError::DeviceError {
            message: format!("capture task failed: {}", e),
        })?
}

/// A sink storing each punch through the reconciliation engine.
pub fn ingest_sink<R>(repo: Arc<R>) -> impl FnMut(PunchEvent) -> EngineResult<()> + Send + 'static
where
    R: DirectoryRepository + ScheduleRepository + AttendanceRepository + Send + Sync + 'static,
{
    move |event| {
        ShiftReconciliationEngine::new(repo.as_ref()).ingest_punch(&event)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BiometricDetail;
    use crate::repository::InMemoryStore;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockDevice {
        script: Vec<EngineResult<Option<PunchEvent>>>,
        refuse_connect: bool,
        disconnects: Arc<AtomicUsize>,
    }

    struct MockConnection {
        script: VecDeque<EngineResult<Option<PunchEvent>>>,
        disconnects: Arc<AtomicUsize>,
    }

    impl BiometricDevice for MockDevice {
        type Connection = MockConnection;

        fn connect(&mut self) -> EngineResult<MockConnection> {
            if self.refuse_connect {
                return Err(EngineError::DeviceError {
                    message: "unreachable".to_string(),
                });
            }
            Ok(MockConnection {
                script: self.script.drain(..).collect(),
                disconnects: Arc::clone(&self.disconnects),
            })
        }
    }

    impl DeviceConnection for MockConnection {
        fn poll_event(&mut self, timeout: Duration) -> EngineResult<Option<PunchEvent>> {
            match self.script.pop_front() {
                Some(next) => next,
                None => {
                    std::thread::sleep(timeout);
                    Ok(None)
                }
            }
        }

        fn disconnect(&mut self) {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn event(device_user_id: i64, code: i32) -> PunchEvent {
        PunchEvent {
            device_user_id,
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 3)
                .unwrap()
                .and_hms_opt(8, 58, 0)
                .unwrap(),
            punch_code: code,
        }
    }

    fn device(script: Vec<EngineResult<Option<PunchEvent>>>) -> (MockDevice, Arc<AtomicUsize>) {
        let disconnects = Arc::new(AtomicUsize::new(0));
        let device = MockDevice {
            script,
            refuse_connect: false,
            disconnects: Arc::clone(&disconnects),
        };
        (device, disconnects)
    }

    #[test]
    fn test_window_elapses_and_disconnects() {
        let (mut device, disconnects) = device(vec![Ok(Some(event(17, 0))), Ok(None), Ok(Some(event(18, 1)))]);
        let mut seen = Vec::new();

        let summary = capture_window(&mut device, Duration::from_millis(20), |e| {
            seen.push(e.device_user_id);
            Ok(())
        })
        .unwrap();

        assert_eq!(summary, CaptureSummary { accepted: 2, rejected: 0 });
        assert_eq!(seen, vec![17, 18]);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_device_error_still_disconnects() {
        let (mut device, disconnects) = device(vec![
            Ok(Some(event(17, 0))),
            Err(EngineError::DeviceError {
                message: "connection reset".to_string(),
            }),
        ]);

        let result = capture_window(&mut device, Duration::from_secs(5), |_| Ok(()));
        assert!(matches!(result, Err(EngineError::DeviceError { .. })));
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sink_errors_skip_event() {
        let (mut device, disconnects) = device(vec![Ok(Some(event(17, 9))), Ok(Some(event(17, 0)))]);

        let summary = capture_window(&mut device, Duration::from_millis(20), |e| {
            crate::models::Punch::from_device_code(e.punch_code).map(|_| ())
        })
        .unwrap();

        assert_eq!(summary, CaptureSummary { accepted: 1, rejected: 1 });
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_connect_never_disconnects() {
        let (mut device, disconnects) = device(Vec::new());
        device.refuse_connect = true;

        assert!(capture_window(&mut device, Duration::from_millis(5), |_| Ok(())).is_err());
        assert_eq!(disconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_spawned_capture_ingests_into_store() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_biometric_detail(BiometricDetail {
            user_id: "u1".to_string(),
            user_id_in_device: 17,
        });
        let (device, disconnects) = device(vec![Ok(Some(event(17, 0))), Ok(Some(event(99, 1)))]);

        let summary = spawn_capture(device, Duration::from_millis(20), ingest_sink(Arc::clone(&store)))
            .await
            .unwrap();

        assert_eq!(summary.accepted, 2);
        assert_eq!(disconnects.load(Ordering::SeqCst), 1);
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(store.attendance_for("u1", day).len(), 1);
        assert_eq!(store.orphan_attendance().len(), 1);
    }
}
