//! Platform abstraction traits for listkit runtime services.
//!
//! These traits let the data core delegate scheduling and device queries
//! to the host platform, so the same manager runs under a UI event loop,
//! a test harness, or a headless driver.

/// Schedules work for the listkit runtime.
///
/// Implementations are responsible for arranging a call to
/// [`RuntimeHandle::drain_deferred`](crate::RuntimeHandle::drain_deferred)
/// once the current synchronous unit of work has finished. The turn must not
/// run from inside `schedule_turn` itself: callers may still hold state
/// borrowed while they queue work.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host run a new turn of deferred work.
    fn schedule_turn(&self);
}

/// Reports display properties used for unit conversion.
///
/// This is the "platform width query" capability: hosts that know the
/// logical window width (mini-program runtimes, embedded webviews) provide
/// it here. Returning `None` means the platform cannot answer.
pub trait DisplayMetrics {
    /// Width of the window in logical units.
    fn window_width(&self) -> Option<f32>;
}

/// Fixed display metrics, mostly useful in tests and headless hosts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticDisplayMetrics {
    pub window_width: Option<f32>,
}

impl StaticDisplayMetrics {
    pub fn new(window_width: f32) -> Self {
        Self {
            window_width: Some(window_width),
        }
    }

    /// Metrics for a platform that cannot report its width.
    pub fn unknown() -> Self {
        Self { window_width: None }
    }
}

impl DisplayMetrics for StaticDisplayMetrics {
    fn window_width(&self) -> Option<f32> {
        self.window_width
    }
}
