//! The timeline fence: the single synchronization primitive the core
//! exposes. A monotonically increasing 64-bit counter unifies binary and
//! counter fences; backends with only binary native primitives emulate the
//! counter (see the `rhi-backend-d3d11` crate for the native case, where
//! `ID3D11Fence` already is a 64-bit timeline).

use crate::error::{Error, Result};
use crate::object::{Diagnostics, MessageSeverity, ObjectBase, ObjectType};
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Distinguishes a completed wait from one that ran out of time; kept
/// distinct from `Error` because a timeout is an expected, non-exceptional
/// outcome callers branch on routinely (frame pacing, polling loops).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Signaled,
    TimedOut,
}

/// Passed to `Fence::wait_many` in place of `Duration::MAX`; mirrors the
/// original ABI's `UINT64_MAX`-nanoseconds convention for "wait forever".
pub const INFINITE_TIMEOUT: Duration = Duration::from_secs(u64::MAX / 1_000_000_000);

/// The per-backend half of a fence: whatever native object actually tracks
/// the monotonic counter (an `ID3D11Fence`, an in-memory counter for the
/// mock backend, ...).
pub trait FenceBackend: Send + Sync {
    fn get_completed_value(&self) -> Result<u64>;

    /// Host-side signal. Used directly by backends with no native GPU
    /// timeline (the mock backend) and by the CPU-visible completion path
    /// of backends that do have one.
    fn signal_cpu(&self, value: u64) -> Result<()>;

    /// Gives same-backend code (queue submission, present) a way to reach
    /// the concrete backend object to enqueue a GPU-side wait/signal. Core
    /// code never downcasts this itself.
    fn as_any(&self) -> &dyn Any;
}

struct FenceShared {
    base: ObjectBase,
    diag: Diagnostics,
    backend: Box<dyn FenceBackend>,
}

/// A timeline fence handle. Cheap to clone; every clone refers to the same
/// underlying counter.
#[derive(Clone)]
pub struct Fence(Arc<FenceShared>);

impl Fence {
    pub fn new(diag: Diagnostics, backend: Box<dyn FenceBackend>) -> Fence {
        Fence(Arc::new(FenceShared {
            base: ObjectBase::new(ObjectType::Fence),
            diag,
            backend,
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.base.id
    }

    pub fn backend(&self) -> &dyn FenceBackend {
        self.0.backend.as_ref()
    }

    /// Reads the last completed value. No ordering guarantee with a
    /// concurrent signal beyond monotonicity.
    pub fn get_value(&self) -> Result<u64> {
        self.0.backend.get_completed_value()
    }

    /// Host-side signal. `value` must be strictly greater than the
    /// currently completed value; violating this is a caller bug and
    /// returns `InvalidApiUsage` rather than silently clamping.
    pub fn signal(&self, value: u64) -> Result<()> {
        let current = self.0.backend.get_completed_value()?;
        if value <= current {
            self.0.diag.message(
                MessageSeverity::Error,
                format!(
                    "fence signal value {} did not strictly increase past {}",
                    value, current
                ),
            );
            return Err(Error::InvalidApiUsage(
                "timeline signal value must strictly increase".into(),
            ));
        }
        self.0.backend.signal_cpu(value)
    }
}

/// Blocks the calling thread until either the wait condition over
/// `(fence, value)` pairs is satisfied or `timeout` elapses.
///
/// With `wait_all = true`, every fence must reach its target value. With
/// `wait_all = false`, it is enough for any single one to. Implemented as a
/// portable short-interval poll so it works uniformly across backends that
/// do not expose a native "wait on N heterogeneous objects" primitive; a
/// backend may still supply faster native completion notification through
/// its own `FenceBackend` impl, but the fan-in policy itself is a core
/// concern and lives here once.
pub fn wait_many(
    fences: &[&Fence],
    values: &[u64],
    wait_all: bool,
    timeout: Duration,
) -> Result<WaitOutcome> {
    assert_eq!(fences.len(), values.len());
    if fences.is_empty() {
        return Ok(WaitOutcome::Signaled);
    }

    const POLL_INTERVAL: Duration = Duration::from_micros(200);
    let deadline = Instant::now().checked_add(timeout);

    loop {
        let mut satisfied = wait_all;
        for (fence, &target) in fences.iter().zip(values.iter()) {
            let reached = fence.get_value()? >= target;
            if wait_all {
                satisfied &= reached;
            } else if reached {
                return Ok(WaitOutcome::Signaled);
            }
        }
        if wait_all && satisfied {
            return Ok(WaitOutcome::Signaled);
        }

        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Ok(WaitOutcome::TimedOut);
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
        } else {
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct TestFenceBackend(AtomicU64);

    impl FenceBackend for TestFenceBackend {
        fn get_completed_value(&self) -> Result<u64> {
            Ok(self.0.load(Ordering::SeqCst))
        }
        fn signal_cpu(&self, value: u64) -> Result<()> {
            self.0.store(value, Ordering::SeqCst);
            Ok(())
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn wait_times_out_then_succeeds_after_signal() {
        let f = Fence::new(Diagnostics::default(), Box::new(TestFenceBackend(AtomicU64::new(0))));
        let outcome = wait_many(&[&f], &[5], true, Duration::from_millis(10)).unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);

        f.signal(5).unwrap();
        let outcome = wait_many(&[&f], &[5], true, INFINITE_TIMEOUT).unwrap();
        assert_eq!(outcome, WaitOutcome::Signaled);
    }

    #[test]
    fn non_increasing_signal_is_invalid_usage() {
        let f = Fence::new(Diagnostics::default(), Box::new(TestFenceBackend(AtomicU64::new(3))));
        assert!(matches!(f.signal(3), Err(Error::InvalidApiUsage(_))));
        assert!(matches!(f.signal(2), Err(Error::InvalidApiUsage(_))));
    }
}
