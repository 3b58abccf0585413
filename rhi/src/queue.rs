//! Command queues: three-phase submission (wait, then execute, then
//! signal, strictly ordered across phases) plus present coordination.

use crate::command::CommandBuffer;
use crate::error::{Error, Result};
use crate::fence::{self, Fence, INFINITE_TIMEOUT};
use crate::object::{Diagnostics, ObjectBase, ObjectType};
use crate::window::Swapchain;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueType {
    Graphics,
    Compute,
    Transfer,
    Present,
}

/// One submission: a GPU-side wait phase, an execute phase, then a
/// GPU-side signal phase. The three phases run in that strict order;
/// entries within a single phase are unordered relative to each other.
pub struct SubmitInfo<'a> {
    pub wait: &'a [(&'a Fence, u64)],
    pub command_buffers: &'a [CommandBuffer],
    pub signal: &'a [(&'a Fence, u64)],
}

/// The per-backend half of a queue.
pub trait QueueBackend: Send + Sync {
    /// Enqueues a GPU-side wait on `(fence, value)` before any further
    /// work on this queue proceeds.
    fn enqueue_wait(&self, fence: &Fence, value: u64) -> Result<()>;
    /// Executes a single recorded command buffer's command stream.
    fn execute(&self, cmd: &CommandBuffer) -> Result<()>;
    /// Enqueues a GPU-side signal of `(fence, value)`.
    fn enqueue_signal(&self, fence: &Fence, value: u64) -> Result<()>;
    /// Blocks until all previously submitted work is visible as complete.
    fn wait_idle(&self) -> Result<()>;
    /// Presents a single swapchain's current image, mapping the native
    /// present status to [`crate::error::Status`].
    fn present_one(&self, swapchain: &Swapchain) -> Result<crate::error::Status>;
}

struct QueueShared {
    base: ObjectBase,
    #[allow(dead_code)]
    diag: Diagnostics,
    ty: QueueType,
    backend: Box<dyn QueueBackend>,
}

#[derive(Clone)]
pub struct Queue(Arc<QueueShared>);

impl Queue {
    pub fn new(diag: Diagnostics, ty: QueueType, backend: Box<dyn QueueBackend>) -> Queue {
        Queue(Arc::new(QueueShared {
            base: ObjectBase::new(ObjectType::Queue),
            diag,
            ty,
            backend,
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.base.id
    }

    pub fn queue_type(&self) -> QueueType {
        self.0.ty
    }

    /// Submits each [`SubmitInfo`] in order. Within each one, every wait is
    /// enqueued before any command buffer executes, and every command
    /// buffer executes before any signal is enqueued.
    pub fn submit(&self, submits: &[SubmitInfo<'_>]) -> Result<()> {
        for submit in submits {
            for (fence, value) in submit.wait {
                self.0.backend.enqueue_wait(fence, *value)?;
            }
            for cmd in submit.command_buffers {
                self.0.backend.execute(cmd)?;
                cmd.mark_pending();
            }
            for (fence, value) in submit.signal {
                self.0.backend.enqueue_signal(fence, *value)?;
            }
        }
        Ok(())
    }

    pub fn wait_idle(&self) -> Result<()> {
        self.0.backend.wait_idle()
    }

    /// Waits on every `wait_fences[i]` reaching `wait_values[i]`, presents
    /// every swapchain in `swapchains`, then enqueues
    /// `min(signal_fences.len(), swapchains.len())` post-present signals.
    /// Returns one status per swapchain, in order; the first backend error
    /// encountered aborts the remaining presents and is returned instead.
    pub fn present(
        &self,
        wait_fences: &[(&Fence, u64)],
        swapchains: &[&Swapchain],
        signal_fences: &[(&Fence, u64)],
    ) -> Result<Vec<crate::error::Status>> {
        if !wait_fences.is_empty() {
            let fences: Vec<&Fence> = wait_fences.iter().map(|(f, _)| *f).collect();
            let values: Vec<u64> = wait_fences.iter().map(|(_, v)| *v).collect();
            let outcome = fence::wait_many(&fences, &values, true, INFINITE_TIMEOUT)?;
            if outcome == fence::WaitOutcome::TimedOut {
                return Err(Error::Timeout);
            }
        }

        let mut results = Vec::with_capacity(swapchains.len());
        for swapchain in swapchains {
            results.push(self.0.backend.present_one(swapchain)?);
            swapchain.bump_present_id();
        }

        let signal_count = signal_fences.len().min(swapchains.len());
        for (fence, value) in &signal_fences[..signal_count] {
            self.0.backend.enqueue_signal(fence, *value)?;
        }

        Ok(results)
    }
}
