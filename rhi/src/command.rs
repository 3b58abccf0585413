//! Command buffers: recorded, finalizable streams of GPU commands, and the
//! four-state lifecycle every backend must honor.

use crate::error::{Error, Result};
use crate::object::{Diagnostics, ObjectBase, ObjectType};
use crate::pipeline::Pipeline;
use std::sync::{Arc, Mutex};

/// The command buffer lifecycle. `Initial` is the state right after
/// allocation; the only legal ways out are documented on
/// [`CommandBuffer::begin`], [`CommandBuffer::end`], and
/// [`CommandBuffer::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandBufferState {
    Initial,
    Recording,
    Executable,
    Pending,
}

/// The per-backend half of a command buffer: whatever actually records and
/// finalizes a native command stream (a deferred `ID3D11DeviceContext` for
/// the Direct3D 11 backend).
pub trait CommandBufferBackend: Send + Sync {
    fn begin(&self) -> Result<()>;
    /// Finalizes the recorded stream (e.g. `FinishCommandList`).
    fn end(&self) -> Result<()>;
    /// Releases whatever was recorded; always legal, matching the
    /// original's unconditional reset.
    fn reset(&self) -> Result<()>;

    fn as_any(&self) -> &dyn std::any::Any;
}

struct Inner {
    state: CommandBufferState,
    bound_pipeline: Option<Pipeline>,
}

struct CommandBufferShared {
    base: ObjectBase,
    diag: Diagnostics,
    backend: Box<dyn CommandBufferBackend>,
    inner: Mutex<Inner>,
}

/// A command buffer handle. Cloning shares the same underlying recording
/// stream and lifecycle state — exactly one thread should drive a given
/// buffer between `begin` and `end` at a time; concurrent misuse is caught
/// by the internal lock rather than left as undefined behavior.
#[derive(Clone)]
pub struct CommandBuffer(Arc<CommandBufferShared>);

impl CommandBuffer {
    pub fn new(diag: Diagnostics, backend: Box<dyn CommandBufferBackend>) -> CommandBuffer {
        CommandBuffer(Arc::new(CommandBufferShared {
            base: ObjectBase::new(ObjectType::CommandBuffer),
            diag,
            backend,
            inner: Mutex::new(Inner {
                state: CommandBufferState::Initial,
                bound_pipeline: None,
            }),
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.base.id
    }

    pub fn state(&self) -> CommandBufferState {
        self.0.inner.lock().unwrap().state
    }

    pub fn backend(&self) -> &dyn CommandBufferBackend {
        self.0.backend.as_ref()
    }

    /// Begins recording. Legal from `Initial` or `Executable` (an implicit
    /// reset of the previously recorded stream, including the pipeline
    /// state cache used by the redundant-bind filter); any other starting
    /// state is `InvalidApiUsage` and leaves the buffer untouched.
    pub fn begin(&self) -> Result<()> {
        let mut inner = self.0.inner.lock().unwrap();
        match inner.state {
            CommandBufferState::Initial | CommandBufferState::Executable => {
                self.0.backend.begin()?;
                inner.state = CommandBufferState::Recording;
                inner.bound_pipeline = None;
                Ok(())
            }
            other => {
                self.0.diag.message(
                    crate::object::MessageSeverity::Error,
                    format!("begin() called on a command buffer in state {:?}", other),
                );
                Err(Error::InvalidApiUsage(format!(
                    "begin() requires Initial or Executable, found {:?}",
                    other
                )))
            }
        }
    }

    /// Finalizes the recorded stream. Legal only from `Recording`.
    pub fn end(&self) -> Result<()> {
        let mut inner = self.0.inner.lock().unwrap();
        match inner.state {
            CommandBufferState::Recording => {
                self.0.backend.end()?;
                inner.state = CommandBufferState::Executable;
                Ok(())
            }
            other => Err(Error::InvalidApiUsage(format!(
                "end() requires Recording, found {:?}",
                other
            ))),
        }
    }

    /// Releases whatever was recorded and returns to `Initial`. Always
    /// legal, including when already `Initial` (idempotent no-op beyond
    /// the backend call).
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.0.inner.lock().unwrap();
        self.0.backend.reset()?;
        inner.state = CommandBufferState::Initial;
        inner.bound_pipeline = None;
        Ok(())
    }

    /// Marks the buffer as submitted. Advisory bookkeeping only — the core
    /// does not itself track queue completion for a command buffer; callers
    /// rely on fences for that.
    pub(crate) fn mark_pending(&self) {
        let mut inner = self.0.inner.lock().unwrap();
        if inner.state == CommandBufferState::Executable {
            inner.state = CommandBufferState::Pending;
        }
    }

    pub(crate) fn require_recording(&self) -> Result<()> {
        let inner = self.0.inner.lock().unwrap();
        if inner.state != CommandBufferState::Recording {
            return Err(Error::InvalidApiUsage(format!(
                "operation requires Recording, found {:?}",
                inner.state
            )));
        }
        Ok(())
    }

    pub(crate) fn bound_pipeline(&self) -> Option<Pipeline> {
        self.0.inner.lock().unwrap().bound_pipeline.clone()
    }

    pub(crate) fn set_bound_pipeline(&self, pipeline: Pipeline) {
        self.0.inner.lock().unwrap().bound_pipeline = Some(pipeline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestBackend {
        begin_calls: AtomicUsize,
        end_calls: AtomicUsize,
        reset_calls: AtomicUsize,
    }

    impl CommandBufferBackend for TestBackend {
        fn begin(&self) -> Result<()> {
            self.begin_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn end(&self) -> Result<()> {
            self.end_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn reset(&self) -> Result<()> {
            self.reset_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn backend() -> Box<TestBackend> {
        Box::new(TestBackend {
            begin_calls: AtomicUsize::new(0),
            end_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn end_before_begin_is_invalid_usage() {
        let cmd = CommandBuffer::new(Diagnostics::default(), backend());
        assert!(matches!(cmd.end(), Err(Error::InvalidApiUsage(_))));
        assert_eq!(cmd.state(), CommandBufferState::Initial);
    }

    #[test]
    fn begin_then_begin_again_without_end_is_invalid_usage() {
        let cmd = CommandBuffer::new(Diagnostics::default(), backend());
        cmd.begin().unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Recording);
        assert!(matches!(cmd.begin(), Err(Error::InvalidApiUsage(_))));
    }

    #[test]
    fn full_lifecycle_then_implicit_reset_on_rebegin() {
        let cmd = CommandBuffer::new(Diagnostics::default(), backend());
        cmd.begin().unwrap();
        cmd.end().unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Executable);
        cmd.begin().unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Recording);
    }

    #[test]
    fn reset_is_idempotent_from_initial() {
        let cmd = CommandBuffer::new(Diagnostics::default(), backend());
        cmd.reset().unwrap();
        assert_eq!(cmd.state(), CommandBufferState::Initial);
    }
}
