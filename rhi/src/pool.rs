//! Command pools: a lightweight per-queue-type factory for command
//! buffers. On backends with no native pool concept (the Direct3D 11
//! backend included) the pool is a bookkeeping stub; `reset` is then a
//! documented no-op rather than an error.

use crate::error::Result;
use crate::object::{Diagnostics, ObjectBase, ObjectType};
use crate::queue::QueueType;
use std::sync::Arc;

bitflags::bitflags! {
    /// Mirrors the original's pool creation flags.
    pub struct CommandPoolCreateFlags: u32 {
        /// Buffers allocated from this pool are short-lived; backends may
        /// use this as an allocation-strategy hint.
        const TRANSIENT = 0x1;
        /// Individual buffers from this pool may be reset independently
        /// rather than only in bulk via `CommandPool::reset`.
        const RESET_INDIVIDUAL = 0x2;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommandPoolDesc {
    pub queue_type: QueueType,
    pub flags: CommandPoolCreateFlags,
}

impl Default for CommandPoolDesc {
    fn default() -> Self {
        CommandPoolDesc {
            queue_type: QueueType::Graphics,
            flags: CommandPoolCreateFlags::empty(),
        }
    }
}

/// The per-backend half of a command pool. Backends with nothing to do
/// (Direct3D 11) implement this with empty bodies.
pub trait CommandPoolBackend: Send + Sync {
    fn reset(&self) -> Result<()>;
    fn allocate(&self) -> Result<Box<dyn crate::command::CommandBufferBackend>>;
}

struct CommandPoolShared {
    base: ObjectBase,
    diag: Diagnostics,
    desc: CommandPoolDesc,
    backend: Box<dyn CommandPoolBackend>,
}

#[derive(Clone)]
pub struct CommandPool(Arc<CommandPoolShared>);

impl CommandPool {
    pub fn new(diag: Diagnostics, desc: CommandPoolDesc, backend: Box<dyn CommandPoolBackend>) -> CommandPool {
        CommandPool(Arc::new(CommandPoolShared {
            base: ObjectBase::new(ObjectType::CommandPool),
            diag,
            desc,
            backend,
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.base.id
    }

    pub fn desc(&self) -> &CommandPoolDesc {
        &self.0.desc
    }

    /// Releases every allocation owned by this pool. Callers are
    /// responsible for ensuring no command buffer allocated from this pool
    /// is still `Pending` on a queue — the core does not track
    /// buffer-to-pool ownership tightly enough to enforce this itself (see
    /// the Open Question recorded in `DESIGN.md`).
    pub fn reset(&self) -> Result<()> {
        self.0.backend.reset()
    }

    /// Allocates a new command buffer from this pool, in the `Initial`
    /// state.
    pub fn allocate(&self) -> Result<crate::command::CommandBuffer> {
        let backend = self.0.backend.allocate()?;
        Ok(crate::command::CommandBuffer::new(self.0.diag.clone(), backend))
    }
}
