//! The device: bound 1-to-1 to a physical adapter and a backend choice,
//! owning the allocation/debug hooks and the per-type queue set.

use crate::adapter::AdapterDesc;
use crate::error::Result;
use crate::fence::{Fence, FenceBackend};
use crate::object::{AllocationCallbacks, DebugCallback, Diagnostics, ObjectBase, ObjectType};
use crate::pipeline::{ComputePipelineDesc, GraphicsPipelineDesc, Pipeline, PipelineBackend, PipelineLayout, PipelineLayoutDesc};
use crate::pool::{CommandPool, CommandPoolBackend, CommandPoolDesc};
use crate::queue::{Queue, QueueType};
use crate::texture::{Texture, TextureBackend, TextureDesc};
use crate::window::{Swapchain, SwapchainBackend, SwapchainDesc};
use std::sync::Arc;

/// Which native graphics API a device was created against. Carried for
/// diagnostics and for the rare call site that needs to branch on it
/// (there is no core-level dispatch on this tag; the application chooses a
/// backend at compile/link time by depending on that backend's crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    D3D11,
    Empty,
}

#[derive(Clone, Copy, Debug)]
pub struct QueueRequest {
    pub queue_type: QueueType,
    pub count: u32,
}

pub struct DeviceDesc<'a> {
    pub adapter: &'a AdapterDesc,
    pub queues: &'a [QueueRequest],
    pub enable_api_validation: bool,
    pub debug_callback: Option<Arc<dyn DebugCallback>>,
    pub allocation_callback: Option<Arc<dyn AllocationCallbacks>>,
}

/// The per-backend half of a device: creation of every subordinate object
/// type goes through this trait.
pub trait DeviceBackend: Send + Sync {
    fn create_fence(&self, initial_value: u64) -> Result<Box<dyn FenceBackend>>;
    fn create_command_pool(&self, desc: &CommandPoolDesc) -> Result<Box<dyn CommandPoolBackend>>;
    fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> Result<()>;
    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_>) -> Result<Box<dyn PipelineBackend>>;
    fn create_compute_pipeline(&self, desc: &ComputePipelineDesc<'_>) -> Result<Box<dyn PipelineBackend>>;
    fn create_texture(&self, desc: &TextureDesc) -> Result<Box<dyn TextureBackend>>;
    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<Box<dyn SwapchainBackend>>;

    #[allow(unused_variables)]
    fn as_any(&self) -> &dyn std::any::Any;
}

struct DeviceShared {
    base: ObjectBase,
    diag: Diagnostics,
    kind: BackendKind,
    adapter: AdapterDesc,
    backend: Box<dyn DeviceBackend>,
    queues: Vec<(QueueType, Vec<Queue>)>,
}

/// A device handle: every subordinate object is created through this.
/// Backed by a reference count, not an explicit `destroy` call — the
/// backend's native resources are released when the last clone drops.
#[derive(Clone)]
pub struct Device(Arc<DeviceShared>);

impl Device {
    /// Backend crates call this once they have finished native device
    /// creation, validation-layer setup, and per-type queue construction;
    /// it is the seam between a backend's own `create_device` entry point
    /// and the backend-agnostic core.
    pub fn from_parts(
        diag: Diagnostics,
        kind: BackendKind,
        adapter: AdapterDesc,
        backend: Box<dyn DeviceBackend>,
        queues: Vec<(QueueType, Vec<Queue>)>,
    ) -> Device {
        Device(Arc::new(DeviceShared {
            base: ObjectBase::new(ObjectType::Device),
            diag,
            kind,
            adapter,
            backend,
            queues,
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.base.id
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.0.kind
    }

    pub fn adapter(&self) -> &AdapterDesc {
        &self.0.adapter
    }

    /// Returns the `index`-th queue of the given type, if that many were
    /// requested at creation time.
    pub fn queue(&self, ty: QueueType, index: usize) -> Option<Queue> {
        self.0
            .queues
            .iter()
            .find(|(t, _)| *t == ty)
            .and_then(|(_, qs)| qs.get(index).cloned())
    }

    pub fn create_fence(&self, initial_value: u64) -> Result<Fence> {
        let backend = self.0.backend.create_fence(initial_value)?;
        Ok(Fence::new(self.0.diag.clone(), backend))
    }

    pub fn create_command_pool(&self, desc: CommandPoolDesc) -> Result<CommandPool> {
        let backend = self.0.backend.create_command_pool(&desc)?;
        Ok(CommandPool::new(self.0.diag.clone(), desc, backend))
    }

    pub fn create_pipeline_layout(&self, desc: &PipelineLayoutDesc) -> Result<PipelineLayout> {
        self.0.backend.create_pipeline_layout(desc)?;
        Ok(PipelineLayout::new())
    }

    pub fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_>) -> Result<Pipeline> {
        let backend = self.0.backend.create_graphics_pipeline(desc)?;
        Ok(Pipeline::new(self.0.diag.clone(), backend))
    }

    pub fn create_compute_pipeline(&self, desc: &ComputePipelineDesc<'_>) -> Result<Pipeline> {
        let backend = self.0.backend.create_compute_pipeline(desc)?;
        Ok(Pipeline::new(self.0.diag.clone(), backend))
    }

    pub fn create_texture(&self, desc: TextureDesc) -> Result<Texture> {
        let backend = self.0.backend.create_texture(&desc)?;
        Ok(Texture::new(self.0.diag.clone(), desc, backend))
    }

    pub fn create_swapchain(&self, desc: SwapchainDesc) -> Result<Swapchain> {
        let backend = self.0.backend.create_swapchain(&desc)?;
        Ok(Swapchain::new(self.0.diag.clone(), desc, backend))
    }
}

// `PipelineLayout` is re-exported from `pipeline`; this inherent
// constructor lives here because only `Device::create_pipeline_layout`
// needs to build one.
impl PipelineLayout {
    fn new() -> PipelineLayout {
        PipelineLayout::from_object(ObjectBase::new(ObjectType::PipelineLayout))
    }
}
