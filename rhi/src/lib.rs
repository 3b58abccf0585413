//! A thin, backend-agnostic rendering hardware interface.
//!
//! The crate is organized the way a native driver's own public surface
//! would be: adapters are discovered before a device exists, a device owns
//! queues and is the factory for every other object, synchronization
//! happens exclusively through timeline fences, and command recording is a
//! strict state machine. See each module's docs for the corresponding
//! contract; [`DESIGN.md`](https://github.com/viktorfejes/vri) in the
//! repository root records where each piece is grounded.
//!
//! Exactly one backend crate (for example `rhi-backend-d3d11`) is linked
//! per build; this crate defines the contract every backend implements,
//! not the backends themselves.

pub mod adapter;
pub mod command;
pub mod device;
pub mod error;
pub mod fence;
pub mod format;
pub mod object;
pub mod pipeline;
pub mod pool;
pub mod queue;
pub mod shader;
pub mod texture;
pub mod window;

pub use adapter::{enumerate_adapters, AdapterDesc, AdapterSource, GpuType, GpuVendor};
pub use command::{CommandBuffer, CommandBufferBackend, CommandBufferState};
pub use device::{BackendKind, Device, DeviceBackend, DeviceDesc, QueueRequest};
pub use error::{Error, Result, Status};
pub use fence::{wait_many, Fence, FenceBackend, WaitOutcome, INFINITE_TIMEOUT};
pub use format::{ColorSpace, Format};
pub use object::{report_live_objects, DebugCallback, Diagnostics, MessageSeverity, ObjectType};
pub use pipeline::{
    bind_pipeline, BlendStateDesc, ComputePipelineDesc, CullMode, DepthStencilStateDesc, FillMode,
    FrontFace, GraphicsPipelineDesc, InputAssemblyStateDesc, Pipeline, PipelineBackend,
    PipelineLayout, PipelineLayoutDesc, PipelineSlot, PrimitiveTopology, RasterizationStateDesc,
};
pub use pool::{CommandPool, CommandPoolBackend, CommandPoolCreateFlags, CommandPoolDesc};
pub use queue::{Queue, QueueBackend, QueueType, SubmitInfo};
pub use shader::{ShaderModuleDesc, ShaderStage};
pub use texture::{MemoryType, Texture, TextureBackend, TextureDesc, TextureKind, TextureUsage};
pub use window::{Swapchain, SwapchainBackend, SwapchainDesc, SwapchainFlags};
