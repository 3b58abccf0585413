//! In-memory mock backend: every object is bookkeeping only, no native
//! graphics API is touched. Unlike `gfx-backend-empty`'s `unimplemented!()`
//! stand-ins, every method here actually does something, because this
//! crate is what the core crate's own test suite and doctests run against.

use rhi::{
    AdapterDesc, AdapterSource, CommandBufferBackend, CommandPoolBackend, CommandPoolDesc,
    ComputePipelineDesc, Device, DeviceBackend, DeviceDesc, Fence, GpuType, GpuVendor,
    GraphicsPipelineDesc, PipelineBackend, PipelineLayoutDesc, PipelineSlot, QueueBackend,
    QueueType, Result, Status, Swapchain, SwapchainBackend, SwapchainDesc, Texture, TextureBackend,
    TextureDesc,
};
use rhi::object::Diagnostics;
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A single, fixed "adapter" every run of this backend reports — there is
/// no real hardware to discover.
pub struct MockAdapterSource;

impl AdapterSource for MockAdapterSource {
    fn enumerate(&self, max_count: usize) -> Result<Vec<AdapterDesc>> {
        if max_count == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![AdapterDesc {
            luid: 1,
            device_id: 0,
            vendor: GpuVendor::Unknown,
            gpu_type: GpuType::Unknown,
            dedicated_video_memory: 0,
            shared_system_memory: 0,
            name: "Mock Adapter".into(),
        }])
    }
}

pub fn enumerate_adapters(max_count: usize) -> Result<Vec<AdapterDesc>> {
    rhi::enumerate_adapters(&MockAdapterSource, max_count)
}

/// A host-memory timeline counter; `get_completed_value`/`signal_cpu` are
/// the whole implementation, since there is no GPU to synchronize with.
pub struct MockFence {
    value: AtomicU64,
}

impl rhi::FenceBackend for MockFence {
    fn get_completed_value(&self) -> Result<u64> {
        Ok(self.value.load(Ordering::SeqCst))
    }

    fn signal_cpu(&self, value: u64) -> Result<()> {
        self.value.store(value, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockCommandBuffer;

impl CommandBufferBackend for MockCommandBuffer {
    fn begin(&self) -> Result<()> {
        Ok(())
    }

    fn end(&self) -> Result<()> {
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockCommandPool;

impl CommandPoolBackend for MockCommandPool {
    fn reset(&self) -> Result<()> {
        Ok(())
    }

    fn allocate(&self) -> Result<Box<dyn CommandBufferBackend>> {
        Ok(Box::new(MockCommandBuffer))
    }
}

/// Every slot reports the same fixed identity per pipeline instance (its
/// own address), so two distinct `MockPipeline`s always compare as fully
/// different and the same instance always compares as fully equal — enough
/// to exercise the redundant-bind filter without a real GPU state object
/// to key on.
pub struct MockPipeline {
    is_compute: bool,
}

impl PipelineBackend for MockPipeline {
    fn is_compute(&self) -> bool {
        self.is_compute
    }

    fn slot_key(&self, slot: PipelineSlot) -> Option<u64> {
        let applies = if self.is_compute {
            slot == PipelineSlot::ComputeShader
        } else {
            slot != PipelineSlot::ComputeShader
        };
        applies.then(|| self as *const MockPipeline as u64)
    }

    fn bind_slot(&self, _cmd_backend: &dyn CommandBufferBackend, _slot: PipelineSlot) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockTexture;

impl TextureBackend for MockTexture {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A swapchain with exactly one back buffer, the way every backend in this
/// crate models presentable surfaces; `acquire_next_image` always hands
/// back index 0 and signals the fence synchronously.
pub struct MockSwapchain {
    texture: Texture,
    present_count: Mutex<u64>,
    force_occluded_once: std::sync::atomic::AtomicBool,
}

impl SwapchainBackend for MockSwapchain {
    fn acquire_next_image(&self, fence: &Fence, signal_value: u64) -> Result<u32> {
        fence.signal(signal_value)?;
        Ok(0)
    }

    fn back_buffer(&self, index: u32) -> Texture {
        debug_assert_eq!(index, 0);
        self.texture.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl MockSwapchain {
    /// Exposed for tests that want to assert how many times `present` ran
    /// without needing a real presentation surface to observe.
    pub fn present_count(&self) -> u64 {
        *self.present_count.lock().unwrap()
    }

    /// Makes the next `present` report `Status::Suboptimal` (as if the
    /// native surface were occluded), then reverts to reporting success,
    /// mirroring `D3D11Swapchain::present`'s `DXGI_STATUS_OCCLUDED` mapping.
    pub fn force_occluded_once(&self) {
        self.force_occluded_once.store(true, Ordering::SeqCst);
    }
}

pub struct MockQueue;

impl QueueBackend for MockQueue {
    fn enqueue_wait(&self, fence: &Fence, value: u64) -> Result<()> {
        // No GPU timeline to enqueue onto; block inline instead, which is
        // observationally equivalent for a single-threaded mock.
        rhi::wait_many(&[fence], &[value], true, rhi::INFINITE_TIMEOUT)?;
        Ok(())
    }

    fn execute(&self, _cmd: &rhi::CommandBuffer) -> Result<()> {
        Ok(())
    }

    fn enqueue_signal(&self, fence: &Fence, value: u64) -> Result<()> {
        fence.signal(value)
    }

    fn wait_idle(&self) -> Result<()> {
        Ok(())
    }

    fn present_one(&self, swapchain: &Swapchain) -> Result<Status> {
        let backend = swapchain
            .backend()
            .as_any()
            .downcast_ref::<MockSwapchain>()
            .expect("MockQueue can only present MockSwapchain instances");
        *backend.present_count.lock().unwrap() += 1;
        if backend.force_occluded_once.swap(false, Ordering::SeqCst) {
            return Ok(Status::Suboptimal);
        }
        Ok(Status::Success)
    }
}

pub struct MockDevice {
    diag: Diagnostics,
}

impl DeviceBackend for MockDevice {
    fn create_fence(&self, initial_value: u64) -> Result<Box<dyn rhi::FenceBackend>> {
        Ok(Box::new(MockFence {
            value: AtomicU64::new(initial_value),
        }))
    }

    fn create_command_pool(&self, _desc: &CommandPoolDesc) -> Result<Box<dyn CommandPoolBackend>> {
        Ok(Box::new(MockCommandPool))
    }

    fn create_pipeline_layout(&self, _desc: &PipelineLayoutDesc) -> Result<()> {
        Ok(())
    }

    fn create_graphics_pipeline(&self, _desc: &GraphicsPipelineDesc<'_>) -> Result<Box<dyn PipelineBackend>> {
        Ok(Box::new(MockPipeline { is_compute: false }))
    }

    fn create_compute_pipeline(&self, _desc: &ComputePipelineDesc<'_>) -> Result<Box<dyn PipelineBackend>> {
        Ok(Box::new(MockPipeline { is_compute: true }))
    }

    fn create_texture(&self, _desc: &TextureDesc) -> Result<Box<dyn TextureBackend>> {
        Ok(Box::new(MockTexture))
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<Box<dyn SwapchainBackend>> {
        let texture = Texture::from_native(
            self.diag.clone(),
            TextureDesc {
                format: desc.format,
                ..TextureDesc::default()
            },
            Box::new(MockTexture),
        )?;
        Ok(Box::new(MockSwapchain {
            texture,
            present_count: Mutex::new(0),
            force_occluded_once: std::sync::atomic::AtomicBool::new(false),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds a device against the single [`MockAdapterSource`] adapter,
/// constructing every queue `desc.queues` requests.
pub fn create_device(diag: Diagnostics, desc: &DeviceDesc<'_>) -> Result<Device> {
    let backend = MockDevice { diag: diag.clone() };

    let mut queues = Vec::with_capacity(desc.queues.len());
    for request in desc.queues {
        let instances = (0..request.count)
            .map(|_| rhi::Queue::new(diag.clone(), request.queue_type, Box::new(MockQueue)))
            .collect::<Vec<_>>();
        queues.push((request.queue_type, instances));
    }

    Ok(Device::from_parts(
        diag,
        rhi::BackendKind::Empty,
        desc.adapter.clone(),
        Box::new(backend),
        queues,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhi::{QueueRequest, SubmitInfo};
    use raw_window_handle::RawWindowHandle;

    fn open_device(queue_type: QueueType) -> Device {
        let adapters = enumerate_adapters(1).unwrap();
        let adapter = adapters.into_iter().next().unwrap();
        let desc = DeviceDesc {
            adapter: &adapter,
            queues: &[QueueRequest { queue_type, count: 1 }],
            enable_api_validation: false,
            debug_callback: None,
            allocation_callback: None,
        };
        create_device(Diagnostics::default(), &desc).unwrap()
    }

    #[test]
    fn enumerate_adapters_reports_the_single_mock_adapter() {
        let adapters = enumerate_adapters(4).unwrap();
        assert_eq!(adapters.len(), 1);
        assert_eq!(adapters[0].name, "Mock Adapter");
    }

    #[test]
    fn triangle_frame_loop_submits_and_presents() {
        let device = open_device(QueueType::Graphics);
        let queue = device.queue(QueueType::Graphics, 0).unwrap();

        let fence = device.create_fence(0).unwrap();
        let pool = device
            .create_command_pool(CommandPoolDesc {
                queue_type: QueueType::Graphics,
                ..CommandPoolDesc::default()
            })
            .unwrap();
        let cmd = pool.allocate().unwrap();

        cmd.begin().unwrap();
        cmd.end().unwrap();

        queue
            .submit(&[SubmitInfo {
                wait: &[],
                command_buffers: &[cmd.clone()],
                signal: &[(&fence, 1)],
            }])
            .unwrap();

        let outcome = rhi::wait_many(&[&fence], &[1], true, rhi::INFINITE_TIMEOUT).unwrap();
        assert_eq!(outcome, rhi::WaitOutcome::Signaled);
        assert_eq!(cmd.state(), rhi::CommandBufferState::Pending);
    }

    #[test]
    fn swapchain_present_occluded_is_not_an_error() {
        let device = open_device(QueueType::Present);
        let queue = device.queue(QueueType::Present, 0).unwrap();

        // A zeroed Windows handle is enough; the mock backend never
        // dereferences it.
        let window = RawWindowHandle::Windows(raw_window_handle::WindowsHandle::empty());
        let swapchain = device
            .create_swapchain(SwapchainDesc {
                window,
                texture_count: 2,
                format: rhi::Format::Bgra8Unorm,
                color_space: rhi::ColorSpace::SrgbNonlinear,
                flags: rhi::SwapchainFlags::empty(),
                frames_in_flight: 0,
            })
            .unwrap();

        let fence = device.create_fence(0).unwrap();
        let index = swapchain.acquire_next_image(&fence, 1).unwrap();
        assert_eq!(index, 0);

        let results = queue.present(&[(&fence, 1)], &[&swapchain], &[]).unwrap();
        assert_eq!(results, vec![Status::Success]);

        let backend = swapchain
            .backend()
            .as_any()
            .downcast_ref::<MockSwapchain>()
            .unwrap();
        assert_eq!(backend.present_count(), 1);
    }
}
