//! Swapchains: an OS-surface-bound ring of presentable textures, and the
//! flags that govern VSync, tearing, and frame-latency behavior.

use crate::error::Result;
use crate::fence::Fence;
use crate::format::{ColorSpace, Format};
use crate::object::{Diagnostics, ObjectBase, ObjectType};
use crate::texture::Texture;
use raw_window_handle::RawWindowHandle;
use std::sync::{atomic::{AtomicU64, Ordering}, Arc};

bitflags::bitflags! {
    pub struct SwapchainFlags: u32 {
        const VSYNC = 0x1;
        /// Configures a waitable frame-latency object instead of a fixed
        /// device-level latency; see [`SwapchainDesc::frames_in_flight`].
        const WAITABLE = 0x2;
        /// Only meaningful when `VSYNC` is unset; allows the present call
        /// to tear rather than wait for vblank.
        const ALLOW_TEARING = 0x4;
    }
}

#[derive(Clone, Copy)]
pub struct SwapchainDesc {
    pub window: RawWindowHandle,
    pub texture_count: u32,
    pub format: Format,
    pub color_space: ColorSpace,
    pub flags: SwapchainFlags,
    /// Only consulted when `WAITABLE` is set; `0` lets the backend pick.
    pub frames_in_flight: u32,
}

/// The per-backend half of a swapchain.
pub trait SwapchainBackend: Send + Sync {
    /// For backends that only ever expose a single drawable image, this
    /// always returns `0` and signals `fence` immediately; for backends
    /// with true image queues, the fence is signalled asynchronously when
    /// the acquired image is ready to be rendered into.
    fn acquire_next_image(&self, fence: &Fence, signal_value: u64) -> Result<u32>;
    fn back_buffer(&self, index: u32) -> Texture;
    fn as_any(&self) -> &dyn std::any::Any;
}

struct SwapchainShared {
    base: ObjectBase,
    #[allow(dead_code)]
    diag: Diagnostics,
    desc: SwapchainDesc,
    backend: Box<dyn SwapchainBackend>,
    present_id: AtomicU64,
}

#[derive(Clone)]
pub struct Swapchain(Arc<SwapchainShared>);

impl Swapchain {
    pub fn new(diag: Diagnostics, desc: SwapchainDesc, backend: Box<dyn SwapchainBackend>) -> Swapchain {
        Swapchain(Arc::new(SwapchainShared {
            base: ObjectBase::new(ObjectType::Swapchain),
            diag,
            desc,
            backend,
            present_id: AtomicU64::new(0),
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.base.id
    }

    pub fn desc(&self) -> &SwapchainDesc {
        &self.0.desc
    }

    pub fn backend(&self) -> &dyn SwapchainBackend {
        self.0.backend.as_ref()
    }

    pub fn acquire_next_image(&self, fence: &Fence, signal_value: u64) -> Result<u32> {
        self.0.backend.acquire_next_image(fence, signal_value)
    }

    pub fn back_buffer(&self, index: u32) -> Texture {
        self.0.backend.back_buffer(index)
    }

    /// The number of times this swapchain has been handed to `Queue::present`.
    pub fn present_id(&self) -> u64 {
        self.0.present_id.load(Ordering::Acquire)
    }

    /// Advances the present id by one. Called once per swapchain by
    /// `Queue::present` after each successful native present.
    pub(crate) fn bump_present_id(&self) -> u64 {
        self.0.present_id.fetch_add(1, Ordering::AcqRel) + 1
    }
}
