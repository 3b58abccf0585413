//! Direct3D 11.4 backend for [`rhi`].
//!
//! Command buffers are deferred contexts, fences are native `ID3D11Fence`
//! timelines, and a queue is a thin wrapper around the device's single
//! immediate context. See each module's docs for what it is grounded on;
//! `DESIGN.md` in the workspace root records the module-by-module ledger.

mod adapter;
mod command;
mod device;
mod fence;
mod format;
mod hresult;
mod pipeline;
mod pool;
mod queue;
mod swapchain;
mod texture;

pub use adapter::Dxgi1Source;

use rhi::object::Diagnostics;
use rhi::{AdapterDesc, DeviceDesc, Result};

/// Enumerates adapters through DXGI, sorted the way every backend's
/// adapters are (see [`rhi::enumerate_adapters`]).
pub fn enumerate_adapters(max_count: usize) -> Result<Vec<AdapterDesc>> {
    rhi::enumerate_adapters(&Dxgi1Source, max_count)
}

/// Creates a device bound to the adapter named by `desc.adapter.luid`.
pub fn create_device(diag: Diagnostics, desc: &DeviceDesc<'_>) -> Result<rhi::Device> {
    device::create_device(diag, desc)
}
