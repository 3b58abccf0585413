//! D3D11.4's `ID3D11Fence` is already a native 64-bit timeline, so this
//! backend needs none of the binary-event emulation §4.4 requires of
//! backends without one — the mapping onto [`rhi::FenceBackend`] is
//! nearly direct. Grounded on `vri_d3d11_fence.c`.

use rhi::{Error, Result};
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::Graphics::Direct3D11::{ID3D11Device5, ID3D11Fence, D3D11_FENCE_FLAG_NONE};
use windows::Win32::System::Threading::CreateEventW;

use crate::hresult::hr;

pub struct D3D11Fence {
    fence: ID3D11Fence,
    event: HANDLE,
    // Mirrors the completed value locally so `get_completed_value` doesn't
    // need a round-trip through the driver on the hot path; `ID3D11Fence`
    // itself is the source of truth and is queried to refresh this.
    shadow: AtomicU64,
}

// `ID3D11Fence` is safe to call from any thread for the operations this
// backend uses (GetCompletedValue/Signal); the event handle is an opaque
// kernel object. See the equivalent `unsafe impl Send/Sync` pattern other
// `windows`-based backends in this ecosystem use for raw COM/kernel handles.
unsafe impl Send for D3D11Fence {}
unsafe impl Sync for D3D11Fence {}

impl D3D11Fence {
    pub fn new(device: &ID3D11Device5, initial_value: u64) -> Result<D3D11Fence> {
        let fence: ID3D11Fence = unsafe {
            hr(
                device.CreateFence(0, D3D11_FENCE_FLAG_NONE),
                "ID3D11Device5::CreateFence",
            )?
        };
        let event = unsafe { hr(CreateEventW(None, false, false, None), "CreateEventW")? };

        if initial_value > 0 {
            unsafe {
                hr(fence.Signal(initial_value), "ID3D11Fence::Signal(initial)")?;
            }
        }

        Ok(D3D11Fence {
            fence,
            event,
            shadow: AtomicU64::new(initial_value),
        })
    }

    pub fn native(&self) -> &ID3D11Fence {
        &self.fence
    }
}

impl Drop for D3D11Fence {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.event);
        }
    }
}

impl rhi::FenceBackend for D3D11Fence {
    fn get_completed_value(&self) -> Result<u64> {
        let value = unsafe { self.fence.GetCompletedValue() };
        self.shadow.fetch_max(value, Ordering::SeqCst);
        Ok(value)
    }

    fn signal_cpu(&self, value: u64) -> Result<()> {
        unsafe { hr(self.fence.Signal(value), "ID3D11Fence::Signal") }?;
        self.shadow.fetch_max(value, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Downcasts a core [`rhi::Fence`] to this backend's concrete type, for the
/// queue/present paths that need the native `ID3D11Fence` to enqueue a
/// GPU-side wait or signal.
pub fn downcast(fence: &rhi::Fence) -> Result<&D3D11Fence> {
    fence
        .backend()
        .as_any()
        .downcast_ref::<D3D11Fence>()
        .ok_or_else(|| Error::InvalidApiUsage("fence was not created by the D3D11 backend".into()))
}
