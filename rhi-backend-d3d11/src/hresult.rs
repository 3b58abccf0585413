//! Maps `windows::core::Error` (an `HRESULT` wrapper) onto the core's
//! backend-agnostic [`rhi::Error`]. The core never sees a raw `HRESULT`;
//! every D3D11/DXGI call that can fail funnels through [`hr`] at the point
//! it crosses back into core-facing code.

use rhi::Error;
use windows::Win32::Foundation::E_OUTOFMEMORY;
use windows::Win32::Graphics::Dxgi::{DXGI_ERROR_DEVICE_REMOVED, DXGI_ERROR_DEVICE_RESET};

/// Converts a `windows::core::Result<T>` into an [`rhi::Result<T>`],
/// tagging the failure with `context` (what we were trying to do) the way
/// the original implementation's debug-callback messages do.
pub fn hr<T>(result: windows::core::Result<T>, context: &str) -> rhi::Result<T> {
    result.map_err(|e| map_error(&e, context))
}

fn map_error(e: &windows::core::Error, context: &str) -> Error {
    let code = e.code();
    if code == E_OUTOFMEMORY.into() {
        return Error::OutOfMemory;
    }
    if code == DXGI_ERROR_DEVICE_REMOVED.into() || code == DXGI_ERROR_DEVICE_RESET.into() {
        return Error::DeviceRemoved;
    }
    Error::SystemFailure(format!("{}: {} ({:#x})", context, e.message(), code.0))
}
