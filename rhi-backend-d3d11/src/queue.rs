//! D3D11 has one native command queue: the immediate context. A
//! [`rhi::Queue`] here is bookkeeping only; every method reaches back into
//! the device's single `ID3D11DeviceContext4` to do the actual work.
//! Grounded on `vri_d3d11_queue.c`.

use rhi::{CommandBuffer, Error, Fence, Result, Status, Swapchain};
use windows::Win32::Graphics::Direct3D11::ID3D11DeviceContext4;

use crate::hresult::hr;
use crate::swapchain::D3D11Swapchain;

pub struct D3D11Queue {
    immediate_context: ID3D11DeviceContext4,
}

unsafe impl Send for D3D11Queue {}
unsafe impl Sync for D3D11Queue {}

impl D3D11Queue {
    pub fn new(immediate_context: ID3D11DeviceContext4) -> D3D11Queue {
        D3D11Queue { immediate_context }
    }
}

impl rhi::QueueBackend for D3D11Queue {
    fn enqueue_wait(&self, fence: &Fence, value: u64) -> Result<()> {
        let native = crate::fence::downcast(fence)?.native();
        unsafe { hr(self.immediate_context.Wait(native, value), "ID3D11DeviceContext4::Wait") }
    }

    fn execute(&self, cmd: &CommandBuffer) -> Result<()> {
        let backend = crate::command::downcast(cmd.backend())?;
        if let Some(list) = backend.take_command_list() {
            unsafe { self.immediate_context.ExecuteCommandList(&list, false) };
        }
        Ok(())
    }

    fn enqueue_signal(&self, fence: &Fence, value: u64) -> Result<()> {
        let native = crate::fence::downcast(fence)?.native();
        unsafe { hr(self.immediate_context.Signal(native, value), "ID3D11DeviceContext4::Signal") }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe { self.immediate_context.Flush() };
        Ok(())
    }

    fn present_one(&self, swapchain: &Swapchain) -> Result<Status> {
        let backend = swapchain
            .backend()
            .as_any()
            .downcast_ref::<D3D11Swapchain>()
            .ok_or_else(|| Error::InvalidApiUsage("swapchain was not created by the D3D11 backend".into()))?;
        backend.present(0)
    }
}
