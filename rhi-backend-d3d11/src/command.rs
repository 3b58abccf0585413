//! Command buffers as deferred `ID3D11DeviceContext4`s. The core owns the
//! Initial/Recording/Executable/Pending state machine (`rhi::CommandBuffer`);
//! this backend only has to `begin`/`end`/`reset` the deferred context and
//! hold onto the finished command list for the execute phase. Grounded on
//! `vri_d3d11_command_buffer.c`.

use rhi::{Error, Result};
use std::any::Any;
use std::sync::Mutex;
use windows::Win32::Graphics::Direct3D11::{ID3D11CommandList, ID3D11Device5, ID3D11DeviceContext4};

use crate::hresult::hr;

pub struct D3D11CommandBuffer {
    context: ID3D11DeviceContext4,
    command_list: Mutex<Option<ID3D11CommandList>>,
}

unsafe impl Send for D3D11CommandBuffer {}
unsafe impl Sync for D3D11CommandBuffer {}

impl D3D11CommandBuffer {
    pub fn new(device: &ID3D11Device5) -> Result<D3D11CommandBuffer> {
        let base_context = unsafe { hr(device.CreateDeferredContext(0), "CreateDeferredContext")? };
        let context: ID3D11DeviceContext4 =
            hr(base_context.cast(), "upgrade deferred context to ID3D11DeviceContext4")?;
        Ok(D3D11CommandBuffer {
            context,
            command_list: Mutex::new(None),
        })
    }

    pub fn context(&self) -> &ID3D11DeviceContext4 {
        &self.context
    }

    /// Takes the finished command list for the queue's execute phase,
    /// leaving `None` behind so a buffer that is reset (without re-begin)
    /// cannot be accidentally executed twice.
    pub fn take_command_list(&self) -> Option<ID3D11CommandList> {
        self.command_list.lock().unwrap().take()
    }
}

impl rhi::CommandBufferBackend for D3D11CommandBuffer {
    fn begin(&self) -> Result<()> {
        // Nothing to do natively: a deferred context is always ready to
        // record once its previous command list has been finished or
        // discarded. The core's state machine already rejected illegal
        // predecessor states before this is reached.
        Ok(())
    }

    fn end(&self) -> Result<()> {
        let list = unsafe { hr(self.context.FinishCommandList(false), "FinishCommandList")? };
        *self.command_list.lock().unwrap() = Some(list);
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        *self.command_list.lock().unwrap() = None;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Downcasts a `&dyn CommandBufferBackend` (as seen by the pipeline bind
/// filter, which only knows the trait) back to this backend's concrete
/// type.
pub fn downcast(backend: &dyn rhi::CommandBufferBackend) -> Result<&D3D11CommandBuffer> {
    backend
        .as_any()
        .downcast_ref::<D3D11CommandBuffer>()
        .ok_or_else(|| {
            Error::InvalidApiUsage("command buffer was not created by the D3D11 backend".into())
        })
}
