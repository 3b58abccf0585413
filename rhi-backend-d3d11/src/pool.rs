//! D3D11 has no native command-pool concept; a pool here is the
//! bookkeeping stub §4.5 allows, and `reset` is a documented no-op.
//! Grounded on `vri_d3d11_command_pool.c`.

use rhi::Result;
use windows::Win32::Graphics::Direct3D11::ID3D11Device5;

use crate::command::D3D11CommandBuffer;

pub struct D3D11CommandPool {
    device: ID3D11Device5,
}

unsafe impl Send for D3D11CommandPool {}
unsafe impl Sync for D3D11CommandPool {}

impl D3D11CommandPool {
    pub fn new(device: ID3D11Device5) -> D3D11CommandPool {
        D3D11CommandPool { device }
    }
}

impl rhi::CommandPoolBackend for D3D11CommandPool {
    fn reset(&self) -> Result<()> {
        Ok(())
    }

    fn allocate(&self) -> Result<Box<dyn rhi::CommandBufferBackend>> {
        Ok(Box::new(D3D11CommandBuffer::new(&self.device)?))
    }
}
