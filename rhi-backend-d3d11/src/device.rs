//! Device creation: resolve a [`rhi::AdapterDesc`]'s LUID back to an
//! `IDXGIAdapter`, create the native device plus its single immediate
//! context, upgrade both to the 11.4 interfaces this backend builds
//! everything else on, and optionally wire up the debug-layer info queue.
//! Grounded on `vri_d3d11_device.c`.

use rhi::{
    BackendKind, CommandPoolBackend, CommandPoolDesc, ComputePipelineDesc, Device, DeviceBackend,
    DeviceDesc, Error, FenceBackend, GraphicsPipelineDesc, PipelineBackend, PipelineLayoutDesc,
    Queue, Result, SwapchainBackend, SwapchainDesc, TextureBackend, TextureDesc,
};
use rhi::object::Diagnostics;
use std::any::Any;
use windows::Win32::Foundation::LUID;
use windows::Win32::Graphics::Direct3D::{D3D_DRIVER_TYPE_UNKNOWN, D3D_FEATURE_LEVEL_11_0, D3D_FEATURE_LEVEL_11_1};
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device5, ID3D11DeviceContext4, ID3D11InfoQueue, D3D11_CREATE_DEVICE_DEBUG,
    D3D11_CREATE_DEVICE_FLAG, D3D11_MESSAGE_SEVERITY_CORRUPTION, D3D11_MESSAGE_SEVERITY_ERROR,
    D3D11_MESSAGE_SEVERITY_WARNING, D3D11_SDK_VERSION,
};
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory2, IDXGIAdapter, IDXGIFactory4, DXGI_CREATE_FACTORY_DEBUG, DXGI_CREATE_FACTORY_FLAGS,
};
use windows::core::Interface;

use crate::fence::D3D11Fence;
use crate::hresult::hr;
use crate::pipeline::D3D11Pipeline;
use crate::pool::D3D11CommandPool;
use crate::queue::D3D11Queue;
use crate::swapchain::D3D11Swapchain;
use crate::texture::D3D11Texture;

pub struct D3D11Device {
    adapter: IDXGIAdapter,
    device: ID3D11Device5,
    immediate_context: ID3D11DeviceContext4,
    diag: Diagnostics,
}

unsafe impl Send for D3D11Device {}
unsafe impl Sync for D3D11Device {}

/// Creates a device against the adapter named by `desc.adapter.luid`, and
/// every queue `desc.queues` requests. Mirrors `d3d11_device_create`.
pub fn create_device(diag: Diagnostics, desc: &DeviceDesc<'_>) -> Result<Device> {
    let create_flags = if desc.enable_api_validation {
        D3D11_CREATE_DEVICE_DEBUG.0 as u32
    } else {
        0
    };

    let factory_flags = if desc.enable_api_validation {
        DXGI_CREATE_FACTORY_DEBUG
    } else {
        DXGI_CREATE_FACTORY_FLAGS(0)
    };
    let factory: IDXGIFactory4 = unsafe { hr(CreateDXGIFactory2(factory_flags), "CreateDXGIFactory2")? };

    let luid = LUID {
        LowPart: (desc.adapter.luid & 0xFFFF_FFFF) as u32,
        HighPart: (desc.adapter.luid >> 32) as i32,
    };
    let adapter: IDXGIAdapter = unsafe {
        hr(factory.EnumAdapterByLuid(luid), "IDXGIFactory4::EnumAdapterByLuid").map_err(|_| {
            Error::InvalidApiUsage("adapter LUID does not match any currently present adapter".into())
        })?
    };

    let feature_levels = [D3D_FEATURE_LEVEL_11_1, D3D_FEATURE_LEVEL_11_0];
    let mut base_device = None;
    let mut base_context = None;
    unsafe {
        hr(
            D3D11CreateDevice(
                &adapter,
                D3D_DRIVER_TYPE_UNKNOWN,
                None,
                D3D11_CREATE_DEVICE_FLAG(create_flags),
                Some(&feature_levels),
                D3D11_SDK_VERSION,
                Some(&mut base_device),
                None,
                Some(&mut base_context),
            ),
            "D3D11CreateDevice",
        )?;
    }
    let base_device = base_device.ok_or_else(|| Error::SystemFailure("D3D11CreateDevice returned no device".into()))?;
    let base_context = base_context.ok_or_else(|| Error::SystemFailure("D3D11CreateDevice returned no context".into()))?;

    let device5: ID3D11Device5 = hr(base_device.cast(), "upgrade ID3D11Device to ID3D11Device5")?;
    let context4: ID3D11DeviceContext4 = hr(base_context.cast(), "upgrade immediate context to ID3D11DeviceContext4")?;

    if desc.enable_api_validation {
        match device5.cast::<ID3D11InfoQueue>() {
            Ok(info_queue) => unsafe {
                let _ = info_queue.SetBreakOnSeverity(D3D11_MESSAGE_SEVERITY_CORRUPTION, false);
                let _ = info_queue.SetBreakOnSeverity(D3D11_MESSAGE_SEVERITY_ERROR, false);
                let _ = info_queue.SetBreakOnSeverity(D3D11_MESSAGE_SEVERITY_WARNING, false);
                let _ = info_queue.SetMuteDebugOutput(false);
                let _ = info_queue.SetMessageCountLimit(1024);
                log::info!("D3D11 debug layer enabled for logging");
            },
            Err(_) => log::error!("failed to get ID3D11InfoQueue for debug layer setup"),
        }
    }

    let backend = D3D11Device {
        adapter,
        device: device5,
        immediate_context: context4.clone(),
        diag: diag.clone(),
    };

    let mut queues = Vec::with_capacity(desc.queues.len());
    for request in desc.queues {
        let mut instances = Vec::with_capacity(request.count as usize);
        for _ in 0..request.count {
            let queue_backend = Box::new(D3D11Queue::new(context4.clone()));
            instances.push(Queue::new(diag.clone(), request.queue_type, queue_backend));
        }
        queues.push((request.queue_type, instances));
    }

    Ok(Device::from_parts(
        diag,
        BackendKind::D3D11,
        desc.adapter.clone(),
        Box::new(backend),
        queues,
    ))
}

impl DeviceBackend for D3D11Device {
    fn create_fence(&self, initial_value: u64) -> Result<Box<dyn FenceBackend>> {
        Ok(Box::new(D3D11Fence::new(&self.device, initial_value)?))
    }

    fn create_command_pool(&self, _desc: &CommandPoolDesc) -> Result<Box<dyn CommandPoolBackend>> {
        Ok(Box::new(D3D11CommandPool::new(self.device.clone())))
    }

    fn create_pipeline_layout(&self, _desc: &PipelineLayoutDesc) -> Result<()> {
        // D3D11 has no native pipeline-layout object to create; the core
        // already allocates the handle, so there is nothing to validate
        // beyond what the descriptor's own construction already ensures.
        Ok(())
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc<'_>) -> Result<Box<dyn PipelineBackend>> {
        Ok(Box::new(D3D11Pipeline::create_graphics(&self.device, desc)?))
    }

    fn create_compute_pipeline(&self, desc: &ComputePipelineDesc<'_>) -> Result<Box<dyn PipelineBackend>> {
        Ok(Box::new(D3D11Pipeline::create_compute(&self.device, desc)?))
    }

    fn create_texture(&self, desc: &TextureDesc) -> Result<Box<dyn TextureBackend>> {
        Ok(Box::new(D3D11Texture::create(&self.device, desc)?))
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<Box<dyn SwapchainBackend>> {
        Ok(Box::new(D3D11Swapchain::create(
            &self.device,
            &self.adapter,
            self.diag.clone(),
            desc,
        )?))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
