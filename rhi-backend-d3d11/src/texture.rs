//! Semantic `rhi::TextureDesc` mapped onto `ID3D11Texture{1D,2D,3D}`
//! creation. Grounded on `vri_d3d11_texture.c`: usage maps to D3D11 bind
//! flags, memory type maps to a `D3D11_USAGE` + CPU-access-flags pair.

use rhi::{Error, MemoryType, Result, TextureDesc, TextureKind, TextureUsage};
use std::any::Any;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11Device5, ID3D11Resource, ID3D11Texture1D, ID3D11Texture2D, ID3D11Texture3D,
    D3D11_BIND_DEPTH_STENCIL, D3D11_BIND_FLAG, D3D11_BIND_RENDER_TARGET, D3D11_BIND_SHADER_RESOURCE,
    D3D11_BIND_UNORDERED_ACCESS, D3D11_CPU_ACCESS_FLAG, D3D11_CPU_ACCESS_READ, D3D11_CPU_ACCESS_WRITE,
    D3D11_TEXTURE1D_DESC, D3D11_TEXTURE2D_DESC, D3D11_TEXTURE3D_DESC, D3D11_USAGE, D3D11_USAGE_DEFAULT,
    D3D11_USAGE_DYNAMIC, D3D11_USAGE_STAGING,
};
use windows::Win32::Graphics::Dxgi::Common::DXGI_SAMPLE_DESC;
use windows::core::Interface;

use crate::format::to_dxgi;
use crate::hresult::hr;

pub struct D3D11Texture {
    resource: ID3D11Resource,
}

unsafe impl Send for D3D11Texture {}
unsafe impl Sync for D3D11Texture {}

impl D3D11Texture {
    pub fn create(device: &ID3D11Device5, desc: &TextureDesc) -> Result<D3D11Texture> {
        let (usage, cpu_access) = memory_type_to_usage(desc.memory_type);
        let bind_flags = usage_to_bind_flags(desc.usage);
        let format = to_dxgi(desc.format).typeless;

        let resource: ID3D11Resource = unsafe {
            match desc.kind {
                TextureKind::Texture1D => {
                    let d = D3D11_TEXTURE1D_DESC {
                        Width: desc.width,
                        MipLevels: desc.mip_levels,
                        ArraySize: desc.depth_or_layers,
                        Format: format,
                        Usage: usage,
                        BindFlags: bind_flags.0 as u32,
                        CPUAccessFlags: cpu_access.0 as u32,
                        ..Default::default()
                    };
                    let mut out: Option<ID3D11Texture1D> = None;
                    hr(device.CreateTexture1D(&d, None, Some(&mut out)), "CreateTexture1D")?;
                    out.unwrap().cast()
                }
                TextureKind::Texture2D | TextureKind::TextureCube => {
                    let d = D3D11_TEXTURE2D_DESC {
                        Width: desc.width,
                        Height: desc.height,
                        MipLevels: desc.mip_levels,
                        ArraySize: desc.depth_or_layers,
                        Format: format,
                        SampleDesc: DXGI_SAMPLE_DESC {
                            Count: desc.sample_count.max(1),
                            Quality: 0,
                        },
                        Usage: usage,
                        BindFlags: bind_flags.0 as u32,
                        CPUAccessFlags: cpu_access.0 as u32,
                        MiscFlags: if desc.kind == TextureKind::TextureCube {
                            windows::Win32::Graphics::Direct3D11::D3D11_RESOURCE_MISC_TEXTURECUBE.0 as u32
                        } else {
                            0
                        },
                    };
                    let mut out: Option<ID3D11Texture2D> = None;
                    hr(device.CreateTexture2D(&d, None, Some(&mut out)), "CreateTexture2D")?;
                    out.unwrap().cast()
                }
                TextureKind::Texture3D => {
                    let d = D3D11_TEXTURE3D_DESC {
                        Width: desc.width,
                        Height: desc.height,
                        Depth: desc.depth_or_layers,
                        MipLevels: desc.mip_levels,
                        Format: format,
                        Usage: usage,
                        BindFlags: bind_flags.0 as u32,
                        CPUAccessFlags: cpu_access.0 as u32,
                        ..Default::default()
                    };
                    let mut out: Option<ID3D11Texture3D> = None;
                    hr(device.CreateTexture3D(&d, None, Some(&mut out)), "CreateTexture3D")?;
                    out.unwrap().cast()
                }
            }
        }
        .map_err(|e: windows::core::Error| {
            Error::SystemFailure(format!("failed to upgrade native texture to ID3D11Resource: {}", e))
        })?;

        Ok(D3D11Texture { resource })
    }

    /// Wraps a resource the backend already owns (a swapchain back buffer),
    /// skipping native creation entirely. Mirrors
    /// `d3d11_texture_create_from_resource`.
    pub fn from_resource(resource: ID3D11Resource) -> D3D11Texture {
        D3D11Texture { resource }
    }

    pub fn resource(&self) -> &ID3D11Resource {
        &self.resource
    }
}

fn memory_type_to_usage(memory_type: MemoryType) -> (D3D11_USAGE, D3D11_CPU_ACCESS_FLAG) {
    match memory_type {
        MemoryType::GpuOnly => (D3D11_USAGE_DEFAULT, D3D11_CPU_ACCESS_FLAG(0)),
        MemoryType::Upload => (D3D11_USAGE_DYNAMIC, D3D11_CPU_ACCESS_WRITE),
        MemoryType::Readback => (D3D11_USAGE_STAGING, D3D11_CPU_ACCESS_READ),
    }
}

fn usage_to_bind_flags(usage: TextureUsage) -> D3D11_BIND_FLAG {
    let mut flags = 0u32;
    if usage.contains(TextureUsage::SHADER_RESOURCE) {
        flags |= D3D11_BIND_SHADER_RESOURCE.0 as u32;
    }
    if usage.contains(TextureUsage::SHADER_RESOURCE_STORAGE) {
        flags |= D3D11_BIND_UNORDERED_ACCESS.0 as u32;
    }
    if usage.contains(TextureUsage::COLOR_ATTACHMENT) {
        flags |= D3D11_BIND_RENDER_TARGET.0 as u32;
    }
    if usage.contains(TextureUsage::DEPTH_STENCIL_ATTACHMENT) {
        flags |= D3D11_BIND_DEPTH_STENCIL.0 as u32;
    }
    D3D11_BIND_FLAG(flags as i32)
}

impl rhi::TextureBackend for D3D11Texture {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
