//! DXGI adapter enumeration: discover `IDXGIAdapter1`s, drop software/remote
//! ones, validate each can actually create a D3D11 device, and query UMA to
//! classify integrated vs discrete. Grounded on `d3d_enum_adapters` in
//! `vri.c` — the core's `sort_adapters` does the scoring/ordering, this
//! module only has to produce correct [`rhi::AdapterDesc`] values.

use rhi::{AdapterDesc, AdapterSource, GpuType, GpuVendor, Result};
use windows::Win32::Graphics::Direct3D::D3D_DRIVER_TYPE_UNKNOWN;
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, D3D11_CREATE_DEVICE_FLAG, D3D11_FEATURE_ARCHITECTURE_INFO,
    D3D11_FEATURE_DATA_ARCHITECTURE_INFO, D3D11_SDK_VERSION,
};
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory2, IDXGIAdapter1, IDXGIFactory4, DXGI_ADAPTER_DESC1, DXGI_ADAPTER_FLAG_NONE,
    DXGI_ADAPTER_FLAG_SOFTWARE, DXGI_CREATE_FACTORY_FLAGS,
};

use crate::hresult::hr;

const MAX_ADAPTERS: usize = 32;

pub struct Dxgi1Source;

impl AdapterSource for Dxgi1Source {
    fn enumerate(&self, max_count: usize) -> Result<Vec<AdapterDesc>> {
        unsafe {
            let factory: IDXGIFactory4 = hr(
                CreateDXGIFactory2(DXGI_CREATE_FACTORY_FLAGS(0)),
                "CreateDXGIFactory2",
            )?;

            let mut out = Vec::new();
            for index in 0..MAX_ADAPTERS as u32 {
                let adapter: IDXGIAdapter1 = match factory.EnumAdapters1(index) {
                    Ok(a) => a,
                    Err(_) => break,
                };

                let mut desc = DXGI_ADAPTER_DESC1::default();
                if adapter.GetDesc1(&mut desc).is_err() {
                    continue;
                }
                if desc.Flags != DXGI_ADAPTER_FLAG_NONE.0 as u32
                    && (desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32) != 0
                {
                    continue;
                }

                // Confirm the adapter can actually back a D3D11 device, and
                // query its memory architecture while we have one open.
                let mut uma_info = D3D11_FEATURE_DATA_ARCHITECTURE_INFO::default();
                let gpu_type = {
                    let mut device = None;
                    let create_result = D3D11CreateDevice(
                        &adapter,
                        D3D_DRIVER_TYPE_UNKNOWN,
                        None,
                        D3D11_CREATE_DEVICE_FLAG(0),
                        None,
                        D3D11_SDK_VERSION,
                        Some(&mut device),
                        None,
                        None,
                    );
                    match (create_result, device) {
                        (Ok(()), Some(device)) => {
                            let queried = device.CheckFeatureSupport(
                                D3D11_FEATURE_ARCHITECTURE_INFO,
                                &mut uma_info as *mut _ as *mut _,
                                std::mem::size_of::<D3D11_FEATURE_DATA_ARCHITECTURE_INFO>() as u32,
                            );
                            if queried.is_err() {
                                GpuType::Unknown
                            } else if uma_info.UMA.as_bool() {
                                GpuType::Integrated
                            } else {
                                GpuType::Discrete
                            }
                        }
                        _ => {
                            // Can't create a device on it; bin the adapter the
                            // same way `d3d_enum_adapters` does.
                            continue;
                        }
                    }
                };

                let luid = ((desc.AdapterLuid.HighPart as u64) << 32)
                    | (desc.AdapterLuid.LowPart as u64);
                let name = String::from_utf16_lossy(
                    &desc.Description[..desc.Description.iter().position(|&c| c == 0).unwrap_or(desc.Description.len())],
                );

                out.push(AdapterDesc {
                    luid,
                    device_id: desc.DeviceId,
                    vendor: GpuVendor::from_pci_id(desc.VendorId),
                    gpu_type,
                    dedicated_video_memory: desc.DedicatedVideoMemory as u64,
                    shared_system_memory: desc.SharedSystemMemory as u64,
                    name,
                });

                if out.len() >= max_count {
                    break;
                }
            }

            Ok(out)
        }
    }
}
