//! A swapchain is a single-image resource in this backend (D3D11 only
//! ever lets the application touch buffer 0 of a flip-model chain), so
//! `acquire_next_image` always returns index 0 and signals the fence
//! immediately rather than asynchronously. Grounded on
//! `vri_d3d11_swapchain.c`.

use rhi::{ColorSpace, Error, Fence, Format, MemoryType, Result, Status, SwapchainDesc, SwapchainFlags, Texture, TextureDesc, TextureKind, TextureUsage};
use raw_window_handle::RawWindowHandle;
use std::any::Any;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D11::ID3D11Device5;
use windows::Win32::Graphics::Dxgi::Common::{DXGI_ALPHA_MODE_IGNORE, DXGI_SAMPLE_DESC};
use windows::Win32::Graphics::Dxgi::{
    IDXGIAdapter, IDXGIDevice1, IDXGIFactory2, IDXGISwapChain4, DXGI_ERROR_DEVICE_REMOVED,
    DXGI_ERROR_DEVICE_RESET, DXGI_MWA_NO_ALT_ENTER, DXGI_MWA_NO_WINDOW_CHANGES, DXGI_PRESENT,
    DXGI_SCALING_NONE, DXGI_STATUS_OCCLUDED, DXGI_SWAP_CHAIN_COLOR_SPACE_SUPPORT_FLAG_PRESENT,
    DXGI_SWAP_CHAIN_DESC1, DXGI_SWAP_EFFECT_FLIP_DISCARD, DXGI_USAGE_RENDER_TARGET_OUTPUT,
};
use windows::core::Interface;

use crate::format::{from_dxgi, to_dxgi, to_dxgi_color_space};
use crate::hresult::hr;
use crate::texture::D3D11Texture;

pub struct D3D11Swapchain {
    swapchain: IDXGISwapChain4,
    texture: Texture,
    flags: SwapchainFlags,
}

unsafe impl Send for D3D11Swapchain {}
unsafe impl Sync for D3D11Swapchain {}

impl D3D11Swapchain {
    pub fn create(
        device: &ID3D11Device5,
        adapter: &IDXGIAdapter,
        diag: rhi::object::Diagnostics,
        desc: &SwapchainDesc,
    ) -> Result<D3D11Swapchain> {
        let hwnd = match desc.window {
            RawWindowHandle::Windows(handle) => HWND(handle.hwnd as *mut _),
            _ => {
                return Err(Error::InvalidApiUsage(
                    "D3D11 swapchains require a Windows window handle".into(),
                ));
            }
        };

        let factory: IDXGIFactory2 = unsafe { hr(adapter.GetParent(), "IDXGIAdapter::GetParent (IDXGIFactory2)")? };

        let format = to_dxgi(desc.format).typed;
        let chain_desc = DXGI_SWAP_CHAIN_DESC1 {
            Width: 0,
            Height: 0,
            Format: format,
            BufferCount: desc.texture_count,
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            Scaling: DXGI_SCALING_NONE,
            AlphaMode: DXGI_ALPHA_MODE_IGNORE,
            ..Default::default()
        };

        let swapchain1 = unsafe {
            hr(
                factory.CreateSwapChainForHwnd(device, hwnd, &chain_desc, None, None),
                "CreateSwapChainForHwnd",
            )?
        };

        unsafe {
            // Best effort: we want to own fullscreen transitions ourselves,
            // but failing to register this association shouldn't fail
            // swapchain creation outright.
            if let Err(e) = factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_WINDOW_CHANGES | DXGI_MWA_NO_ALT_ENTER) {
                log::warn!("MakeWindowAssociation failed: {}", e);
            }
        }

        let swapchain: IDXGISwapChain4 = hr(swapchain1.cast(), "upgrade swapchain to IDXGISwapChain4")?;

        let color_space = to_dxgi_color_space(desc.color_space);
        unsafe {
            let mut support = 0u32;
            if swapchain.CheckColorSpaceSupport(color_space, &mut support).is_ok()
                && (support & DXGI_SWAP_CHAIN_COLOR_SPACE_SUPPORT_FLAG_PRESENT.0 as u32) != 0
            {
                if let Err(e) = swapchain.SetColorSpace1(color_space) {
                    log::warn!("SetColorSpace1 failed: {}", e);
                }
            }
        }

        unsafe {
            if desc.flags.contains(SwapchainFlags::WAITABLE) {
                hr(
                    swapchain.SetMaximumFrameLatency(desc.frames_in_flight.max(1)),
                    "SetMaximumFrameLatency",
                )?;
            } else {
                let frames_in_flight = if desc.frames_in_flight == 0 { 2 } else { desc.frames_in_flight };
                if let Ok(dxgi_device) = device.cast::<IDXGIDevice1>() {
                    if let Err(e) = dxgi_device.SetMaximumFrameLatency(frames_in_flight) {
                        log::warn!("SetMaximumFrameLatency (device-level) failed: {}", e);
                    }
                }
            }
        }

        let back_buffer = unsafe {
            hr(swapchain.GetBuffer::<windows::Win32::Graphics::Direct3D11::ID3D11Resource>(0), "IDXGISwapChain::GetBuffer(0)")?
        };
        let native_format = from_dxgi(format);
        let texture_desc = TextureDesc {
            kind: TextureKind::Texture2D,
            format: native_format,
            width: 0,
            height: 0,
            depth_or_layers: 1,
            mip_levels: 1,
            sample_count: 1,
            usage: TextureUsage::COLOR_ATTACHMENT,
            memory_type: MemoryType::GpuOnly,
        };
        let backend = Box::new(D3D11Texture::from_resource(back_buffer));
        let texture = Texture::from_native(diag, texture_desc, backend)?;

        Ok(D3D11Swapchain {
            swapchain,
            texture,
            flags: desc.flags,
        })
    }
}

impl rhi::SwapchainBackend for D3D11Swapchain {
    fn acquire_next_image(&self, fence: &Fence, signal_value: u64) -> Result<u32> {
        // D3D11 gives the application exactly one touchable buffer; there is
        // no async acquire to wait on, so the fence is signalled inline.
        fence.signal(signal_value)?;
        Ok(0)
    }

    fn back_buffer(&self, index: u32) -> Texture {
        debug_assert_eq!(index, 0, "D3D11 swapchains only ever have a single presentable image");
        self.texture.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl D3D11Swapchain {
    pub fn present(&self, image_index: u32) -> Result<Status> {
        if image_index >= 1 {
            return Err(Error::InvalidApiUsage("D3D11 swapchains only have image index 0".into()));
        }

        let sync_interval = u32::from(self.flags.contains(SwapchainFlags::VSYNC));
        let present_flags = if sync_interval == 0 && self.flags.contains(SwapchainFlags::ALLOW_TEARING) {
            windows::Win32::Graphics::Dxgi::DXGI_PRESENT_ALLOW_TEARING.0 as u32
        } else {
            0
        };

        let result = unsafe { self.swapchain.Present(sync_interval, DXGI_PRESENT(present_flags)) };
        match result {
            windows::core::HRESULT(0) => Ok(Status::Success),
            code if code == DXGI_ERROR_DEVICE_REMOVED || code == DXGI_ERROR_DEVICE_RESET => {
                Err(Error::DeviceRemoved)
            }
            code if code == DXGI_STATUS_OCCLUDED => Ok(Status::Suboptimal),
            code => Err(Error::SystemFailure(format!(
                "IDXGISwapChain::Present failed ({:#x})",
                code.0
            ))),
        }
    }
}
