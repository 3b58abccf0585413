//! Bidirectional `rhi::Format` <-> `DXGI_FORMAT` table, plus the
//! colorspace, topology, cull-mode and front-face mappings every other
//! module in this backend needs. Mirrors `vri_d3d11_common.h`'s
//! `vri_to_dxgi`/`dxgi_to_vri` tables, but keeps a typeless/typed pair per
//! entry the way the original does for resource-vs-view aliasing.

use rhi::{ColorSpace, CullMode, FrontFace, PrimitiveTopology};
use windows::Win32::Graphics::Direct3D::{
    D3D_PRIMITIVE_TOPOLOGY, D3D_PRIMITIVE_TOPOLOGY_LINELIST, D3D_PRIMITIVE_TOPOLOGY_LINESTRIP,
    D3D_PRIMITIVE_TOPOLOGY_POINTLIST, D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
    D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST_ADJ, D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
    D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP_ADJ,
};
use windows::Win32::Graphics::Direct3D11::{D3D11_CULL_BACK, D3D11_CULL_FRONT, D3D11_CULL_NONE, D3D11_CULL_MODE};
use windows::Win32::Graphics::Dxgi::Common::{
    DXGI_FORMAT, DXGI_FORMAT_B8G8R8A8_TYPELESS, DXGI_FORMAT_B8G8R8A8_UNORM,
    DXGI_FORMAT_B8G8R8A8_UNORM_SRGB, DXGI_FORMAT_D16_UNORM, DXGI_FORMAT_D24_UNORM_S8_UINT,
    DXGI_FORMAT_D32_FLOAT, DXGI_FORMAT_D32_FLOAT_S8X24_UINT, DXGI_FORMAT_R16G16B16A16_FLOAT,
    DXGI_FORMAT_R32_FLOAT, DXGI_FORMAT_R32_TYPELESS, DXGI_FORMAT_R32_UINT,
    DXGI_FORMAT_R32G32B32A32_FLOAT, DXGI_FORMAT_R8_TYPELESS, DXGI_FORMAT_R8_UNORM,
    DXGI_FORMAT_R8G8_TYPELESS, DXGI_FORMAT_R8G8_UNORM, DXGI_FORMAT_R8G8B8A8_TYPELESS,
    DXGI_FORMAT_R8G8B8A8_UNORM, DXGI_FORMAT_R8G8B8A8_UNORM_SRGB, DXGI_FORMAT_UNKNOWN,
};
use windows::Win32::Graphics::Dxgi::{
    DXGI_COLOR_SPACE_RGB_FULL_G10_NONE_P709, DXGI_COLOR_SPACE_RGB_FULL_G22_NONE_P2020,
    DXGI_COLOR_SPACE_RGB_FULL_G22_NONE_P709, DXGI_COLOR_SPACE_RGB_FULL_G2084_NONE_P2020,
    DXGI_COLOR_SPACE_TYPE,
};

/// A typeless/typed `DXGI_FORMAT` pair. Texture creation uses the typeless
/// form (so a shader-resource view and a render-target view can alias the
/// same allocation); everything else — the swapchain, clear calls — uses
/// the typed form.
#[derive(Debug, Clone, Copy)]
pub struct DxgiFormatPair {
    pub typeless: DXGI_FORMAT,
    pub typed: DXGI_FORMAT,
}

/// Maps a core [`rhi::Format`] to its DXGI typeless/typed pair. Every
/// variant `rhi::Format` defines must appear here — an omission is a bug,
/// not a fallback case, which is why this is a `match` rather than a table
/// indexed by discriminant (the original's array-of-structs form needs a
/// dense integer enum; ours doesn't).
pub fn to_dxgi(format: rhi::Format) -> DxgiFormatPair {
    use rhi::Format::*;
    match format {
        Unknown => DxgiFormatPair {
            typeless: DXGI_FORMAT_UNKNOWN,
            typed: DXGI_FORMAT_UNKNOWN,
        },
        R8Unorm => DxgiFormatPair {
            typeless: DXGI_FORMAT_R8_TYPELESS,
            typed: DXGI_FORMAT_R8_UNORM,
        },
        Rg8Unorm => DxgiFormatPair {
            typeless: DXGI_FORMAT_R8G8_TYPELESS,
            typed: DXGI_FORMAT_R8G8_UNORM,
        },
        Rgba8Unorm => DxgiFormatPair {
            typeless: DXGI_FORMAT_R8G8B8A8_TYPELESS,
            typed: DXGI_FORMAT_R8G8B8A8_UNORM,
        },
        Rgba8UnormSrgb => DxgiFormatPair {
            typeless: DXGI_FORMAT_R8G8B8A8_TYPELESS,
            typed: DXGI_FORMAT_R8G8B8A8_UNORM_SRGB,
        },
        Bgra8Unorm => DxgiFormatPair {
            typeless: DXGI_FORMAT_B8G8R8A8_TYPELESS,
            typed: DXGI_FORMAT_B8G8R8A8_UNORM,
        },
        Bgra8UnormSrgb => DxgiFormatPair {
            typeless: DXGI_FORMAT_B8G8R8A8_TYPELESS,
            typed: DXGI_FORMAT_B8G8R8A8_UNORM_SRGB,
        },
        Rgba16Float => DxgiFormatPair {
            typeless: DXGI_FORMAT_R16G16B16A16_FLOAT,
            typed: DXGI_FORMAT_R16G16B16A16_FLOAT,
        },
        Rgba32Float => DxgiFormatPair {
            typeless: DXGI_FORMAT_R32G32B32A32_FLOAT,
            typed: DXGI_FORMAT_R32G32B32A32_FLOAT,
        },
        R32Float => DxgiFormatPair {
            typeless: DXGI_FORMAT_R32_TYPELESS,
            typed: DXGI_FORMAT_R32_FLOAT,
        },
        R32Uint => DxgiFormatPair {
            typeless: DXGI_FORMAT_R32_TYPELESS,
            typed: DXGI_FORMAT_R32_UINT,
        },
        D16Unorm => DxgiFormatPair {
            typeless: DXGI_FORMAT_D16_UNORM,
            typed: DXGI_FORMAT_D16_UNORM,
        },
        D32Float => DxgiFormatPair {
            typeless: DXGI_FORMAT_D32_FLOAT,
            typed: DXGI_FORMAT_D32_FLOAT,
        },
        D24UnormS8Uint => DxgiFormatPair {
            typeless: DXGI_FORMAT_D24_UNORM_S8_UINT,
            typed: DXGI_FORMAT_D24_UNORM_S8_UINT,
        },
        D32FloatS8Uint => DxgiFormatPair {
            typeless: DXGI_FORMAT_D32_FLOAT_S8X24_UINT,
            typed: DXGI_FORMAT_D32_FLOAT_S8X24_UINT,
        },
    }
}

/// The reverse direction, used to describe swapchain back-buffers wrapped
/// from a native resource. Only formats a swapchain can actually present
/// need an entry; anything else falls back to `Unknown` with a logged
/// warning, matching §4.7's "missing table entries must fail gracefully".
pub fn from_dxgi(format: DXGI_FORMAT) -> rhi::Format {
    use rhi::Format::*;
    match format {
        DXGI_FORMAT_R8G8B8A8_UNORM => Rgba8Unorm,
        DXGI_FORMAT_R8G8B8A8_UNORM_SRGB => Rgba8UnormSrgb,
        DXGI_FORMAT_B8G8R8A8_UNORM => Bgra8Unorm,
        DXGI_FORMAT_B8G8R8A8_UNORM_SRGB => Bgra8UnormSrgb,
        DXGI_FORMAT_R16G16B16A16_FLOAT => Rgba16Float,
        DXGI_FORMAT_R32G32B32A32_FLOAT => Rgba32Float,
        other => {
            log::warn!("no rhi::Format maps to DXGI_FORMAT({:?}); reporting Unknown", other.0);
            Unknown
        }
    }
}

/// Maps a core colorspace to the closest native `DXGI_COLOR_SPACE_TYPE`.
/// DXGI has a much finer-grained enumeration than the core's; several core
/// variants intentionally collapse onto the same native value, matching
/// `vri_to_dxgi_color_space`'s "best attempt at translation" comment.
pub fn to_dxgi_color_space(space: ColorSpace) -> DXGI_COLOR_SPACE_TYPE {
    use ColorSpace::*;
    match space {
        SrgbNonlinear | Bt709NonlinearG22 => DXGI_COLOR_SPACE_RGB_FULL_G22_NONE_P709,
        SrgbLinear | Bt709Linear | AdobeRgbLinear | DisplayP3Linear => {
            DXGI_COLOR_SPACE_RGB_FULL_G10_NONE_P709
        }
        Bt2020NonlinearHlg | AdobeRgbNonlinear | DisplayP3NonlinearG22 => {
            DXGI_COLOR_SPACE_RGB_FULL_G22_NONE_P2020
        }
        Bt2020Linear => DXGI_COLOR_SPACE_RGB_FULL_G10_NONE_P709,
        Bt2020NonlinearSt2084 => DXGI_COLOR_SPACE_RGB_FULL_G2084_NONE_P2020,
    }
}

pub fn to_d3d_topology(topology: PrimitiveTopology) -> D3D_PRIMITIVE_TOPOLOGY {
    match topology {
        PrimitiveTopology::PointList => D3D_PRIMITIVE_TOPOLOGY_POINTLIST,
        PrimitiveTopology::LineList => D3D_PRIMITIVE_TOPOLOGY_LINELIST,
        PrimitiveTopology::LineStrip => D3D_PRIMITIVE_TOPOLOGY_LINESTRIP,
        PrimitiveTopology::TriangleList => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        PrimitiveTopology::TriangleStrip => D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
        PrimitiveTopology::TriangleListAdjacency => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST_ADJ,
        PrimitiveTopology::TriangleStripAdjacency => D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP_ADJ,
        // D3D11 patch-list topologies are `D3D_PRIMITIVE_TOPOLOGY_1_CONTROL_POINT_PATCHLIST + (n - 1)`;
        // tessellation pipelines are out of scope for the sub-state this backend builds today.
        PrimitiveTopology::PatchList(_) => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
    }
}

pub fn to_d3d11_cull_mode(cull: CullMode) -> D3D11_CULL_MODE {
    match cull {
        CullMode::None => D3D11_CULL_NONE,
        CullMode::Front => D3D11_CULL_FRONT,
        CullMode::Back => D3D11_CULL_BACK,
    }
}

pub fn front_counter_clockwise(front_face: FrontFace) -> bool {
    matches!(front_face, FrontFace::CounterClockwise)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presentable_formats_roundtrip() {
        for format in [
            rhi::Format::Rgba8Unorm,
            rhi::Format::Rgba8UnormSrgb,
            rhi::Format::Bgra8Unorm,
            rhi::Format::Bgra8UnormSrgb,
            rhi::Format::Rgba16Float,
            rhi::Format::Rgba32Float,
        ] {
            assert_eq!(from_dxgi(to_dxgi(format).typed), format);
        }
    }
}
