//! The backend-agnostic format and colorspace vocabulary. Each backend
//! owns its own bidirectional mapping table from these semantic values to
//! its native ones (see `rhi-backend-d3d11::format`).

/// A texture/view pixel format. Deliberately small relative to a native
/// API's full enum: only the formats this crate's texture/swapchain paths
/// actually need to name are represented, mirroring how the original
/// implementation's format table is scoped to what the RHI surface uses
/// rather than the full native format space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Unknown,
    R8Unorm,
    Rg8Unorm,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    Rgba32Float,
    R32Float,
    R32Uint,
    D16Unorm,
    D32Float,
    D24UnormS8Uint,
    D32FloatS8Uint,
}

impl Default for Format {
    fn default() -> Self {
        Format::Unknown
    }
}

/// Output colorspace for a swapchain, mirroring the eleven-value
/// enumeration the original implementation surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    SrgbNonlinear,
    SrgbLinear,
    Bt709Linear,
    Bt709NonlinearG22,
    Bt2020Linear,
    Bt2020NonlinearSt2084,
    Bt2020NonlinearHlg,
    AdobeRgbLinear,
    AdobeRgbNonlinear,
    DisplayP3Linear,
    DisplayP3NonlinearG22,
}

impl Default for ColorSpace {
    fn default() -> Self {
        ColorSpace::SrgbNonlinear
    }
}
