//! Semantic texture description and the memory/usage taxonomy backends
//! map onto native resource-creation flags.

use crate::error::Result;
use crate::format::Format;
use crate::object::{Diagnostics, ObjectBase, ObjectType};
use std::any::Any;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Texture1D,
    Texture2D,
    Texture3D,
    TextureCube,
}

bitflags::bitflags! {
    /// OR-mask of the ways a texture will be bound; maps onto the
    /// backend's native bind-flag mask.
    pub struct TextureUsage: u32 {
        const SHADER_RESOURCE = 0x1;
        const SHADER_RESOURCE_STORAGE = 0x2;
        const COLOR_ATTACHMENT = 0x4;
        const DEPTH_STENCIL_ATTACHMENT = 0x8;
        const SHADING_RATE_ATTACHMENT = 0x10;
    }
}

/// Where a texture's backing memory lives and how the CPU may touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryType {
    /// Device-local; no CPU access.
    GpuOnly,
    /// Host-visible, optimized for CPU-write/GPU-read.
    Upload,
    /// Host-visible, optimized for GPU-write/CPU-read.
    Readback,
}

#[derive(Debug, Clone, Copy)]
pub struct TextureDesc {
    pub kind: TextureKind,
    pub format: Format,
    pub width: u32,
    pub height: u32,
    pub depth_or_layers: u32,
    pub mip_levels: u32,
    pub sample_count: u32,
    pub usage: TextureUsage,
    pub memory_type: MemoryType,
}

impl Default for TextureDesc {
    fn default() -> Self {
        TextureDesc {
            kind: TextureKind::Texture2D,
            format: Format::Rgba8Unorm,
            width: 1,
            height: 1,
            depth_or_layers: 1,
            mip_levels: 1,
            sample_count: 1,
            usage: TextureUsage::SHADER_RESOURCE,
            memory_type: MemoryType::GpuOnly,
        }
    }
}

pub trait TextureBackend: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

struct TextureShared {
    base: ObjectBase,
    #[allow(dead_code)]
    diag: Diagnostics,
    desc: TextureDesc,
    backend: Box<dyn TextureBackend>,
}

#[derive(Clone)]
pub struct Texture(Arc<TextureShared>);

impl Texture {
    pub fn new(diag: Diagnostics, desc: TextureDesc, backend: Box<dyn TextureBackend>) -> Texture {
        Texture(Arc::new(TextureShared {
            base: ObjectBase::new(ObjectType::Texture),
            diag,
            desc,
            backend,
        }))
    }

    /// Wraps a texture the backend already owns (a swapchain back buffer)
    /// without going through `Device::create_texture`; `desc` should
    /// reflect the resource's actual properties, derived from it rather
    /// than requested.
    pub fn from_native(diag: Diagnostics, desc: TextureDesc, backend: Box<dyn TextureBackend>) -> Result<Texture> {
        Ok(Texture::new(diag, desc, backend))
    }

    pub fn id(&self) -> u64 {
        self.0.base.id
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.0.desc
    }

    pub fn backend(&self) -> &dyn TextureBackend {
        self.0.backend.as_ref()
    }
}
