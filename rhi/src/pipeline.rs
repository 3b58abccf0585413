//! Graphics/compute pipelines, and the redundant-state-change elimination
//! applied whenever one is bound to a command buffer.

use crate::command::{CommandBuffer, CommandBufferBackend};
use crate::error::Result;
use crate::object::{Diagnostics, ObjectBase, ObjectType};
use crate::shader::ShaderModuleDesc;
use std::any::Any;
use std::sync::Arc;

/// Input-assembly primitive topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    TriangleListAdjacency,
    TriangleStripAdjacency,
    /// A tessellation patch list of `control_points` vertices per patch.
    PatchList(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Fill,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy)]
pub struct RasterizationStateDesc {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_clamp_enable: bool,
}

impl Default for RasterizationStateDesc {
    fn default() -> Self {
        RasterizationStateDesc {
            fill_mode: FillMode::Fill,
            cull_mode: CullMode::Back,
            front_face: FrontFace::Clockwise,
            depth_clamp_enable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputAssemblyStateDesc {
    pub topology: PrimitiveTopology,
}

impl Default for PrimitiveTopology {
    fn default() -> Self {
        PrimitiveTopology::TriangleList
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DepthStencilStateDesc {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlendStateDesc {
    pub blend_enable: bool,
}

/// Opaque, backend-created descriptor-set/root-signature stand-in. The
/// Direct3D 11 backend has nothing to build here (register slots are bound
/// directly); other backends may populate real state.
#[derive(Clone)]
pub struct PipelineLayout(#[allow(dead_code)] Arc<ObjectBase>);

impl PipelineLayout {
    pub(crate) fn from_object(base: ObjectBase) -> PipelineLayout {
        PipelineLayout(Arc::new(base))
    }
}

#[derive(Default)]
pub struct PipelineLayoutDesc {}

pub struct GraphicsPipelineDesc<'a> {
    pub layout: Option<&'a PipelineLayout>,
    pub shaders: &'a [ShaderModuleDesc<'a>],
    pub input_assembly_state: InputAssemblyStateDesc,
    pub rasterization_state: RasterizationStateDesc,
    pub depth_stencil_state: DepthStencilStateDesc,
    pub blend_state: BlendStateDesc,
}

pub struct ComputePipelineDesc<'a> {
    pub layout: Option<&'a PipelineLayout>,
    pub shader: ShaderModuleDesc<'a>,
}

/// One independently comparable piece of bindable pipeline state. Used by
/// the redundant-state-change filter to decide, slot by slot, whether the
/// newly bound pipeline actually differs from the previously bound one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineSlot {
    VertexShader,
    TessellationControlShader,
    TessellationEvaluationShader,
    GeometryShader,
    FragmentShader,
    ComputeShader,
    Topology,
    RasterizerState,
    BlendState,
    DepthStencilState,
}

impl PipelineSlot {
    pub const ALL: [PipelineSlot; 10] = [
        PipelineSlot::VertexShader,
        PipelineSlot::TessellationControlShader,
        PipelineSlot::TessellationEvaluationShader,
        PipelineSlot::GeometryShader,
        PipelineSlot::FragmentShader,
        PipelineSlot::ComputeShader,
        PipelineSlot::Topology,
        PipelineSlot::RasterizerState,
        PipelineSlot::BlendState,
        PipelineSlot::DepthStencilState,
    ];
}

/// The per-backend half of a pipeline object.
///
/// `slot_key` exposes an opaque identity for each sub-slot (typically the
/// address of a native COM object, or a small discriminant for
/// value-typed state like topology) so the core can compare two pipelines
/// slot-by-slot without knowing anything about the backend's native types.
/// `bind_slot` emits the one backend call needed to make that single slot
/// current; it is invoked only for slots the core has determined actually
/// changed.
pub trait PipelineBackend: Send + Sync {
    fn is_compute(&self) -> bool;
    fn slot_key(&self, slot: PipelineSlot) -> Option<u64>;
    fn bind_slot(&self, cmd_backend: &dyn CommandBufferBackend, slot: PipelineSlot) -> Result<()>;
    fn as_any(&self) -> &dyn Any;
}

struct PipelineShared {
    base: ObjectBase,
    #[allow(dead_code)]
    diag: Diagnostics,
    backend: Box<dyn PipelineBackend>,
}

#[derive(Clone)]
pub struct Pipeline(Arc<PipelineShared>);

impl Pipeline {
    pub fn new(diag: Diagnostics, backend: Box<dyn PipelineBackend>) -> Pipeline {
        Pipeline(Arc::new(PipelineShared {
            base: ObjectBase::new(ObjectType::Pipeline),
            diag,
            backend,
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.base.id
    }

    pub fn backend(&self) -> &dyn PipelineBackend {
        self.0.backend.as_ref()
    }

    pub fn is_compute(&self) -> bool {
        self.0.backend.is_compute()
    }
}

/// Binds `pipeline` to `cmd`, emitting a backend set call for each sub-slot
/// whose identity differs from whatever was bound previously on this
/// command buffer (or every present slot, if nothing was bound yet). This
/// is a pure optimization: it must never change the GPU state observed
/// relative to binding every slot unconditionally, which is why the
/// comparison — not just the dispatch — lives here once instead of being
/// re-implemented by every backend.
pub fn bind_pipeline(cmd: &CommandBuffer, pipeline: &Pipeline) -> Result<()> {
    cmd.require_recording()?;

    let previous = cmd.bound_pipeline();
    for slot in PipelineSlot::ALL {
        let new_key = pipeline.backend().slot_key(slot);
        let new_key = match new_key {
            Some(k) => k,
            None => continue,
        };
        let changed = match &previous {
            None => true,
            Some(prev) => prev.backend().slot_key(slot) != Some(new_key),
        };
        if changed {
            pipeline.backend().bind_slot(cmd.backend(), slot)?;
        }
    }

    cmd.set_bound_pipeline(pipeline.clone());
    Ok(())
}
