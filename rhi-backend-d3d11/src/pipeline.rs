//! Graphics/compute pipeline state, and the slot identities the core's
//! redundant-state-change filter (`rhi::bind_pipeline`) compares against
//! the previously bound pipeline. Grounded on `vri_d3d11_pipeline.c`: each
//! shader stage is its own D3D11 shader object, and the filter's "does this
//! slot differ" question becomes "do these two COM pointers differ".

use rhi::{ComputePipelineDesc, Error, GraphicsPipelineDesc, PipelineSlot, Result, ShaderStage};
use std::any::Any;
use windows::core::Interface;
use windows::Win32::Graphics::Direct3D::D3D_PRIMITIVE_TOPOLOGY;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11BlendState, ID3D11ComputeShader, ID3D11DepthStencilState, ID3D11Device5, ID3D11DomainShader,
    ID3D11GeometryShader, ID3D11HullShader, ID3D11PixelShader, ID3D11RasterizerState, ID3D11VertexShader,
    D3D11_BLEND_DESC, D3D11_BLEND_INV_SRC_ALPHA, D3D11_BLEND_ONE, D3D11_BLEND_OP_ADD, D3D11_BLEND_SRC_ALPHA,
    D3D11_BLEND_ZERO, D3D11_COLOR_WRITE_ENABLE_ALL, D3D11_COMPARISON_LESS, D3D11_DEPTH_STENCIL_DESC,
    D3D11_DEPTH_WRITE_MASK_ALL, D3D11_DEPTH_WRITE_MASK_ZERO, D3D11_RASTERIZER_DESC,
    D3D11_RENDER_TARGET_BLEND_DESC,
};

use crate::format::{front_counter_clockwise, to_d3d11_cull_mode, to_d3d_topology};
use crate::hresult::hr;

#[derive(Default)]
struct Shaders {
    vertex: Option<ID3D11VertexShader>,
    hull: Option<ID3D11HullShader>,
    domain: Option<ID3D11DomainShader>,
    geometry: Option<ID3D11GeometryShader>,
    pixel: Option<ID3D11PixelShader>,
    compute: Option<ID3D11ComputeShader>,
}

pub struct D3D11Pipeline {
    shaders: Shaders,
    topology: D3D_PRIMITIVE_TOPOLOGY,
    rasterizer_state: Option<ID3D11RasterizerState>,
    blend_state: Option<ID3D11BlendState>,
    depth_stencil_state: Option<ID3D11DepthStencilState>,
}

unsafe impl Send for D3D11Pipeline {}
unsafe impl Sync for D3D11Pipeline {}

impl D3D11Pipeline {
    pub fn create_graphics(device: &ID3D11Device5, desc: &GraphicsPipelineDesc<'_>) -> Result<D3D11Pipeline> {
        if !desc.shaders.iter().any(|s| s.stage == ShaderStage::Vertex) {
            return Err(Error::InvalidApiUsage(
                "graphics pipeline creation requires a vertex shader".into(),
            ));
        }

        let mut shaders = Shaders::default();
        for shader in desc.shaders {
            unsafe {
                match shader.stage {
                    ShaderStage::Vertex => {
                        shaders.vertex = Some(hr(
                            device.CreateVertexShader(shader.bytecode, None),
                            "CreateVertexShader",
                        )?);
                    }
                    ShaderStage::TessellationControl => {
                        shaders.hull = Some(hr(
                            device.CreateHullShader(shader.bytecode, None),
                            "CreateHullShader",
                        )?);
                    }
                    ShaderStage::TessellationEvaluation => {
                        shaders.domain = Some(hr(
                            device.CreateDomainShader(shader.bytecode, None),
                            "CreateDomainShader",
                        )?);
                    }
                    ShaderStage::Geometry => {
                        shaders.geometry = Some(hr(
                            device.CreateGeometryShader(shader.bytecode, None),
                            "CreateGeometryShader",
                        )?);
                    }
                    ShaderStage::Fragment => {
                        shaders.pixel = Some(hr(
                            device.CreatePixelShader(shader.bytecode, None),
                            "CreatePixelShader",
                        )?);
                    }
                    ShaderStage::Compute => {
                        return Err(Error::InvalidApiUsage(
                            "compute shader stage supplied to a graphics pipeline".into(),
                        ));
                    }
                }
            }
        }

        let topology = to_d3d_topology(desc.input_assembly_state.topology);

        let rasterizer_desc = D3D11_RASTERIZER_DESC {
            FillMode: match desc.rasterization_state.fill_mode {
                rhi::FillMode::Fill => windows::Win32::Graphics::Direct3D11::D3D11_FILL_SOLID,
                rhi::FillMode::Wireframe => windows::Win32::Graphics::Direct3D11::D3D11_FILL_WIREFRAME,
            },
            CullMode: to_d3d11_cull_mode(desc.rasterization_state.cull_mode),
            FrontCounterClockwise: front_counter_clockwise(desc.rasterization_state.front_face).into(),
            DepthClipEnable: (!desc.rasterization_state.depth_clamp_enable).into(),
            ..Default::default()
        };
        let rasterizer_state = unsafe {
            hr(
                device.CreateRasterizerState(&rasterizer_desc),
                "CreateRasterizerState",
            )?
        };

        let mut blend_desc = D3D11_BLEND_DESC::default();
        blend_desc.RenderTarget[0] = D3D11_RENDER_TARGET_BLEND_DESC {
            BlendEnable: desc.blend_state.blend_enable.into(),
            SrcBlend: D3D11_BLEND_SRC_ALPHA,
            DestBlend: D3D11_BLEND_INV_SRC_ALPHA,
            BlendOp: D3D11_BLEND_OP_ADD,
            SrcBlendAlpha: D3D11_BLEND_ONE,
            DestBlendAlpha: D3D11_BLEND_ZERO,
            BlendOpAlpha: D3D11_BLEND_OP_ADD,
            RenderTargetWriteMask: D3D11_COLOR_WRITE_ENABLE_ALL.0 as u8,
        };
        let blend_state = unsafe { hr(device.CreateBlendState(&blend_desc), "CreateBlendState")? };

        let depth_stencil_desc = D3D11_DEPTH_STENCIL_DESC {
            DepthEnable: desc.depth_stencil_state.depth_test_enable.into(),
            DepthWriteMask: if desc.depth_stencil_state.depth_write_enable {
                D3D11_DEPTH_WRITE_MASK_ALL
            } else {
                D3D11_DEPTH_WRITE_MASK_ZERO
            },
            DepthFunc: D3D11_COMPARISON_LESS,
            ..Default::default()
        };
        let depth_stencil_state = unsafe {
            hr(
                device.CreateDepthStencilState(&depth_stencil_desc),
                "CreateDepthStencilState",
            )?
        };

        Ok(D3D11Pipeline {
            shaders,
            topology,
            rasterizer_state: Some(rasterizer_state),
            blend_state: Some(blend_state),
            depth_stencil_state: Some(depth_stencil_state),
        })
    }

    pub fn create_compute(device: &ID3D11Device5, desc: &ComputePipelineDesc<'_>) -> Result<D3D11Pipeline> {
        if desc.shader.stage != ShaderStage::Compute {
            return Err(Error::InvalidApiUsage(
                "compute pipeline requires a Compute-stage shader module".into(),
            ));
        }
        let compute = unsafe {
            hr(
                device.CreateComputeShader(desc.shader.bytecode, None),
                "CreateComputeShader",
            )?
        };
        Ok(D3D11Pipeline {
            shaders: Shaders {
                compute: Some(compute),
                ..Default::default()
            },
            topology: D3D_PRIMITIVE_TOPOLOGY::default(),
            rasterizer_state: None,
            blend_state: None,
            depth_stencil_state: None,
        })
    }
}

/// Returns a stable, comparable key for a COM pointer's identity (its
/// vtable address), matching the way the original compares raw
/// `ID3D11*Shader*` pointers slot by slot.
fn com_identity<T: Interface>(obj: &T) -> u64 {
    obj.as_raw() as u64
}

impl rhi::PipelineBackend for D3D11Pipeline {
    fn is_compute(&self) -> bool {
        self.shaders.compute.is_some()
    }

    fn slot_key(&self, slot: PipelineSlot) -> Option<u64> {
        match slot {
            PipelineSlot::VertexShader => self.shaders.vertex.as_ref().map(com_identity),
            PipelineSlot::TessellationControlShader => self.shaders.hull.as_ref().map(com_identity),
            PipelineSlot::TessellationEvaluationShader => self.shaders.domain.as_ref().map(com_identity),
            PipelineSlot::GeometryShader => self.shaders.geometry.as_ref().map(com_identity),
            PipelineSlot::FragmentShader => self.shaders.pixel.as_ref().map(com_identity),
            PipelineSlot::ComputeShader => self.shaders.compute.as_ref().map(com_identity),
            PipelineSlot::Topology => {
                if self.is_compute() {
                    None
                } else {
                    Some(self.topology.0 as u64)
                }
            }
            PipelineSlot::RasterizerState => self.rasterizer_state.as_ref().map(com_identity),
            PipelineSlot::BlendState => self.blend_state.as_ref().map(com_identity),
            PipelineSlot::DepthStencilState => self.depth_stencil_state.as_ref().map(com_identity),
        }
    }

    fn bind_slot(&self, cmd_backend: &dyn rhi::CommandBufferBackend, slot: PipelineSlot) -> Result<()> {
        let ctx = crate::command::downcast(cmd_backend)?.context();
        unsafe {
            match slot {
                PipelineSlot::VertexShader => {
                    ctx.VSSetShader(self.shaders.vertex.as_ref(), None);
                }
                PipelineSlot::TessellationControlShader => {
                    ctx.HSSetShader(self.shaders.hull.as_ref(), None);
                }
                PipelineSlot::TessellationEvaluationShader => {
                    ctx.DSSetShader(self.shaders.domain.as_ref(), None);
                }
                PipelineSlot::GeometryShader => {
                    ctx.GSSetShader(self.shaders.geometry.as_ref(), None);
                }
                PipelineSlot::FragmentShader => {
                    ctx.PSSetShader(self.shaders.pixel.as_ref(), None);
                }
                PipelineSlot::ComputeShader => {
                    ctx.CSSetShader(self.shaders.compute.as_ref(), None);
                }
                PipelineSlot::Topology => {
                    ctx.IASetPrimitiveTopology(self.topology);
                }
                PipelineSlot::RasterizerState => {
                    ctx.RSSetState(self.rasterizer_state.as_ref());
                }
                PipelineSlot::BlendState => {
                    ctx.OMSetBlendState(self.blend_state.as_ref(), None, 0xFFFF_FFFF);
                }
                PipelineSlot::DepthStencilState => {
                    ctx.OMSetDepthStencilState(self.depth_stencil_state.as_ref(), 0);
                }
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
