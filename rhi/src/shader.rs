//! Shader stages and the opaque bytecode a pipeline consumes.
//!
//! The core never interprets bytecode; it is forwarded verbatim to the
//! backend, which compiles/links it with whatever native shader-creation
//! entry point matches `stage`.

/// Which programmable stage a shader module targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
    Compute,
}

/// A single shader stage's bytecode, as supplied to pipeline creation.
/// Borrowed rather than owned: the module only needs to remain valid for
/// the duration of the pipeline-creation call, and the borrow checker
/// enforces that instead of a documented-only lifetime contract.
#[derive(Debug, Clone, Copy)]
pub struct ShaderModuleDesc<'a> {
    pub stage: ShaderStage,
    pub bytecode: &'a [u8],
    pub entry_point: &'a str,
}
