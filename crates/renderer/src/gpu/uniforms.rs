use bytemuck::{Pod, Zeroable};

use crate::shader::ShaderUniforms;

/// std140 mirror of the `TransitionParams` block in the fragment shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct TransitionParams {
    pub direction: [f32; 2],
    pub progress: f32,
    pub from_aspect: f32,
    pub to_aspect: f32,
    pub canvas_aspect: f32,
    pub _padding: [f32; 2],
}

impl From<&ShaderUniforms> for TransitionParams {
    fn from(uniforms: &ShaderUniforms) -> Self {
        Self {
            direction: uniforms.direction,
            progress: uniforms.progress,
            from_aspect: uniforms.from_aspect,
            to_aspect: uniforms.to_aspect,
            canvas_aspect: uniforms.canvas_aspect,
            _padding: [0.0; 2],
        }
    }
}
