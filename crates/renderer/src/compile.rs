use std::borrow::Cow;
use std::f32::consts::PI;

use wgpu::naga::ShaderStage;

use crate::shader::{BLUR_STRENGTH, BLUR_TAPS, UV_EDGE};

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the motion-blur transition fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("motion blur transition fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(fragment_source()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// Assembles the fragment shader with the tuning constants from
/// [`crate::shader`].
pub(crate) fn fragment_source() -> String {
    format!(
        "{HEADER}\
         const int BLUR_TAPS = {BLUR_TAPS};\n\
         const float BLUR_STRENGTH = {BLUR_STRENGTH:?};\n\
         const float UV_EDGE = {UV_EDGE:?};\n\
         const float PI = {PI:?};\n\
         {BODY}"
    )
}

/// Declarations. The uniform block layout must match `TransitionParams` in
/// `gpu/uniforms.rs`.
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform TransitionParams {
    vec2 direction;
    float progress;
    float from_aspect;
    float to_aspect;
    float canvas_aspect;
    vec2 _padding;
} params;

layout(set = 1, binding = 0) uniform texture2D from_texture;
layout(set = 1, binding = 1) uniform sampler from_sampler;
layout(set = 1, binding = 2) uniform texture2D to_texture;
layout(set = 1, binding = 3) uniform sampler to_sampler;

";

const BODY: &str = r"
vec2 cover_uv(vec2 uv, float image_aspect) {
    float ratio = params.canvas_aspect / image_aspect;
    if (ratio >= 1.0) {
        return vec2(uv.x, 0.5 + (uv.y - 0.5) / ratio);
    }
    return vec2(0.5 + (uv.x - 0.5) * ratio, uv.y);
}

vec4 sample_from(vec2 uv) {
    vec2 image_uv = clamp(cover_uv(uv, params.from_aspect), vec2(UV_EDGE), vec2(1.0 - UV_EDGE));
    return textureLod(sampler2D(from_texture, from_sampler), image_uv, 0.0);
}

vec4 sample_to(vec2 uv) {
    vec2 image_uv = clamp(cover_uv(uv, params.to_aspect), vec2(UV_EDGE), vec2(1.0 - UV_EDGE));
    return textureLod(sampler2D(to_texture, to_sampler), image_uv, 0.0);
}

void main() {
    float p = clamp(params.progress, 0.0, 1.0);
    float weight = smoothstep(0.0, 1.0, p);
    float blur = (p <= 0.0 || p >= 1.0) ? 0.0 : BLUR_STRENGTH * sin(p * PI);

    vec4 color = vec4(0.0);
    for (int i = 0; i < BLUR_TAPS; ++i) {
        float t = float(i) / float(BLUR_TAPS - 1) - 0.5;
        vec2 offset = params.direction * blur * t;
        color += mix(sample_from(v_uv + offset), sample_to(v_uv - offset), weight);
    }
    outColor = color / float(BLUR_TAPS);
}
";

/// Full-screen triangle. `v_uv` has its origin in the top-left corner to
/// match image row order.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = vec2(pos.x * 0.5 + 0.5, 0.5 - pos.y * 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";
