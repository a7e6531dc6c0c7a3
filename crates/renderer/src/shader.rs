//! The directional motion-blur cross-dissolve.
//!
//! The GPU runs the GLSL in [`crate::compile`]; this module holds the
//! uniform set both backends consume and a CPU evaluation of the same math
//! used by the software compositor. Keep the two in step.

use std::f32::consts::PI;

use scheduler::{Easing, TransitionState};

use crate::cover::cover_uv;
use crate::viewport::Viewport;

/// Peak blur length in UV units, reached halfway through a transition.
pub const BLUR_STRENGTH: f32 = 0.075;
/// Samples taken per texture along the blur direction.
pub const BLUR_TAPS: usize = 16;
/// UVs are kept this far inside the texture to avoid edge bleeding.
pub const UV_EDGE: f32 = 0.001;

/// Uniform values for one draw. Derived every frame, never stored as truth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    /// Slide bound as the "from" texture.
    pub from: usize,
    /// Slide bound as the "to" texture.
    pub to: usize,
    /// Scheduler-eased progress in `[0, 1]`.
    pub progress: f32,
    pub direction: [f32; 2],
    pub from_aspect: f32,
    pub to_aspect: f32,
    pub canvas_aspect: f32,
}

impl ShaderUniforms {
    pub fn derive(state: &TransitionState, aspects: &[f32], viewport: Viewport) -> Self {
        let aspect = |index: usize| aspects.get(index).copied().unwrap_or(1.0);
        Self {
            from: state.from,
            to: state.to,
            progress: state.progress.clamp(0.0, 1.0),
            direction: state.direction.vector(),
            from_aspect: aspect(state.from),
            to_aspect: aspect(state.to),
            canvas_aspect: viewport.canvas_aspect(),
        }
    }

    /// Weight of the "to" texture after the shader's smoothstep.
    pub fn blend_weight(&self) -> f32 {
        Easing::Smoothstep.sample(self.progress)
    }

    pub fn blur_amount(&self) -> f32 {
        blur_envelope(self.progress)
    }
}

/// `BLUR_STRENGTH · sin(π·p)`, pinned to exactly zero at both ends so the
/// resting frames are never smeared.
pub fn blur_envelope(progress: f32) -> f32 {
    if progress <= 0.0 || progress >= 1.0 {
        0.0
    } else {
        BLUR_STRENGTH * (PI * progress).sin()
    }
}

/// Position of `tap` along the blur segment, in `[-0.5, 0.5]`.
pub fn tap_offset(tap: usize) -> f32 {
    tap as f32 / (BLUR_TAPS - 1) as f32 - 0.5
}

/// Evaluates the fragment shader at canvas position `uv` (origin top-left).
///
/// `sample_from` / `sample_to` are called with clamped image UVs and must
/// return straight RGBA in `[0, 1]`.
pub fn shade<F, T>(
    uv: [f32; 2],
    uniforms: &ShaderUniforms,
    mut sample_from: F,
    mut sample_to: T,
) -> [f32; 4]
where
    F: FnMut([f32; 2]) -> [f32; 4],
    T: FnMut([f32; 2]) -> [f32; 4],
{
    let weight = uniforms.blend_weight();
    let blur = uniforms.blur_amount();
    let from_uv = |offset: [f32; 2]| {
        clamp_uv(cover_uv(
            [uv[0] + offset[0], uv[1] + offset[1]],
            uniforms.canvas_aspect,
            uniforms.from_aspect,
        ))
    };
    let to_uv = |offset: [f32; 2]| {
        clamp_uv(cover_uv(
            [uv[0] - offset[0], uv[1] - offset[1]],
            uniforms.canvas_aspect,
            uniforms.to_aspect,
        ))
    };

    if blur == 0.0 {
        // Every tap lands on the same texel; a single sample is exact.
        return if weight <= 0.0 {
            sample_from(from_uv([0.0, 0.0]))
        } else if weight >= 1.0 {
            sample_to(to_uv([0.0, 0.0]))
        } else {
            mix(
                sample_from(from_uv([0.0, 0.0])),
                sample_to(to_uv([0.0, 0.0])),
                weight,
            )
        };
    }

    let mut sum = [0.0f32; 4];
    for tap in 0..BLUR_TAPS {
        let t = tap_offset(tap);
        let offset = [
            uniforms.direction[0] * blur * t,
            uniforms.direction[1] * blur * t,
        ];
        let color = mix(sample_from(from_uv(offset)), sample_to(to_uv(offset)), weight);
        for (acc, channel) in sum.iter_mut().zip(color) {
            *acc += channel;
        }
    }
    sum.map(|channel| channel / BLUR_TAPS as f32)
}

fn clamp_uv(uv: [f32; 2]) -> [f32; 2] {
    uv.map(|value| value.clamp(UV_EDGE, 1.0 - UV_EDGE))
}

fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let mut out = [0.0; 4];
    for channel in 0..4 {
        out[channel] = a[channel] * (1.0 - t) + b[channel] * t;
    }
    out
}
