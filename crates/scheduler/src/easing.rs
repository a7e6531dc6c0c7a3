/// Remapping applied to linear transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// `3t² − 2t³`; the shader applies this to the blend weight.
    Smoothstep,
    /// Cubic ease-in-out; the scheduler applies this before writing progress.
    #[default]
    CubicInOut,
}

impl Easing {
    /// Samples the curve. Input is clamped to `[0, 1]` and both endpoints map
    /// to exactly `0.0` and `1.0`.
    pub fn sample(self, t: f32) -> f32 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => clamped,
            Easing::Smoothstep => clamped * clamped * (3.0 - 2.0 * clamped),
            Easing::CubicInOut => {
                if clamped < 0.5 {
                    4.0 * clamped * clamped * clamped
                } else {
                    1.0 - (-2.0 * clamped + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}
