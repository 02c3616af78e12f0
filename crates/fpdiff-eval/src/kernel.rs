//! In-process kernels for `c1 * (x + c2)`.
//!
//! Rust never reassociates float arithmetic on its own, so each rewrite an
//! optimizer might apply is spelled out as its own kernel.

use std::hint::black_box;

/// Outer multiplier.
pub const C1: f32 = 0.1;
/// Inner addend.
pub const C2: f32 = 0.1;
/// `C1 * C2` rounded once to single precision, as a folding optimizer stores it.
pub const FOLDED: f32 = C1 * C2;

const LANES: usize = 8;

/// Literal left-to-right evaluation. The constants are opaque to the optimizer.
#[inline]
#[must_use]
pub fn calculate(x: f32) -> f32 {
    black_box(C1) * (x + black_box(C2))
}

/// Distributed and constant-folded: `c1 * x + (c1 * c2)`.
#[inline]
#[must_use]
pub fn calculate_folded(x: f32) -> f32 {
    C1 * x + FOLDED
}

/// Folded and contracted into a single fused multiply-add.
#[inline]
#[must_use]
pub fn calculate_fused(x: f32) -> f32 {
    C1.mul_add(x, FOLDED)
}

/// Evaluation strategy for [`crate::KernelEvaluator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Reference,
    Folded,
    Fused,
    Vectorized,
}

impl Strategy {
    /// All strategies, reference first.
    pub const ALL: [Self; 4] = [Self::Reference, Self::Folded, Self::Fused, Self::Vectorized];

    /// Stable name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Folded => "folded",
            Self::Fused => "fused",
            Self::Vectorized => "vectorized",
        }
    }

    /// Append the transform of `inputs` to `out`.
    pub(crate) fn apply(self, inputs: &[f32], out: &mut Vec<f32>) {
        match self {
            Self::Reference => out.extend(inputs.iter().map(|&x| calculate(x))),
            Self::Folded => out.extend(inputs.iter().map(|&x| calculate_folded(x))),
            Self::Fused => out.extend(inputs.iter().map(|&x| calculate_fused(x))),
            Self::Vectorized => apply_lanes(inputs, out),
        }
    }
}

/// Fixed-width lanes with a scalar tail; no reassociation.
fn apply_lanes(inputs: &[f32], out: &mut Vec<f32>) {
    let c1 = black_box([C1; LANES]);
    let c2 = black_box([C2; LANES]);

    let mut chunks = inputs.chunks_exact(LANES);
    for chunk in &mut chunks {
        let mut lane = [0.0f32; LANES];
        for (((dst, &x), &a), &b) in lane.iter_mut().zip(chunk).zip(&c1).zip(&c2) {
            *dst = a * (x + b);
        }
        out.extend_from_slice(&lane);
    }
    out.extend(chunks.remainder().iter().map(|&x| calculate(x)));
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADVERSARIAL: u32 = 0x3ecc_c980;

    #[test]
    fn test_folded_constant_bits() {
        assert_eq!(C1.to_bits(), 0x3dcc_cccd);
        assert_eq!(FOLDED.to_bits(), 0x3c23_d70b);
    }

    #[test]
    fn test_adversarial_input_diverges_when_folded() {
        let x = f32::from_bits(ADVERSARIAL);
        assert_eq!(calculate(x).to_bits(), 0x3d4c_ca29);
        assert_eq!(calculate_folded(x).to_bits(), 0x3d4c_ca2a);
        // One ulp apart.
        assert_eq!(calculate_folded(x).to_bits() - calculate(x).to_bits(), 1);
    }

    #[test]
    fn test_fused_agrees_on_adversarial_input() {
        let x = f32::from_bits(ADVERSARIAL);
        assert_eq!(calculate_fused(x).to_bits(), calculate(x).to_bits());
    }

    #[test]
    fn test_agreeing_input() {
        // 0.30847242: all three orderings round to the same value.
        let x = f32::from_bits(0x3e9d_f019);
        assert_eq!(calculate(x).to_bits(), 0x3d27_4f70);
        assert_eq!(calculate_folded(x).to_bits(), 0x3d27_4f70);
        assert_eq!(calculate_fused(x).to_bits(), 0x3d27_4f70);
    }

    #[test]
    fn test_lanes_match_scalar_reference() {
        // 8 full lanes plus a tail of 3.
        let inputs: Vec<f32> = (0..19u16).map(|i| f32::from(i) / 19.0).collect();
        let mut scalar = Vec::new();
        let mut lanes = Vec::new();
        Strategy::Reference.apply(&inputs, &mut scalar);
        Strategy::Vectorized.apply(&inputs, &mut lanes);
        assert_eq!(
            scalar.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            lanes.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_strategy_names_unique() {
        let mut names: Vec<_> = Strategy::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Strategy::ALL.len());
    }
}
