//! Seeded synthetic operands for the bench/verify tooling and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use crate::kernels::Operand;

pub fn rng(seed: u64) -> StdRng { StdRng::seed_from_u64(seed) }

/// Uniform over the full i8 range, -128 included.
pub fn weights<R: Rng>(rng: &mut R, n: usize) -> Vec<i8> {
    (0..n).map(|_| rng.gen::<i8>()).collect()
}

/// Standard-normal activations.
pub fn activations<R: Rng>(rng: &mut R, n: usize) -> Vec<f32> {
    (0..n).map(|_| StandardNormal.sample(rng)).collect()
}

/// A complete fused-gate problem: `rows x cols_ih` input weights,
/// `rows x cols_hh` recurrent weights, both vectors and the bias.
#[derive(Debug, Clone)]
pub struct Problem {
    pub rows: usize,
    pub w_ih: Vec<i8>,
    pub input: Vec<f32>,
    pub scale_ih: f32,
    pub w_hh: Vec<i8>,
    pub h: Vec<f32>,
    pub scale_hh: f32,
    pub bias: Vec<f32>,
}

impl Problem {
    pub fn random(rows: usize, cols_ih: usize, cols_hh: usize, seed: u64) -> Self {
        let mut r = rng(seed);
        let w_ih = weights(&mut r, rows * cols_ih);
        let input = activations(&mut r, cols_ih);
        let w_hh = weights(&mut r, rows * cols_hh);
        let h = activations(&mut r, cols_hh);
        let bias = activations(&mut r, rows);
        // Roughly what a symmetric per-tensor quantizer yields for unit-scale weights
        let scale_ih = r.gen_range(0.001f32..0.05);
        let scale_hh = r.gen_range(0.001f32..0.05);
        Self { rows, w_ih, input, scale_ih, w_hh, h, scale_hh, bias }
    }

    /// LSTM-shaped problem: `4 * hidden` rows, `hidden` recurrent columns.
    pub fn lstm(input_dim: usize, hidden: usize, seed: u64) -> Self {
        Self::random(4 * hidden, input_dim, hidden, seed)
    }

    pub fn cols_ih(&self) -> usize { self.input.len() }
    pub fn cols_hh(&self) -> usize { self.h.len() }

    pub fn ih(&self) -> Operand<'_> { Operand::new(&self.w_ih, &self.input, self.scale_ih) }
    pub fn hh(&self) -> Operand<'_> { Operand::new(&self.w_hh, &self.h, self.scale_hh) }
}

/// Tolerance for comparing a vector-order dot product against the scalar
/// reference: `rel` of the absolute term mass, plus a tiny floor for all-zero rows.
pub fn dot_tolerance(w: &[i8], x: &[f32], rel: f32) -> f32 {
    let mass: f32 = w.iter().zip(x).map(|(&a, &b)| (a as f32 * b).abs()).sum();
    rel * mass + 1e-6
}
