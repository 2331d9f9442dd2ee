//! Int8 x f32 matvec kernels.
//!
//! Every kernel takes length-carrying slices: `rows` is `out.len()` and `cols`
//! is the input vector's length. [`Kernel::dot`] asserts equal lengths. The
//! matvec row loops only `debug_assert!` the matrix shape; in release builds a
//! matrix, bias or row shorter than its vector panics on slice indexing rather
//! than reading out of bounds. Use [`crate::matrix`] for checked entry points
//! that report a [`crate::KernelError`] instead.

pub mod portable;
pub mod scalar;

#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
pub mod x86;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
pub mod neon;

#[cfg(all(feature = "simd", target_arch = "wasm32", target_feature = "simd128"))]
pub mod wasm;

use crate::backend::{Backend, DotFn};

/// Elements consumed per vector iteration: one 128-bit load of i8 lanes.
pub const BLOCK: usize = 16;

/// One side of the fused gate product: a row-major `rows x x.len()` weight
/// matrix, the vector it multiplies and its dequantization scale.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'a> {
    pub weights: &'a [i8],
    pub x: &'a [f32],
    pub scale: f32,
}

impl<'a> Operand<'a> {
    pub fn new(weights: &'a [i8], x: &'a [f32], scale: f32) -> Self {
        Self { weights, x, scale }
    }

    #[inline(always)]
    fn row(&self, i: usize) -> &'a [i8] {
        let cols = self.x.len();
        &self.weights[i * cols..][..cols]
    }
}

/// A resolved dot-product backend. Cheap to copy; resolve once and reuse it
/// across calls to keep feature detection out of the row loop.
#[derive(Clone, Copy)]
pub struct Kernel {
    backend: Backend,
    dot: DotFn,
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel").field("backend", &self.backend).finish()
    }
}

impl Default for Kernel {
    fn default() -> Self { Self::best() }
}

impl Kernel {
    /// Kernel for `backend`, falling back to [`Backend::Portable`] when the
    /// requested instruction set is not usable on this machine.
    pub fn new(backend: Backend) -> Self {
        match backend.dot_fn() {
            Some(dot) => Self { backend, dot },
            None => {
                log::warn!("backend {} not available here, using {}", backend, Backend::Portable);
                Self::new(Backend::Portable)
            }
        }
    }

    pub fn best() -> Self { Self::new(Backend::best()) }

    pub fn backend(&self) -> Backend { self.backend }

    /// `Σ w[j] * x[j]`.
    #[inline]
    pub fn dot(&self, w: &[i8], x: &[f32]) -> f32 {
        assert_eq!(w.len(), x.len(), "weight row and input length differ");
        (self.dot)(w, x)
    }

    /// `out[i] = dot(a row i, x) * scale`. `out` is overwritten, never accumulated into.
    pub fn matvec_i8(&self, out: &mut [f32], a: &[i8], x: &[f32], scale: f32) {
        let cols = x.len();
        debug_assert_eq!(a.len(), out.len() * cols, "matrix is not rows x cols");
        for (i, o) in out.iter_mut().enumerate() {
            *o = (self.dot)(&a[i * cols..][..cols], x) * scale;
        }
    }

    /// `out[i] = dot(ih row i, ih.x) * ih.scale + dot(hh row i, hh.x) * hh.scale + bias[i]`.
    pub fn matvec_fused_i8(&self, out: &mut [f32], ih: Operand<'_>, hh: Operand<'_>, bias: &[f32]) {
        let rows = out.len();
        debug_assert_eq!(ih.weights.len(), rows * ih.x.len(), "w_ih is not rows x cols_ih");
        debug_assert_eq!(hh.weights.len(), rows * hh.x.len(), "w_hh is not rows x cols_hh");
        debug_assert_eq!(bias.len(), rows, "bias length differs from rows");
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.gate_row(i, &ih, &hh) + bias[i];
        }
    }

    /// Both scaled products of row `i`, before the bias.
    #[inline(always)]
    pub(crate) fn gate_row(&self, i: usize, ih: &Operand<'_>, hh: &Operand<'_>) -> f32 {
        let s_ih = (self.dot)(ih.row(i), ih.x) * ih.scale;
        let s_hh = (self.dot)(hh.row(i), hh.x) * hh.scale;
        s_ih + s_hh
    }
}

/// Dot product on the best backend for this machine.
pub fn dot_i8_f32(w: &[i8], x: &[f32]) -> f32 {
    Kernel::best().dot(w, x)
}

/// Simple scaled matvec on the best backend for this machine.
pub fn matvec_i8(out: &mut [f32], a: &[i8], x: &[f32], scale: f32) {
    Kernel::best().matvec_i8(out, a, x, scale)
}

/// Fused gate matvec on the best backend for this machine.
pub fn matvec_fused_i8(out: &mut [f32], ih: Operand<'_>, hh: Operand<'_>, bias: &[f32]) {
    Kernel::best().matvec_fused_i8(out, ih, hh, bias)
}
