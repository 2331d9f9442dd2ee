use std::fmt;
use std::str::FromStr;

use log::info;
use serde::Serialize;

use crate::error::KernelError;
use crate::kernels::{portable, scalar};

pub(crate) type DotFn = fn(&[i8], &[f32]) -> f32;

/// Implementation of the widening dot product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Left-to-right scalar reference.
    Scalar,
    /// Four-accumulator algorithm on plain arrays; always available.
    Portable,
    /// x86 SSE4.1, detected at runtime.
    Sse41,
    /// AArch64 NEON.
    Neon,
    /// WebAssembly SIMD128, fixed at compile time.
    Simd128,
}

impl Backend {
    pub const ALL: &'static [Backend] = &[Backend::Scalar, Backend::Portable, Backend::Sse41, Backend::Neon, Backend::Simd128];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Portable => "portable",
            Backend::Sse41 => "sse41",
            Backend::Neon => "neon",
            Backend::Simd128 => "simd128",
        }
    }

    pub fn is_available(self) -> bool { self.dot_fn().is_some() }

    /// All backends usable on this machine, slowest first.
    pub fn available() -> Vec<Backend> {
        Self::ALL.iter().copied().filter(|b| b.is_available()).collect()
    }

    /// Fastest available backend. No logging, safe to call per matvec.
    pub fn best() -> Backend {
        [Backend::Simd128, Backend::Neon, Backend::Sse41]
            .into_iter()
            .find(|b| b.is_available())
            .unwrap_or(Backend::Portable)
    }

    /// Same as [`Backend::best`], but reports the choice.
    pub fn detect() -> Backend {
        let b = Self::best();
        info!("Using {} dot-product backend", b);
        b
    }

    /// One dot product on this backend (or the portable one if unavailable).
    pub fn dot(self, w: &[i8], x: &[f32]) -> f32 {
        assert_eq!(w.len(), x.len(), "weight row and input length differ");
        self.dot_fn().unwrap_or(portable::dot_i8_f32)(w, x)
    }

    pub(crate) fn dot_fn(self) -> Option<DotFn> {
        match self {
            Backend::Scalar => Some(scalar::dot_i8_f32),
            Backend::Portable => Some(portable::dot_i8_f32),
            Backend::Sse41 => sse41_dot(),
            Backend::Neon => neon_dot(),
            Backend::Simd128 => simd128_dot(),
        }
    }
}

#[cfg(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64")))]
fn sse41_dot() -> Option<DotFn> {
    use crate::kernels::x86;
    fn dot(w: &[i8], x: &[f32]) -> f32 {
        // Only handed out after `x86::available()` returned true.
        unsafe { x86::dot_i8_f32(w, x) }
    }
    if x86::available() { Some(dot) } else { None }
}

#[cfg(not(all(feature = "simd", any(target_arch = "x86", target_arch = "x86_64"))))]
fn sse41_dot() -> Option<DotFn> { None }

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
fn neon_dot() -> Option<DotFn> {
    use crate::kernels::neon;
    fn dot(w: &[i8], x: &[f32]) -> f32 {
        unsafe { neon::dot_i8_f32(w, x) }
    }
    if neon::available() { Some(dot) } else { None }
}

#[cfg(not(all(feature = "simd", target_arch = "aarch64")))]
fn neon_dot() -> Option<DotFn> { None }

#[cfg(all(feature = "simd", target_arch = "wasm32", target_feature = "simd128"))]
fn simd128_dot() -> Option<DotFn> {
    use crate::kernels::wasm;
    fn dot(w: &[i8], x: &[f32]) -> f32 {
        unsafe { wasm::dot_i8_f32(w, x) }
    }
    if wasm::available() { Some(dot) } else { None }
}

#[cfg(not(all(feature = "simd", target_arch = "wasm32", target_feature = "simd128")))]
fn simd128_dot() -> Option<DotFn> { None }

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for Backend {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(Backend::Scalar),
            "portable" => Ok(Backend::Portable),
            "sse41" | "sse4.1" => Ok(Backend::Sse41),
            "neon" => Ok(Backend::Neon),
            "simd128" | "wasm" => Ok(Backend::Simd128),
            _ => Err(KernelError::UnknownBackend(s.to_string())),
        }
    }
}
