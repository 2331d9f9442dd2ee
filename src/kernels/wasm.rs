//! WebAssembly SIMD128 backend. Only compiled when the module is built with
//! `-C target-feature=+simd128`; there is no runtime detection on wasm.

use core::arch::wasm32::*;

use super::{scalar, BLOCK};

pub fn available() -> bool {
    true
}

#[inline(always)]
unsafe fn hsum(v: v128) -> f32 {
    let s1 = f32x4_add(v, i32x4_shuffle::<2, 3, 0, 1>(v, v));
    let s2 = f32x4_add(s1, i32x4_shuffle::<1, 0, 2, 3>(s1, s1));
    f32x4_extract_lane::<0>(s2)
}

/// # Safety
/// Callers uphold the same slice contract as the other backends; the loads
/// stay inside `w[..len16]` / `x[..len16]`.
pub unsafe fn dot_i8_f32(w: &[i8], x: &[f32]) -> f32 {
    debug_assert_eq!(w.len(), x.len());
    let len = w.len();
    let x = &x[..len];
    let len16 = len & !(BLOCK - 1);
    let wp = w.as_ptr();
    let xp = x.as_ptr();

    let mut a0 = f32x4_splat(0.0);
    let mut a1 = f32x4_splat(0.0);
    let mut a2 = f32x4_splat(0.0);
    let mut a3 = f32x4_splat(0.0);

    let mut j = 0;
    while j < len16 {
        // 16 x i8
        let wi8 = v128_load(wp.add(j) as *const v128);

        let lo16 = i16x8_extend_low_i8x16(wi8);
        let hi16 = i16x8_extend_high_i8x16(wi8);

        let wf0 = f32x4_convert_i32x4(i32x4_extend_low_i16x8(lo16));
        let wf1 = f32x4_convert_i32x4(i32x4_extend_high_i16x8(lo16));
        let wf2 = f32x4_convert_i32x4(i32x4_extend_low_i16x8(hi16));
        let wf3 = f32x4_convert_i32x4(i32x4_extend_high_i16x8(hi16));

        let x0 = v128_load(xp.add(j) as *const v128);
        let x1 = v128_load(xp.add(j + 4) as *const v128);
        let x2 = v128_load(xp.add(j + 8) as *const v128);
        let x3 = v128_load(xp.add(j + 12) as *const v128);

        a0 = f32x4_add(a0, f32x4_mul(wf0, x0));
        a1 = f32x4_add(a1, f32x4_mul(wf1, x1));
        a2 = f32x4_add(a2, f32x4_mul(wf2, x2));
        a3 = f32x4_add(a3, f32x4_mul(wf3, x3));
        j += BLOCK;
    }

    let acc = hsum(f32x4_add(f32x4_add(a0, a1), f32x4_add(a2, a3)));
    scalar::tail(acc, &w[len16..len], &x[len16..len])
}
