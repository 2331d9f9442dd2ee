//! Four-accumulator dot product on plain `[f32; 4]` lanes.
//!
//! Runs on every target and fixes the operation order that the intrinsic
//! backends reproduce, so all vector backends agree bit-for-bit with this one.

use super::{scalar, BLOCK};

type F32x4 = [f32; 4];

#[inline(always)]
fn add(a: F32x4, b: F32x4) -> F32x4 { [a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]] }

#[inline(always)]
fn mul(a: F32x4, b: F32x4) -> F32x4 { [a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]] }

/// Horizontal sum: swap halves and add, swap pairs and add, take lane 0.
#[inline(always)]
fn hsum(v: F32x4) -> f32 {
    let s1 = add(v, [v[2], v[3], v[0], v[1]]);
    let s2 = add(s1, [s1[1], s1[0], s1[2], s1[3]]);
    s2[0]
}

#[inline(always)]
fn widen(w: &[i8]) -> F32x4 { [w[0] as f32, w[1] as f32, w[2] as f32, w[3] as f32] }

#[inline(always)]
fn load(x: &[f32]) -> F32x4 { [x[0], x[1], x[2], x[3]] }

pub fn dot_i8_f32(w: &[i8], x: &[f32]) -> f32 {
    debug_assert_eq!(w.len(), x.len());
    let len = w.len();
    let x = &x[..len];
    let len16 = len & !(BLOCK - 1);

    let mut a0 = [0.0f32; 4];
    let mut a1 = [0.0f32; 4];
    let mut a2 = [0.0f32; 4];
    let mut a3 = [0.0f32; 4];

    for (wb, xb) in w[..len16].chunks_exact(BLOCK).zip(x[..len16].chunks_exact(BLOCK)) {
        a0 = add(a0, mul(widen(&wb[0..4]), load(&xb[0..4])));
        a1 = add(a1, mul(widen(&wb[4..8]), load(&xb[4..8])));
        a2 = add(a2, mul(widen(&wb[8..12]), load(&xb[8..12])));
        a3 = add(a3, mul(widen(&wb[12..16]), load(&xb[12..16])));
    }

    let acc = hsum(add(add(a0, a1), add(a2, a3)));
    scalar::tail(acc, &w[len16..len], &x[len16..len])
}
