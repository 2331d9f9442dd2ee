//! SSE4.1 backend (`pmovsxbw` / `pmovsxwd` widening).

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use super::{scalar, BLOCK};

pub fn available() -> bool {
    is_x86_feature_detected!("sse4.1")
}

#[inline(always)]
unsafe fn hsum(v: __m128) -> f32 {
    // lanes (2,3,0,1) then (1,0,2,3)
    let s1 = _mm_add_ps(v, _mm_shuffle_ps::<0x4E>(v, v));
    let s2 = _mm_add_ps(s1, _mm_shuffle_ps::<0xE1>(s1, s1));
    _mm_cvtss_f32(s2)
}

/// # Safety
/// The CPU must support SSE4.1 (see [`available`]).
#[target_feature(enable = "sse4.1")]
pub unsafe fn dot_i8_f32(w: &[i8], x: &[f32]) -> f32 {
    debug_assert_eq!(w.len(), x.len());
    let len = w.len();
    let x = &x[..len];
    let len16 = len & !(BLOCK - 1);
    let wp = w.as_ptr();
    let xp = x.as_ptr();

    let mut a0 = _mm_setzero_ps();
    let mut a1 = _mm_setzero_ps();
    let mut a2 = _mm_setzero_ps();
    let mut a3 = _mm_setzero_ps();

    let mut j = 0;
    while j < len16 {
        let wi8 = _mm_loadu_si128(wp.add(j) as *const __m128i);

        let lo16 = _mm_cvtepi8_epi16(wi8);
        let hi16 = _mm_cvtepi8_epi16(_mm_srli_si128::<8>(wi8));

        let wf0 = _mm_cvtepi32_ps(_mm_cvtepi16_epi32(lo16));
        let wf1 = _mm_cvtepi32_ps(_mm_cvtepi16_epi32(_mm_srli_si128::<8>(lo16)));
        let wf2 = _mm_cvtepi32_ps(_mm_cvtepi16_epi32(hi16));
        let wf3 = _mm_cvtepi32_ps(_mm_cvtepi16_epi32(_mm_srli_si128::<8>(hi16)));

        let x0 = _mm_loadu_ps(xp.add(j));
        let x1 = _mm_loadu_ps(xp.add(j + 4));
        let x2 = _mm_loadu_ps(xp.add(j + 8));
        let x3 = _mm_loadu_ps(xp.add(j + 12));

        a0 = _mm_add_ps(a0, _mm_mul_ps(wf0, x0));
        a1 = _mm_add_ps(a1, _mm_mul_ps(wf1, x1));
        a2 = _mm_add_ps(a2, _mm_mul_ps(wf2, x2));
        a3 = _mm_add_ps(a3, _mm_mul_ps(wf3, x3));
        j += BLOCK;
    }

    let acc = hsum(_mm_add_ps(_mm_add_ps(a0, a1), _mm_add_ps(a2, a3)));
    scalar::tail(acc, &w[len16..len], &x[len16..len])
}
