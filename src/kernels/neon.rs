//! AArch64 NEON backend.

use core::arch::aarch64::*;

use super::{scalar, BLOCK};

pub fn available() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[inline(always)]
unsafe fn hsum(v: float32x4_t) -> f32 {
    // vext by 2 swaps halves, vrev64 swaps within pairs
    let s1 = vaddq_f32(v, vextq_f32::<2>(v, v));
    let s2 = vaddq_f32(s1, vrev64q_f32(s1));
    vgetq_lane_f32::<0>(s2)
}

/// # Safety
/// The CPU must support NEON (see [`available`]).
#[target_feature(enable = "neon")]
pub unsafe fn dot_i8_f32(w: &[i8], x: &[f32]) -> f32 {
    debug_assert_eq!(w.len(), x.len());
    let len = w.len();
    let x = &x[..len];
    let len16 = len & !(BLOCK - 1);
    let wp = w.as_ptr();
    let xp = x.as_ptr();

    let mut a0 = vdupq_n_f32(0.0);
    let mut a1 = vdupq_n_f32(0.0);
    let mut a2 = vdupq_n_f32(0.0);
    let mut a3 = vdupq_n_f32(0.0);

    let mut j = 0;
    while j < len16 {
        let wi8 = vld1q_s8(wp.add(j));

        let lo16 = vmovl_s8(vget_low_s8(wi8));
        let hi16 = vmovl_high_s8(wi8);

        let wf0 = vcvtq_f32_s32(vmovl_s16(vget_low_s16(lo16)));
        let wf1 = vcvtq_f32_s32(vmovl_high_s16(lo16));
        let wf2 = vcvtq_f32_s32(vmovl_s16(vget_low_s16(hi16)));
        let wf3 = vcvtq_f32_s32(vmovl_high_s16(hi16));

        let x0 = vld1q_f32(xp.add(j));
        let x1 = vld1q_f32(xp.add(j + 4));
        let x2 = vld1q_f32(xp.add(j + 8));
        let x3 = vld1q_f32(xp.add(j + 12));

        // separate mul + add, no vfmaq: keeps rounding identical to the other backends
        a0 = vaddq_f32(a0, vmulq_f32(wf0, x0));
        a1 = vaddq_f32(a1, vmulq_f32(wf1, x1));
        a2 = vaddq_f32(a2, vmulq_f32(wf2, x2));
        a3 = vaddq_f32(a3, vmulq_f32(wf3, x3));
        j += BLOCK;
    }

    let acc = hsum(vaddq_f32(vaddq_f32(a0, a1), vaddq_f32(a2, a3)));
    scalar::tail(acc, &w[len16..len], &x[len16..len])
}
