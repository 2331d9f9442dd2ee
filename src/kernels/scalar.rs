/// Scalar reference kernel: plain left-to-right multiply-accumulate in f32.

#[inline]
pub fn dot_i8_f32(w: &[i8], x: &[f32]) -> f32 {
    debug_assert_eq!(w.len(), x.len());
    let x = &x[..w.len()];
    let mut acc = 0.0f32;
    for (&wi, &xi) in w.iter().zip(x) { acc += wi as f32 * xi; }
    acc
}

/// Scalar tail shared by the vector backends: adds `w[j] * x[j]` in order onto `acc`.
#[inline(always)]
pub(crate) fn tail(mut acc: f32, w: &[i8], x: &[f32]) -> f32 {
    for (&wi, &xi) in w.iter().zip(x) { acc += wi as f32 * xi; }
    acc
}
