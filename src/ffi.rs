//! Flat C ABI for hosts that hand over raw addresses (e.g. a JS host driving
//! the wasm32 `cdylib` with an imported linear memory).
//!
//! Nothing is validated here. Buffer sizes are implied by the dimension
//! arguments and must be right; violating that is undefined behavior.

use std::slice;

use crate::kernels::{Kernel, Operand};

/// Slice view of a caller buffer; a zero length never touches `ptr`.
#[inline(always)]
unsafe fn view<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if len == 0 { &[] } else { slice::from_raw_parts(ptr, len) }
}

#[inline(always)]
fn dim(n: i32) -> usize {
    debug_assert!(n >= 0, "negative dimension {}", n);
    n.max(0) as usize
}

/// `out[i] = (w_ih[i,:] . input) * scale_ih + (w_hh[i,:] . h) * scale_hh + bias[i]` for `i in 0..rows`.
///
/// # Safety
/// `out` and `bias` must hold `rows` f32s, `w_ih` `rows * cols_ih` i8s,
/// `input` `cols_ih` f32s, `w_hh` `rows * cols_hh` i8s and `h` `cols_hh` f32s.
/// `out` may be the very same buffer as `bias` (updated in place) but must
/// not overlap the weights, `input` or `h`.
#[no_mangle]
pub unsafe extern "C" fn matvec_fused_i8(
    out: *mut f32,
    w_ih: *const i8, input: *const f32, cols_ih: i32, scale_ih: f32,
    w_hh: *const i8, h: *const f32, cols_hh: i32, scale_hh: f32,
    bias: *const f32,
    rows: i32,
) {
    let rows = dim(rows);
    if rows == 0 { return; }
    let (cols_ih, cols_hh) = (dim(cols_ih), dim(cols_hh));
    let ih = Operand::new(view(w_ih, rows * cols_ih), view(input, cols_ih), scale_ih);
    let hh = Operand::new(view(w_hh, rows * cols_hh), view(h, cols_hh), scale_hh);
    let k = Kernel::best();
    // `out` may alias `bias`, so neither is borrowed as a slice: each bias
    // element is read before the same row of `out` is written.
    for i in 0..rows {
        let b = bias.add(i).read();
        out.add(i).write(k.gate_row(i, &ih, &hh) + b);
    }
}

/// `out[i] = (a[i,:] . x) * scale` for `i in 0..rows`.
///
/// # Safety
/// `out` must hold `rows` f32s, `a` `rows * cols` i8s and `x` `cols` f32s.
/// `out` must not overlap any input.
#[no_mangle]
pub unsafe extern "C" fn matvec_i8(
    out: *mut f32,
    a: *const i8, x: *const f32,
    rows: i32, cols: i32,
    scale: f32,
) {
    let rows = dim(rows);
    if rows == 0 { return; }
    let cols = dim(cols);
    let out = slice::from_raw_parts_mut(out, rows);
    Kernel::best().matvec_i8(out, view(a, rows * cols), view(x, cols), scale);
}
