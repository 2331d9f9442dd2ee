use pretty_assertions::assert_eq;
use qmatvec::ffi;
use qmatvec::synth::Problem;
use qmatvec::{matvec_fused_i8, matvec_i8};

#[test]
fn fused_abi_matches_safe_api() {
    let p = Problem::lstm(24, 12, 11);
    let mut want = vec![0f32; p.rows];
    matvec_fused_i8(&mut want, p.ih(), p.hh(), &p.bias);

    let mut got = vec![f32::NAN; p.rows];
    unsafe {
        ffi::matvec_fused_i8(
            got.as_mut_ptr(),
            p.w_ih.as_ptr(), p.input.as_ptr(), p.cols_ih() as i32, p.scale_ih,
            p.w_hh.as_ptr(), p.h.as_ptr(), p.cols_hh() as i32, p.scale_hh,
            p.bias.as_ptr(),
            p.rows as i32,
        );
    }
    assert_eq!(got, want);
}

#[test]
fn simple_abi_matches_safe_api() {
    let p = Problem::random(9, 21, 0, 3);
    let mut want = vec![0f32; 9];
    matvec_i8(&mut want, &p.w_ih, &p.input, p.scale_ih);

    let mut got = vec![0f32; 9];
    unsafe { ffi::matvec_i8(got.as_mut_ptr(), p.w_ih.as_ptr(), p.input.as_ptr(), 9, 21, p.scale_ih) };
    assert_eq!(got, want);
}

#[test]
fn zero_length_recurrent_side_is_never_read() {
    let w_ih = [1i8; 16];
    let input = [1.0f32; 16];
    let bias = [0.0f32];
    let mut out = [0f32];
    unsafe {
        ffi::matvec_fused_i8(
            out.as_mut_ptr(),
            w_ih.as_ptr(), input.as_ptr(), 16, 0.5,
            std::ptr::null(), std::ptr::null(), 0, 1.0,
            bias.as_ptr(),
            1,
        );
    }
    assert_eq!(out, [8.0]);
}

#[test]
fn zero_rows_leave_output_alone() {
    let mut out = [3.0f32; 2];
    unsafe { ffi::matvec_i8(out.as_mut_ptr(), std::ptr::null(), std::ptr::null(), 0, 4, 1.0) };
    assert_eq!(out, [3.0, 3.0]);
}

#[test]
fn fused_abi_updates_bias_in_place() {
    let p = Problem::lstm(20, 10, 5);
    let mut want = vec![0f32; p.rows];
    matvec_fused_i8(&mut want, p.ih(), p.hh(), &p.bias);

    let mut acc = p.bias.clone();
    unsafe {
        ffi::matvec_fused_i8(
            acc.as_mut_ptr(),
            p.w_ih.as_ptr(), p.input.as_ptr(), p.cols_ih() as i32, p.scale_ih,
            p.w_hh.as_ptr(), p.h.as_ptr(), p.cols_hh() as i32, p.scale_hh,
            acc.as_ptr(),
            p.rows as i32,
        );
    }
    assert_eq!(acc, want);
}
