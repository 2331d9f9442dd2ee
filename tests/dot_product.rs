use qmatvec::kernels::{portable, scalar};
use qmatvec::synth::{self, dot_tolerance};
use qmatvec::{Backend, Kernel};

const REL: f32 = 1e-4;

fn assert_close(got: f32, want: f32, w: &[i8], x: &[f32], what: &str) {
    let tol = dot_tolerance(w, x, REL);
    assert!((got - want).abs() <= tol, "{}: got {} want {} (tol {})", what, got, want, tol);
}

#[test]
fn zero_length_is_exactly_zero() {
    for b in Backend::available() {
        let v = Kernel::new(b).dot(&[], &[]);
        assert_eq!(v.to_bits(), 0f32.to_bits(), "backend {}", b);
    }
    assert_eq!(qmatvec::dot_i8_f32(&[], &[]), 0.0);
}

#[test]
fn every_remainder_matches_scalar() {
    // 0..=31 covers empty, tail-only, one full block and block + every tail size
    let mut rng = synth::rng(31);
    for b in Backend::available() {
        let k = Kernel::new(b);
        for len in 0..=31 {
            for _ in 0..8 {
                let w = synth::weights(&mut rng, len);
                let x = synth::activations(&mut rng, len);
                assert_close(k.dot(&w, &x), scalar::dot_i8_f32(&w, &x), &w, &x, &format!("{} len={}", b, len));
            }
        }
    }
}

#[test]
fn random_lengths_match_scalar() {
    let mut rng = synth::rng(2024);
    let k = Kernel::best();
    for len in [47usize, 64, 100, 255, 256, 257, 1000, 4096, 4111] {
        let w = synth::weights(&mut rng, len);
        let x = synth::activations(&mut rng, len);
        assert_close(k.dot(&w, &x), scalar::dot_i8_f32(&w, &x), &w, &x, &format!("len={}", len));
    }
}

#[test]
fn vector_backends_agree_bitwise() {
    let mut rng = synth::rng(9);
    for len in 0..=80 {
        let w = synth::weights(&mut rng, len);
        let x = synth::activations(&mut rng, len);
        let want = portable::dot_i8_f32(&w, &x);
        for b in Backend::available().into_iter().filter(|b| *b != Backend::Scalar) {
            assert_eq!(b.dot(&w, &x).to_bits(), want.to_bits(), "backend {} len={}", b, len);
        }
    }
}

#[test]
fn extreme_weights_widen_with_sign() {
    let w = [-128i8; 16];
    let x = [1.0f32; 16];
    assert_eq!(qmatvec::dot_i8_f32(&w, &x), -2048.0);
    let w = [127i8; 20];
    let x = [0.5f32; 20];
    assert_eq!(qmatvec::dot_i8_f32(&w, &x), 1270.0);
    // alternating signs inside one block
    let w: Vec<i8> = (0..16).map(|i| if i % 2 == 0 { -1 } else { 1 }).collect();
    let x: Vec<f32> = (0..16).map(|i| i as f32).collect();
    assert_eq!(qmatvec::dot_i8_f32(&w, &x), 8.0);
}

#[test]
#[should_panic(expected = "weight row and input length differ")]
fn short_input_panics_instead_of_truncating() {
    Kernel::best().dot(&[1i8; 20], &[1.0f32; 16]);
}

#[test]
#[should_panic(expected = "weight row and input length differ")]
fn long_input_panics_instead_of_truncating() {
    Backend::Portable.dot(&[1i8; 16], &[1.0f32; 20]);
}

#[test]
fn raw_kernels_reject_a_short_input() {
    // below the checked entry points the slice bound itself must trip
    let kernels: [fn(&[i8], &[f32]) -> f32; 2] = [scalar::dot_i8_f32, portable::dot_i8_f32];
    for dot in kernels {
        let r = std::panic::catch_unwind(|| dot(&[1i8; 20], &[1.0f32; 16]));
        assert!(r.is_err(), "returned {:?}", r.ok());
    }
}
