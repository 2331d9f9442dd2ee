use criterion::{criterion_group, criterion_main, Criterion, black_box};
use qmatvec::synth::Problem;
use qmatvec::Kernel;

fn bench_lstm_gates(c: &mut Criterion) {
    // modest layer for benchmark speed; adjust as needed
    let p = Problem::lstm(256, 256, 42);
    let k = Kernel::best();
    let mut out = vec![0f32; p.rows];
    c.bench_function(&format!("matvec_fused_i8_lstm_256x256_{}", k.backend()), |ben| {
        ben.iter(|| {
            k.matvec_fused_i8(black_box(&mut out), p.ih(), p.hh(), black_box(&p.bias));
            black_box(out[0])
        })
    });
    let mut single = vec![0f32; p.rows];
    c.bench_function(&format!("matvec_i8_1024x256_{}", k.backend()), |ben| {
        ben.iter(|| {
            k.matvec_i8(black_box(&mut single), black_box(&p.w_ih), black_box(&p.input), p.scale_ih);
            black_box(single[0])
        })
    });
}

criterion_group!(benches, bench_lstm_gates);
criterion_main!(benches);
