use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use qmatvec::kernels::{scalar, Kernel};
use qmatvec::synth::{self, Problem};
use qmatvec::Backend;
use serde::Serialize;
use std::hint::black_box;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "qmatvec", version, about = "Benchmark and verify the int8 x f32 matvec kernels")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time the fused gate kernel on synthetic data
    Bench {
        /// Output rows (4 x hidden for an LSTM layer)
        #[arg(long, default_value_t = 1024)]
        rows: usize,

        /// Input columns (cols_ih)
        #[arg(long, default_value_t = 256)]
        cols: usize,

        /// Recurrent columns (cols_hh); defaults to rows / 4
        #[arg(long)]
        hidden: Option<usize>,

        /// Timed iterations per backend
        #[arg(long, default_value_t = 200)]
        iters: u32,

        /// Only this backend (scalar, portable, sse41, neon, simd128)
        #[arg(long)]
        backend: Option<String>,

        /// RNG seed for the synthetic problem
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Print a JSON report instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compare every available backend against the scalar reference
    Verify {
        /// Largest vector length checked (every length from 0 up is swept)
        #[arg(long, default_value_t = 300)]
        max_len: usize,

        /// Random trials per length
        #[arg(long, default_value_t = 4)]
        trials: u32,

        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Allowed error relative to sum(|w*x|)
        #[arg(long, default_value_t = 1e-4)]
        tolerance: f32,
    },
}

#[derive(Serialize, Debug)]
struct BenchResult {
    backend: Backend,
    iters: u32,
    secs_per_call: f64,
    gflops: f64,
}

#[derive(Serialize, Debug)]
struct BenchReport {
    rows: usize,
    cols_ih: usize,
    cols_hh: usize,
    detected: Backend,
    results: Vec<BenchResult>,
}

fn backends(filter: Option<&str>) -> Result<Vec<Backend>> {
    match filter {
        Some(name) => {
            let b: Backend = name.parse().context("parse --backend")?;
            if !b.is_available() { bail!("backend {} is not available on this machine", b); }
            Ok(vec![b])
        }
        None => Ok(Backend::available()),
    }
}

fn bench(p: &Problem, backend: Backend, iters: u32) -> BenchResult {
    let k = Kernel::new(backend);
    let mut out = vec![0f32; p.rows];
    // warm-up
    k.matvec_fused_i8(&mut out, p.ih(), p.hh(), &p.bias);
    let t0 = Instant::now();
    for _ in 0..iters {
        k.matvec_fused_i8(black_box(&mut out), black_box(p.ih()), black_box(p.hh()), black_box(&p.bias));
    }
    let dt = t0.elapsed().as_secs_f64();
    let secs_per_call = dt / iters.max(1) as f64;
    let flops = 2.0 * p.rows as f64 * (p.cols_ih() + p.cols_hh()) as f64;
    let gflops = if secs_per_call > 0.0 { flops / secs_per_call / 1e9 } else { 0.0 };
    debug!("{}: {} iters in {:.3}s", backend, iters, dt);
    BenchResult { backend, iters, secs_per_call, gflops }
}

fn run_bench(rows: usize, cols: usize, hidden: Option<usize>, iters: u32, backend: Option<&str>, seed: u64, json: bool) -> Result<()> {
    let cols_hh = hidden.unwrap_or(rows / 4);
    let p = Problem::random(rows, cols, cols_hh, seed);
    info!("bench rows={} cols_ih={} cols_hh={} iters={}", rows, cols, cols_hh, iters);

    let results: Vec<BenchResult> = backends(backend)?.into_iter().map(|b| bench(&p, b, iters)).collect();
    let report = BenchReport { rows, cols_ih: cols, cols_hh, detected: Backend::detect(), results };

    if json {
        println!("{}", serde_json::to_string_pretty(&report).context("serialize bench report")?);
    } else {
        for r in &report.results {
            println!("backend={} iters={} us_per_call={:.2} gflops={:.2}", r.backend, r.iters, r.secs_per_call * 1e6, r.gflops);
        }
    }
    Ok(())
}

type DotCheck = Box<dyn Fn(&[i8], &[f32]) -> f32>;

/// Worst error of `dot` against the scalar reference over every length up to
/// `max_len`, in units of the allowed slack (1.0 is at the limit), and the
/// length it occurred at.
fn worst_error(dot: &dyn Fn(&[i8], &[f32]) -> f32, max_len: usize, trials: u32, seed: u64, tolerance: f32) -> (f32, usize) {
    let mut rng = synth::rng(seed);
    let mut worst = 0f32;
    let mut worst_len = 0usize;
    for len in 0..=max_len {
        for _ in 0..trials {
            let w = synth::weights(&mut rng, len);
            let x = synth::activations(&mut rng, len);
            let want = scalar::dot_i8_f32(&w, &x);
            let err = (dot(&w, &x) - want).abs() / synth::dot_tolerance(&w, &x, tolerance);
            if err > worst { worst = err; worst_len = len; }
        }
    }
    (worst, worst_len)
}

fn verify(candidates: &[(String, DotCheck)], max_len: usize, trials: u32, seed: u64, tolerance: f32) -> Result<()> {
    let mut failed = false;
    for (name, dot) in candidates {
        let (worst, worst_len) = worst_error(dot.as_ref(), max_len, trials, seed, tolerance);
        let ok = worst <= 1.0;
        failed |= !ok;
        println!("backend={} worst={:.3} at len={} {}", name, worst, worst_len, if ok { "ok" } else { "FAIL" });
    }
    if failed { bail!("at least one backend exceeded tolerance {}", tolerance); }
    Ok(())
}

fn run_verify(max_len: usize, trials: u32, seed: u64, tolerance: f32) -> Result<()> {
    let candidates: Vec<(String, DotCheck)> = Backend::available()
        .into_iter()
        .map(|b| {
            let k = Kernel::new(b);
            let dot: DotCheck = Box::new(move |w: &[i8], x: &[f32]| k.dot(w, x));
            (b.to_string(), dot)
        })
        .collect();
    verify(&candidates, max_len, trials, seed, tolerance)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    match args.cmd {
        Command::Bench { rows, cols, hidden, iters, backend, seed, json } => {
            run_bench(rows, cols, hidden, iters, backend.as_deref(), seed, json)
        }
        Command::Verify { max_len, trials, seed, tolerance } => run_verify(max_len, trials, seed, tolerance),
    }
}
