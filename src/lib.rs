// Int8 x f32 matvec kernels for quantized LSTM inference
pub mod backend;
pub mod error;
pub mod ffi;
pub mod kernels;
pub mod matrix;
pub mod synth;

pub use backend::Backend;
pub use error::KernelError;
pub use kernels::{dot_i8_f32, matvec_fused_i8, matvec_i8, Kernel, Operand};
pub use matrix::{gate_matvec, QuantMatrix};
