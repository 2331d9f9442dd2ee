use thiserror::Error;

/// Errors raised by the checked entry points. The raw kernels never fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch { what: &'static str, expected: usize, actual: usize },

    #[error("dequantization scale must be finite, got {0}")]
    InvalidScale(f32),

    #[error("unknown kernel backend: {0:?}")]
    UnknownBackend(String),
}

impl KernelError {
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual { Ok(()) } else { Err(Self::ShapeMismatch { what, expected, actual }) }
    }
}
