use crate::error::KernelError;
use crate::kernels::{Kernel, Operand};

/// Borrowed row-major int8 matrix with its dequantization scale.
#[derive(Debug, Clone, Copy)]
pub struct QuantMatrix<'a> {
    data: &'a [i8],
    rows: usize,
    cols: usize,
    scale: f32,
}

impl<'a> QuantMatrix<'a> {
    pub fn new(data: &'a [i8], rows: usize, cols: usize, scale: f32) -> Result<Self, KernelError> {
        let expected = rows.checked_mul(cols).ok_or(KernelError::ShapeMismatch {
            what: "matrix data",
            expected: usize::MAX,
            actual: data.len(),
        })?;
        KernelError::check_len("matrix data", expected, data.len())?;
        if !scale.is_finite() { return Err(KernelError::InvalidScale(scale)); }
        Ok(Self { data, rows, cols, scale })
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn scale(&self) -> f32 { self.scale }
    pub fn data(&self) -> &'a [i8] { self.data }

    pub fn row(&self, i: usize) -> Option<&'a [i8]> {
        if i < self.rows { Some(&self.data[i * self.cols..][..self.cols]) } else { None }
    }

    fn operand<'b>(&'b self, x: &'b [f32]) -> Operand<'b> { Operand::new(self.data, x, self.scale) }

    /// `out = (self @ x) * scale` on the best backend.
    pub fn matvec(&self, x: &[f32], out: &mut [f32]) -> Result<(), KernelError> {
        self.matvec_with(&Kernel::best(), x, out)
    }

    pub fn matvec_with(&self, kernel: &Kernel, x: &[f32], out: &mut [f32]) -> Result<(), KernelError> {
        KernelError::check_len("input vector", self.cols, x.len())?;
        KernelError::check_len("output vector", self.rows, out.len())?;
        kernel.matvec_i8(out, self.data, x, self.scale);
        Ok(())
    }
}

/// Checked fused gate product:
/// `out = (w_ih @ input) * s_ih + (w_hh @ h) * s_hh + bias`.
pub fn gate_matvec(
    out: &mut [f32],
    (w_ih, input): (&QuantMatrix<'_>, &[f32]),
    (w_hh, h): (&QuantMatrix<'_>, &[f32]),
    bias: &[f32],
) -> Result<(), KernelError> {
    gate_matvec_with(&Kernel::best(), out, (w_ih, input), (w_hh, h), bias)
}

pub fn gate_matvec_with(
    kernel: &Kernel,
    out: &mut [f32],
    (w_ih, input): (&QuantMatrix<'_>, &[f32]),
    (w_hh, h): (&QuantMatrix<'_>, &[f32]),
    bias: &[f32],
) -> Result<(), KernelError> {
    let rows = w_ih.rows;
    KernelError::check_len("w_hh rows", rows, w_hh.rows)?;
    KernelError::check_len("input vector", w_ih.cols, input.len())?;
    KernelError::check_len("hidden vector", w_hh.cols, h.len())?;
    KernelError::check_len("bias vector", rows, bias.len())?;
    KernelError::check_len("output vector", rows, out.len())?;
    kernel.matvec_fused_i8(out, w_ih.operand(input), w_hh.operand(h), bias);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_shapes() {
        let data = [1i8; 6];
        assert_eq!(
            QuantMatrix::new(&data, 2, 4, 1.0).unwrap_err(),
            KernelError::ShapeMismatch { what: "matrix data", expected: 8, actual: 6 }
        );
        assert!(matches!(QuantMatrix::new(&data, 2, 3, f32::INFINITY), Err(KernelError::InvalidScale(_))));
        assert!(matches!(QuantMatrix::new(&data, 2, 3, f32::NAN), Err(KernelError::InvalidScale(_))));

        let m = QuantMatrix::new(&data, 2, 3, 1.0).unwrap();
        let mut out = [0.0f32; 2];
        assert_eq!(
            m.matvec(&[1.0, 1.0], &mut out).unwrap_err(),
            KernelError::ShapeMismatch { what: "input vector", expected: 3, actual: 2 }
        );
        let mut short = [0.0f32; 1];
        assert!(m.matvec(&[1.0; 3], &mut short).is_err());
    }

    #[test]
    fn rejects_overflowing_dimensions() {
        let err = QuantMatrix::new(&[], (usize::MAX >> 1) + 1, 2, 1.0).unwrap_err();
        assert_eq!(err, KernelError::ShapeMismatch { what: "matrix data", expected: usize::MAX, actual: 0 });
        assert!(QuantMatrix::new(&[0i8; 4], usize::MAX, usize::MAX, 1.0).is_err());
        // zero rows times a huge column count is a valid empty matrix
        assert!(QuantMatrix::new(&[], 0, usize::MAX, 1.0).is_ok());
    }

    #[test]
    fn rows_are_contiguous_slices() {
        let data = [1i8, 2, 3, 4, 5, 6];
        let m = QuantMatrix::new(&data, 3, 2, 0.5).unwrap();
        assert_eq!(m.row(1), Some(&[3i8, 4][..]));
        assert_eq!(m.row(3), None);
    }

    #[test]
    fn gate_rejects_row_disagreement() {
        let a = [0i8; 8];
        let b = [0i8; 6];
        let w_ih = QuantMatrix::new(&a, 4, 2, 1.0).unwrap();
        let w_hh = QuantMatrix::new(&b, 3, 2, 1.0).unwrap();
        let mut out = [0.0f32; 4];
        let err = gate_matvec(&mut out, (&w_ih, &[0.0; 2]), (&w_hh, &[0.0; 2]), &[0.0; 4]).unwrap_err();
        assert_eq!(err, KernelError::ShapeMismatch { what: "w_hh rows", expected: 4, actual: 3 });
    }
}
