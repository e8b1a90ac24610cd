//! The 8x8 inverse discrete cosine transform.
//!
//! Implemented as a separable REDFT01 (the FFTW name for an unnormalized
//! inverse DCT-III): prescale the first row and first column by sqrt(2),
//! run the 1-D inverse transform along rows then columns, and divide the
//! result by 16. This is mathematically the standard JPEG IDCT; it is
//! written directly from the transform's definition rather than as an
//! AAN/stb_image-style fast butterfly network, since this decoder has no
//! need to out-run a hand-tuned integer kernel.
use std::f64::consts::PI;

const SIZE: usize = 8;
const BLOCK: usize = 64;

/// Owns the scratch buffers the 1-D passes need so a caller decoding many
/// blocks in sequence does not allocate per block.
pub struct DctCalculator {
    cos_table: [[f64; SIZE]; SIZE],
    scratch: [f64; BLOCK],
}

impl Default for DctCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DctCalculator {
    #[must_use]
    pub fn new() -> Self {
        let mut cos_table = [[0.0; SIZE]; SIZE];
        for (k, row) in cos_table.iter_mut().enumerate() {
            for (n, value) in row.iter_mut().enumerate() {
                *value = (PI / SIZE as f64 * (n as f64 + 0.5) * k as f64).cos();
            }
        }
        Self {
            cos_table,
            scratch: [0.0; BLOCK],
        }
    }

    /// One-dimensional length-8 REDFT01:
    /// `out[n] = in[0] + 2 * sum_{k=1}^{7} in[k] * cos(pi/8 * (n+0.5) * k)`.
    fn redft01_1d(&self, input: &[f64; SIZE], output: &mut [f64; SIZE]) {
        for (n, out) in output.iter_mut().enumerate() {
            let mut sum = input[0];
            for k in 1..SIZE {
                sum += 2.0 * input[k] * self.cos_table[k][n];
            }
            *out = sum;
        }
    }

    /// Computes the inverse DCT of a dequantized 8x8 block given in
    /// natural (row-major) order, writing spatial-domain samples back into
    /// `block` in the same order. Output is NOT level-shifted; that
    /// happens during color conversion.
    pub fn inverse_transform(&mut self, block: &mut [i32; BLOCK]) {
        let mut rows = [[0.0f64; SIZE]; SIZE];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = f64::from(block[r * SIZE + c]);
            }
        }

        let sqrt2 = std::f64::consts::SQRT_2;
        for value in rows[0].iter_mut() {
            *value *= sqrt2;
        }
        for row in rows.iter_mut() {
            row[0] *= sqrt2;
        }

        let mut after_rows = [[0.0f64; SIZE]; SIZE];
        for r in 0..SIZE {
            let mut out = [0.0f64; SIZE];
            self.redft01_1d(&rows[r], &mut out);
            after_rows[r] = out;
        }

        let mut after_cols = [[0.0f64; SIZE]; SIZE];
        for c in 0..SIZE {
            let mut col_in = [0.0f64; SIZE];
            for r in 0..SIZE {
                col_in[r] = after_rows[r][c];
            }
            let mut col_out = [0.0f64; SIZE];
            self.redft01_1d(&col_in, &mut col_out);
            for r in 0..SIZE {
                after_cols[r][c] = col_out[r];
            }
        }

        for r in 0..SIZE {
            for c in 0..SIZE {
                self.scratch[r * SIZE + c] = after_cols[r][c] / 16.0;
            }
        }
        for (dst, &src) in block.iter_mut().zip(self.scratch.iter()) {
            *dst = src.round() as i32;
        }
    }
}
