/*
  Copyright 2017 Takashi Ogura

  Licensed under the Apache License, Version 2.0 (the "License");
  you may not use this file except in compliance with the License.
  You may obtain a copy of the License at

      http://www.apache.org/licenses/LICENSE-2.0

  Unless required by applicable law or agreed to in writing, software
  distributed under the License is distributed on an "AS IS" BASIS,
  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
  See the License for the specific language governing permissions and
  limitations under the License.
*/
//! Linear algebra helpers used by the coupling estimator
use crate::errors::*;
use nalgebra::DMatrix;

/// Default relative tolerance of the singular values
pub const DEFAULT_RANK_TOLERANCE: f64 = 1.0e-9;

/// Rank of the matrix computed from its singular values
///
/// Singular values smaller than `tolerance * max_singular_value` are treated as zero.
/// A matrix with a non-finite element has rank zero.
///
/// # Examples
///
/// ```
/// use nalgebra::DMatrix;
/// use glove_retargeting::math::numerical_rank;
///
/// let m = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 2.0, 4.0, 3.0, 6.0]);
/// assert_eq!(numerical_rank(&m, 1e-9), 1);
/// assert_eq!(numerical_rank(&DMatrix::<f64>::identity(3, 3), 1e-9), 3);
/// ```
pub fn numerical_rank(matrix: &DMatrix<f64>, tolerance: f64) -> usize {
    if matrix.nrows() == 0 || matrix.ncols() == 0 || !is_finite(matrix) {
        return 0;
    }
    let singular_values = matrix.clone().svd(false, false).singular_values;
    let max_value = singular_values.iter().cloned().fold(0.0, f64::max);
    if !max_value.is_finite() || max_value <= 0.0 {
        return 0;
    }
    singular_values
        .iter()
        .filter(|s| **s > tolerance * max_value)
        .count()
}

/// `true` if all the elements are neither NaN nor infinite
pub fn is_finite(matrix: &DMatrix<f64>) -> bool {
    matrix.iter().all(|v| v.is_finite())
}

/// Left pseudo inverse `(XᵀX)⁻¹Xᵀ` of a full column rank matrix
///
/// It returns `DegenerateCalibrationData` if `X` is not full column rank or has
/// a non-finite element.
pub fn left_pseudo_inverse(matrix: &DMatrix<f64>, tolerance: f64) -> Result<DMatrix<f64>> {
    let required = matrix.ncols();
    let degenerate = |rank| Error::DegenerateCalibrationData {
        samples: matrix.nrows(),
        rank,
        required,
    };
    let rank = numerical_rank(matrix, tolerance);
    if rank < required || required == 0 {
        return Err(degenerate(rank));
    }
    let transposed = matrix.transpose();
    let inverse = (&transposed * matrix)
        .try_inverse()
        .ok_or_else(|| degenerate(rank))?;
    let pseudo_inverse = inverse * transposed;
    if pseudo_inverse.iter().any(|v| !v.is_finite()) {
        return Err(degenerate(rank));
    }
    Ok(pseudo_inverse)
}
