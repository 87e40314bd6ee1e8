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
use crate::errors::*;
use nalgebra::{DMatrix, RealField};

/// min/max range of an actuated axis
#[derive(Copy, Debug, Clone, PartialEq)]
pub struct Range<T: RealField> {
    pub min: T,
    pub max: T,
}

impl<T> Range<T>
where
    T: RealField + Copy,
{
    /// Create new Range instance
    ///
    /// In case `min` is greater than `max`, this function panics.
    ///
    /// # Examples
    ///
    /// ```
    /// let range = glove_retargeting::Range::new(-1.0, 1.0);
    /// // let range = glove_retargeting::Range::new(1.0, -1.0);  // panic
    /// ```
    pub fn new(min: T, max: T) -> Self {
        assert!(min <= max, "min must be less than or equal to max");
        Range { min, max }
    }
    /// Check if the value is in the range
    ///
    /// If the val is the same as the limit value (`min` or `max`), it returns true (valid).
    ///
    /// # Examples
    ///
    /// ```
    /// let range = glove_retargeting::Range::new(-1.0, 1.0);
    /// assert!(range.is_valid(0.0));
    /// assert!(range.is_valid(1.0));
    /// assert!(!range.is_valid(1.5));
    /// ```
    pub fn is_valid(&self, val: T) -> bool {
        val <= self.max && val >= self.min
    }
    /// Clamp the value with the range
    ///
    /// # Examples
    ///
    /// ```
    /// let range = glove_retargeting::Range::new(-1.0, 1.0);
    /// assert_eq!(range.clamp(0.5), 0.5);
    /// assert_eq!(range.clamp(1.5), 1.0);
    /// assert_eq!(range.clamp(-3.0), -1.0);
    /// ```
    pub fn clamp(&self, val: T) -> T {
        if val < self.min {
            self.min
        } else if val > self.max {
            self.max
        } else {
            val
        }
    }
}

/// Convert `axes x 2` matrix (`[min, max]` for each row) into ranges
///
/// Every bound must be finite.
///
/// # Examples
///
/// ```
/// use nalgebra::DMatrix;
///
/// let limits = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, -0.5, 0.5]);
/// let ranges = glove_retargeting::ranges_from_matrix(&limits, 2).unwrap();
/// assert_eq!(ranges[1].min, -0.5);
/// assert!(glove_retargeting::ranges_from_matrix(&limits, 3).is_err());
///
/// let unbounded = DMatrix::from_row_slice(1, 2, &[f64::NEG_INFINITY, f64::INFINITY]);
/// assert!(glove_retargeting::ranges_from_matrix(&unbounded, 1).is_err());
/// ```
pub fn ranges_from_matrix(limits: &DMatrix<f64>, expected_rows: usize) -> Result<Vec<Range<f64>>> {
    if limits.nrows() != expected_rows {
        return Err(Error::size("limits rows", expected_rows, limits.nrows()));
    }
    if limits.ncols() != 2 {
        return Err(Error::size("limits columns", 2, limits.ncols()));
    }
    limits
        .row_iter()
        .enumerate()
        .map(|(i, row)| {
            let (min, max) = (row[0], row[1]);
            if !min.is_finite() || !max.is_finite() || min > max {
                Err(Error::config(
                    "limits",
                    format!("axis {} has invalid range [{}, {}]", i, min, max),
                ))
            } else {
                Ok(Range::new(min, max))
            }
        })
        .collect()
}
