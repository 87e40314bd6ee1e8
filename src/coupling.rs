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
use crate::math::*;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};

/// Linear mapping between the motor axes and the joints of a hand
///
/// `matrix` is `joints x axes` and maps axis values to joint values,
/// `control_coefficient` is its pseudo inverse (`axes x joints`).
#[derive(Debug, Clone, PartialEq)]
pub struct Coupling {
    matrix: DMatrix<f64>,
    control_coefficient: DMatrix<f64>,
}

impl Coupling {
    /// Create the coupling from `joints x axes` matrix
    ///
    /// The matrix must be full column rank.
    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self> {
        let control_coefficient = left_pseudo_inverse(&matrix, DEFAULT_RANK_TOLERANCE)?;
        Ok(Coupling {
            matrix,
            control_coefficient,
        })
    }
    /// Create the coupling from the row major (flattened) matrix
    ///
    /// # Examples
    ///
    /// ```
    /// let c = glove_retargeting::Coupling::from_row_major(3, 2, &[1.0, 0.0, 0.5, 0.5, 0.0, 1.0]).unwrap();
    /// assert_eq!(c.matrix()[(1, 0)], 0.5);
    /// assert!(glove_retargeting::Coupling::from_row_major(3, 2, &[1.0, 0.0]).is_err());
    /// ```
    pub fn from_row_major(joints: usize, axes: usize, values: &[f64]) -> Result<Self> {
        if values.len() != joints * axes {
            return Err(Error::size("CouplingMatrix", joints * axes, values.len()));
        }
        Self::from_matrix(DMatrix::from_row_slice(joints, axes, values))
    }
    /// Coupling of a hand whose joint `i` simply follows axis `i`
    ///
    /// # Examples
    ///
    /// ```
    /// let c = glove_retargeting::Coupling::identity(5, 5);
    /// assert_eq!(c.matrix(), &nalgebra::DMatrix::<f64>::identity(5, 5));
    /// ```
    pub fn identity(joints: usize, axes: usize) -> Self {
        Coupling {
            matrix: DMatrix::identity(joints, axes),
            control_coefficient: DMatrix::identity(axes, joints),
        }
    }
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
    pub fn control_coefficient(&self) -> &DMatrix<f64> {
        &self.control_coefficient
    }
    pub fn axis_count(&self) -> usize {
        self.matrix.ncols()
    }
    pub fn joint_count(&self) -> usize {
        self.matrix.nrows()
    }
    /// Joint values expected from the given axis values
    pub fn joints_from_axes(&self, axes: &DVector<f64>) -> Result<DVector<f64>> {
        if axes.len() != self.axis_count() {
            return Err(Error::size("axis vector", self.axis_count(), axes.len()));
        }
        Ok(&self.matrix * axes)
    }
    /// Axis command which realizes the given joint values in the least squares sense
    pub fn axes_from_joints(&self, joints: &DVector<f64>) -> Result<DVector<f64>> {
        if joints.len() != self.joint_count() {
            return Err(Error::size("joint vector", self.joint_count(), joints.len()));
        }
        Ok(&self.control_coefficient * joints)
    }
}

/// Paired motor/joint samples recorded while the hand is excited
#[derive(Debug, Clone, Default)]
pub struct SampleLog {
    motors: Vec<DVector<f64>>,
    joints: Vec<DVector<f64>>,
}

impl SampleLog {
    pub fn len(&self) -> usize {
        self.motors.len()
    }
    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }
    pub fn clear(&mut self) {
        self.motors.clear();
        self.joints.clear();
    }
    fn push(&mut self, motors: DVector<f64>, joints: DVector<f64>) {
        self.motors.push(motors);
        self.joints.push(joints);
    }
    fn stack(rows: &[DVector<f64>], cols: usize) -> DMatrix<f64> {
        DMatrix::from_fn(rows.len(), cols, |r, c| rows[r][c])
    }
    /// `samples x axes` matrix
    pub fn motors_data(&self, axes: usize) -> DMatrix<f64> {
        Self::stack(&self.motors, axes)
    }
    /// `samples x joints` matrix
    pub fn joints_data(&self, joints: usize) -> DMatrix<f64> {
        Self::stack(&self.joints, joints)
    }
}

/// Least squares estimator of the motor/joint coupling
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use glove_retargeting::CouplingEstimator;
///
/// let mut estimator = CouplingEstimator::new(2, 3);
/// for (a0, a1) in [(1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
///     let axes = DVector::from_vec(vec![a0, a1]);
///     let joints = DVector::from_vec(vec![a0, 0.5 * a0 + 0.5 * a1, a1]);
///     estimator.record_sample(&axes, &joints).unwrap();
/// }
/// let coupling = estimator.estimate_coupling().unwrap();
/// assert!((coupling.matrix()[(1, 1)] - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct CouplingEstimator {
    axis_count: usize,
    joint_count: usize,
    rank_tolerance: f64,
    samples: SampleLog,
}

impl CouplingEstimator {
    pub fn new(axis_count: usize, joint_count: usize) -> Self {
        CouplingEstimator {
            axis_count,
            joint_count,
            rank_tolerance: DEFAULT_RANK_TOLERANCE,
            samples: SampleLog::default(),
        }
    }
    /// Relative tolerance used to decide the rank of the recorded data
    pub fn with_rank_tolerance(mut self, rank_tolerance: f64) -> Self {
        self.rank_tolerance = rank_tolerance;
        self
    }
    pub fn axis_count(&self) -> usize {
        self.axis_count
    }
    pub fn joint_count(&self) -> usize {
        self.joint_count
    }
    pub fn samples(&self) -> &SampleLog {
        &self.samples
    }
    pub fn clear(&mut self) {
        self.samples.clear();
    }
    /// Append one pair of measurements
    ///
    /// Nothing is recorded if one of the vectors has the wrong size.
    pub fn record_sample(&mut self, axes: &DVector<f64>, joints: &DVector<f64>) -> Result<()> {
        if axes.len() != self.axis_count {
            return Err(Error::size("axis sample", self.axis_count, axes.len()));
        }
        if joints.len() != self.joint_count {
            return Err(Error::size("joint sample", self.joint_count, joints.len()));
        }
        self.samples.push(axes.clone(), joints.clone());
        Ok(())
    }
    /// Solve the regression and return the coupling
    ///
    /// The recorded samples are kept, so that the session can continue if the data
    /// turns out to be degenerate.
    pub fn estimate_coupling(&self) -> Result<Coupling> {
        if self.samples.len() < self.axis_count {
            return Err(Error::DegenerateCalibrationData {
                samples: self.samples.len(),
                rank: self.samples.len(),
                required: self.axis_count,
            });
        }
        let motors_data = self.samples.motors_data(self.axis_count);
        let joints_data = self.samples.joints_data(self.joint_count);
        if !is_finite(&motors_data) || !is_finite(&joints_data) {
            warn!("calibration samples contain non-finite values");
            return Err(Error::DegenerateCalibrationData {
                samples: self.samples.len(),
                rank: 0,
                required: self.axis_count,
            });
        }
        let xt_x = motors_data.transpose() * &motors_data;
        info!(
            "xT_x: {}x{}, determinant {:e}, rank {}",
            xt_x.nrows(),
            xt_x.ncols(),
            xt_x.determinant(),
            numerical_rank(&motors_data, self.rank_tolerance)
        );
        // axes x samples
        let coeff = left_pseudo_inverse(&motors_data, self.rank_tolerance)?;
        let mut matrix = DMatrix::zeros(self.joint_count, self.axis_count);
        for (i, joint_column) in joints_data.column_iter().enumerate() {
            let theta_i = &coeff * joint_column;
            matrix.set_row(i, &theta_i.transpose());
        }
        debug!("coupling matrix: {}", matrix);
        let control_coefficient = left_pseudo_inverse(&matrix, self.rank_tolerance)?;
        info!(
            "coupling estimated from {} samples: A {}x{}, control coefficient {}x{}",
            self.samples.len(),
            matrix.nrows(),
            matrix.ncols(),
            control_coefficient.nrows(),
            control_coefficient.ncols()
        );
        Ok(Coupling {
            matrix,
            control_coefficient,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sample_size_mismatch() {
        let mut estimator = CouplingEstimator::new(2, 3);
        assert!(estimator
            .record_sample(&DVector::zeros(3), &DVector::zeros(3))
            .is_err());
        assert!(estimator
            .record_sample(&DVector::zeros(2), &DVector::zeros(2))
            .is_err());
        assert!(estimator.samples().is_empty());
        estimator
            .record_sample(&DVector::zeros(2), &DVector::zeros(3))
            .unwrap();
        assert_eq!(estimator.samples().len(), 1);
    }
}
