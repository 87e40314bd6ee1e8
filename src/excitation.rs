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
//! Excitation signals used while the coupling is calibrated
use crate::errors::*;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_PI_4;

/// Independent random velocity for each axis
#[derive(Debug, Clone)]
pub struct RandomVelocityExcitation {
    rng: StdRng,
}

impl RandomVelocityExcitation {
    /// `None` seeds the generator from the OS
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomVelocityExcitation { rng }
    }
    /// Draw `v_i` uniformly from `[-vmax_i, vmax_i]`, `vmax_i = velocity_limits[(i, 1)]`
    ///
    /// `2 * vmax_i` must be finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use nalgebra::DMatrix;
    /// use glove_retargeting::excitation::RandomVelocityExcitation;
    ///
    /// let limits = DMatrix::from_row_slice(2, 2, &[-1.0, 1.0, -0.1, 0.1]);
    /// let mut excitation = RandomVelocityExcitation::new(Some(3));
    /// let v = excitation.next_velocity(&limits).unwrap();
    /// assert!(v[0].abs() <= 1.0);
    /// assert!(v[1].abs() <= 0.1);
    ///
    /// let huge = DMatrix::from_row_slice(1, 2, &[-f64::MAX, f64::MAX]);
    /// assert!(excitation.next_velocity(&huge).is_err());
    /// ```
    pub fn next_velocity(&mut self, velocity_limits: &DMatrix<f64>) -> Result<DVector<f64>> {
        if velocity_limits.ncols() < 2 {
            return Err(Error::size("velocity limits columns", 2, velocity_limits.ncols()));
        }
        let axes = velocity_limits.nrows();
        let mut velocity = DVector::zeros(axes);
        for i in 0..axes {
            let max = velocity_limits[(i, 1)].abs();
            if !(2.0 * max).is_finite() {
                return Err(Error::config(
                    "velocity limits",
                    format!("axis {} has unusable maximum velocity {}", i, max),
                ));
            }
            if max > 0.0 {
                velocity[i] = self.rng.gen_range(-max..=max);
            }
        }
        Ok(velocity)
    }
}

/// `π/4 + π/4 sin(t)` on `axis`, zero on the other axes
///
/// # Examples
///
/// ```
/// use glove_retargeting::excitation::sinusoid_reference;
///
/// let r = sinusoid_reference(3, 1, 0.0).unwrap();
/// assert_eq!(r[0], 0.0);
/// assert!((r[1] - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
/// assert!(sinusoid_reference(3, 3, 0.0).is_err());
/// ```
pub fn sinusoid_reference(axis_count: usize, axis: usize, time: f64) -> Result<DVector<f64>> {
    if axis >= axis_count {
        return Err(Error::size("excited axis", axis_count, axis + 1));
    }
    let mut reference = DVector::zeros(axis_count);
    reference[axis] = FRAC_PI_4 + FRAC_PI_4 * time.sin();
    Ok(reference)
}

/// Sweep the axes one at a time, `samples_per_axis` samples each
#[derive(Debug, Clone, Copy)]
pub struct SinusoidSchedule {
    pub samples_per_axis: usize,
}

impl SinusoidSchedule {
    /// # Examples
    ///
    /// ```
    /// let schedule = glove_retargeting::excitation::SinusoidSchedule { samples_per_axis: 10 };
    /// assert_eq!(schedule.axis_for_sample(0, 3), 0);
    /// assert_eq!(schedule.axis_for_sample(25, 3), 2);
    /// assert_eq!(schedule.axis_for_sample(31, 3), 0);
    /// ```
    pub fn axis_for_sample(&self, index: usize, axis_count: usize) -> usize {
        if axis_count == 0 {
            return 0;
        }
        (index / self.samples_per_axis.max(1)) % axis_count
    }
}
