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
use crate::limits::Range;
use nalgebra::DVector;

/// Saturated integrator of axis velocities
///
/// It uses the Tustin (trapezoidal) rule, `y(k) = y(k-1) + Ts / 2 * (x(k) + x(k-1))`,
/// and clamps `y` to the limits of each axis at every step.
///
/// # Examples
///
/// ```
/// use nalgebra::DVector;
/// use glove_retargeting::{Integrator, Range};
///
/// let mut integrator = Integrator::new(
///     0.1,
///     DVector::from_vec(vec![0.0, 0.0]),
///     vec![Range::new(-1.0, 1.0), Range::new(0.0, 0.15)],
/// )
/// .unwrap();
/// let y = integrator.integrate(&DVector::from_vec(vec![1.0, 1.0])).unwrap();
/// assert!((y[0] - 0.05).abs() < 1e-12);
/// let y = integrator.integrate(&DVector::from_vec(vec![1.0, 1.0])).unwrap();
/// assert!((y[0] - 0.15).abs() < 1e-12);
/// let y = integrator.integrate(&DVector::from_vec(vec![1.0, 1.0])).unwrap();
/// assert_eq!(y[1], 0.15);
/// ```
#[derive(Debug, Clone)]
pub struct Integrator {
    sampling_time: f64,
    state: DVector<f64>,
    previous_input: DVector<f64>,
    limits: Vec<Range<f64>>,
}

impl Integrator {
    pub fn new(
        sampling_time: f64,
        initial_position: DVector<f64>,
        limits: Vec<Range<f64>>,
    ) -> Result<Self> {
        if !(sampling_time > 0.0) {
            return Err(Error::config(
                "samplingTime",
                format!("must be positive, got {}", sampling_time),
            ));
        }
        if limits.len() != initial_position.len() {
            return Err(Error::size(
                "integrator limits",
                initial_position.len(),
                limits.len(),
            ));
        }
        let dof = initial_position.len();
        let mut integrator = Integrator {
            sampling_time,
            state: initial_position,
            previous_input: DVector::zeros(dof),
            limits,
        };
        integrator.saturate();
        Ok(integrator)
    }
    fn saturate(&mut self) {
        for (value, range) in self.state.iter_mut().zip(&self.limits) {
            *value = range.clamp(*value);
        }
    }
    /// Advance one sampling period and return the new (clamped) position
    pub fn integrate(&mut self, velocity: &DVector<f64>) -> Result<DVector<f64>> {
        if velocity.len() != self.state.len() {
            return Err(Error::size(
                "integrator input",
                self.state.len(),
                velocity.len(),
            ));
        }
        self.state += (velocity + &self.previous_input) * (0.5 * self.sampling_time);
        self.saturate();
        self.previous_input.copy_from(velocity);
        Ok(self.state.clone())
    }
    /// Restart the integration from the given position
    pub fn reset(&mut self, position: &DVector<f64>) -> Result<()> {
        if position.len() != self.state.len() {
            return Err(Error::size(
                "integrator state",
                self.state.len(),
                position.len(),
            ));
        }
        self.state.copy_from(position);
        self.previous_input.fill(0.0);
        self.saturate();
        Ok(())
    }
    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }
    pub fn sampling_time(&self) -> f64 {
        self.sampling_time
    }
    pub fn limits(&self) -> &[Range<f64>] {
        &self.limits
    }
}
