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
//! Simulated hand for dry runs and tests
use crate::config::*;
use crate::controller::RobotController;
use crate::errors::*;
use crate::limits::{ranges_from_matrix, Range};
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Hand whose joints follow `coupling * axes`
///
/// A command is clamped to the limits and read back by the next `get_feedback`.
///
/// # Examples
///
/// ```
/// use nalgebra::{DMatrix, DVector};
/// use glove_retargeting::prelude::*;
/// use glove_retargeting::LinearHand;
///
/// let mut hand = LinearHand::new(
///     DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.5, 0.5, 0.0, 1.0]),
///     DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 1.0]),
/// )
/// .unwrap();
/// hand.move_to(&DVector::from_vec(vec![0.4, 2.0])).unwrap();
/// hand.get_feedback().unwrap();
/// assert_eq!(hand.joint_encoders().as_slice(), &[0.4, 1.0]);
/// assert!((hand.analog_sensors()[1] - 0.7).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearHand {
    coupling: DMatrix<f64>,
    limits: DMatrix<f64>,
    ranges: Vec<Range<f64>>,
    velocity_limits: DMatrix<f64>,
    commanded: DVector<f64>,
    encoders: DVector<f64>,
    analog: DVector<f64>,
    feedback_available: bool,
    move_available: bool,
    move_count: usize,
}

impl LinearHand {
    /// `coupling` is `joints x axes`, `limits` is `axes x 2`
    pub fn new(coupling: DMatrix<f64>, limits: DMatrix<f64>) -> Result<Self> {
        let axes = coupling.ncols();
        let ranges = ranges_from_matrix(&limits, axes)?;
        let commanded = DVector::from_iterator(axes, ranges.iter().map(|r| r.clamp(0.0)));
        let analog = &coupling * &commanded;
        Ok(LinearHand {
            velocity_limits: DMatrix::from_fn(axes, 2, |_, c| if c == 0 { -1.0 } else { 1.0 }),
            coupling,
            limits,
            ranges,
            encoders: commanded.clone(),
            commanded,
            analog,
            feedback_available: true,
            move_available: true,
            move_count: 0,
        })
    }
    pub fn with_velocity_limits(mut self, velocity_limits: DMatrix<f64>) -> Result<Self> {
        ranges_from_matrix(&velocity_limits, self.coupling.ncols())?;
        self.velocity_limits = velocity_limits;
        Ok(self)
    }
    /// Make `get_feedback` fail (`false`) or succeed (`true`)
    pub fn set_feedback_available(&mut self, available: bool) {
        self.feedback_available = available;
    }
    /// Make `move_to` fail (`false`) or succeed (`true`)
    pub fn set_move_available(&mut self, available: bool) {
        self.move_available = available;
    }
    pub fn commanded(&self) -> &DVector<f64> {
        &self.commanded
    }
    pub fn move_count(&self) -> usize {
        self.move_count
    }
    pub fn coupling(&self) -> &DMatrix<f64> {
        &self.coupling
    }
}

impl RobotController for LinearHand {
    fn configure(&mut self, config: &dyn ConfigSource) -> Result<()> {
        let robot = get_string_or(config, "robot", "simulated")?;
        debug!(
            "configured {} hand: {} axes, {} joints",
            robot,
            self.actuated_dofs(),
            self.number_of_joints()
        );
        Ok(())
    }
    fn actuated_dofs(&self) -> usize {
        self.coupling.ncols()
    }
    fn number_of_joints(&self) -> usize {
        self.coupling.nrows()
    }
    fn limits(&self) -> Result<DMatrix<f64>> {
        Ok(self.limits.clone())
    }
    fn velocity_limits(&self) -> Result<DMatrix<f64>> {
        Ok(self.velocity_limits.clone())
    }
    fn get_feedback(&mut self) -> Result<()> {
        if !self.feedback_available {
            return Err(Error::FeedbackUnavailable {
                reason: "simulated hand does not respond".to_owned(),
            });
        }
        self.encoders.copy_from(&self.commanded);
        self.analog = &self.coupling * &self.encoders;
        Ok(())
    }
    fn joint_encoders(&self) -> DVector<f64> {
        self.encoders.clone()
    }
    fn analog_sensors(&self) -> DVector<f64> {
        self.analog.clone()
    }
    fn move_to(&mut self, axis_reference: &DVector<f64>) -> Result<()> {
        if axis_reference.len() != self.actuated_dofs() {
            return Err(Error::size(
                "axis reference",
                self.actuated_dofs(),
                axis_reference.len(),
            ));
        }
        if !self.move_available {
            return Err(Error::ActuationError {
                reason: "simulated hand rejects the command".to_owned(),
            });
        }
        for ((c, r), range) in self
            .commanded
            .iter_mut()
            .zip(axis_reference.iter())
            .zip(&self.ranges)
        {
            *c = range.clamp(*r);
        }
        self.move_count += 1;
        Ok(())
    }
}
