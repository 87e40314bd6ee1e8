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
use crate::config::ConfigSource;
use crate::errors::*;
use nalgebra::{DMatrix, DVector};

/// Actuators and sensors of one robot hand
///
/// `joint_encoders` and `analog_sensors` return the values cached by the last
/// successful `get_feedback`.
pub trait RobotController {
    fn configure(&mut self, config: &dyn ConfigSource) -> Result<()>;
    /// Number of the actuated motor axes
    fn actuated_dofs(&self) -> usize;
    /// Number of the (sensed) joints
    fn number_of_joints(&self) -> usize;
    /// `axes x 2` matrix of `[min, max]` positions
    fn limits(&self) -> Result<DMatrix<f64>>;
    /// `axes x 2` matrix of `[min, max]` velocities
    fn velocity_limits(&self) -> Result<DMatrix<f64>>;
    /// Refresh the cached measurements
    fn get_feedback(&mut self) -> Result<()>;
    fn joint_encoders(&self) -> DVector<f64>;
    fn analog_sensors(&self) -> DVector<f64>;
    fn move_to(&mut self, axis_reference: &DVector<f64>) -> Result<()>;
}

impl<C: RobotController + ?Sized> RobotController for Box<C> {
    fn configure(&mut self, config: &dyn ConfigSource) -> Result<()> {
        (**self).configure(config)
    }
    fn actuated_dofs(&self) -> usize {
        (**self).actuated_dofs()
    }
    fn number_of_joints(&self) -> usize {
        (**self).number_of_joints()
    }
    fn limits(&self) -> Result<DMatrix<f64>> {
        (**self).limits()
    }
    fn velocity_limits(&self) -> Result<DMatrix<f64>> {
        (**self).velocity_limits()
    }
    fn get_feedback(&mut self) -> Result<()> {
        (**self).get_feedback()
    }
    fn joint_encoders(&self) -> DVector<f64> {
        (**self).joint_encoders()
    }
    fn analog_sensors(&self) -> DVector<f64> {
        (**self).analog_sensors()
    }
    fn move_to(&mut self, axis_reference: &DVector<f64>) -> Result<()> {
        (**self).move_to(axis_reference)
    }
}
