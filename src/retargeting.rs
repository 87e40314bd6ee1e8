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
use crate::config::*;
use crate::controller::RobotController;
use crate::coupling::*;
use crate::errors::*;
use crate::excitation::*;
use crate::integrator::Integrator;
use crate::limits::ranges_from_matrix;
use log::{debug, error, info, warn};
use nalgebra::DVector;

/// Which excitation drives the calibration session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcitationKind {
    /// random velocities integrated into positions
    Random,
    /// one axis at a time, `π/4 + π/4 sin(t)`
    Sinusoid,
}

impl ExcitationKind {
    fn from_config(config: &dyn ConfigSource) -> Result<Self> {
        match get_string_or(config, "calibrationExcitation", "random")?.as_str() {
            "random" => Ok(ExcitationKind::Random),
            "sinusoid" => Ok(ExcitationKind::Sinusoid),
            other => Err(Error::config(
                "calibrationExcitation",
                format!("unknown excitation {}", other),
            )),
        }
    }
}

/// Retargeting of the finger references of one robot hand
///
/// References arrive either in axis space (`set_axis_reference`,
/// `set_axis_velocity_reference`) or in joint space (`set_joint_reference`),
/// and are sent to the hand by `move_robot`.
///
/// # Examples
///
/// ```
/// use nalgebra::{DMatrix, DVector};
/// use glove_retargeting::*;
///
/// let hand = LinearHand::new(
///     DMatrix::identity(2, 2),
///     DMatrix::from_row_slice(2, 2, &[0.0, 2.0, 0.0, 2.0]),
/// )
/// .unwrap();
/// let config = serde_json::json!({ "samplingTime": 0.01, "fingersScaling": [1.0, 2.0] });
/// let mut fingers = FingersRetargeting::configure(hand, &config).unwrap();
/// fingers.set_axis_reference(&DVector::from_vec(vec![0.5, 0.5])).unwrap();
/// assert_eq!(fingers.desired_axis_reference().as_slice(), &[0.5, 1.0]);
/// ```
#[derive(Debug)]
pub struct FingersRetargeting<C: RobotController> {
    controller: C,
    scaling: DVector<f64>,
    motor_joints_coupled: bool,
    do_calibration: bool,
    coupling: Option<Coupling>,
    estimator: CouplingEstimator,
    integrator: Integrator,
    excitation_kind: ExcitationKind,
    calibration_samples: usize,
    random_excitation: RandomVelocityExcitation,
    desired_axis: DVector<f64>,
    desired_joint: DVector<f64>,
    axis_feedback: DVector<f64>,
    joint_feedback: DVector<f64>,
}

impl<C: RobotController> FingersRetargeting<C> {
    /// Configure the controller and build the retargeting from `config`
    ///
    /// The integrator starts from the measured axis values.
    pub fn configure(mut controller: C, config: &dyn ConfigSource) -> Result<Self> {
        controller.configure(config)?;
        let axes = controller.actuated_dofs();
        let joints = controller.number_of_joints();

        let sampling_time = get_f64(config, "samplingTime")?;
        let scaling = get_vector(config, "fingersScaling", axes)?;
        let motor_joints_coupled = get_bool_or(config, "motorsJointsCoupled", false)?;
        info!("motors and joints of the robot are coupled: {}", motor_joints_coupled);
        let do_calibration = motor_joints_coupled && get_bool_or(config, "doCalibration", false)?;
        info!("calibration of the motors/joints coupling: {}", do_calibration);

        let coupling = if !motor_joints_coupled {
            Some(Coupling::identity(joints, axes))
        } else if !do_calibration {
            let values = get_vector(config, "CouplingMatrix", joints * axes)?;
            let coupling = Coupling::from_row_major(joints, axes, values.as_slice()).map_err(
                |e| Error::config("CouplingMatrix", format!("unusable coupling matrix: {}", e)),
            )?;
            Some(coupling)
        } else {
            None
        };

        let excitation_kind = ExcitationKind::from_config(config)?;
        let calibration_samples = get_usize_or(config, "calibrationSamples", 0)?;
        let random_excitation = RandomVelocityExcitation::new(get_u64(config, "randomSeed")?);

        if let Err(e) = controller.get_feedback() {
            warn!("initial feedback is not available: {}", e);
        }
        let axis_feedback = controller.joint_encoders();
        if axis_feedback.len() != axes {
            return Err(Error::size("axis feedback", axes, axis_feedback.len()));
        }
        let joint_feedback = controller.analog_sensors();
        if joint_feedback.len() != joints {
            return Err(Error::size("joint feedback", joints, joint_feedback.len()));
        }
        let limits = ranges_from_matrix(&controller.limits()?, axes)?;
        let integrator = Integrator::new(sampling_time, axis_feedback.clone(), limits)?;

        Ok(FingersRetargeting {
            controller,
            scaling,
            motor_joints_coupled,
            do_calibration,
            coupling,
            estimator: CouplingEstimator::new(axes, joints),
            integrator,
            excitation_kind,
            calibration_samples,
            random_excitation,
            desired_axis: DVector::zeros(axes),
            desired_joint: DVector::zeros(joints),
            axis_feedback,
            joint_feedback,
        })
    }

    pub fn axis_count(&self) -> usize {
        self.scaling.len()
    }
    pub fn joint_count(&self) -> usize {
        self.desired_joint.len()
    }

    /// Set the axis position reference, it is multiplied by the scaling
    pub fn set_axis_reference(&mut self, axis_reference: &DVector<f64>) -> Result<()> {
        if axis_reference.len() != self.axis_count() {
            error!(
                "size of the axis reference ({}) and the number of axes ({}) do not match",
                axis_reference.len(),
                self.axis_count()
            );
            return Err(Error::size(
                "axis reference",
                self.axis_count(),
                axis_reference.len(),
            ));
        }
        self.desired_axis = axis_reference.component_mul(&self.scaling);
        Ok(())
    }
    /// Same as `set_axis_reference`
    pub fn set_axis_position_reference(&mut self, axis_reference: &DVector<f64>) -> Result<()> {
        self.set_axis_reference(axis_reference)
    }
    /// Integrate the scaled velocity reference into the axis position reference
    pub fn set_axis_velocity_reference(&mut self, velocity: &DVector<f64>) -> Result<()> {
        if velocity.len() != self.axis_count() {
            return Err(Error::size(
                "axis velocity reference",
                self.axis_count(),
                velocity.len(),
            ));
        }
        self.desired_axis = self
            .integrator
            .integrate(&velocity.component_mul(&self.scaling))?;
        Ok(())
    }
    /// Set the reference in joint space, it is mapped to the axes by the control coefficient
    pub fn set_joint_reference(&mut self, joint_reference: &DVector<f64>) -> Result<()> {
        if joint_reference.len() != self.joint_count() {
            error!(
                "size of the joint reference ({}) and the number of joints ({}) do not match",
                joint_reference.len(),
                self.joint_count()
            );
            return Err(Error::size(
                "joint reference",
                self.joint_count(),
                joint_reference.len(),
            ));
        }
        let axis_reference = self
            .coupling
            .as_ref()
            .ok_or(Error::CouplingNotAvailable)?
            .axes_from_joints(joint_reference)?;
        self.set_axis_reference(&axis_reference)?;
        self.desired_joint.copy_from(joint_reference);
        Ok(())
    }

    /// Read the measurements from the hand
    ///
    /// In case of error the previous measurements are kept.
    pub fn update_feedback(&mut self) -> Result<()> {
        if let Err(e) = self.controller.get_feedback() {
            warn!("unable to get the finger feedback from the robot: {}", e);
            return Err(Error::FeedbackUnavailable {
                reason: e.to_string(),
            });
        }
        let axes = self.controller.joint_encoders();
        let joints = self.controller.analog_sensors();
        if axes.len() != self.axis_count() || joints.len() != self.joint_count() {
            warn!(
                "feedback has wrong size: {} axes, {} joints",
                axes.len(),
                joints.len()
            );
            return Err(Error::FeedbackUnavailable {
                reason: format!(
                    "expected {} axes and {} joints, got {} and {}",
                    self.axis_count(),
                    self.joint_count(),
                    axes.len(),
                    joints.len()
                ),
            });
        }
        self.axis_feedback = axes;
        self.joint_feedback = joints;
        Ok(())
    }
    pub fn axis_measured_values(&self) -> &DVector<f64> {
        &self.axis_feedback
    }
    pub fn joint_measured_values(&self) -> &DVector<f64> {
        &self.joint_feedback
    }
    pub fn desired_axis_reference(&self) -> &DVector<f64> {
        &self.desired_axis
    }
    pub fn desired_joint_reference(&self) -> &DVector<f64> {
        &self.desired_joint
    }

    /// Send the desired axis reference to the hand
    pub fn move_robot(&mut self) -> Result<()> {
        self.controller.move_to(&self.desired_axis)
    }

    /// `true` while the coupling is waiting for `train_coupling_matrix`
    pub fn is_calibrating(&self) -> bool {
        self.motor_joints_coupled && self.do_calibration
    }
    pub fn calibration_sample_count(&self) -> usize {
        self.estimator.samples().len()
    }
    /// Samples to record before the coupling is trained, `0` if it is trained out-of-band
    pub fn calibration_samples(&self) -> usize {
        self.calibration_samples
    }
    pub fn excitation_kind(&self) -> ExcitationKind {
        self.excitation_kind
    }

    fn record_calibration_sample(&mut self) -> Result<()> {
        if let Err(e) = self.update_feedback() {
            debug!("calibration sample uses the previous feedback: {}", e);
        }
        self.estimator
            .record_sample(&self.axis_feedback, &self.joint_feedback)
    }
    fn push_calibration_reference(&mut self, axis_reference: &DVector<f64>) -> Result<()> {
        self.set_axis_reference(axis_reference)?;
        self.move_robot()
    }

    /// Record a calibration sample and move the hand with a random velocity
    ///
    /// It returns `Ok(false)` and does nothing if the hand is not calibrating.
    pub fn record_calibration_sample_random(&mut self) -> Result<bool> {
        if !self.is_calibrating() {
            return Ok(false);
        }
        let velocity_limits = self.controller.velocity_limits()?;
        if velocity_limits.nrows() != self.axis_count() || velocity_limits.ncols() != 2 {
            return Err(Error::size(
                "velocity limits",
                self.axis_count(),
                velocity_limits.nrows(),
            ));
        }
        let velocity = self.random_excitation.next_velocity(&velocity_limits)?;
        self.record_calibration_sample()?;
        let reference = self.integrator.integrate(&velocity)?;
        debug!("random excitation reference: {}", reference.transpose());
        self.push_calibration_reference(&reference)?;
        Ok(true)
    }
    /// Record a calibration sample and move `axis` along `π/4 + π/4 sin(time)`
    ///
    /// It returns `Ok(false)` and does nothing if the hand is not calibrating.
    pub fn record_calibration_sample_sinusoid(&mut self, time: f64, axis: usize) -> Result<bool> {
        if !self.is_calibrating() {
            return Ok(false);
        }
        let reference = sinusoid_reference(self.axis_count(), axis, time)?;
        self.record_calibration_sample()?;
        self.push_calibration_reference(&reference)?;
        Ok(true)
    }
    /// Estimate the coupling from the recorded samples
    ///
    /// On success the calibration is finished and the coupling is kept until the end.
    /// A hand which is not calibrating returns its current coupling.
    pub fn train_coupling_matrix(&mut self) -> Result<&Coupling> {
        if !self.is_calibrating() {
            return self.coupling.as_ref().ok_or(Error::CouplingNotAvailable);
        }
        let coupling = self.estimator.estimate_coupling()?;
        info!(
            "trained the coupling matrix from {} samples",
            self.calibration_sample_count()
        );
        self.do_calibration = false;
        self.estimator.clear();
        Ok(self.coupling.insert(coupling))
    }

    pub fn coupling(&self) -> Option<&Coupling> {
        self.coupling.as_ref()
    }
    pub fn scaling(&self) -> &DVector<f64> {
        &self.scaling
    }
    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }
    pub fn controller(&self) -> &C {
        &self.controller
    }
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }
}
