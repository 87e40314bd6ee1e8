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
//! Periodic module driving the retargeting of both hands
use crate::config::*;
use crate::controller::RobotController;
use crate::errors::*;
use crate::excitation::SinusoidSchedule;
use crate::logger::DataLogger;
use crate::retargeting::{ExcitationKind, FingersRetargeting};
use log::{error, info, warn};
use nalgebra::DVector;
use serde_json::{Map, Value};
use std::f64::consts::FRAC_PI_4;
use std::fmt::{self, Display};
use std::time::{SystemTime, UNIX_EPOCH};

pub const GENERAL_GROUP: &str = "GENERAL";
pub const LEFT_FINGERS_GROUP: &str = "LEFT_FINGERS_RETARGETING";
pub const RIGHT_FINGERS_GROUP: &str = "RIGHT_FINGERS_RETARGETING";

/// Source of the time in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock time since the UNIX epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

impl<F: Fn() -> f64> Clock for F {
    fn now(&self) -> f64 {
        self()
    }
}

/// State of the module, `Running` is never left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Configured,
    InPreparation,
    Running,
}

impl Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModuleState::Configured => write!(f, "configured"),
            ModuleState::InPreparation => write!(f, "in preparation"),
            ModuleState::Running => write!(f, "running"),
        }
    }
}

/// Haptic glove module, one `update_module` call per period
pub struct HapticGloveModule<C: RobotController, L: DataLogger, K: Clock> {
    name: String,
    period: f64,
    move_robot: bool,
    state: ModuleState,
    time_starting: f64,
    time_now: f64,
    left_hand: FingersRetargeting<C>,
    right_hand: FingersRetargeting<C>,
    logger: Option<L>,
    clock: K,
}

fn configure_hand<C: RobotController>(
    config: &dyn ConfigSource,
    group: &str,
    controller: C,
) -> Result<FingersRetargeting<C>> {
    let hand_config = ConfigGroup::merged(config, group, GENERAL_GROUP)?;
    FingersRetargeting::configure(controller, &hand_config).map_err(|e| {
        error!("unable to initialize {}: {}", group, e);
        e
    })
}

impl<C, L, K> HapticGloveModule<C, L, K>
where
    C: RobotController,
    L: DataLogger,
    K: Clock,
{
    /// Build the module and both hands from the configuration
    ///
    /// `logger` is required if `enableLogger` is set.
    pub fn configure(
        config: &dyn ConfigSource,
        left: C,
        right: C,
        logger: Option<L>,
        clock: K,
    ) -> Result<Self> {
        let name = get_string(config, "name")?;
        let empty = Map::new();
        let general = config
            .find(GENERAL_GROUP)
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let period = get_f64_or(general, "samplingTime", 0.1)?;
        if !(period > 0.0) {
            return Err(Error::config("samplingTime", "period must be positive"));
        }
        let move_robot = get_bool_or(general, "enableMoveRobot", true)?;
        info!("move the robot: {}", move_robot);
        let enable_logger = get_bool_or(general, "enableLogger", false)?;
        info!("enable the logger: {}", enable_logger);

        let left_hand = configure_hand(config, LEFT_FINGERS_GROUP, left)?;
        let right_hand = configure_hand(config, RIGHT_FINGERS_GROUP, right)?;

        let logger = if enable_logger {
            let mut logger = logger
                .ok_or_else(|| Error::config("enableLogger", "no data logger is given"))?;
            open_logger(&mut logger, &name, &left_hand, &right_hand)?;
            info!("logging is active");
            Some(logger)
        } else {
            None
        };

        Ok(HapticGloveModule {
            name,
            period,
            move_robot,
            state: ModuleState::Configured,
            time_starting: 0.0,
            time_now: 0.0,
            left_hand,
            right_hand,
            logger,
            clock,
        })
    }

    /// One cycle of the module
    ///
    /// Failures inside the cycle are logged and the cycle continues.
    pub fn update_module(&mut self) -> Result<()> {
        match self.state {
            ModuleState::Configured => {
                self.state = ModuleState::InPreparation;
            }
            ModuleState::InPreparation => {
                self.time_starting = self.clock.now();
                self.state = ModuleState::Running;
                info!("start the haptic glove module {}", self.name);
            }
            ModuleState::Running => self.run_cycle(),
        }
        Ok(())
    }

    fn run_cycle(&mut self) {
        self.time_now = self.clock.now();
        let elapsed = self.time_now - self.time_starting;
        for (side, hand) in [("left", &mut self.left_hand), ("right", &mut self.right_hand)] {
            if let Err(e) = hand.update_feedback() {
                error!("unable to update the feedback of the {} hand: {}", side, e);
            }
            if hand.is_calibrating() && hand.calibration_samples() > 0 && self.move_robot {
                calibration_step(hand, side, elapsed);
                continue;
            }
            let reference =
                DVector::from_element(hand.axis_count(), FRAC_PI_4 + FRAC_PI_4 * elapsed.sin());
            if let Err(e) = hand.set_axis_reference(&reference) {
                error!("unable to set the {} hand reference: {}", side, e);
            }
            if self.move_robot {
                if let Err(e) = hand.move_robot() {
                    error!("unable to move the {} hand: {}", side, e);
                }
            }
        }
        if let Some(logger) = self.logger.as_mut() {
            if let Err(e) = log_cycle(
                logger,
                &self.name,
                self.time_now,
                &self.left_hand,
                &self.right_hand,
            ) {
                warn!("unable to log the cycle: {}", e);
            }
        }
    }

    /// Flush the remaining data
    pub fn close(&mut self) -> Result<()> {
        match self.logger.as_mut() {
            Some(logger) => logger.flush(),
            None => Ok(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    /// Sampling period [s]
    pub fn period(&self) -> f64 {
        self.period
    }
    pub fn state(&self) -> ModuleState {
        self.state
    }
    pub fn time_starting(&self) -> f64 {
        self.time_starting
    }
    pub fn left_hand(&self) -> &FingersRetargeting<C> {
        &self.left_hand
    }
    pub fn left_hand_mut(&mut self) -> &mut FingersRetargeting<C> {
        &mut self.left_hand
    }
    pub fn right_hand(&self) -> &FingersRetargeting<C> {
        &self.right_hand
    }
    pub fn right_hand_mut(&mut self) -> &mut FingersRetargeting<C> {
        &mut self.right_hand
    }
    pub fn logger(&self) -> Option<&L> {
        self.logger.as_ref()
    }
}

/// Record one excitation sample, train once the sample budget is reached
fn calibration_step<C: RobotController>(hand: &mut FingersRetargeting<C>, side: &str, time: f64) {
    let budget = hand.calibration_samples();
    let recorded = match hand.excitation_kind() {
        ExcitationKind::Random => hand.record_calibration_sample_random(),
        ExcitationKind::Sinusoid => {
            let schedule = SinusoidSchedule {
                samples_per_axis: budget / hand.axis_count().max(1),
            };
            let axis = schedule.axis_for_sample(hand.calibration_sample_count(), hand.axis_count());
            hand.record_calibration_sample_sinusoid(time, axis)
        }
    };
    if let Err(e) = recorded {
        error!("unable to record the {} hand calibration sample: {}", side, e);
        return;
    }
    let count = hand.calibration_sample_count();
    if count > 0 && count % budget == 0 {
        match hand.train_coupling_matrix() {
            Ok(_) => info!("{} hand coupling is calibrated", side),
            Err(e) => warn!(
                "{} hand calibration failed, continue the excitation: {}",
                side, e
            ),
        }
    }
}

fn series(prefix: &str, name: &str) -> String {
    format!("{}_{}", prefix, name)
}

fn open_logger<C: RobotController, L: DataLogger>(
    logger: &mut L,
    prefix: &str,
    left: &FingersRetargeting<C>,
    right: &FingersRetargeting<C>,
) -> Result<()> {
    logger.create(&series(prefix, "time"), 1)?;
    for (side, hand) in [("left", left), ("right", right)] {
        for kind in ["axis_reference", "axis_feedback"] {
            logger.create(&series(prefix, &format!("{}_{}", side, kind)), hand.axis_count())?;
        }
        for kind in ["joint_reference", "joint_feedback"] {
            logger.create(&series(prefix, &format!("{}_{}", side, kind)), hand.joint_count())?;
        }
    }
    Ok(())
}

fn log_cycle<C: RobotController, L: DataLogger>(
    logger: &mut L,
    prefix: &str,
    time: f64,
    left: &FingersRetargeting<C>,
    right: &FingersRetargeting<C>,
) -> Result<()> {
    logger.add_scalar(&series(prefix, "time"), time)?;
    for (side, hand) in [("left", left), ("right", right)] {
        let snapshots = [
            ("axis_reference", hand.desired_axis_reference()),
            ("axis_feedback", hand.axis_measured_values()),
            ("joint_reference", hand.desired_joint_reference()),
            ("joint_feedback", hand.joint_measured_values()),
        ];
        for (kind, values) in snapshots {
            logger.add_vector(
                &series(prefix, &format!("{}_{}", side, kind)),
                values.as_slice(),
            )?;
        }
    }
    logger.flush()
}
