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
//! # Retargeting of haptic glove references to robot hands using [nalgebra](http://nalgebra.org).
//!
//! `glove_retargeting` has below functionalities
//!
//! 1. Calibration of the linear coupling between motor axes and joints
//! 1. Retargeting of joint space references to motor axis commands
//! 1. Saturated integration of velocity references
//! 1. Periodic module driving both hands
//!
//! See `FingersRetargeting` for a single hand and `HapticGloveModule` as the top level interface.
//!
mod controller;
mod coupling;
mod errors;
mod integrator;
mod limits;
mod retargeting;
mod sim;
pub mod config;
pub mod excitation;
pub mod glove;
pub mod logger;
pub mod math;
pub mod module;
pub mod prelude;

pub use self::controller::*;
pub use self::coupling::*;
pub use self::errors::*;
pub use self::integrator::*;
pub use self::limits::*;
pub use self::module::{Clock, HapticGloveModule, ModuleState, SystemClock};
pub use self::retargeting::*;
pub use self::sim::*;

// re-export from nalgebra
pub use nalgebra::{DMatrix, DVector};
