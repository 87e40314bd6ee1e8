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
//! Conversions between the glove data and the retargeting vectors
use crate::errors::*;
use nalgebra::{DMatrix, DVector};

/// Force feedback saturates at this value
pub const MAX_FORCE_FEEDBACK: f64 = 40.0;

/// Number of the links of the glove hand model
pub const HAND_LINKS: usize = 20;

/// `(link, component)` of the hand angle table for each human joint
///
/// Thumb, index, middle, ring and pinkie, three joints each, proximal to distal.
const HUMAN_JOINT_TABLE: [(usize, usize); 15] = [
    (0, 2),
    (1, 1),
    (2, 1),
    (4, 2),
    (5, 1),
    (6, 1),
    (8, 1),
    (9, 1),
    (10, 1),
    (12, 1),
    (13, 1),
    (14, 1),
    (16, 1),
    (17, 1),
    (18, 1),
];

pub const HUMAN_JOINTS: usize = HUMAN_JOINT_TABLE.len();

fn check_size(name: &str, values: &[f64], dof: usize) -> Result<()> {
    if values.len() != dof {
        return Err(Error::size(name, dof, values.len()));
    }
    Ok(())
}

/// Force feedback in percent of the maximum force
///
/// # Examples
///
/// ```
/// use glove_retargeting::glove::force_feedback_command;
///
/// let cmd = force_feedback_command(&[-1.0, 0.0, 10.0, 40.0, 100.0], 5).unwrap();
/// assert_eq!(cmd, vec![0, 0, 25, 100, 100]);
/// ```
pub fn force_feedback_command(forces: &[f64], dof: usize) -> Result<Vec<i32>> {
    check_size("force feedback reference", forces, dof)?;
    Ok(forces
        .iter()
        .map(|f| {
            if *f > 0.0 {
                (f.min(MAX_FORCE_FEEDBACK) * 100.0 / MAX_FORCE_FEEDBACK).round() as i32
            } else {
                0
            }
        })
        .collect())
}

/// Vibrotactile intensity of each buzz motor
///
/// # Examples
///
/// ```
/// use glove_retargeting::glove::buzz_command;
///
/// assert_eq!(buzz_command(&[-3.0, 12.4, 12.6], 3).unwrap(), vec![0, 12, 13]);
/// assert!(buzz_command(&[1.0], 3).is_err());
/// ```
pub fn buzz_command(values: &[f64], dof: usize) -> Result<Vec<i32>> {
    check_size("buzz reference", values, dof)?;
    Ok(values
        .iter()
        .map(|v| if *v > 0.0 { v.round() as i32 } else { 0 })
        .collect())
}

/// Human finger joint angles from the glove hand angle table (`links x [x, y, z]`)
pub fn human_joint_angles(hand_angles: &DMatrix<f64>) -> Result<DVector<f64>> {
    if hand_angles.nrows() != HAND_LINKS {
        return Err(Error::size("hand angle links", HAND_LINKS, hand_angles.nrows()));
    }
    if hand_angles.ncols() != 3 {
        return Err(Error::size("hand angle components", 3, hand_angles.ncols()));
    }
    Ok(DVector::from_iterator(
        HUMAN_JOINTS,
        HUMAN_JOINT_TABLE
            .iter()
            .map(|&(link, component)| hand_angles[(link, component)]),
    ))
}
