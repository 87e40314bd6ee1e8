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
use thiserror::Error;

/// The reason of the failure of retargeting, calibration or configuration
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error at {key}: {reason}")]
    ConfigurationError { key: String, reason: String },
    #[error("size of {name} is invalid: expected {expected}, got {actual}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("feedback is not available: {reason}")]
    FeedbackUnavailable { reason: String },
    #[error(
        "calibration data is degenerate: rank {rank} from {samples} samples, {required} required"
    )]
    DegenerateCalibrationData {
        samples: usize,
        rank: usize,
        required: usize,
    },
    #[error("coupling matrix is not available, calibration has not been trained yet")]
    CouplingNotAvailable,
    #[error("failed to move the robot: {reason}")]
    ActuationError { reason: String },
    #[error("data logger error: {reason}")]
    LoggerError { reason: String },
}

impl Error {
    pub(crate) fn config(key: &str, reason: impl Into<String>) -> Self {
        Error::ConfigurationError {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn size(name: &str, expected: usize, actual: usize) -> Self {
        Error::SizeMismatch {
            name: name.to_owned(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
