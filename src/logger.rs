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
//! Recording of the per-cycle data
use crate::errors::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Sink of named scalar or vector series
pub trait DataLogger {
    /// Declare a series of `size` elements
    fn create(&mut self, name: &str, size: usize) -> Result<()>;
    fn add_scalar(&mut self, name: &str, value: f64) -> Result<()>;
    fn add_vector(&mut self, name: &str, values: &[f64]) -> Result<()>;
    /// Emit the data added since the last flush
    fn flush(&mut self) -> Result<()>;
}

/// Values of one flush
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogRecord {
    pub series: BTreeMap<String, Vec<f64>>,
}

impl LogRecord {
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default)]
struct SeriesBuffer {
    sizes: BTreeMap<String, usize>,
    pending: LogRecord,
}

impl SeriesBuffer {
    fn create(&mut self, name: &str, size: usize) -> Result<()> {
        if self.sizes.insert(name.to_owned(), size).is_some() {
            return Err(Error::LoggerError {
                reason: format!("series {} already exists", name),
            });
        }
        Ok(())
    }
    fn add(&mut self, name: &str, values: &[f64]) -> Result<()> {
        let size = *self.sizes.get(name).ok_or_else(|| Error::LoggerError {
            reason: format!("series {} is not created", name),
        })?;
        if values.len() != size {
            return Err(Error::size(name, size, values.len()));
        }
        self.pending.series.insert(name.to_owned(), values.to_vec());
        Ok(())
    }
    fn take(&mut self) -> Option<LogRecord> {
        if self.pending.series.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Logger which keeps all the records in memory
///
/// # Examples
///
/// ```
/// use glove_retargeting::logger::*;
///
/// let mut logger = MemoryLogger::default();
/// logger.create("time", 1).unwrap();
/// logger.add_scalar("time", 0.5).unwrap();
/// assert!(logger.add_vector("time", &[1.0, 2.0]).is_err());
/// logger.flush().unwrap();
/// assert_eq!(logger.records()[0].get("time"), Some(&[0.5][..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    buffer: SeriesBuffer,
    records: Vec<LogRecord>,
}

impl MemoryLogger {
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }
    pub fn series_size(&self, name: &str) -> Option<usize> {
        self.buffer.sizes.get(name).copied()
    }
}

impl DataLogger for MemoryLogger {
    fn create(&mut self, name: &str, size: usize) -> Result<()> {
        self.buffer.create(name, size)
    }
    fn add_scalar(&mut self, name: &str, value: f64) -> Result<()> {
        self.buffer.add(name, &[value])
    }
    fn add_vector(&mut self, name: &str, values: &[f64]) -> Result<()> {
        self.buffer.add(name, values)
    }
    fn flush(&mut self) -> Result<()> {
        if let Some(record) = self.buffer.take() {
            self.records.push(record);
        }
        Ok(())
    }
}

/// Logger which writes one JSON object per flush
pub struct JsonLinesLogger<W: Write> {
    buffer: SeriesBuffer,
    writer: W,
}

impl<W: Write> JsonLinesLogger<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesLogger {
            buffer: SeriesBuffer::default(),
            writer,
        }
    }
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DataLogger for JsonLinesLogger<W> {
    fn create(&mut self, name: &str, size: usize) -> Result<()> {
        self.buffer.create(name, size)
    }
    fn add_scalar(&mut self, name: &str, value: f64) -> Result<()> {
        self.buffer.add(name, &[value])
    }
    fn add_vector(&mut self, name: &str, values: &[f64]) -> Result<()> {
        self.buffer.add(name, values)
    }
    fn flush(&mut self) -> Result<()> {
        let to_logger_error = |e: &dyn std::fmt::Display| Error::LoggerError {
            reason: e.to_string(),
        };
        if let Some(record) = self.buffer.take() {
            serde_json::to_writer(&mut self.writer, &record.series)
                .map_err(|e| to_logger_error(&e))?;
            self.writer
                .write_all(b"\n")
                .map_err(|e| to_logger_error(&e))?;
        }
        self.writer.flush().map_err(|e| to_logger_error(&e))
    }
}
