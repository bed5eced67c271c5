use std::path::Path;

use nalgebra::{Quaternion, UnitQuaternion, Vector2, Vector3};

use crate::error::ResultsError;

/// Number of f64 values in one state record: t, p (3), q (4), v (3), tau (2).
pub const STATE_RECORD_LEN: usize = 13;
const RECORD_SIZE: usize = STATE_RECORD_LEN * std::mem::size_of::<f64>();

/// # Explanation
/// One estimate as the estimator logs it. The position and velocity are in the navigation frame, the
/// attitude is the rotation from the navigation frame into the body frame and tau holds the two clock
/// biases of the gnss receiver.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StateRecord {
    pub t: f64,
    pub p: Vector3<f64>,
    pub q: UnitQuaternion<f64>,
    pub v: Vector3<f64>,
    pub tau: Vector2<f64>,
}

impl StateRecord {
    /// The quaternion is stored as (w, x, y, z).
    pub fn from_values(values: &[f64; STATE_RECORD_LEN]) -> Self {
        let q = Quaternion::new(values[4], values[5], values[6], values[7]);
        StateRecord {
            t: values[0],
            p: Vector3::new(values[1], values[2], values[3]),
            q: UnitQuaternion::from_quaternion(q),
            v: Vector3::new(values[8], values[9], values[10]),
            tau: Vector2::new(values[11], values[12]),
        }
    }

    /// (roll, pitch, yaw) in radians.
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        self.q.euler_angles()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StateLog {
    records: Vec<StateRecord>,
}

impl StateLog {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ResultsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ResultsError::MissingLog(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| ResultsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let log = Self::from_bytes(&bytes)?;
        log::info!("Read {} states from {}.", log.len(), path.display());
        Ok(log)
    }

    /// # Explanation
    /// Parses packed little endian f64 records. A trailing partial record means the estimator was killed
    /// while writing (or the file is not a state log) and is reported as an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ResultsError> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(ResultsError::TruncatedLog {
                len: bytes.len(),
                record_size: RECORD_SIZE,
            });
        }

        let records = bytes
            .chunks_exact(RECORD_SIZE)
            .map(|chunk| {
                let mut values = [0.0; STATE_RECORD_LEN];
                for (value, raw) in values.iter_mut().zip(chunk.chunks_exact(8)) {
                    let mut buffer = [0u8; 8];
                    buffer.copy_from_slice(raw);
                    *value = f64::from_le_bytes(buffer);
                }
                StateRecord::from_values(&values)
            })
            .collect();

        Ok(StateLog { records })
    }

    pub fn records(&self) -> &[StateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.t).collect()
    }

    pub fn euler_angles(&self) -> Vec<(f64, f64, f64)> {
        self.records.iter().map(StateRecord::euler_angles).collect()
    }
}

#[cfg(test)]
pub(crate) fn encode(rows: &[[f64; STATE_RECORD_LEN]]) -> Vec<u8> {
    rows.iter()
        .flat_map(|row| row.iter().flat_map(|value| value.to_le_bytes()))
        .collect()
}
