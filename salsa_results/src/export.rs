use std::path::Path;

use serde::Serialize;

use crate::error::ResultsError;
use crate::state_log::{StateLog, StateRecord};

#[derive(Serialize)]
struct CsvRow {
    t: f64,
    px: f64,
    py: f64,
    pz: f64,
    qw: f64,
    qx: f64,
    qy: f64,
    qz: f64,
    vx: f64,
    vy: f64,
    vz: f64,
    tau0: f64,
    tau1: f64,
}

impl From<&StateRecord> for CsvRow {
    fn from(record: &StateRecord) -> Self {
        let q = record.q.quaternion();
        CsvRow {
            t: record.t,
            px: record.p.x,
            py: record.p.y,
            pz: record.p.z,
            qw: q.w,
            qx: q.i,
            qy: q.j,
            qz: q.k,
            vx: record.v.x,
            vy: record.v.y,
            vz: record.v.z,
            tau0: record.tau.x,
            tau1: record.tau.y,
        }
    }
}

impl StateLog {
    /// # Explanation
    /// Writes the log as csv (one row per state, with a header line) so that it can be inspected with
    /// other tools.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), ResultsError> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        for record in self.records() {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush().map_err(|source| ResultsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Exported {} states to {}.", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::state_log::{encode, StateLog};

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("State.csv");
        let rows = [[0.5, 1.0, 2.0, 3.0, 1.0, 0.0, 0.0, 0.0, 4.0, 5.0, 6.0, 7.0, 8.0]];

        StateLog::from_bytes(&encode(&rows))
            .unwrap()
            .write_csv(&path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("t,px,py,pz,qw,qx,qy,qz,vx,vy,vz,tau0,tau1")
        );
        assert_eq!(
            lines.next(),
            Some("0.5,1.0,2.0,3.0,1.0,0.0,0.0,0.0,4.0,5.0,6.0,7.0,8.0")
        );
        assert_eq!(lines.next(), None);
    }
}
