//! Flat CSV dump of an NPV cube.

use crate::cube::{CubeError, NpvCube};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Column names, in order.
pub const CUBE_HEADER: [&str; 7] = [
    "Id",
    "NettingSet",
    "DateIndex",
    "Date",
    "Sample",
    "Depth",
    "Value",
];

/// Cube writer errors.
#[derive(Debug, Error)]
pub enum CubeWriterError {
    /// Trade id absent from the netting-set map.
    #[error("No netting set for id {0}")]
    UnmappedId(String),

    /// Cube read failed.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// File could not be opened or inspected.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Record write failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes cubes as `Id,NettingSet,DateIndex,Date,Sample,Depth,Value` rows.
///
/// T0 rows come first, one per id with `DateIndex`, `Sample` and `Depth` all
/// zero. Grid rows follow with 1-based `DateIndex` and `Sample` and 0-based
/// `Depth`. Values carry four decimals.
///
/// # Examples
///
/// ```no_run
/// use pricer_exposure::output::CubeWriter;
/// # use std::collections::BTreeMap;
/// # use pricer_exposure::cube::NpvCube;
/// # fn run(cube: &NpvCube, map: &BTreeMap<String, String>) {
/// CubeWriter::new("cube.csv").write(cube, map, false).unwrap();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CubeWriter {
    path: PathBuf,
}

impl CubeWriter {
    /// Writer targeting `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `cube`, mapping each id to its netting set.
    ///
    /// With `append` the rows go after the current file content and the
    /// header is only written into an empty file; otherwise the file is
    /// truncated. Every id must be in `netting_sets` before anything is
    /// written.
    pub fn write(
        &self,
        cube: &NpvCube,
        netting_sets: &BTreeMap<String, String>,
        append: bool,
    ) -> Result<usize, CubeWriterError> {
        let mapped = cube
            .ids()
            .iter()
            .map(|id| {
                netting_sets
                    .get(id)
                    .map(String::as_str)
                    .ok_or_else(|| CubeWriterError::UnmappedId(id.clone()))
            })
            .collect::<Result<Vec<&str>, _>>()?;

        let file = if append {
            OpenOptions::new().create(true).append(true).open(&self.path)?
        } else {
            File::create(&self.path)?
        };
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        if needs_header {
            writer.write_record(CUBE_HEADER)?;
        }

        let asof = cube.asof().to_string();
        let mut rows = 0;
        for (i, id) in cube.ids().iter().enumerate() {
            let value = format!("{:.4}", cube.get_t0(i, 0)?);
            writer.write_record([
                id.as_str(),
                mapped[i],
                "0",
                asof.as_str(),
                "0",
                "0",
                value.as_str(),
            ])?;
            rows += 1;
        }

        let dates: Vec<String> = cube.dates().iter().map(|d| d.to_string()).collect();
        for (i, id) in cube.ids().iter().enumerate() {
            for (d, date) in dates.iter().enumerate() {
                for s in 0..cube.samples() {
                    for k in 0..cube.depth() {
                        let value = format!("{:.4}", cube.get(i, d, s, k)?);
                        let (date_index, sample, depth) = (
                            (d + 1).to_string(),
                            (s + 1).to_string(),
                            k.to_string(),
                        );
                        writer.write_record([
                            id.as_str(),
                            mapped[i],
                            date_index.as_str(),
                            date.as_str(),
                            sample.as_str(),
                            depth.as_str(),
                            value.as_str(),
                        ])?;
                        rows += 1;
                    }
                }
            }
        }
        writer.flush()?;
        info!(path = %self.path.display(), rows, append, "Cube written");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::types::Date;
    use std::env;
    use std::fs;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn cube() -> NpvCube {
        let mut cube = NpvCube::new(
            ymd(2024, 1, 1),
            vec!["T1".to_string()],
            vec![ymd(2024, 7, 1)],
            1,
            2,
        )
        .unwrap();
        cube.set_t0(1.0, 0, 0).unwrap();
        cube.set(2.5, 0, 0, 0, 0).unwrap();
        cube.set(-0.123456, 0, 0, 0, 1).unwrap();
        cube
    }

    fn map() -> BTreeMap<String, String> {
        BTreeMap::from([("T1".to_string(), "NS".to_string())])
    }

    #[test]
    fn test_write_layout() {
        let path = env::temp_dir().join("pricer_exposure_cube_writer_layout.csv");
        let rows = CubeWriter::new(&path).write(&cube(), &map(), false).unwrap();
        assert_eq!(rows, 3);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Id,NettingSet,DateIndex,Date,Sample,Depth,Value\n\
             T1,NS,0,2024-01-01,0,0,1.0000\n\
             T1,NS,1,2024-07-01,1,0,2.5000\n\
             T1,NS,1,2024-07-01,1,1,-0.1235\n"
        );
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_append_writes_header_once() {
        let path = env::temp_dir().join("pricer_exposure_cube_writer_append.csv");
        fs::remove_file(&path).ok();
        let writer = CubeWriter::new(&path);
        writer.write(&cube(), &map(), true).unwrap();
        writer.write(&cube(), &map(), true).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("Id,NettingSet").count(), 1);
        assert_eq!(content.lines().count(), 7);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_unmapped_id_is_fatal() {
        let path = env::temp_dir().join("pricer_exposure_cube_writer_unmapped.csv");
        let result = CubeWriter::new(&path).write(&cube(), &BTreeMap::new(), false);
        assert!(matches!(result, Err(CubeWriterError::UnmappedId(id)) if id == "T1"));
    }

    #[test]
    fn test_unwritten_cell_is_fatal() {
        let path = env::temp_dir().join("pricer_exposure_cube_writer_unwritten.csv");
        let mut cube = NpvCube::new(
            ymd(2024, 1, 1),
            vec!["T1".to_string()],
            vec![ymd(2024, 7, 1)],
            1,
            1,
        )
        .unwrap();
        cube.set_t0(1.0, 0, 0).unwrap();
        let result = CubeWriter::new(&path).write(&cube, &map(), false);
        assert!(matches!(result, Err(CubeWriterError::Cube(CubeError::UnwrittenCell { .. }))));
        fs::remove_file(path).ok();
    }
}
