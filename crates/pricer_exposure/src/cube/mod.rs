//! Dense exposure cube.
//!
//! An [`NpvCube`] holds one value per `(id, date, sample, depth)` plus a T0
//! slice per `(id, depth)`. Storage is a single flat buffer laid out
//! sample-major:
//!
//! ```text
//! offset(id, date, sample, depth) = ((sample * dates + date) * ids + id) * depth_size + depth
//! ```
//!
//! so each sample owns one contiguous block. [`NpvCube::sample_slices_mut`]
//! hands out those blocks as disjoint mutable slices for parallel
//! population without locking.
//!
//! Unwritten cells hold NaN. Writes reject non-finite values, so a NaN read
//! is always an unwritten cell and is reported as
//! [`CubeError::UnwrittenCell`].

mod error;
mod slice;

pub use error::{CubeAxis, CubeError};
pub use slice::SampleSliceMut;

use pricer_core::types::Date;
use std::collections::HashMap;

#[inline]
pub(crate) fn check(axis: CubeAxis, index: usize, size: usize) -> Result<(), CubeError> {
    if index < size {
        Ok(())
    } else {
        Err(CubeError::IndexOutOfRange { axis, index, size })
    }
}

#[inline]
pub(crate) fn check_value(value: f64) -> Result<(), CubeError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CubeError::NonFiniteValue(value))
    }
}

/// Dense 4D valuation store with a T0 slice.
///
/// # Examples
///
/// ```
/// use pricer_core::types::Date;
/// use pricer_exposure::cube::{CubeError, NpvCube};
///
/// let asof = Date::from_ymd(2024, 1, 1).unwrap();
/// let dates = vec![Date::from_ymd(2024, 7, 1).unwrap(), Date::from_ymd(2025, 1, 1).unwrap()];
/// let mut cube = NpvCube::new(asof, vec!["T1".to_string()], dates, 100, 1).unwrap();
///
/// cube.set(12.5, 0, 1, 42, 0).unwrap();
/// assert_eq!(cube.get(0, 1, 42, 0).unwrap(), 12.5);
/// assert!(matches!(cube.get(0, 0, 42, 0), Err(CubeError::UnwrittenCell { .. })));
/// ```
#[derive(Debug, Clone)]
pub struct NpvCube {
    asof: Date,
    ids: Vec<String>,
    id_index: HashMap<String, usize>,
    dates: Vec<Date>,
    samples: usize,
    depth: usize,
    t0: Vec<f64>,
    data: Vec<f64>,
}

impl NpvCube {
    /// Allocates a cube with every cell unwritten.
    ///
    /// # Errors
    ///
    /// - `InvalidDimensions` if any dimension is zero, the dates are not
    ///   strictly increasing after `asof`, or the buffer size overflows
    /// - `DuplicateId` if two ids coincide
    pub fn new(
        asof: Date,
        ids: Vec<String>,
        dates: Vec<Date>,
        samples: usize,
        depth: usize,
    ) -> Result<Self, CubeError> {
        if ids.is_empty() || dates.is_empty() || samples == 0 || depth == 0 {
            return Err(CubeError::InvalidDimensions(format!(
                "ids={}, dates={}, samples={}, depth={}",
                ids.len(),
                dates.len(),
                samples,
                depth
            )));
        }
        if dates[0] <= asof || dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(CubeError::InvalidDimensions(
                "dates must be strictly increasing and after asof".to_string(),
            ));
        }

        let mut id_index = HashMap::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            if id_index.insert(id.clone(), i).is_some() {
                return Err(CubeError::DuplicateId(id.clone()));
            }
        }

        let len = ids
            .len()
            .checked_mul(dates.len())
            .and_then(|n| n.checked_mul(samples))
            .and_then(|n| n.checked_mul(depth))
            .ok_or_else(|| CubeError::InvalidDimensions("cube size overflows".to_string()))?;

        Ok(Self {
            asof,
            t0: vec![f64::NAN; ids.len() * depth],
            data: vec![f64::NAN; len],
            id_index,
            ids,
            dates,
            samples,
            depth,
        })
    }

    #[inline]
    fn offset(
        &self,
        id: usize,
        date: usize,
        sample: usize,
        depth: usize,
    ) -> Result<usize, CubeError> {
        check(CubeAxis::Id, id, self.ids.len())?;
        check(CubeAxis::Date, date, self.dates.len())?;
        check(CubeAxis::Sample, sample, self.samples)?;
        check(CubeAxis::Depth, depth, self.depth)?;
        Ok(((sample * self.dates.len() + date) * self.ids.len() + id) * self.depth + depth)
    }

    #[inline]
    fn t0_offset(&self, id: usize, depth: usize) -> Result<usize, CubeError> {
        check(CubeAxis::Id, id, self.ids.len())?;
        check(CubeAxis::Depth, depth, self.depth)?;
        Ok(id * self.depth + depth)
    }

    /// Writes a grid cell; last writer wins.
    pub fn set(
        &mut self,
        value: f64,
        id: usize,
        date: usize,
        sample: usize,
        depth: usize,
    ) -> Result<(), CubeError> {
        check_value(value)?;
        let offset = self.offset(id, date, sample, depth)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Reads a grid cell.
    pub fn get(
        &self,
        id: usize,
        date: usize,
        sample: usize,
        depth: usize,
    ) -> Result<f64, CubeError> {
        let value = self.data[self.offset(id, date, sample, depth)?];
        if value.is_nan() {
            return Err(CubeError::UnwrittenCell {
                id,
                date: Some(date),
                sample: Some(sample),
                depth,
            });
        }
        Ok(value)
    }

    /// Writes a T0 cell.
    pub fn set_t0(&mut self, value: f64, id: usize, depth: usize) -> Result<(), CubeError> {
        check_value(value)?;
        let offset = self.t0_offset(id, depth)?;
        self.t0[offset] = value;
        Ok(())
    }

    /// Reads a T0 cell.
    pub fn get_t0(&self, id: usize, depth: usize) -> Result<f64, CubeError> {
        let value = self.t0[self.t0_offset(id, depth)?];
        if value.is_nan() {
            return Err(CubeError::UnwrittenCell {
                id,
                date: None,
                sample: None,
                depth,
            });
        }
        Ok(value)
    }

    /// Whether a grid cell has been written.
    pub fn is_written(
        &self,
        id: usize,
        date: usize,
        sample: usize,
        depth: usize,
    ) -> Result<bool, CubeError> {
        Ok(!self.data[self.offset(id, date, sample, depth)?].is_nan())
    }

    /// Overwrites every T0 and grid cell of one id, all depths.
    pub fn fill_id(&mut self, id: usize, value: f64) -> Result<(), CubeError> {
        check_value(value)?;
        check(CubeAxis::Id, id, self.ids.len())?;
        let depth = self.depth;
        self.t0[id * depth..(id + 1) * depth].fill(value);
        for block in self.data.chunks_exact_mut(self.ids.len() * depth) {
            block[id * depth..(id + 1) * depth].fill(value);
        }
        Ok(())
    }

    /// Overwrites the T0 cells of one id, all depths.
    pub fn fill_t0(&mut self, id: usize, value: f64) -> Result<(), CubeError> {
        check_value(value)?;
        check(CubeAxis::Id, id, self.ids.len())?;
        self.t0[id * self.depth..(id + 1) * self.depth].fill(value);
        Ok(())
    }

    /// One mutable slice per sample, in sample order.
    pub fn sample_slices_mut(&mut self) -> Vec<SampleSliceMut<'_>> {
        let stride = self.dates.len() * self.ids.len() * self.depth;
        let (n_dates, n_ids, depth) = (self.dates.len(), self.ids.len(), self.depth);
        self.data
            .chunks_exact_mut(stride)
            .enumerate()
            .map(|(sample, data)| SampleSliceMut::new(sample, data, n_dates, n_ids, depth))
            .collect()
    }

    /// Ids along the first axis.
    #[inline]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Position of an id.
    #[inline]
    pub fn id_index(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    /// Number of ids.
    #[inline]
    pub fn num_ids(&self) -> usize {
        self.ids.len()
    }

    /// Simulation dates.
    #[inline]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of simulation dates.
    #[inline]
    pub fn num_dates(&self) -> usize {
        self.dates.len()
    }

    /// Number of samples.
    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Depth slots per cell.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Valuation date of the T0 slice.
    #[inline]
    pub fn asof(&self) -> Date {
        self.asof
    }
}
