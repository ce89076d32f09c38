//! Per-sample mutable view of a cube.

use super::{check, check_value, CubeAxis, CubeError};

/// The block of one sample: every `(id, date, depth)` cell of that sample.
///
/// Slices of different samples never overlap, so they can be filled on
/// different threads.
#[derive(Debug)]
pub struct SampleSliceMut<'a> {
    sample: usize,
    data: &'a mut [f64],
    n_dates: usize,
    n_ids: usize,
    depth: usize,
}

impl<'a> SampleSliceMut<'a> {
    pub(crate) fn new(
        sample: usize,
        data: &'a mut [f64],
        n_dates: usize,
        n_ids: usize,
        depth: usize,
    ) -> Self {
        Self {
            sample,
            data,
            n_dates,
            n_ids,
            depth,
        }
    }

    #[inline]
    fn offset(&self, id: usize, date: usize, depth: usize) -> Result<usize, CubeError> {
        check(CubeAxis::Id, id, self.n_ids)?;
        check(CubeAxis::Date, date, self.n_dates)?;
        check(CubeAxis::Depth, depth, self.depth)?;
        Ok((date * self.n_ids + id) * self.depth + depth)
    }

    /// Sample index of this block.
    #[inline]
    pub fn sample(&self) -> usize {
        self.sample
    }

    /// Depth slots per cell.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of ids.
    #[inline]
    pub fn num_ids(&self) -> usize {
        self.n_ids
    }

    /// Writes a cell.
    #[inline]
    pub fn set(
        &mut self,
        value: f64,
        id: usize,
        date: usize,
        depth: usize,
    ) -> Result<(), CubeError> {
        check_value(value)?;
        let offset = self.offset(id, date, depth)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Reads a cell.
    #[inline]
    pub fn get(&self, id: usize, date: usize, depth: usize) -> Result<f64, CubeError> {
        let value = self.data[self.offset(id, date, depth)?];
        if value.is_nan() {
            return Err(CubeError::UnwrittenCell {
                id,
                date: Some(date),
                sample: Some(self.sample),
                depth,
            });
        }
        Ok(value)
    }

    /// Writes `value` into every depth slot of one `(id, date)`.
    pub fn fill_cell(&mut self, value: f64, id: usize, date: usize) -> Result<(), CubeError> {
        check_value(value)?;
        let start = self.offset(id, date, 0)?;
        self.data[start..start + self.depth].fill(value);
        Ok(())
    }
}
