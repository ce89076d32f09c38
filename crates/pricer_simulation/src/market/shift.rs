//! Key-rate shifted market views.

use pricer_core::types::{Date, DayCountConvention, PricingError};
use pricer_models::indices::InterestRateIndex;
use pricer_models::market::{simple_forward, MarketView};

/// Key-rate pillars (in years) defining triangular zero-rate buckets.
///
/// Bucket `i` has weight 1 at pillar `i`, falling linearly to 0 at the
/// neighbouring pillars; the first and last buckets extend flat beyond the
/// end pillars. Weights of all buckets sum to 1 at every maturity, so the sum
/// of bucketed deltas equals the parallel delta.
///
/// # Examples
///
/// ```
/// use pricer_simulation::market::KeyRateBuckets;
///
/// let buckets = KeyRateBuckets::new(vec![1.0, 5.0, 10.0]).unwrap();
/// assert_eq!(buckets.weight(0, 0.5), 1.0);
/// assert_eq!(buckets.weight(1, 3.0), 0.5);
/// assert_eq!(buckets.weight(2, 30.0), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRateBuckets {
    pillars: Vec<f64>,
}

impl KeyRateBuckets {
    /// Creates buckets from strictly increasing, non-negative pillars.
    pub fn new(pillars: Vec<f64>) -> Result<Self, PricingError> {
        if pillars.is_empty() {
            return Err(PricingError::InvalidInput("no key-rate pillars".to_string()));
        }
        if pillars.iter().any(|p| !p.is_finite() || *p < 0.0)
            || pillars.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(PricingError::InvalidInput(
                "key-rate pillars must be finite, non-negative and increasing".to_string(),
            ));
        }
        Ok(Self { pillars })
    }

    /// Number of buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.pillars.len()
    }

    /// Always false; construction rejects empty pillar sets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pillars.is_empty()
    }

    /// Pillar times.
    #[inline]
    pub fn pillars(&self) -> &[f64] {
        &self.pillars
    }

    /// Weight of `bucket` at maturity `tau`.
    pub fn weight(&self, bucket: usize, tau: f64) -> f64 {
        let p = &self.pillars;
        let Some(&centre) = p.get(bucket) else {
            return 0.0;
        };
        if tau <= centre {
            match bucket.checked_sub(1).map(|i| p[i]) {
                None => 1.0,
                Some(left) if tau <= left => 0.0,
                Some(left) => (tau - left) / (centre - left),
            }
        } else {
            match p.get(bucket + 1) {
                None => 1.0,
                Some(&right) if tau >= right => 0.0,
                Some(&right) => (right - tau) / (right - centre),
            }
        }
    }
}

/// A market whose zero rates are shifted in one key-rate bucket.
///
/// Discount factors become `DF(tau) * exp(-size * w(tau) * tau)` with `tau`
/// ACT/365 from the market date; forwards follow from the shifted discount
/// factors and fixings pass through unchanged.
pub struct ShiftedMarket<'a> {
    base: &'a dyn MarketView,
    buckets: &'a KeyRateBuckets,
    bucket: usize,
    size: f64,
}

impl<'a> ShiftedMarket<'a> {
    /// Shifts `bucket` of `base` by `size` (absolute rate, e.g. `1e-4`).
    pub fn new(
        base: &'a dyn MarketView,
        buckets: &'a KeyRateBuckets,
        bucket: usize,
        size: f64,
    ) -> Self {
        Self {
            base,
            buckets,
            bucket,
            size,
        }
    }
}

impl MarketView for ShiftedMarket<'_> {
    fn asof(&self) -> Date {
        self.base.asof()
    }

    fn discount(&self, date: Date) -> Result<f64, PricingError> {
        let df = self.base.discount(date)?;
        let tau = DayCountConvention::ActualActual365.year_fraction_dates(self.base.asof(), date);
        Ok(df * (-self.size * self.buckets.weight(self.bucket, tau) * tau).exp())
    }

    fn forward_rate(
        &self,
        index: &InterestRateIndex,
        start: Date,
        end: Date,
    ) -> Result<f64, PricingError> {
        simple_forward(
            self.discount(start)?,
            self.discount(end)?,
            index.day_count(),
            start,
            end,
        )
    }

    fn fixing(&self, index: &str, date: Date) -> Option<f64> {
        self.base.fixing(index, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::fixings::FixingStore;
    use pricer_core::market_data::curves::CurveEnum;
    use pricer_models::market::StaticMarket;
    use proptest::prelude::*;

    #[test]
    fn test_invalid_pillars() {
        assert!(KeyRateBuckets::new(vec![]).is_err());
        assert!(KeyRateBuckets::new(vec![1.0, 1.0]).is_err());
        assert!(KeyRateBuckets::new(vec![-1.0, 1.0]).is_err());
    }

    #[test]
    fn test_single_bucket_is_parallel_shift() {
        let today = Date::from_ymd(2024, 1, 1).unwrap();
        let base = StaticMarket::new(today, CurveEnum::flat(0.02), FixingStore::new());
        let buckets = KeyRateBuckets::new(vec![5.0]).unwrap();
        let shifted = ShiftedMarket::new(&base, &buckets, 0, 0.0001);
        let date = Date::from_ymd(2027, 1, 1).unwrap();
        let tau: f64 = 1096.0 / 365.0;
        assert_relative_eq!(
            shifted.discount(date).unwrap(),
            (-0.0201 * tau).exp(),
            epsilon = 1e-12
        );
        assert_eq!(shifted.asof(), today);
    }

    proptest! {
        #[test]
        fn test_weights_sum_to_one(tau in 0.0f64..40.0) {
            let buckets = KeyRateBuckets::new(vec![0.5, 1.0, 2.0, 5.0, 10.0, 30.0]).unwrap();
            let total: f64 = (0..buckets.len()).map(|b| buckets.weight(b, tau)).sum();
            prop_assert!((total - 1.0).abs() < 1e-12);
        }
    }
}
