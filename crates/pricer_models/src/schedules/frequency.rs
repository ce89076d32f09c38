//! Payment frequency enumeration.

use std::fmt;
use std::str::FromStr;

/// Payment frequency of a leg.
///
/// # Examples
///
/// ```
/// use pricer_models::schedules::Frequency;
///
/// let freq: Frequency = "quarterly".parse().unwrap();
/// assert_eq!(freq, Frequency::Quarterly);
/// assert_eq!(freq.months_between_payments(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    /// Once per year.
    Annual,
    /// Twice per year.
    SemiAnnual,
    /// Four times per year.
    Quarterly,
    /// Twelve times per year.
    Monthly,
}

impl Frequency {
    /// Number of payment periods per year.
    #[inline]
    pub fn periods_per_year(&self) -> u32 {
        12 / self.months_between_payments()
    }

    /// Months between consecutive payments.
    #[inline]
    pub fn months_between_payments(&self) -> u32 {
        match self {
            Frequency::Annual => 12,
            Frequency::SemiAnnual => 6,
            Frequency::Quarterly => 3,
            Frequency::Monthly => 1,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "SemiAnnual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace(['-', '_', ' '], "").as_str() {
            "ANNUAL" | "1Y" | "A" => Ok(Frequency::Annual),
            "SEMIANNUAL" | "6M" | "S" => Ok(Frequency::SemiAnnual),
            "QUARTERLY" | "3M" | "Q" => Ok(Frequency::Quarterly),
            "MONTHLY" | "1M" | "M" => Ok(Frequency::Monthly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}
