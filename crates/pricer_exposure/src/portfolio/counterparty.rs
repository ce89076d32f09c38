//! Counterparties and their credit references.

use super::error::PortfolioError;
use super::ids::CounterpartyId;

/// A party we face, or the own party.
///
/// Credit risk is looked up by name: `default_curve` names a default curve
/// of the simulated market.
///
/// # Examples
///
/// ```
/// use pricer_exposure::portfolio::{Counterparty, CounterpartyId};
///
/// let cpty = Counterparty::new(CounterpartyId::new("CPTY_A"), "CPTY_A_SR", 0.6)
///     .unwrap()
///     .with_name("Acme Corp");
/// assert_eq!(cpty.default_curve(), "CPTY_A_SR");
/// assert!((cpty.lgd() - 0.6).abs() < 1e-15);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counterparty {
    id: CounterpartyId,
    name: Option<String>,
    default_curve: String,
    lgd: f64,
}

impl Counterparty {
    /// Creates a counterparty.
    ///
    /// # Errors
    ///
    /// `InvalidCreditParams` if `lgd` is outside `[0, 1]`.
    pub fn new(
        id: CounterpartyId,
        default_curve: impl Into<String>,
        lgd: f64,
    ) -> Result<Self, PortfolioError> {
        if !(0.0..=1.0).contains(&lgd) {
            return Err(PortfolioError::InvalidCreditParams(format!(
                "LGD must be in [0, 1], got {}",
                lgd
            )));
        }
        Ok(Self {
            id,
            name: None,
            default_curve: default_curve.into(),
            lgd,
        })
    }

    /// Sets a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the counterparty ID.
    #[inline]
    pub fn id(&self) -> &CounterpartyId {
        &self.id
    }

    /// Display name, falling back to the ID.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Name of the default curve.
    #[inline]
    pub fn default_curve(&self) -> &str {
        &self.default_curve
    }

    /// Loss given default.
    #[inline]
    pub fn lgd(&self) -> f64 {
        self.lgd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_lgd() {
        assert!(matches!(
            Counterparty::new(CounterpartyId::new("C"), "C", 1.5),
            Err(PortfolioError::InvalidCreditParams(_))
        ));
    }

    #[test]
    fn test_name_defaults_to_id() {
        let c = Counterparty::new(CounterpartyId::new("C1"), "C1_CURVE", 0.4).unwrap();
        assert_eq!(c.name(), "C1");
    }
}
