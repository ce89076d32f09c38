//! Errors raised while assembling a portfolio.

use std::fmt;

use thiserror::Error;

/// Which id namespace a duplicate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Trade ids.
    Trade,
    /// Counterparty ids, including the own party.
    Counterparty,
    /// Netting set ids.
    NettingSet,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Trade => "trade",
            EntityKind::Counterparty => "counterparty",
            EntityKind::NettingSet => "netting set",
        })
    }
}

/// Portfolio validation failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PortfolioError {
    /// The same id was registered twice.
    #[error("{kind} '{id}' registered twice")]
    Duplicate {
        /// Namespace of the clash.
        kind: EntityKind,
        /// Offending id.
        id: String,
    },

    /// Loss given default or another credit input is unusable.
    #[error("Invalid credit parameters: {0}")]
    InvalidCreditParams(String),

    /// A trade or netting set names a counterparty nobody registered.
    #[error("{owner} refers to unknown counterparty '{counterparty}'")]
    UnknownCounterparty {
        /// Trade or netting set holding the reference.
        owner: String,
        /// Missing counterparty id.
        counterparty: String,
    },

    /// A trade names a netting set nobody registered.
    #[error("trade '{trade}' refers to unknown netting set '{netting_set}'")]
    UnknownNettingSet {
        /// Trade id.
        trade: String,
        /// Missing netting set id.
        netting_set: String,
    },

    /// Trade and its netting set disagree on the counterparty.
    #[error(
        "trade '{trade}' faces '{trade_counterparty}' but its netting set faces \
         '{netting_set_counterparty}'"
    )]
    CounterpartyMismatch {
        /// Trade id.
        trade: String,
        /// Counterparty booked on the trade.
        trade_counterparty: String,
        /// Counterparty of the netting set.
        netting_set_counterparty: String,
    },

    /// No trades were added.
    #[error("Portfolio is empty")]
    EmptyPortfolio,
}

impl PortfolioError {
    pub(crate) fn duplicate(kind: EntityKind, id: impl ToString) -> Self {
        PortfolioError::Duplicate {
            kind,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortfolioError::UnknownNettingSet {
            trade: "T1".to_string(),
            netting_set: "NS9".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "trade 'T1' refers to unknown netting set 'NS9'"
        );
        assert_eq!(
            PortfolioError::duplicate(EntityKind::NettingSet, "NS1").to_string(),
            "netting set 'NS1' registered twice"
        );
        assert_eq!(PortfolioError::EmptyPortfolio.to_string(), "Portfolio is empty");
    }
}
