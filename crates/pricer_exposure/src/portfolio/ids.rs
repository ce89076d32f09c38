//! Strongly typed identifiers for portfolio entities.

use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a trade.
    ///
    /// ```
    /// use pricer_exposure::portfolio::TradeId;
    ///
    /// let id = TradeId::new("SWAP_001");
    /// assert_eq!(id.as_str(), "SWAP_001");
    /// assert_eq!(id.to_string(), "SWAP_001");
    /// ```
    TradeId
);

entity_id!(
    /// Unique identifier for a counterparty or the own party.
    CounterpartyId
);

entity_id!(
    /// Unique identifier for a netting set.
    NettingSetId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_distinct_types_with_same_text() {
        let trade = TradeId::from("X");
        let netting = NettingSetId::from("X".to_string());
        assert_eq!(trade.as_str(), netting.as_str());
    }

    #[test]
    fn test_ids_hash_and_order() {
        let mut set = HashSet::new();
        set.insert(CounterpartyId::new("CP_B"));
        set.insert(CounterpartyId::new("CP_B"));
        assert_eq!(set.len(), 1);
        assert!(CounterpartyId::new("CP_A") < CounterpartyId::new("CP_B"));
    }
}
