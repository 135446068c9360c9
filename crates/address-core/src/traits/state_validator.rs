// # State Validator Trait
//
// Confirms that a state belongs to a country before a record is written.
//
// Country names are resolved to ISO 3166-1 alpha-2 codes through the static
// table in [`crate::country`]. A country with no code never validates, and
// implementations must not contact any external service for it.
//
// ## Implementations
//
// - Directory lookup over HTTP: `address-directory-http` crate

use async_trait::async_trait;

/// Outcome of a state check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCheck {
    /// The state exists under the country
    Valid,
    /// The country name has no ISO code
    UnknownCountry,
    /// The directory knows no such state for the country
    NoMatch,
}

impl StateCheck {
    pub fn is_valid(self) -> bool {
        matches!(self, StateCheck::Valid)
    }

    /// Convert a negative outcome into its error
    pub fn into_result(self, state: &str, country: &str) -> Result<(), crate::Error> {
        match self {
            StateCheck::Valid => Ok(()),
            StateCheck::UnknownCountry => Err(crate::Error::unresolvable_country(country)),
            StateCheck::NoMatch => Err(crate::Error::state_not_found(state, country)),
        }
    }
}

/// Trait for state validator implementations
///
/// No retries and no caching: every call is a fresh lookup. Transport
/// failures are returned as [`Error::Directory`](crate::Error::Directory)
/// so callers can tell them apart from a negative answer.
#[async_trait]
pub trait StateValidator: Send + Sync {
    /// Check whether `state` belongs to `country`
    async fn check(&self, state: &str, country: &str) -> Result<StateCheck, crate::Error>;

    /// Convenience wrapper returning only whether the state is valid
    async fn is_state_valid(&self, state: &str, country: &str) -> Result<bool, crate::Error> {
        Ok(self.check(state, country).await?.is_valid())
    }

    /// Validator name for logging
    fn validator_name(&self) -> &'static str;
}

/// Helper trait for constructing state validators from configuration
pub trait StateValidatorFactory: Send + Sync {
    /// Create a StateValidator instance from configuration
    fn create(
        &self,
        config: &crate::config::DirectoryConfig,
    ) -> Result<Box<dyn StateValidator>, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_checks_map_to_errors() {
        assert!(StateCheck::Valid.into_result("IL", "United States").is_ok());
        assert!(matches!(
            StateCheck::UnknownCountry.into_result("IL", "Atlantis"),
            Err(crate::Error::UnresolvableCountry(c)) if c == "Atlantis"
        ));
        assert!(matches!(
            StateCheck::NoMatch.into_result("QC", "United States"),
            Err(crate::Error::StateNotFound { .. })
        ));
    }
}
