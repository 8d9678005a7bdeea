//! Operator-supplied list of observed coins.

use std::collections::HashMap;

use crate::error::{NotifierError, Result};
use crate::types::ObservedCoin;

/// Observed coins in configuration order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct CoinRegistry {
    coins: Vec<ObservedCoin>,
    index: HashMap<String, usize>,
}

impl CoinRegistry {
    /// Builds the registry, rejecting duplicate ids.
    pub fn new(coins: Vec<ObservedCoin>) -> Result<Self> {
        let mut index = HashMap::with_capacity(coins.len());
        for (position, coin) in coins.iter().enumerate() {
            if index.insert(coin.id.clone(), position).is_some() {
                return Err(NotifierError::Config(format!(
                    "coin {} is configured more than once",
                    coin.id
                )));
            }
        }
        Ok(Self { coins, index })
    }

    pub fn list(&self) -> &[ObservedCoin] {
        &self.coins
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Result<&ObservedCoin> {
        self.index
            .get(id)
            .map(|&position| &self.coins[position])
            .ok_or_else(|| NotifierError::CoinNotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metric, TriggerCondition};

    fn coin(id: &str) -> ObservedCoin {
        ObservedCoin::new(id, "", TriggerCondition::new(Metric::PriceUsd, 1.0))
    }

    #[test]
    fn lookup_by_id() {
        let registry = CoinRegistry::new(vec![coin("bitcoin"), coin("ethereum")]).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("ethereum").unwrap().id, "ethereum");
        assert!(registry.contains("bitcoin"));
        assert_eq!(registry.list()[0].id, "bitcoin");
    }

    #[test]
    fn missing_id_is_coin_not_found() {
        let registry = CoinRegistry::new(vec![coin("bitcoin")]).unwrap();
        match registry.get("dogecoin") {
            Err(NotifierError::CoinNotFound(id)) => assert_eq!(id, "dogecoin"),
            other => panic!("expected CoinNotFound, got {:?}", other),
        }
    }

    #[test]
    fn empty_registry_lookup_fails_cleanly() {
        let registry = CoinRegistry::default();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get("bitcoin"),
            Err(NotifierError::CoinNotFound(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = CoinRegistry::new(vec![coin("bitcoin"), coin("bitcoin")]).unwrap_err();
        assert!(matches!(err, NotifierError::Config(_)));
    }
}
