// ============================================================================
// Structure : StakingPosition
// ============================================================================
// La position d'un wallet dans un protocole (montant staké, rewards, valeur)
//
// Snapshot immuable : remplacé en bloc à chaque cycle de chargement réussi,
// jamais modifié localement.
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::Protocol;

/// Position de staking d'un wallet pour un protocole
///
/// Les montants sont exprimés en unités de l'actif natif (ETH).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")] // stakedAmount, currentValue côté JSON
pub struct StakingPosition {
    pub protocol: Protocol,
    pub staked_amount: f64,
    pub rewards: f64,
    pub current_value: f64,
}

/// Somme des rewards de toutes les positions
///
/// CONCEPT RUST : Iterator::sum
/// - Valeur dérivée, recalculée à chaque rendu, jamais stockée
pub fn total_rewards(positions: &[StakingPosition]) -> f64 {
    positions.iter().map(|position| position.rewards).sum()
}

/// Cherche la position d'un protocole donné
pub fn position_for(positions: &[StakingPosition], protocol: Protocol) -> Option<&StakingPosition> {
    positions.iter().find(|position| position.protocol == protocol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(protocol: Protocol, rewards: f64) -> StakingPosition {
        StakingPosition {
            protocol,
            staked_amount: 10.0,
            rewards,
            current_value: 10.0 + rewards,
        }
    }

    #[test]
    fn test_total_rewards() {
        let positions = vec![position(Protocol::EtherFi, 1.5), position(Protocol::Lido, 0.25)];
        assert_eq!(total_rewards(&positions), 1.75);
    }

    #[test]
    fn test_total_rewards_empty() {
        assert_eq!(total_rewards(&[]), 0.0);
    }

    #[test]
    fn test_position_for() {
        let positions = vec![position(Protocol::Lido, 0.25)];
        assert!(position_for(&positions, Protocol::Lido).is_some());
        assert!(position_for(&positions, Protocol::EtherFi).is_none());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"protocol":"lido","stakedAmount":32.0,"rewards":0.8,"currentValue":32.8}"#;
        let parsed: StakingPosition = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.protocol, Protocol::Lido);
        assert_eq!(parsed.staked_amount, 32.0);
        assert_eq!(parsed.current_value, 32.8);
    }
}
