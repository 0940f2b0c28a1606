// ============================================================================
// Structure : ProtocolStats
// ============================================================================
// Dernier snapshot connu d'un protocole (APY, TVL). Pas d'historique.
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Protocol;

/// Statistiques d'un protocole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolStats {
    pub protocol: Protocol,

    /// APY courant en pourcentage (ex: 3.2 pour 3.2%)
    pub current_apy: f64,

    /// Total Value Locked, en ETH
    pub tvl: f64,

    pub updated_at: DateTime<Utc>,
}
