// ============================================================================
// Module : models
// ============================================================================
// Structures de données échangées avec le backend de staking, plus l'état
// de chargement générique utilisé par le dashboard
// ============================================================================

pub mod load_state;     // LoadState<T> : Loading | Failed | Ready
pub mod position;       // StakingPosition + agrégats
pub mod protocol;       // Enum Protocol (ether.fi, lido, rocketpool)
pub mod protocol_stats; // ProtocolStats (APY, TVL)
pub mod yield_point;    // YieldPoint (historique des rewards)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use stakedash::models::position::StakingPosition;
// On peut faire : use stakedash::models::StakingPosition;
pub use load_state::LoadState;
pub use position::{position_for, total_rewards, StakingPosition};
pub use protocol::Protocol;
pub use protocol_stats::ProtocolStats;
pub use yield_point::{series_by_protocol, YieldPoint};
