// ============================================================================
// Module : api
// ============================================================================
// Client REST du backend de staking (positions, rendements, protocoles)
// ============================================================================

pub mod staking; // Client API du backend de staking

// Re-export des types principaux
pub use staking::{ApiClient, StakingApi, DEFAULT_API_BASE, HEALTH_TIMEOUT};
