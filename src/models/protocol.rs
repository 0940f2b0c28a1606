// ============================================================================
// Enum : Protocol
// ============================================================================
// Les trois protocoles de liquid staking suivis par le dashboard
//
// CONCEPTS RUST :
// 1. Enum fermé : le compilateur force à gérer les trois protocoles partout
// 2. #[serde(rename = "...")] : l'identifiant JSON du backend ("ether.fi")
//    n'est pas un identifiant Rust valide, on le mappe explicitement
// 3. Copy : un enum sans données est copiable gratuitement
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Protocole de liquid staking
///
/// Un identifiant inconnu dans la réponse JSON fait échouer la
/// désérialisation (et donc la requête entière).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "ether.fi")]
    EtherFi,
    #[serde(rename = "lido")]
    Lido,
    #[serde(rename = "rocketpool")]
    RocketPool,
}

impl Protocol {
    /// Tous les protocoles connus, dans l'ordre d'affichage
    pub const ALL: [Protocol; 3] = [Protocol::EtherFi, Protocol::Lido, Protocol::RocketPool];

    /// Identifiant tel qu'envoyé par le backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::EtherFi => "ether.fi",
            Protocol::Lido => "lido",
            Protocol::RocketPool => "rocketpool",
        }
    }

    /// Nom lisible pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::EtherFi => "Ether.fi",
            Protocol::Lido => "Lido",
            Protocol::RocketPool => "Rocket Pool",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
