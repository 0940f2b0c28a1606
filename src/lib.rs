// ============================================================================
// Stakedash - Library
// ============================================================================
// Expose les modules publics au binaire et aux tests
// ============================================================================

pub mod api;          // Client REST du backend de staking
pub mod app;          // État de l'application (écrans, saisie)
pub mod config;       // Configuration : fichier, environnement
pub mod error;        // Erreurs typées (API, wallet)
pub mod models;       // Structures de données + LoadState
pub mod orchestrator; // Cycles de chargement du dashboard
pub mod ui;           // Interface utilisateur
pub mod wallet;       // Session wallet et connectors
