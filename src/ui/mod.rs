// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
//
// Chaque vue est une fonction pure de l'état (App, LoadState) vers la Frame
// ============================================================================

pub mod events;      // Gestion des événements clavier
pub mod dashboard;   // Routage des écrans + écran principal
pub mod connect;     // Écran de connexion du wallet
pub mod positions;   // Cartes des positions par protocole
pub mod chart;       // Graphique de rendement
pub mod comparison;  // Tableau de comparaison des protocoles
pub mod placeholder; // Squelettes de chargement et bannières d'erreur

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};

/// Contenu texte d'un TestBackend, une ligne de terminal par ligne
#[cfg(test)]
pub(crate) fn buffer_text(backend: &ratatui::backend::TestBackend) -> String {
    let buffer = backend.buffer();
    let width = buffer.area.width.max(1) as usize;

    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
