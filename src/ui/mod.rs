// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod converter; // Rendu de l'interface principale
pub mod events;    // Gestion des événements clavier et souris

// Re-exports pour simplifier les imports
pub use converter::render;
pub use events::{Event, EventHandler};
