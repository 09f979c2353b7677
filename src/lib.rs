// ============================================================================
// LazyChange - Library
// ============================================================================
// Expose les modules publics pour les tests
// ============================================================================

pub mod api;    // API de taux de change (open.er-api.com)
pub mod models; // Structures de données
pub mod app;    // État de l'application
pub mod ui;     // Interface utilisateur
