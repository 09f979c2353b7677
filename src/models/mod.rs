// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod currency;   // Référentiel statique des devises (puces)
pub mod format;     // Arrondi 5 décimales et formatage locale FR
pub mod rate_table; // Table des taux relative à une devise de base

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazychange::models::rate_table::RateTable;
// On peut faire : use lazychange::models::RateTable;
pub use currency::{popular_codes, popular_position, Currency, POPULAR_CURRENCIES};
pub use format::{format_amount, format_rate, parse_amount, round_five_digits};
pub use rate_table::RateTable;
