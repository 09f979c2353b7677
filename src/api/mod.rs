// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client HTTP qui récupère les taux de change
// depuis l'API distante (open.er-api.com)
// ============================================================================

pub mod rates;  // Client API taux de change

// Re-export des fonctions principales
pub use rates::{fetch_rates, FetchError};
