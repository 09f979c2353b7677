// ============================================================================
// Structure : RateTable
// ============================================================================
// La table des taux de change, exprimée par rapport à une devise de base
//
// CONCEPTS RUST :
// 1. HashMap<String, f64> : accès O(1) par code devise
// 2. Remplacement en bloc : la table est toujours réassignée entière après
//    un fetch réussi, jamais modifiée entrée par entrée
// 3. Option<DateTime<Utc>> : l'horodatage vient de l'API, absent au départ
// ============================================================================

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Table des taux relative à une devise de base
///
/// Un taux est le facteur multiplicatif qui convertit 1 unité de la base
/// vers la devise cible : rates["RUB"] = 90 signifie 1 base = 90 RUB.
/// La base elle-même figure dans la table avec un taux de 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Code de la devise de base (le côté "from" du fetch)
    pub base: String,

    /// Taux par code devise, relatifs à la base
    pub rates: HashMap<String, f64>,

    /// Horodatage de dernière mise à jour côté API (None tant que rien
    /// n'a été chargé)
    pub fetched_at: Option<DateTime<Utc>>,
}

impl RateTable {
    /// Table vide : l'état initial, avant le premier fetch réussi
    pub fn empty(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            rates: HashMap::new(),
            fetched_at: None,
        }
    }

    /// Construit une table complète à partir d'une réponse API décodée
    pub fn new(
        base: impl Into<String>,
        rates: HashMap<String, f64>,
        fetched_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            base: base.into(),
            rates,
            fetched_at,
        }
    }

    /// Taux de la base vers `code`, si la table le connaît
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Vérifie qu'un code figure dans la table
    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Tous les codes de la table, triés par ordre alphabétique
    ///
    /// Alimente les sélecteurs de devises : l'utilisateur choisit parmi ce
    /// que l'API connaît réellement
    pub fn codes_sorted(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.rates.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Nombre de devises connues
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Vrai tant qu'aucun fetch n'a abouti
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RateTable {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 1.0);
        rates.insert("RUB".to_string(), 90.0);
        rates.insert("EUR".to_string(), 0.92);
        RateTable::new("USD", rates, None)
    }

    #[test]
    fn test_empty_table() {
        let table = RateTable::empty("USD");
        assert_eq!(table.base, "USD");
        assert!(table.is_empty());
        assert_eq!(table.rate("RUB"), None);
        assert!(table.fetched_at.is_none());
    }

    #[test]
    fn test_rate_lookup() {
        let table = sample_table();
        assert_eq!(table.rate("RUB"), Some(90.0));
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.rate("GBP"), None);
        assert!(table.contains("EUR"));
        assert!(!table.contains("GBP"));
    }

    #[test]
    fn test_codes_sorted() {
        let table = sample_table();
        // Tri alphabétique, comme les listes des sélecteurs
        assert_eq!(table.codes_sorted(), vec!["EUR", "RUB", "USD"]);
        assert_eq!(table.len(), 3);
    }
}
