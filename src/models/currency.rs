// ============================================================================
// Structure : Currency
// ============================================================================
// Représente une devise du référentiel statique (code ISO, nom, symbole)
//
// CONCEPTS RUST :
// 1. &'static str : littéraux stockés dans le binaire, zéro allocation
// 2. const : la liste des devises populaires est figée à la compilation
// 3. #[derive(...)] : Debug pour {:?}, Copy car la structure ne contient
//    que des références 'static (copie triviale)
// ============================================================================

/// Une devise affichable (référentiel statique, jamais téléchargé)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    /// Code ISO 4217 à 3 lettres (ex: "USD")
    pub code: &'static str,

    /// Nom complet pour l'info-bulle / l'aide (ex: "Dollar américain")
    pub name: &'static str,

    /// Symbole monétaire (ex: "$", "€", "HK$")
    pub symbol: &'static str,
}

impl Currency {
    /// Libellé affiché sur la puce : "USD $"
    pub fn chip_label(&self) -> String {
        format!("{} {}", self.code, self.symbol)
    }
}

// ============================================================================
// Référentiel : les 15 devises les plus populaires
// ============================================================================
// Donnée de référence immuable, utilisée pour la rangée de puces et comme
// liste de secours pour les sélecteurs tant que la table des taux est vide
// ============================================================================

/// Les 15 devises proposées en raccourci (puces)
pub const POPULAR_CURRENCIES: [Currency; 15] = [
    Currency { code: "USD", name: "Dollar américain", symbol: "$" },
    Currency { code: "EUR", name: "Euro", symbol: "€" },
    Currency { code: "GBP", name: "Livre sterling", symbol: "£" },
    Currency { code: "JPY", name: "Yen japonais", symbol: "¥" },
    Currency { code: "CNY", name: "Yuan chinois", symbol: "¥" },
    Currency { code: "AUD", name: "Dollar australien", symbol: "A$" },
    Currency { code: "CAD", name: "Dollar canadien", symbol: "C$" },
    Currency { code: "CHF", name: "Franc suisse", symbol: "Fr" },
    Currency { code: "HKD", name: "Dollar de Hong Kong", symbol: "HK$" },
    Currency { code: "NZD", name: "Dollar néo-zélandais", symbol: "NZ$" },
    Currency { code: "SEK", name: "Couronne suédoise", symbol: "kr" },
    Currency { code: "KRW", name: "Won sud-coréen", symbol: "₩" },
    Currency { code: "SGD", name: "Dollar de Singapour", symbol: "S$" },
    Currency { code: "NOK", name: "Couronne norvégienne", symbol: "kr" },
    Currency { code: "RUB", name: "Rouble russe", symbol: "₽" },
];

/// Retourne la position d'un code dans la liste des puces
///
/// CONCEPT RUST : Iterator::position
/// - Parcourt la liste et retourne l'index du premier match
/// - Option<usize> : None si le code ne fait pas partie des puces
pub fn popular_position(code: &str) -> Option<usize> {
    POPULAR_CURRENCIES.iter().position(|c| c.code == code)
}

/// Retourne les codes des devises populaires, dans l'ordre des puces
pub fn popular_codes() -> Vec<String> {
    POPULAR_CURRENCIES
        .iter()
        .map(|c| c.code.to_string())
        .collect()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_label() {
        let usd = POPULAR_CURRENCIES[0];
        assert_eq!(usd.code, "USD");
        assert_eq!(usd.chip_label(), "USD $");

        let hkd = POPULAR_CURRENCIES[8];
        assert_eq!(hkd.chip_label(), "HKD HK$");
    }

    #[test]
    fn test_popular_position() {
        assert_eq!(popular_position("USD"), Some(0));
        assert_eq!(popular_position("RUB"), Some(14));
        assert_eq!(popular_position("XYZ"), None);
    }

    #[test]
    fn test_popular_codes_unique() {
        // Les codes doivent être uniques (sinon deux puces identiques)
        let codes = popular_codes();
        assert_eq!(codes.len(), 15);
        for (i, code) in codes.iter().enumerate() {
            assert_eq!(code.len(), 3);
            assert!(!codes[i + 1..].contains(code), "code dupliqué : {}", code);
        }
    }
}
