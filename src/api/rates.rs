// ============================================================================
// API Client : taux de change (open.er-api.com)
// ============================================================================
// Récupère la table des taux pour une devise de base donnée
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Enum d'erreur dédié : le chemin réseau distingue Network et Parse,
//    le reste de l'application n'a que ces deux cas à traiter
// 3. Serde : désérialisation JSON automatique
// 4. Fonction de parsing pure : testable sans réseau
// ============================================================================

use std::collections::HashMap;
use std::fmt;

use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::RateTable;

/// Point d'entrée de l'API : un seul GET {BASE_URL}/{code}, sans auth
const BASE_URL: &str = "https://open.er-api.com/v6/latest";

// ============================================================================
// Erreurs du fetch
// ============================================================================
// Deux familles seulement, toutes deux loguées puis avalées par l'appelant :
// la table courante reste en place, pas de retry, pas de source de secours
// ============================================================================

/// Échec d'une récupération de taux
#[derive(Debug)]
pub enum FetchError {
    /// Connexion impossible, envoi échoué ou statut HTTP non 2xx
    Network(String),

    /// Corps indéchiffrable : JSON invalide, champ attendu absent,
    /// ou réponse signalant explicitement une erreur
    Parse(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "erreur réseau : {}", msg),
            Self::Parse(msg) => write!(f, "réponse invalide : {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

// ============================================================================
// Structure pour parser la réponse JSON de l'API
// ============================================================================
// L'API renvoie un JSON plat ; on ne déclare que les champs utiles, serde
// ignore le reste (provider, terms_of_use, etc.)
//
// CONCEPT RUST : #[serde(rename = "...")]
// - Le champ d'erreur de l'API s'appelle "error-type", imprononçable en Rust
// ============================================================================

/// Réponse complète de l'API de taux de change
#[derive(Debug, Deserialize)]
struct RatesResponse {
    /// "success" ou "error"
    result: Option<String>,

    /// Renseigné uniquement quand result == "error" (ex: "unsupported-code")
    #[serde(rename = "error-type")]
    error_type: Option<String>,

    /// Code de la devise de base confirmé par l'API
    base_code: Option<String>,

    /// Timestamp Unix de la dernière mise à jour des taux
    time_last_update_unix: Option<i64>,

    /// La table elle-même : code devise -> taux relatif à la base
    rates: Option<HashMap<String, f64>>,
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Récupère la table des taux pour une devise de base
///
/// Une seule requête, pas de retry : en cas d'échec l'appelant conserve la
/// table précédente et l'interface continue d'afficher les derniers taux
/// connus (ou le placeholder si rien n'a jamais été chargé).
///
/// # Arguments
/// * `code` - Devise de base (ex: "USD", "EUR")
///
/// # Retourne
/// * `Result<RateTable, FetchError>` - Table complète ou erreur typée
///
/// CONCEPT RUST : #[instrument]
/// - Macro tracing qui ajoute automatiquement un span
/// - Tous les logs à l'intérieur auront le contexte code
#[instrument]
pub async fn fetch_rates(code: &str) -> Result<RateTable, FetchError> {
    let url = build_url(code);
    debug!(url = %url, "Built exchange rate API URL");

    // Ajout d'un User-Agent explicite, certains frontaux HTTP rejettent
    // les clients anonymes
    let client = reqwest::Client::builder()
        .user_agent("lazychange/0.1")
        .build()
        .map_err(|e| FetchError::Network(e.to_string()))?;

    debug!("Sending HTTP request to exchange rate API");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    // Statut non 2xx : erreur réseau, le corps ne sera pas lu
    if !status.is_success() {
        error!(status = %status, "Exchange rate API returned error status");
        return Err(FetchError::Network(format!("statut HTTP {}", status)));
    }

    // On récupère le corps brut puis on le confie au parseur pur : la
    // frontière Network / Parse est exactement la frontière texte / JSON
    let body = response
        .text()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    let table = parse_rates(code, &body)?;
    info!(base = %table.base, currencies = table.len(), "Successfully fetched rate table");
    Ok(table)
}

/// Construit l'URL de l'API pour une devise de base
///
/// CONCEPT RUST : &str vs String
/// - Fonction prend &str (référence, pas d'allocation)
/// - Retourne String (owned, allouée)
pub fn build_url(code: &str) -> String {
    format!("{}/{}", BASE_URL, code)
}

/// Décode un corps de réponse en RateTable
///
/// Fonction pure (aucune I/O) : les cas de corps malformé se testent avec
/// des payloads en dur, sans toucher au réseau.
///
/// `requested` sert de base de repli si l'API omet base_code.
pub fn parse_rates(requested: &str, body: &str) -> Result<RateTable, FetchError> {
    let decoded: RatesResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    // L'API peut répondre 200 avec un corps d'erreur structuré
    if let Some(result) = decoded.result.as_deref() {
        if result != "success" {
            let kind = decoded
                .error_type
                .unwrap_or_else(|| "inconnue".to_string());
            warn!(kind = %kind, "Exchange rate API reported an error result");
            return Err(FetchError::Parse(format!(
                "l'API signale une erreur : {}",
                kind
            )));
        }
    }

    let rates = decoded
        .rates
        .ok_or_else(|| FetchError::Parse("champ \"rates\" absent de la réponse".to_string()))?;

    if rates.is_empty() {
        error!("Decoded rate table is empty");
        return Err(FetchError::Parse("table des taux vide".to_string()));
    }

    let base = decoded
        .base_code
        .unwrap_or_else(|| requested.to_string());

    // Convertit le timestamp Unix en DateTime<Utc>, absent si invalide
    let fetched_at = decoded
        .time_last_update_unix
        .and_then(|ts| DateTime::from_timestamp(ts, 0));

    Ok(RateTable::new(base, rates, fetched_at))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let url = build_url("USD");
        assert_eq!(url, "https://open.er-api.com/v6/latest/USD");
        assert!(build_url("EUR").ends_with("/EUR"));
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{
            "result": "success",
            "base_code": "USD",
            "time_last_update_unix": 1716163200,
            "rates": { "USD": 1, "RUB": 90.0, "EUR": 0.92 }
        }"#;

        let table = parse_rates("USD", body).unwrap();
        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("RUB"), Some(90.0));
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.len(), 3);
        assert!(table.fetched_at.is_some());
    }

    #[test]
    fn test_parse_falls_back_to_requested_base() {
        // base_code absent : on garde le code demandé
        let body = r#"{ "result": "success", "rates": { "CHF": 1 } }"#;
        let table = parse_rates("CHF", body).unwrap();
        assert_eq!(table.base, "CHF");
        assert!(table.fetched_at.is_none());
    }

    #[test]
    fn test_parse_missing_rates_field() {
        let body = r#"{ "result": "success", "base_code": "USD" }"#;
        let err = parse_rates("USD", body).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_parse_error_result() {
        let body = r#"{ "result": "error", "error-type": "unsupported-code" }"#;
        let err = parse_rates("XXX", body).unwrap_err();
        match err {
            FetchError::Parse(msg) => assert!(msg.contains("unsupported-code")),
            other => panic!("attendu Parse, obtenu {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage_body() {
        let err = parse_rates("USD", "pas du json").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    // Test async nécessite tokio test runtime
    // CONCEPT RUST : #[tokio::test]
    // - Macro qui setup un runtime tokio pour le test
    // - Permet d'utiliser .await dans les tests
    #[tokio::test]
    async fn test_fetch_rates_live() {
        // Test avec un vrai appel API (peut échouer si pas de connexion)
        match fetch_rates("USD").await {
            Ok(table) => {
                assert_eq!(table.base, "USD");
                assert!(table.contains("EUR"));
                println!("✓ Récupéré {} devises pour USD", table.len());
            }
            Err(e) => {
                println!("⚠ Test skippé (pas de connexion?) : {}", e);
            }
        }
    }
}
